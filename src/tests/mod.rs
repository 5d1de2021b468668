//! Unit tests for the relay core.
//!
//! ## Organization
//! - `transform_tests` - response_format to system prompt translation
//! - `response_parser_tests` - JSON extraction from free-text output
//! - `reconcile_tests` - additional_kwargs augmentation of upstream replies
//! - `error_tests` - error categorization and status mapping
//! - `config_tests` - configuration validation

mod reconcile_tests;
