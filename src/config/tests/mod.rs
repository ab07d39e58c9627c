//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `field_resolution`: Token, repository, target, and option resolution
//! - `loading`: End-to-end loading from environment and CLI arguments

mod helpers;
