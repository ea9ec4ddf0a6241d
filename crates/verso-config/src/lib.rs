//! # Verso Configuration Library
//!
//! Immutable tuning knobs shared by every chapter parser: which class names
//! mark red-letter speech, which phrases open a Psalm superscription, which
//! glyphs stand in for footnote callers, and so on.
//!
//! ## Features
//!
//! - Multi-format support (TOML, YAML, JSON), chosen by file extension
//! - Built-in defaults that cover every supported translation
//! - Validation of loaded values
//! - Test utilities for easy testing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use verso_config::ParserConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ParserConfig::load("verso.toml").await?;
//!     assert!(config.is_red_letter_class("woc"));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;

#[cfg(feature = "test-utils")]
mod test_utils;

pub use config::*;
pub use error::{ConfigError, ConfigResult};

#[cfg(feature = "test-utils")]
pub use test_utils::*;
