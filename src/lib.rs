//! # kconfig-model: presence conditions for Kconfig
//!
//! **`kconfig-model`** turns the relational dump of a Kconfig configuration
//! space into a *model*: one propositional presence condition per
//! configuration symbol, ready for slicing and satisfiability checks.
//!
//! ## Tristate symbols
//!
//! Kconfig items are tri-valued: `n` (off), `y` (built-in) or `m` (module).
//! A model speaks about two propositional symbols per tristate item `X`:
//! `CONFIG_X` holds iff `X=y`, and `CONFIG_X_MODULE` holds iff `X=m`.
//! Boolean items only have `CONFIG_X`.
//!
//! ## Basic Usage
//!
//! ```rust
//! use kconfig_model::config::TranslatorConfig;
//! use kconfig_model::rsf::RsfReader;
//! use kconfig_model::translate::translate;
//!
//! // 1. Read the dump
//! let rsf = RsfReader::from_text(
//!     "Item A boolean\n\
//!      Item B tristate\n\
//!      Depends B \"A\"\n",
//! );
//!
//! // 2. Translate it into a model
//! let model = translate(&rsf, &TranslatorConfig::default());
//! assert_eq!(model.expression("CONFIG_B_MODULE"), Some("CONFIG_A && !CONFIG_B && CONFIG_MODULES"));
//!
//! // 3. Query it
//! assert_eq!(
//!     model.slice_symbols(&["CONFIG_B"]),
//!     vec!["CONFIG_A", "CONFIG_B", "CONFIG_B_MODULE", "CONFIG_MODULES"]
//! );
//! ```
//!
//! ## Core Components
//!
//! - **[`parser`]** and **[`rewrite`]**: Kconfig conditions to normalized propositional text.
//! - **[`rsf`]**: The item model of a dump.
//! - **[`translate`]**: Dump to [`Model`][crate::model::Model].
//! - **[`model`]**: Reading, writing and querying models.
//! - **[`selection`]**: Partial configurations in restricted CNF.
//! - **[`dot`]**: Visualizing models using Graphviz.

pub mod ast;
pub mod config;
pub mod dot;
pub mod error;
pub mod model;
pub mod parser;
pub mod rewrite;
pub mod rsf;
pub mod selection;
pub mod translate;
pub mod types;

pub use error::{Error, ParseError, Result};
