//! Intent core - deterministic natural-language command understanding
//!
//! Maps free-form user text to a registered intent with a confidence score,
//! pulls out slot parameters and generic entities, splits chained commands,
//! and consults per-user learned corrections before anything else.

pub mod builtin;
pub mod catalog;
pub mod chain;
pub mod config;
pub mod datetime;
pub mod engine;
pub mod entities;
pub mod error;
pub mod executor;
pub mod lang;
pub mod learned;
pub mod matcher;
pub mod parser;
pub mod similarity;
pub mod types;

pub use catalog::IntentCatalog;
pub use config::{ParserConfig, Thresholds};
pub use engine::{Engine, Plugin, PluginInfo};
pub use entities::EntityExtractor;
pub use error::{HandlerError, ParserError, StoreError};
pub use executor::{
    handler_fn, ChainExecutor, ChainOutcome, Handler, HandlerContext, HandlerRegistry,
    StageFailure, StageReport,
};
pub use learned::{InMemoryPatternStore, LearnOutcome, LearnedPatterns, PatternStore};
pub use parser::CommandParser;
pub use types::*;

// Python bindings
#[cfg(feature = "python")]
pub mod py;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn intent_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use py::*;
    m.add_class::<PyCommandParser>()?;
    m.add_function(wrap_pyfunction!(py_split_chain, m)?)?;
    m.add_function(wrap_pyfunction!(py_supported_languages, m)?)?;
    Ok(())
}
