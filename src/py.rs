//! Python bindings using PyO3

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::chain::split_chain;
use crate::config::ParserConfig;
use crate::error::ParserError;
use crate::lang::supported_languages;
use crate::learned::LearnOutcome;
use crate::parser::CommandParser;
use crate::types::{IntentDefinition, Keyword, Params, ParsedCommand};

fn to_py_err(err: ParserError) -> PyErr {
    match err {
        ParserError::Store(e) => PyRuntimeError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn command_to_dict<'py>(py: Python<'py>, command: &ParsedCommand) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("raw_text", &command.raw_text)?;
    dict.set_item("intent", &command.intent)?;
    dict.set_item("confidence", command.confidence)?;
    dict.set_item("params", &command.params)?;
    let entities_json = serde_json::to_string(&command.entities)
        .map_err(|e| PyValueError::new_err(format!("Failed to serialize entities: {}", e)))?;
    dict.set_item("entities", entities_json)?;
    dict.set_item("chain_type", command.chain_type.map(|c| c.as_str()))?;
    dict.set_item("use_previous_output", command.use_previous_output)?;
    Ok(dict)
}

/// Split text into chain segments, returning `(segments, chain_type)`
#[pyfunction]
pub fn py_split_chain(text: &str) -> (Vec<String>, &'static str) {
    let (segments, chain_type) = split_chain(text);
    (segments, chain_type.as_str())
}

/// Language codes with a bundled pack
#[pyfunction]
pub fn py_supported_languages() -> Vec<&'static str> {
    supported_languages()
}

/// Python wrapper for the command parser
#[pyclass]
pub struct PyCommandParser {
    parser: CommandParser,
}

#[pymethods]
impl PyCommandParser {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => ParserConfig::from_json_str(json).map_err(to_py_err)?,
            None => ParserConfig::default(),
        };
        Ok(Self {
            parser: CommandParser::with_config(config),
        })
    }

    /// Parse a single command
    #[pyo3(signature = (text, user_id=None))]
    fn parse<'py>(
        &self,
        py: Python<'py>,
        text: &str,
        user_id: Option<&str>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let command = self.parser.parse(text, user_id);
        command_to_dict(py, &command)
    }

    /// Parse possibly-chained input into a list of command dicts
    #[pyo3(signature = (text, user_id=None))]
    fn parse_chain<'py>(
        &self,
        py: Python<'py>,
        text: &str,
        user_id: Option<&str>,
    ) -> PyResult<Vec<Bound<'py, PyDict>>> {
        let chain = self.parser.parse_chain(text, user_id);
        chain
            .commands
            .iter()
            .map(|command| command_to_dict(py, command))
            .collect()
    }

    /// Parse and return the full chain as JSON
    #[pyo3(signature = (text, user_id=None))]
    fn parse_chain_json(&self, text: &str, user_id: Option<&str>) -> PyResult<String> {
        let chain = self.parser.parse_chain(text, user_id);
        serde_json::to_string(&chain).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn is_chain(&self, text: &str) -> bool {
        self.parser.is_chain(text)
    }

    fn load_language(&self, code: &str) -> bool {
        self.parser.load_language(code)
    }

    fn loaded_languages(&self) -> Vec<String> {
        self.parser.loaded_languages()
    }

    fn intent_names(&self) -> Vec<String> {
        self.parser.intent_names()
    }

    fn examples(&self, intent: &str) -> Vec<String> {
        self.parser.examples(intent)
    }

    /// Register or replace an intent
    #[pyo3(signature = (
        name,
        keywords,
        patterns = Vec::new(),
        slots = Vec::new(),
        examples = Vec::new()
    ))]
    fn register_intent(
        &self,
        name: String,
        keywords: Vec<String>,
        patterns: Vec<String>,
        slots: Vec<String>,
        examples: Vec<String>,
    ) -> PyResult<()> {
        let mut definition = IntentDefinition::new(name);
        for keyword in keywords {
            definition.push_keyword(Keyword::base(keyword.to_lowercase()));
        }
        definition.patterns = patterns;
        definition.slots = slots;
        definition.examples = examples;
        self.parser.register_intent(definition).map_err(to_py_err)
    }

    /// Record a correction. Returns "added" or "updated".
    #[pyo3(signature = (user_id, phrase, intent, params=None))]
    fn learn_correction(
        &self,
        py: Python<'_>,
        user_id: &str,
        phrase: &str,
        intent: &str,
        params: Option<Params>,
    ) -> PyResult<&'static str> {
        let outcome = py
            .allow_threads(|| {
                futures::executor::block_on(
                    self.parser.learn_correction(user_id, phrase, intent, params),
                )
            })
            .map_err(to_py_err)?;
        Ok(match outcome {
            LearnOutcome::Added => "added",
            LearnOutcome::Updated => "updated",
        })
    }

    /// Learned corrections cached for a user, as JSON
    fn learned_patterns(&self, user_id: &str) -> PyResult<String> {
        serde_json::to_string(&self.parser.learned_patterns(user_id))
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }
}
