//! Message engine
//!
//! Front door for hosts: parses a message (chains included), runs the
//! registered handlers, and returns the text to show the user.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ParserError;
use crate::executor::{ChainExecutor, ChainOutcome, Handler, HandlerContext, HandlerRegistry};
use crate::parser::CommandParser;
use crate::types::IntentDefinition;

/// Metadata a plugin ships with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub slots: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

fn default_author() -> String {
    "Unknown".to_string()
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

impl PluginInfo {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            author: default_author(),
            keywords: Vec::new(),
            patterns: Vec::new(),
            slots: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// The intent this plugin answers to, if it declares any triggers
    pub fn intent_definition(&self) -> Option<IntentDefinition> {
        if self.keywords.is_empty() && self.patterns.is_empty() {
            return None;
        }

        let keywords: Vec<String> = self.keywords.iter().map(|k| k.to_lowercase()).collect();
        Some(
            IntentDefinition::new(self.name.clone())
                .keywords(&as_strs(&keywords))
                .patterns(&as_strs(&self.patterns))
                .slots(&as_strs(&self.slots))
                .examples(&as_strs(&self.examples)),
        )
    }
}

/// A handler that brings its own intent
pub trait Plugin: Handler {
    fn info(&self) -> &PluginInfo;

    fn on_load(&self) {}

    fn on_unload(&self) {}
}

pub struct Engine {
    parser: CommandParser,
    handlers: RwLock<HandlerRegistry>,
    plugins: RwLock<IndexMap<String, Arc<dyn Plugin>>>,
}

impl Engine {
    pub fn new(parser: CommandParser) -> Self {
        Self {
            parser,
            handlers: RwLock::new(HandlerRegistry::new()),
            plugins: RwLock::new(IndexMap::new()),
        }
    }

    pub fn parser(&self) -> &CommandParser {
        &self.parser
    }

    /// Route an intent to a handler, replacing any previous one
    pub fn register_action(&self, intent: impl Into<String>, handler: Arc<dyn Handler>) {
        let intent = intent.into();
        info!(action = %intent, "registered action");
        self.handlers.write().register(intent, handler);
    }

    pub fn has_action(&self, intent: &str) -> bool {
        self.handlers.read().contains(intent)
    }

    /// Register a plugin's intent (if it declares one) and its handler
    pub fn install_plugin<P: Plugin + 'static>(&self, plugin: P) -> Result<(), ParserError> {
        let plugin = Arc::new(plugin);
        let info = plugin.info().clone();

        if let Some(definition) = info.intent_definition() {
            self.parser.register_intent(definition)?;
        }

        self.handlers
            .write()
            .register(info.name.clone(), plugin.clone() as Arc<dyn Handler>);
        plugin.on_load();
        self.plugins.write().insert(info.name.clone(), plugin);
        info!(plugin = %info.name, version = %info.version, "loaded plugin");
        Ok(())
    }

    /// Drop a plugin's handler. Its intent stays in the catalog.
    pub fn unload_plugin(&self, name: &str) -> bool {
        let Some(plugin) = self.plugins.write().shift_remove(name) else {
            return false;
        };
        self.handlers.write().remove(name);
        plugin.on_unload();
        info!(plugin = name, "unloaded plugin");
        true
    }

    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.plugins
            .read()
            .values()
            .map(|p| p.info().clone())
            .collect()
    }

    /// Load a user's learned corrections for the session
    pub async fn start_session(&self, user_id: &str) -> Result<usize, ParserError> {
        self.parser.load_user_patterns(user_id).await
    }

    /// Parse and execute one message, returning the reply text
    pub async fn handle_message(&self, text: &str, channel: &str, user_id: &str) -> String {
        let ctx = HandlerContext::new(user_id, channel);
        self.execute(text, &ctx).await.output
    }

    /// Parse and execute one message, returning per-stage detail
    pub async fn execute(&self, text: &str, ctx: &HandlerContext) -> ChainOutcome {
        let chain = self.parser.parse_chain(text, Some(ctx.user_id.as_str()));
        // Snapshot so no lock is held while handlers run
        let registry = self.handlers.read().clone();
        ChainExecutor::new(&registry).execute(chain, ctx).await
    }

    pub fn help_text(&self) -> String {
        let mut lines = vec!["Available commands:".to_string()];

        for intent in self.parser.intent_names() {
            if let Some(example) = self.parser.examples(&intent).first() {
                lines.push(format!("  • {}: {}", intent, example));
            }
        }

        lines.push(String::new());
        lines.push("Available actions:".to_string());
        lines.extend(
            self.handlers
                .read()
                .names()
                .map(|name| format!("  • {}", name)),
        );

        lines.join("\n")
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(CommandParser::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::executor::handler_fn;
    use crate::types::Params;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Hello {
        info: PluginInfo,
        unloaded: Arc<AtomicBool>,
    }

    impl Hello {
        fn new(unloaded: Arc<AtomicBool>) -> Self {
            let mut info = PluginInfo::new("hello", "1.0.0", "Says hello");
            info.keywords = vec!["hello".into(), "greet".into()];
            info.patterns = vec![r"^(?:hello|greet)\s+(\w+)$".into()];
            info.slots = vec!["name".into()];
            info.examples = vec!["hello world".into()];
            Self { info, unloaded }
        }
    }

    #[async_trait]
    impl Handler for Hello {
        async fn invoke(
            &self,
            params: Params,
            _ctx: &HandlerContext,
        ) -> Result<String, HandlerError> {
            let name = params.get("name").map(String::as_str).unwrap_or("World");
            Ok(format!("Hello, {}!", name))
        }
    }

    impl Plugin for Hello {
        fn info(&self) -> &PluginInfo {
            &self.info
        }

        fn on_unload(&self) {
            self.unloaded.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_handle_message_replies() {
        let engine = Engine::default();
        engine.register_action(
            "reminder",
            handler_fn(|params: Params, ctx| async move {
                Ok(format!(
                    "[{}@{}] {}",
                    ctx.user_id,
                    ctx.channel,
                    params.get("task").cloned().unwrap_or_default()
                ))
            }),
        );

        let reply = engine.handle_message("remind me to water plants", "cli", "u1").await;
        assert_eq!(reply, "[u1@cli] water plants");

        let reply = engine.handle_message("xyzzy plugh", "cli", "u1").await;
        assert_eq!(reply, "I didn't understand that command. Try 'help' to see what I can do.");
    }

    #[tokio::test]
    async fn test_plugin_lifecycle() {
        let engine = Engine::default();
        let unloaded = Arc::new(AtomicBool::new(false));
        engine.install_plugin(Hello::new(unloaded.clone())).unwrap();

        assert!(engine.parser().has_intent("hello"));
        assert_eq!(engine.plugins()[0].author, "Unknown");
        assert_eq!(
            engine.handle_message("greet Ada", "cli", "u1").await,
            "Hello, Ada!"
        );

        assert!(engine.unload_plugin("hello"));
        assert!(unloaded.load(Ordering::SeqCst));
        assert!(!engine.unload_plugin("hello"));
        assert!(engine.parser().has_intent("hello"));
        assert_eq!(
            engine.handle_message("greet Ada", "cli", "u1").await,
            "I understand you want to 'hello', but I don't have that action configured."
        );
    }

    #[test]
    fn test_plugin_with_bad_pattern_is_rejected() {
        let engine = Engine::default();
        let mut plugin = Hello::new(Arc::new(AtomicBool::new(false)));
        plugin.info.patterns = vec!["(".into()];
        assert!(engine.install_plugin(plugin).is_err());
        assert!(!engine.has_action("hello"));
        assert!(engine.plugins().is_empty());
    }

    #[test]
    fn test_plugin_without_triggers_has_no_intent() {
        let info = PluginInfo::new("quiet", "0.1.0", "No triggers");
        assert!(info.intent_definition().is_none());
    }

    #[test]
    fn test_help_text_lists_intents_and_actions() {
        let engine = Engine::default();
        engine.register_action(
            "weather",
            handler_fn(|_params, _ctx| async move { Ok("sunny".to_string()) }),
        );
        let help = engine.help_text();
        assert!(help.starts_with("Available commands:"));
        assert!(help.contains("  • reminder: remind me to call mom tomorrow at 3pm"));
        assert!(help.contains("Available actions:\n  • weather"));
    }
}
