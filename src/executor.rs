//! Chain execution
//!
//! Hands each parsed command to the handler registered for its intent.
//! Pipe stages run strictly in order and feed their output forward; sequence
//! stages are independent and run concurrently, reported in segment order.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::HandlerError;
use crate::types::{
    ChainType, CommandChain, Params, ParsedCommand, TARGET_PARAM, USE_PREVIOUS_PARAM,
};

/// Separator between sequence result blocks
pub const SEQUENCE_SEPARATOR: &str = "\n\n---\n\n";

/// Who asked, and from where
#[derive(Debug, Clone, Default)]
pub struct HandlerContext {
    pub user_id: String,
    pub channel: String,
    /// Free-form per-session values supplied by the host
    pub session: BTreeMap<String, String>,
}

impl HandlerContext {
    pub fn new(user_id: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            channel: channel.into(),
            session: BTreeMap::new(),
        }
    }
}

/// The operation behind an intent
#[async_trait]
pub trait Handler: Send + Sync {
    /// Reject parameters before `invoke` runs
    fn validate(&self, _params: &Params) -> Result<(), HandlerError> {
        Ok(())
    }

    async fn invoke(&self, params: Params, ctx: &HandlerContext) -> Result<String, HandlerError>;
}

/// Adapter turning an async closure into a `Handler`
pub struct FnHandler<F>(F);

/// Wrap `f(params, ctx)` as a handler
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Params, HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, HandlerError>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Params, HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, HandlerError>> + Send + 'static,
{
    async fn invoke(&self, params: Params, ctx: &HandlerContext) -> Result<String, HandlerError> {
        (self.0)(params, ctx.clone()).await
    }
}

/// Intent name -> handler, in registration order
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: IndexMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, returning the one it replaced
    pub fn register(
        &mut self,
        intent: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Option<Arc<dyn Handler>> {
        self.handlers.insert(intent.into(), handler)
    }

    pub fn remove(&mut self, intent: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.shift_remove(intent)
    }

    pub fn get(&self, intent: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(intent).cloned()
    }

    pub fn contains(&self, intent: &str) -> bool {
        self.handlers.contains_key(intent)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Why a stage produced no output. Display is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageFailure {
    #[error("I didn't understand that command. Try 'help' to see what I can do.")]
    NotUnderstood,
    #[error("I understand you want to '{0}', but I don't have that action configured.")]
    NoHandler(String),
    #[error("Sorry, that action failed: {0}")]
    Handler(HandlerError),
}

/// What happened to one command of a chain
#[derive(Debug, Clone)]
pub struct StageReport {
    pub index: usize,
    pub raw_text: String,
    pub intent: Option<String>,
    pub result: Result<String, StageFailure>,
}

impl StageReport {
    /// Output, or the failure message
    pub fn text(&self) -> String {
        match &self.result {
            Ok(output) => output.clone(),
            Err(failure) => failure.to_string(),
        }
    }
}

/// Result of running a whole chain
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub chain_type: ChainType,
    pub stages: Vec<StageReport>,
    /// Text to show the user
    pub output: String,
}

impl ChainOutcome {
    pub fn succeeded(&self) -> bool {
        self.stages.iter().all(|s| s.result.is_ok())
    }

    /// Index of the stage a pipe chain stopped at
    pub fn halted_at(&self) -> Option<usize> {
        match self.chain_type {
            ChainType::Pipe => self.stages.iter().position(|s| s.result.is_err()),
            _ => None,
        }
    }
}

pub struct ChainExecutor<'a> {
    registry: &'a HandlerRegistry,
}

impl<'a> ChainExecutor<'a> {
    pub fn new(registry: &'a HandlerRegistry) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, chain: CommandChain, ctx: &HandlerContext) -> ChainOutcome {
        let chain_type = chain.chain_type;
        let outcome = match chain_type {
            ChainType::Pipe => self.run_pipe(chain.commands, ctx).await,
            ChainType::Sequence => self.run_sequence(chain.commands, ctx).await,
            ChainType::Single => self.run_single(chain.commands, ctx).await,
        };
        debug!(
            chain_type = %chain_type,
            stages = outcome.stages.len(),
            succeeded = outcome.succeeded(),
            "executed chain"
        );
        outcome
    }

    async fn run_single(&self, commands: Vec<ParsedCommand>, ctx: &HandlerContext) -> ChainOutcome {
        let stages = match commands.into_iter().next() {
            Some(command) => vec![self.run_stage(0, command, ctx).await],
            None => Vec::new(),
        };
        let output = stages.first().map(StageReport::text).unwrap_or_default();
        ChainOutcome {
            chain_type: ChainType::Single,
            stages,
            output,
        }
    }

    async fn run_pipe(&self, commands: Vec<ParsedCommand>, ctx: &HandlerContext) -> ChainOutcome {
        let total = commands.len();
        let mut stages: Vec<StageReport> = Vec::with_capacity(total);
        let mut previous: Option<String> = None;

        for (index, mut command) in commands.into_iter().enumerate() {
            if command.use_previous_output {
                if let Some(output) = &previous {
                    let requested = command.params.remove(USE_PREVIOUS_PARAM).is_some();
                    if requested || !command.params.contains_key(TARGET_PARAM) {
                        command.params.insert(TARGET_PARAM.to_string(), output.clone());
                    }
                }
            }

            let report = self.run_stage(index, command, ctx).await;
            let halted = report.result.is_err();
            if let Ok(output) = &report.result {
                previous = Some(output.clone());
            }
            stages.push(report);
            if halted {
                break;
            }
        }

        let note = stages
            .last()
            .filter(|s| s.result.is_err())
            .map(|s| format!("Chain stopped at step {} of {}: {}", s.index + 1, total, s.text()));

        let output = match (previous, note) {
            (Some(output), None) => output,
            (Some(output), Some(note)) => format!("{}\n\n{}", output, note),
            (None, Some(note)) => note,
            (None, None) => String::new(),
        };

        ChainOutcome {
            chain_type: ChainType::Pipe,
            stages,
            output,
        }
    }

    async fn run_sequence(
        &self,
        commands: Vec<ParsedCommand>,
        ctx: &HandlerContext,
    ) -> ChainOutcome {
        let stages = join_all(
            commands
                .into_iter()
                .enumerate()
                .map(|(index, command)| self.run_stage(index, command, ctx)),
        )
        .await;

        let output = stages
            .iter()
            .map(StageReport::text)
            .collect::<Vec<_>>()
            .join(SEQUENCE_SEPARATOR);

        ChainOutcome {
            chain_type: ChainType::Sequence,
            stages,
            output,
        }
    }

    async fn run_stage(
        &self,
        index: usize,
        command: ParsedCommand,
        ctx: &HandlerContext,
    ) -> StageReport {
        let ParsedCommand {
            raw_text,
            intent,
            params,
            ..
        } = command;

        let result = match intent.as_deref() {
            None => Err(StageFailure::NotUnderstood),
            Some(name) => match self.registry.get(name) {
                None => Err(StageFailure::NoHandler(name.to_string())),
                Some(handler) => invoke(handler.as_ref(), params, ctx).await.map_err(|e| {
                    warn!(intent = name, error = %e, "action failed");
                    StageFailure::Handler(e)
                }),
            },
        };

        StageReport {
            index,
            raw_text,
            intent,
            result,
        }
    }
}

async fn invoke(
    handler: &dyn Handler,
    params: Params,
    ctx: &HandlerContext,
) -> Result<String, HandlerError> {
    handler.validate(&params)?;
    handler.invoke(params, ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CommandParser;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn echo() -> Arc<dyn Handler> {
        handler_fn(|params: Params, _ctx| async move {
            Ok(params.get(TARGET_PARAM).cloned().unwrap_or_else(|| "echo".to_string()))
        })
    }

    fn registry() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.register(
            "crawl",
            handler_fn(|params: Params, _ctx| async move {
                Ok(format!("PAGE({})", params.get("url").cloned().unwrap_or_default()))
            }),
        );
        registry.register(
            "summarize",
            handler_fn(|params: Params, _ctx| async move {
                Ok(format!("SUMMARY({})", params.get(TARGET_PARAM).cloned().unwrap_or_default()))
            }),
        );
        registry.register(
            "email",
            handler_fn(|_params, _ctx| async move { Err(HandlerError::failed("mailbox offline")) }),
        );
        registry.register(
            "reminder",
            handler_fn(|params: Params, _ctx| async move {
                Ok(format!("Reminder set: {}", params.get("task").cloned().unwrap_or_default()))
            }),
        );
        registry
    }

    fn ctx() -> HandlerContext {
        HandlerContext::new("u1", "cli")
    }

    #[tokio::test]
    async fn test_pipe_threads_output() {
        let parser = CommandParser::new();
        let registry = registry();
        let chain = parser.parse_chain("crawl https://example.com | summarize", None);

        let outcome = ChainExecutor::new(&registry).execute(chain, &ctx()).await;
        assert!(outcome.succeeded());
        assert_eq!(outcome.output, "SUMMARY(PAGE(https://example.com))");
        assert_eq!(outcome.stages[1].text(), outcome.output);
    }

    #[tokio::test]
    async fn test_pipe_keeps_explicit_target() {
        let parser = CommandParser::new();
        let registry = registry();
        let chain = parser.parse_chain("crawl https://a.com | summarize https://b.com", None);

        let outcome = ChainExecutor::new(&registry).execute(chain, &ctx()).await;
        assert_eq!(outcome.output, "SUMMARY(https://b.com)");
    }

    #[tokio::test]
    async fn test_pipe_halts_on_failure() {
        let parser = CommandParser::new();
        let registry = registry();
        let chain = parser.parse_chain("crawl https://example.com | check email | summarize", None);

        let outcome = ChainExecutor::new(&registry).execute(chain, &ctx()).await;
        assert_eq!(outcome.stages.len(), 2);
        assert_eq!(outcome.halted_at(), Some(1));
        assert!(outcome.output.starts_with("PAGE(https://example.com)"));
        assert!(outcome.output.contains("step 2 of 3"));
        assert!(outcome.output.contains("mailbox offline"));
    }

    #[tokio::test]
    async fn test_pipe_failing_first_stage() {
        let parser = CommandParser::new();
        let registry = registry();
        let chain = parser.parse_chain("check email | summarize", None);

        let outcome = ChainExecutor::new(&registry).execute(chain, &ctx()).await;
        assert_eq!(outcome.stages.len(), 1);
        assert_eq!(
            outcome.output,
            "Chain stopped at step 1 of 2: Sorry, that action failed: mailbox offline"
        );
    }

    #[tokio::test]
    async fn test_sequence_runs_every_stage() {
        let parser = CommandParser::new();
        let registry = registry();
        let chain = parser.parse_chain("check email; remind me to reply", None);

        let outcome = ChainExecutor::new(&registry).execute(chain, &ctx()).await;
        assert_eq!(outcome.stages.len(), 2);
        assert!(!outcome.succeeded());
        let blocks: Vec<&str> = outcome.output.split(SEQUENCE_SEPARATOR).collect();
        assert_eq!(
            blocks,
            vec!["Sorry, that action failed: mailbox offline", "Reminder set: reply"]
        );
        assert_eq!(outcome.halted_at(), None);
    }

    #[tokio::test]
    async fn test_sequence_order_follows_segments() {
        let mut registry = HandlerRegistry::new();
        registry.register(
            "slow",
            handler_fn(|_params, _ctx| async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok("slow".to_string())
            }),
        );
        registry.register(
            "fast",
            handler_fn(|_params, _ctx| async move { Ok("fast".to_string()) }),
        );

        let parser = CommandParser::new();
        parser
            .register_intent(crate::types::IntentDefinition::new("slow").keywords(&["tortoise"]))
            .unwrap();
        parser
            .register_intent(crate::types::IntentDefinition::new("fast").keywords(&["hare"]))
            .unwrap();

        let chain = parser.parse_chain("tortoise then hare", None);
        let outcome = ChainExecutor::new(&registry).execute(chain, &ctx()).await;
        assert_eq!(outcome.output, format!("slow{}fast", SEQUENCE_SEPARATOR));
    }

    #[tokio::test]
    async fn test_single_command_messages() {
        let parser = CommandParser::new();
        let registry = registry();
        let executor = ChainExecutor::new(&registry);

        let outcome = executor.execute(parser.parse_chain("xyzzy plugh", None), &ctx()).await;
        assert_eq!(outcome.stages[0].result, Err(StageFailure::NotUnderstood));
        assert_eq!(
            outcome.output,
            "I didn't understand that command. Try 'help' to see what I can do."
        );

        let chain = parser.parse_chain("what's the weather", None);
        let outcome = executor.execute(chain, &ctx()).await;
        assert_eq!(
            outcome.output,
            "I understand you want to 'weather', but I don't have that action configured."
        );

        let chain = parser.parse_chain("remind me to stretch", None);
        let outcome = executor.execute(chain, &ctx()).await;
        assert_eq!(outcome.output, "Reminder set: stretch");
    }

    #[tokio::test]
    async fn test_validation_runs_before_invoke() {
        struct Strict {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl Handler for Strict {
            fn validate(&self, params: &Params) -> Result<(), HandlerError> {
                if params.contains_key("command") {
                    Ok(())
                } else {
                    Err(HandlerError::InvalidParams("command is required".into()))
                }
            }

            async fn invoke(
                &self,
                _params: Params,
                _ctx: &HandlerContext,
            ) -> Result<String, HandlerError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok("ran".into())
            }
        }

        let strict = Arc::new(Strict {
            calls: AtomicUsize::new(0),
        });
        let mut registry = HandlerRegistry::new();
        registry.register("shell", strict.clone());

        let parser = CommandParser::new();
        let executor = ChainExecutor::new(&registry);

        let outcome = executor.execute(parser.parse_chain("terminal", None), &ctx()).await;
        assert_eq!(
            outcome.output,
            "Sorry, that action failed: invalid parameters: command is required"
        );
        assert_eq!(strict.calls.load(Ordering::SeqCst), 0);

        let outcome = executor.execute(parser.parse_chain("run ls -la", None), &ctx()).await;
        assert_eq!(outcome.output, "ran");
        assert_eq!(strict.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_registry_replace_and_remove() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.register("a", echo()).is_none());
        assert!(registry.register("b", echo()).is_none());
        assert!(registry.register("a", echo()).is_some());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(registry.remove("a").is_some());
        assert!(!registry.contains("a"));
        assert_eq!(registry.len(), 1);
    }
}
