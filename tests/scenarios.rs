//! End-to-end behavior of the parser and engine

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use intent_core::{
    handler_fn, ChainType, CommandParser, Engine, EntityExtractor, HandlerContext, HandlerError,
    InMemoryPatternStore, IntentCatalog, Params,
};

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 10)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn engine_with_handlers() -> Engine {
    let engine = Engine::default();
    engine.register_action(
        "crawl",
        handler_fn(|params: Params, _ctx| async move {
            Ok(format!("contents of {}", params.get("url").cloned().unwrap_or_default()))
        }),
    );
    engine.register_action(
        "summarize",
        handler_fn(|params: Params, _ctx| async move {
            Ok(format!("summary of [{}]", params.get("target").cloned().unwrap_or_default()))
        }),
    );
    engine.register_action(
        "reminder",
        handler_fn(|params: Params, _ctx| async move {
            Ok(format!("reminder set: {}", params.get("task").cloned().unwrap_or_default()))
        }),
    );
    engine
}

#[test]
fn every_example_matches_its_own_intent() {
    let parser = CommandParser::new();
    for intent in parser.intent_names() {
        for example in parser.examples(&intent) {
            let command = parser.parse(&example, None);
            assert_eq!(command.intent.as_deref(), Some(intent.as_str()), "{}", example);
            assert!(command.confidence >= 0.6, "{}: {}", example, command.confidence);
        }
    }
}

#[test]
fn language_packs_only_add_keywords() {
    let mut catalog = IntentCatalog::with_defaults();
    let before: Vec<(String, Vec<String>)> = catalog
        .entries()
        .map(|e| {
            let words = e.definition.keywords.iter().map(|k| k.text.clone()).collect();
            (e.definition.name.clone(), words)
        })
        .collect();

    let codes: Vec<&str> = intent_core::lang::supported_languages();
    catalog.load_languages(&codes);

    for (intent, words) in before {
        let after = catalog.get(&intent).unwrap();
        for word in words {
            assert!(after.has_keyword(&word), "{} lost '{}'", intent, word);
        }
    }
}

#[test]
fn loading_a_language_twice_is_idempotent() {
    let parser = CommandParser::new();
    assert!(parser.load_language("fr"));
    assert!(!parser.load_language("fr"));
    let loaded = parser.loaded_languages();
    assert_eq!(loaded.iter().filter(|code| *code == "fr").count(), 1);
    assert_eq!(loaded[0], "en");
}

#[test]
fn reminder_with_time_resolves_tomorrow() {
    let parser = CommandParser::new();
    let command = parser.parse_at("remind me to call mom tomorrow at 3pm", None, fixed_now());

    assert_eq!(command.intent.as_deref(), Some("reminder"));
    assert_eq!(command.params.get("task").map(String::as_str), Some("call mom"));
    let expected = NaiveDate::from_ymd_opt(2026, 3, 11)
        .unwrap()
        .and_hms_opt(15, 0, 0)
        .unwrap();
    assert_eq!(command.entities.datetime, Some(expected));
}

#[test]
fn unknown_text_has_no_intent() {
    let parser = CommandParser::new();
    let command = parser.parse("xyzzy plugh", None);
    assert!(command.intent.is_none());
    assert_eq!(command.confidence, 0.0);
}

#[test]
fn entity_extraction_is_total() {
    let extractor = EntityExtractor::new();
    for text in ["", "hello there", "   ", "nothing to see"] {
        let entities = extractor.extract_at(text, fixed_now());
        assert!(entities.is_empty(), "{:?}", text);
        assert_eq!(entities, extractor.extract_at(text, fixed_now()));
    }
}

#[tokio::test]
async fn pipe_feeds_crawl_output_into_summarize() {
    let engine = engine_with_handlers();
    let chain = engine
        .parser()
        .parse_chain("crawl https://example.com | summarize", None);
    assert_eq!(chain.chain_type, ChainType::Pipe);
    assert_eq!(chain.len(), 2);
    assert!(chain.commands[1].use_previous_output);

    let ctx = HandlerContext::new("u1", "cli");
    let outcome = engine
        .execute("crawl https://example.com | summarize", &ctx)
        .await;
    assert!(outcome.succeeded());
    assert_eq!(outcome.output, "summary of [contents of https://example.com]");
    let last = outcome.stages.last().unwrap();
    assert_eq!(last.result.as_deref().ok(), Some(outcome.output.as_str()));
}

#[tokio::test]
async fn sequence_reports_every_segment_even_after_failure() {
    let engine = engine_with_handlers();
    engine.register_action(
        "email",
        handler_fn(|_params, _ctx| async move { Err(HandlerError::failed("mailbox offline")) }),
    );

    let ctx = HandlerContext::new("u1", "cli");
    let outcome = engine.execute("check email; remind me to reply", &ctx).await;
    assert_eq!(outcome.chain_type, ChainType::Sequence);
    assert_eq!(outcome.stages.len(), 2);

    let blocks: Vec<&str> = outcome.output.split("\n\n---\n\n").collect();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0], "Sorry, that action failed: mailbox offline");
    assert_eq!(blocks[1], "reminder set: reply");
}

#[tokio::test]
async fn correction_overrides_matching_for_that_user() {
    let store = Arc::new(InMemoryPatternStore::new());
    let parser = CommandParser::new().with_store(store.clone());

    assert!(parser.parse("xyzzy plugh", Some("alice")).intent.is_none());
    parser
        .learn_correction("alice", "xyzzy plugh", "shell", None)
        .await
        .unwrap();

    let command = parser.parse("xyzzy plugh", Some("alice"));
    assert_eq!(command.intent.as_deref(), Some("shell"));
    assert_eq!(command.confidence, 0.98);
    assert!(parser.parse("xyzzy plugh", Some("bob")).intent.is_none());

    // A fresh parser picks the correction up from the store
    let restarted = CommandParser::new().with_store(store);
    assert_eq!(restarted.load_user_patterns("alice").await.unwrap(), 1);
    let command = restarted.parse("xyzzy plugh", Some("alice"));
    assert_eq!(command.intent.as_deref(), Some("shell"));
}

#[tokio::test]
async fn correction_beats_keyword_tables() {
    let parser = CommandParser::new();
    assert_eq!(parser.parse("check email", Some("u1")).intent.as_deref(), Some("email"));
    parser
        .learn_correction("u1", "check email", "calendar", None)
        .await
        .unwrap();
    let command = parser.parse("Check Email", Some("u1"));
    assert_eq!(command.intent.as_deref(), Some("calendar"));
    assert_eq!(command.confidence, 0.98);
}
