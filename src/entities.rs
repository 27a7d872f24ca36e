//! Slot and entity extraction from user input

use chrono::{Local, NaiveDateTime};
use regex::Regex;

use crate::catalog::CatalogEntry;
use crate::datetime;
use crate::types::{Entities, Number, Params};

/// Map the first matching pattern's capture groups onto the intent's slots.
///
/// Groups are assigned by position. Extra groups are ignored, missing or
/// empty ones leave their slot unset.
pub fn extract_slots(text: &str, entry: &CatalogEntry) -> Params {
    let mut params = Params::new();

    let Some(caps) = entry.regexes.iter().find_map(|re| re.captures(text)) else {
        return params;
    };

    for (i, slot) in entry.definition.slots.iter().enumerate() {
        let Some(group) = caps.get(i + 1) else {
            continue;
        };
        let value = group.as_str().trim();
        if !value.is_empty() {
            params.insert(slot.clone(), value.to_string());
        }
    }

    params
}

/// Extract intent-independent entities from user input
///
/// Finds URLs, email addresses, numbers and one date/time expression.
pub struct EntityExtractor {
    url: Regex,
    email: Regex,
    number: Regex,
}

impl EntityExtractor {
    pub fn new() -> Self {
        // Compile regex patterns once - these should never fail
        Self {
            url: Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("Invalid regex pattern"),
            email: Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
                .expect("Invalid regex pattern"),
            number: Regex::new(r"\b(\d+(?:\.\d+)?)\b").expect("Invalid regex pattern"),
        }
    }

    /// Extract relative to the local wall clock
    pub fn extract(&self, text: &str) -> Entities {
        self.extract_at(text, Local::now().naive_local())
    }

    /// Extract with dates resolved relative to `now`
    pub fn extract_at(&self, text: &str, now: NaiveDateTime) -> Entities {
        let urls: Vec<String> = self
            .url
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();

        let emails = self
            .email
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();

        // Ports and ids inside URLs are not numbers or times
        let without_urls = self.url.replace_all(text, "");

        let numbers = self
            .number
            .captures_iter(&without_urls)
            .filter_map(|cap| parse_number(cap.get(1)?.as_str()))
            .collect();

        Entities {
            urls,
            emails,
            numbers,
            datetime: datetime::resolve(&without_urls, now),
        }
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    if !raw.contains('.') {
        if let Ok(n) = raw.parse() {
            return Some(Number::Integer(n));
        }
    }
    // Integers past i64 degrade to a float rather than vanish
    raw.parse().ok().map(Number::Decimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IntentCatalog;
    use crate::types::IntentDefinition;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_reminder_slots() {
        let catalog = IntentCatalog::with_defaults();
        let entry = catalog.entry("reminder").unwrap();
        let params = extract_slots("Remind me to Call Mom tomorrow at 3pm", entry);
        assert_eq!(params.get("task").map(String::as_str), Some("Call Mom"));
        assert_eq!(params.get("time").map(String::as_str), Some("tomorrow at 3pm"));
    }

    #[test]
    fn test_slot_count_mismatch_is_tolerated() {
        let mut catalog = IntentCatalog::new();
        catalog
            .register(
                IntentDefinition::new("copy")
                    .patterns(&[r"copy (\S+) to (\S+) now( please)?"])
                    .slots(&["source"]),
            )
            .unwrap();
        catalog
            .register(
                IntentDefinition::new("move")
                    .patterns(&[r"move (\S+)"])
                    .slots(&["source", "dest", "mode"]),
            )
            .unwrap();

        let params = extract_slots("copy a.txt to b.txt now", catalog.entry("copy").unwrap());
        assert_eq!(params.len(), 1);
        assert_eq!(params["source"], "a.txt");

        let params = extract_slots("move a.txt", catalog.entry("move").unwrap());
        assert_eq!(params.len(), 1);
        assert!(!params.contains_key("dest"));
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let mut catalog = IntentCatalog::new();
        catalog
            .register(
                IntentDefinition::new("fetch")
                    .patterns(&[r"fetch (\w+)", r"fetch (\w+) from (\w+)"])
                    .slots(&["item", "source"]),
            )
            .unwrap();
        let params = extract_slots("fetch logs from prod", catalog.entry("fetch").unwrap());
        assert_eq!(params["item"], "logs");
        assert!(!params.contains_key("source"));
    }

    #[test]
    fn test_no_pattern_match_gives_empty_params() {
        let catalog = IntentCatalog::with_defaults();
        let params = extract_slots("xyzzy", catalog.entry("crawl").unwrap());
        assert!(params.is_empty());
    }

    #[test]
    fn test_extract_urls_emails_numbers() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract_at(
            "crawl https://example.com:8080/page/42 and mail bob@example.org 3 times, 2.5 each",
            now(),
        );
        assert_eq!(entities.urls, vec!["https://example.com:8080/page/42"]);
        assert_eq!(entities.emails, vec!["bob@example.org"]);
        assert_eq!(
            entities.numbers,
            vec![Number::Integer(3), Number::Decimal(2.5)]
        );
        assert_eq!(entities.datetime, None);
    }

    #[test]
    fn test_oversized_integer_is_kept() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract_at("order 12345678901234567890 widgets", now());
        let expected: f64 = "12345678901234567890".parse().unwrap();
        assert_eq!(entities.numbers, vec![Number::Decimal(expected)]);

        let entities = extractor.extract_at("order 42 widgets", now());
        assert_eq!(entities.numbers, vec![Number::Integer(42)]);
    }

    #[test]
    fn test_extract_datetime() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract_at("remind me to call mom tomorrow at 3pm", now());
        let expected = NaiveDate::from_ymd_opt(2026, 3, 11)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        assert_eq!(entities.datetime, Some(expected));
        // "3pm" has no word boundary after the digit
        assert!(entities.numbers.is_empty());
    }

    #[test]
    fn test_extract_on_plain_text_is_empty() {
        let extractor = EntityExtractor::new();
        let first = extractor.extract_at("hello there", now());
        assert!(first.is_empty());
        assert_eq!(first, extractor.extract_at("hello there", now()));
        assert!(extractor.extract_at("", now()).is_empty());
    }
}
