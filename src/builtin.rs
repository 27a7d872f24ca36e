//! Built-in English intent table
//!
//! Registration order matters: when two intents reach the same score the
//! earlier one wins, so the more specific intents sit ahead of the ones with
//! catch-all patterns.

use crate::types::IntentDefinition;

// Trailing date/time expression peeled off a reminder's task
const REMINDER_TAIL: &str =
    r"(?:\s+((?:at|on|in|by)\s+.+|(?:today|tonight|tomorrow|next\s+\w+)(?:\s+.+)?))?$";

/// Default intents, in registration order
pub fn default_intents() -> Vec<IntentDefinition> {
    vec![
        IntentDefinition::new("reminder")
            .keywords(&["remind", "reminder", "remember", "alert", "notify"])
            .patterns(&[
                format!(r"remind(?:\s+me)?\s+(?:to\s+|about\s+)?(.+?){}", REMINDER_TAIL).as_str(),
                format!(r"set\s+(?:a\s+)?reminder\s+(?:for\s+)?(.+?){}", REMINDER_TAIL).as_str(),
            ])
            .slots(&["task", "time"])
            .examples(&[
                "remind me to call mom tomorrow at 3pm",
                "set a reminder for meeting in 2 hours",
            ]),
        IntentDefinition::new("weather")
            .keywords(&["weather", "temperature", "forecast", "rain", "sunny", "cold", "hot"])
            .patterns(&[
                r"(?:what(?:'s|\s+is)\s+the\s+)?weather(?:\s+(?:in\s+)?(.+))?",
                r"(?:is|will)\s+it\s+(?:going\s+to\s+)?(?:rain|snow|be\s+\w+)(?:\s+(?:in\s+)?(.+))?",
            ])
            .slots(&["location", "time"])
            .examples(&[
                "what's the weather in NYC",
                "weather tomorrow",
                "is it going to rain",
            ]),
        IntentDefinition::new("summarize")
            .keywords(&["summarize", "summary", "tldr", "brief", "condense"])
            .patterns(&[
                r"summarize\s+(.+)",
                r"(?:give\s+me\s+)?(?:a\s+)?summary\s+of\s+(.+)",
                r"tldr\s+(.+)",
            ])
            .slots(&["target"])
            .examples(&[
                "summarize https://example.com/article",
                "give me a summary of this page",
                "tldr https://news.com/story",
            ]),
        IntentDefinition::new("crawl")
            .keywords(&["crawl", "scrape", "fetch", "grab", "extract", "get links"])
            .patterns(&[
                r"crawl\s+(.+)",
                r"(?:scrape|fetch|grab)\s+(?:links\s+from\s+)?(.+)",
                r"get\s+(?:all\s+)?links\s+from\s+(.+)",
                r"extract\s+(?:urls|links)\s+from\s+(.+)",
            ])
            .slots(&["url", "depth"])
            .examples(&[
                "crawl https://example.com",
                "get links from https://news.site.com",
                "scrape https://blog.com",
            ]),
        IntentDefinition::new("email")
            .keywords(&["email", "mail", "inbox", "unread", "send email"])
            .patterns(&[
                r"(?:check|show|list)\s+(?:my\s+)?(?:unread\s+)?emails?",
                r"send\s+(?:an?\s+)?email\s+to\s+(.+)",
                r"(?:what(?:'s|\s+is)\s+in\s+)?my\s+inbox",
            ])
            .slots(&["recipient", "subject", "body"])
            .examples(&[
                "check my email",
                "show unread emails",
                "send email to john@example.com",
            ]),
        IntentDefinition::new("calendar")
            .keywords(&["calendar", "schedule", "meeting", "event", "appointment"])
            .patterns(&[
                r"(?:show|what(?:'s|\s+is))\s+(?:on\s+)?my\s+(?:calendar|schedule)",
                r"(?:add|create|schedule)\s+(?:a\s+)?(?:meeting|event|appointment)\s+(.+)",
                r"(?:what(?:'s|\s+is)\s+happening|do\s+i\s+have\s+anything)(?:\s+(?:on\s+)?(.+))?",
            ])
            .slots(&["event", "time"])
            .examples(&[
                "what's on my calendar",
                "show my schedule for tomorrow",
                "add meeting with Bob at 2pm",
            ]),
        IntentDefinition::new("shell")
            .keywords(&["run", "execute", "shell", "command", "terminal"])
            .patterns(&[
                r#"run\s+(?:command\s+)?[`'"]?(.+?)[`'"]?$"#,
                r#"execute\s+[`'"]?(.+?)[`'"]?$"#,
                r#"shell\s+[`'"]?(.+?)[`'"]?$"#,
            ])
            .slots(&["command"])
            .examples(&["run ls -la", "execute 'git status'", "shell df -h"]),
        IntentDefinition::new("files")
            .keywords(&["file", "files", "folder", "directory", "list", "find", "search"])
            .patterns(&[
                r"(?:list|show)\s+(?:(\*?\.?\w+)\s+)?files\s+in\s+(.+)",
                r"find\s+(?:files?\s+)?(.+?)(?:\s+in\s+(.+))?$",
                r"search\s+(?:for\s+)?(.+?)(?:\s+in\s+(.+))?$",
            ])
            .slots(&["pattern", "path"])
            .examples(&[
                "list files in ~/Documents",
                "find *.py in ~/projects",
                "search for config files",
            ]),
        IntentDefinition::new("smarthome")
            .keywords(&["light", "lights", "lamp", "turn on", "turn off", "dim", "bright"])
            .patterns(&[
                r"turn\s+(on|off)\s+(?:the\s+)?(.+?)(?:\s+lights?)?$",
                r"(dim|set)\s+(?:the\s+)?(.+?)\s+(?:lights?\s+)?to\s+(\d+)\s*%?",
                r"(brighten|darken)\s+(?:the\s+)?(.+?)(?:\s+lights?)?$",
            ])
            .slots(&["action", "room", "level"])
            .examples(&[
                "turn on living room lights",
                "turn off bedroom",
                "dim kitchen to 50%",
            ]),
        IntentDefinition::new("briefing")
            .keywords(&["briefing", "brief", "morning", "daily", "update"])
            .patterns(&[
                r"(?:morning|daily|evening)\s+briefing",
                r"(?:give\s+me\s+)?(?:my\s+)?(?:daily\s+)?(?:briefing|update)",
                r"what(?:'s|\s+did\s+i)\s+miss",
            ])
            .examples(&["morning briefing", "give me my daily update", "what did I miss"]),
        IntentDefinition::new("help")
            .keywords(&["help", "commands", "what can you do", "how to"])
            .patterns(&[
                r"^help$",
                r"(?:show\s+)?(?:available\s+)?commands",
                r"what\s+can\s+you\s+do",
            ])
            .examples(&["help", "show commands", "what can you do"]),
        IntentDefinition::new("webhook")
            .keywords(&["webhook", "hook", "trigger", "api"])
            .patterns(&[
                r"(?:create|add|set\s+up)\s+(?:a\s+)?webhook\s+(?:for\s+)?(.+)",
                r"(?:list|show)\s+webhooks",
                r"trigger\s+webhook\s+(.+)",
            ])
            .slots(&["name", "url", "action"])
            .examples(&[
                "create a webhook for deployments",
                "list webhooks",
                "trigger webhook build",
            ]),
        IntentDefinition::new("news")
            .keywords(&["news", "headlines", "feed", "feeds", "rss"])
            .patterns(&[
                r"^news$",
                r"(?:show|get|fetch)\s+(?:me\s+)?(?:the\s+)?(?:news|headlines)(?:\s+(?:about|on|for)\s+(\w+))?",
                r"news\s+(?:from\s+)?(\w+)",
                r"(?:add|import)\s+(?:rss\s+)?feed\s+(?:(\w+)\s+)?(https?://\S+)",
                r"read\s+(?:article\s+)?(?:(\w+)\s+)?(https?://\S+)",
            ])
            .slots(&["category", "url"])
            .examples(&[
                "news",
                "show me the headlines",
                "news tech",
                "add feed https://blog.example.com/rss",
            ]),
        IntentDefinition::new("analyze")
            .keywords(&["analyze", "sentiment", "keywords", "readability", "tone"])
            .patterns(&[
                r"analyze\s+(?:sentiment\s+)?(?:of\s+)?(.+)",
                r"(?:what(?:'s|\s+is)\s+the\s+)?sentiment\s+(?:of\s+)?(.+)",
                r"(?:extract|get)\s+keywords\s+(?:from\s+)?(.+)",
                r"(?:check|measure)\s+readability\s+(?:of\s+)?(.+)",
            ])
            .slots(&["target", "type"])
            .examples(&[
                "analyze sentiment of this text",
                "what's the sentiment of this article",
                "extract keywords from document.txt",
                "check readability of my essay",
            ]),
        IntentDefinition::new("document")
            .keywords(&["document", "pdf", "docx", "read file", "extract text"])
            .patterns(&[
                r"(?:read|open|extract)\s+(?:text\s+from\s+)?(?:document\s+)?(.+\.(?:pdf|docx?|txt|md|html?))\b",
                r"(?:what(?:'s|\s+is)\s+in\s+)?(.+\.(?:pdf|docx?|txt|md|html?))\b",
            ])
            .slots(&["path"])
            .examples(&[
                "read document.pdf",
                "extract text from report.docx",
                "what's in notes.txt",
            ]),
        IntentDefinition::new("notify")
            .keywords(&["notify", "notification", "alert", "desktop"])
            .patterns(&[
                r"(?:send\s+)?notification\s+(.+)",
                r"notify\s+(?:me\s+)?(?:that\s+)?(.+)",
                r"(?:show\s+)?(?:notification\s+)?history",
            ])
            .slots(&["message", "priority"])
            .examples(&[
                "send notification Task complete",
                "notify me that the build finished",
                "notification history",
            ]),
        IntentDefinition::new("vision")
            .keywords(&["detect", "objects", "what's in", "identify", "yolo", "image"])
            .patterns(&[
                r"(?:detect|find|identify)\s+(?:objects\s+)?(?:in\s+)?(.+\.(?:jpg|jpeg|png|gif|webp))\b",
                r"what(?:'s|\s+is)\s+in\s+(?:this\s+)?(?:image|photo|picture)\s*(.+)?",
                r"(?:analyze|describe)\s+(?:this\s+)?(?:image|photo)\s*(.+)?",
            ])
            .slots(&["path"])
            .examples(&[
                "detect objects in photo.jpg",
                "what's in this image",
                "identify objects in screenshot.png",
            ]),
        IntentDefinition::new("ocr")
            .keywords(&["ocr", "extract text", "read text", "scan"])
            .patterns(&[
                r"(?:ocr|scan|extract\s+text)\s+(?:from\s+)?(.+\.(?:jpg|jpeg|png|gif|webp|pdf))\b",
                r"(?:read|get)\s+text\s+from\s+(?:image\s+)?(.+)",
                r"what\s+(?:does|do)\s+(?:it|this)\s+say",
            ])
            .slots(&["path"])
            .examples(&[
                "ocr photo.jpg",
                "extract text from screenshot.png",
                "read text from receipt.jpg",
            ]),
        IntentDefinition::new("entities")
            .keywords(&["entities", "ner", "people", "places", "organizations", "extract names"])
            .patterns(&[
                r"(?:extract|find|get)\s+(?:named\s+)?entities\s+(?:from\s+)?(.+)",
                r"(?:who|what)\s+(?:people|organizations?|places?|locations?)\s+(?:are\s+)?(?:in|mentioned)\s+(.+)",
                r"\bner\s+(.+)",
            ])
            .slots(&["target"])
            .examples(&[
                "extract entities from this article",
                "what people are mentioned in this report",
                "what organizations are in this text",
            ]),
    ]
}

/// Conversational phrase variants per intent, in matching order
pub fn default_phrases() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        (
            "reminder",
            &[
                "don't let me forget",
                "make sure i",
                "ping me",
                "tell me to",
                "remind me about",
                "i need to remember",
                "can you remind",
                "heads up about",
                "don't forget to",
                "note to self",
            ],
        ),
        (
            "weather",
            &[
                "how's the weather",
                "what's it like outside",
                "is it raining",
                "should i bring umbrella",
                "do i need a jacket",
                "temperature outside",
                "how hot is it",
                "how cold is it",
                "weather check",
            ],
        ),
        (
            "crawl",
            &[
                "what links are on",
                "show me links from",
                "find urls on",
                "list links on",
                "what pages link to",
                "scan website",
                "spider",
                "follow links",
            ],
        ),
        (
            "email",
            &[
                "any new mail",
                "new messages",
                "did i get mail",
                "any emails",
                "message from",
                "write email",
                "compose email",
                "mail to",
            ],
        ),
        (
            "calendar",
            &[
                "what's happening",
                "am i busy",
                "do i have anything",
                "free time",
                "book a meeting",
                "set up meeting",
                "schedule with",
                "my day",
                "today's events",
            ],
        ),
        (
            "news",
            &[
                "what's new",
                "latest news",
                "what's going on",
                "current events",
                "top stories",
                "breaking news",
                "recent news",
            ],
        ),
        (
            "briefing",
            &[
                "catch me up",
                "what's happening today",
                "daily digest",
                "morning summary",
                "start my day",
                "anything i should know",
                "overview for today",
            ],
        ),
        (
            "help",
            &[
                "what do you do",
                "how does this work",
                "show options",
                "list features",
                "what are my options",
                "menu",
                "capabilities",
            ],
        ),
        (
            "summarize",
            &[
                "sum up",
                "quick summary",
                "give me the gist",
                "main points",
                "key takeaways",
                "in a nutshell",
                "cliff notes",
                "the short version",
            ],
        ),
        ("shell", &["terminal", "cmd", "cli", "bash", "run this", "exec"]),
        (
            "smarthome",
            &[
                "switch on",
                "switch off",
                "lights on",
                "lights off",
                "make it brighter",
                "make it darker",
                "adjust lights",
            ],
        ),
    ]
}
