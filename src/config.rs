// Detector configuration
//
// Keyword and URL-pattern vocabulary plus dedup tuning. Loaded once at
// startup from JSON (or the built-in defaults) and compiled into a
// read-only `Vocabulary` shared by the classifier.

use crate::error::{Error, Result};
use crate::models::Tool;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_KEYWORDS: &[&str] = &[
    "email", "e-mail", "mail", "email_address", "emailAddress",
    "new_email", "newEmail", "newemail", "new_email_address",
    "change_email", "changeEmail", "changeemail",
    "update_email", "updateEmail", "updateemail",
    "user_email", "userEmail", "useremail",
    "account_email", "accountEmail", "accountemail",
    "old_email", "oldEmail", "current_email", "currentEmail",
];

const DEFAULT_URL_PATTERNS: &[&str] = &[
    ".*change.*email.*",
    ".*update.*email.*",
    ".*modify.*email.*",
    ".*edit.*email.*",
    ".*email.*change.*",
    ".*email.*update.*",
    ".*profile.*email.*",
    ".*account.*email.*",
    ".*settings.*email.*",
    ".*user.*email.*",
];

/// Dedup window settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupSettings {
    /// Width of a dedup bucket in seconds
    pub bucket_secs: u64,
    /// The cache is cleared wholesale once it holds more keys than this
    pub max_entries: usize,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            bucket_secs: 10,
            max_entries: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Case-insensitive substrings matched against parameter names and bodies
    pub keywords: Vec<String>,
    /// Case-insensitive whole-string regexes matched against the URL
    pub url_patterns: Vec<String>,
    pub dedup: DedupSettings,
    /// Requests delivered by these tools are ignored
    pub skip_tools: Vec<Tool>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            url_patterns: DEFAULT_URL_PATTERNS.iter().map(|s| s.to_string()).collect(),
            dedup: DedupSettings::default(),
            skip_tools: vec![Tool::Intruder],
        }
    }
}

impl DetectorConfig {
    /// Read a JSON config file. Missing fields take their default values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: DetectorConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

/// A keyword together with its body email-shape check
#[derive(Debug, Clone)]
pub struct Keyword {
    /// Lower-cased keyword text
    pub text: String,
    /// `keyword ... @ ... .` with no line terminator in between
    pub email_shape: Regex,
}

/// Compiled, read-only form of `DetectorConfig`'s vocabulary
#[derive(Debug, Clone)]
pub struct Vocabulary {
    keywords: Vec<Keyword>,
    url_patterns: Vec<Regex>,
}

lazy_static! {
    static ref BUILTIN: Vocabulary = Vocabulary::compile(&DetectorConfig::default())
        .expect("built-in vocabulary compiles");
}

impl Vocabulary {
    pub fn compile(config: &DetectorConfig) -> Result<Self> {
        let mut keywords: Vec<Keyword> = Vec::new();
        for raw in &config.keywords {
            let text = raw.to_lowercase();
            if text.is_empty() || keywords.iter().any(|k| k.text == text) {
                continue;
            }
            let shape = format!(
                r"{kw}{line}@{line}\.",
                kw = regex::escape(&text),
                line = r"[^\r\n\x{85}\x{2028}\x{2029}]*"
            );
            let email_shape = Regex::new(&shape).map_err(|source| Error::InvalidPattern {
                pattern: shape.clone(),
                source,
            })?;
            keywords.push(Keyword { text, email_shape });
        }

        let url_patterns = config
            .url_patterns
            .iter()
            .map(|p| {
                Regex::new(&format!("(?i)^(?:{})$", p)).map_err(|source| {
                    Error::InvalidPattern {
                        pattern: p.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            keywords,
            url_patterns,
        })
    }

    /// The vocabulary compiled from `DetectorConfig::default()`
    pub fn builtin() -> &'static Vocabulary {
        &BUILTIN
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn url_patterns(&self) -> &[Regex] {
        &self.url_patterns
    }

    /// True if the (already lower-cased) name contains any keyword
    pub fn name_matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(&k.text))
    }
}
