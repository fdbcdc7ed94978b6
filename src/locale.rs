//! Localized UI strings
//!
//! Three static tables (English, Telugu, Tamil) embedded from
//! `assets/locales/*.json`. A key missing from the selected language falls
//! back to English; a key missing everywhere resolves to itself so no UI text
//! is ever blank.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::utils::error::{PlantVillageError, Result};

const EMBEDDED_EN: &str = include_str!("../assets/locales/en.json");
const EMBEDDED_TE: &str = include_str!("../assets/locales/te.json");
const EMBEDDED_TA: &str = include_str!("../assets/locales/ta.json");

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Telugu,
    Tamil,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Telugu, Language::Tamil];

    /// Short code used in URLs (`?lang=te`)
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Telugu => "te",
            Language::Tamil => "ta",
        }
    }

    /// Name of the language in that language, for the selector
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Telugu => "తెలుగు",
            Language::Tamil => "தமிழ்",
        }
    }

    /// Parse a code or English name, `None` if unsupported
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "te" | "telugu" => Some(Language::Telugu),
            "ta" | "tamil" => Some(Language::Tamil),
            _ => None,
        }
    }
}

impl FromStr for Language {
    type Err = PlantVillageError;

    fn from_str(s: &str) -> Result<Self> {
        Language::from_code(s)
            .ok_or_else(|| PlantVillageError::Config(format!("unsupported language '{}'", s)))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// (language, key) -> text
#[derive(Debug, Clone)]
pub struct LocaleTable {
    tables: HashMap<Language, HashMap<String, String>>,
    default_language: Language,
}

impl LocaleTable {
    /// Build from per-language JSON objects of key -> text
    pub fn from_json(sources: &[(Language, &str)], default_language: Language) -> Result<Self> {
        let mut tables = HashMap::new();
        for (language, json) in sources {
            let table: HashMap<String, String> = serde_json::from_str(json)?;
            tables.insert(*language, table);
        }

        if !tables.contains_key(&default_language) {
            return Err(PlantVillageError::Config(format!(
                "no strings for default language '{}'",
                default_language
            )));
        }

        Ok(Self {
            tables,
            default_language,
        })
    }

    /// The tables compiled into the binary, parsed on first use
    pub fn embedded() -> Result<&'static LocaleTable> {
        static EMBEDDED: OnceCell<LocaleTable> = OnceCell::new();
        EMBEDDED.get_or_try_init(|| {
            Self::from_json(
                &[
                    (Language::English, EMBEDDED_EN),
                    (Language::Telugu, EMBEDDED_TE),
                    (Language::Tamil, EMBEDDED_TA),
                ],
                Language::English,
            )
        })
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    /// Text in `language` or the default language, `None` if neither has `key`
    pub fn try_text(&self, language: Language, key: &str) -> Option<&str> {
        self.lookup(language, key)
            .or_else(|| self.lookup(self.default_language, key))
    }

    /// Resolved text; the key itself when no table defines it
    pub fn text<'a>(&'a self, language: Language, key: &'a str) -> &'a str {
        self.try_text(language, key).unwrap_or(key)
    }

    /// Every key defined in any language
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .tables
            .values()
            .flat_map(|table| table.keys().map(String::as_str))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Keys the default language defines but `language` does not
    pub fn untranslated(&self, language: Language) -> Vec<&str> {
        let Some(default) = self.tables.get(&self.default_language) else {
            return Vec::new();
        };
        let mut keys: Vec<&str> = default
            .keys()
            .filter(|key| self.lookup(language, key).is_none())
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Fully resolved key -> text map for one language (what page templates see)
    pub fn strings(&self, language: Language) -> BTreeMap<&str, &str> {
        self.keys()
            .into_iter()
            .map(|key| (key, self.text(language, key)))
            .collect()
    }

    fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        self.tables
            .get(&language)
            .and_then(|table| table.get(key))
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }
}
