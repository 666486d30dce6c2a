//! Display language codes and the supported-language table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Two-letter code of a supported display language.
///
/// Serialized as the lowercase code (`"en"`, `"am"`, ...), which is also
/// the form used inside cache keys — the code side of a key is
/// case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    /// English
    En,
    /// Amharic
    Am,
    /// Arabic
    Ar,
    /// Oromo
    Om,
    /// Tigrigna
    Ti,
}

impl LanguageCode {
    /// The lowercase two-letter code.
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Am => "am",
            LanguageCode::Ar => "ar",
            LanguageCode::Om => "om",
            LanguageCode::Ti => "ti",
        }
    }

    /// English display name, used when composing prompts.
    pub fn english_name(&self) -> &'static str {
        self.language().name
    }

    /// Full language table entry for this code.
    pub fn language(&self) -> &'static Language {
        SUPPORTED_LANGUAGES
            .iter()
            .find(|l| l.code == *self)
            .expect("every code has a table entry")
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A supported display language with its English and native names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: LanguageCode,
    /// English name, e.g. "Amharic".
    pub name: &'static str,
    /// Native name, e.g. "አማርኛ".
    pub native_name: &'static str,
}

/// All languages the lookup core can request results in.
pub const SUPPORTED_LANGUAGES: [Language; 5] = [
    Language {
        code: LanguageCode::En,
        name: "English",
        native_name: "English",
    },
    Language {
        code: LanguageCode::Am,
        name: "Amharic",
        native_name: "አማርኛ",
    },
    Language {
        code: LanguageCode::Ar,
        name: "Arabic",
        native_name: "العربية",
    },
    Language {
        code: LanguageCode::Om,
        name: "Oromo",
        native_name: "Afaan Oromoo",
    },
    Language {
        code: LanguageCode::Ti,
        name: "Tigrigna",
        native_name: "ትግርኛ",
    },
];

/// Language used when the caller expresses no preference.
pub const DEFAULT_LANGUAGE_CODE: LanguageCode = LanguageCode::En;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trips_through_serde() {
        let json = serde_json::to_string(&LanguageCode::Am).unwrap();
        assert_eq!(json, "\"am\"");
        let back: LanguageCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LanguageCode::Am);
    }

    #[test]
    fn every_code_has_a_table_entry() {
        for code in [
            LanguageCode::En,
            LanguageCode::Am,
            LanguageCode::Ar,
            LanguageCode::Om,
            LanguageCode::Ti,
        ] {
            assert_eq!(code.language().code, code);
        }
    }

    #[test]
    fn english_name_matches_table() {
        assert_eq!(LanguageCode::Om.english_name(), "Oromo");
    }
}
