use lingua::{Language, LanguageDetectorBuilder};
use std::str::FromStr;

/// Language tags understood by the XTTS backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageCode {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Polish,
    Turkish,
    Russian,
    Dutch,
    Czech,
    Arabic,
    Chinese,
    Japanese,
    Hungarian,
    Korean,
    Hindi,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 17] = [
        LanguageCode::English,
        LanguageCode::Spanish,
        LanguageCode::French,
        LanguageCode::German,
        LanguageCode::Italian,
        LanguageCode::Portuguese,
        LanguageCode::Polish,
        LanguageCode::Turkish,
        LanguageCode::Russian,
        LanguageCode::Dutch,
        LanguageCode::Czech,
        LanguageCode::Arabic,
        LanguageCode::Chinese,
        LanguageCode::Japanese,
        LanguageCode::Hungarian,
        LanguageCode::Korean,
        LanguageCode::Hindi,
    ];

    /// The tag passed on the backend command line
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Spanish => "es",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Italian => "it",
            LanguageCode::Portuguese => "pt",
            LanguageCode::Polish => "pl",
            LanguageCode::Turkish => "tr",
            LanguageCode::Russian => "ru",
            LanguageCode::Dutch => "nl",
            LanguageCode::Czech => "cs",
            LanguageCode::Arabic => "ar",
            LanguageCode::Chinese => "zh-cn",
            LanguageCode::Japanese => "ja",
            LanguageCode::Hungarian => "hu",
            LanguageCode::Korean => "ko",
            LanguageCode::Hindi => "hi",
        }
    }

    /// Convert lingua Language to LanguageCode
    pub fn from_lingua(language: Language) -> Self {
        match language {
            Language::English => LanguageCode::English,
            Language::Spanish => LanguageCode::Spanish,
            Language::French => LanguageCode::French,
            Language::German => LanguageCode::German,
            Language::Italian => LanguageCode::Italian,
            Language::Portuguese => LanguageCode::Portuguese,
            Language::Polish => LanguageCode::Polish,
            Language::Turkish => LanguageCode::Turkish,
            Language::Russian => LanguageCode::Russian,
            Language::Dutch => LanguageCode::Dutch,
            Language::Czech => LanguageCode::Czech,
            Language::Arabic => LanguageCode::Arabic,
            Language::Chinese => LanguageCode::Chinese,
            Language::Japanese => LanguageCode::Japanese,
            Language::Hungarian => LanguageCode::Hungarian,
            Language::Korean => LanguageCode::Korean,
            Language::Hindi => LanguageCode::Hindi,
        }
    }

    fn to_lingua(self) -> Language {
        match self {
            LanguageCode::English => Language::English,
            LanguageCode::Spanish => Language::Spanish,
            LanguageCode::French => Language::French,
            LanguageCode::German => Language::German,
            LanguageCode::Italian => Language::Italian,
            LanguageCode::Portuguese => Language::Portuguese,
            LanguageCode::Polish => Language::Polish,
            LanguageCode::Turkish => Language::Turkish,
            LanguageCode::Russian => Language::Russian,
            LanguageCode::Dutch => Language::Dutch,
            LanguageCode::Czech => Language::Czech,
            LanguageCode::Arabic => Language::Arabic,
            LanguageCode::Chinese => Language::Chinese,
            LanguageCode::Japanese => Language::Japanese,
            LanguageCode::Hungarian => Language::Hungarian,
            LanguageCode::Korean => Language::Korean,
            LanguageCode::Hindi => Language::Hindi,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language '{0}'")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for LanguageCode {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        let tag = if tag == "zh" { "zh-cn".to_string() } else { tag };
        LanguageCode::ALL
            .into_iter()
            .find(|code| code.as_str() == tag)
            .ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}

/// How the caller picked the language for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageChoice {
    Fixed(LanguageCode),
    Detect,
}

impl FromStr for LanguageChoice {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(LanguageChoice::Detect)
        } else {
            s.parse().map(LanguageChoice::Fixed)
        }
    }
}

/// Detect the language of the given text
/// Returns LanguageCode or defaults to English
pub fn detect_language(text: &str) -> LanguageCode {
    let languages: Vec<Language> = LanguageCode::ALL
        .iter()
        .map(|code| code.to_lingua())
        .collect();

    let detector = LanguageDetectorBuilder::from_languages(&languages).build();

    match detector.detect_language_of(text) {
        Some(language) => LanguageCode::from_lingua(language),
        None => {
            tracing::warn!("Could not detect language, falling back to English");
            LanguageCode::English
        }
    }
}
