use serde::{Deserialize, Serialize};
use std::fmt;

/// Language the OCR engine can be asked to read
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum OcrLanguage {
    English,
    Hindi,
}

impl OcrLanguage {
    /// Two-letter code understood by the OCR server ("en", "hi")
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
        }
    }

    /// Tesseract traineddata name ("eng", "hin")
    pub fn tesseract_code(&self) -> &'static str {
        match self {
            Self::English => "eng",
            Self::Hindi => "hin",
        }
    }
}

/// Non-empty, sorted and deduplicated set of OCR languages.
///
/// Used as the key of the engine cache, so `{en, hi}` and `{hi, en}` share
/// one engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LanguageSet(Vec<OcrLanguage>);

impl LanguageSet {
    /// Build a set from any collection of languages. Returns None when empty.
    pub fn new(languages: impl IntoIterator<Item = OcrLanguage>) -> Option<Self> {
        let mut langs: Vec<OcrLanguage> = languages.into_iter().collect();
        langs.sort();
        langs.dedup();

        if langs.is_empty() {
            return None;
        }

        Some(Self(langs))
    }

    pub fn single(language: OcrLanguage) -> Self {
        Self(vec![language])
    }

    /// Codes for the OCR server, e.g. `["en", "hi"]`
    pub fn codes(&self) -> Vec<&'static str> {
        self.0.iter().map(OcrLanguage::code).collect()
    }

    /// Tesseract language string, e.g. `eng+hin`
    pub fn tesseract_languages(&self) -> String {
        self.0
            .iter()
            .map(OcrLanguage::tesseract_code)
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.codes().join("+"))
    }
}

/// Operator-facing language selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LanguageChoice {
    #[default]
    English,
    Hindi,
    Both,
}

impl LanguageChoice {
    pub fn to_set(self) -> LanguageSet {
        match self {
            Self::English => LanguageSet::single(OcrLanguage::English),
            Self::Hindi => LanguageSet::single(OcrLanguage::Hindi),
            Self::Both => LanguageSet(vec![OcrLanguage::English, OcrLanguage::Hindi]),
        }
    }
}
