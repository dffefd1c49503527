//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Languages spoken by the farmers we serve
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// French
    #[default]
    Fr,
    /// Wolof
    Wo,
    /// Pulaar
    Ff,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::Wo => "wo",
            Language::Ff => "ff",
        }
    }

    /// Resolve a language code, `None` for anything we do not support
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "fr" => Some(Language::Fr),
            "wo" => Some(Language::Wo),
            "ff" => Some(Language::Ff),
            _ => None,
        }
    }

    /// Trimmed requested code, the default language's code when absent or blank
    pub fn code_or_default(code: Option<&str>) -> &str {
        code.map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| Language::default().code())
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Location of an uploaded image
///
/// `url` is what clients fetch, `path` is where the server keeps the file.
/// The server path never leaves the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageReference {
    #[serde(rename = "imageUrl")]
    pub url: String,
    #[serde(rename = "imagePath", skip_serializing, default)]
    pub path: String,
}

impl ImageReference {
    pub fn new(url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
        }
    }
}

/// One row of a frequency distribution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrequencyBucket {
    pub name: String,
    pub count: i64,
}
