//! Farming assistant models and offline canned answers

use serde::{Deserialize, Serialize};

use crate::types::Language;

/// Longest question accepted, in characters
pub const MAX_QUESTION_CHARS: usize = 500;

/// Longest free-text context accepted, in characters
pub const MAX_CONTEXT_CHARS: usize = 1000;

const IRRIGATION_KEYWORDS: &[&str] = &["arrosage", "arroser", "eau"];
const FERTILIZER_KEYWORDS: &[&str] = &["engrais", "fertilisant"];
const MILLET_KEYWORDS: &[&str] = &["mil", "souna"];

/// Question asked by a farmer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssistantQuestion {
    pub question: String,
    /// fr, wo or ff; other codes are forwarded as-is
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

impl AssistantQuestion {
    /// Requested language, French when absent or blank
    pub fn language_or_default(&self) -> &str {
        Language::code_or_default(self.language.as_deref())
    }
}

/// Answer returned to the farmer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssistantAnswer {
    pub answer: String,
    /// Shorter wording for text-to-speech
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_topics: Option<Vec<String>>,
}

impl AssistantAnswer {
    fn canned(answer: &str, audio_text: Option<&str>) -> Self {
        Self {
            answer: answer.to_string(),
            audio_text: audio_text.map(str::to_string),
            related_topics: None,
        }
    }
}

/// Subject picked out of a question by keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTopic {
    Irrigation,
    Fertilizer,
    Millet,
    Generic,
}

/// First matching topic wins: irrigation, then fertilizer, then millet
pub fn detect_fallback_topic(question: &str) -> FallbackTopic {
    let lower = question.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if mentions(IRRIGATION_KEYWORDS) {
        FallbackTopic::Irrigation
    } else if mentions(FERTILIZER_KEYWORDS) {
        FallbackTopic::Fertilizer
    } else if mentions(MILLET_KEYWORDS) {
        FallbackTopic::Millet
    } else {
        FallbackTopic::Generic
    }
}

/// Canned answer used when the assistant AI service cannot be reached
///
/// Only French has topic-specific answers. Wolof and Pulaar get a localized
/// apology, anything else a bare French notice.
pub fn fallback_answer(question: &str, language: &str) -> AssistantAnswer {
    match Language::from_code(language) {
        Some(Language::Fr) => french_fallback(detect_fallback_topic(question)),
        Some(Language::Wo) => AssistantAnswer::canned(
            "Damay jàppale, service IA bi dafa amul. Jëm tay ndax nga laaj ci mbind.",
            Some("Service bi amul. Jëm tay."),
        ),
        Some(Language::Ff) => AssistantAnswer::canned(
            "Mi jaabii-mo. Service IA ngonɗii. Fuɗɗito kadi.",
            Some("Service ngonɗii. Fuɗɗito kadi."),
        ),
        None => AssistantAnswer::canned("Service temporairement indisponible.", None),
    }
}

fn french_fallback(topic: FallbackTopic) -> AssistantAnswer {
    match topic {
        FallbackTopic::Irrigation => AssistantAnswer::canned(
            "Pour l'arrosage, il est recommandé d'arroser tôt le matin ou en fin de journée. \
             La quantité dépend du type de culture et du sol. En général, 20-30 litres par m² \
             par semaine pour la plupart des cultures.",
            Some("Arrosez tôt le matin ou en fin de journée. 20 à 30 litres par mètre carré par semaine."),
        ),
        FallbackTopic::Fertilizer => AssistantAnswer::canned(
            "Les engrais organiques comme le compost ou le fumier sont excellents. Pour les \
             cultures, l'engrais NPK (azote, phosphore, potassium) est souvent utilisé. \
             Appliquez avant la saison des pluies.",
            Some("Utilisez du compost ou du fumier. L'engrais NPK est recommandé avant la saison des pluies."),
        ),
        FallbackTopic::Millet => AssistantAnswer::canned(
            "Le mil (souna) nécessite un sol bien drainé et peu d'eau. Semez au début de la \
             saison des pluies. Récolte après 90-120 jours. Résiste bien à la sécheresse.",
            Some("Le mil préfère les sols drainés. Semez au début de la saison des pluies. Récolte après 3 à 4 mois."),
        ),
        FallbackTopic::Generic => AssistantAnswer::canned(
            "Je suis désolé, le service IA est temporairement indisponible. Veuillez réessayer \
             plus tard ou reformuler votre question.",
            Some("Service temporairement indisponible. Veuillez réessayer plus tard."),
        ),
    }
}
