//! Soil analysis models and the offline agronomic rules

use serde::{Deserialize, Serialize};

/// pH below which a soil is too acidic
pub const PH_ACIDIC_BELOW: f64 = 5.5;
/// pH above which a soil is too alkaline
pub const PH_ALKALINE_ABOVE: f64 = 7.5;
/// Lower bound of the ideal pH band (inclusive)
pub const PH_IDEAL_MIN: f64 = 6.0;
/// Upper bound of the ideal pH band (inclusive)
pub const PH_IDEAL_MAX: f64 = 7.0;

/// Soil measurements submitted by a farmer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SoilAnalysisInput {
    /// 0 - 14
    pub ph: f64,
    /// mg/kg
    pub nitrogen: f64,
    /// mg/kg
    pub phosphorus: f64,
    /// mg/kg
    pub potassium: f64,
    /// °C, -10 - 60
    pub temperature: f64,
    /// %, 0 - 100
    pub humidity: f64,
    pub region: String,
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl SoilAnalysisInput {
    /// Requested language, French when absent or blank
    pub fn language_or_default(&self) -> &str {
        crate::types::Language::code_or_default(self.language.as_deref())
    }
}

/// Overall soil quality
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SoilQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

/// Soil correction advice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilRecommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub priority: i32,
}

impl SoilRecommendation {
    fn new(kind: &str, description: &str, priority: i32) -> Self {
        Self {
            kind: kind.to_string(),
            description: description.to_string(),
            priority,
        }
    }
}

/// How much of a nutrient the soil needs, labelled in French
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FertilizerNeed {
    #[serde(rename = "Faible")]
    Low,
    #[serde(rename = "Moyen")]
    Medium,
    #[serde(rename = "Élevé")]
    High,
}

impl FertilizerNeed {
    pub fn label(&self) -> &'static str {
        match self {
            FertilizerNeed::Low => "Faible",
            FertilizerNeed::Medium => "Moyen",
            FertilizerNeed::High => "Élevé",
        }
    }
}

impl std::fmt::Display for FertilizerNeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Soil macronutrients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl Nutrient {
    /// (high need below, medium need below), mg/kg
    pub fn thresholds(&self) -> (f64, f64) {
        match self {
            Nutrient::Nitrogen => (30.0, 60.0),
            Nutrient::Phosphorus => (20.0, 40.0),
            Nutrient::Potassium => (80.0, 150.0),
        }
    }

    pub fn need(&self, value: f64) -> FertilizerNeed {
        let (high_below, medium_below) = self.thresholds();
        if value < high_below {
            FertilizerNeed::High
        } else if value < medium_below {
            FertilizerNeed::Medium
        } else {
            FertilizerNeed::Low
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nitrogen" | "n" => Some(Nutrient::Nitrogen),
            "phosphorus" | "p" => Some(Nutrient::Phosphorus),
            "potassium" | "k" => Some(Nutrient::Potassium),
            _ => None,
        }
    }
}

/// Fertilizer need per nutrient
///
/// Kept as text so labels produced by the AI service pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FertilizerNeeds {
    pub nitrogen: String,
    pub phosphorus: String,
    pub potassium: String,
}

/// Soil analysis outcome returned to the farmer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SoilAnalysisResult {
    pub soil_quality: SoilQuality,
    pub recommendations: Vec<SoilRecommendation>,
    pub suitable_crops: Vec<String>,
    pub fertilizer_needs: FertilizerNeeds,
}

/// Quality from pH alone
///
/// Outside [5.5, 7.5] is poor, [6.0, 7.0] is good, the two bands in between
/// stay fair.
pub fn classify_soil_quality(ph: f64) -> SoilQuality {
    if ph < PH_ACIDIC_BELOW || ph > PH_ALKALINE_ABOVE {
        SoilQuality::Poor
    } else if is_ideal_ph(ph) {
        SoilQuality::Good
    } else {
        SoilQuality::Fair
    }
}

fn is_ideal_ph(ph: f64) -> bool {
    ph >= PH_IDEAL_MIN && ph <= PH_IDEAL_MAX
}

/// Crops that tolerate the given pH
pub fn suitable_crops(ph: f64) -> Vec<String> {
    let crops: &[&str] = if is_ideal_ph(ph) {
        &["Maïs", "Tomate", "Oignon", "Haricot"]
    } else if ph < PH_IDEAL_MIN {
        &["Manioc", "Patate douce", "Ananas"]
    } else {
        &["Mil", "Sorgho"]
    };
    crops.iter().map(|c| c.to_string()).collect()
}

/// Rule-based analysis used when the soil AI service cannot be reached
pub fn offline_soil_analysis(input: &SoilAnalysisInput) -> SoilAnalysisResult {
    let ph = input.ph;
    let mut recommendations = Vec::new();

    if ph < PH_ACIDIC_BELOW {
        recommendations.push(SoilRecommendation::new(
            "correction_ph",
            "Le sol est trop acide. Ajouter de la chaux pour augmenter le pH.",
            1,
        ));
    } else if ph > PH_ALKALINE_ABOVE {
        recommendations.push(SoilRecommendation::new(
            "correction_ph",
            "Le sol est trop alcalin. Ajouter du soufre ou du compost.",
            1,
        ));
    }

    let (nitrogen_low, _) = Nutrient::Nitrogen.thresholds();
    let (phosphorus_low, _) = Nutrient::Phosphorus.thresholds();
    let (potassium_low, _) = Nutrient::Potassium.thresholds();

    if input.nitrogen < nitrogen_low {
        recommendations.push(SoilRecommendation::new(
            "fertilizer",
            "Azote faible. Appliquer un engrais riche en azote (urée ou compost).",
            1,
        ));
    }
    if input.phosphorus < phosphorus_low {
        recommendations.push(SoilRecommendation::new(
            "fertilizer",
            "Phosphore faible. Appliquer du phosphate naturel ou du fumier.",
            2,
        ));
    }
    if input.potassium < potassium_low {
        recommendations.push(SoilRecommendation::new(
            "fertilizer",
            "Potassium faible. Utiliser de la cendre de bois ou du chlorure de potassium.",
            2,
        ));
    }

    SoilAnalysisResult {
        soil_quality: classify_soil_quality(ph),
        recommendations,
        suitable_crops: suitable_crops(ph),
        fertilizer_needs: FertilizerNeeds {
            nitrogen: Nutrient::Nitrogen.need(input.nitrogen).label().to_string(),
            phosphorus: Nutrient::Phosphorus.need(input.phosphorus).label().to_string(),
            potassium: Nutrient::Potassium.need(input.potassium).label().to_string(),
        },
    }
}
