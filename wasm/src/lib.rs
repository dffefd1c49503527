//! WebAssembly module for the AgriTech Advisory Platform
//!
//! Offline helpers for the field client, usable without connectivity:
//! - Rule-based soil analysis
//! - Canned assistant answers
//! - Fertilizer need labels and suitable crops
//! - Soil input validation

use shared::{
    fallback_answer, offline_soil_analysis, suitable_crops, Nutrient, SoilAnalysisInput,
    ValidationIssue,
};
use wasm_bindgen::prelude::*;

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

fn parse_soil_input(input_json: &str) -> Result<SoilAnalysisInput, String> {
    serde_json::from_str(input_json).map_err(|e| format!("Invalid soil input JSON: {}", e))
}

fn issue_message(issue: &ValidationIssue) -> String {
    format!("{} {} / {} {}", issue.field, issue.message, issue.field, issue.message_fr)
}

fn check_soil_input(input_json: &str) -> Result<SoilAnalysisInput, String> {
    let input = parse_soil_input(input_json)?;
    shared::validate_soil_input(&input).map_err(|issue| issue_message(&issue))?;
    Ok(input)
}

fn soil_analysis_json(input_json: &str) -> Result<String, String> {
    let input = check_soil_input(input_json)?;
    serde_json::to_string(&offline_soil_analysis(&input)).map_err(|e| e.to_string())
}

fn assistant_answer_json(question: &str, language: &str) -> String {
    serde_json::to_string(&fallback_answer(question, language)).unwrap_or_default()
}

/// Analyze soil measurements with the offline rules; returns the result as JSON
#[wasm_bindgen]
pub fn analyze_soil_offline(input_json: &str) -> Result<String, JsValue> {
    soil_analysis_json(input_json).map_err(|e| {
        warn(&e);
        JsValue::from_str(&e)
    })
}

/// Canned assistant answer as JSON
#[wasm_bindgen]
pub fn assistant_offline_answer(question: &str, language: &str) -> String {
    assistant_answer_json(question, language)
}

/// Faible, Moyen or Élevé; undefined for an unknown nutrient
#[wasm_bindgen]
pub fn fertilizer_need_label(nutrient: &str, value: f64) -> Option<String> {
    Nutrient::from_name(&nutrient.to_lowercase()).map(|n| n.need(value).label().to_string())
}

/// Throws with an English / French message when the measurements are invalid
#[wasm_bindgen]
pub fn validate_soil_input(input_json: &str) -> Result<(), JsValue> {
    check_soil_input(input_json).map(|_| ()).map_err(|e| {
        warn(&e);
        JsValue::from_str(&e)
    })
}

/// Crops that tolerate the given pH
#[wasm_bindgen]
pub fn suitable_crops_for_ph(ph: f64) -> js_sys::Array {
    suitable_crops(ph)
        .into_iter()
        .map(|crop| JsValue::from_str(&crop))
        .collect()
}
