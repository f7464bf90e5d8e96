use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryProperties {
    pub country_id: String,
    pub country_name: String,
    // First entry is the native/primary language
    pub official_languages: Vec<String>,
    #[serde(default)]
    pub dominant_religion: Option<DominantReligion>,
    // Religion name -> fraction of population in [0, 1]. Absent means 0%.
    #[serde(default)]
    pub religion_composition: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DominantReligion {
    pub name: String,
    #[serde(default)]
    pub is_official: bool,
}

/// A country document as stored: properties plus an optional boundary.
/// Countries without geometry are kept (they still show up in the atlas
/// document) but never enter a classification domain.
#[derive(Debug, Clone)]
pub struct CountryRecord {
    pub properties: CountryProperties,
    pub geometry: Option<MultiPolygon<f64>>,
}

/// The singleton language -> language-family lookup table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LanguageClassification(pub HashMap<String, String>);

impl LanguageClassification {
    pub fn family(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }
}
