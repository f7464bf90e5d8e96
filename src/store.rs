use crate::config::AppConfig;
use crate::types::{CountryProperties, CountryRecord, LanguageClassification};
use anyhow::{anyhow, Context, Result};
use geo::MultiPolygon;
use geojson::feature::Id;
use geojson::GeoJson;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Load both record-store collections: the country documents and the
/// singleton language-classification table.
pub fn load_atlas(config: &AppConfig) -> Result<(Vec<CountryRecord>, LanguageClassification)> {
    let countries = load_countries(config)?;
    let languages = load_language_classification(&config.input.language_classification)?;
    Ok((countries, languages))
}

pub fn load_countries(config: &AppConfig) -> Result<Vec<CountryRecord>> {
    let properties = load_properties(&config.input.country_properties)?;
    info!("Loaded properties for {} countries", properties.len());

    let mut boundaries = load_boundaries(&config.input.world_geo)?;
    info!("Loaded {} country boundaries", boundaries.len());

    // Join by country id. A properties row without a matching feature keeps
    // geometry = None and is excluded from rendering downstream.
    let mut records = Vec::with_capacity(properties.len());
    for prop in properties {
        let geometry = boundaries.remove(&prop.country_id);
        if geometry.is_none() {
            warn!("No boundary for {}, keeping record without geometry", prop.country_id);
        }
        records.push(CountryRecord { properties: prop, geometry });
    }

    Ok(records)
}

fn load_properties(path: &Path) -> Result<Vec<CountryProperties>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open country properties: {:?}", path))?;
    let properties: Vec<CountryProperties> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse country properties: {:?}", path))?;
    Ok(properties)
}

fn load_boundaries(path: &Path) -> Result<HashMap<String, MultiPolygon<f64>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open world GeoJSON: {:?}", path))?;
    let reader = BufReader::new(file);

    // Parse the GeoJSON. warning: this loads the whole file into memory.
    let geojson = GeoJson::from_reader(reader).context("Failed to parse world GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("World GeoJSON must be a FeatureCollection")),
    };

    let mut boundaries = HashMap::new();

    for feature in collection.features {
        // Country features carry their ISO id as the feature id
        let id = match feature.id {
            Some(Id::String(s)) => s,
            Some(Id::Number(n)) => n.to_string(),
            None => continue,
        };

        let geometry = match feature.geometry {
            Some(geometry) => {
                let converted: geo::Geometry<f64> = geometry.value.try_into()
                    .map_err(|e| anyhow!("Failed to convert geometry for {}: {:?}", id, e))?;

                match converted {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => continue, // Skip points/lines
                }
            }
            None => continue,
        };

        boundaries.insert(id, geometry);
    }

    Ok(boundaries)
}

pub fn load_language_classification(path: &Path) -> Result<LanguageClassification> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open language classification: {:?}", path))?;
    let table: LanguageClassification = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse language classification: {:?}", path))?;
    Ok(table)
}
