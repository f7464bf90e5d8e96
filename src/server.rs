use crate::classify::{self, Mode};
use crate::config::AppConfig;
use crate::legend::print_percentage;
use crate::types::{CountryProperties, CountryRecord, LanguageClassification};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::Point;
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

// Wrapper for RTree indexing
struct CountryIndex {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for CountryIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct AppState {
    pub countries: Vec<CountryRecord>,
    pub languages: LanguageClassification,
    tree: RTree<CountryIndex>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    UnknownMode(#[from] classify::UnknownMode),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::UnknownMode(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

pub async fn start_server(
    config: AppConfig,
    countries: Vec<CountryRecord>,
    languages: LanguageClassification,
) -> Result<()> {
    info!("Building spatial index for {} countries...", countries.len());
    let tree = build_index(&countries);

    let state = Arc::new(AppState { countries, languages, tree });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));
    info!("Starting server on http://{}", addr);

    let mut app = Router::new()
        .route("/api/atlas", get(atlas_handler))
        .route("/api/classify", get(classify_handler))
        .route("/api/query", get(query_handler));

    if let Some(assets_dir) = &config.server.assets_dir {
        app = app.nest_service("/", ServeDir::new(assets_dir));
    }

    let app = app.layer(CorsLayer::permissive()).with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_index(countries: &[CountryRecord]) -> RTree<CountryIndex> {
    let items: Vec<CountryIndex> = countries
        .iter()
        .enumerate()
        .filter_map(|(index, country)| {
            let rect = country.geometry.as_ref()?.bounding_rect()?;
            Some(CountryIndex {
                index,
                aabb: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
            })
        })
        .collect();
    RTree::bulk_load(items)
}

/// Envelope candidates first, exact containment second.
fn find_country_at<'a>(
    countries: &'a [CountryRecord],
    tree: &RTree<CountryIndex>,
    lon: f64,
    lat: f64,
) -> Option<&'a CountryRecord> {
    let point = Point::new(lon, lat);
    let envelope = AABB::from_point([lon, lat]);

    tree.locate_in_envelope_intersecting(&envelope)
        .filter_map(|candidate| countries.get(candidate.index))
        .find(|country| {
            country
                .geometry
                .as_ref()
                .is_some_and(|geometry| geometry.contains(&point))
        })
}

/// Tooltip text for a country, same fields the map shows on hover.
fn country_summary(properties: &CountryProperties) -> String {
    let native = properties
        .official_languages
        .first()
        .map_or("Unknown", String::as_str);
    let religion = properties
        .dominant_religion
        .as_ref()
        .map_or(classify::NON_RELIGIOUS, |r| r.name.as_str());

    format!(
        "Country:\t\t{}\nNative Language:\t{}\nPrevailing Religion:\t{}\nReligious Population:\t{}",
        properties.country_name,
        native,
        religion,
        print_percentage(classify::sum_religious_percentage(properties), 1),
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AtlasResponse {
    countries: Vec<CountryDoc>,
    language_classification: LanguageClassification,
}

#[derive(Serialize)]
struct CountryDoc {
    prop: CountryProperties,
    geo: Option<geojson::Geometry>,
}

/// The full page-view document: every country record plus the language
/// classification singleton.
async fn atlas_handler(State(state): State<Arc<AppState>>) -> Json<AtlasResponse> {
    let countries = state
        .countries
        .iter()
        .map(|country| CountryDoc {
            prop: country.properties.clone(),
            geo: country
                .geometry
                .as_ref()
                .map(|mp| geojson::Geometry::new(geojson::Value::from(mp))),
        })
        .collect();

    Json(AtlasResponse {
        countries,
        language_classification: state.languages.clone(),
    })
}

#[derive(Deserialize)]
struct ClassifyParams {
    mode: String,
}

async fn classify_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClassifyParams>,
) -> Result<Json<classify::Classification>, AppError> {
    let mode: Mode = params.mode.parse()?;
    Ok(Json(classify::classify(&mode, &state.countries, &state.languages)))
}

#[derive(Deserialize)]
struct QueryParams {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    country_id: String,
    properties: CountryProperties,
    summary: String,
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Json<Option<QueryResponse>> {
    let found = find_country_at(&state.countries, &state.tree, params.lon, params.lat);

    Json(found.map(|country| QueryResponse {
        country_id: country.properties.country_id.clone(),
        properties: country.properties.clone(),
        summary: country_summary(&country.properties),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DominantReligion;
    use geo::{LineString, MultiPolygon, Polygon};

    fn boxed_country(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> CountryRecord {
        CountryRecord {
            properties: CountryProperties {
                country_id: id.to_string(),
                country_name: id.to_string(),
                official_languages: vec!["English".to_string()],
                dominant_religion: Some(DominantReligion {
                    name: "Christianity".to_string(),
                    is_official: false,
                }),
                religion_composition: Some(
                    [("Christianity".to_string(), 0.5)].into_iter().collect(),
                ),
            },
            geometry: Some(MultiPolygon::new(vec![Polygon::new(
                LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
                vec![],
            )])),
        }
    }

    #[test]
    fn point_lookup_hits_the_containing_country() {
        let countries = vec![
            boxed_country("AAA", 0.0, 0.0, 10.0, 10.0),
            boxed_country("BBB", 20.0, 0.0, 30.0, 10.0),
        ];
        let tree = build_index(&countries);

        let hit = find_country_at(&countries, &tree, 25.0, 5.0).unwrap();
        assert_eq!(hit.properties.country_id, "BBB");
        assert!(find_country_at(&countries, &tree, 15.0, 5.0).is_none());
    }

    #[test]
    fn records_without_geometry_are_not_indexed() {
        let mut countries = vec![boxed_country("AAA", 0.0, 0.0, 10.0, 10.0)];
        countries.push(CountryRecord {
            geometry: None,
            ..boxed_country("GHOST", 0.0, 0.0, 10.0, 10.0)
        });
        let tree = build_index(&countries);

        let hit = find_country_at(&countries, &tree, 5.0, 5.0).unwrap();
        assert_eq!(hit.properties.country_id, "AAA");
    }

    #[test]
    fn summary_covers_the_tooltip_fields() {
        let country = boxed_country("AAA", 0.0, 0.0, 10.0, 10.0);
        let summary = country_summary(&country.properties);
        assert!(summary.contains("AAA"));
        assert!(summary.contains("English"));
        assert!(summary.contains("Christianity"));
        assert!(summary.contains("50.0%"));
    }
}
