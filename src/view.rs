use crate::legend::{LegendPanel, LegendSpec};
use crate::scale::ThresholdScale;
use crate::types::CountryRecord;
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::centroid::Centroid;

pub const MAP_WIDTH: f64 = 700.0;
pub const MAP_HEIGHT: f64 = 550.0;

// Countries whose bounding box spans most of the map; the computed zoom
// degenerates for them, so they get a fixed scale.
const OVERSIZED: &[(&str, f64)] = &[("RUS", 1.5)];

/// Pan/scale transform the renderer applies to the feature group. An
/// idempotent overwrite: issuing a new one mid-transition just retargets
/// the animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Transform {
    pub fn identity() -> Self {
        Transform { x: 0.0, y: 0.0, k: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ZoomTarget {
    Unzoomed,
    Zoomed(String),
}

/// Per-view interaction state: current zoom target and the legend panel.
/// Owned by the controller and passed where needed, never ambient.
#[derive(Debug)]
pub struct ViewState {
    pub width: f64,
    pub height: f64,
    pub zoom: ZoomTarget,
    pub legend: LegendPanel,
    scale_steps: ThresholdScale<f64>,
}

impl ViewState {
    pub fn new(width: f64, height: f64) -> Self {
        ViewState {
            width,
            height,
            zoom: ZoomTarget::Unzoomed,
            legend: LegendPanel::new(),
            scale_steps: ThresholdScale::new(
                vec![1.0, 5.0, 10.0, 30.0],
                vec![1.0, 1.5, 2.0, 3.0, 5.0],
            ),
        }
    }

    /// Clicking the background always zooms out.
    pub fn click_background(&mut self) -> Transform {
        self.zoom = ZoomTarget::Unzoomed;
        Transform::identity()
    }

    /// Clicking a country zooms into it, unless it is the one currently
    /// zoomed, which zooms back out.
    pub fn click_country(&mut self, country: &CountryRecord) -> Transform {
        let id = &country.properties.country_id;
        if self.zoom == ZoomTarget::Zoomed(id.clone()) {
            self.zoom = ZoomTarget::Unzoomed;
            return Transform::identity();
        }

        let transform = self.focus_transform(country);
        self.zoom = ZoomTarget::Zoomed(id.clone());
        transform
    }

    /// Replace the current legend with the one for a fresh classification.
    pub fn show_legend(&mut self, spec: &LegendSpec) {
        self.legend.show(spec);
    }

    fn focus_transform(&self, country: &CountryRecord) -> Transform {
        // Only rendered (geometry-bearing) countries are clickable
        let Some(geometry) = &country.geometry else {
            return Transform::identity();
        };
        let (Some(bounds), Some(centroid)) = (geometry.bounding_rect(), geometry.centroid())
        else {
            return Transform::identity();
        };

        let dx = bounds.width();
        let dy = bounds.height();

        // Aspect-aware raw factor, stepped to tame tiny countries. A
        // zero-extent box pushes raw to infinity and lands on the top step.
        let raw = 0.75 / (dx / self.width).max(dy / self.height);
        let mut k = *self.scale_steps.get(raw);

        if let Some((_, fixed)) = OVERSIZED
            .iter()
            .find(|(oversized_id, _)| *oversized_id == country.properties.country_id)
        {
            k = *fixed;
        }

        Transform {
            x: self.width / 2.0 - k * centroid.x(),
            y: self.height / 2.0 - k * centroid.y(),
            k,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new(MAP_WIDTH, MAP_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CountryProperties;
    use geo::{LineString, MultiPolygon, Polygon};

    fn boxed_country(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> CountryRecord {
        CountryRecord {
            properties: CountryProperties {
                country_id: id.to_string(),
                country_name: id.to_string(),
                official_languages: vec![],
                dominant_religion: None,
                religion_composition: None,
            },
            geometry: Some(MultiPolygon::new(vec![Polygon::new(
                LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
                vec![],
            )])),
        }
    }

    #[test]
    fn click_zoom_click_returns_to_identity() {
        let mut view = ViewState::default();
        let deu = boxed_country("DEU", 100.0, 100.0, 140.0, 150.0);

        let zoomed = view.click_country(&deu);
        assert_eq!(view.zoom, ZoomTarget::Zoomed("DEU".to_string()));
        assert!(zoomed.k > 1.0);

        let reset = view.click_country(&deu);
        assert_eq!(view.zoom, ZoomTarget::Unzoomed);
        assert_eq!(reset, Transform::identity());
    }

    #[test]
    fn clicking_another_country_retargets() {
        let mut view = ViewState::default();
        let deu = boxed_country("DEU", 100.0, 100.0, 140.0, 150.0);
        let fra = boxed_country("FRA", 300.0, 200.0, 360.0, 260.0);

        view.click_country(&deu);
        let transform = view.click_country(&fra);
        assert_eq!(view.zoom, ZoomTarget::Zoomed("FRA".to_string()));
        // Centered on FRA's centroid
        let expected_x = view.width / 2.0 - transform.k * 330.0;
        let expected_y = view.height / 2.0 - transform.k * 230.0;
        assert!((transform.x - expected_x).abs() < 1e-9);
        assert!((transform.y - expected_y).abs() < 1e-9);
    }

    #[test]
    fn background_click_resets() {
        let mut view = ViewState::default();
        let deu = boxed_country("DEU", 100.0, 100.0, 140.0, 150.0);

        view.click_country(&deu);
        let reset = view.click_background();
        assert_eq!(view.zoom, ZoomTarget::Unzoomed);
        assert_eq!(reset, Transform::identity());
    }

    #[test]
    fn scale_is_stepped_and_capped() {
        let mut view = ViewState::default();
        // A tiny country: raw factor shoots far past the last step
        let tiny = boxed_country("LUX", 350.0, 270.0, 351.0, 271.0);
        let transform = view.click_country(&tiny);
        assert_eq!(transform.k, 5.0);

        // A map-filling country steps down to 1.0
        let huge = boxed_country("BIG", 0.0, 0.0, 690.0, 540.0);
        let transform = view.click_country(&huge);
        assert_eq!(transform.k, 1.0);
    }

    #[test]
    fn oversized_country_uses_fixed_scale() {
        let mut view = ViewState::default();
        let rus = boxed_country("RUS", 0.0, 0.0, 650.0, 300.0);
        let transform = view.click_country(&rus);
        assert_eq!(transform.k, 1.5);
    }

    #[test]
    fn legend_is_replaced_per_mode_switch() {
        let mut view = ViewState::default();
        let spec = LegendSpec::discrete(vec![
            ("a".to_string(), crate::color::qualitative(0)),
            ("b".to_string(), crate::color::qualitative(1)),
        ]);
        view.show_legend(&spec);
        assert_eq!(view.legend.items().len(), 2);

        view.show_legend(&LegendSpec::empty());
        assert!(view.legend.items().is_empty());
    }
}
