use crate::color::Color;
use serde::Serialize;

/// What the renderer needs to draw a legend: either one labeled row per
/// discrete class (in first-encountered order, never re-sorted) or a column
/// of bins bounded by formatted threshold labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LegendSpec {
    Discrete {
        classes: Vec<LegendClass>,
    },
    Thresholded {
        thresholds: Vec<f64>,
        colors: Vec<Color>,
        labels: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendClass {
    pub label: String,
    pub color: Color,
}

impl LegendSpec {
    pub fn empty() -> Self {
        LegendSpec::Discrete { classes: Vec::new() }
    }

    pub fn discrete(pairs: Vec<(String, Color)>) -> Self {
        LegendSpec::Discrete {
            classes: pairs
                .into_iter()
                .map(|(label, color)| LegendClass { label, color })
                .collect(),
        }
    }

    /// Thresholded legend with `colors.len() + 1` boundary labels, each
    /// produced by the caller-supplied formatter.
    pub fn thresholded<F>(thresholds: Vec<f64>, colors: Vec<Color>, format: F) -> Self
    where
        F: Fn(f64) -> String,
    {
        let labels = thresholds.iter().map(|t| format(*t)).collect();
        LegendSpec::Thresholded { thresholds, colors, labels }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            LegendSpec::Discrete { classes } => classes.is_empty(),
            LegendSpec::Thresholded { colors, .. } => colors.is_empty(),
        }
    }
}

/// `"0.42" -> "42%"`, with the requested number of decimals.
pub fn print_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

// Fixed panel metrics: a 290x550 column with a 50px swatch strip and a
// 200px text column.
const SYMBOL_WIDTH: f64 = 50.0;
const TEXT_WIDTH: f64 = 200.0;
const GAP: f64 = 20.0;
const ROW_GAP: f64 = 4.0;
const BORDER: f64 = 50.0;
const PANEL_HEIGHT: f64 = 550.0;

const SYMBOLS_HEIGHT: f64 = PANEL_HEIGHT - 2.0 * BORDER;
const SYMBOLS_X: f64 = GAP;
const TEXT_X: f64 = GAP * 2.0 + SYMBOL_WIDTH;

pub fn panel_size() -> (f64, f64) {
    (SYMBOL_WIDTH + TEXT_WIDTH + GAP * 2.0, PANEL_HEIGHT)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Swatch {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub swatch: Option<Swatch>,
    pub label: String,
    pub label_x: f64,
    pub label_y: f64,
}

/// Lay the spec out as positioned swatches and labels. Discrete rows stack
/// vertically in the order handed in; thresholded output has one label per
/// boundary (bins + 1) with the label sitting on the bin edge.
pub fn layout(spec: &LegendSpec) -> Vec<LegendItem> {
    match spec {
        LegendSpec::Discrete { classes } => {
            if classes.is_empty() {
                return Vec::new();
            }
            let row_height = SYMBOLS_HEIGHT / classes.len() as f64;

            classes
                .iter()
                .enumerate()
                .map(|(i, class)| LegendItem {
                    swatch: Some(Swatch {
                        x: SYMBOLS_X,
                        y: BORDER + i as f64 * row_height,
                        width: SYMBOL_WIDTH,
                        height: row_height - ROW_GAP,
                        color: class.color.clone(),
                    }),
                    label: class.label.clone(),
                    label_x: TEXT_X,
                    label_y: BORDER + (i as f64 + 0.5) * row_height,
                })
                .collect()
        }
        LegendSpec::Thresholded { colors, labels, .. } => {
            if colors.is_empty() {
                return Vec::new();
            }
            let row_height = SYMBOLS_HEIGHT / colors.len() as f64;

            labels
                .iter()
                .enumerate()
                .map(|(i, label)| LegendItem {
                    // The last boundary label has no bin below it
                    swatch: colors.get(i).map(|color| Swatch {
                        x: SYMBOLS_X,
                        y: BORDER + i as f64 * row_height,
                        width: SYMBOL_WIDTH,
                        height: row_height,
                        color: color.clone(),
                    }),
                    label: label.clone(),
                    label_x: TEXT_X,
                    label_y: BORDER + (i as f64 + 0.1) * row_height,
                })
                .collect()
        }
    }
}

/// The one legend currently on screen. `show` fully replaces the previous
/// layout so mode switches never accumulate rows.
#[derive(Debug, Default)]
pub struct LegendPanel {
    items: Vec<LegendItem>,
}

impl LegendPanel {
    pub fn new() -> Self {
        LegendPanel::default()
    }

    pub fn show(&mut self, spec: &LegendSpec) {
        self.items = layout(spec);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[LegendItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discrete_spec(n: usize) -> LegendSpec {
        LegendSpec::discrete(
            (0..n)
                .map(|i| (format!("class {}", i), crate::color::qualitative(i)))
                .collect(),
        )
    }

    #[test]
    fn percentage_formatting() {
        assert_eq!(print_percentage(0.0, 0), "0%");
        assert_eq!(print_percentage(0.3, 0), "30%");
        assert_eq!(print_percentage(1.0, 0), "100%");
        assert_eq!(print_percentage(0.256, 1), "25.6%");
        // Stepped-threshold float noise never leaks into labels
        assert_eq!(print_percentage(7.0 * 0.1, 0), "70%");
    }

    #[test]
    fn discrete_layout_preserves_order() {
        let spec = LegendSpec::discrete(vec![
            ("Germanic".to_string(), Color::from("#a6cee3")),
            ("Romance".to_string(), Color::from("#1f78b4")),
            ("Slavic".to_string(), Color::from("#b2df8a")),
        ]);
        let items = layout(&spec);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].label, "Germanic");
        assert_eq!(items[2].label, "Slavic");
        // Rows stack downward and stay inside the panel
        assert!(items[0].label_y < items[1].label_y);
        assert!(items[1].label_y < items[2].label_y);
        assert!(items.iter().all(|item| item.swatch.is_some()));

        let (panel_w, panel_h) = panel_size();
        for item in &items {
            let swatch = item.swatch.as_ref().unwrap();
            assert!(swatch.x + swatch.width <= panel_w);
            assert!(swatch.y + swatch.height <= panel_h);
            assert!(item.label_x < panel_w);
        }
    }

    #[test]
    fn thresholded_layout_has_one_more_label_than_bins() {
        let thresholds = crate::scale::stepped_thresholds(0.0, 1.0, 0.1);
        let colors: Vec<_> = (0..10).map(|i| crate::color::sequential(i as f64 / 9.0)).collect();
        let spec = LegendSpec::thresholded(thresholds, colors, |v| print_percentage(v, 0));

        let items = layout(&spec);
        assert_eq!(items.len(), 11);
        assert_eq!(items.iter().filter(|item| item.swatch.is_some()).count(), 10);
        assert!(items.last().unwrap().swatch.is_none());
        assert_eq!(items[0].label, "0%");
        assert_eq!(items[10].label, "100%");
    }

    #[test]
    fn empty_spec_lays_out_nothing() {
        assert!(layout(&LegendSpec::empty()).is_empty());
    }

    #[test]
    fn panel_replaces_previous_legend() {
        let mut panel = LegendPanel::new();
        panel.show(&discrete_spec(5));
        assert_eq!(panel.items().len(), 5);

        // Switching modes twice leaves exactly one legend
        panel.show(&discrete_spec(2));
        assert_eq!(panel.items().len(), 2);

        panel.show(&LegendSpec::empty());
        assert!(panel.items().is_empty());

        panel.show(&discrete_spec(3));
        panel.clear();
        assert!(panel.items().is_empty());
    }
}
