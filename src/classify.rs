use crate::color::{self, Color, BINARY_POSITIVE, DEFAULT_FILL};
use crate::legend::{print_percentage, LegendSpec};
use crate::scale::{stepped_thresholds, ThresholdScale};
use crate::types::{CountryProperties, CountryRecord, LanguageClassification};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const UNCLASSIFIED: &str = "Unclassified";
pub const NON_RELIGIOUS: &str = "Non-religious";

/// A map coloring mode. Dispatch is a closed enum, never a string lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Default,
    NativeLanguageFamily,
    NumOfficialLanguages,
    EnglishOfficial,
    PrevailingReligion,
    NumReligions,
    OfficiallyReligious,
    PctReligious,
    PctReligion(String),
}

impl Mode {
    /// Every selectable mode, with the four stock religion breakdowns.
    pub fn all() -> Vec<Mode> {
        vec![
            Mode::Default,
            Mode::NativeLanguageFamily,
            Mode::NumOfficialLanguages,
            Mode::EnglishOfficial,
            Mode::PrevailingReligion,
            Mode::NumReligions,
            Mode::OfficiallyReligious,
            Mode::PctReligious,
            Mode::PctReligion("Christianity".to_string()),
            Mode::PctReligion("Islam".to_string()),
            Mode::PctReligion("Buddhism".to_string()),
            Mode::PctReligion("Orthodoxy".to_string()),
        ]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Default => write!(f, "default"),
            Mode::NativeLanguageFamily => write!(f, "native-language-family"),
            Mode::NumOfficialLanguages => write!(f, "num-official-languages"),
            Mode::EnglishOfficial => write!(f, "english-official"),
            Mode::PrevailingReligion => write!(f, "prevailing-religion"),
            Mode::NumReligions => write!(f, "num-religions"),
            Mode::OfficiallyReligious => write!(f, "officially-religious"),
            Mode::PctReligious => write!(f, "pct-religious"),
            Mode::PctReligion(religion) => write!(f, "pct-religion:{}", religion),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown classification mode: {0}")]
pub struct UnknownMode(String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(religion) = s.strip_prefix("pct-religion:") {
            if religion.is_empty() {
                return Err(UnknownMode(s.to_string()));
            }
            return Ok(Mode::PctReligion(religion.to_string()));
        }
        match s {
            "default" => Ok(Mode::Default),
            "native-language-family" => Ok(Mode::NativeLanguageFamily),
            "num-official-languages" => Ok(Mode::NumOfficialLanguages),
            "english-official" => Ok(Mode::EnglishOfficial),
            "prevailing-religion" => Ok(Mode::PrevailingReligion),
            "num-religions" => Ok(Mode::NumReligions),
            "officially-religious" => Ok(Mode::OfficiallyReligious),
            "pct-religious" => Ok(Mode::PctReligious),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Engine output: one color per geometry-bearing country, keyed by country
/// id, plus the legend describing the classes.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub fills: HashMap<String, Color>,
    pub legend: LegendSpec,
}

impl Classification {
    fn empty() -> Self {
        Classification { fills: HashMap::new(), legend: LegendSpec::empty() }
    }
}

/// Classify the country set under a mode. Records without geometry are
/// excluded from the domain entirely; every remaining record receives
/// exactly one color.
pub fn classify(
    mode: &Mode,
    countries: &[CountryRecord],
    languages: &LanguageClassification,
) -> Classification {
    let mapped: Vec<&CountryRecord> =
        countries.iter().filter(|c| c.geometry.is_some()).collect();

    match mode {
        Mode::Default => by_default(&mapped),
        Mode::NativeLanguageFamily => by_native_language_family(&mapped, languages),
        Mode::NumOfficialLanguages => {
            integer_binned(&mapped, |p| p.official_languages.len(), 1.5)
        }
        Mode::EnglishOfficial => binary(
            &mapped,
            |p| p.official_languages.iter().any(|l| l == "English"),
            "English Official",
            "English not Official",
        ),
        Mode::PrevailingReligion => by_prevailing_religion(&mapped),
        Mode::NumReligions => integer_binned(
            &mapped,
            |p| p.religion_composition.as_ref().map_or(0, HashMap::len),
            1.0,
        ),
        Mode::OfficiallyReligious => binary(
            &mapped,
            |p| p.dominant_religion.as_ref().is_some_and(|r| r.is_official),
            "Officially Religious",
            "Not Officially Religious",
        ),
        Mode::PctReligious => percentage_binned(&mapped, sum_religious_percentage),
        Mode::PctReligion(religion) => {
            percentage_binned(&mapped, |p| specified_religious_percentage(p, religion))
        }
    }
}

fn by_default(mapped: &[&CountryRecord]) -> Classification {
    let fills = mapped
        .iter()
        .map(|c| (c.properties.country_id.clone(), Color::from(DEFAULT_FILL)))
        .collect();
    Classification { fills, legend: LegendSpec::empty() }
}

fn by_native_language_family(
    mapped: &[&CountryRecord],
    languages: &LanguageClassification,
) -> Classification {
    // Classes in first-encountered order; unknown or missing native
    // language falls into its own class rather than dropping the country.
    let mut classes: Vec<String> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();
    let mut fills = HashMap::new();

    for country in mapped {
        let family = country
            .properties
            .official_languages
            .first()
            .and_then(|native| languages.family(native))
            .unwrap_or(UNCLASSIFIED);

        let idx = *index_of.entry(family.to_string()).or_insert_with(|| {
            classes.push(family.to_string());
            classes.len() - 1
        });
        fills.insert(country.properties.country_id.clone(), color::qualitative(idx));
    }

    let legend = LegendSpec::discrete(
        classes
            .into_iter()
            .enumerate()
            .map(|(idx, label)| (label, color::qualitative(idx)))
            .collect(),
    );

    Classification { fills, legend }
}

fn by_prevailing_religion(mapped: &[&CountryRecord]) -> Classification {
    let mut classes: Vec<String> = Vec::new();
    for country in mapped {
        if let Some(religion) = &country.properties.dominant_religion {
            if !classes.contains(&religion.name) {
                classes.push(religion.name.clone());
            }
        }
    }
    // Always last, whatever was encountered first
    classes.push(NON_RELIGIOUS.to_string());

    let index_of: HashMap<&str, usize> = classes
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    let fills = mapped
        .iter()
        .map(|country| {
            let class = country
                .properties
                .dominant_religion
                .as_ref()
                .map_or(NON_RELIGIOUS, |r| r.name.as_str());
            (
                country.properties.country_id.clone(),
                color::qualitative(index_of[class]),
            )
        })
        .collect();

    let legend = LegendSpec::discrete(
        classes
            .into_iter()
            .enumerate()
            .map(|(idx, label)| (label, color::qualitative(idx)))
            .collect(),
    );

    Classification { fills, legend }
}

fn binary<F>(mapped: &[&CountryRecord], predicate: F, yes: &str, no: &str) -> Classification
where
    F: Fn(&CountryProperties) -> bool,
{
    let fills = mapped
        .iter()
        .map(|country| {
            let fill = if predicate(&country.properties) {
                Color::from(BINARY_POSITIVE)
            } else {
                Color::from(DEFAULT_FILL)
            };
            (country.properties.country_id.clone(), fill)
        })
        .collect();

    // Both rows stay in the legend even when one class is empty
    let legend = LegendSpec::discrete(vec![
        (yes.to_string(), Color::from(BINARY_POSITIVE)),
        (no.to_string(), Color::from(DEFAULT_FILL)),
    ]);

    Classification { fills, legend }
}

/// Sequential coloring over an integer count. The offset keeps the lightest
/// class visibly off-white and absorbs the min == max degenerate range
/// without ever dividing by zero.
fn integer_binned<F>(mapped: &[&CountryRecord], count_of: F, offset: f64) -> Classification
where
    F: Fn(&CountryProperties) -> usize,
{
    let mut range: Option<(usize, usize)> = None;
    for country in mapped {
        let num = count_of(&country.properties);
        range = Some(match range {
            None => (num, num),
            Some((min, max)) => (min.min(num), max.max(num)),
        });
    }
    let Some((min, max)) = range else {
        return Classification::empty();
    };

    let denominator = (max - min) as f64 + offset;
    let color_for = |num: usize| {
        let t = ((num - min) as f64 + offset) / denominator;
        color::sequential(t)
    };

    let fills = mapped
        .iter()
        .map(|country| {
            let num = count_of(&country.properties);
            (country.properties.country_id.clone(), color_for(num))
        })
        .collect();

    let legend = LegendSpec::discrete(
        (min..=max).map(|num| (num.to_string(), color_for(num))).collect(),
    );

    Classification { fills, legend }
}

/// Ten fixed-width bins over [0, 1], colored by bin midpoint pushed up the
/// ramp, with a thresholded legend labeled in whole percents.
fn percentage_binned<F>(mapped: &[&CountryRecord], value_of: F) -> Classification
where
    F: Fn(&CountryProperties) -> f64,
{
    let thresholds = stepped_thresholds(0.0, 1.0, 0.1);
    let colors: Vec<Color> = thresholds
        .windows(2)
        .map(|pair| {
            let midpoint = (pair[0] + pair[1]) * 0.5;
            color::sequential((midpoint + 0.3) / 1.3)
        })
        .collect();

    let scale = ThresholdScale::new(
        thresholds[1..thresholds.len() - 1].to_vec(),
        colors.clone(),
    );

    let fills = mapped
        .iter()
        .map(|country| {
            let value = value_of(&country.properties);
            (country.properties.country_id.clone(), scale.get(value).clone())
        })
        .collect();

    let legend = LegendSpec::thresholded(thresholds, colors, |v| print_percentage(v, 0));

    Classification { fills, legend }
}

/// Total religious share of the population: the composition values summed,
/// clamped to 1.0 against rounding drift. Missing composition means 0.
pub fn sum_religious_percentage(properties: &CountryProperties) -> f64 {
    let Some(composition) = &properties.religion_composition else {
        return 0.0;
    };
    let sum: f64 = composition.values().sum();
    if sum <= 1.0 {
        sum
    } else {
        1.0
    }
}

/// Share of one named religion, no summing.
pub fn specified_religious_percentage(properties: &CountryProperties, religion: &str) -> f64 {
    properties
        .religion_composition
        .as_ref()
        .and_then(|composition| composition.get(religion))
        .copied()
        .unwrap_or(0.0)
}
