use crate::classify::{self, Classification, Mode};
use crate::types::{CountryRecord, LanguageClassification};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct ExportDoc<'a> {
    mode: String,
    #[serde(flatten)]
    classification: &'a Classification,
}

/// Classify the atlas under each mode and write `<out>/<mode>.json`.
pub fn export_classifications(
    countries: &[CountryRecord],
    languages: &LanguageClassification,
    modes: &[Mode],
    out_dir: &Path,
) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    modes.par_iter().try_for_each(|mode| {
        let classification = classify::classify(mode, countries, languages);
        let doc = ExportDoc {
            mode: mode.to_string(),
            classification: &classification,
        };

        let path = out_dir.join(format!("{}.json", file_stem(mode)));
        let file = fs::File::create(&path)
            .with_context(|| format!("Failed to create {:?}", path))?;
        serde_json::to_writer_pretty(file, &doc)
            .with_context(|| format!("Failed to write {:?}", path))?;

        info!("Wrote {:?}", path);
        Ok(())
    })
}

fn file_stem(mode: &Mode) -> String {
    // "pct-religion:Christianity" -> "pct-religion-christianity"
    mode.to_string().replace(':', "-").to_lowercase()
}
