// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 SpyEdge contributors

//! Project snapshot export
//!
//! A snapshot is a one-shot JSON artifact named after the analyzed ad. There
//! is no versioning and no round-trip requirement.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::catalog::{Ad, Analysis};
use crate::Result;

/// Derive the snapshot filename from the ad title: runs of whitespace become
/// a single underscore.
pub fn snapshot_filename(title: &str) -> String {
    let mut name = String::from("SpyEdge_");
    let mut in_whitespace = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                name.push('_');
            }
            in_whitespace = true;
        } else {
            name.push(c);
            in_whitespace = false;
        }
    }
    name.push_str(".json");
    name
}

/// Build the snapshot body: the product title plus the full analysis.
pub fn project_snapshot(ad: &Ad, analysis: &Analysis) -> Value {
    json!({
        "produto": ad.title,
        "analise": analysis,
    })
}

/// Write a snapshot under `dir`, creating the directory if needed.
pub fn write_snapshot(dir: &Path, ad: &Ad, analysis: &Analysis) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(snapshot_filename(&ad.title));
    let content = serde_json::to_string_pretty(&project_snapshot(ad, analysis))?;
    fs::write(&path, content)?;
    info!("exported project snapshot to {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AdMetrics, Region, TrendScore};

    fn sample_ad(title: &str) -> Ad {
        Ad {
            id: "ad-Nacional-0-1".to_string(),
            platform: "TikTok Ads".to_string(),
            title: title.to_string(),
            description: String::new(),
            category: "PET".to_string(),
            trend_score: TrendScore::Hot,
            active_days: 10,
            source_url: "https://example.com".to_string(),
            thumbnail: "https://example.com/t.jpg".to_string(),
            metrics: AdMetrics::default(),
            region: Region::Nacional,
            is_winner: true,
            product_urls: Vec::new(),
        }
    }

    fn sample_analysis() -> Analysis {
        let mut analysis = Analysis {
            analysis_text: "Escale com criativos UGC.".to_string(),
            ..Analysis::default()
        };
        analysis
            .improved_copies
            .insert("fb_ad_copy".to_string(), "Nova copy".to_string());
        analysis.targeting.interests = vec!["pets".to_string()];
        analysis
    }

    #[test]
    fn filename_collapses_whitespace_runs() {
        assert_eq!(snapshot_filename("Escova Mágica"), "SpyEdge_Escova_Mágica.json");
        assert_eq!(snapshot_filename("a  b\tc"), "SpyEdge_a_b_c.json");
        assert_eq!(snapshot_filename("single"), "SpyEdge_single.json");
    }

    #[test]
    fn snapshot_carries_product_and_analysis() {
        let ad = sample_ad("Escova Mágica");
        let snapshot = project_snapshot(&ad, &sample_analysis());
        assert_eq!(snapshot["produto"], "Escova Mágica");
        assert_eq!(snapshot["analise"]["analysis"], "Escale com criativos UGC.");
        assert_eq!(snapshot["analise"]["improvedCopies"]["fb_ad_copy"], "Nova copy");
        assert_eq!(snapshot["analise"]["targeting"]["interests"][0], "pets");
    }

    #[test]
    fn write_snapshot_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("exports");
        let ad = sample_ad("Viral Gadget Pro");

        let path = write_snapshot(&target, &ad, &sample_analysis()).unwrap();
        assert_eq!(path.file_name().unwrap(), "SpyEdge_Viral_Gadget_Pro.json");

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["produto"], "Viral Gadget Pro");
    }
}
