// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 SpyEdge contributors

//! Domain model for mined ads and the pure aggregation/filter core
//!
//! Everything here is deterministic and side-effect free: the displayed subset
//! and the category sidebar are pure functions of the current ad list and the
//! two filter selectors.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SpyEdgeError;

/// Category assigned when the collaborator sends none.
pub const DEFAULT_CATEGORY: &str = "PRODUTO";

/// Coarse market scope for a mining run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    Nacional,
    Internacional,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Nacional => "Nacional",
            Region::Internacional => "Internacional",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = SpyEdgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nacional" => Ok(Region::Nacional),
            "internacional" => Ok(Region::Internacional),
            other => Err(SpyEdgeError::Config(format!(
                "unknown region '{}', expected 'nacional' or 'internacional'",
                other
            ))),
        }
    }
}

/// Momentum label assigned per ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendScore {
    Hot,
    Scaling,
    New,
}

impl TrendScore {
    /// Coerce a free-text label from the collaborator. Unknown labels become
    /// `New` instead of failing the whole batch.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "HOT" => TrendScore::Hot,
            "SCALING" => TrendScore::Scaling,
            _ => TrendScore::New,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendScore::Hot => "HOT",
            TrendScore::Scaling => "SCALING",
            TrendScore::New => "NEW",
        }
    }
}

/// Engagement metrics reported for one ad.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdMetrics {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub estimated_clicks: u64,
}

/// Labelled link to a product page associated with an ad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUrl {
    pub label: String,
    pub url: String,
}

/// One mined advertisement record.
///
/// Ads are immutable once mined; the full set is replaced on each search.
/// `id` is unique within one batch only (batch index + timestamp) — no
/// cross-batch identity is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub id: String,
    pub platform: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Upper-cased, trimmed category label.
    pub category: String,
    pub trend_score: TrendScore,
    pub active_days: u32,
    pub source_url: String,
    pub thumbnail: String,
    pub metrics: AdMetrics,
    pub region: Region,
    pub is_winner: bool,
    #[serde(default)]
    pub product_urls: Vec<ProductUrl>,
}

/// Derived projection over the current ad set: one bucket per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// AI-generated marketing commentary for one ad.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[serde(rename = "analysis")]
    pub analysis_text: String,
    /// Creative-slot name (e.g. `vsl_script`) to suggested copy.
    #[serde(default)]
    pub improved_copies: BTreeMap<String, String>,
    #[serde(default)]
    pub targeting: Targeting,
}

/// Estimated audience for the improved creatives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Targeting {
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Upper-case + trim a category label so case variants collapse into one
/// bucket. Empty labels fall back to [`DEFAULT_CATEGORY`].
pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_uppercase()
    }
}

/// Count ads per normalized category, sorted by count descending.
///
/// The sort is stable, so categories with equal counts keep first-seen order.
pub fn aggregate_categories(ads: &[Ad]) -> Vec<CategoryCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();

    for ad in ads {
        let name = normalize_category(&ad.category);
        match index.get(&name) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                index.insert(name.clone(), counts.len());
                counts.push(CategoryCount { name, count: 1 });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Platform selector: wildcard or a case-insensitive substring match against
/// the ad's platform field ("TIKTOK" matches "TikTok Ads").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformFilter {
    All,
    Contains(String),
}

impl PlatformFilter {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("ALL") {
            PlatformFilter::All
        } else {
            PlatformFilter::Contains(trimmed.to_uppercase())
        }
    }

    pub fn matches(&self, ad: &Ad) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Contains(needle) => ad.platform.to_uppercase().contains(needle.as_str()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PlatformFilter::All => "ALL",
            PlatformFilter::Contains(needle) => needle,
        }
    }
}

/// Category selector: wildcard or an exact match on the normalized category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Exact(String),
}

impl CategoryFilter {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("ALL") {
            CategoryFilter::All
        } else {
            CategoryFilter::Exact(normalize_category(trimmed))
        }
    }

    pub fn matches(&self, ad: &Ad) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Exact(name) => normalize_category(&ad.category) == *name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => "ALL",
            CategoryFilter::Exact(name) => name,
        }
    }
}

/// Apply both selectors with AND semantics, preserving input order.
pub fn filter_ads<'a>(
    ads: &'a [Ad],
    platform: &PlatformFilter,
    category: &CategoryFilter,
) -> Vec<&'a Ad> {
    ads.iter()
        .filter(|ad| platform.matches(ad) && category.matches(ad))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(id: &str, platform: &str, category: &str) -> Ad {
        Ad {
            id: id.to_string(),
            platform: platform.to_string(),
            title: format!("Ad {}", id),
            description: String::new(),
            category: category.to_string(),
            trend_score: TrendScore::New,
            active_days: 7,
            source_url: "https://example.com/ad".to_string(),
            thumbnail: "https://example.com/thumb.jpg".to_string(),
            metrics: AdMetrics::default(),
            region: Region::Nacional,
            is_winner: false,
            product_urls: Vec::new(),
        }
    }

    #[test]
    fn normalize_collapses_case_and_whitespace() {
        assert_eq!(normalize_category("  Pet  "), "PET");
        assert_eq!(normalize_category("beauty"), "BEAUTY");
        assert_eq!(normalize_category(""), DEFAULT_CATEGORY);
        assert_eq!(normalize_category("   "), DEFAULT_CATEGORY);
    }

    #[test]
    fn aggregate_collapses_case_variants() {
        let ads = vec![
            ad("1", "TikTok", "Pet"),
            ad("2", "TikTok", "PET"),
            ad("3", "Facebook", "Beauty"),
        ];
        let agg = aggregate_categories(&ads);
        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0], CategoryCount { name: "PET".to_string(), count: 2 });
        assert_eq!(agg[1], CategoryCount { name: "BEAUTY".to_string(), count: 1 });
    }

    #[test]
    fn aggregate_counts_sum_to_list_length() {
        let ads = vec![
            ad("1", "TikTok", "Pet"),
            ad("2", "Facebook", "Beauty"),
            ad("3", "TikTok", "pet"),
            ad("4", "Google", "Fitness"),
            ad("5", "TikTok", "FITNESS"),
        ];
        let agg = aggregate_categories(&ads);
        let total: usize = agg.iter().map(|c| c.count).sum();
        assert_eq!(total, ads.len());
    }

    #[test]
    fn aggregate_ties_keep_first_seen_order() {
        let ads = vec![
            ad("1", "TikTok", "Beauty"),
            ad("2", "TikTok", "Pet"),
            ad("3", "TikTok", "Fitness"),
        ];
        let agg = aggregate_categories(&ads);
        let names: Vec<&str> = agg.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["BEAUTY", "PET", "FITNESS"]);
    }

    #[test]
    fn aggregate_empty_list_is_empty() {
        assert!(aggregate_categories(&[]).is_empty());
    }

    #[test]
    fn wildcard_filters_are_identity() {
        let ads = vec![
            ad("1", "TikTok Ads", "Pet"),
            ad("2", "Facebook Ads", "Beauty"),
            ad("3", "Instagram", "Pet"),
        ];
        let visible = filter_ads(&ads, &PlatformFilter::All, &CategoryFilter::All);
        assert_eq!(visible.len(), ads.len());
        for (got, want) in visible.iter().zip(ads.iter()) {
            assert_eq!(**got, *want);
        }
    }

    #[test]
    fn platform_filter_uses_substring_semantics() {
        let filter = PlatformFilter::parse("TIKTOK");
        assert!(filter.matches(&ad("1", "TikTok Ads", "Pet")));
        assert!(!filter.matches(&ad("2", "Facebook", "Pet")));
    }

    #[test]
    fn category_filter_is_exact_after_normalization() {
        let ads = vec![
            ad("1", "TikTok", "Pet"),
            ad("2", "TikTok", "PET"),
            ad("3", "TikTok", "Beauty"),
        ];
        let filter = CategoryFilter::parse("pet");
        let visible = filter_ads(&ads, &PlatformFilter::All, &filter);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|a| normalize_category(&a.category) == "PET"));
    }

    #[test]
    fn filters_combine_with_and_semantics() {
        let ads = vec![
            ad("1", "TikTok Ads", "Pet"),
            ad("2", "TikTok Ads", "Beauty"),
            ad("3", "Facebook Ads", "Pet"),
        ];
        let visible = filter_ads(
            &ads,
            &PlatformFilter::parse("TIKTOK"),
            &CategoryFilter::parse("PET"),
        );
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "1");
    }

    #[test]
    fn filter_preserves_relative_order() {
        let ads = vec![
            ad("1", "TikTok", "Pet"),
            ad("2", "Facebook", "Pet"),
            ad("3", "TikTok", "Pet"),
        ];
        let visible = filter_ads(&ads, &PlatformFilter::parse("TIKTOK"), &CategoryFilter::All);
        let ids: Vec<&str> = visible.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn parse_all_is_case_insensitive() {
        assert_eq!(PlatformFilter::parse("all"), PlatformFilter::All);
        assert_eq!(PlatformFilter::parse(""), PlatformFilter::All);
        assert_eq!(CategoryFilter::parse("All"), CategoryFilter::All);
    }

    #[test]
    fn trend_score_coerces_unknown_labels() {
        assert_eq!(TrendScore::from_label("hot"), TrendScore::Hot);
        assert_eq!(TrendScore::from_label(" SCALING "), TrendScore::Scaling);
        assert_eq!(TrendScore::from_label("viral"), TrendScore::New);
        assert_eq!(TrendScore::from_label(""), TrendScore::New);
    }

    #[test]
    fn region_parses_and_displays() {
        assert_eq!("nacional".parse::<Region>().unwrap(), Region::Nacional);
        assert_eq!("Internacional".parse::<Region>().unwrap(), Region::Internacional);
        assert!("global".parse::<Region>().is_err());
        assert_eq!(Region::Nacional.to_string(), "Nacional");
    }
}
