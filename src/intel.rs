// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 SpyEdge contributors

//! Ad mining and per-ad analysis on top of the collaborator client
//!
//! This is the boundary where the collaborator's loosely-shaped JSON is
//! validated and coerced into the typed catalog model. Raw payloads never
//! travel further into the crate.

use async_trait::async_trait;
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::catalog::{
    normalize_category, Ad, AdMetrics, Analysis, ProductUrl, Region, TrendScore,
};
use crate::config::{AppConfig, PromptConfig, SearchConfig};
use crate::gemini::GeminiClient;
use crate::Result;

/// Source of mined ads and analyses. The store and the web layer only ever
/// talk to this trait, so tests can substitute a scripted stub.
#[async_trait]
pub trait IntelSource: Send + Sync {
    /// Mine a batch of ads for a query and region. An empty query (or the
    /// configured discovery phrase) selects discovery mode.
    async fn mine_ads(&self, query: &str, region: Region) -> Result<Vec<Ad>>;

    /// Request a marketing analysis for one ad.
    async fn analyze_ad(&self, ad: &Ad) -> Result<Analysis>;
}

/// Production implementation backed by the Gemini client.
pub struct GeminiIntel {
    client: GeminiClient,
    search: SearchConfig,
    prompts: PromptConfig,
}

// Wire DTOs. Every field the collaborator may omit is optional here and
// coerced below; numbers arrive as JSON numbers and may be fractional.

#[derive(Deserialize)]
struct AdsEnvelope {
    #[serde(default)]
    ads: Vec<RawAd>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAd {
    platform: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnail: Option<String>,
    source_url: String,
    #[serde(default)]
    active_days: Option<f64>,
    #[serde(default)]
    trend_score: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    metrics: Option<RawMetrics>,
    #[serde(default)]
    product_urls: Vec<RawProductUrl>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawMetrics {
    #[serde(default)]
    likes: f64,
    #[serde(default)]
    comments: f64,
    #[serde(default)]
    shares: f64,
    #[serde(default)]
    estimated_clicks: f64,
}

#[derive(Deserialize)]
struct RawProductUrl {
    #[serde(default)]
    label: String,
    url: String,
}

impl GeminiIntel {
    pub fn new(client: GeminiClient, config: &AppConfig) -> Self {
        Self {
            client,
            search: config.search.clone(),
            prompts: config.prompts.clone(),
        }
    }

    fn mining_prompt(&self, query: &str, region: Region) -> String {
        let trimmed = query.trim();
        let discovery = trimmed.is_empty() || trimmed == self.search.discovery_query;
        if discovery {
            self.prompts
                .discovery
                .replace("{count}", &self.search.batch_size.to_string())
                .replace("{region}", region.as_str())
        } else {
            self.prompts
                .refine
                .replace("{query}", trimmed)
                .replace("{region}", region.as_str())
        }
    }

    fn analysis_prompt(&self, ad: &Ad) -> String {
        self.prompts
            .analysis
            .replace("{title}", &ad.title)
            .replace("{clicks}", &ad.metrics.estimated_clicks.to_string())
    }
}

#[async_trait]
impl IntelSource for GeminiIntel {
    async fn mine_ads(&self, query: &str, region: Region) -> Result<Vec<Ad>> {
        let prompt = self.mining_prompt(query, region);
        let value = self
            .client
            .generate_structured(&prompt, ads_response_schema())
            .await?;
        let envelope: AdsEnvelope = serde_json::from_value(value)?;

        let batch_ts = Utc::now().timestamp_millis();
        let received = envelope.ads.len();
        let ads: Vec<Ad> = envelope
            .ads
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                refine_ad(
                    raw,
                    region,
                    index,
                    batch_ts,
                    self.search.winner_likes_threshold,
                )
            })
            .collect();

        if ads.len() < received {
            debug!(
                "dropped {} ad(s) with unparseable source URLs",
                received - ads.len()
            );
        }
        info!("mined {} ad(s) for region {}", ads.len(), region);
        Ok(ads)
    }

    async fn analyze_ad(&self, ad: &Ad) -> Result<Analysis> {
        let prompt = self.analysis_prompt(ad);
        let value = self
            .client
            .generate_structured(&prompt, analysis_response_schema())
            .await?;
        let analysis: Analysis = serde_json::from_value(value)?;
        info!("analysis ready for ad {}", ad.id);
        Ok(analysis)
    }
}

/// Validate and coerce one raw ad. Returns `None` when the source URL cannot
/// be parsed even after normalization; such ads are dropped silently.
fn refine_ad(
    raw: RawAd,
    region: Region,
    index: usize,
    batch_ts: i64,
    winner_likes_threshold: u64,
) -> Option<Ad> {
    let source_url = match normalize_url(&raw.source_url) {
        Some(url) => url,
        None => {
            warn!("dropping ad '{}': unparseable source URL", raw.title);
            return None;
        }
    };

    let thumbnail = raw
        .thumbnail
        .filter(|t| t.starts_with("http"))
        .unwrap_or_else(|| screenshot_fallback(&source_url));

    let metrics = raw.metrics.unwrap_or_default();
    let likes = to_count(metrics.likes);
    let active_days = to_count(raw.active_days.unwrap_or(0.0)) as u32;

    // Refine the click estimate when the collaborator sends nothing usable.
    let estimated_clicks = if metrics.estimated_clicks > 0.0 {
        to_count(metrics.estimated_clicks)
    } else {
        likes * 15 + u64::from(active_days) * 30
    };

    let trend_score = TrendScore::from_label(raw.trend_score.as_deref().unwrap_or(""));
    let is_winner = trend_score == TrendScore::Hot || likes > winner_likes_threshold;

    let product_urls = raw
        .product_urls
        .into_iter()
        .filter_map(|p| {
            normalize_url(&p.url).map(|url| ProductUrl {
                label: p.label,
                url,
            })
        })
        .collect();

    Some(Ad {
        id: format!("ad-{}-{}-{}", region, index, batch_ts),
        platform: raw.platform,
        title: raw.title,
        description: raw.description,
        category: normalize_category(raw.category.as_deref().unwrap_or("")),
        trend_score,
        active_days,
        source_url,
        thumbnail,
        metrics: AdMetrics {
            likes,
            comments: to_count(metrics.comments),
            shares: to_count(metrics.shares),
            estimated_clicks,
        },
        region,
        is_winner,
        product_urls,
    })
}

/// Trim, prefix bare hosts with `https://`, and reject anything `Url` cannot
/// parse as an absolute URL.
fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    Url::parse(&candidate).ok().map(|_| candidate)
}

/// Deterministic screenshot-service URL used when the collaborator sends no
/// usable thumbnail.
fn screenshot_fallback(source_url: &str) -> String {
    format!(
        "https://s0.wp.com/mshots/v1/{}?w=800&h=1000",
        utf8_percent_encode(source_url, NON_ALPHANUMERIC)
    )
}

fn to_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}

/// Declared schema for the mining response, mirrored by [`AdsEnvelope`].
fn ads_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "ads": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "platform": { "type": "STRING" },
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "thumbnail": { "type": "STRING" },
                        "sourceUrl": { "type": "STRING" },
                        "activeDays": { "type": "NUMBER" },
                        "trendScore": { "type": "STRING" },
                        "category": { "type": "STRING" },
                        "metrics": {
                            "type": "OBJECT",
                            "properties": {
                                "likes": { "type": "NUMBER" },
                                "comments": { "type": "NUMBER" },
                                "shares": { "type": "NUMBER" },
                                "estimatedClicks": { "type": "NUMBER" }
                            },
                            "required": ["likes", "comments", "shares", "estimatedClicks"]
                        },
                        "productUrls": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "label": { "type": "STRING" },
                                    "url": { "type": "STRING" }
                                },
                                "required": ["label", "url"]
                            }
                        }
                    },
                    "required": ["platform", "sourceUrl", "title", "trendScore", "category", "metrics"]
                }
            }
        },
        "required": ["ads"]
    })
}

/// Declared schema for the analysis response, mirrored by [`Analysis`].
fn analysis_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "analysis": { "type": "STRING" },
            "improvedCopies": {
                "type": "OBJECT",
                "properties": {
                    "vsl_script": { "type": "STRING" },
                    "advertorial_headline": { "type": "STRING" },
                    "fb_ad_copy": { "type": "STRING" }
                }
            },
            "targeting": {
                "type": "OBJECT",
                "properties": {
                    "interests": { "type": "ARRAY", "items": { "type": "STRING" } }
                }
            }
        },
        "required": ["analysis", "improvedCopies", "targeting"]
    })
}
