// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 SpyEdge contributors

//! Application state: the ad list, filters, and the selection state machine
//!
//! `AdStore` is the single owner of UI state. Asynchronous work (mining,
//! analysis) runs outside the store: callers take a ticket, await the
//! collaborator, then commit the outcome. A ticket whose epoch no longer
//! matches is stale and its result is discarded, so only the latest issued
//! request is ever applied.

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{
    aggregate_categories, filter_ads, Ad, Analysis, CategoryCount, CategoryFilter, PlatformFilter,
    Region,
};
use crate::SpyEdgeError;

/// Lifecycle of the current mining run. `Failed` is distinguishable from a
/// legitimately empty `Ready` so callers and tests can tell the two apart,
/// but both degrade to an empty list — nothing propagates outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Selection state machine for the analysis panel.
///
/// `Idle` → `Loading` → `Ready` | `Failed`; selecting another ad or clearing
/// the selection abandons the cycle and invalidates in-flight results.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    Idle,
    Loading { ad: Ad },
    Ready { ad: Ad, analysis: Analysis },
    Failed { ad: Ad },
}

/// Handle for one issued search; commit is ignored once a newer search began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    epoch: u64,
}

/// Handle for one issued analysis request; carries the selected ad.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    epoch: u64,
    pub ad: Ad,
}

/// Single owner of the client-side state.
pub struct AdStore {
    region: Region,
    query: String,
    ads: Vec<Ad>,
    platform_filter: PlatformFilter,
    category_filter: CategoryFilter,
    search_status: FetchStatus,
    search_epoch: u64,
    selection: Selection,
    selection_epoch: u64,
}

impl AdStore {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            query: String::new(),
            ads: Vec::new(),
            platform_filter: PlatformFilter::All,
            category_filter: CategoryFilter::All,
            search_status: FetchStatus::Idle,
            search_epoch: 0,
            selection: Selection::Idle,
            selection_epoch: 0,
        }
    }

    /// Start a new mining run. Resets the category filter to `All` (the
    /// platform filter is orthogonal and survives searches) and invalidates
    /// any in-flight search.
    pub fn begin_search(&mut self, query: &str, region: Region) -> SearchTicket {
        self.query = query.trim().to_string();
        self.region = region;
        self.category_filter = CategoryFilter::All;
        self.search_status = FetchStatus::Loading;
        self.search_epoch += 1;
        SearchTicket {
            epoch: self.search_epoch,
        }
    }

    /// Apply the outcome of a mining run. Returns `false` when the ticket is
    /// stale (a newer search was issued meanwhile) and nothing was applied.
    ///
    /// On success the ad list is replaced wholesale, never merged. On error
    /// the list degrades to empty with `Failed` status; the error itself stops
    /// here.
    pub fn commit_search(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<Ad>, SpyEdgeError>,
    ) -> bool {
        if ticket.epoch != self.search_epoch {
            debug!("discarding stale search response (epoch {})", ticket.epoch);
            return false;
        }
        match outcome {
            Ok(ads) => {
                self.ads = ads;
                self.search_status = FetchStatus::Ready;
            }
            Err(e) => {
                warn!("mining failed, degrading to empty result set: {}", e);
                self.ads = Vec::new();
                self.search_status = FetchStatus::Failed;
            }
        }
        true
    }

    /// Select an ad for analysis. Any previous selection and any in-flight
    /// analysis are abandoned immediately. Returns `None` for unknown ids.
    pub fn select(&mut self, ad_id: &str) -> Option<AnalysisTicket> {
        let ad = self.ads.iter().find(|a| a.id == ad_id)?.clone();
        self.selection_epoch += 1;
        self.selection = Selection::Loading { ad: ad.clone() };
        Some(AnalysisTicket {
            epoch: self.selection_epoch,
            ad,
        })
    }

    /// Attach an analysis outcome to the selection the ticket belongs to.
    /// Returns `false` when the selection changed while the request was in
    /// flight; the late result is discarded rather than shown on the wrong ad.
    pub fn commit_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        outcome: Result<Analysis, SpyEdgeError>,
    ) -> bool {
        if ticket.epoch != self.selection_epoch {
            debug!(
                "discarding stale analysis for ad {} (epoch {})",
                ticket.ad.id, ticket.epoch
            );
            return false;
        }
        self.selection = match outcome {
            Ok(analysis) => Selection::Ready {
                ad: ticket.ad.clone(),
                analysis,
            },
            Err(e) => {
                warn!("analysis failed for ad {}: {}", ticket.ad.id, e);
                Selection::Failed {
                    ad: ticket.ad.clone(),
                }
            }
        };
        true
    }

    /// Return to `Idle`, discarding the analysis and invalidating in-flight
    /// requests.
    pub fn clear_selection(&mut self) {
        self.selection_epoch += 1;
        self.selection = Selection::Idle;
    }

    pub fn set_platform_filter(&mut self, filter: PlatformFilter) {
        self.platform_filter = filter;
    }

    pub fn set_category_filter(&mut self, filter: CategoryFilter) {
        self.category_filter = filter;
    }

    /// The displayed subset: both filters applied, input order preserved.
    pub fn visible_ads(&self) -> Vec<&Ad> {
        filter_ads(&self.ads, &self.platform_filter, &self.category_filter)
    }

    /// Frequency-sorted categories over the full (unfiltered) ad list.
    pub fn categories(&self) -> Vec<CategoryCount> {
        aggregate_categories(&self.ads)
    }

    /// The ad and analysis of a completed selection cycle, if any.
    pub fn ready_analysis(&self) -> Option<(&Ad, &Analysis)> {
        match &self.selection {
            Selection::Ready { ad, analysis } => Some((ad, analysis)),
            _ => None,
        }
    }

    pub fn ads(&self) -> &[Ad] {
        &self.ads
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn search_status(&self) -> FetchStatus {
        self.search_status
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn platform_filter(&self) -> &PlatformFilter {
        &self.platform_filter
    }

    pub fn category_filter(&self) -> &CategoryFilter {
        &self.category_filter
    }
}
