use serde::{Deserialize, Serialize};

use crate::models::song::{RequestStatus, RequestWithArtifact};

/// Dashboard tab. `Pending` means "not delivered yet", so it also covers
/// `generating` and `completed` requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Sent,
}

impl StatusFilter {
    pub fn matches(&self, status: RequestStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status != RequestStatus::Sent,
            StatusFilter::Sent => status == RequestStatus::Sent,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCounts {
    pub total: usize,
    pub awaiting_delivery: usize,
    pub sent: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListing {
    pub requests: Vec<RequestWithArtifact>,
    /// Always computed over every request, regardless of filter and search.
    pub counts: ReviewCounts,
}

/// Substring match on the phone number or the theme label. Blank queries
/// match everything.
pub fn matches_search(item: &RequestWithArtifact, query: &str) -> bool {
    let query = query.trim();
    query.is_empty()
        || item.request.contact.contains(query)
        || item.request.theme.label().contains(query)
}

/// Filters a newest-first listing; order is preserved.
pub fn review_listing(
    all: Vec<RequestWithArtifact>,
    filter: StatusFilter,
    search: Option<&str>,
) -> ReviewListing {
    let sent = all
        .iter()
        .filter(|item| item.request.status == RequestStatus::Sent)
        .count();
    let counts = ReviewCounts {
        total: all.len(),
        awaiting_delivery: all.len() - sent,
        sent,
    };

    let requests = all
        .into_iter()
        .filter(|item| filter.matches(item.request.status))
        .filter(|item| search.map_or(true, |q| matches_search(item, q)))
        .collect();

    ReviewListing { requests, counts }
}
