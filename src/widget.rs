//! State of a single mounted author list widget.

use serde::Serialize;
use tracing::debug;

use crate::{
    fragment,
    model::{AuthorsPayload, AuthorsResponse, Filters},
    Result,
};

/// Collaborations offered in the filter form, as value and label.
pub const COLLAB_OPTIONS: &[(&str, &str)] = &[
    ("IceCube", "IceCube Collaboration"),
    ("IceCube-PINGU", "IceCube/PINGU Collaboration"),
    ("IceCube-Gen2", "IceCube-Gen2 Collaboration"),
];

/// Formatting options used when the service does not announce its own.
pub const FORMATTING_OPTIONS: &[(&str, &str)] =
    &[("web", "web"), ("web-institution", "web by institution")];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Fetching { token: u64 },
    Failed { message: String },
}

/// A submitted filter snapshot, waiting for its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub token: u64,
    pub filters: Filters,
}

#[derive(Debug, Clone)]
pub struct AuthorList {
    filters: Filters,
    response: AuthorsResponse,
    tag: Option<String>,
    state: FetchState,
    latest_token: u64,
}

/// Combine the default formatting, the filters given by the embedding page
/// and the URL fragment into the filters for the first request. Fragment
/// values win over page values, which win over the default.
pub fn initial_filters(
    default_formatting: &str,
    page_filters: &Filters,
    fragment: &str,
) -> (Filters, Option<String>) {
    let mut filters = Filters {
        formatting: Some(default_formatting.to_string()),
        ..Default::default()
    };
    filters.merge(page_filters);
    let parsed = fragment::parse(fragment);
    filters.merge(&parsed.filters);
    (filters, parsed.tag)
}

impl AuthorList {
    /// Create the widget from the first response. The filters are replaced
    /// by what the response actually contains.
    pub fn new(response: AuthorsResponse, tag: Option<String>) -> Self {
        let filters = Filters {
            collab: Some(response.payload.title.clone()),
            date: Some(response.payload.date.clone()),
            formatting: Some(response.active_format.clone()),
        };
        Self {
            filters,
            response,
            tag: tag.filter(|t| !t.is_empty()),
            state: FetchState::Idle,
            latest_token: 0,
        }
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn active_format(&self) -> &str {
        &self.response.active_format
    }

    pub fn active_payload(&self) -> &AuthorsPayload {
        &self.response.payload
    }

    pub fn acknowledgements_text(&self) -> String {
        self.response.payload.acknowledgements_text()
    }

    /// Formatting options announced by the active payload, or the defaults.
    pub fn formatting_options(&self) -> Vec<(String, String)> {
        let announced = &self.response.payload.formatting_options;
        if announced.is_empty() {
            FORMATTING_OPTIONS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        } else {
            announced
                .iter()
                .map(|(k, v)| {
                    let label = v.as_str().map(str::to_string).unwrap_or_else(|| k.clone());
                    (k.clone(), label)
                })
                .collect()
        }
    }

    /// Start a new request with the given filters.
    ///
    /// The tag only makes sense for the data set it was chosen from, so it
    /// is cleared when the collaboration or the date changes.
    pub fn begin_submit(&mut self, filters: Filters) -> Submission {
        let payload = self.active_payload();
        if filters.date.as_deref() != Some(payload.date.as_str())
            || filters.collab.as_deref() != Some(payload.title.as_str())
        {
            self.tag = None;
        }
        self.latest_token += 1;
        self.filters = filters.clone();
        self.state = FetchState::Fetching {
            token: self.latest_token,
        };
        Submission {
            token: self.latest_token,
            filters,
        }
    }

    /// Apply the outcome of a request. Returns `false` if a newer request has
    /// been started in the meantime, in which case the outcome is dropped.
    pub fn finish_submit(&mut self, token: u64, result: Result<AuthorsResponse>) -> bool {
        if token != self.latest_token {
            debug!(
                token,
                latest = self.latest_token,
                "Discarding stale author list response"
            );
            return false;
        }
        match result {
            Ok(response) => {
                self.response = response;
                self.state = FetchState::Idle;
            }
            Err(e) => {
                self.state = FetchState::Failed {
                    message: e.to_string(),
                };
            }
        }
        true
    }

    /// The URL fragment (without `#`) describing the current filters and tag.
    pub fn location_hash(&self) -> String {
        fragment::write(&self.filters, self.tag.as_deref())
    }
}
