//! Response envelopes of the catalog API.

use serde::{Deserialize, Serialize};

/// Paginated list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    /// URL of the next page, absent on the last one.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Body of a batched game lookup.
#[derive(Debug, Clone, Serialize)]
pub struct GamesQuery<'a> {
    pub games: &'a [String],
}
