//! In this module are declared the entities manipulated by this program

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Every CVE identifier starts with this prefix.
/// Example: CVE-2012-6708
pub const CVE_PREFIX: &str = "CVE-";

/// Whether the given identifier has the shape of a CVE identifier.
pub fn is_cve_id(identifier: &str) -> bool {
    identifier.starts_with(CVE_PREFIX)
}

/// Represents the EPSS score of a CVE.
///
/// A `Score` stored in the cache has always been validated: the identifier
/// starts with [`CVE_PREFIX`], and both `epss` and `percentile` are in
/// `[0.0, 1.0]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Score {
    /// The CVE identifier.
    /// Example: CVE-1999-0001
    pub cve: String,
    /// The probability of exploitation activity in the next 30 days.
    /// Example: 0.00383
    pub epss: f64,
    /// The proportion of all scored CVEs with the same or a lower score.
    /// Example: 0.72361
    pub percentile: f64,
}

impl Score {
    /// Creates a new score
    pub fn new(cve: &str, epss: f64, percentile: f64) -> Self {
        Score {
            cve: cve.to_string(),
            epss,
            percentile,
        }
    }
}

/// Represents the publication stamp of the dataset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metadata {
    /// The version of the model which computed the scores.
    /// Example: v2023.03.01
    pub model_version: String,
    /// When the scores were computed.
    /// Example: 2024-02-22T00:00:00+0000
    pub score_date: DateTime<Utc>,
}
