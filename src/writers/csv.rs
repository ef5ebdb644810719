//! Write the [`Score`]s as CSV
//! It presents the scores in the same format as the published dataset,
//! metadata line included, and prints it on STDOUT.

use super::Writer;
use crate::models::{Metadata, Score};
use crate::scores::parser::SCORE_DATE_FORMAT;

/// A writer to print the scores as CSV.
pub struct CsvWriter {}

impl CsvWriter {
    /// Create a new CsvWriter
    pub fn new() -> Self {
        Self {}
    }
}

impl Writer for CsvWriter {
    /// Renders the scores
    fn render(&self, metadata: Option<&Metadata>, scores: &[Score]) -> String {
        let mut csv = String::new();
        if let Some(m) = metadata {
            csv.push_str(&format!(
                "#model_version:{},score_date:{}\n",
                m.model_version,
                m.score_date.format(SCORE_DATE_FORMAT)
            ));
        }
        csv.push_str("cve,epss,percentile\n");
        for score in scores {
            csv.push_str(&format!(
                "{},{},{}\n",
                score.cve, score.epss, score.percentile
            ));
        }
        csv
    }
}
