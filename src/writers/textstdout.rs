//! Write the [`Score`]s to standard output
//! It is the default writer, it presents the scores in a text
//! format and prints it on STDOUT.

use super::Writer;
use crate::models::{Metadata, Score};

/// A writer to print the scores in the terminal.
pub struct TextStdoutWriter {}

impl TextStdoutWriter {
    /// Create a new TextStdoutWriter
    pub fn new() -> Self {
        Self {}
    }
}

impl Writer for TextStdoutWriter {
    /// Renders one line per score under a title naming the dataset
    fn render(&self, metadata: Option<&Metadata>, scores: &[Score]) -> String {
        let title = match metadata {
            Some(m) => format!(
                "EPSS {} ({})",
                m.model_version,
                m.score_date.format("%Y-%m-%d")
            ),
            None => "EPSS".to_string(),
        };

        let mut text = format!("----------{}----------\n", title);
        for score in scores {
            text.push_str(&format!(
                "[{}] EPSS: {:.5}, percentile: {:.5}\n",
                score.cve, score.epss, score.percentile
            ));
        }
        text
    }
}
