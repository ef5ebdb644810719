//! Writing Scores
//!
//! Once the scores are read from the cache, it's up to a writer to present
//! them. It provides a common interface, allowing to change the output
//! format without affecting the rest of the application.

pub mod csv;
pub mod json;
pub mod textstdout;

use clap::{builder::PossibleValue, ValueEnum};

use crate::models::{Metadata, Score};

/// A trait to have a common interface between writers.
/// A writer has the responsibility to write the [`Score`]s in a way,
/// be it on standard output or in a file.
pub trait Writer {
    /// Renders the scores, along with the metadata of the dataset they
    /// come from.
    fn render(&self, metadata: Option<&Metadata>, scores: &[Score]) -> String;

    /// Write the scores on standard output
    fn write(&self, metadata: Option<&Metadata>, scores: &[Score]) {
        println!("{}", self.render(metadata, scores));
    }
}

/// This enum represents the writers that can be used.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Writers {
    /// Human readable text
    TextStdout,
    /// JSON document
    Json,
    /// CSV with a header line
    Csv,
}

impl Writers {
    /// Creates the writer matching the variant
    pub fn build(&self) -> Box<dyn Writer> {
        match self {
            Writers::TextStdout => Box::new(textstdout::TextStdoutWriter::new()),
            Writers::Json => Box::new(json::JsonWriter::new()),
            Writers::Csv => Box::new(csv::CsvWriter::new()),
        }
    }
}

impl ValueEnum for Writers {
    /// Lists the variants available for clap
    fn value_variants<'a>() -> &'a [Self] {
        &[Writers::TextStdout, Writers::Json, Writers::Csv]
    }

    /// Map each value to a possible value in clap
    fn to_possible_value(&self) -> Option<PossibleValue> {
        match &self {
            Writers::TextStdout => Some(PossibleValue::new("textstdout")),
            Writers::Json => Some(PossibleValue::new("json")),
            Writers::Csv => Some(PossibleValue::new("csv")),
        }
    }
}
