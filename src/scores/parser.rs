//! Parsing of the decompressed EPSS dataset.
//!
//! The dataset looks like this:
//!
//! ```text
//! #model_version:v2023.03.01,score_date:2024-02-22T00:00:00+0000
//! cve,epss,percentile
//! CVE-1999-0001,0.00383,0.72361
//! CVE-1999-0002,0.02091,0.88751
//! ```
//!
//! A structural problem (metadata, header, number of fields) is fatal and
//! rejects the whole dataset. A problem in the content of a cell (identifier,
//! score, percentile) only drops the row.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use log::{debug, trace};

use crate::error::ParseError;
use crate::models::{is_cve_id, Metadata, Score};

/// The header the dataset must present after the metadata line.
pub const EXPECTED_HEADER: [&str; 3] = ["cve", "epss", "percentile"];

/// The format of the score date, always in UTC.
/// Example: 2024-02-22T00:00:00+0000
pub const SCORE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+0000";

/// The scores indexed by CVE identifier.
pub type ScoreMap = HashMap<String, Score>;

/// Parses the decompressed dataset into its metadata and scores.
pub fn parse(data: &[u8]) -> Result<(Metadata, ScoreMap), ParseError> {
    trace!("Running parser::parse()");
    let text = std::str::from_utf8(data)?;
    let (metadata_line, body) = text.split_once('\n').unwrap_or((text, ""));
    let metadata = parse_metadata(metadata_line)?;
    debug!(
        "Dataset model version {}, score date {}",
        metadata.model_version, metadata.score_date
    );

    // Blank lines are skipped by the reader. The field count is checked here
    // since a wrong count is fatal.
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());
    let mut records = reader.records();

    let header: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => Vec::new(),
    };
    if header != EXPECTED_HEADER {
        return Err(ParseError::UnexpectedHeader(header));
    }

    let mut scores = ScoreMap::new();
    let mut skipped = 0;
    for record in records {
        let record = record?;
        // The metadata line comes before the first line seen by the reader
        let line_number = record.position().map_or(0, |p| p.line() as usize + 1);
        if record.len() != 3 {
            return Err(ParseError::MalformedRow {
                line: line_number,
                fields: record.len(),
            });
        }

        match parse_row(&record) {
            Some(score) => {
                scores.insert(score.cve.clone(), score);
            }
            None => {
                trace!("Skipping invalid row at line {}: {:?}", line_number, record);
                skipped += 1;
            }
        }
    }

    debug!("Parsed {} scores, skipped {} rows", scores.len(), skipped);
    Ok((metadata, scores))
}

/// Parses the metadata line.
/// Example: #model_version:v2023.03.01,score_date:2024-02-22T00:00:00+0000
pub fn parse_metadata(line: &str) -> Result<Metadata, ParseError> {
    trace!("Running parser::parse_metadata()");
    let content = line
        .strip_prefix('#')
        .ok_or_else(|| ParseError::MalformedMetadata(line.to_string()))?
        .trim();

    let parts: Vec<&str> = content.split(',').collect();
    if parts.len() != 2 {
        return Err(ParseError::MalformedMetadata(line.to_string()));
    }

    let mut model_version = None;
    let mut score_date = None;
    for part in parts {
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "model_version" if !value.is_empty() => model_version = Some(value.to_string()),
            "score_date" => {
                let date = NaiveDateTime::parse_from_str(value, SCORE_DATE_FORMAT).map_err(
                    |source| ParseError::InvalidScoreDate {
                        value: value.to_string(),
                        source,
                    },
                )?;
                score_date = Some(date.and_utc());
            }
            _ => {}
        }
    }

    Ok(Metadata {
        model_version: model_version.ok_or(ParseError::MissingMetadataField("model_version"))?,
        score_date: score_date.ok_or(ParseError::MissingMetadataField("score_date"))?,
    })
}

/// Validates the content of a row holding exactly three fields.
/// Returns None when the row has to be skipped.
fn parse_row(record: &StringRecord) -> Option<Score> {
    let cve = &record[0];
    if !is_cve_id(cve) {
        return None;
    }
    let epss = parse_probability(&record[1])?;
    let percentile = parse_probability(&record[2])?;
    Some(Score::new(cve, epss, percentile))
}

/// Parses a value which must be in [0.0, 1.0].
fn parse_probability(field: &str) -> Option<f64> {
    let value: f64 = field.parse().ok()?;
    // NaN is not contained in the range either
    (0.0..=1.0).contains(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const METADATA: &str = "#model_version:v2023.03.01,score_date:2024-02-22T00:00:00+0000";

    fn dataset(rows: &[&str]) -> Vec<u8> {
        let mut text = format!("{}\ncve,epss,percentile\n", METADATA);
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text.into_bytes()
    }

    #[test]
    fn parses_valid_dataset() {
        let data = dataset(&["CVE-1999-0001,0.00383,0.72361", "CVE-1999-0002,0.02091,0.88751"]);
        let (metadata, scores) = parse(&data).unwrap();
        assert_eq!("v2023.03.01", metadata.model_version);
        assert_eq!(
            Utc.with_ymd_and_hms(2024, 2, 22, 0, 0, 0).unwrap(),
            metadata.score_date
        );
        assert_eq!(2, scores.len());
        assert_eq!(
            &Score::new("CVE-1999-0002", 0.02091, 0.88751),
            scores.get("CVE-1999-0002").unwrap()
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        let data = dataset(&["CVE-1999-0001,0.00383,0.72361", "CVE-1999-0002,0.02091,0.88751"]);
        assert_eq!(parse(&data).unwrap(), parse(&data).unwrap());
    }

    #[test]
    fn accepts_crlf_and_blank_lines() {
        let data = format!(
            "{}\r\ncve,epss,percentile\r\nCVE-1999-0001,0.1,0.2\r\n\r\nCVE-1999-0002,0.3,0.4\r\n",
            METADATA
        );
        let (_, scores) = parse(data.as_bytes()).unwrap();
        assert_eq!(2, scores.len());
    }

    #[test]
    fn empty_body_is_valid() {
        let (_, scores) = parse(&dataset(&[])).unwrap();
        assert!(scores.is_empty());
    }

    #[test]
    fn skips_invalid_cells_but_keeps_siblings() {
        let data = dataset(&[
            "CVE-1999-0001,invalid,0.72361",
            "CVE-1999-0002,0.02091,invalid",
            "CVE-1999-0003,1.5,0.5",
            "CVE-1999-0004,0.5,-0.1",
            "CVE-1999-0005,NaN,0.5",
            "NOT-A-CVE,0.1,0.1",
            "CVE-1999-0006,0.1,0.9",
        ]);
        let (_, scores) = parse(&data).unwrap();
        assert_eq!(1, scores.len());
        assert!(scores.contains_key("CVE-1999-0006"));
    }

    #[test]
    fn accepts_range_bounds() {
        let data = dataset(&["CVE-1999-0001,0,1", "CVE-1999-0002,1.0,0.0"]);
        let (_, scores) = parse(&data).unwrap();
        assert_eq!(2, scores.len());
    }

    #[test]
    fn emitted_scores_are_valid() {
        let data = dataset(&[
            "CVE-1999-0001,0.00383,0.72361",
            "XCVE-1999-0002,0.1,0.1",
            "CVE-1999-0003,2,0.1",
            "CVE-1999-0004,0.3,0.99",
        ]);
        let (_, scores) = parse(&data).unwrap();
        for (cve, score) in &scores {
            assert_eq!(cve, &score.cve);
            assert!(score.cve.starts_with("CVE-"));
            assert!((0.0..=1.0).contains(&score.epss));
            assert!((0.0..=1.0).contains(&score.percentile));
        }
    }

    #[test]
    fn last_duplicate_wins() {
        let data = dataset(&["CVE-1999-0001,0.1,0.1", "CVE-1999-0001,0.2,0.3"]);
        let (_, scores) = parse(&data).unwrap();
        assert_eq!(1, scores.len());
        assert_eq!(&Score::new("CVE-1999-0001", 0.2, 0.3), &scores["CVE-1999-0001"]);
    }

    #[test]
    fn invalid_duplicate_does_not_erase_previous() {
        let data = dataset(&["CVE-1999-0001,0.1,0.1", "CVE-1999-0001,invalid,0.3"]);
        let (_, scores) = parse(&data).unwrap();
        assert_eq!(&Score::new("CVE-1999-0001", 0.1, 0.1), &scores["CVE-1999-0001"]);
    }

    #[test]
    fn missing_field_is_fatal() {
        let data = dataset(&["CVE-1999-0001,0.00383,0.72361", "CVE-1999-0002,0.02091"]);
        assert!(matches!(
            parse(&data),
            Err(ParseError::MalformedRow { line: 4, fields: 2 })
        ));
    }

    #[test]
    fn extra_field_is_fatal() {
        let data = dataset(&[
            "CVE-1999-0001,0.00383,0.72361,extra-field",
            "CVE-1999-0002,0.02091,0.88751",
        ]);
        assert!(matches!(
            parse(&data),
            Err(ParseError::MalformedRow { line: 3, fields: 4 })
        ));
    }

    #[test]
    fn unquotes_fields() {
        let data = format!(
            "{}\n\"cve\",\"epss\",\"percentile\"\n\"CVE-1999-0001\",\"0.00383\",\"0.72361\"\n",
            METADATA
        );
        let (_, scores) = parse(data.as_bytes()).unwrap();
        assert_eq!(
            &Score::new("CVE-1999-0001", 0.00383, 0.72361),
            &scores["CVE-1999-0001"]
        );
    }

    #[test]
    fn quoted_comma_does_not_change_field_count() {
        let data = dataset(&["CVE-1999-0001,\"0,5\",0.1", "CVE-1999-0002,0.5,0.1"]);
        let (_, scores) = parse(&data).unwrap();
        assert_eq!(1, scores.len());
        assert!(scores.contains_key("CVE-1999-0002"));
    }

    #[test]
    fn wrong_shape_is_fatal_even_with_invalid_identifier() {
        let data = dataset(&["NOT-A-CVE,0.1"]);
        assert!(matches!(parse(&data), Err(ParseError::MalformedRow { .. })));
    }

    #[test]
    fn rejects_unexpected_header() {
        let headers = [
            "identifier,score,percentile",
            "CVE,EPSS,PERCENTILE",
            "epss,cve,percentile",
            "cve,epss",
            "cve,epss,percentile,extra",
        ];
        for header in headers {
            let data = format!("{}\n{}\nCVE-1999-0001,0.1,0.1\n", METADATA, header);
            assert!(
                matches!(parse(data.as_bytes()), Err(ParseError::UnexpectedHeader(_))),
                "header {} should be rejected",
                header
            );
        }
    }

    #[test]
    fn missing_header_is_fatal() {
        let data = format!("{}\n", METADATA);
        assert!(matches!(
            parse(data.as_bytes()),
            Err(ParseError::UnexpectedHeader(h)) if h.is_empty()
        ));
    }

    #[test]
    fn empty_input_is_fatal() {
        assert!(matches!(parse(b""), Err(ParseError::MalformedMetadata(_))));
    }

    #[test]
    fn invalid_utf8_is_fatal() {
        assert!(matches!(
            parse(&[0x23, 0xff, 0xfe, 0x0a]),
            Err(ParseError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn metadata_requires_comment_prefix() {
        assert!(matches!(
            parse_metadata("model_version:v1,score_date:2024-02-22T00:00:00+0000"),
            Err(ParseError::MalformedMetadata(_))
        ));
    }

    #[test]
    fn metadata_requires_two_parts() {
        for line in [
            "#model_version:v1",
            "#model_version:v1,score_date:2024-02-22T00:00:00+0000,extra:1",
            "#",
        ] {
            assert!(
                matches!(parse_metadata(line), Err(ParseError::MalformedMetadata(_))),
                "line {} should be rejected",
                line
            );
        }
    }

    #[test]
    fn metadata_requires_both_keys() {
        assert!(matches!(
            parse_metadata("#model_version:v1,other:2"),
            Err(ParseError::MissingMetadataField("score_date"))
        ));
        assert!(matches!(
            parse_metadata("#score_date:2024-02-22T00:00:00+0000,other:2"),
            Err(ParseError::MissingMetadataField("model_version"))
        ));
        assert!(matches!(
            parse_metadata("#model_version:,score_date:2024-02-22T00:00:00+0000"),
            Err(ParseError::MissingMetadataField("model_version"))
        ));
    }

    #[test]
    fn metadata_rejects_invalid_score_date() {
        for date in [
            "2024-02-22",
            "2024-02-22T00:00:00Z",
            "2024-02-22T00:00:00+0100",
            "yesterday",
        ] {
            let line = format!("#model_version:v1,score_date:{}", date);
            assert!(
                matches!(parse_metadata(&line), Err(ParseError::InvalidScoreDate { .. })),
                "date {} should be rejected",
                date
            );
        }
    }

    #[test]
    fn metadata_tolerates_spaces() {
        let metadata =
            parse_metadata("# model_version: v2023.03.01 , score_date: 2024-02-22T12:30:00+0000 \n")
                .unwrap();
        assert_eq!("v2023.03.01", metadata.model_version);
        assert_eq!(
            Utc.with_ymd_and_hms(2024, 2, 22, 12, 30, 0).unwrap(),
            metadata.score_date
        );
    }

    #[test]
    fn invalid_score_date_in_dataset_is_fatal() {
        let data = b"#model_version:v1,score_date:not-a-date\ncve,epss,percentile\n";
        assert!(matches!(parse(data), Err(ParseError::InvalidScoreDate { .. })));
    }
}
