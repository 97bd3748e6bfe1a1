//! CSV input and labeled CSV output for batch scoring.
//!
//! ```rust
//! use emotion_pipelines::scoring::LabeledRow;
//! use emotion_pipelines::tabular::{read_text_column, write_labeled};
//!
//! # fn main() -> emotion_pipelines::error::Result<()> {
//! let input = "id,Tweet\n1,Best day ever\n2,\n3,So scared right now\n";
//! let column = read_text_column(input.as_bytes(), None)?;
//! assert_eq!(column.name, "Tweet");
//! assert_eq!(column.texts, ["Best day ever", "So scared right now"]);
//!
//! let labeled = vec![
//!     LabeledRow { text: column.texts[0].clone(), label: "joy".into() },
//!     LabeledRow { text: column.texts[1].clone(), label: "fear".into() },
//! ];
//! let mut out = Vec::new();
//! write_labeled(&mut out, &column, &labeled)?;
//! assert!(String::from_utf8(out).unwrap().starts_with("id,Tweet,predicted_emotion\n"));
//! # Ok(())
//! # }
//! ```

use std::io::{Read, Write};

use csv::StringRecord;

use crate::error::{PipelineError, Result};
use crate::scoring::LabeledRow;

/// Header names tried, in order, when no column is given.
pub const TEXT_COLUMN_CANDIDATES: [&str; 4] = ["text", "content", "Tweet", "sentence"];

/// Header of the column added by [`write_labeled`].
pub const PREDICTED_COLUMN: &str = "predicted_emotion";

/// Text cells of one CSV column, plus the full rows they came from.
#[derive(Debug, Clone)]
pub struct TextColumn {
    /// Header of the selected column.
    pub name: String,
    /// The input's header row.
    pub headers: StringRecord,
    /// Rows with a non-blank text cell, in input order.
    pub records: Vec<StringRecord>,
    /// The text cell of each entry in `records`.
    pub texts: Vec<String>,
}

impl TextColumn {
    /// Number of usable rows.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// True when every text cell was blank or the file had no rows.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Picks `explicit` if given, otherwise the first of [`TEXT_COLUMN_CANDIDATES`] present.
///
/// Header matching is exact and case-sensitive.
pub fn find_text_column(headers: &StringRecord, explicit: Option<&str>) -> Result<usize> {
    let position = |name: &str| headers.iter().position(|h| h == name);

    match explicit {
        Some(name) => position(name).ok_or_else(|| PipelineError::MissingColumn {
            candidates: vec![name.to_string()],
        }),
        None => TEXT_COLUMN_CANDIDATES
            .iter()
            .find_map(|name| position(name))
            .ok_or_else(|| PipelineError::MissingColumn {
                candidates: TEXT_COLUMN_CANDIDATES.iter().map(|c| c.to_string()).collect(),
            }),
    }
}

/// Reads a headed CSV and extracts the text column.
///
/// Rows whose text cell is empty or only whitespace are skipped.
pub fn read_text_column<R: Read>(reader: R, column: Option<&str>) -> Result<TextColumn> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let index = find_text_column(&headers, column)?;
    let name = headers.get(index).unwrap_or_default().to_string();

    let mut records = Vec::new();
    let mut texts = Vec::new();
    let mut skipped = 0usize;

    for record in csv_reader.records() {
        let record = record?;
        match record.get(index) {
            Some(text) if !text.trim().is_empty() => {
                texts.push(text.to_string());
                records.push(record);
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, column = %name, "skipped rows with blank text");
    }
    tracing::info!(rows = texts.len(), column = %name, "read text column");

    Ok(TextColumn {
        name,
        headers,
        records,
        texts,
    })
}

/// Writes `column`'s rows with a trailing [`PREDICTED_COLUMN`] holding each label.
///
/// `labeled` must line up with `column.records`.
pub fn write_labeled<W: Write>(writer: W, column: &TextColumn, labeled: &[LabeledRow]) -> Result<()> {
    if labeled.len() != column.records.len() {
        return Err(PipelineError::Unexpected(format!(
            "{} labels for {} rows",
            labeled.len(),
            column.records.len()
        )));
    }

    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut headers = column.headers.clone();
    headers.push_field(PREDICTED_COLUMN);
    csv_writer.write_record(&headers)?;

    for (record, row) in column.records.iter().zip(labeled) {
        let mut out = record.clone();
        out.push_field(&row.label);
        csv_writer.write_record(&out)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> StringRecord {
        StringRecord::from(names.to_vec())
    }

    #[test]
    fn candidates_are_tried_in_order() {
        let h = headers(&["sentence", "content", "id"]);
        assert_eq!(find_text_column(&h, None).unwrap(), 1);
    }

    #[test]
    fn header_match_is_case_sensitive() {
        let h = headers(&["Text", "tweet"]);
        let err = find_text_column(&h, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CSV must contain one of these columns: text, content, Tweet, sentence"
        );
    }

    #[test]
    fn explicit_column_overrides_candidates() {
        let h = headers(&["text", "body"]);
        assert_eq!(find_text_column(&h, Some("body")).unwrap(), 1);
        assert!(matches!(
            find_text_column(&h, Some("missing")),
            Err(PipelineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn blank_cells_are_skipped() {
        let input = "text,id\nhello,1\n   ,2\n,3\nbye,4\n";
        let column = read_text_column(input.as_bytes(), None).unwrap();
        assert_eq!(column.texts, ["hello", "bye"]);
        assert_eq!(column.records.len(), 2);
        assert_eq!(column.records[1].get(1), Some("4"));
    }

    #[test]
    fn malformed_csv_is_a_csv_error() {
        let input = "text,id\nhello,1,extra\n";
        let err = read_text_column(input.as_bytes(), None).unwrap_err();
        assert!(matches!(err, PipelineError::Csv(_)));
    }

    #[test]
    fn label_count_must_match_rows() {
        let column = read_text_column("text\na\nb\n".as_bytes(), None).unwrap();
        let labeled = vec![LabeledRow {
            text: "a".into(),
            label: "joy".into(),
        }];
        assert!(write_labeled(Vec::new(), &column, &labeled).is_err());
    }
}
