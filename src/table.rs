//! Reads label tables from CSV, using the header row as field names.
use std::io::Read;
use std::path::Path;

use log::debug;
use svglabel_core::Row;

use crate::error::PipelineError;

/// Reads every record of a CSV file as a [`Row`].
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<Row>, PipelineError> {
    let path = path.as_ref();
    let rows = read_rows(csv::Reader::from_path(path)?)?;
    debug!("Read {} rows from '{}'", rows.len(), path.display());
    Ok(rows)
}

/// Like [`read_csv`], from any reader.
pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<Row>, PipelineError> {
    read_rows(csv::Reader::from_reader(reader))
}

fn read_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<Row>, PipelineError> {
    let headers = reader.headers()?.clone();
    reader
        .records()
        .map(|record| -> Result<Row, PipelineError> {
            let record = record?;
            Ok(headers.iter().zip(record.iter()).collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names_fields() {
        let rows = read_csv_from("name,part no\nzero,0a\none,1b\n".as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some("zero"));
        assert_eq!(rows[1].get("part no"), Some("1b"));
        let names: Vec<&str> = rows[0].iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["name", "part no"]);
    }

    #[test]
    fn test_ragged_record_is_an_error() {
        let result = read_csv_from("a,b\n1,2,3\n".as_bytes());
        assert!(matches!(result, Err(PipelineError::Csv(_))));
    }
}
