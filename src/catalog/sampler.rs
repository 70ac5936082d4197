//! Base catalog loading.
//!
//! Reads a CSV catalog with a header row and drops the position columns
//! (`ra`, `dec`, any case). Positions are assigned later by the jitterer.

use super::{Catalog, CatalogRecord, FieldValue, Schema};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Column names treated as position and stripped on load.
const POSITION_FIELDS: [&str; 2] = ["ra", "dec"];

/// Load every row of a CSV catalog.
///
/// # Errors
///
/// Returns [`Error::SourceUnavailable`] if the file cannot be opened or read,
/// and [`Error::Csv`] if a row is malformed.
pub fn sample<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    sample_with_limit(path, usize::MAX)
}

/// Load at most `limit` rows of a CSV catalog.
///
/// # Errors
///
/// Same as [`sample`].
pub fn sample_with_limit<P: AsRef<Path>>(path: P, limit: usize) -> Result<Catalog> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|source| Error::SourceUnavailable { path: path.to_path_buf(), source })?;

    let catalog = read_catalog(BufReader::new(file), limit).map_err(|e| unreadable(path, e))?;
    log::debug!(
        "sampled {} rows x {} fields from {}",
        catalog.len(),
        catalog.schema().len(),
        path.display()
    );
    Ok(catalog)
}

/// Load a CSV catalog from any reader.
///
/// # Errors
///
/// Returns [`Error::Csv`] if the header or a row cannot be decoded.
pub fn sample_reader<R: Read>(reader: R) -> Result<Catalog> {
    read_catalog(reader, usize::MAX)
}

/// Read failures on an opened source are still an unavailable source.
fn unreadable(path: &Path, err: Error) -> Error {
    match err {
        Error::Csv(e) if e.is_io_error() => {
            let source = match e.into_kind() {
                csv::ErrorKind::Io(source) => source,
                kind => io::Error::other(format!("{kind:?}")),
            };
            Error::SourceUnavailable { path: path.to_path_buf(), source }
        }
        other => other,
    }
}

fn read_catalog<R: Read>(reader: R, limit: usize) -> Result<Catalog> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let keep: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !POSITION_FIELDS.iter().any(|p| name.trim().eq_ignore_ascii_case(p)))
        .map(|(i, _)| i)
        .collect();

    let schema = Schema::new(keep.iter().map(|&i| headers[i].trim().to_string()));

    let mut records = Vec::new();
    for row in rdr.records().take(limit) {
        let row = row?;
        let values = keep.iter().map(|&i| FieldValue::parse(&row[i])).collect();
        records.push(CatalogRecord::new(values));
    }

    Ok(Catalog::new(schema, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SDSS_HEAD: &str = "\
objID,ra,dec,u,g,r,class
1237645941824356443,40.28,-0.71,19.2,17.9,17.1,GALAXY
1237645941824356444,40.31,-0.69,21.0,20.4,20.1,STAR
1237645941824356445,40.35,-0.72,18.5,17.2,16.8,QSO
";

    #[test]
    fn test_position_columns_are_stripped() {
        let catalog = sample_reader(SDSS_HEAD.as_bytes()).unwrap();

        assert_eq!(catalog.schema().fields(), &["objID", "u", "g", "r", "class"]);
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_positioned());
    }

    #[test]
    fn test_cells_are_typed() {
        let catalog = sample_reader(SDSS_HEAD.as_bytes()).unwrap();
        let first = catalog.rows()[0].record();

        assert_eq!(first.get(0), Some(&FieldValue::Int(1_237_645_941_824_356_443)));
        assert_eq!(first.get(1), Some(&FieldValue::Float(19.2)));
        assert_eq!(first.get(4), Some(&FieldValue::Text("GALAXY".to_string())));
    }

    #[test]
    fn test_uppercase_position_columns_are_stripped() {
        let csv = "RA,DEC,RADIUS\n1.0,2.0,0.5\n";
        let catalog = sample_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.schema().fields(), &["RADIUS"]);
    }

    #[test]
    fn test_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SDSS_HEAD.as_bytes()).unwrap();

        let catalog = sample_with_limit(file.path(), 2).unwrap();
        assert_eq!(catalog.len(), 2);

        let all = sample(file.path()).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let result = sample("/definitely/not/here/catalog.csv");
        assert!(matches!(result, Err(Error::SourceUnavailable { .. })));
    }

    #[test]
    fn test_unreadable_source_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = sample(dir.path());
        assert!(matches!(result, Err(Error::SourceUnavailable { path, .. }) if path == dir.path()));
    }

    #[test]
    fn test_ragged_row_in_file_is_csv_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n1,2\n3\n").unwrap();
        assert!(matches!(sample(file.path()), Err(Error::Csv(_))));
    }

    #[test]
    fn test_ragged_row_is_csv_error() {
        let csv = "a,b\n1,2\n3\n";
        let result = sample_reader(csv.as_bytes());
        assert!(matches!(result, Err(Error::Csv(_))));
    }

    #[test]
    fn test_header_only_gives_empty_catalog() {
        let catalog = sample_reader("objid,ra,dec\n".as_bytes()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.schema().len(), 1);
    }
}
