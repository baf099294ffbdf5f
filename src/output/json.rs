//! JSON file output
//!
//! Documents are written as one pretty-printed array in crawl order. Text is
//! kept as UTF-8; Vietnamese diacritics are not escaped.

use crate::output::{OutputError, OutputResult};
use crate::record::DocumentRecord;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes the records to `path`, creating parent directories as needed
///
/// # Arguments
///
/// * `path` - Destination file; replaced if it exists
/// * `records` - Documents in output order
pub fn write_json(path: &Path, records: &[DocumentRecord]) -> OutputResult<()> {
    let io_err = |source| OutputError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let documents = records
        .iter()
        .map(DocumentRecord::to_json)
        .collect::<Result<Vec<_>, _>>()?;

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &documents)?;
    writer.write_all(b"\n").map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    Ok(())
}

/// Reads records previously written by [`write_json`]
pub fn read_json(path: &Path) -> OutputResult<Vec<DocumentRecord>> {
    let file = File::open(path).map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DateValue, OrganizationIds};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(id: i64, subject: &str) -> DocumentRecord {
        DocumentRecord {
            id,
            code: format!("{}/2024/QĐ", id),
            subject: subject.to_string(),
            description: String::new(),
            published_date: Some(DateValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())),
            effective_date: None,
            expiry_date: Some(DateValue::Raw("Không xác định".to_string())),
            fields: vec![],
            organization_ids: OrganizationIds::Ids(vec![1]),
            law_type: "Quyết định".to_string(),
            content: "<p>Điều 1.</p>".to_string(),
        }
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/laws.json");

        write_json(&path, &[record(1, "Một")]).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_write_keeps_utf8_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("laws.json");

        write_json(&path, &[record(2, "Hai"), record(1, "Thuế")]).unwrap();
        let text = fs::read_to_string(&path).unwrap();

        assert!(text.contains("Thuế"));
        assert!(text.find("\"id\": 2").unwrap() < text.find("\"id\": 1").unwrap());
    }

    #[test]
    fn test_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("laws.json");
        let records = vec![record(5, "Năm"), record(6, "Sáu")];

        write_json(&path, &records).unwrap();

        assert_eq!(read_json(&path).unwrap(), records);
    }

    #[test]
    fn test_write_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");

        write_json(&path, &[]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_json(Path::new("/nonexistent/laws.json"));
        assert!(matches!(result, Err(OutputError::Io { .. })));
    }
}
