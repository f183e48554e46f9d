use crate::error::{DatasetError, Result};
use csv::WriterBuilder;
use std::path::Path;
use tracing::info;

/// Writes string rows to a CSV file with a header. Values are written as
/// text; nothing is converted to numbers.
pub struct CsvDatasetWriter {
    delimiter: u8,
}

impl CsvDatasetWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Returns the number of data rows written. Failing to open the file is
    /// reported as [`DatasetError::OutputFile`].
    pub fn write_rows(
        &self,
        path: &Path,
        header: &[String],
        rows: &[Vec<String>],
    ) -> Result<usize> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(path)
            .map_err(|e| DatasetError::OutputFile(path.to_path_buf(), e))?;

        writer.write_record(header)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(rows.len())
    }
}

impl Default for CsvDatasetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("dataset.csv");
        let header = vec!["datetime".to_string(), "o_conds".to_string()];
        let rows = vec![
            vec!["20240101-12:00".to_string(), "Light Rain, Fog".to_string()],
            vec!["20240101-13:00".to_string(), String::new()],
        ];

        let written = CsvDatasetWriter::new().write_rows(&path, &header, &rows)?;

        assert_eq!(written, 2);
        assert_eq!(
            fs::read_to_string(&path)?,
            "datetime,o_conds\n20240101-12:00,\"Light Rain, Fog\"\n20240101-13:00,\n"
        );
        Ok(())
    }

    #[test]
    fn test_header_only_when_no_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("empty.csv");

        CsvDatasetWriter::with_delimiter(b';').write_rows(
            &path,
            &["datetime".to_string(), "o_tempm".to_string()],
            &[],
        )?;

        assert_eq!(fs::read_to_string(&path)?, "datetime;o_tempm\n");
        Ok(())
    }

    #[test]
    fn test_unopenable_destination() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("dataset.csv");

        let err = CsvDatasetWriter::new()
            .write_rows(&path, &["datetime".to_string()], &[])
            .unwrap_err();
        assert!(matches!(err, DatasetError::OutputFile(_, _)));
    }
}
