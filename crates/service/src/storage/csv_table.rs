use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use crate::errors::ServiceError;

/// Header-addressed CSV file used as a flat table.
///
/// The header row is the schema: rows are read by column name, appends follow
/// the file's own header order, and full rewrites emit the fixed `columns`
/// order given at open time. The file is never created implicitly.
#[derive(Clone, Debug)]
pub struct CsvTable {
    file_path: PathBuf,
    columns: Vec<String>,
}

impl CsvTable {
    /// Open an existing table and verify every expected column is present.
    pub async fn open<P: Into<PathBuf>>(path: P, columns: &[&str]) -> Result<Self, ServiceError> {
        let table = Self {
            file_path: path.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        };
        let bytes = table.read_bytes().await?;
        table.headers(&bytes)?;
        Ok(table)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, ServiceError> {
        fs::read(&self.file_path)
            .await
            .map_err(|e| ServiceError::storage(&format!("read {}", self.file_path.display()), e))
    }

    fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
        ReaderBuilder::new().has_headers(true).trim(Trim::Headers).from_reader(bytes)
    }

    /// Header row of `bytes`, rejecting files without one or missing a column.
    fn headers(&self, bytes: &[u8]) -> Result<StringRecord, ServiceError> {
        let mut rdr = Self::reader(bytes);
        let headers = rdr.headers()?.clone();
        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(ServiceError::Storage(format!(
                "{} has no header row",
                self.file_path.display()
            )));
        }
        for column in &self.columns {
            if !headers.iter().any(|h| h == column) {
                return Err(ServiceError::Storage(format!(
                    "{} is missing column `{column}`",
                    self.file_path.display()
                )));
            }
        }
        Ok(headers)
    }

    /// Deserialize every row by header name.
    pub async fn read_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, ServiceError> {
        let bytes = self.read_bytes().await?;
        self.headers(&bytes)?;
        let mut rdr = Self::reader(&bytes);
        let rows = rdr.deserialize::<T>().collect::<Result<Vec<T>, csv::Error>>()?;
        debug!(path = %self.file_path.display(), rows = rows.len(), "csv table read");
        Ok(rows)
    }

    /// Append one row without rewriting the file.
    pub async fn append<T: Serialize>(&self, row: &T) -> Result<(), ServiceError> {
        let bytes = self.read_bytes().await?;
        let headers = self.headers(&bytes)?;
        let cells = to_cells(row)?;

        let record: Vec<&str> = headers
            .iter()
            .map(|h| cells.iter().find(|(k, _)| k == h).map(|(_, v)| v.as_str()).unwrap_or(""))
            .collect();

        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        wtr.write_record(&record)?;
        let encoded = wtr
            .into_inner()
            .map_err(|e| ServiceError::storage("encode csv row", e.error()))?;

        let mut data = Vec::with_capacity(encoded.len() + 1);
        if !bytes.is_empty() && !bytes.ends_with(b"\n") {
            data.push(b'\n');
        }
        data.extend_from_slice(&encoded);

        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&self.file_path)
            .await
            .map_err(|e| ServiceError::storage(&format!("open {}", self.file_path.display()), e))?;
        file.write_all(&data)
            .await
            .map_err(|e| ServiceError::storage(&format!("append {}", self.file_path.display()), e))?;
        file.flush()
            .await
            .map_err(|e| ServiceError::storage(&format!("flush {}", self.file_path.display()), e))?;
        Ok(())
    }

    /// Rewrite the file keeping only rows whose `column` cell satisfies `keep`.
    ///
    /// Retained cells are copied verbatim; output columns follow the fixed
    /// order. Returns the number of rows dropped.
    pub async fn retain<F>(&self, column: &str, keep: F) -> Result<usize, ServiceError>
    where
        F: Fn(&str) -> bool,
    {
        let bytes = self.read_bytes().await?;
        let headers = self.headers(&bytes)?;
        let key_idx = headers.iter().position(|h| h == column).ok_or_else(|| {
            ServiceError::Storage(format!("{} has no column `{column}`", self.file_path.display()))
        })?;
        let positions: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| headers.iter().position(|h| h == c))
            .collect();

        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        wtr.write_record(&self.columns)?;

        let mut dropped = 0usize;
        let mut rdr = Self::reader(&bytes);
        for rec in rdr.records() {
            let rec = rec?;
            if !keep(rec.get(key_idx).unwrap_or("")) {
                dropped += 1;
                continue;
            }
            let out: Vec<&str> = positions
                .iter()
                .map(|p| p.and_then(|i| rec.get(i)).unwrap_or(""))
                .collect();
            wtr.write_record(&out)?;
        }
        let data = wtr
            .into_inner()
            .map_err(|e| ServiceError::storage("encode csv table", e.error()))?;

        // Write beside the target then rename so a failed write never truncates it.
        let tmp = self.file_path.with_extension("csv.tmp");
        fs::write(&tmp, &data)
            .await
            .map_err(|e| ServiceError::storage(&format!("write {}", tmp.display()), e))?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|e| ServiceError::storage(&format!("replace {}", self.file_path.display()), e))?;
        debug!(path = %self.file_path.display(), dropped, "csv table rewritten");
        Ok(dropped)
    }
}

/// Serialize `row` through a headed writer and pair header names with cells.
fn to_cells<T: Serialize>(row: &T) -> Result<Vec<(String, String)>, ServiceError> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    wtr.serialize(row)?;
    let buf = wtr
        .into_inner()
        .map_err(|e| ServiceError::storage("encode csv row", e.error()))?;

    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(buf.as_slice());
    let headers = rdr.headers()?.clone();
    let record = rdr
        .records()
        .next()
        .transpose()?
        .ok_or_else(|| ServiceError::Storage("row serialized to nothing".into()))?;
    Ok(headers
        .iter()
        .zip(record.iter())
        .map(|(h, v)| (h.to_string(), v.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{remove, temp_csv};
    use serde::Deserialize;

    const COLUMNS: [&str; 3] = ["Key", "Label", "Score"];

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        #[serde(rename = "Key")]
        key: String,
        #[serde(rename = "Label")]
        label: String,
        #[serde(rename = "Score")]
        score: f64,
    }

    #[tokio::test]
    async fn open_requires_existing_file() {
        let missing = std::env::temp_dir().join(format!("csv_table_{}.csv", uuid::Uuid::new_v4()));
        let err = CsvTable::open(&missing, &COLUMNS).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn open_rejects_missing_column_and_empty_file() -> Result<(), anyhow::Error> {
        let path = temp_csv("Key,Label\na,b\n").await?;
        let err = CsvTable::open(&path, &COLUMNS).await.unwrap_err();
        assert!(err.to_string().contains("Score"));
        remove(&path).await;

        let path = temp_csv("").await?;
        assert!(CsvTable::open(&path, &COLUMNS).await.is_err());
        remove(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn read_all_uses_header_names_not_positions() -> Result<(), anyhow::Error> {
        let path = temp_csv("Score,Key,Label\n1.5,a,Alpha\n2,b,Beta\n").await?;
        let table = CsvTable::open(&path, &COLUMNS).await?;
        let rows: Vec<Row> = table.read_all().await?;
        assert_eq!(
            rows,
            vec![
                Row { key: "a".into(), label: "Alpha".into(), score: 1.5 },
                Row { key: "b".into(), label: "Beta".into(), score: 2.0 },
            ]
        );
        remove(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn read_all_fails_on_malformed_rows() -> Result<(), anyhow::Error> {
        let path = temp_csv("Key,Label,Score\na,Alpha,not-a-number\n").await?;
        let table = CsvTable::open(&path, &COLUMNS).await?;
        assert!(table.read_all::<Row>().await.is_err());
        remove(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn append_follows_file_header_and_fixes_missing_newline() -> Result<(), anyhow::Error> {
        let path = temp_csv("Label,Key,Score\nAlpha,a,1").await?;
        let table = CsvTable::open(&path, &COLUMNS).await?;
        table
            .append(&Row { key: "b, c".into(), label: "Beta".into(), score: 2.5 })
            .await?;

        let text = tokio::fs::read_to_string(&path).await?;
        assert_eq!(text, "Label,Key,Score\nAlpha,a,1\nBeta,\"b, c\",2.5\n");

        let rows: Vec<Row> = table.read_all().await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].key, "b, c");
        remove(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn retain_rewrites_in_fixed_order_and_keeps_cells_verbatim() -> Result<(), anyhow::Error> {
        let path = temp_csv("Score,Key,Label\n1.50,a,Alpha\n2,b,Beta\n3,c,Gamma\n").await?;
        let table = CsvTable::open(&path, &COLUMNS).await?;

        let dropped = table.retain("Key", |k| k != "b").await?;
        assert_eq!(dropped, 1);

        let text = tokio::fs::read_to_string(&path).await?;
        assert_eq!(text, "Key,Label,Score\na,Alpha,1.50\nc,Gamma,3\n");
        assert!(!path.with_extension("csv.tmp").exists());
        remove(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn retain_everything_dropped_leaves_header() -> Result<(), anyhow::Error> {
        let path = temp_csv("Key,Label,Score\na,Alpha,1\n").await?;
        let table = CsvTable::open(&path, &COLUMNS).await?;
        assert_eq!(table.retain("Key", |_| false).await?, 1);

        let text = tokio::fs::read_to_string(&path).await?;
        assert_eq!(text, "Key,Label,Score\n");
        let rows: Vec<Row> = table.read_all().await?;
        assert!(rows.is_empty());
        remove(&path).await;
        Ok(())
    }
}
