//! CSV ingestion for observation exports and the master mapping table.
//!
//! ## Observation exports
//! The scraper writes one CSV per period with Spanish headers:
//! `Fecha, Market_Place, Fabricante, Producto, SKU, Precio, Moneda, URL,
//! Image_url, Tipo, Linea`. English headers are accepted as aliases. Columns
//! not listed here (e.g. a leftover pandas index) are ignored.
//!
//! ## Mapping table
//! `Sku` is the competitor SKU, `Homologo` the reference-brand SKU it is
//! compared against. Older exports name the second column
//! `Homologo Mansfield`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use pricewatch_core::{MappingEntry, Observation};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::dataset::Dataset;
use crate::DataError;

#[derive(Debug, Deserialize)]
struct RawObservationRow {
    #[serde(rename = "Fecha", alias = "date")]
    date: String,
    #[serde(rename = "Market_Place", alias = "marketplace")]
    marketplace: String,
    #[serde(rename = "Fabricante", alias = "manufacturer")]
    manufacturer: String,
    #[serde(rename = "Producto", alias = "product")]
    product: String,
    #[serde(rename = "SKU", alias = "sku")]
    sku: String,
    #[serde(rename = "Precio", alias = "price")]
    price: String,
    #[serde(rename = "Moneda", alias = "currency", default)]
    currency: String,
    #[serde(rename = "URL", alias = "url", default)]
    url: String,
    #[serde(rename = "Image_url", alias = "image_url", default)]
    image_url: Option<String>,
    #[serde(rename = "Tipo", alias = "type", default)]
    product_type: String,
    #[serde(rename = "Linea", alias = "line", default)]
    line: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMappingRow {
    #[serde(rename = "Sku", alias = "sku", alias = "SKU")]
    sku: String,
    #[serde(
        rename = "Homologo",
        alias = "Homologo Mansfield",
        alias = "reference_sku"
    )]
    reference_sku: Option<String>,
}

/// Load every observation file under `data_dir` and the mapping table at
/// `mapping_path` into a deduplicated, date-ordered [`Dataset`].
///
/// # Errors
///
/// Returns [`DataError`] if a file cannot be read or a record is malformed,
/// or if `data_dir` holds no CSV files.
pub fn load_dataset(data_dir: &Path, mapping_path: &Path) -> Result<Dataset, DataError> {
    let (observations, files_loaded) = load_observations(data_dir)?;
    let mapping = load_mapping(mapping_path)?;
    let dataset = Dataset::with_files_loaded(observations, mapping, files_loaded);

    let stats = dataset.stats();
    tracing::info!(
        files = stats.files_loaded,
        rows = stats.rows_read,
        duplicates = stats.duplicates_dropped,
        mapping = stats.mapping_count,
        "dataset loaded"
    );

    Ok(dataset)
}

/// Read all `*.csv` files under `data_dir` (recursively, in path order) and
/// concatenate their records. Returns the records and the number of files read.
///
/// # Errors
///
/// Returns [`DataError::NoObservationFiles`] when the directory holds no CSV
/// files, or the first read/parse failure encountered.
pub fn load_observations(data_dir: &Path) -> Result<(Vec<Observation>, usize), DataError> {
    let mut files = Vec::new();
    collect_csv_files(data_dir, &mut files)?;
    if files.is_empty() {
        return Err(DataError::NoObservationFiles(data_dir.to_path_buf()));
    }
    files.sort();

    let mut observations = Vec::new();
    for file in &files {
        let before = observations.len();
        read_observation_file(file, &mut observations)?;
        tracing::debug!(
            path = %file.display(),
            records = observations.len() - before,
            "observation file read"
        );
    }

    Ok((observations, files.len()))
}

/// Read the master mapping table. Rows without a reference SKU are skipped.
///
/// # Errors
///
/// Returns [`DataError::Csv`] if the file cannot be opened or parsed.
pub fn load_mapping(path: &Path) -> Result<Vec<MappingEntry>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut entries = Vec::new();
    let mut skipped = 0_usize;
    for result in reader.deserialize::<RawMappingRow>() {
        let row = result.map_err(|e| DataError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

        let reference_sku = row
            .reference_sku
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let sku = row.sku.trim().to_string();

        match reference_sku {
            Some(reference_sku) if !sku.is_empty() => entries.push(MappingEntry { sku, reference_sku }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(path = %path.display(), skipped, "mapping rows without SKU or reference skipped");
    }

    Ok(entries)
}

fn collect_csv_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DataError> {
    let entries = std::fs::read_dir(dir).map_err(|e| DataError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| DataError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_csv_files(&path, out)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            out.push(path);
        }
    }

    Ok(())
}

fn read_observation_file(path: &Path, out: &mut Vec<Observation>) -> Result<(), DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

    for (idx, result) in reader.deserialize::<RawObservationRow>().enumerate() {
        let raw = result.map_err(|e| DataError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        out.push(convert_row(raw, path, idx + 1)?);
    }

    Ok(())
}

fn convert_row(raw: RawObservationRow, path: &Path, record: usize) -> Result<Observation, DataError> {
    let invalid = |field: &'static str, reason: String| DataError::InvalidField {
        path: path.to_path_buf(),
        record,
        field,
        reason,
    };

    let date = parse_date(&raw.date)
        .ok_or_else(|| invalid("date", format!("unrecognized date '{}'", raw.date)))?;
    let price = parse_price(&raw.price)
        .ok_or_else(|| invalid("price", format!("unrecognized price '{}'", raw.price)))?;

    let sku = raw.sku.trim().to_string();
    if sku.is_empty() {
        return Err(invalid("sku", "SKU must be non-empty".to_string()));
    }

    Ok(Observation {
        date,
        marketplace: raw.marketplace,
        manufacturer: raw.manufacturer,
        product_name: raw.product,
        sku,
        price,
        currency: raw.currency,
        url: raw.url,
        image_url: raw.image_url.filter(|s| !s.is_empty()),
        product_type: raw.product_type,
        line: raw.line.filter(|s| !s.is_empty()),
    })
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and `DD/MM/YYYY`.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

pub(crate) fn parse_price(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_iso() {
        assert_eq!(parse_date("2022-03-01"), NaiveDate::from_ymd_opt(2022, 3, 1));
    }

    #[test]
    fn parse_date_with_time_keeps_day() {
        assert_eq!(
            parse_date("2022-03-01 14:05:00"),
            NaiveDate::from_ymd_opt(2022, 3, 1)
        );
    }

    #[test]
    fn parse_date_day_first() {
        assert_eq!(parse_date("15/04/2022"), NaiveDate::from_ymd_opt(2022, 4, 15));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn parse_price_accepts_float_export() {
        assert_eq!(parse_price("389900.0"), Some(Decimal::new(389_900, 0)));
        assert_eq!(parse_price(" 129.5 "), Some(Decimal::new(1295, 1)));
    }

    #[test]
    fn parse_price_rejects_empty_and_text() {
        assert!(parse_price("").is_none());
        assert!(parse_price("n/a").is_none());
    }
}
