//! File-level tests for observation and mapping ingestion.
//! Each test writes its fixtures into a fresh temporary directory.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use pricewatch_data::{load_dataset, load_mapping, load_observations, DataError};
use rust_decimal::Decimal;

const SPANISH_HEADER: &str =
    "Fecha,Market_Place,Fabricante,Producto,SKU,Precio,Moneda,URL,Image_url,Tipo,Linea\n";

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(path, content).expect("write fixture");
}

fn mapping_csv(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("master/mapping.csv");
    write(
        &path,
        "Sku,Homologo\nN2420,135010007\nC1,135010007\nORPHAN,\n",
    );
    path
}

#[test]
fn loads_files_and_drops_duplicates_across_them() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let data = tmp.path().join("observations");
    write(
        &data.join("2022-09.csv"),
        &format!(
            "{SPANISH_HEADER}\
2022-09-01,Homecenter,Mansfield,Elongado,135010007,389900.0,COP,https://h/1,https://h/1.jpg,Two pieces,Elite\n\
2022-09-01,Homecenter,Gerber,Viper,N2420,459900,COP,https://h/2,,One piece,\n"
        ),
    );
    write(
        &data.join("nested/2022-10.csv"),
        &format!(
            "{SPANISH_HEADER}\
2022-09-01,Homecenter,Gerber,Viper,N2420,459900,COP,https://h/2,,One piece,\n\
2022-10-01,Homecenter,Gerber,Viper,N2420,449900,COP,https://h/2,,One piece,\n"
        ),
    );
    let mapping = mapping_csv(tmp.path());

    let ds = load_dataset(&data, &mapping).expect("load");
    let stats = ds.stats();
    assert_eq!(stats.files_loaded, 2);
    assert_eq!(stats.rows_read, 4);
    assert_eq!(stats.duplicates_dropped, 1);
    assert_eq!(stats.mapping_count, 2);
    assert_eq!(stats.last_date, NaiveDate::from_ymd_opt(2022, 10, 1));

    let first = &ds.observations()[0];
    assert_eq!(first.product_key(), "Elongado_135010007");
    assert_eq!(first.price, Decimal::new(389_900, 0));
    assert_eq!(first.line.as_deref(), Some("Elite"));
    assert_eq!(first.image_url.as_deref(), Some("https://h/1.jpg"));

    let viper = &ds.observations()[1];
    assert!(viper.image_url.is_none());
    assert!(viper.line.is_none());
}

#[test]
fn accepts_english_headers_without_optional_columns() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        &tmp.path().join("obs.csv"),
        "date,marketplace,manufacturer,product,sku,price,currency,url,type\n\
         15/09/2022,Easy,Corona,Avanti,C1,199900,COP,https://e/1,One piece\n",
    );

    let (rows, files) = load_observations(tmp.path()).expect("load");
    assert_eq!(files, 1);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2022, 9, 15).unwrap());
    assert_eq!(rows[0].product_type, "One piece");
    assert!(rows[0].line.is_none());
}

#[test]
fn ignores_extra_index_column() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        &tmp.path().join("obs.csv"),
        ",Fecha,Market_Place,Fabricante,Producto,SKU,Precio,Moneda,URL,Image_url,Tipo\n\
         0,2022-09-01 08:30:00,Easy,Corona,Avanti,C1,199900,COP,https://e/1,,One piece\n",
    );
    let (rows, _) = load_observations(tmp.path()).expect("load");
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2022, 9, 1).unwrap());
}

#[test]
fn malformed_price_names_file_and_record() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        &tmp.path().join("bad.csv"),
        &format!(
            "{SPANISH_HEADER}\
2022-09-01,Easy,Corona,Avanti,C1,199900,COP,https://e/1,,One piece,\n\
2022-09-01,Easy,Corona,Avanti 2,C2,consultar,COP,https://e/2,,One piece,\n"
        ),
    );

    let err = load_observations(tmp.path()).unwrap_err();
    match err {
        DataError::InvalidField {
            ref path,
            record,
            field,
            ..
        } => {
            assert!(path.ends_with("bad.csv"));
            assert_eq!(record, 2);
            assert_eq!(field, "price");
        }
        other => panic!("expected InvalidField, got {other:?}"),
    }
}

#[test]
fn empty_directory_is_an_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let err = load_observations(tmp.path()).unwrap_err();
    assert!(matches!(err, DataError::NoObservationFiles(_)));
}

#[test]
fn missing_directory_is_io_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let err = load_observations(&tmp.path().join("absent")).unwrap_err();
    assert!(matches!(err, DataError::Io { .. }));
}

#[test]
fn mapping_accepts_legacy_header_and_skips_blank_references() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("mapping.csv");
    write(
        &path,
        "Sku,Homologo Mansfield\n N2420 , 135010007 \nORPHAN,\n",
    );

    let entries = load_mapping(&path).expect("mapping");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].sku, "N2420");
    assert_eq!(entries[0].reference_sku, "135010007");
}
