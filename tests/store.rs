mod support;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use biodiversity_api::error::ApiError;
use biodiversity_api::store::{DataStore, DatasetSummary};

fn store_for(path: &std::path::Path) -> DataStore {
    DataStore::new(Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap())
}

#[test]
fn loads_all_tables() {
    let fixture = support::fixture_db();
    let dataset = store_for(&fixture.path).load().unwrap();

    assert_eq!(
        dataset.summary(),
        DatasetSummary {
            otus: 3,
            samples: 2,
            otu_rows: 3,
            metadata_rows: 2,
        }
    );
    assert_eq!(dataset.samples().sample_names(), &["BB_940", "BB_941"]);
    assert_eq!(dataset.samples().otu_ids(), &[1, 2, 3]);

    let row = dataset.metadata_row("940").unwrap();
    assert_eq!(row.age, Some(24));
    assert_eq!(row.wash_frequency, Some(2));
    assert_eq!(row.location.as_deref(), Some("Beaufort/NC"));
    assert_eq!(dataset.metadata_row("941").unwrap().wash_frequency, None);
}

#[test]
fn missing_database_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = store_for(&dir.path().join("absent.sqlite")).load().unwrap_err();
    assert_matches!(err, ApiError::DataSourceMissing(_));
}

#[test]
fn missing_table_fails() {
    let fixture = support::fixture_db_with(
        "CREATE TABLE otu (otu_id INTEGER, lowest_taxonomic_unit_found TEXT);",
    );
    let err = store_for(&fixture.path).load().unwrap_err();
    assert_matches!(err, ApiError::DataSource(_));
}

#[test]
fn samples_without_key_column_fail() {
    let fixture = support::fixture_db_with(
        "CREATE TABLE otu (otu_id INTEGER, lowest_taxonomic_unit_found TEXT);
         CREATE TABLE samples (id INTEGER, BB_940 INTEGER);",
    );
    let err = store_for(&fixture.path).load().unwrap_err();
    assert_matches!(err, ApiError::DataSourceMissingColumn { column, .. } if column == "otu_id");
}

#[test]
fn duplicate_metadata_rows_fail() {
    let sql = format!(
        "{}
         INSERT INTO samples_metadata VALUES (940, 'x', 'x', 'M', 30, 1, 'O', 'x');",
        support::FIXTURE_SQL
    );
    let fixture = support::fixture_db_with(&sql);
    let err = store_for(&fixture.path).load().unwrap_err();
    assert_matches!(err, ApiError::DataSourceDuplicate { key, .. } if key == "940");
}

#[test]
fn null_counts_are_malformed() {
    let sql = format!(
        "{}
         INSERT INTO samples VALUES (4, NULL, 2);",
        support::FIXTURE_SQL
    );
    let fixture = support::fixture_db_with(&sql);
    let err = store_for(&fixture.path).load().unwrap_err();
    assert_matches!(err, ApiError::DataSourceMalformed { column, .. } if column == "BB_940");
}

#[test]
fn null_otu_descriptions_load_as_empty() {
    let sql = format!(
        "{}
         INSERT INTO otu VALUES (4, NULL);
         INSERT INTO otu VALUES (5, '');",
        support::FIXTURE_SQL
    );
    let fixture = support::fixture_db_with(&sql);
    let dataset = store_for(&fixture.path).load().unwrap();

    let descriptions: Vec<&str> = dataset
        .otus()
        .iter()
        .map(|otu| otu.lowest_taxonomic_unit_found.as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec!["Archaea;Euryarchaeota;Halobacteria", "Bacteria", "Bacteria", "", ""]
    );
}

#[test]
fn fractional_age_is_malformed() {
    let sql = format!(
        "{}
         INSERT INTO samples_metadata VALUES (942, 'x', 'x', 'M', 30.5, 1, 'O', 'x');",
        support::FIXTURE_SQL
    );
    let fixture = support::fixture_db_with(&sql);
    let err = store_for(&fixture.path).load().unwrap_err();
    assert_matches!(err, ApiError::DataSourceMalformed { column, .. } if column == "AGE");
}

#[test]
fn fractional_wash_frequency_is_malformed() {
    let sql = format!(
        "{}
         INSERT INTO samples_metadata VALUES (942, 'x', 'x', 'M', 30, 2.5, 'O', 'x');",
        support::FIXTURE_SQL
    );
    let fixture = support::fixture_db_with(&sql);
    let err = store_for(&fixture.path).load().unwrap_err();
    assert_matches!(err, ApiError::DataSourceMalformed { column, .. } if column == "WFREQ");
}

#[test]
fn out_of_range_wash_frequency_is_malformed() {
    let sql = format!(
        "{}
         INSERT INTO samples_metadata VALUES (942, 'x', 'x', 'M', 30, 1e30, 'O', 'x');",
        support::FIXTURE_SQL
    );
    let fixture = support::fixture_db_with(&sql);
    let err = store_for(&fixture.path).load().unwrap_err();
    assert_matches!(err, ApiError::DataSourceMalformed { column, .. } if column == "WFREQ");
}
