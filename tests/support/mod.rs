#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tempfile::TempDir;

/// Two samples over three OTUs. `BB_940` counts are 5, 0, 12 for otu ids 1, 2, 3.
pub const FIXTURE_SQL: &str = "
    CREATE TABLE otu (otu_id INTEGER PRIMARY KEY, lowest_taxonomic_unit_found TEXT);
    INSERT INTO otu VALUES (1, 'Archaea;Euryarchaeota;Halobacteria');
    INSERT INTO otu VALUES (2, 'Bacteria');
    INSERT INTO otu VALUES (3, 'Bacteria');

    CREATE TABLE samples (otu_id INTEGER PRIMARY KEY, BB_940 INTEGER, BB_941 INTEGER);
    INSERT INTO samples VALUES (1, 5, 3);
    INSERT INTO samples VALUES (2, 0, 3);
    INSERT INTO samples VALUES (3, 12, 1);

    CREATE TABLE samples_metadata (
        SAMPLEID INTEGER, EVENT TEXT, ETHNICITY TEXT, GENDER TEXT, AGE REAL,
        WFREQ REAL, BBTYPE TEXT, LOCATION TEXT
    );
    INSERT INTO samples_metadata VALUES (940, 'BellyButtonsScience', 'Caucasian', 'F', 24.0, 2.0, 'I', 'Beaufort/NC');
    INSERT INTO samples_metadata VALUES (941, 'BellyButtonsScience', 'Caucasian/Midleastern', 'F', 34.0, NULL, 'I', 'Chicago/IL');
";

pub struct Fixture {
    _dir: TempDir,
    pub path: PathBuf,
}

pub fn fixture_db() -> Fixture {
    fixture_db_with(FIXTURE_SQL)
}

pub fn fixture_db_with(sql: &str) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("belly_button_biodiversity.sqlite");
    write_db(&path, sql);
    Fixture { _dir: dir, path }
}

fn write_db(path: &Path, sql: &str) {
    let conn = Connection::open(path).expect("open sqlite");
    conn.execute_batch(sql).expect("seed sqlite");
}
