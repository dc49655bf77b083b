use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use tracing::debug;

use crate::domain::{OTU_ID_COLUMN, OtuRecord, SampleMetadataRow, SampleTable, SampleTableError};
use crate::error::ApiError;

const OTU_TABLE: &str = "otu";
const SAMPLES_TABLE: &str = "samples";
const METADATA_TABLE: &str = "samples_metadata";

const METADATA_COLUMNS: [&str; 7] = [
    "SAMPLEID",
    "AGE",
    "BBTYPE",
    "ETHNICITY",
    "GENDER",
    "LOCATION",
    "WFREQ",
];

/// Read-only handle on the SQLite file that backs the API.
#[derive(Debug, Clone)]
pub struct DataStore {
    database: Utf8PathBuf,
}

impl DataStore {
    pub fn new(database: impl Into<Utf8PathBuf>) -> Self {
        Self {
            database: database.into(),
        }
    }

    pub fn database(&self) -> &Utf8Path {
        &self.database
    }

    /// Loads all three tables. Either every table loads and validates, or an
    /// error is returned.
    pub fn load(&self) -> Result<Dataset, ApiError> {
        if !self.database.as_std_path().is_file() {
            return Err(ApiError::DataSourceMissing(
                self.database.clone().into_std_path_buf(),
            ));
        }
        let conn =
            Connection::open_with_flags(self.database.as_std_path(), OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        let otus = load_otus(&conn)?;
        let samples = load_samples(&conn)?;
        let metadata = load_metadata(&conn)?;
        debug!(
            otus = otus.len(),
            otu_rows = samples.row_count(),
            metadata_rows = metadata.len(),
            "dataset tables read"
        );
        Dataset::new(otus, samples, metadata)
    }
}

/// Immutable snapshot of the dataset, shared by every request.
#[derive(Debug, Clone)]
pub struct Dataset {
    otus: Vec<OtuRecord>,
    samples: SampleTable,
    metadata: Vec<SampleMetadataRow>,
    metadata_index: HashMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub otus: usize,
    pub samples: usize,
    pub otu_rows: usize,
    pub metadata_rows: usize,
}

impl Dataset {
    pub fn new(
        otus: Vec<OtuRecord>,
        samples: SampleTable,
        metadata: Vec<SampleMetadataRow>,
    ) -> Result<Self, ApiError> {
        let mut metadata_index = HashMap::with_capacity(metadata.len());
        for (idx, row) in metadata.iter().enumerate() {
            if metadata_index.insert(row.sample_id.clone(), idx).is_some() {
                return Err(ApiError::DataSourceDuplicate {
                    table: METADATA_TABLE.to_string(),
                    key: row.sample_id.clone(),
                });
            }
        }
        Ok(Self {
            otus,
            samples,
            metadata,
            metadata_index,
        })
    }

    pub fn otus(&self) -> &[OtuRecord] {
        &self.otus
    }

    pub fn samples(&self) -> &SampleTable {
        &self.samples
    }

    pub fn metadata_row(&self, sample_id: &str) -> Option<&SampleMetadataRow> {
        self.metadata_index
            .get(sample_id)
            .map(|idx| &self.metadata[*idx])
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            otus: self.otus.len(),
            samples: self.samples.sample_names().len(),
            otu_rows: self.samples.row_count(),
            metadata_rows: self.metadata.len(),
        }
    }
}

fn load_otus(conn: &Connection) -> Result<Vec<OtuRecord>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT otu_id, lowest_taxonomic_unit_found FROM {OTU_TABLE}"
    ))?;
    let mut rows = stmt.query([])?;
    let mut otus = Vec::new();
    while let Some(row) = rows.next()? {
        let otu_id = required_integer(row.get_ref(0)?, OTU_TABLE, "otu_id")?;
        let lowest_taxonomic_unit_found =
            optional_text(row.get_ref(1)?, OTU_TABLE, "lowest_taxonomic_unit_found")?
                .unwrap_or_default();
        otus.push(OtuRecord {
            otu_id,
            lowest_taxonomic_unit_found,
        });
    }
    Ok(otus)
}

fn load_samples(conn: &Connection) -> Result<SampleTable, ApiError> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {SAMPLES_TABLE}"))?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let key_idx = columns
        .iter()
        .position(|name| name == OTU_ID_COLUMN)
        .ok_or_else(|| ApiError::DataSourceMissingColumn {
            table: SAMPLES_TABLE.to_string(),
            column: OTU_ID_COLUMN.to_string(),
        })?;
    let sample_columns: Vec<(usize, String)> = columns
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != key_idx)
        .map(|(idx, name)| (idx, name.clone()))
        .collect();

    let mut rows = stmt.query([])?;
    let mut table_rows = Vec::new();
    while let Some(row) = rows.next()? {
        let otu_id = required_integer(row.get_ref(key_idx)?, SAMPLES_TABLE, OTU_ID_COLUMN)?;
        let mut counts = Vec::with_capacity(sample_columns.len());
        for (idx, name) in &sample_columns {
            counts.push(required_integer(row.get_ref(*idx)?, SAMPLES_TABLE, name)?);
        }
        table_rows.push((otu_id, counts));
    }

    let names = sample_columns.into_iter().map(|(_, name)| name).collect();
    SampleTable::from_rows(names, table_rows).map_err(|err| match err {
        SampleTableError::DuplicateOtuId(otu_id) => ApiError::DataSourceDuplicate {
            table: SAMPLES_TABLE.to_string(),
            key: otu_id.to_string(),
        },
        SampleTableError::RowWidth { .. } => malformed(SAMPLES_TABLE, OTU_ID_COLUMN, err.to_string()),
    })
}

fn load_metadata(conn: &Connection) -> Result<Vec<SampleMetadataRow>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {METADATA_TABLE}",
        METADATA_COLUMNS.join(", ")
    ))?;
    let mut rows = stmt.query([])?;
    let mut metadata = Vec::new();
    while let Some(row) = rows.next()? {
        let sample_id = optional_text(row.get_ref(0)?, METADATA_TABLE, "SAMPLEID")?.ok_or_else(
            || ApiError::DataSourceMalformed {
                table: METADATA_TABLE.to_string(),
                column: "SAMPLEID".to_string(),
                message: "NULL sample id".to_string(),
            },
        )?;
        metadata.push(SampleMetadataRow {
            sample_id,
            age: optional_integer(row.get_ref(1)?, METADATA_TABLE, "AGE")?,
            bb_type: optional_text(row.get_ref(2)?, METADATA_TABLE, "BBTYPE")?,
            ethnicity: optional_text(row.get_ref(3)?, METADATA_TABLE, "ETHNICITY")?,
            gender: optional_text(row.get_ref(4)?, METADATA_TABLE, "GENDER")?,
            location: optional_text(row.get_ref(5)?, METADATA_TABLE, "LOCATION")?,
            wash_frequency: optional_integer(row.get_ref(6)?, METADATA_TABLE, "WFREQ")?,
        });
    }
    Ok(metadata)
}

// i64::MIN and i64::MAX + 1 are exact in f64.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn malformed(table: &str, column: &str, message: impl Into<String>) -> ApiError {
    ApiError::DataSourceMalformed {
        table: table.to_string(),
        column: column.to_string(),
        message: message.into(),
    }
}

fn required_integer(value: ValueRef<'_>, table: &str, column: &str) -> Result<i64, ApiError> {
    optional_integer(value, table, column)?.ok_or_else(|| malformed(table, column, "NULL value"))
}

fn optional_integer(
    value: ValueRef<'_>,
    table: &str,
    column: &str,
) -> Result<Option<i64>, ApiError> {
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(value) => Ok(Some(value)),
        ValueRef::Real(value)
            if value.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&value) =>
        {
            Ok(Some(value as i64))
        }
        ValueRef::Real(value) => Err(malformed(table, column, format!("{value} is not an integer"))),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|err| malformed(table, column, err.to_string()))?;
            text.trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| malformed(table, column, format!("{text:?} is not an integer")))
        }
        ValueRef::Blob(_) => Err(malformed(table, column, "unexpected blob")),
    }
}

fn optional_text(
    value: ValueRef<'_>,
    table: &str,
    column: &str,
) -> Result<Option<String>, ApiError> {
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(value) => Ok(Some(value.to_string())),
        ValueRef::Real(value) => Ok(Some(value.to_string())),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| Some(text.to_string()))
            .map_err(|err| malformed(table, column, err.to_string())),
        ValueRef::Blob(_) => Err(malformed(table, column, "unexpected blob")),
    }
}
