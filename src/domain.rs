use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Number of leading characters that separate a sample column name from its
/// metadata id (`BB_940` -> `940`).
pub const SAMPLE_PREFIX_LEN: usize = 3;

/// Column of the wide sample table that holds the row key.
pub const OTU_ID_COLUMN: &str = "otu_id";

/// A sample name as it arrives from callers, e.g. `BB_940`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleName(String);

impl SampleName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Metadata id addressed by this name. Names shorter than the prefix map
    /// to the empty id.
    pub fn sample_id(&self) -> &str {
        match self.0.char_indices().nth(SAMPLE_PREFIX_LEN) {
            Some((offset, _)) => &self.0[offset..],
            None => "",
        }
    }
}

impl fmt::Display for SampleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SampleName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtuRecord {
    pub otu_id: i64,
    pub lowest_taxonomic_unit_found: String,
}

/// Wide table of OTU counts: one row per `otu_id`, one column per sample.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleTable {
    sample_names: Vec<String>,
    otu_ids: Vec<i64>,
    // counts[column][row]
    counts: Vec<Vec<i64>>,
}

impl SampleTable {
    /// Builds a table from sample column names and `(otu_id, counts)` rows.
    /// Returns the offending otu id if a row has the wrong width or repeats an id.
    pub fn from_rows(
        sample_names: Vec<String>,
        rows: Vec<(i64, Vec<i64>)>,
    ) -> Result<Self, SampleTableError> {
        let mut counts = vec![Vec::with_capacity(rows.len()); sample_names.len()];
        let mut otu_ids = Vec::with_capacity(rows.len());
        let mut seen = std::collections::HashSet::with_capacity(rows.len());
        for (otu_id, values) in rows {
            if values.len() != sample_names.len() {
                return Err(SampleTableError::RowWidth {
                    otu_id,
                    expected: sample_names.len(),
                    found: values.len(),
                });
            }
            if !seen.insert(otu_id) {
                return Err(SampleTableError::DuplicateOtuId(otu_id));
            }
            otu_ids.push(otu_id);
            for (column, value) in counts.iter_mut().zip(values) {
                column.push(value);
            }
        }
        Ok(Self {
            sample_names,
            otu_ids,
            counts,
        })
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    pub fn otu_ids(&self) -> &[i64] {
        &self.otu_ids
    }

    pub fn column(&self, sample: &str) -> Option<&[i64]> {
        self.sample_names
            .iter()
            .position(|name| name == sample)
            .map(|idx| self.counts[idx].as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.otu_ids.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleTableError {
    #[error("row {otu_id} has {found} counts, expected {expected}")]
    RowWidth {
        otu_id: i64,
        expected: usize,
        found: usize,
    },
    #[error("otu id {0} appears more than once")]
    DuplicateOtuId(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMetadataRow {
    pub sample_id: String,
    pub age: Option<i64>,
    pub bb_type: Option<String>,
    pub ethnicity: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub wash_frequency: Option<i64>,
}

/// Metadata as served by `/metadata/{sample}`; keys follow the dataset columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleMetadata {
    #[serde(rename = "SAMPLEID")]
    pub sample_id: String,
    #[serde(rename = "AGE")]
    pub age: Option<i64>,
    #[serde(rename = "BBTYPE")]
    pub bb_type: Option<String>,
    #[serde(rename = "ETHNICITY")]
    pub ethnicity: Option<String>,
    #[serde(rename = "GENDER")]
    pub gender: Option<String>,
    #[serde(rename = "LOCATION")]
    pub location: Option<String>,
}

impl From<&SampleMetadataRow> for SampleMetadata {
    fn from(row: &SampleMetadataRow) -> Self {
        Self {
            sample_id: row.sample_id.clone(),
            age: row.age,
            bb_type: row.bb_type.clone(),
            ethnicity: row.ethnicity.clone(),
            gender: row.gender.clone(),
            location: row.location.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortedOtuValues {
    pub otu_ids: Vec<i64>,
    pub sample_values: Vec<i64>,
}
