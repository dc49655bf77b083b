use std::sync::Arc;

use tracing::debug;

use crate::domain::{SampleMetadata, SampleName, SortedOtuValues};
use crate::error::ApiError;
use crate::store::Dataset;

/// Answers the API's questions over a shared, immutable [`Dataset`].
#[derive(Debug, Clone)]
pub struct QueryService {
    dataset: Arc<Dataset>,
}

impl QueryService {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn list_sample_names(&self) -> Vec<String> {
        self.dataset.samples().sample_names().to_vec()
    }

    pub fn list_otu_descriptions(&self) -> Vec<String> {
        self.dataset
            .otus()
            .iter()
            .map(|otu| otu.lowest_taxonomic_unit_found.clone())
            .collect()
    }

    /// `None` when no metadata row matches the sample.
    pub fn get_sample_metadata(&self, sample: &SampleName) -> Option<SampleMetadata> {
        let row = self.dataset.metadata_row(sample.sample_id());
        if row.is_none() {
            debug!(sample = %sample, "no metadata for sample");
        }
        row.map(SampleMetadata::from)
    }

    pub fn get_wash_frequency(&self, sample: &SampleName) -> Result<i64, ApiError> {
        self.dataset
            .metadata_row(sample.sample_id())
            .and_then(|row| row.wash_frequency)
            .ok_or_else(|| {
                debug!(sample = %sample, "no wash frequency for sample");
                ApiError::SampleNotFound(sample.to_string())
            })
    }

    /// OTU ids and counts for one sample, by count descending. Equal counts
    /// keep table order.
    pub fn get_sorted_otu_values(&self, sample: &SampleName) -> Result<SortedOtuValues, ApiError> {
        let samples = self.dataset.samples();
        let column = samples
            .column(sample.as_str())
            .ok_or_else(|| ApiError::SampleNotFound(sample.to_string()))?;

        let mut order: Vec<usize> = (0..column.len()).collect();
        // sort_by_key is stable
        order.sort_by_key(|idx| std::cmp::Reverse(column[*idx]));

        let otu_ids = samples.otu_ids();
        Ok(SortedOtuValues {
            otu_ids: order.iter().map(|idx| otu_ids[*idx]).collect(),
            sample_values: order.iter().map(|idx| column[*idx]).collect(),
        })
    }
}
