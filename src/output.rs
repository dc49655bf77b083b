use std::io::{self, Write};

use serde::Serialize;

use crate::domain::{SampleMetadata, SortedOtuValues};
use crate::store::DatasetSummary;

/// Writes query results in the same JSON shape the HTTP routes use.
pub struct JsonOutput;

impl JsonOutput {
    pub fn write_strings(out: &mut impl Write, values: &[String]) -> io::Result<()> {
        Self::write_json(out, &values)
    }

    pub fn write_metadata(
        out: &mut impl Write,
        metadata: Option<&SampleMetadata>,
    ) -> io::Result<()> {
        match metadata {
            Some(metadata) => Self::write_json(out, metadata),
            None => Self::write_json(out, &serde_json::json!({})),
        }
    }

    pub fn write_wash_frequency(out: &mut impl Write, wfreq: i64) -> io::Result<()> {
        Self::write_json(out, &wfreq)
    }

    pub fn write_sorted(out: &mut impl Write, sorted: &SortedOtuValues) -> io::Result<()> {
        Self::write_json(out, &[sorted])
    }

    pub fn write_summary(out: &mut impl Write, summary: &DatasetSummary) -> io::Result<()> {
        Self::write_json(out, summary)
    }

    fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        out.write_all(json.as_bytes())?;
        out.write_all(b"\n")?;
        Ok(())
    }
}
