//! JSON and CSV emitters for decoded recordings.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::types::{Header, SampleMatrix, SignalHeader};

/// Header metadata in the shape written to the JSON document.
///
/// Per-signal fields are emitted as parallel arrays indexed by signal.
///
/// `Duration` is written as a JSON number with a fraction (`1.0`, `0.5`), not
/// as an integer, so fractional record durations survive. Consumers that
/// expect an integer duration need to accept floats.
#[derive(Debug, Serialize)]
pub struct HeaderDocument<'a> {
    #[serde(rename = "PatientID")]
    pub patient_id: &'a str,
    #[serde(rename = "RecordID")]
    pub recording_id: &'a str,
    #[serde(rename = "StartDate")]
    pub start_date: &'a str,
    #[serde(rename = "StartTime")]
    pub start_time: &'a str,
    #[serde(rename = "Records")]
    pub data_records: i64,
    #[serde(rename = "Duration")]
    pub record_duration: f64,
    #[serde(rename = "Signals")]
    pub signal_count: usize,
    #[serde(rename = "Samples")]
    pub samples_per_record: Vec<i32>,
    #[serde(rename = "Labels")]
    pub labels: Vec<&'a str>,
    #[serde(rename = "Transducer")]
    pub transducer: Vec<&'a str>,
    #[serde(rename = "PhDim")]
    pub physical_dimension: Vec<&'a str>,
    #[serde(rename = "PhMin")]
    pub physical_min: Vec<&'a str>,
    #[serde(rename = "PhMax")]
    pub physical_max: Vec<&'a str>,
    #[serde(rename = "DigMin")]
    pub digital_min: Vec<&'a str>,
    #[serde(rename = "DigMax")]
    pub digital_max: Vec<&'a str>,
    #[serde(rename = "Prefiltering")]
    pub prefilter: Vec<&'a str>,
}

impl<'a> From<&'a Header> for HeaderDocument<'a> {
    fn from(header: &'a Header) -> Self {
        HeaderDocument {
            patient_id: &header.patient_id,
            recording_id: &header.recording_id,
            start_date: &header.start_date,
            start_time: &header.start_time,
            data_records: header.data_records,
            record_duration: header.record_duration,
            signal_count: header.signal_count(),
            samples_per_record: header.samples_per_record(),
            labels: column(header, |s| s.label.as_str()),
            transducer: column(header, |s| s.transducer.as_str()),
            physical_dimension: column(header, |s| s.physical_dimension.as_str()),
            physical_min: column(header, |s| s.physical_min.as_str()),
            physical_max: column(header, |s| s.physical_max.as_str()),
            digital_min: column(header, |s| s.digital_min.as_str()),
            digital_max: column(header, |s| s.digital_max.as_str()),
            prefilter: column(header, |s| s.prefilter.as_str()),
        }
    }
}

fn column<'a>(header: &'a Header, field: impl Fn(&'a SignalHeader) -> &'a str) -> Vec<&'a str> {
    header.signals.iter().map(field).collect()
}

/// Writes the header as a pretty-printed JSON document.
pub fn write_header_json<W: Write>(mut writer: W, header: &Header) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &HeaderDocument::from(header))?;
    writer.flush()?;
    Ok(())
}

/// Writes one CSV row per signal.
///
/// Rows differ in length when signals have different sample rates, and the
/// first column holds the label when the matrix was built with labels.
pub fn write_samples_csv<W: Write>(writer: W, matrix: &SampleMatrix) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_writer(writer);
    for row in matrix.rows() {
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

/// `header_<date>_<time>.json`
pub fn header_file_name(header: &Header) -> String {
    format!("header_{}_{}.json", header.start_date, header.start_time)
}

/// `data_<date>_<time>.csv`
pub fn data_file_name(header: &Header) -> String {
    format!("data_{}_{}.csv", header.start_date, header.start_time)
}
