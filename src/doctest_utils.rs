// Internal utilities for documentation tests
// This file builds synthetic EDF byte images for doctests and integration tests

use std::path::Path;

use crate::types::SignalHeader;
use crate::Result;

/// Builder for an in-memory EDF file image.
///
/// Each entry passed to [`EdfImage::records`] is one raw data record, i.e. the
/// samples of every signal laid out back to back in signal order.
#[derive(Debug, Clone)]
pub struct EdfImage {
    version: String,
    patient: String,
    recording: String,
    start_date: String,
    start_time: String,
    header_bytes: Option<String>,
    reserved: String,
    data_records: Option<String>,
    duration: String,
    signals: Vec<SignalHeader>,
    records: Vec<Vec<i16>>,
}

impl Default for EdfImage {
    fn default() -> Self {
        Self {
            version: "0".to_string(),
            patient: "X X X X".to_string(),
            recording: "Startdate X X X X".to_string(),
            start_date: "01.01.00".to_string(),
            start_time: "00.00.00".to_string(),
            header_bytes: None,
            reserved: String::new(),
            data_records: None,
            duration: "1".to_string(),
            signals: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl EdfImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn patient(mut self, patient: &str) -> Self {
        self.patient = patient.to_string();
        self
    }

    pub fn recording(mut self, recording: &str) -> Self {
        self.recording = recording.to_string();
        self
    }

    pub fn start(mut self, date: &str, time: &str) -> Self {
        self.start_date = date.to_string();
        self.start_time = time.to_string();
        self
    }

    /// Overrides the header size field (defaults to the computed size).
    pub fn header_bytes(mut self, bytes: u64) -> Self {
        self.header_bytes = Some(bytes.to_string());
        self
    }

    pub fn reserved(mut self, reserved: &str) -> Self {
        self.reserved = reserved.to_string();
        self
    }

    /// Overrides the data record count field (defaults to the number of records).
    pub fn data_records(mut self, field: &str) -> Self {
        self.data_records = Some(field.to_string());
        self
    }

    pub fn duration(mut self, duration: &str) -> Self {
        self.duration = duration.to_string();
        self
    }

    /// Adds a signal with typical EEG calibration.
    pub fn signal(self, label: &str, samples_per_record: i32) -> Self {
        self.signal_with(SignalHeader {
            label: label.to_string(),
            transducer: "AgAgCl electrode".to_string(),
            physical_dimension: "uV".to_string(),
            physical_min: "-200".to_string(),
            physical_max: "200".to_string(),
            digital_min: "-32768".to_string(),
            digital_max: "32767".to_string(),
            prefilter: "HP:0.1Hz LP:70Hz".to_string(),
            samples_per_record,
        })
    }

    pub fn signal_with(mut self, signal: SignalHeader) -> Self {
        self.signals.push(signal);
        self
    }

    pub fn records(mut self, records: Vec<Vec<i16>>) -> Self {
        self.records = records;
        self
    }

    /// Serialises the image.
    pub fn build(&self) -> Vec<u8> {
        let ns = self.signals.len();
        let header_size = (ns + 1) * 256;
        let mut out = vec![b' '; header_size];

        // 主头部 (256字节)
        put(&mut out, 0, 8, &self.version);
        put(&mut out, 8, 80, &self.patient);
        put(&mut out, 88, 80, &self.recording);
        put(&mut out, 168, 8, &self.start_date);
        put(&mut out, 176, 8, &self.start_time);
        let header_bytes = self
            .header_bytes
            .clone()
            .unwrap_or_else(|| header_size.to_string());
        put(&mut out, 184, 8, &header_bytes);
        put(&mut out, 192, 44, &self.reserved);
        let data_records = self
            .data_records
            .clone()
            .unwrap_or_else(|| self.records.len().to_string());
        put(&mut out, 236, 8, &data_records);
        put(&mut out, 244, 8, &self.duration);
        put(&mut out, 252, 4, &ns.to_string());

        // 信号头部，按字段分组写入所有信号
        for (i, signal) in self.signals.iter().enumerate() {
            let at = |base: usize, width: usize| 256 + base * ns + i * width;
            put(&mut out, at(0, 16), 16, &signal.label);
            put(&mut out, at(16, 80), 80, &signal.transducer);
            put(&mut out, at(96, 8), 8, &signal.physical_dimension);
            put(&mut out, at(104, 8), 8, &signal.physical_min);
            put(&mut out, at(112, 8), 8, &signal.physical_max);
            put(&mut out, at(120, 8), 8, &signal.digital_min);
            put(&mut out, at(128, 8), 8, &signal.digital_max);
            put(&mut out, at(136, 80), 80, &signal.prefilter);
            put(&mut out, at(216, 8), 8, &signal.samples_per_record.to_string());
        }

        for record in &self.records {
            for sample in record {
                out.extend_from_slice(&sample.to_le_bytes());
            }
        }

        out
    }

    /// Writes the image to `path`.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.build())?;
        Ok(())
    }
}

fn put(buf: &mut [u8], offset: usize, width: usize, text: &str) {
    let bytes = text.as_bytes();
    let len = bytes.len().min(width);
    buf[offset..offset + len].copy_from_slice(&bytes[..len]);
}

/// Creates a two-channel recording used by the documentation examples.
pub fn create_simple_test_file<P: AsRef<Path>>(path: P) -> Result<()> {
    EdfImage::new()
        .patient("DOC001 M 01-JAN-1990 Test_Patient")
        .start("17.04.01", "11.25.00")
        .signal("EEG Fp1", 4)
        .signal("ECG", 2)
        .records(vec![
            vec![10, 20, 30, 40, 500, 510],
            vec![11, 21, 31, 41, 501, 511],
        ])
        .write_to(path)
}
