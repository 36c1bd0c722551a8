use chrono::NaiveDateTime;

use crate::utils::parse_start_datetime;

/// How numeric header fields that fail to parse are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldParsing {
    /// Unparseable numbers decode as `0` (legacy behaviour).
    #[default]
    Lenient,
    /// Unparseable numbers are reported as `EdfError::MalformedField`.
    Strict,
}

/// Which decode stages produce output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    HeaderOnly,
    DataOnly,
    #[default]
    Both,
}

impl Selection {
    pub fn emits_header(self) -> bool {
        matches!(self, Selection::HeaderOnly | Selection::Both)
    }

    pub fn emits_data(self) -> bool {
        matches!(self, Selection::DataOnly | Selection::Both)
    }
}

/// Caller-facing decode options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Prefix every signal's sample row with its label.
    pub include_labels: bool,
    pub selection: Selection,
    pub parsing: FieldParsing,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            include_labels: true,
            selection: Selection::Both,
            parsing: FieldParsing::Lenient,
        }
    }
}

/// Per-signal header fields, exactly as stored in the file (trimmed).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalHeader {
    pub label: String,
    pub transducer: String,
    pub physical_dimension: String,
    pub physical_min: String,
    pub physical_max: String,
    pub digital_min: String,
    pub digital_max: String,
    pub prefilter: String,
    pub samples_per_record: i32,
}

impl SignalHeader {
    /// Parses the physical and digital ranges of this signal.
    ///
    /// Returns `None` if any bound is not a number or a range is empty.
    pub fn calibration(&self) -> Option<Calibration> {
        let calibration = Calibration {
            physical_min: self.physical_min.parse().ok()?,
            physical_max: self.physical_max.parse().ok()?,
            digital_min: self.digital_min.parse().ok()?,
            digital_max: self.digital_max.parse().ok()?,
        };
        if calibration.physical_min == calibration.physical_max
            || calibration.digital_min == calibration.digital_max
        {
            return None;
        }
        Some(calibration)
    }
}

/// Linear mapping between stored digital values and physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
}

impl Calibration {
    /// 计算物理值转换参数
    pub fn bit_value(&self) -> f64 {
        (self.physical_max - self.physical_min) /
        (self.digital_max - self.digital_min) as f64
    }

    /// 计算偏移量
    pub fn offset(&self) -> f64 {
        self.physical_max / self.bit_value() - self.digital_max as f64
    }

    /// 将数字值转换为物理值
    pub fn to_physical(&self, digital_value: i16) -> f64 {
        self.bit_value() * (self.offset() + digital_value as f64)
    }
}

/// Decoded EDF header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub version: String,
    pub patient_id: String,
    pub recording_id: String,
    pub start_date: String,
    pub start_time: String,
    /// Size of the header region; the data records start at this offset.
    pub header_bytes: u64,
    pub reserved: String,
    /// Number of data records, negative when the writer did not know it.
    pub data_records: i64,
    /// Duration of one data record in seconds.
    pub record_duration: f64,
    pub signals: Vec<SignalHeader>,
}

impl Header {
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.signals.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn samples_per_record(&self) -> Vec<i32> {
        self.signals.iter().map(|s| s.samples_per_record).collect()
    }

    /// Bytes occupied by one data record, or `None` if a sample count is negative.
    pub fn record_size(&self) -> Option<u64> {
        self.signals.iter().try_fold(0u64, |acc, s| {
            let samples = u64::try_from(s.samples_per_record).ok()?;
            acc.checked_add(samples.checked_mul(2)?)
        })
    }

    /// Expected length of the data region in bytes.
    ///
    /// `None` when the record count is unknown, a sample count is negative,
    /// or the size does not fit in a `u64`.
    pub fn data_size(&self) -> Option<u64> {
        let records = u64::try_from(self.data_records).ok()?;
        self.record_size()?.checked_mul(records)
    }

    /// Total recording length in seconds.
    pub fn recording_duration(&self) -> f64 {
        self.data_records as f64 * self.record_duration
    }

    /// Start of the recording, if the date and time fields are well formed.
    pub fn start_datetime(&self) -> Option<NaiveDateTime> {
        parse_start_datetime(&self.start_date, &self.start_time)
    }
}

/// One demultiplexed signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalSamples {
    /// Leading label entry, present only when label tagging was requested.
    pub label: Option<String>,
    pub samples: Vec<i16>,
}

impl SignalSamples {
    /// Row length including the label entry, if any.
    pub fn len(&self) -> usize {
        self.samples.len() + usize::from(self.label.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All signals of a recording, one entry per signal in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleMatrix {
    pub signals: Vec<SignalSamples>,
}

impl SampleMatrix {
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    pub fn signal(&self, index: usize) -> Option<&SignalSamples> {
        self.signals.get(index)
    }

    /// Sample rows as text, the label (if any) first.
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.signals.iter().map(|signal| {
            let mut row = Vec::with_capacity(signal.len());
            if let Some(label) = &signal.label {
                row.push(label.clone());
            }
            row.extend(signal.samples.iter().map(|v| v.to_string()));
            row
        })
    }
}
