//! # EDF decoding for Rust
//!
//! Decodes European Data Format (EDF) recordings into their header metadata
//! and one sample sequence per signal.
//!
//! An EDF file starts with a fixed-layout ASCII header (256 bytes plus 256
//! bytes per signal) followed by data records. Each data record holds, back to
//! back, a fixed number of 16-bit little-endian samples for every signal.
//! [`HeaderDecoder`] parses the header and [`RecordDemultiplexer`] splits the
//! records into per-signal sequences.
//!
//! ## Quick Start
//!
//! ```rust
//! use edfdemux::{EdfReader, FieldParsing, Result};
//!
//! fn main() -> Result<()> {
//!     # edfdemux::doctest_utils::create_simple_test_file("quick_start.edf")?;
//!     let mut reader = EdfReader::open("quick_start.edf", FieldParsing::Lenient)?;
//!
//!     for signal in &reader.header().signals {
//!         println!("{}: {} samples/record", signal.label, signal.samples_per_record);
//!     }
//!
//!     // One entry per signal, each prefixed with the signal label
//!     let matrix = reader.read_samples(true)?;
//!     assert_eq!(matrix.signals[1].label.as_deref(), Some("ECG"));
//!     assert_eq!(matrix.signals[1].samples, vec![500, 510, 501, 511]);
//!
//!     # std::fs::remove_file("quick_start.edf").ok();
//!     Ok(())
//! }
//! ```
//!
//! ## Writing the results
//!
//! The [`output`] module renders a header as JSON and a sample matrix as CSV:
//!
//! ```rust
//! use std::io::Cursor;
//! use edfdemux::{output, HeaderDecoder, RecordDemultiplexer};
//! # use edfdemux::doctest_utils::EdfImage;
//!
//! # let bytes = EdfImage::new().signal("EEG", 2).records(vec![vec![1, 2]]).build();
//! let mut cursor = Cursor::new(bytes);
//! let header = HeaderDecoder::default().decode(&mut cursor)?;
//! let matrix = RecordDemultiplexer::new(&header)
//!     .with_labels(true)
//!     .demultiplex(&mut cursor)?;
//!
//! let mut csv = Vec::new();
//! output::write_samples_csv(&mut csv, &matrix)?;
//! assert_eq!(String::from_utf8(csv).unwrap(), "EEG,1,2\n");
//! # Ok::<(), edfdemux::EdfError>(())
//! ```
//!
//! ## Physical values
//!
//! Samples are returned as stored. A signal's [`Calibration`] converts them
//! into physical units:
//!
//! ```rust
//! use edfdemux::SignalHeader;
//!
//! let signal = SignalHeader {
//!     label: "EEG".to_string(),
//!     physical_min: "-100".to_string(),
//!     physical_max: "100".to_string(),
//!     digital_min: "-32768".to_string(),
//!     digital_max: "32767".to_string(),
//!     ..SignalHeader::default()
//! };
//!
//! let calibration = signal.calibration().unwrap();
//! assert!((calibration.to_physical(16384) - 50.0).abs() < 0.1);
//! ```

pub mod error;
pub mod types;
pub mod utils;
pub mod header;
pub mod demux;
pub mod reader;
pub mod output;
pub mod logging;

#[doc(hidden)]
pub mod doctest_utils; // For internal doctest support

// Re-export main types for convenience
pub use error::{EdfError, Result};
pub use types::{
    Calibration, DecodeOptions, FieldParsing, Header, SampleMatrix, Selection, SignalHeader,
    SignalSamples,
};
pub use header::HeaderDecoder;
pub use demux::RecordDemultiplexer;
pub use reader::EdfReader;

/// Library version
///
/// ```rust
/// let version = edfdemux::version();
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
