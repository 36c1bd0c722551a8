use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::demux::RecordDemultiplexer;
use crate::error::{EdfError, Result};
use crate::header::HeaderDecoder;
use crate::types::{FieldParsing, Header, SampleMatrix};

/// EDF file reader
///
/// `EdfReader` decodes the header once when it is created and keeps the
/// underlying stream so the data records can be demultiplexed on demand.
///
/// # Examples
///
/// ```rust
/// use edfdemux::{EdfReader, FieldParsing};
///
/// # // Generate test file (hidden from docs)
/// # edfdemux::doctest_utils::create_simple_test_file("recording.edf")?;
/// #
/// let mut reader = EdfReader::open("recording.edf", FieldParsing::Lenient)?;
///
/// let header = reader.header();
/// println!("Signals: {}", header.signal_count());
/// println!("Duration: {:.1} seconds", header.recording_duration());
///
/// let matrix = reader.read_samples(false)?;
/// assert_eq!(matrix.signals[0].samples.len(), 8);
///
/// # // Cleanup (hidden from docs)
/// # std::fs::remove_file("recording.edf").ok();
/// # Ok::<(), edfdemux::EdfError>(())
/// ```
pub struct EdfReader<R> {
    source: R,
    header: Header,
}

impl EdfReader<BufReader<File>> {
    /// Opens an EDF file and decodes its header
    ///
    /// # Errors
    ///
    /// * `EdfError::FileNotFound` - File doesn't exist or can't be opened
    /// * `EdfError::InvalidFormat` - File is not an EDF recording
    /// * `EdfError::MalformedField` - A numeric header field is invalid (strict parsing)
    /// * `EdfError::TruncatedData` - File ends inside the header
    ///
    /// ```rust
    /// use edfdemux::{EdfReader, EdfError, FieldParsing};
    ///
    /// match EdfReader::open("nonexistent.edf", FieldParsing::Lenient) {
    ///     Ok(_) => println!("Unexpected success"),
    ///     Err(EdfError::FileNotFound(msg)) => println!("File not found: {}", msg),
    ///     Err(e) => println!("Other error: {}", e),
    /// }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P, parsing: FieldParsing) -> Result<Self> {
        let file = File::open(&path)
            .map_err(|e| EdfError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;

        Self::from_reader(BufReader::new(file), parsing)
    }
}

impl<R: Read + Seek> EdfReader<R> {
    /// Decodes the header from the current position of `source`.
    pub fn from_reader(mut source: R, parsing: FieldParsing) -> Result<Self> {
        let header = HeaderDecoder::new(parsing).decode(&mut source)?;
        Ok(EdfReader { source, header })
    }

    /// Gets a reference to the decoded header
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn into_header(self) -> Header {
        self.header
    }

    /// Demultiplexes every data record in the file.
    ///
    /// May be called repeatedly; each call seeks back to the data region.
    pub fn read_samples(&mut self, include_labels: bool) -> Result<SampleMatrix> {
        RecordDemultiplexer::new(&self.header)
            .with_labels(include_labels)
            .demultiplex(&mut self.source)
    }
}
