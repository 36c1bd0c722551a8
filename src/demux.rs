use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, trace};

use crate::error::{EdfError, Result};
use crate::types::{Header, SampleMatrix, SignalSamples};
use crate::utils::fill_buffer;

/// Splits the data records of an EDF stream into one sample sequence per signal.
///
/// Each data record holds `samples_per_record[0]` samples of signal 0, then
/// `samples_per_record[1]` samples of signal 1, and so on. The demultiplexer
/// walks records in order and appends each run to its signal, so every
/// output sequence is ordered by record first, then by position in the record.
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use edfdemux::{HeaderDecoder, RecordDemultiplexer};
/// use edfdemux::doctest_utils::EdfImage;
///
/// let bytes = EdfImage::new()
///     .signal("A", 2)
///     .signal("B", 1)
///     .records(vec![vec![10, 20, 30], vec![11, 21, 31]])
///     .build();
///
/// let mut cursor = Cursor::new(bytes);
/// let header = HeaderDecoder::default().decode(&mut cursor)?;
/// let matrix = RecordDemultiplexer::new(&header).demultiplex(&mut cursor)?;
///
/// assert_eq!(matrix.signals[0].samples, vec![10, 20, 11, 21]);
/// assert_eq!(matrix.signals[1].samples, vec![30, 31]);
/// # Ok::<(), edfdemux::EdfError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RecordDemultiplexer<'a> {
    header: &'a Header,
    include_labels: bool,
}

impl<'a> RecordDemultiplexer<'a> {
    pub fn new(header: &'a Header) -> Self {
        Self {
            header,
            include_labels: false,
        }
    }

    /// Prefix every signal's sequence with its label.
    pub fn with_labels(mut self, include_labels: bool) -> Self {
        self.include_labels = include_labels;
        self
    }

    /// Reads all data records and returns the per-signal samples.
    ///
    /// The stream is first positioned at `header.header_bytes` from its
    /// start, so it does not matter where the cursor was left before.
    ///
    /// # Errors
    ///
    /// * `EdfError::InvalidFormat` - record count or a sample count is negative, or the data size overflows
    /// * `EdfError::TruncatedData` - the stream holds fewer bytes than the header promises
    /// * `EdfError::Io` - seeking or reading failed
    pub fn demultiplex<R: Read + Seek>(&self, reader: &mut R) -> Result<SampleMatrix> {
        let header = self.header;

        let records = u64::try_from(header.data_records).map_err(|_| {
            EdfError::InvalidFormat(format!(
                "data record count {} is unknown or negative",
                header.data_records
            ))
        })?;
        if let Some(signal) = header.signals.iter().find(|s| s.samples_per_record < 0) {
            return Err(EdfError::InvalidFormat(format!(
                "signal {:?} has negative samples per record ({})",
                signal.label, signal.samples_per_record
            )));
        }
        let (record_size, expected) = header
            .record_size()
            .zip(header.data_size())
            .ok_or_else(|| EdfError::InvalidFormat("data region size overflows".to_string()))?;

        // 先检查可用数据长度，避免按错误头部分配大块内存
        let end = reader.seek(SeekFrom::End(0))?;
        let available = end.saturating_sub(header.header_bytes);
        if available < expected {
            return Err(EdfError::TruncatedData {
                expected,
                available,
            });
        }

        reader.seek(SeekFrom::Start(header.header_bytes))?;

        debug!(
            signals = header.signal_count(),
            records,
            record_size,
            labels = self.include_labels,
            "demultiplexing data records"
        );

        let mut signals: Vec<SignalSamples> = header
            .signals
            .iter()
            .map(|s| SignalSamples {
                label: self.include_labels.then(|| s.label.clone()),
                samples: Vec::with_capacity(s.samples_per_record as usize * records as usize),
            })
            .collect();

        if records == 0 {
            return Ok(SampleMatrix { signals });
        }

        let mut buf = vec![0u8; record_size as usize];
        for record in 0..records {
            let filled = fill_buffer(reader, &mut buf)?;
            if filled < buf.len() {
                return Err(EdfError::TruncatedData {
                    expected,
                    available: record * record_size + filled as u64,
                });
            }

            // 按信号顺序拆分当前数据记录
            let mut offset = 0;
            for (signal, out) in header.signals.iter().zip(signals.iter_mut()) {
                let len = signal.samples_per_record as usize * 2;
                out.samples.extend(
                    buf[offset..offset + len]
                        .chunks_exact(2)
                        .map(|b| i16::from_le_bytes([b[0], b[1]])),
                );
                offset += len;
            }
            trace!(record, "data record demultiplexed");
        }

        Ok(SampleMatrix { signals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::EdfImage;
    use crate::header::HeaderDecoder;
    use std::io::Cursor;

    fn decode(bytes: Vec<u8>) -> (Header, Cursor<Vec<u8>>) {
        let mut cursor = Cursor::new(bytes);
        let header = HeaderDecoder::default().decode(&mut cursor).unwrap();
        (header, cursor)
    }

    #[test]
    fn test_interleaving_order() {
        let (header, mut cursor) = decode(
            EdfImage::new()
                .signal("A", 2)
                .signal("B", 1)
                .records(vec![vec![10, 20, 30], vec![11, 21, 31]])
                .build(),
        );
        let matrix = RecordDemultiplexer::new(&header).demultiplex(&mut cursor).unwrap();
        assert_eq!(matrix.signals[0].samples, vec![10, 20, 11, 21]);
        assert_eq!(matrix.signals[1].samples, vec![30, 31]);
        assert!(matrix.signals.iter().all(|s| s.label.is_none()));
    }

    #[test]
    fn test_little_endian_signed_samples() {
        let (header, mut cursor) = decode(
            EdfImage::new()
                .signal("A", 3)
                .records(vec![vec![i16::MIN, -1, i16::MAX]])
                .build(),
        );
        let matrix = RecordDemultiplexer::new(&header).demultiplex(&mut cursor).unwrap();
        assert_eq!(matrix.signals[0].samples, vec![i16::MIN, -1, i16::MAX]);
    }

    #[test]
    fn test_labels_prefix_each_signal() {
        let (header, mut cursor) = decode(
            EdfImage::new()
                .signal("EEG", 1)
                .signal("ECG", 1)
                .records(vec![vec![1, 2]])
                .build(),
        );
        let matrix = RecordDemultiplexer::new(&header)
            .with_labels(true)
            .demultiplex(&mut cursor)
            .unwrap();
        assert_eq!(matrix.signals[0].label.as_deref(), Some("EEG"));
        assert_eq!(matrix.signals[1].label.as_deref(), Some("ECG"));
        assert_eq!(matrix.signals[0].len(), 2);
    }

    #[test]
    fn test_zero_samples_per_record() {
        let (header, mut cursor) = decode(
            EdfImage::new()
                .signal("A", 1)
                .signal("Empty", 0)
                .signal("C", 1)
                .records(vec![vec![5, 6], vec![7, 8]])
                .build(),
        );
        let matrix = RecordDemultiplexer::new(&header).demultiplex(&mut cursor).unwrap();
        assert_eq!(matrix.signals[0].samples, vec![5, 7]);
        assert!(matrix.signals[1].samples.is_empty());
        assert_eq!(matrix.signals[2].samples, vec![6, 8]);
    }

    #[test]
    fn test_truncated_data_region() {
        let mut bytes = EdfImage::new()
            .signal("A", 2)
            .records(vec![vec![1, 2], vec![3, 4]])
            .build();
        bytes.pop();
        let (header, mut cursor) = decode(bytes);
        match RecordDemultiplexer::new(&header).demultiplex(&mut cursor) {
            Err(EdfError::TruncatedData { expected, available }) => {
                assert_eq!(expected, 8);
                assert_eq!(available, 7);
            }
            other => panic!("expected TruncatedData, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_records_with_wide_records() {
        let mut image = EdfImage::new();
        for i in 0..9999 {
            image = image.signal(&format!("S{}", i), 99_999_999);
        }
        let (header, mut cursor) = decode(image.records(vec![]).build());
        assert_eq!(header.data_records, 0);

        let matrix = RecordDemultiplexer::new(&header)
            .with_labels(true)
            .demultiplex(&mut cursor)
            .unwrap();
        assert_eq!(matrix.signal_count(), 9999);
        assert!(matrix.signals.iter().all(|s| s.samples.is_empty() && s.len() == 1));
    }

    #[test]
    fn test_negative_samples_per_record_is_rejected() {
        let (header, mut cursor) = decode(
            EdfImage::new()
                .signal("A", 2)
                .signal("B", -3)
                .records(vec![vec![1, 2]])
                .build(),
        );
        assert_eq!(header.signals[1].samples_per_record, -3);
        match RecordDemultiplexer::new(&header).demultiplex(&mut cursor) {
            Err(EdfError::InvalidFormat(msg)) => assert!(msg.contains("negative samples")),
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_record_count() {
        let (header, mut cursor) = decode(
            EdfImage::new()
                .signal("A", 2)
                .data_records("-1")
                .records(vec![vec![1, 2]])
                .build(),
        );
        assert_eq!(header.data_records, -1);
        assert!(matches!(
            RecordDemultiplexer::new(&header).demultiplex(&mut cursor),
            Err(EdfError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_seeks_past_read_ahead() {
        let (header, mut cursor) = decode(
            EdfImage::new()
                .signal("A", 1)
                .records(vec![vec![42], vec![43]])
                .build(),
        );
        cursor.set_position(0);
        let matrix = RecordDemultiplexer::new(&header).demultiplex(&mut cursor).unwrap();
        assert_eq!(matrix.signals[0].samples, vec![42, 43]);

        cursor.set_position(header.header_bytes + 2);
        let again = RecordDemultiplexer::new(&header).demultiplex(&mut cursor).unwrap();
        assert_eq!(again, matrix);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = EdfImage::new()
            .signal("A", 1)
            .records(vec![vec![9]])
            .build();
        bytes.extend_from_slice(&[0xff; 5]);
        let (header, mut cursor) = decode(bytes);
        let matrix = RecordDemultiplexer::new(&header).demultiplex(&mut cursor).unwrap();
        assert_eq!(matrix.signals[0].samples, vec![9]);
    }
}
