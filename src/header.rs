use std::io::Read;

use tracing::{debug, warn};

use crate::error::{EdfError, Result};
use crate::types::{FieldParsing, Header, SignalHeader};
use crate::utils::{field_text, parse_integer, parse_real, read_region};

/// Size of the fixed global header and of each signal's share of the signal block.
pub const HEADER_BLOCK_SIZE: usize = 256;

/// Decoder for the EDF header region.
///
/// Reads the 256-byte global header followed by `256 × ns` bytes of signal
/// fields and leaves the stream positioned at the first data record.
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use edfdemux::{HeaderDecoder, FieldParsing};
/// use edfdemux::doctest_utils::EdfImage;
///
/// let bytes = EdfImage::new()
///     .signal("EEG Fz", 2)
///     .records(vec![vec![1, 2]])
///     .build();
///
/// let mut cursor = Cursor::new(bytes);
/// let header = HeaderDecoder::new(FieldParsing::Lenient).decode(&mut cursor)?;
///
/// assert_eq!(header.signals[0].label, "EEG Fz");
/// assert_eq!(cursor.position(), header.header_bytes);
/// # Ok::<(), edfdemux::EdfError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder {
    parsing: FieldParsing,
}

impl HeaderDecoder {
    pub fn new(parsing: FieldParsing) -> Self {
        Self { parsing }
    }

    /// Decodes the header from the current stream position.
    ///
    /// # Errors
    ///
    /// * `EdfError::InvalidFormat` - version marker is not `0` or the signal count is negative
    /// * `EdfError::MalformedField` - a numeric field does not parse (strict mode only)
    /// * `EdfError::TruncatedData` - the stream ends inside the header
    /// * `EdfError::Io` - the underlying read failed
    pub fn decode<R: Read>(&self, reader: &mut R) -> Result<Header> {
        // 读取主头部（256字节）
        let main = read_region(reader, HEADER_BLOCK_SIZE)?;

        // 验证版本标识
        let version = field_text(&main[0..8]);
        if version != "0" {
            return Err(EdfError::InvalidFormat(format!(
                "version marker is {:?}, expected \"0\"",
                version
            )));
        }

        let patient_id = field_text(&main[8..88]);
        let recording_id = field_text(&main[88..168]);
        let start_date = field_text(&main[168..176]);
        let start_time = field_text(&main[176..184]);
        let header_bytes =
            parse_integer("header bytes", &field_text(&main[184..192]), self.parsing)?;
        let reserved = field_text(&main[192..236]);
        let data_records =
            parse_integer("data records", &field_text(&main[236..244]), self.parsing)?;
        let record_duration =
            parse_real("record duration", &field_text(&main[244..252]), self.parsing)?;
        let signal_count =
            parse_integer("signal count", &field_text(&main[252..256]), self.parsing)?;

        if signal_count < 0 {
            return Err(EdfError::InvalidFormat(format!(
                "negative signal count {}",
                signal_count
            )));
        }
        let ns = signal_count as usize;

        // 读取信号头部信息
        let block = read_region(reader, ns * HEADER_BLOCK_SIZE)?;
        let signals = self.parse_signals(&block, ns)?;

        let expected_bytes = (ns as u64 + 1) * HEADER_BLOCK_SIZE as u64;
        let header_bytes = match u64::try_from(header_bytes) {
            Ok(bytes) if bytes == expected_bytes => bytes,
            _ if self.parsing == FieldParsing::Strict => {
                return Err(EdfError::MalformedField {
                    field: "header bytes",
                    value: header_bytes.to_string(),
                });
            }
            // 小于主头部的值不可能正确，改用计算值
            Ok(bytes) if bytes >= HEADER_BLOCK_SIZE as u64 => {
                warn!(declared = bytes, computed = expected_bytes, "header size disagrees with signal count");
                bytes
            }
            _ => {
                warn!(declared = header_bytes, computed = expected_bytes, "impossible header size, using computed size");
                expected_bytes
            }
        };

        debug!(
            signals = ns,
            data_records,
            record_duration,
            header_bytes,
            "decoded EDF header"
        );

        Ok(Header {
            version,
            patient_id,
            recording_id,
            start_date,
            start_time,
            header_bytes,
            reserved,
            data_records,
            record_duration,
            signals,
        })
    }

    /// 解析信号参数，每个字段对所有信号连续存放
    fn parse_signals(&self, block: &[u8], ns: usize) -> Result<Vec<SignalHeader>> {
        let text = |base: usize, width: usize, i: usize| {
            let start = base * ns + i * width;
            field_text(&block[start..start + width])
        };

        let mut signals = Vec::with_capacity(ns);
        for i in 0..ns {
            let samples =
                parse_integer("samples per record", &text(216, 8, i), self.parsing)?;
            let samples_per_record = match i32::try_from(samples) {
                Ok(n) if n >= 0 || self.parsing == FieldParsing::Lenient => n,
                _ => {
                    return Err(EdfError::MalformedField {
                        field: "samples per record",
                        value: samples.to_string(),
                    });
                }
            };

            signals.push(SignalHeader {
                label: text(0, 16, i),
                transducer: text(16, 80, i),
                physical_dimension: text(96, 8, i),
                physical_min: text(104, 8, i),
                physical_max: text(112, 8, i),
                digital_min: text(120, 8, i),
                digital_max: text(128, 8, i),
                prefilter: text(136, 80, i),
                samples_per_record,
            });
        }

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::EdfImage;
    use std::io::Cursor;

    #[test]
    fn test_decode_global_fields() {
        let bytes = EdfImage::new()
            .patient("X F 01-JAN-1970 Jane")
            .recording("Startdate 17-APR-2001 lab")
            .start("17.04.01", "11.25.00")
            .duration("0.5")
            .signal("EEG", 4)
            .records(vec![vec![0; 4]; 3])
            .build();

        let header = HeaderDecoder::default().decode(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(header.version, "0");
        assert_eq!(header.patient_id, "X F 01-JAN-1970 Jane");
        assert_eq!(header.recording_id, "Startdate 17-APR-2001 lab");
        assert_eq!(header.start_date, "17.04.01");
        assert_eq!(header.start_time, "11.25.00");
        assert_eq!(header.header_bytes, 512);
        assert_eq!(header.data_records, 3);
        assert_eq!(header.record_duration, 0.5);
        assert_eq!(header.signal_count(), 1);
    }

    #[test]
    fn test_decode_rejects_bad_version() {
        let mut bytes = EdfImage::new().signal("EEG", 1).build();
        bytes[0..8].copy_from_slice(b"1       ");
        match HeaderDecoder::default().decode(&mut Cursor::new(bytes)) {
            Err(EdfError::InvalidFormat(msg)) => assert!(msg.contains("version")),
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_zero_signals() {
        let bytes = EdfImage::new().build();
        let mut cursor = Cursor::new(bytes);
        let header = HeaderDecoder::default().decode(&mut cursor).unwrap();
        assert!(header.signals.is_empty());
        assert_eq!(header.header_bytes, 256);
        assert_eq!(cursor.position(), 256);
    }

    #[test]
    fn test_lenient_zero_fill() {
        let mut bytes = EdfImage::new().signal("EEG", 8).build();
        bytes[236..244].copy_from_slice(b"n/a     ");
        let header = HeaderDecoder::new(FieldParsing::Lenient)
            .decode(&mut Cursor::new(bytes))
            .unwrap();
        assert_eq!(header.data_records, 0);
    }

    #[test]
    fn test_strict_rejects_unparseable_field() {
        let mut bytes = EdfImage::new().signal("EEG", 8).build();
        bytes[236..244].copy_from_slice(b"n/a     ");
        match HeaderDecoder::new(FieldParsing::Strict).decode(&mut Cursor::new(bytes)) {
            Err(EdfError::MalformedField { field, value }) => {
                assert_eq!(field, "data records");
                assert_eq!(value, "n/a");
            }
            other => panic!("expected MalformedField, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_rejects_header_size_mismatch() {
        let bytes = EdfImage::new().signal("EEG", 8).header_bytes(1024).build();

        let header = HeaderDecoder::new(FieldParsing::Lenient)
            .decode(&mut Cursor::new(bytes.clone()))
            .unwrap();
        assert_eq!(header.header_bytes, 1024);

        assert!(matches!(
            HeaderDecoder::new(FieldParsing::Strict).decode(&mut Cursor::new(bytes)),
            Err(EdfError::MalformedField { field: "header bytes", .. })
        ));
    }

    #[test]
    fn test_impossible_header_size_uses_computed_size() {
        for field in ["-512", "0", "n/a", "100"] {
            let mut bytes = EdfImage::new().signal("A", 1).signal("B", 1).build();
            let mut value = [b' '; 8];
            value[..field.len()].copy_from_slice(field.as_bytes());
            bytes[184..192].copy_from_slice(&value);

            let mut cursor = Cursor::new(bytes);
            let header = HeaderDecoder::new(FieldParsing::Lenient).decode(&mut cursor).unwrap();
            assert_eq!(header.header_bytes, 768, "field {:?}", field);
            assert_eq!(cursor.position(), 768);
        }
    }

    #[test]
    fn test_negative_samples_per_record() {
        let bytes = EdfImage::new().signal("A", 4).signal("B", -1).build();

        let header = HeaderDecoder::new(FieldParsing::Lenient)
            .decode(&mut Cursor::new(bytes.clone()))
            .unwrap();
        assert_eq!(header.signals[1].samples_per_record, -1);

        match HeaderDecoder::new(FieldParsing::Strict).decode(&mut Cursor::new(bytes)) {
            Err(EdfError::MalformedField { field, value }) => {
                assert_eq!(field, "samples per record");
                assert_eq!(value, "-1");
            }
            other => panic!("expected MalformedField, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_signal_count() {
        let mut bytes = EdfImage::new().build();
        bytes[252..256].copy_from_slice(b"-2  ");
        assert!(matches!(
            HeaderDecoder::default().decode(&mut Cursor::new(bytes)),
            Err(EdfError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_truncated_signal_block() {
        let bytes = EdfImage::new().signal("A", 1).signal("B", 1).build();
        let short = bytes[..256 + 300].to_vec();
        assert!(matches!(
            HeaderDecoder::default().decode(&mut Cursor::new(short)),
            Err(EdfError::TruncatedData { expected: 512, available: 300 })
        ));
    }
}
