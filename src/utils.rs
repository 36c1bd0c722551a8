use std::io::{self, Read};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;

use crate::error::{EdfError, Result};
use crate::types::FieldParsing;

/// Fills `buf` from `reader` and returns how many bytes were actually read.
///
/// Unlike `read_exact`, a short stream is not an error here: the caller gets
/// the count back so it can report how much data was available.
pub fn fill_buffer<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads a fixed-size byte region, failing with `TruncatedData` on a short stream.
pub fn read_region<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let filled = fill_buffer(reader, &mut buf)?;
    if filled < len {
        return Err(EdfError::TruncatedData {
            expected: len as u64,
            available: filled as u64,
        });
    }
    Ok(buf)
}

/// Decodes a fixed-width ASCII field and strips its padding.
///
/// Spaces, tabs and NUL bytes on either side count as padding. Bytes that are
/// not valid UTF-8 are replaced rather than rejected.
pub fn field_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}

/// Parses an integer header field according to the parsing policy.
///
/// In lenient mode anything that does not parse becomes `0`, which is what
/// older EDF tooling did; strict mode reports `MalformedField` instead.
pub fn parse_integer(field: &'static str, text: &str, parsing: FieldParsing) -> Result<i64> {
    match text.parse::<i64>() {
        Ok(value) => Ok(value),
        Err(_) => match parsing {
            FieldParsing::Lenient => {
                warn!(field, value = text, "unparseable integer field, using 0");
                Ok(0)
            }
            FieldParsing::Strict => Err(EdfError::MalformedField {
                field,
                value: text.to_string(),
            }),
        },
    }
}

/// Parses a decimal header field according to the parsing policy.
pub fn parse_real(field: &'static str, text: &str, parsing: FieldParsing) -> Result<f64> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => match parsing {
            FieldParsing::Lenient => {
                warn!(field, value = text, "unparseable numeric field, using 0");
                Ok(0.0)
            }
            FieldParsing::Strict => Err(EdfError::MalformedField {
                field,
                value: text.to_string(),
            }),
        },
    }
}

/// 解析 "dd.mm.yy" 与 "hh.mm.ss" 格式的开始日期时间
///
/// Two-digit years use the EDF clipping rule: `85..=99` map to the 1900s,
/// everything else to the 2000s. Returns `None` if any component is malformed.
pub fn parse_start_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let [day, month, yy] = split_triplet(date)?;
    let year = if yy > 84 { 1900 + yy } else { 2000 + yy };
    let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;

    let [hour, minute, second] = split_triplet(time)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;

    Some(NaiveDateTime::new(date, time))
}

fn split_triplet(s: &str) -> Option<[u32; 3]> {
    let mut parts = s.trim().split('.');
    let mut out = [0u32; 3];
    for slot in out.iter_mut() {
        let part = parts.next()?;
        if part.len() != 2 {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}
