//! Line-oriented segment tokenizer over a buffered byte source.

use std::io::{self, BufRead};

use log::trace;

use crate::delimiters::Delimiters;
use crate::error::Result;
use crate::segment::Segment;

/// Carriage return, the standard segment terminator
pub const CR: u8 = b'\r';
/// Line feed, tolerated as a segment terminator
pub const LF: u8 = b'\n';

/// Configuration for reading messages
#[derive(Debug, Clone, Copy)]
pub struct ReaderConfig {
    /// Capacity of the buffer placed in front of streaming sources; 0 is
    /// treated as 1
    pub buffer_capacity: usize,
    /// Whether `find`/`get` decode escape sequences in returned values
    pub decode_escapes: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 8 * 1024, // 8KB, matching std's BufReader
            decode_escapes: true,
        }
    }
}

/// Pulls one segment at a time from a byte source.
///
/// Whitespace before a segment is skipped, so blank lines and mixed
/// CR/LF/CRLF boundaries never produce empty segments. A segment ends at the
/// first CR or LF, which is consumed, or at end of input.
pub struct SegmentReader<R> {
    source: R,
    delims: Delimiters,
}

impl<R: BufRead> SegmentReader<R> {
    /// Create a reader that tags every segment with `delims`.
    pub fn new(source: R, delims: Delimiters) -> Self {
        Self { source, delims }
    }

    /// The delimiters attached to produced segments.
    pub fn delimiters(&self) -> &Delimiters {
        &self.delims
    }

    /// Read the next segment, or `Ok(None)` once the source is exhausted.
    ///
    /// Calling again after `Ok(None)` keeps returning `Ok(None)`.
    pub fn next_segment(&mut self) -> Result<Option<Segment>> {
        let mut buf = Vec::new();
        loop {
            let available = match self.source.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available.is_empty() {
                break;
            }

            let mut used = 0;
            let mut terminated = false;
            for &b in available {
                used += 1;
                if buf.is_empty() && is_boundary_noise(b) {
                    continue;
                }
                if b == CR || b == LF {
                    terminated = true;
                    break;
                }
                buf.push(b);
            }
            self.source.consume(used);
            if terminated {
                break;
            }
        }

        if buf.is_empty() {
            trace!("segment reader reached end of input");
            return Ok(None);
        }
        trace!("read segment of {} bytes", buf.len());
        Ok(Some(Segment::new(buf, self.delims)))
    }
}

impl<R: BufRead> Iterator for SegmentReader<R> {
    type Item = Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_segment().transpose()
    }
}

/// Bytes skipped before a segment starts: ASCII whitespace plus vertical
/// tab (the MLLP start byte), NEL and no-break space.
fn is_boundary_noise(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | LF | 0x0B | 0x0C | CR | 0x85 | 0xA0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn read_all(input: &[u8]) -> Vec<String> {
        SegmentReader::new(Cursor::new(input), Delimiters::default())
            .map(|seg| seg.unwrap().to_string())
            .collect()
    }

    #[test]
    fn splits_on_any_line_boundary() {
        assert_eq!(read_all(b"MSH|^~\\&\rPID|1"), vec!["MSH|^~\\&", "PID|1"]);
        assert_eq!(read_all(b"MSH|^~\\&\r\nPID|1\r\n"), vec!["MSH|^~\\&", "PID|1"]);
        assert_eq!(read_all(b"MSH|^~\\&\nPID|1\n"), vec!["MSH|^~\\&", "PID|1"]);
    }

    #[test]
    fn skips_blank_lines_and_leading_whitespace() {
        assert_eq!(
            read_all(b"\r\n\r\n  MSH|^~\\&\r\r\r\n\t PID|1 \r\n\n"),
            vec!["MSH|^~\\&", "PID|1 "]
        );
    }

    #[test]
    fn skips_mllp_start_byte() {
        assert_eq!(read_all(b"\x0bMSH|^~\\&\rPID|1\r"), vec!["MSH|^~\\&", "PID|1"]);
    }

    #[test]
    fn end_of_input_is_sticky() {
        let mut reader = SegmentReader::new(Cursor::new(&b"PID|1\r"[..]), Delimiters::default());
        assert!(reader.next_segment().unwrap().is_some());
        for _ in 0..3 {
            assert!(reader.next_segment().unwrap().is_none());
        }
    }

    #[test]
    fn whitespace_only_input_is_empty() {
        assert!(read_all(b" \r\n\t\r").is_empty());
        assert!(read_all(b"").is_empty());
    }

    #[test]
    fn segments_span_small_buffers() {
        let input = b"MSH|^~\\&|SENDER\rPID|||001677980||SMITH^CURTIS\r";
        let source = io::BufReader::with_capacity(3, Cursor::new(&input[..]));
        let segments: Vec<String> = SegmentReader::new(source, Delimiters::default())
            .map(|seg| seg.unwrap().to_string())
            .collect();
        assert_eq!(
            segments,
            vec!["MSH|^~\\&|SENDER", "PID|||001677980||SMITH^CURTIS"]
        );
    }
}
