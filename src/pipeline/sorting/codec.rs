//! Line-oriented reading and writing of legacy-encoded text.
//!
//! A line ends at `\n`, `\r` or `\r\n`. Terminators are found on raw bytes
//! before decoding, which is sound for the ASCII-compatible encodings the
//! config accepts (no multi-byte sequence of theirs contains 0x0A or 0x0D).
//!
//! Records are written back from their raw bytes, never re-encoded: some
//! legacy byte sequences decode to characters the encoder maps elsewhere.

use std::io::{self, BufRead, BufWriter, ErrorKind, Write};

use encoding_rs::Encoding;

/// One input line, terminator removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLine {
    /// Bytes exactly as read.
    pub raw: Vec<u8>,
    /// Decoded view used for classification and logging.
    pub text: String,
    /// Malformed input was replaced with U+FFFD in `text`.
    pub had_errors: bool,
}

pub struct LegacyLineReader<R> {
    inner: R,
    encoding: &'static Encoding,
    buf: Vec<u8>,
}

impl<R: BufRead> LegacyLineReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            buf: Vec::with_capacity(256),
        }
    }

    /// Read the next line, or `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<DecodedLine>> {
        self.buf.clear();
        let mut read_any = false;

        loop {
            let available = match self.inner.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                break;
            }
            read_any = true;

            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(i) => {
                    let terminator = available[i];
                    self.buf.extend_from_slice(&available[..i]);
                    self.inner.consume(i + 1);
                    if terminator == b'\r' {
                        self.skip_lf()?;
                    }
                    return Ok(Some(self.take_line()));
                }
                None => {
                    let len = available.len();
                    self.buf.extend_from_slice(available);
                    self.inner.consume(len);
                }
            }
        }

        if read_any {
            Ok(Some(self.take_line()))
        } else {
            Ok(None)
        }
    }

    /// Swallow the `\n` of a `\r\n` pair, refilling if the pair straddles two reads.
    fn skip_lf(&mut self) -> io::Result<()> {
        loop {
            match self.inner.fill_buf() {
                Ok(available) => {
                    if available.first() == Some(&b'\n') {
                        self.inner.consume(1);
                    }
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn take_line(&mut self) -> DecodedLine {
        let (text, had_errors) = self.encoding.decode_without_bom_handling(&self.buf);
        let text = text.into_owned();
        DecodedLine {
            raw: std::mem::take(&mut self.buf),
            text,
            had_errors,
        }
    }
}

/// Appends raw records, each followed by `\n`.
pub struct RecordWriter<W: Write> {
    inner: BufWriter<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
        }
    }

    pub fn write_record(&mut self, raw: &[u8]) -> io::Result<()> {
        self.inner.write_all(raw)?;
        self.inner.write_all(b"\n")
    }

    /// Flush buffered output, surfacing any deferred write error.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        self.inner.into_inner().map_err(|e| e.into_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{SHIFT_JIS, UTF_8};
    use std::io::BufReader;

    fn read_all(bytes: &[u8], encoding: &'static Encoding) -> Vec<DecodedLine> {
        let mut reader = LegacyLineReader::new(bytes, encoding);
        let mut lines = Vec::new();
        while let Some(line) = reader.read_line().unwrap() {
            lines.push(line);
        }
        lines
    }

    fn texts(lines: &[DecodedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn strips_lf_and_crlf() {
        let lines = read_all(b"one\r\ntwo\nthree", UTF_8);
        assert_eq!(texts(&lines), vec!["one", "two", "three"]);
    }

    #[test]
    fn lone_cr_ends_a_line() {
        let lines = read_all(b"h\rx,y,A1\rz,w,B2\r", UTF_8);
        assert_eq!(texts(&lines), vec!["h", "x,y,A1", "z,w,B2"]);
    }

    #[test]
    fn mixed_terminators() {
        let lines = read_all(b"h\nx,y,A1\rz,w,B2\r\nlast", UTF_8);
        assert_eq!(texts(&lines), vec!["h", "x,y,A1", "z,w,B2", "last"]);
    }

    #[test]
    fn crlf_split_across_reads_is_one_terminator() {
        // Capacity 2 puts "\r" and "\n" in separate fills.
        let input: &[u8] = b"a\r\nb\r\n";
        let mut reader = LegacyLineReader::new(BufReader::with_capacity(2, input), UTF_8);
        let mut lines = Vec::new();
        while let Some(line) = reader.read_line().unwrap() {
            lines.push(line.text);
        }
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn empty_lines_preserved() {
        let lines = read_all(b"h\n\nx\n", UTF_8);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text, "");
        assert!(lines[1].raw.is_empty());
    }

    #[test]
    fn cr_cr_is_an_empty_line() {
        let lines = read_all(b"a\r\rb", UTF_8);
        assert_eq!(texts(&lines), vec!["a", "", "b"]);
    }

    #[test]
    fn decodes_shift_jis() {
        // "東京,A" in Shift_JIS
        let bytes = [0x93, 0x8C, 0x8B, 0x9E, b',', b'A'];
        let mut input = bytes.to_vec();
        input.push(b'\n');
        let lines = read_all(&input, SHIFT_JIS);
        assert_eq!(lines[0].text, "東京,A");
        assert_eq!(lines[0].raw, bytes.to_vec());
        assert!(!lines[0].had_errors);
    }

    #[test]
    fn malformed_bytes_flagged_raw_kept() {
        let lines = read_all(&[b'a', 0x81, b'\n'], SHIFT_JIS);
        assert!(lines[0].had_errors);
        assert!(lines[0].text.contains('\u{FFFD}'));
        assert_eq!(lines[0].raw, vec![b'a', 0x81]);
    }

    #[test]
    fn writer_emits_raw_bytes_and_lf() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_record(&[0xED, 0x40, b',', b'A']).unwrap();
        writer.write_record(b"").unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes, vec![0xED, 0x40, b',', b'A', b'\n', b'\n']);
    }
}
