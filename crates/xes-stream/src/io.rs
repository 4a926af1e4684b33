//! File handles and text decoding.
//!
//! Paths ending in `.gz` are read and written through gzip. Input lines are
//! split on `\n` before decoding, which is why only ASCII-compatible
//! encodings are accepted (see [`crate::XesConfig::resolve_encoding`]).

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use encoding_rs::Encoding;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Returns true if the path names a gzip file.
#[must_use]
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Opens a document for reading, decompressing `.gz` files.
pub fn open_input(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// A file opened for writing, plain or gzip-compressed.
pub enum Output {
    /// An uncompressed file.
    Plain(BufWriter<File>),
    /// A gzip stream over a file.
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Output {
    /// Creates `path`, compressing when it ends in `.gz`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        if is_gzip(path) {
            Ok(Self::Gzip(GzEncoder::new(file, Compression::default())))
        } else {
            Ok(Self::Plain(file))
        }
    }

    /// Flushes buffered data and writes the gzip trailer.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Plain(mut writer) => writer.flush(),
            Self::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(writer) => writer.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(writer) => writer.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Iterator over the decoded lines of a byte stream.
///
/// Line terminators (`\n` or `\r\n`) are stripped. A byte order mark
/// matching the encoding is dropped from the first line. Bytes that are
/// malformed in the encoding yield [`io::ErrorKind::InvalidData`].
pub struct DecodedLines<R> {
    reader: R,
    encoding: &'static Encoding,
    buf: Vec<u8>,
    first: bool,
}

impl<R: BufRead> DecodedLines<R> {
    /// Wraps a reader.
    pub fn new(reader: R, encoding: &'static Encoding) -> Self {
        Self {
            reader,
            encoding,
            buf: Vec::new(),
            first: true,
        }
    }

    fn decode(&self) -> io::Result<String> {
        let mut bytes = self.buf.as_slice();
        if let Some(stripped) = bytes.strip_suffix(b"\n") {
            bytes = stripped;
        }
        if let Some(stripped) = bytes.strip_suffix(b"\r") {
            bytes = stripped;
        }
        if self.first {
            if let Some((bom_encoding, len)) = Encoding::for_bom(bytes) {
                if bom_encoding == self.encoding {
                    bytes = &bytes[len..];
                }
            }
        }
        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(std::borrow::Cow::into_owned)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("input is not valid {}", self.encoding.name()),
                )
            })
    }
}

impl<R: BufRead> Iterator for DecodedLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let line = self.decode();
                self.first = false;
                Some(line)
            }
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn lines(bytes: &[u8], encoding: &'static Encoding) -> Vec<io::Result<String>> {
        DecodedLines::new(Cursor::new(bytes.to_vec()), encoding).collect()
    }

    #[test]
    fn strips_terminators_and_bom() {
        let decoded: Vec<String> = lines(b"\xEF\xBB\xBFfirst\r\nsecond\nthird", encoding_rs::UTF_8)
            .into_iter()
            .collect::<io::Result<_>>()
            .expect("valid utf-8");
        assert_eq!(decoded, vec!["first", "second", "third"]);
    }

    #[test]
    fn decodes_single_byte_encodings() {
        let decoded = lines(b"caf\xE9\n", encoding_rs::WINDOWS_1252);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].as_ref().expect("decodes"), "café");
    }

    #[test]
    fn malformed_input_is_invalid_data() {
        let decoded = lines(b"ok\n\xFF\xFE\xFD\n", encoding_rs::UTF_8);
        assert!(decoded[0].is_ok());
        let err = decoded[1].as_ref().expect_err("malformed");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn gzip_suffix_detection() {
        assert!(is_gzip(Path::new("log.xes.gz")));
        assert!(is_gzip(Path::new("LOG.XES.GZ")));
        assert!(!is_gzip(Path::new("log.xes")));
        assert!(!is_gzip(Path::new("gz")));
    }

    #[test]
    fn gzip_output_is_readable_input() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("lines.txt.gz");

        let mut output = Output::create(&path).expect("create");
        output.write_all(b"one\ntwo\n").expect("write");
        output.finish().expect("finish");

        let mut raw = Vec::new();
        File::open(&path).expect("open").read_to_end(&mut raw).expect("read");
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);

        let mut text = String::new();
        open_input(&path).expect("open").read_to_string(&mut text).expect("read");
        assert_eq!(text, "one\ntwo\n");
    }
}
