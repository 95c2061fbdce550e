use crate::error::{ParseError, ReadError};
use crate::record::{Format, Record};
use anyhow::Context;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

pub mod bytes;
pub mod fasta;
pub mod fastq;

use bytes::LineReader;

/// A lazy stream of records from a single file, which can be rewound to the start for another
/// pass. Malformed records are yielded as `ReadError::Malformed` and the stream carries on from
/// the next record; an I/O error ends the stream.
pub struct SeqReader<R> {
    lines: LineReader<R>,
    name: String,
    format: Format,
    buf: Vec<u8>,
    malformed: usize,
    failed: bool,
}

impl SeqReader<File> {
    /// Opens the file at `path` as a record stream of the given format.
    pub fn open(path: &Path, format: Format) -> anyhow::Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Unable to open file {}", path.display()))?;
        Ok(Self::new(file, path.display().to_string(), format))
    }
}

impl<R: Read + Seek> SeqReader<R> {
    /// Wraps `source`. The `name` is only used in log messages and errors.
    pub fn new(source: R, name: impl Into<String>, format: Format) -> Self {
        Self {
            lines: LineReader::new(source),
            name: name.into(),
            format,
            buf: Vec::new(),
            malformed: 0,
            failed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of malformed records skipped by `next_valid` since the last rewind.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// The first non-whitespace byte of the source, or `None` if it has no content. The stream
    /// is rewound afterwards.
    pub fn first_byte(&mut self) -> std::io::Result<Option<u8>> {
        let first = self.lines.peek_content_byte()?;
        self.rewind()?;
        Ok(first)
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// Repositions the stream at offset zero so that the same handle can be replayed.
    pub fn rewind(&mut self) -> std::io::Result<()> {
        self.lines.rewind()?;
        self.malformed = 0;
        self.failed = false;
        Ok(())
    }

    /// Advances to the next well-formed record, skipping (and counting) malformed ones.
    /// Returns `Ok(None)` once the stream is exhausted.
    pub fn next_valid(&mut self) -> std::io::Result<Option<Record>> {
        loop {
            match self.next() {
                Some(Ok(record)) => return Ok(Some(record)),
                Some(Err(ReadError::Malformed(e))) => {
                    self.malformed += 1;
                    debug!("{}: skipping malformed record: {}", self.name, e);
                }
                Some(Err(ReadError::Io(e))) => return Err(e),
                None => return Ok(None),
            }
        }
    }
}

impl<R: Read + Seek> Iterator for SeqReader<R> {
    type Item = Result<Record, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let result = match self.format {
            Format::Fastq => fastq::next_record(&mut self.lines, &mut self.buf),
            Format::Fasta => fasta::next_record(&mut self.lines, &mut self.buf),
        };

        match result {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(ReadError::Io(e)) => {
                self.failed = true;
                Some(Err(ReadError::Io(e)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Reads lines into `buf` until one has content. Returns `false` at the end of the file.
fn read_header_line<R: Read + Seek>(
    lines: &mut LineReader<R>,
    buf: &mut Vec<u8>,
) -> std::io::Result<bool> {
    loop {
        if !lines.read_line(buf)? {
            return Ok(false);
        }
        if !buf.iter().all(u8::is_ascii_whitespace) {
            return Ok(true);
        }
    }
}

/// Reads the next header and splits it into identifier and description. Returns `Ok(None)` at the
/// end of the file.
///
/// A bad header is reported once: the lines after it are skipped up to the next one that starts
/// with `marker`, which is left for the following call.
fn read_header<R: Read + Seek>(
    lines: &mut LineReader<R>,
    buf: &mut Vec<u8>,
    marker: u8,
) -> Result<Option<(String, String)>, ReadError> {
    if !read_header_line(lines, buf)? {
        return Ok(None);
    }

    match parse_header(buf, marker, lines.line()) {
        Ok(header) => Ok(Some(header)),
        Err(e) => {
            while lines.read_line(buf)? {
                if buf.first() == Some(&marker) {
                    lines.unread_line(std::mem::take(buf));
                    break;
                }
            }
            Err(e.into())
        }
    }
}

/// Splits a header line into its identifier and description. The identifier runs up to the
/// first space or tab; the description is everything after that character, verbatim.
fn parse_header(buf: &[u8], marker: u8, line: u64) -> Result<(String, String), ParseError> {
    if buf.first() != Some(&marker) {
        return Err(ParseError::MissingHeader {
            line,
            marker: marker as char,
            found: String::from_utf8_lossy(buf).into_owned(),
        });
    }

    let text = std::str::from_utf8(&buf[1..]).map_err(|_| ParseError::InvalidUtf8 { line })?;
    let (id, description) = text
        .split_once(|c: char| c == ' ' || c == '\t')
        .unwrap_or((text, ""));

    if id.is_empty() {
        return Err(ParseError::EmptyIdentifier { line });
    }

    Ok((id.to_string(), description.to_string()))
}

fn utf8(bytes: Vec<u8>, line: u64) -> Result<String, ParseError> {
    String::from_utf8(bytes).map_err(|_| ParseError::InvalidUtf8 { line })
}
