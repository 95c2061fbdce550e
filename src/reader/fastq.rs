use super::bytes::LineReader;
use super::{read_header, utf8};
use crate::error::{ParseError, ReadError};
use crate::record::Record;
use std::io::{Read, Seek};

/// Parses the next FASTQ record.
///
/// Sequence and quality may each span several lines. The quality is read until it is at least as
/// long as the sequence, over no more lines than the sequence took. A line starting with `@` that
/// would leave the quality at the wrong length is taken to be the next header and pushed back, as
/// is the header following a record without a separator, so that the next record can still be
/// read.
///
/// Returns `Ok(None)` at the end of the file.
pub fn next_record<R: Read + Seek>(
    lines: &mut LineReader<R>,
    buf: &mut Vec<u8>,
) -> Result<Option<Record>, ReadError> {
    let Some((id, description)) = read_header(lines, buf, b'@')? else {
        return Ok(None);
    };
    let line = lines.line();

    // line 2: sequence, up to the + separator
    let mut seq = Vec::new();
    let mut seq_lines = 0;
    loop {
        if !lines.read_line(buf)? {
            return Err(ParseError::Truncated { id, line }.into());
        }
        match buf.first().copied() {
            Some(b'+') => break,
            Some(b'@') => {
                lines.unread_line(std::mem::take(buf));
                return Err(ParseError::MissingSeparator { id, line }.into());
            }
            _ => {
                seq.extend_from_slice(buf);
                seq_lines += 1;
            }
        }
    }

    // line 3: the separator may repeat the header
    let separator = buf[1..].to_vec();

    // line 4: quality scores
    let mut qual = Vec::with_capacity(seq.len());
    for taken in 0..seq_lines.max(1) {
        if !lines.read_line(buf)? {
            return Err(ParseError::Truncated { id, line }.into());
        }
        if taken > 0 && buf.first() == Some(&b'@') && qual.len() + buf.len() != seq.len() {
            lines.unread_line(std::mem::take(buf));
            break;
        }
        qual.extend_from_slice(buf);
        if qual.len() >= seq.len() {
            break;
        }
    }

    if qual.len() != seq.len() {
        return Err(ParseError::QualityLength {
            id,
            line,
            seq: seq.len(),
            qual: qual.len(),
        }
        .into());
    }

    if !separator_matches(&separator, &id, &description) {
        return Err(ParseError::SeparatorMismatch {
            id,
            line,
            found: String::from_utf8_lossy(&separator).into_owned(),
        }
        .into());
    }

    Ok(Some(Record {
        id,
        description,
        seq: utf8(seq, line)?,
        qual: Some(utf8(qual, line)?),
    }))
}

fn separator_matches(separator: &[u8], id: &str, description: &str) -> bool {
    if separator.is_empty() || separator == id.as_bytes() {
        return true;
    }

    // `+id description`, split by a space or tab as in the header
    separator.len() == id.len() + 1 + description.len()
        && separator.starts_with(id.as_bytes())
        && matches!(separator[id.len()], b' ' | b'\t')
        && separator.ends_with(description.as_bytes())
}
