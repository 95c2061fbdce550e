use super::bytes::LineReader;
use super::{read_header, utf8};
use crate::error::ReadError;
use crate::record::Record;
use std::io::{Read, Seek};

/// Parses the next FASTA record: a `>` header and every line up to the next header.
pub fn next_record<R: Read + Seek>(
    lines: &mut LineReader<R>,
    buf: &mut Vec<u8>,
) -> Result<Option<Record>, ReadError> {
    let Some((id, description)) = read_header(lines, buf, b'>')? else {
        return Ok(None);
    };
    let line = lines.line();

    let mut seq = Vec::new();
    while lines.read_line(buf)? {
        if buf.first() == Some(&b'>') {
            lines.unread_line(std::mem::take(buf));
            break;
        }
        seq.extend_from_slice(buf);
    }

    Ok(Some(Record {
        id,
        description,
        seq: utf8(seq, line)?,
        qual: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use std::io::Cursor;

    #[test]
    fn wrapped_sequences_are_joined() {
        let data = ">chr1 first contig\nACGT\nAC\n\n>chr2\nGG\n";
        let mut lines = LineReader::new(Cursor::new(data.as_bytes().to_vec()));
        let mut buf = Vec::new();

        let first = next_record(&mut lines, &mut buf).unwrap().unwrap();
        assert_eq!(first.id, "chr1");
        assert_eq!(first.description, "first contig");
        assert_eq!(first.seq, "ACGTAC");
        assert_eq!(first.qual, None);

        let second = next_record(&mut lines, &mut buf).unwrap().unwrap();
        assert_eq!(second.id, "chr2");
        assert_eq!(second.seq, "GG");

        assert!(next_record(&mut lines, &mut buf).unwrap().is_none());
    }

    #[test]
    fn text_before_first_header_is_malformed() {
        let data = "ACGT\n>a\nA\n";
        let mut lines = LineReader::new(Cursor::new(data.as_bytes().to_vec()));
        let mut buf = Vec::new();

        let err = next_record(&mut lines, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Malformed(ParseError::MissingHeader { marker: '>', .. })
        ));
        assert_eq!(next_record(&mut lines, &mut buf).unwrap().unwrap().id, "a");
    }
}
