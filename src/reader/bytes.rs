use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

/// Line-oriented access to a seekable source, with a single line of pushback so that a parser
/// can look at the start of the next record without consuming it.
pub struct LineReader<R> {
    reader: BufReader<R>,
    pushback: Option<Vec<u8>>,
    line: u64,
}

impl<R: Read + Seek> LineReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
            pushback: None,
            line: 0,
        }
    }

    /// The 1-indexed number of the line most recently returned by `read_line`.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Reads the next line into `buf`, replacing its contents. The trailing `\n` (or `\r\n`) is
    /// removed. Returns `false` once the end of the source has been reached.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> std::io::Result<bool> {
        buf.clear();

        if let Some(pushed) = self.pushback.take() {
            buf.extend_from_slice(&pushed);
            self.line += 1;
            return Ok(true);
        }

        if self.reader.read_until(b'\n', buf)? == 0 {
            return Ok(false);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        self.line += 1;
        Ok(true)
    }

    /// Returns a line so that the next call to `read_line` yields it again.
    pub fn unread_line(&mut self, line: Vec<u8>) {
        debug_assert!(self.pushback.is_none(), "only one line of pushback");
        self.pushback = Some(line);
        self.line -= 1;
    }

    /// Skips leading ASCII whitespace and returns the first byte after it, without consuming
    /// that byte. Returns `None` for a source with no content.
    pub fn peek_content_byte(&mut self) -> std::io::Result<Option<u8>> {
        loop {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                return Ok(None);
            }

            let found = available.iter().position(|b| !b.is_ascii_whitespace());
            let skipped = found.unwrap_or(available.len());
            let first = found.map(|i| available[i]);

            // count the skipped newlines so line numbers stay correct
            self.line += available[..skipped].iter().filter(|b| **b == b'\n').count() as u64;
            self.reader.consume(skipped);

            if first.is_some() {
                return Ok(first);
            }
        }
    }

    /// Seeks the source back to its first byte and forgets any pushback.
    pub fn rewind(&mut self) -> std::io::Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.pushback = None;
        self.line = 0;
        Ok(())
    }
}
