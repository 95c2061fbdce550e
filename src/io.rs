use crate::record::{Format, Record};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Formats a record as a valid FASTQ or FASTA entry and writes it to the provided writer.
/// The identifier, description, sequence and quality are written verbatim; the sequence is
/// never wrapped.
///
/// # Arguments
///
/// * `writer` - A mutable reference to an object that implements `std::io::Write`. It is
///   acceptable to use a `std::io::Cursor` or a `Vec<u8>`.
/// * `record` - The record to write.
/// * `format` - The output format. A FASTA record written as FASTQ gets an empty quality line.
pub fn write_record(writer: &mut impl Write, record: &Record, format: Format) -> std::io::Result<()> {
    writer.write_all(&[format.header_marker()])?;
    writer.write_all(record.id.as_bytes())?;
    if !record.description.is_empty() {
        write!(writer, " {}", record.description)?;
    }

    match format {
        Format::Fastq => writeln!(
            writer,
            "\n{}\n+\n{}",
            record.seq,
            record.qual.as_deref().unwrap_or("")
        ),
        Format::Fasta => writeln!(writer, "\n{}", record.seq),
    }
}

/// Receives matched read pairs, in the order they are found.
pub trait PairSink {
    fn write_pair(&mut self, forward: &Record, reverse: &Record) -> Result<()>;
}

/// Writes each half of a pair into its own output, keeping the two outputs in step.
pub struct PairedWriter<W: Write> {
    forward: W,
    reverse: W,
    format: Format,
}

impl<W: Write> PairedWriter<W> {
    pub fn new(forward: W, reverse: W, format: Format) -> Self {
        Self {
            forward,
            reverse,
            format,
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.forward.flush().context("Could not flush forward output")?;
        self.reverse.flush().context("Could not flush reverse output")?;
        Ok(())
    }
}

impl<W: Write> PairSink for PairedWriter<W> {
    fn write_pair(&mut self, forward: &Record, reverse: &Record) -> Result<()> {
        write_record(&mut self.forward, forward, self.format)
            .context("Could not write forward read")?;
        write_record(&mut self.reverse, reverse, self.format)
            .context("Could not write reverse read")?;
        Ok(())
    }
}

/// Creates a `BufWriter` for a new file at `path`, truncating any existing file.
pub fn get_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Unable to create output file {}", path.display()))?;
    Ok(BufWriter::new(file))
}
