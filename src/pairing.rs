use crate::error::PairingError;
use crate::io::{get_writer, PairedWriter};
use crate::matcher::PairMatcher;
use crate::reader::SeqReader;
use crate::record::Format;
use crate::scan::IdUniverse;
use crate::summary::RunSummary;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Options shared by every command that reads a set of paired files.
pub struct PairingOptions {
    /// The forward (R1) files, in file group order
    pub forward: Vec<PathBuf>,
    /// The reverse (R2) files. The n-th file pairs with the n-th forward file
    pub reverse: Vec<PathBuf>,
    /// Whether to strip a trailing `/<token>` from identifiers before comparing them
    pub normalize_ids: bool,
    /// The input format, or `None` to detect it from the first file with content
    pub format: Option<Format>,
    pub progress_interval: usize,
}

type Readers = Vec<SeqReader<File>>;

/// Checks that the file lists line up, then opens every input and settles on one format.
fn open_inputs(opts: &PairingOptions) -> Result<(Readers, Readers, Format)> {
    if opts.forward.len() != opts.reverse.len() {
        return Err(PairingError::FileCountMismatch {
            forward: opts.forward.len(),
            reverse: opts.reverse.len(),
        }
        .into());
    }

    let open_all = |paths: &[PathBuf]| -> Result<Readers> {
        paths
            .iter()
            .map(|p| SeqReader::open(p, Format::Fastq))
            .collect()
    };
    let mut forward = open_all(&opts.forward)?;
    let mut reverse = open_all(&opts.reverse)?;

    let format = match opts.format {
        Some(format) => format,
        None => detect_format(forward.iter_mut().chain(reverse.iter_mut()))?,
    };
    info!("Reading input files as {format}");

    for reader in forward.iter_mut().chain(reverse.iter_mut()) {
        reader.set_format(format);
    }

    Ok((forward, reverse, format))
}

/// Uses the first file with any content to decide the format. If every file is empty, the
/// format does not matter, so FASTQ is assumed.
fn detect_format<'a>(readers: impl Iterator<Item = &'a mut SeqReader<File>>) -> Result<Format> {
    for reader in readers {
        let first = reader
            .first_byte()
            .with_context(|| format!("Unable to read from {}", reader.name()))?;

        if let Some(byte) = first {
            return Format::sniff(byte).ok_or_else(|| {
                PairingError::UnknownFormat {
                    file: reader.name().to_string(),
                }
                .into()
            });
        }
    }

    Ok(Format::Fastq)
}

/// Runs the first pass only, reporting the identifiers in each role and how many are shared.
pub fn scan(opts: &PairingOptions) -> Result<RunSummary> {
    let now = std::time::Instant::now();

    let (mut forward, mut reverse, format) = open_inputs(opts)?;
    let universe = IdUniverse::scan(&mut forward, &mut reverse, opts.normalize_ids)?;

    let mut summary = RunSummary::from_universe(&universe, format, opts.normalize_ids);
    summary.elapsed = now.elapsed().as_secs_f64();
    Ok(summary)
}

/// Combines every file group into a single pair of outputs, containing only the reads whose
/// identifiers occur in both roles. Each identifier is written at most once.
///
/// # Arguments
///
/// * `opts` - The inputs and how to read them.
/// * `out_forward` - Where to write the combined forward reads.
/// * `out_reverse` - Where to write the combined reverse reads.
///
/// # Errors
///
/// Fails if the file lists differ in length, if any file cannot be opened, read or written,
/// or if a file group lists its shared reads in a different order on each side. In the last
/// case the pairs written so far are kept, but nothing further is written.
pub fn pair(opts: &PairingOptions, out_forward: &Path, out_reverse: &Path) -> Result<RunSummary> {
    let now = std::time::Instant::now();

    let (mut forward, mut reverse, format) = open_inputs(opts)?;
    let mut universe = IdUniverse::scan(&mut forward, &mut reverse, opts.normalize_ids)?;
    let mut summary = RunSummary::from_universe(&universe, format, opts.normalize_ids);

    let mut writer = PairedWriter::new(get_writer(out_forward)?, get_writer(out_reverse)?, format);

    info!("Writing R1 and R2 to {} and {}", out_forward.display(), out_reverse.display());
    let report = PairMatcher::new(&mut universe.target, opts.normalize_ids)
        .progress_interval(opts.progress_interval)
        .run(&mut forward, &mut reverse, &mut writer)?;
    writer.flush()?;

    summary.elapsed = now.elapsed().as_secs_f64();
    info!(
        "Stats: {} pairs written, {} unresolved IDs, {:.1}s runtime",
        report.pairs_written, report.unresolved, summary.elapsed
    );
    summary.pairing = Some(report);

    Ok(summary)
}
