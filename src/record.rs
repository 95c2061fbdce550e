/// The on-disk record layout of a sequence file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// four-line records: `@id desc`, sequence, `+`, quality
    Fastq,
    /// two-part records: `>id desc`, then sequence lines
    Fasta,
}

impl Format {
    /// The first character of every header line in this format.
    pub fn header_marker(&self) -> u8 {
        match self {
            Format::Fastq => b'@',
            Format::Fasta => b'>',
        }
    }

    /// Guesses the format from the first non-whitespace byte of a file.
    pub fn sniff(first_byte: u8) -> Option<Self> {
        match first_byte {
            b'@' => Some(Format::Fastq),
            b'>' => Some(Format::Fasta),
            _ => None,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Fastq => f.write_str("FASTQ"),
            Format::Fasta => f.write_str("FASTA"),
        }
    }
}

/// A single sequencing read.
///
/// # Fields
///
/// * `id` - The raw identifier, i.e. the header up to the first whitespace
/// * `description` - Everything after the first space of the header, kept verbatim
/// * `seq` - The sequence, with multi-line sequences joined
/// * `qual` - The quality string. This is `None` for FASTA records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub description: String,
    pub seq: String,
    pub qual: Option<String>,
}

impl Record {
    /// The identifier used to pair this read with its mate.
    pub fn pair_id(&self, normalize: bool) -> &str {
        normalize_id(&self.id, normalize)
    }
}

/// Strips a trailing `/<token>` role suffix (such as `/1` or `/2`) from a read identifier.
/// When `normalize` is false, or there is no `/`, the identifier is returned as is.
///
/// # Example
///
/// ```
/// assert_eq!(normalize_id("read7/1", true), "read7");
/// assert_eq!(normalize_id("read7/1", false), "read7/1");
/// ```
pub fn normalize_id(raw: &str, normalize: bool) -> &str {
    if !normalize {
        return raw;
    }

    match raw.rsplit_once('/') {
        Some((prefix, _)) => prefix,
        None => raw,
    }
}
