use thiserror::Error;

/// A record which does not conform to its format. These are recoverable: the reader has already
/// consumed the offending lines, so the caller may keep reading from the same stream.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected a header starting with '{marker}', got `{found}`")]
    MissingHeader { line: u64, marker: char, found: String },

    #[error("line {line}: header has an empty read identifier")]
    EmptyIdentifier { line: u64 },

    #[error("record `{id}` (line {line}) has no '+' separator line before the next record")]
    MissingSeparator { id: String, line: u64 },

    #[error(
        "record `{id}` (line {line}) has a separator line which does not match its header:
    `{found}`"
    )]
    SeparatorMismatch { id: String, line: u64, found: String },

    #[error("record `{id}` (line {line}) has {qual} quality scores for {seq} bases")]
    QualityLength {
        id: String,
        line: u64,
        seq: usize,
        qual: usize,
    },

    #[error("record `{id}` (line {line}) is truncated by the end of the file")]
    Truncated { id: String, line: u64 },

    #[error("line {line}: record is not valid UTF-8")]
    InvalidUtf8 { line: u64 },
}

/// Everything that can go wrong when pulling the next record out of a stream.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Malformed(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures which abort a pairing run.
#[derive(Error, Debug)]
pub enum PairingError {
    #[error(
        "mismatched number of forward and reverse read files: \
{forward} given with --in-1, {reverse} given with --in-2"
    )]
    FileCountMismatch { forward: usize, reverse: usize },

    #[error(
        "reads are out of order in file group {group}:
    {forward_file}: next shared read is `{forward_id}`
    {reverse_file}: next shared read is `{reverse_id}`
suggestion: forward and reverse files must list their shared reads in the same order"
    )]
    OrderViolation {
        group: usize,
        forward_file: String,
        reverse_file: String,
        forward_id: String,
        reverse_id: String,
    },

    #[error("could not detect the format of {file}: it does not start with '@' or '>'")]
    UnknownFormat { file: String },
}
