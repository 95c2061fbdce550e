use crate::matcher::MatchReport;
use crate::record::Format;
use crate::scan::{FileScan, IdUniverse};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// A machine-readable report of a run, written as JSON.
#[derive(Serialize, Debug)]
pub struct RunSummary {
    pub matepair_version: String,
    pub run_date: String,
    pub elapsed: f64,
    pub format: Format,
    pub normalize_ids: bool,
    pub forward_read_ids: usize,
    pub reverse_read_ids: usize,
    pub shared_read_ids: usize,
    /// only present when the reads were paired, not for a scan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairing: Option<MatchReport>,
    pub forward_files: Vec<FileScan>,
    pub reverse_files: Vec<FileScan>,
}

impl RunSummary {
    /// Builds a summary from the first pass. This must be called before the target set is handed
    /// to the matcher, as `shared_read_ids` is its starting size.
    pub fn from_universe(universe: &IdUniverse, format: Format, normalize_ids: bool) -> Self {
        RunSummary {
            matepair_version: crate::cli::VERSION.to_string(),
            run_date: format!("{:?}", chrono::offset::Local::now()),
            elapsed: 0.0,
            format,
            normalize_ids,
            forward_read_ids: universe.forward.ids.len(),
            reverse_read_ids: universe.reverse.ids.len(),
            shared_read_ids: universe.target.len(),
            pairing: None,
            forward_files: universe.forward.files.clone(),
            reverse_files: universe.reverse.files.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Could not serialize run summary")
    }

    /// Writes the summary as pretty-printed JSON to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        info!("Writing summary to {}", path.display());
        let mut out = self.to_json_pretty()?;
        out.push('\n');
        std::fs::write(path, out)
            .with_context(|| format!("Unable to write summary to {}", path.display()))
    }
}
