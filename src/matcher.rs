use crate::error::PairingError;
use crate::io::PairSink;
use crate::reader::SeqReader;
use crate::record::Record;
use anyhow::{Context, Result};
use indexmap::IndexSet;
use itertools::Itertools;
use serde::Serialize;
use std::io::{Read, Seek};

/// How often, in remaining pairs, to report progress.
pub const PROGRESS_INTERVAL: usize = 10_000;

/// How many unresolved identifiers to list when some shared reads could not be paired.
const RESIDUAL_PREVIEW: usize = 5;

/// Statistics from the second pass.
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchReport {
    pub pairs_written: usize,
    pub groups_visited: usize,
    pub forward_malformed: usize,
    pub reverse_malformed: usize,
    /// shared identifiers which were never paired
    pub unresolved: usize,
}

/// Pairs up forward and reverse reads by streaming both files of each file group side by side.
///
/// The matcher holds the set of identifiers still waiting for a pair. Each cursor skips ahead
/// to the next record whose identifier is in that set; when both cursors land on a record the
/// identifiers must agree, and the identifier is removed from the set before the pair is
/// written. A second occurrence of an identifier is therefore never written, and once the set
/// is empty every remaining file is skipped.
pub struct PairMatcher<'a> {
    target: &'a mut IndexSet<String>,
    normalize: bool,
    progress_interval: usize,
    starting: usize,
}

impl<'a> PairMatcher<'a> {
    /// `target` must hold every identifier present in both roles before matching starts.
    pub fn new(target: &'a mut IndexSet<String>, normalize: bool) -> Self {
        let starting = target.len();
        Self {
            target,
            normalize,
            progress_interval: PROGRESS_INTERVAL,
            starting,
        }
    }

    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Matches every file group in order, writing each pair into `sink` as soon as it is found.
    ///
    /// # Errors
    ///
    /// * `PairingError::FileCountMismatch` if the two roles have a different number of files.
    ///   This is checked before anything is read.
    /// * `PairingError::OrderViolation` if the two files of a group do not list their shared
    ///   reads in the same order. The mismatched pair is not written.
    /// * Any I/O error from the readers or the sink.
    pub fn run<R: Read + Seek>(
        &mut self,
        forward: &mut [SeqReader<R>],
        reverse: &mut [SeqReader<R>],
        sink: &mut impl PairSink,
    ) -> Result<MatchReport> {
        if forward.len() != reverse.len() {
            return Err(PairingError::FileCountMismatch {
                forward: forward.len(),
                reverse: reverse.len(),
            }
            .into());
        }

        let mut report = MatchReport::default();

        for (group, (fwd, rev)) in forward.iter_mut().zip_eq(reverse.iter_mut()).enumerate() {
            if self.target.is_empty() {
                debug!("All shared reads are paired, skipping the remaining file groups");
                break;
            }

            info!("Pairing {} with {}", fwd.name(), rev.name());
            report.groups_visited += 1;
            report.pairs_written += self.match_group(group + 1, fwd, rev, sink)?;
            report.forward_malformed += fwd.malformed();
            report.reverse_malformed += rev.malformed();
        }

        report.unresolved = self.target.len();
        if report.unresolved > 0 {
            warn!(
                "{} of {} shared read IDs could not be paired, e.g. {}",
                report.unresolved,
                self.starting,
                self.target.iter().take(RESIDUAL_PREVIEW).join(", ")
            );
        }

        Ok(report)
    }

    /// Matches a single file group. Returns the number of pairs written.
    fn match_group<R: Read + Seek>(
        &mut self,
        group: usize,
        fwd: &mut SeqReader<R>,
        rev: &mut SeqReader<R>,
        sink: &mut impl PairSink,
    ) -> Result<usize> {
        let mut written = 0;
        let mut fwd_rec = advance(fwd)?;
        let mut rev_rec = advance(rev)?;

        while !self.target.is_empty() {
            let remaining = self.target.len();
            if remaining % self.progress_interval == 0 {
                info!("{} of {} pairs remaining", remaining, self.starting);
            }

            fwd_rec = self.next_member(fwd, fwd_rec)?;
            rev_rec = self.next_member(rev, rev_rec)?;

            // one side is exhausted, so this group has nothing more to pair
            let (Some(f), Some(r)) = (&fwd_rec, &rev_rec) else {
                break;
            };

            let id = f.pair_id(self.normalize);
            if id != r.pair_id(self.normalize) {
                return Err(PairingError::OrderViolation {
                    group,
                    forward_file: fwd.name().to_string(),
                    reverse_file: rev.name().to_string(),
                    forward_id: f.id.clone(),
                    reverse_id: r.id.clone(),
                }
                .into());
            }

            self.target.swap_remove(id);
            sink.write_pair(f, r)?;
            written += 1;

            fwd_rec = advance(fwd)?;
            rev_rec = advance(rev)?;
        }

        debug!("File group {group}: {written} pairs written");
        Ok(written)
    }

    /// Skips forward from `current` until a record whose identifier is still waiting for a
    /// pair is found. Returns `None` if the stream runs out first.
    fn next_member<R: Read + Seek>(
        &self,
        reader: &mut SeqReader<R>,
        mut current: Option<Record>,
    ) -> Result<Option<Record>> {
        while let Some(rec) = current {
            if self.target.contains(rec.pair_id(self.normalize)) {
                return Ok(Some(rec));
            }
            current = advance(reader)?;
        }
        Ok(None)
    }
}

fn advance<R: Read + Seek>(reader: &mut SeqReader<R>) -> Result<Option<Record>> {
    reader
        .next_valid()
        .with_context(|| format!("Unable to read from {}", reader.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Format;
    use crate::scan::IdUniverse;
    use std::io::Cursor;

    type Reader = SeqReader<Cursor<Vec<u8>>>;

    #[derive(Default)]
    struct CollectSink {
        pairs: Vec<(String, String)>,
    }

    impl PairSink for CollectSink {
        fn write_pair(&mut self, forward: &Record, reverse: &Record) -> Result<()> {
            self.pairs.push((forward.id.clone(), reverse.id.clone()));
            Ok(())
        }
    }

    fn fastq(name: &str, ids: &[&str]) -> Reader {
        let data: String = ids
            .iter()
            .map(|id| format!("@{id} desc\nACGT\n+\nIIII\n"))
            .collect();
        SeqReader::new(Cursor::new(data.into_bytes()), name, Format::Fastq)
    }

    fn raw(name: &str, data: &str) -> Reader {
        SeqReader::new(Cursor::new(data.as_bytes().to_vec()), name, Format::Fastq)
    }

    /// Runs both passes, returning the written pairs and what was left in the target set.
    fn run_both_passes(
        forward: &mut [Reader],
        reverse: &mut [Reader],
        normalize: bool,
    ) -> Result<(Vec<(String, String)>, MatchReport, IndexSet<String>)> {
        let mut target = IdUniverse::scan(forward, reverse, normalize)?.target;
        let mut sink = CollectSink::default();
        let report = PairMatcher::new(&mut target, normalize).run(forward, reverse, &mut sink)?;
        Ok((sink.pairs, report, target))
    }

    fn pair(f: &str, r: &str) -> (String, String) {
        (f.to_string(), r.to_string())
    }

    #[test]
    fn duplicate_forward_read_is_paired_once() {
        let mut forward = vec![fastq("r1", &["A/1", "B/1", "A/1"])];
        let mut reverse = vec![fastq("r2", &["A/2", "B/2"])];

        let (pairs, report, target) = run_both_passes(&mut forward, &mut reverse, true).unwrap();

        assert_eq!(pairs, vec![pair("A/1", "A/2"), pair("B/1", "B/2")]);
        assert_eq!(report.pairs_written, 2);
        assert!(target.is_empty());
    }

    #[test]
    fn no_shared_reads_writes_nothing() {
        let mut forward = vec![fastq("r1", &["X"])];
        let mut reverse = vec![fastq("r2", &["Y"])];

        let (pairs, report, _) = run_both_passes(&mut forward, &mut reverse, false).unwrap();

        assert!(pairs.is_empty());
        assert_eq!(report.groups_visited, 0);
        assert_eq!(report.unresolved, 0);
    }

    #[test]
    fn malformed_record_is_skipped() {
        let mut forward = vec![raw(
            "r1",
            "@A/1\nACGT\n+\nIIII\n@B/1\nACGT\n+\nIIII\n@C/1\nACGT\nIIII\n@D/1\nACGT\n+\nIIII\n",
        )];
        let mut reverse = vec![fastq("r2", &["A/2", "B/2", "C/2", "D/2"])];

        let (pairs, report, target) = run_both_passes(&mut forward, &mut reverse, true).unwrap();

        assert_eq!(
            pairs,
            vec![pair("A/1", "A/2"), pair("B/1", "B/2"), pair("D/1", "D/2")]
        );
        assert_eq!(report.forward_malformed, 1);
        assert_eq!(report.unresolved, 0);
        assert!(target.is_empty());
    }

    #[test]
    fn short_quality_does_not_hide_the_next_read() {
        let mut forward = vec![raw(
            "r1",
            "@A/1\nACGTACGT\n+\nIIII\n@B/1 1:N:0\nACGTACGT\n+\nIIIIIIII\n@C/1\nACGT\n+\nIIII\n",
        )];
        let mut reverse = vec![fastq("r2", &["A/2", "B/2", "C/2"])];

        let (pairs, report, target) = run_both_passes(&mut forward, &mut reverse, true).unwrap();

        assert_eq!(pairs, vec![pair("B/1", "B/2"), pair("C/1", "C/2")]);
        assert_eq!(report.forward_malformed, 1);
        assert_eq!(report.unresolved, 0);
        assert!(target.is_empty());
    }

    #[test]
    fn cursors_advance_independently() {
        let mut forward = vec![fastq("r1", &["only_fwd", "A/1", "B/1"])];
        let mut reverse = vec![fastq("r2", &["only_rev_1", "only_rev_2", "A/2", "B/2"])];

        let (pairs, _, _) = run_both_passes(&mut forward, &mut reverse, true).unwrap();

        assert_eq!(pairs, vec![pair("A/1", "A/2"), pair("B/1", "B/2")]);
    }

    #[test]
    fn out_of_order_files_fail_without_writing_the_mismatch() {
        let mut forward = vec![fastq("r1", &["A/1", "B/1", "C/1"])];
        let mut reverse = vec![fastq("r2", &["A/2", "C/2", "B/2"])];

        let mut target = IdUniverse::scan(&mut forward, &mut reverse, true)
            .unwrap()
            .target;
        let mut sink = CollectSink::default();
        let err = PairMatcher::new(&mut target, true)
            .run(&mut forward, &mut reverse, &mut sink)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PairingError>(),
            Some(PairingError::OrderViolation { group: 1, .. })
        ));
        assert_eq!(sink.pairs, vec![pair("A/1", "A/2")]);
    }

    #[test]
    fn mismatched_file_counts_are_rejected() {
        let mut forward = vec![fastq("a", &["A"]), fastq("b", &["B"])];
        let mut reverse = vec![fastq("c", &["A"])];
        let mut target: IndexSet<String> = ["A".to_string()].into_iter().collect();
        let mut sink = CollectSink::default();

        let err = PairMatcher::new(&mut target, false)
            .run(&mut forward, &mut reverse, &mut sink)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PairingError>(),
            Some(PairingError::FileCountMismatch {
                forward: 2,
                reverse: 1
            })
        ));
        assert!(sink.pairs.is_empty());
    }

    #[test]
    fn pairs_follow_group_order() {
        let mut forward = vec![fastq("f1", &["C/1", "A/1"]), fastq("f2", &["B/1"])];
        let mut reverse = vec![fastq("r1", &["C/2", "A/2"]), fastq("r2", &["B/2"])];

        let (pairs, report, _) = run_both_passes(&mut forward, &mut reverse, true).unwrap();

        assert_eq!(
            pairs,
            vec![pair("C/1", "C/2"), pair("A/1", "A/2"), pair("B/1", "B/2")]
        );
        assert_eq!(report.groups_visited, 2);
    }

    #[test]
    fn reads_split_across_groups_stay_unresolved() {
        // A only exists in the forward file of group 1 and the reverse file of group 2
        let mut forward = vec![fastq("f1", &["B/1", "A/1"]), fastq("f2", &["C/1"])];
        let mut reverse = vec![fastq("r1", &["B/2"]), fastq("r2", &["C/2", "A/2"])];

        let (pairs, report, target) = run_both_passes(&mut forward, &mut reverse, true).unwrap();

        assert_eq!(pairs, vec![pair("B/1", "B/2"), pair("C/1", "C/2")]);
        assert_eq!(report.unresolved, 1);
        assert!(target.contains("A"));
    }

    #[test]
    fn exhausted_target_skips_remaining_groups() {
        let mut forward = vec![fastq("f1", &["A/1"]), fastq("f2", &["Z/1"])];
        let mut reverse = vec![fastq("r1", &["A/2"]), fastq("r2", &["Y/2"])];

        let (pairs, report, _) = run_both_passes(&mut forward, &mut reverse, true).unwrap();

        assert_eq!(pairs, vec![pair("A/1", "A/2")]);
        assert_eq!(report.groups_visited, 1);
    }

    #[test]
    fn rerun_after_rewind_is_identical() {
        let mut forward = vec![fastq("r1", &["A/1", "X/1", "B/1", "A/1"])];
        let mut reverse = vec![fastq("r2", &["Y/2", "A/2", "B/2"])];

        let (first, _, _) = run_both_passes(&mut forward, &mut reverse, true).unwrap();
        forward[0].rewind().unwrap();
        reverse[0].rewind().unwrap();
        let (second, _, _) = run_both_passes(&mut forward, &mut reverse, true).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
