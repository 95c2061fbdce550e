use crate::reader::SeqReader;
use anyhow::{Context, Result};
use indexmap::IndexSet;
use serde::Serialize;
use std::io::{Read, Seek};

/// Which mate of a paired-end read a file holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Forward,
    Reverse,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Forward => f.write_str("R1"),
            Role::Reverse => f.write_str("R2"),
        }
    }
}

/// Identifier statistics for a single input file.
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct FileScan {
    pub file: String,
    /// well-formed records in the file
    pub records: usize,
    /// records skipped because they could not be parsed
    pub malformed: usize,
    /// distinct normalized identifiers in the file
    pub unique_ids: usize,
    /// records whose identifier was already seen earlier in the same file
    pub repeated_ids: usize,
    /// distinct identifiers which also appear in an earlier file of the same role
    pub overlapping_ids: usize,
}

/// The identifiers of every file in one role.
pub struct RoleScan {
    /// Every normalized identifier in the role, in first-seen order
    pub ids: IndexSet<String>,
    pub files: Vec<FileScan>,
}

/// Streams every record of every file in a role, collecting the normalized identifiers.
/// Each reader is rewound afterwards, so that the same handles can be replayed by the matcher.
///
/// Identifiers that repeat within a file, or across files of the role, are reported as
/// warnings. They do not affect the result: the matcher only ever pairs an identifier once.
pub fn scan_role<R: Read + Seek>(
    readers: &mut [SeqReader<R>],
    role: Role,
    normalize: bool,
) -> Result<RoleScan> {
    let mut ids = IndexSet::new();
    let mut files = Vec::with_capacity(readers.len());

    for reader in readers.iter_mut() {
        let mut file_ids: IndexSet<String> = IndexSet::new();
        let mut records = 0;

        while let Some(rec) = reader
            .next_valid()
            .with_context(|| format!("Unable to read from {}", reader.name()))?
        {
            records += 1;
            let id = rec.pair_id(normalize);
            if !file_ids.contains(id) {
                file_ids.insert(id.to_string());
            }
        }

        let stats = FileScan {
            file: reader.name().to_string(),
            records,
            malformed: reader.malformed(),
            unique_ids: file_ids.len(),
            repeated_ids: records - file_ids.len(),
            overlapping_ids: file_ids.iter().filter(|id| ids.contains(*id)).count(),
        };

        if stats.malformed > 0 {
            warn!("{}: skipped {} malformed records", stats.file, stats.malformed);
        }
        if stats.repeated_ids > 0 {
            warn!(
                "{}: {} {role} records repeat a read ID seen earlier in this file",
                stats.file, stats.repeated_ids
            );
        }
        if stats.overlapping_ids > 0 {
            warn!(
                "{} of {} {role} read IDs from {} overlap with others",
                stats.overlapping_ids, stats.unique_ids, stats.file
            );
        }
        debug!("{}: {} records, {} unique IDs", stats.file, records, stats.unique_ids);

        ids.extend(file_ids);
        files.push(stats);

        reader
            .rewind()
            .with_context(|| format!("Unable to rewind {}", reader.name()))?;
    }

    Ok(RoleScan { ids, files })
}

/// The result of the first pass: every identifier in each role, and the identifiers that are
/// present in both, which are the ones that will be paired.
pub struct IdUniverse {
    pub forward: RoleScan,
    pub reverse: RoleScan,
    /// `forward ∩ reverse`, in forward first-seen order
    pub target: IndexSet<String>,
}

impl IdUniverse {
    pub fn scan<R: Read + Seek>(
        forward: &mut [SeqReader<R>],
        reverse: &mut [SeqReader<R>],
        normalize: bool,
    ) -> Result<Self> {
        info!("Looping through files to identify all sequence IDs");

        let forward = scan_role(forward, Role::Forward, normalize)?;
        let reverse = scan_role(reverse, Role::Reverse, normalize)?;

        let target: IndexSet<String> = forward.ids.intersection(&reverse.ids).cloned().collect();

        info!(
            "There are {} overlapping IDs from {} forward read IDs and {} reverse read IDs",
            target.len(),
            forward.ids.len(),
            reverse.ids.len()
        );

        Ok(IdUniverse {
            forward,
            reverse,
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Format;
    use std::io::Cursor;

    fn fastq(ids: &[&str]) -> SeqReader<Cursor<Vec<u8>>> {
        let data: String = ids
            .iter()
            .map(|id| format!("@{id}\nACGT\n+\nIIII\n"))
            .collect();
        SeqReader::new(Cursor::new(data.into_bytes()), ids.join(","), Format::Fastq)
    }

    #[test]
    fn counts_repeats_and_overlaps() {
        let mut readers = vec![fastq(&["A/1", "B/1", "A/1"]), fastq(&["B/1", "C/1"])];

        let scan = scan_role(&mut readers, Role::Forward, true).unwrap();

        assert_eq!(scan.ids.iter().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(scan.files[0].records, 3);
        assert_eq!(scan.files[0].repeated_ids, 1);
        assert_eq!(scan.files[0].overlapping_ids, 0);
        assert_eq!(scan.files[1].overlapping_ids, 1);
        assert_eq!(scan.files[1].unique_ids, 2);
    }

    #[test]
    fn readers_are_rewound_after_scanning() {
        let mut readers = vec![fastq(&["A", "B"])];

        scan_role(&mut readers, Role::Reverse, false).unwrap();

        assert_eq!(readers[0].next_valid().unwrap().unwrap().id, "A");
    }

    #[test]
    fn target_is_the_intersection() {
        let mut forward = vec![fastq(&["A/1", "B/1"]), fastq(&["D/1"])];
        let mut reverse = vec![fastq(&["B/2", "C/2"]), fastq(&["D/2", "A/2"])];

        let universe = IdUniverse::scan(&mut forward, &mut reverse, true).unwrap();

        assert_eq!(universe.forward.ids.len(), 3);
        assert_eq!(universe.reverse.ids.len(), 4);
        assert_eq!(
            universe.target.iter().collect::<Vec<_>>(),
            vec!["A", "B", "D"]
        );
    }

    #[test]
    fn without_normalization_suffixes_differ() {
        let mut forward = vec![fastq(&["A/1"])];
        let mut reverse = vec![fastq(&["A/2"])];

        let universe = IdUniverse::scan(&mut forward, &mut reverse, false).unwrap();

        assert!(universe.target.is_empty());
    }
}
