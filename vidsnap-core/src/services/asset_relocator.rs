//! Moves id-keyed asset files from old-id paths to new-id paths.
//!
//! Old and new id spaces overlap, so a direct rename could clobber a file
//! that has not been moved yet. Every move goes through a temporary name
//! first (`d_{new_id}.{ext}`), and only once all sources are staged are the
//! temporaries renamed to their final paths.
//!
//! Each run is journaled in `{subdir}/.relocation.json`. A run interrupted
//! at any point converges when relocation is invoked again for that kind or
//! when [`AssetRelocator::resume_pending`] is called.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::errors::{ImportExportError, ImportExportResult};
use crate::snapshot::EntityKind;

pub const JOURNAL_FILE_NAME: &str = ".relocation.json";
pub const VIDEO_DIR: &str = "video";

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Region,
    Frame,
    Segment,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [AssetKind::Region, AssetKind::Frame, AssetKind::Segment];

    pub fn subdir(self) -> &'static str {
        match self {
            AssetKind::Region => "regions",
            AssetKind::Frame => "frames",
            AssetKind::Segment => "segments",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Region | AssetKind::Frame => "jpg",
            AssetKind::Segment => "mp4",
        }
    }

    /// Remap table the file names are keyed by.
    pub fn entity_kind(self) -> EntityKind {
        match self {
            AssetKind::Region => EntityKind::Region,
            AssetKind::Frame => EntityKind::Frame,
            AssetKind::Segment => EntityKind::Segment,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMove {
    pub old_id: i32,
    pub new_id: i32,
}

impl From<(i32, i32)> for AssetMove {
    fn from((old_id, new_id): (i32, i32)) -> Self {
        Self { old_id, new_id }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum JournalPhase {
    /// Sources are being renamed to temporaries.
    Staging,
    /// Every source is staged; temporaries are being finalized.
    Staged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RelocationJournal {
    kind: AssetKind,
    phase: JournalPhase,
    moves: Vec<AssetMove>,
}

/// Outcome of relocating one or more asset kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationReport {
    /// Files now at their final new-id path.
    pub moved: usize,
    /// Moves whose source file did not exist.
    pub missing: usize,
    /// Moves left in place because the final path was already taken.
    pub blocked: usize,
}

impl RelocationReport {
    fn absorb(&mut self, other: RelocationReport) {
        self.moved += other.moved;
        self.missing += other.missing;
        self.blocked += other.blocked;
    }
}

pub struct AssetRelocator {
    root: PathBuf,
}

impl AssetRelocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn asset_path(&self, kind: AssetKind, id: i32) -> PathBuf {
        self.root
            .join(kind.subdir())
            .join(format!("{}.{}", id, kind.extension()))
    }

    fn staging_path(&self, kind: AssetKind, new_id: i32) -> PathBuf {
        self.root
            .join(kind.subdir())
            .join(format!("d_{}.{}", new_id, kind.extension()))
    }

    fn journal_path(&self, kind: AssetKind) -> PathBuf {
        self.root.join(kind.subdir()).join(JOURNAL_FILE_NAME)
    }

    /// Relocate every file of `kind` named by an old id in `moves`.
    ///
    /// When a journal from an interrupted run exists it is finished instead
    /// and `moves` is ignored; the old run's sources may already have been
    /// overwritten by finalized files.
    pub fn relocate(&self, kind: AssetKind, moves: &[AssetMove]) -> ImportExportResult<RelocationReport> {
        if let Some(journal) = self.read_journal(kind)? {
            tracing::warn!(
                "Finishing interrupted {} relocation of {} files",
                kind,
                journal.moves.len()
            );
            return self.finish(journal);
        }

        let dir = self.root.join(kind.subdir());
        if moves.is_empty() || !dir.is_dir() {
            tracing::debug!("No {} assets to relocate under {}", kind, dir.display());
            return Ok(RelocationReport {
                missing: moves.len(),
                ..Default::default()
            });
        }

        let journal = RelocationJournal {
            kind,
            phase: JournalPhase::Staging,
            moves: moves.to_vec(),
        };
        self.write_journal(&journal)?;
        self.finish(journal)
    }

    /// Finish every interrupted relocation under the root.
    pub fn resume_pending(&self) -> ImportExportResult<RelocationReport> {
        let mut report = RelocationReport::default();
        for kind in AssetKind::ALL {
            if let Some(journal) = self.read_journal(kind)? {
                tracing::info!(
                    "Resuming {} relocation in phase {:?}",
                    kind,
                    journal.phase
                );
                report.absorb(self.finish(journal)?);
            }
        }
        Ok(report)
    }

    fn finish(&self, mut journal: RelocationJournal) -> ImportExportResult<RelocationReport> {
        let mut report = RelocationReport::default();

        if journal.phase == JournalPhase::Staging {
            report.missing = self.stage(&journal)?;
            journal.phase = JournalPhase::Staged;
            self.write_journal(&journal)?;
        }

        let (moved, blocked) = self.finalize(&journal)?;
        report.moved = moved;
        report.blocked = blocked;

        let journal_path = self.journal_path(journal.kind);
        fs::remove_file(&journal_path).map_err(|err| ImportExportError::io(&journal_path, err))?;

        tracing::info!(
            "Relocated {} {} files ({} missing, {} blocked)",
            report.moved,
            journal.kind,
            report.missing,
            report.blocked
        );
        Ok(report)
    }

    /// First pass: sources to temporaries. Returns the number of missing sources.
    fn stage(&self, journal: &RelocationJournal) -> ImportExportResult<usize> {
        let mut missing = 0;
        for step in &journal.moves {
            let staged = self.staging_path(journal.kind, step.new_id);
            if staged.exists() {
                continue;
            }
            let source = self.asset_path(journal.kind, step.old_id);
            if !source.exists() {
                missing += 1;
                continue;
            }
            rename(&source, &staged)?;
        }
        Ok(missing)
    }

    /// Second pass: temporaries to final paths. Returns `(moved, blocked)`.
    fn finalize(&self, journal: &RelocationJournal) -> ImportExportResult<(usize, usize)> {
        let mut moved = 0;
        let mut blocked = 0;
        for step in &journal.moves {
            let staged = self.staging_path(journal.kind, step.new_id);
            if !staged.exists() {
                continue;
            }
            let target = self.asset_path(journal.kind, step.new_id);
            if target.exists() {
                tracing::warn!(
                    "{} already exists, leaving {} in place",
                    target.display(),
                    staged.display()
                );
                blocked += 1;
                continue;
            }
            rename(&staged, &target)?;
            moved += 1;
        }
        Ok((moved, blocked))
    }

    fn read_journal(&self, kind: AssetKind) -> ImportExportResult<Option<RelocationJournal>> {
        let path = self.journal_path(kind);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).map_err(|err| ImportExportError::io(&path, err))?;
        let journal: RelocationJournal = serde_json::from_str(&raw)?;
        Ok(Some(journal))
    }

    fn write_journal(&self, journal: &RelocationJournal) -> ImportExportResult<()> {
        let path = self.journal_path(journal.kind);
        let tmp = path.with_extension("json.tmp");
        let raw = serde_json::to_vec_pretty(journal)?;
        fs::write(&tmp, raw).map_err(|err| ImportExportError::io(&tmp, err))?;
        rename(&tmp, &path)
    }

    /// Rename the project's single `video/*.mp4` to `video/{new_video_id}.mp4`.
    ///
    /// Returns the final path, or `None` when there is no video file.
    pub fn relocate_video_file(&self, new_video_id: i32) -> ImportExportResult<Option<PathBuf>> {
        let dir = self.root.join(VIDEO_DIR);
        if !dir.is_dir() {
            tracing::warn!("No video directory at {}", dir.display());
            return Ok(None);
        }

        let mut candidates = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|err| ImportExportError::io(&dir, err))? {
            let path = entry.map_err(|err| ImportExportError::io(&dir, err))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "mp4") {
                candidates.push(path);
            }
        }
        candidates.sort();

        let Some(source) = candidates.first() else {
            tracing::warn!("No video file found in {}", dir.display());
            return Ok(None);
        };
        if candidates.len() > 1 {
            tracing::warn!(
                "{} video files in {}, relocating {}",
                candidates.len(),
                dir.display(),
                source.display()
            );
        }

        let target = dir.join(format!("{}.mp4", new_video_id));
        if *source == target {
            return Ok(Some(target));
        }
        if target.exists() {
            tracing::warn!("{} already exists, video file not moved", target.display());
            return Ok(None);
        }
        rename(source, &target)?;
        Ok(Some(target))
    }
}

fn rename(from: &Path, to: &Path) -> ImportExportResult<()> {
    fs::rename(from, to).map_err(|source| ImportExportError::FileSystem {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidsnap_test_utils::TempDir;

    fn moves(pairs: &[(i32, i32)]) -> Vec<AssetMove> {
        pairs.iter().copied().map(AssetMove::from).collect()
    }

    #[test]
    fn overlapping_id_spaces_do_not_clobber() {
        let dir = TempDir::new().unwrap();
        dir.write("regions/1.jpg", b"one").unwrap();
        dir.write("regions/2.jpg", b"two").unwrap();
        dir.write("regions/3.jpg", b"three").unwrap();

        let relocator = AssetRelocator::new(dir.path());
        // 1 -> 2, 2 -> 3, 3 -> 1: every target is another entity's source
        let report = relocator
            .relocate(AssetKind::Region, &moves(&[(1, 2), (2, 3), (3, 1)]))
            .unwrap();

        assert_eq!(report.moved, 3);
        assert_eq!(dir.read_to_string("regions/2.jpg").unwrap(), "one");
        assert_eq!(dir.read_to_string("regions/3.jpg").unwrap(), "two");
        assert_eq!(dir.read_to_string("regions/1.jpg").unwrap(), "three");
        assert!(!dir.exists("regions/.relocation.json"));
    }

    #[test]
    fn missing_sources_are_skipped() {
        let dir = TempDir::new().unwrap();
        dir.write("frames/10.jpg", b"ten").unwrap();

        let relocator = AssetRelocator::new(dir.path());
        let report = relocator
            .relocate(AssetKind::Frame, &moves(&[(10, 1), (11, 2)]))
            .unwrap();

        assert_eq!(report.moved, 1);
        assert_eq!(report.missing, 1);
        assert_eq!(dir.read_to_string("frames/1.jpg").unwrap(), "ten");
        assert!(!dir.exists("frames/2.jpg"));
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let relocator = AssetRelocator::new(dir.path());
        let report = relocator
            .relocate(AssetKind::Segment, &moves(&[(1, 2)]))
            .unwrap();
        assert_eq!(report.moved, 0);
        assert_eq!(report.missing, 1);
    }

    #[test]
    fn interrupted_after_staging_converges() {
        let dir = TempDir::new().unwrap();
        dir.write("regions/1.jpg", b"one").unwrap();
        dir.write("regions/2.jpg", b"two").unwrap();
        let relocator = AssetRelocator::new(dir.path());
        let journal = RelocationJournal {
            kind: AssetKind::Region,
            phase: JournalPhase::Staging,
            moves: moves(&[(1, 2), (2, 1)]),
        };

        // crash between the two passes
        relocator.write_journal(&journal).unwrap();
        relocator.stage(&journal).unwrap();
        assert!(dir.exists("regions/d_2.jpg"));
        assert!(dir.exists("regions/d_1.jpg"));

        let report = relocator.resume_pending().unwrap();
        assert_eq!(report.moved, 2);
        assert_eq!(dir.read_to_string("regions/2.jpg").unwrap(), "one");
        assert_eq!(dir.read_to_string("regions/1.jpg").unwrap(), "two");

        // a second run has nothing left to do
        assert_eq!(relocator.resume_pending().unwrap(), RelocationReport::default());
    }

    #[test]
    fn journal_wins_over_new_moves() {
        let dir = TempDir::new().unwrap();
        dir.write("segments/5.mp4", b"clip").unwrap();
        let relocator = AssetRelocator::new(dir.path());
        relocator
            .write_journal(&RelocationJournal {
                kind: AssetKind::Segment,
                phase: JournalPhase::Staging,
                moves: moves(&[(5, 6)]),
            })
            .unwrap();

        let report = relocator
            .relocate(AssetKind::Segment, &moves(&[(5, 99)]))
            .unwrap();
        assert_eq!(report.moved, 1);
        assert_eq!(dir.read_to_string("segments/6.mp4").unwrap(), "clip");
        assert!(!dir.exists("segments/99.mp4"));
    }

    #[test]
    fn occupied_final_path_is_left_alone() {
        let dir = TempDir::new().unwrap();
        dir.write("regions/d_4.jpg", b"staged").unwrap();
        dir.write("regions/4.jpg", b"other").unwrap();
        let relocator = AssetRelocator::new(dir.path());
        relocator
            .write_journal(&RelocationJournal {
                kind: AssetKind::Region,
                phase: JournalPhase::Staged,
                moves: moves(&[(9, 4)]),
            })
            .unwrap();

        let report = relocator.resume_pending().unwrap();
        assert_eq!(report.blocked, 1);
        assert_eq!(dir.read_to_string("regions/4.jpg").unwrap(), "other");
        assert!(dir.exists("regions/d_4.jpg"));
    }

    #[test]
    fn video_file_takes_new_id() {
        let dir = TempDir::new().unwrap();
        dir.write("video/17.mp4", b"movie").unwrap();
        let relocator = AssetRelocator::new(dir.path());

        let path = relocator.relocate_video_file(3).unwrap().unwrap();
        assert_eq!(path, dir.path().join("video/3.mp4"));
        assert_eq!(dir.read_to_string("video/3.mp4").unwrap(), "movie");
        assert!(!dir.exists("video/17.mp4"));
    }

    #[test]
    fn missing_video_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let relocator = AssetRelocator::new(dir.path());
        assert_eq!(relocator.relocate_video_file(3).unwrap(), None);
    }
}
