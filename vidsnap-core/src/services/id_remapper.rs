use std::collections::HashMap;

use crate::errors::{ImportExportError, ImportExportResult};
use crate::snapshot::{EntityKind, ImportStage};

/// Old-id to new-id tables for one import session, one table per kind.
#[derive(Debug, Clone, Default)]
pub struct IdRemapper {
    tables: HashMap<EntityKind, HashMap<i32, i32>>,
}

impl IdRemapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: EntityKind, old_id: i32, new_id: i32) {
        let previous = self.tables.entry(kind).or_default().insert(old_id, new_id);
        if let Some(previous) = previous {
            tracing::warn!(
                "Duplicate {} old id {}: remapped to {} (was {})",
                kind,
                old_id,
                new_id,
                previous
            );
        }
    }

    /// Record positionally aligned old and new ids. Records without an old id
    /// are created but not addressable by later stages.
    pub fn record_aligned(&mut self, kind: EntityKind, old_ids: &[Option<i32>], new_ids: &[i32]) {
        for (old_id, new_id) in old_ids.iter().zip(new_ids) {
            if let Some(old_id) = old_id {
                self.record(kind, *old_id, *new_id);
            }
        }
    }

    pub fn get(&self, kind: EntityKind, old_id: i32) -> Option<i32> {
        self.tables
            .get(&kind)
            .and_then(|table| table.get(&old_id))
            .copied()
    }

    pub fn resolve(&self, stage: ImportStage, kind: EntityKind, old_id: i32) -> ImportExportResult<i32> {
        self.get(kind, old_id).ok_or(ImportExportError::Reference {
            stage,
            kind,
            old_id: i64::from(old_id),
        })
    }

    pub fn resolve_optional(
        &self,
        stage: ImportStage,
        kind: EntityKind,
        old_id: Option<i32>,
    ) -> ImportExportResult<Option<i32>> {
        old_id
            .map(|old_id| self.resolve(stage, kind, old_id))
            .transpose()
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.tables.get(&kind).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self, kind: EntityKind) -> bool {
        self.len(kind) == 0
    }

    /// All `(old, new)` pairs of a kind, ordered by old id.
    pub fn pairs(&self, kind: EntityKind) -> Vec<(i32, i32)> {
        let mut pairs: Vec<(i32, i32)> = self
            .tables
            .get(&kind)
            .map(|table| table.iter().map(|(old, new)| (*old, *new)).collect())
            .unwrap_or_default();
        pairs.sort_unstable();
        pairs
    }
}

/// Self references collected while building records of one kind, patched
/// once every record of that kind exists and is remapped.
#[derive(Debug, Clone)]
pub struct BackReferences {
    kind: EntityKind,
    pending: Vec<(i32, i32)>,
}

impl BackReferences {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, child_old_id: i32, parent_old_id: Option<i32>) {
        if let Some(parent_old_id) = parent_old_id {
            self.pending.push((child_old_id, parent_old_id));
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Translate every pending `(child, parent)` pair to new ids.
    pub fn resolve(&self, remapper: &IdRemapper, stage: ImportStage) -> ImportExportResult<Vec<(i32, i32)>> {
        self.pending
            .iter()
            .map(|(child, parent)| {
                Ok((
                    remapper.resolve(stage, self.kind, *child)?,
                    remapper.resolve(stage, self.kind, *parent)?,
                ))
            })
            .collect()
    }
}
