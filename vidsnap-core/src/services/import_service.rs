use std::path::Path;

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set,
    TransactionTrait,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::config::SnapshotConfig;
use crate::database::entities::events;
use crate::errors::{ImportExportError, ImportExportResult};
use crate::services::asset_relocator::{AssetKind, AssetMove, AssetRelocator};
use crate::services::bulk_writer::{BulkWriter, TableSink, VideoScopedEntity};
use crate::services::id_remapper::{BackReferences, IdRemapper};
use crate::services::indexer_defaults::{load_entries, resolve_indexer_shasum, rewrite_entries};
use crate::services::record_builders::{video_active_model, RecordContext};
use crate::snapshot::{
    ensure_supported, EntityKind, EventRecord, FrameRecord, ImportStage, IndexEntriesRecord,
    RegionRecord, RegionRelationRecord, SegmentRecord, SnapshotDocument, TubeRecord,
    TubeRegionRelationRecord, TubeRelationRecord,
};

/// Rows created per kind by one import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub events: usize,
    pub segments: usize,
    pub frames: usize,
    pub regions: usize,
    pub region_relations: usize,
    pub tubes: usize,
    pub tube_relations: usize,
    pub tube_region_relations: usize,
    pub index_entries: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub video_id: i32,
    pub counts: EntityCounts,
    /// Asset files moved to new-id paths, video file included.
    pub relocated_assets: usize,
    /// Old to new ids of every imported record that declared an id.
    pub remapper: IdRemapper,
}

pub struct ImportService {
    db: DatabaseConnection,
    config: SnapshotConfig,
}

impl ImportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, SnapshotConfig::default())
    }

    pub fn with_config(db: DatabaseConnection, config: SnapshotConfig) -> Self {
        Self { db, config }
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Import `{root}/{document_file_name}` and relocate the assets under `root`.
    pub async fn import_from_directory(
        &self,
        root: &Path,
        name: Option<&str>,
    ) -> ImportExportResult<ImportSummary> {
        let path = root.join(&self.config.document_file_name);
        self.import_from_file(&path, root, name).await
    }

    pub async fn import_from_file(
        &self,
        document_path: &Path,
        root: &Path,
        name: Option<&str>,
    ) -> ImportExportResult<ImportSummary> {
        let raw = std::fs::read_to_string(document_path)
            .map_err(|err| ImportExportError::io(document_path, err))?;
        let document: Value = serde_json::from_str(&raw)?;
        self.import_snapshot(&document, Some(root), name).await
    }

    /// Rebuild one video from a snapshot document.
    ///
    /// Every entity is written in a single transaction, so a failing stage
    /// leaves nothing behind. Assets under `root` are relocated after commit;
    /// a failure there is reported as `Relocation` naming the committed video.
    pub async fn import_snapshot(
        &self,
        document: &Value,
        root: Option<&Path>,
        name: Option<&str>,
    ) -> ImportExportResult<ImportSummary> {
        ensure_supported(document)?;
        let snapshot = SnapshotDocument::from_value(document)?;
        let name = name.unwrap_or(&snapshot.video.name);

        let txn = self.db.begin().await?;

        let video = video_active_model(&snapshot.video, name).insert(&txn).await?;
        info!("{} stage: created video {} '{}'", ImportStage::Video, video.id, video.name);

        let mut session = ImportSession::new(&txn, &self.config, root, video.id);
        session.import_events(&snapshot.event_list).await?;
        session.import_segments(&snapshot.segment_list).await?;
        session
            .import_frames_and_regions(&snapshot.frame_list, &snapshot.region_list)
            .await?;
        session
            .import_region_relations(&snapshot.region_relation_list)
            .await?;
        session.import_tubes(&snapshot.tube_list).await?;
        session
            .import_tube_relations(&snapshot.tube_relation_list)
            .await?;
        session
            .import_tube_region_relations(&snapshot.tube_region_relation_list)
            .await?;
        session
            .import_index_entries(&snapshot.index_entries_list)
            .await?;

        let ImportSession {
            remapper, counts, ..
        } = session;
        txn.commit().await?;

        let relocated_assets = match root {
            Some(root) => relocate_assets(root, &remapper, video.id, snapshot.video.dataset)
                .map_err(|source| ImportExportError::Relocation {
                    video_id: video.id,
                    source: Box::new(source),
                })?,
            None => 0,
        };

        info!(
            "Imported video {} ({} frames, {} regions, {} relocated files)",
            video.id, counts.frames, counts.regions, relocated_assets
        );

        Ok(ImportSummary {
            video_id: video.id,
            counts,
            relocated_assets,
            remapper,
        })
    }
}

/// State private to one import: the connection (a transaction), the remap
/// tables and the running counts.
struct ImportSession<'a, C> {
    conn: &'a C,
    config: &'a SnapshotConfig,
    root: Option<&'a Path>,
    video_id: i32,
    remapper: IdRemapper,
    counts: EntityCounts,
}

impl<'a, C> ImportSession<'a, C>
where
    C: ConnectionTrait,
{
    fn new(conn: &'a C, config: &'a SnapshotConfig, root: Option<&'a Path>, video_id: i32) -> Self {
        Self {
            conn,
            config,
            root,
            video_id,
            remapper: IdRemapper::new(),
            counts: EntityCounts::default(),
        }
    }

    async fn write<A>(&self, kind: EntityKind, batch_size: usize, models: Vec<A>) -> ImportExportResult<Vec<i32>>
    where
        A: ActiveModelTrait + Send,
        A::Entity: VideoScopedEntity,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        let mut sink = TableSink::<C, A>::new(self.conn, self.video_id, kind);
        BulkWriter::new(batch_size)
            .write_all(&mut sink, models)
            .await
    }

    /// Create all events without parents, then patch each parent through the
    /// event remap table.
    async fn import_events(&mut self, records: &[EventRecord]) -> ImportExportResult<()> {
        let mut parents = BackReferences::new(EntityKind::Event);
        let models = {
            let ctx = RecordContext::new(self.video_id, &self.remapper);
            records
                .iter()
                .map(|record| {
                    parents.push(record.id, record.parent);
                    ctx.event(record)
                })
                .collect::<Vec<_>>()
        };
        let old_ids: Vec<Option<i32>> = records.iter().map(|record| Some(record.id)).collect();

        let ids = self
            .write(EntityKind::Event, self.config.batch_size, models)
            .await?;
        self.remapper.record_aligned(EntityKind::Event, &old_ids, &ids);

        for (child, parent) in parents.resolve(&self.remapper, ImportStage::Events)? {
            let event = events::Entity::find_by_id(child)
                .one(self.conn)
                .await?
                .ok_or(ImportExportError::NotFound {
                    kind: EntityKind::Event,
                    id: child,
                })?;
            let mut active: events::ActiveModel = event.into();
            active.parent_id = Set(Some(parent));
            active.update(self.conn).await?;
        }

        self.counts.events = ids.len();
        info!(
            "{} stage: imported {} events, patched {} parents",
            ImportStage::Events,
            ids.len(),
            parents.len()
        );
        Ok(())
    }

    async fn import_segments(&mut self, records: &[SegmentRecord]) -> ImportExportResult<()> {
        let models = {
            let ctx = RecordContext::new(self.video_id, &self.remapper);
            records
                .iter()
                .map(|record| ctx.segment(record))
                .collect::<ImportExportResult<Vec<_>>>()?
        };
        let old_ids: Vec<Option<i32>> = records.iter().map(|record| Some(record.id)).collect();

        let ids = self
            .write(EntityKind::Segment, self.config.batch_size, models)
            .await?;
        self.remapper
            .record_aligned(EntityKind::Segment, &old_ids, &ids);

        self.counts.segments = ids.len();
        info!("{} stage: imported {} segments", ImportStage::Segments, ids.len());
        Ok(())
    }

    /// Frames first, then every region in one flat chunked write. Nested
    /// regions stay tied to their frame by position, not by reference.
    async fn import_frames_and_regions(
        &mut self,
        frames: &[FrameRecord],
        frameless: &[RegionRecord],
    ) -> ImportExportResult<()> {
        let frame_models = {
            let ctx = RecordContext::new(self.video_id, &self.remapper);
            frames
                .iter()
                .map(|record| ctx.frame(record))
                .collect::<ImportExportResult<Vec<_>>>()?
        };
        let frame_old_ids: Vec<Option<i32>> = frames.iter().map(|frame| Some(frame.id)).collect();

        let frame_ids = self
            .write(EntityKind::Frame, self.config.batch_size, frame_models)
            .await?;
        self.remapper
            .record_aligned(EntityKind::Frame, &frame_old_ids, &frame_ids);

        let pending: Vec<(&RegionRecord, Option<(i32, i32)>)> = frames
            .iter()
            .zip(&frame_ids)
            .flat_map(|(frame, frame_id)| {
                frame
                    .region_list
                    .iter()
                    .map(move |region| (region, Some((*frame_id, frame.frame_index))))
            })
            .chain(frameless.iter().map(|region| (region, None)))
            .collect();

        let (region_models, region_old_ids): (Vec<_>, Vec<Option<i32>>) = {
            let ctx = RecordContext::new(self.video_id, &self.remapper);
            pending
                .iter()
                .map(|(region, owner)| Ok((ctx.region(region, *owner)?, region.id)))
                .collect::<ImportExportResult<Vec<_>>>()?
                .into_iter()
                .unzip()
        };

        let region_ids = self
            .write(
                EntityKind::Region,
                self.config.region_batch_size,
                region_models,
            )
            .await?;
        self.remapper
            .record_aligned(EntityKind::Region, &region_old_ids, &region_ids);

        self.counts.frames = frame_ids.len();
        self.counts.regions = region_ids.len();
        info!(
            "{} stage: imported {} frames and {} regions ({} without a frame)",
            ImportStage::FramesAndRegions,
            frame_ids.len(),
            region_ids.len(),
            frameless.len()
        );
        Ok(())
    }

    async fn import_region_relations(&mut self, records: &[RegionRelationRecord]) -> ImportExportResult<()> {
        let models = {
            let ctx = RecordContext::new(self.video_id, &self.remapper);
            records
                .iter()
                .map(|record| ctx.region_relation(record))
                .collect::<ImportExportResult<Vec<_>>>()?
        };
        let old_ids: Vec<Option<i32>> = records.iter().map(|record| record.id).collect();

        let ids = self
            .write(EntityKind::RegionRelation, self.config.batch_size, models)
            .await?;
        self.remapper
            .record_aligned(EntityKind::RegionRelation, &old_ids, &ids);

        self.counts.region_relations = ids.len();
        info!(
            "{} stage: imported {} region relations",
            ImportStage::RegionRelations,
            ids.len()
        );
        Ok(())
    }

    async fn import_tubes(&mut self, records: &[TubeRecord]) -> ImportExportResult<()> {
        let models = {
            let ctx = RecordContext::new(self.video_id, &self.remapper);
            records
                .iter()
                .map(|record| ctx.tube(record))
                .collect::<ImportExportResult<Vec<_>>>()?
        };
        let old_ids: Vec<Option<i32>> = records.iter().map(|record| Some(record.id)).collect();

        let ids = self
            .write(EntityKind::Tube, self.config.batch_size, models)
            .await?;
        self.remapper.record_aligned(EntityKind::Tube, &old_ids, &ids);

        self.counts.tubes = ids.len();
        info!("{} stage: imported {} tubes", ImportStage::Tubes, ids.len());
        Ok(())
    }

    async fn import_tube_relations(&mut self, records: &[TubeRelationRecord]) -> ImportExportResult<()> {
        let models = {
            let ctx = RecordContext::new(self.video_id, &self.remapper);
            records
                .iter()
                .map(|record| ctx.tube_relation(record))
                .collect::<ImportExportResult<Vec<_>>>()?
        };
        let old_ids: Vec<Option<i32>> = records.iter().map(|record| record.id).collect();

        let ids = self
            .write(EntityKind::TubeRelation, self.config.batch_size, models)
            .await?;
        self.remapper
            .record_aligned(EntityKind::TubeRelation, &old_ids, &ids);

        self.counts.tube_relations = ids.len();
        info!(
            "{} stage: imported {} tube relations",
            ImportStage::TubeRelations,
            ids.len()
        );
        Ok(())
    }

    async fn import_tube_region_relations(
        &mut self,
        records: &[TubeRegionRelationRecord],
    ) -> ImportExportResult<()> {
        let models = {
            let ctx = RecordContext::new(self.video_id, &self.remapper);
            records
                .iter()
                .map(|record| ctx.tube_region_relation(record))
                .collect::<ImportExportResult<Vec<_>>>()?
        };
        let old_ids: Vec<Option<i32>> = records.iter().map(|record| record.id).collect();

        let ids = self
            .write(
                EntityKind::TubeRegionRelation,
                self.config.batch_size,
                models,
            )
            .await?;
        self.remapper
            .record_aligned(EntityKind::TubeRegionRelation, &old_ids, &ids);

        self.counts.tube_region_relations = ids.len();
        info!(
            "{} stage: imported {} tube region relations",
            ImportStage::TubeRegionRelations,
            ids.len()
        );
        Ok(())
    }

    async fn import_index_entries(&mut self, records: &[IndexEntriesRecord]) -> ImportExportResult<()> {
        let ctx = RecordContext::new(self.video_id, &self.remapper);
        let mut models = Vec::with_capacity(records.len());
        for record in records {
            // A named payload file always takes precedence over inline entries.
            let entries = match (&record.entries_file_name, &record.entries) {
                (Some(file_name), _) => {
                    let root = self.root.ok_or_else(|| {
                        ImportExportError::validation(
                            EntityKind::IndexEntries,
                            None,
                            format!("entries file `{}` needs a project directory", file_name),
                        )
                    })?;
                    load_entries(root, file_name)?
                }
                (None, Some(entries)) => entries.clone(),
                (None, None) => {
                    return Err(ImportExportError::validation(
                        EntityKind::IndexEntries,
                        None,
                        "record has neither `entries` nor `entries_file_name`",
                    ))
                }
            };
            let entries = rewrite_entries(entries, self.video_id, &self.remapper)?;
            let indexer_shasum =
                resolve_indexer_shasum(&record.algorithm, record.indexer_shasum.as_deref());
            models.push(ctx.index_entries(record, indexer_shasum, entries)?);
        }

        let ids = self
            .write(EntityKind::IndexEntries, self.config.batch_size, models)
            .await?;

        self.counts.index_entries = ids.len();
        info!(
            "{} stage: imported {} index entries records",
            ImportStage::IndexEntries,
            ids.len()
        );
        Ok(())
    }
}

/// Move every id-keyed asset to its new-id path, then the video file when
/// the project is not a dataset.
fn relocate_assets(
    root: &Path,
    remapper: &IdRemapper,
    video_id: i32,
    dataset: bool,
) -> ImportExportResult<usize> {
    let relocator = AssetRelocator::new(root);
    let mut relocated = 0;

    for kind in AssetKind::ALL {
        let moves: Vec<AssetMove> = remapper
            .pairs(kind.entity_kind())
            .into_iter()
            .map(AssetMove::from)
            .collect();
        relocated += relocator.relocate(kind, &moves)?.moved;
    }

    if !dataset && relocator.relocate_video_file(video_id)?.is_some() {
        relocated += 1;
    }

    info!("{} stage: relocated {} files", ImportStage::Assets, relocated);
    Ok(relocated)
}
