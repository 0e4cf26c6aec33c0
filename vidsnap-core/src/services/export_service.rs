use std::collections::HashMap;
use std::path::Path;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde_json::Value;

use crate::database::entities::{
    events, frames, index_entries, region_relations, regions, segments, tube_region_relations,
    tube_relations, tubes, videos,
};
use crate::errors::{ImportExportError, ImportExportResult};
use crate::snapshot::{EntityKind, FrameRecord, RegionRecord, SnapshotDocument};

/// Materializes a stored video as a snapshot document. Read only.
pub struct ExportService {
    db: DatabaseConnection,
}

impl ExportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Frames come ordered by `(frame_index, id)` with their regions nested
    /// by id, segments by `(segment_index, id)`, every other list by id.
    pub async fn export_video(&self, video_id: i32) -> ImportExportResult<SnapshotDocument> {
        let video = videos::Entity::find_by_id(video_id)
            .one(&self.db)
            .await?
            .ok_or(ImportExportError::NotFound {
                kind: EntityKind::Video,
                id: video_id,
            })?;

        let events = events::Entity::find()
            .filter(events::Column::VideoId.eq(video_id))
            .order_by_asc(events::Column::Id)
            .all(&self.db)
            .await?;

        let segments = segments::Entity::find()
            .filter(segments::Column::VideoId.eq(video_id))
            .order_by_asc(segments::Column::SegmentIndex)
            .order_by_asc(segments::Column::Id)
            .all(&self.db)
            .await?;

        let frames = frames::Entity::find()
            .filter(frames::Column::VideoId.eq(video_id))
            .order_by_asc(frames::Column::FrameIndex)
            .order_by_asc(frames::Column::Id)
            .all(&self.db)
            .await?;

        let regions = regions::Entity::find()
            .filter(regions::Column::VideoId.eq(video_id))
            .order_by_asc(regions::Column::Id)
            .all(&self.db)
            .await?;

        let region_relations = region_relations::Entity::find()
            .filter(region_relations::Column::VideoId.eq(video_id))
            .order_by_asc(region_relations::Column::Id)
            .all(&self.db)
            .await?;

        let tubes = tubes::Entity::find()
            .filter(tubes::Column::VideoId.eq(video_id))
            .order_by_asc(tubes::Column::Id)
            .all(&self.db)
            .await?;

        let tube_relations = tube_relations::Entity::find()
            .filter(tube_relations::Column::VideoId.eq(video_id))
            .order_by_asc(tube_relations::Column::Id)
            .all(&self.db)
            .await?;

        let tube_region_relations = tube_region_relations::Entity::find()
            .filter(tube_region_relations::Column::VideoId.eq(video_id))
            .order_by_asc(tube_region_relations::Column::Id)
            .all(&self.db)
            .await?;

        let index_entries = index_entries::Entity::find()
            .filter(index_entries::Column::VideoId.eq(video_id))
            .order_by_asc(index_entries::Column::Id)
            .all(&self.db)
            .await?;

        // Group regions under their frame; regions arrive in id order
        let mut regions_by_frame: HashMap<i32, Vec<RegionRecord>> = HashMap::new();
        let mut frameless = Vec::new();
        for region in &regions {
            match region.frame_id {
                Some(frame_id) => regions_by_frame
                    .entry(frame_id)
                    .or_default()
                    .push(RegionRecord::from(region)),
                None => frameless.push(RegionRecord::from(region)),
            }
        }

        let frame_list = frames
            .iter()
            .map(|frame| {
                let mut record = FrameRecord::from(frame);
                record.region_list = regions_by_frame.remove(&frame.id).unwrap_or_default();
                record
            })
            .collect::<Vec<_>>();

        tracing::info!(
            "Exported video {}: {} events, {} frames, {} regions",
            video_id,
            events.len(),
            frame_list.len(),
            regions.len()
        );

        Ok(SnapshotDocument {
            video: (&video).into(),
            event_list: events.iter().map(Into::into).collect(),
            segment_list: segments.iter().map(Into::into).collect(),
            frame_list,
            region_list: frameless,
            region_relation_list: region_relations.iter().map(Into::into).collect(),
            tube_list: tubes.iter().map(Into::into).collect(),
            tube_relation_list: tube_relations.iter().map(Into::into).collect(),
            tube_region_relation_list: tube_region_relations.iter().map(Into::into).collect(),
            index_entries_list: index_entries.iter().map(Into::into).collect(),
        })
    }

    pub async fn export_video_json(&self, video_id: i32) -> ImportExportResult<Value> {
        let document = self.export_video(video_id).await?;
        Ok(serde_json::to_value(document)?)
    }

    /// Write the document as pretty-printed JSON to `path`.
    pub async fn export_to_file(&self, video_id: i32, path: &Path) -> ImportExportResult<()> {
        let document = self.export_video(video_id).await?;
        let raw = serde_json::to_vec_pretty(&document)?;
        std::fs::write(path, raw).map_err(|err| ImportExportError::io(path, err))
    }
}
