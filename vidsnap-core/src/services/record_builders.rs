//! Conversions between snapshot records and entity rows.
//!
//! Import builders resolve every old-id reference through the session's
//! remap tables and only build active models; nothing here touches storage.

use chrono::Utc;
use sea_orm::Set;
use serde_json::Value;

use crate::database::entities::{
    events, frames, index_entries, region_relations, regions, segments, tube_region_relations,
    tube_relations, tubes, videos,
};
use crate::errors::ImportExportResult;
use crate::services::id_remapper::IdRemapper;
use crate::snapshot::{
    EntityKind, EventRecord, FrameRecord, ImportStage, IndexEntriesRecord, RegionRecord,
    RegionRelationRecord, SegmentRecord, TubeRecord, TubeRegionRelationRecord, TubeRelationRecord,
    VideoRecord,
};

pub fn video_active_model(record: &VideoRecord, name: &str) -> videos::ActiveModel {
    videos::ActiveModel {
        name: Set(name.to_string()),
        description: Set(record.description.clone()),
        metadata: Set(record.metadata.clone()),
        length_in_seconds: Set(record.length_in_seconds),
        height: Set(record.height),
        width: Set(record.width),
        frames: Set(record.frames),
        segments: Set(record.segments),
        dataset: Set(record.dataset),
        stream: Set(record.stream),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
}

/// Builds rows for one video using the remap tables filled so far.
pub struct RecordContext<'a> {
    video_id: i32,
    remapper: &'a IdRemapper,
}

impl<'a> RecordContext<'a> {
    pub fn new(video_id: i32, remapper: &'a IdRemapper) -> Self {
        Self { video_id, remapper }
    }

    fn event_ref(&self, stage: ImportStage, old_id: Option<i32>) -> ImportExportResult<Option<i32>> {
        self.remapper
            .resolve_optional(stage, EntityKind::Event, old_id)
    }

    /// Parent is left unset; it is patched once every event exists.
    pub fn event(&self, record: &EventRecord) -> events::ActiveModel {
        events::ActiveModel {
            video_id: Set(self.video_id),
            parent_id: Set(None),
            operation: Set(record.operation.clone()),
            started: Set(record.started),
            completed: Set(record.completed),
            errored: Set(record.errored),
            error_message: Set(record.error_message.clone().unwrap_or_default()),
            created: Set(record.created),
            start_ts: Set(record.start_ts),
            duration: Set(record.effective_duration()),
            arguments: Set(record.arguments.clone()),
            task_id: Set(record.task_id.clone().unwrap_or_default()),
            imported: Set(true),
            ..Default::default()
        }
    }

    pub fn segment(&self, record: &SegmentRecord) -> ImportExportResult<segments::ActiveModel> {
        Ok(segments::ActiveModel {
            video_id: Set(self.video_id),
            event_id: Set(self.event_ref(ImportStage::Segments, record.event)?),
            segment_index: Set(record.segment_index),
            start_time: Set(record.start_time),
            end_time: Set(record.end_time),
            frame_count: Set(record.frame_count),
            start_index: Set(record.start_index),
            metadata: Set(record.metadata.clone()),
            framelist: Set(record.framelist.clone()),
            ..Default::default()
        })
    }

    pub fn frame(&self, record: &FrameRecord) -> ImportExportResult<frames::ActiveModel> {
        Ok(frames::ActiveModel {
            video_id: Set(self.video_id),
            event_id: Set(self.event_ref(ImportStage::FramesAndRegions, record.event)?),
            frame_index: Set(record.frame_index),
            name: Set(record.name.clone()),
            subdir: Set(record.subdir.clone()),
            h: Set(record.h),
            w: Set(record.w),
            t: Set(record.t),
            keyframe: Set(record.keyframe),
            segment_index: Set(record.segment_index),
            ..Default::default()
        })
    }

    /// `frame` is the new id and frame index of the owning frame, if any.
    pub fn region(
        &self,
        record: &RegionRecord,
        frame: Option<(i32, i32)>,
    ) -> ImportExportResult<regions::ActiveModel> {
        Ok(regions::ActiveModel {
            video_id: Set(self.video_id),
            frame_id: Set(frame.map(|(frame_id, _)| frame_id)),
            event_id: Set(self.event_ref(ImportStage::FramesAndRegions, record.event)?),
            region_type: Set(record.region_type.clone()),
            x: Set(record.x),
            y: Set(record.y),
            w: Set(record.w),
            h: Set(record.h),
            polygon_points: Set(record.polygon_points.clone()),
            confidence: Set(record.confidence),
            object_name: Set(record.object_name.clone()),
            full_frame: Set(record.full_frame),
            text: Set(record.effective_text()),
            metadata: Set(record.effective_metadata()),
            materialized: Set(record.materialized),
            png: Set(record.png),
            frame_index: Set(record.effective_frame_index(frame.map(|(_, index)| index))),
            segment_index: Set(record.effective_segment_index()),
            snapshot_id: Set(record.id),
            ..Default::default()
        })
    }

    pub fn region_relation(
        &self,
        record: &RegionRelationRecord,
    ) -> ImportExportResult<region_relations::ActiveModel> {
        let stage = ImportStage::RegionRelations;
        Ok(region_relations::ActiveModel {
            video_id: Set(self.video_id),
            source_region_id: Set(self
                .remapper
                .resolve(stage, EntityKind::Region, record.source_region)?),
            target_region_id: Set(self
                .remapper
                .resolve(stage, EntityKind::Region, record.target_region)?),
            event_id: Set(self.event_ref(stage, record.event)?),
            name: Set(record.name.clone()),
            weight: Set(record.weight),
            metadata: Set(record.metadata.clone()),
            ..Default::default()
        })
    }

    pub fn tube(&self, record: &TubeRecord) -> ImportExportResult<tubes::ActiveModel> {
        let stage = ImportStage::Tubes;
        Ok(tubes::ActiveModel {
            video_id: Set(self.video_id),
            event_id: Set(self.event_ref(stage, record.event)?),
            start_frame_index: Set(record.start_frame_index),
            end_frame_index: Set(record.end_frame_index),
            start_region_id: Set(self.remapper.resolve_optional(
                stage,
                EntityKind::Region,
                record.start_region,
            )?),
            end_region_id: Set(self.remapper.resolve_optional(
                stage,
                EntityKind::Region,
                record.end_region,
            )?),
            text: Set(record.text.clone().unwrap_or_default()),
            metadata: Set(record.metadata.clone()),
            ..Default::default()
        })
    }

    pub fn tube_relation(
        &self,
        record: &TubeRelationRecord,
    ) -> ImportExportResult<tube_relations::ActiveModel> {
        let stage = ImportStage::TubeRelations;
        Ok(tube_relations::ActiveModel {
            video_id: Set(self.video_id),
            source_tube_id: Set(self
                .remapper
                .resolve(stage, EntityKind::Tube, record.source_tube)?),
            target_tube_id: Set(self
                .remapper
                .resolve(stage, EntityKind::Tube, record.target_tube)?),
            event_id: Set(self.event_ref(stage, record.event)?),
            name: Set(record.name.clone()),
            weight: Set(record.weight),
            metadata: Set(record.metadata.clone()),
            ..Default::default()
        })
    }

    pub fn tube_region_relation(
        &self,
        record: &TubeRegionRelationRecord,
    ) -> ImportExportResult<tube_region_relations::ActiveModel> {
        let stage = ImportStage::TubeRegionRelations;
        Ok(tube_region_relations::ActiveModel {
            video_id: Set(self.video_id),
            region_id: Set(self
                .remapper
                .resolve(stage, EntityKind::Region, record.region)?),
            tube_id: Set(self.remapper.resolve(stage, EntityKind::Tube, record.tube)?),
            event_id: Set(self.event_ref(stage, record.event)?),
            name: Set(record.name.clone()),
            weight: Set(record.weight),
            metadata: Set(record.metadata.clone()),
            ..Default::default()
        })
    }

    /// `entries` must already be rewritten to new ids.
    pub fn index_entries(
        &self,
        record: &IndexEntriesRecord,
        indexer_shasum: String,
        entries: Value,
    ) -> ImportExportResult<index_entries::ActiveModel> {
        Ok(index_entries::ActiveModel {
            video_id: Set(self.video_id),
            event_id: Set(self
                .remapper
                .resolve(ImportStage::IndexEntries, EntityKind::Event, record.event)?),
            algorithm: Set(record.algorithm.clone()),
            indexer_shasum: Set(indexer_shasum),
            approximator_shasum: Set(record.approximator_shasum.clone()),
            count: Set(record.count),
            contains_detections: Set(record.contains_detections),
            contains_frames: Set(record.contains_frames),
            approximate: Set(record.approximate),
            created: Set(record.created),
            features_file_name: Set(record.features_file_name.clone()),
            detection_name: Set(record.detection_name.clone()),
            entries: Set(entries),
            metadata: Set(record.metadata.clone()),
            ..Default::default()
        })
    }
}

impl From<&videos::Model> for VideoRecord {
    fn from(model: &videos::Model) -> Self {
        Self {
            name: model.name.clone(),
            dataset: model.dataset,
            description: model.description.clone(),
            metadata: model.metadata.clone(),
            length_in_seconds: model.length_in_seconds,
            height: model.height,
            width: model.width,
            frames: model.frames,
            segments: model.segments,
            stream: model.stream,
        }
    }
}

impl From<&events::Model> for EventRecord {
    fn from(model: &events::Model) -> Self {
        Self {
            id: model.id,
            parent: model.parent_id,
            operation: model.operation.clone(),
            started: model.started,
            completed: model.completed,
            errored: model.errored,
            error_message: Some(model.error_message.clone()),
            created: model.created,
            start_ts: model.start_ts,
            duration: Some(model.duration),
            seconds: None,
            arguments: model.arguments.clone(),
            task_id: Some(model.task_id.clone()),
        }
    }
}

impl From<&segments::Model> for SegmentRecord {
    fn from(model: &segments::Model) -> Self {
        Self {
            id: model.id,
            segment_index: model.segment_index,
            start_time: model.start_time,
            end_time: model.end_time,
            frame_count: model.frame_count,
            start_index: model.start_index,
            metadata: model.metadata.clone(),
            framelist: model.framelist.clone(),
            event: model.event_id,
        }
    }
}

impl From<&frames::Model> for FrameRecord {
    fn from(model: &frames::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            frame_index: model.frame_index,
            subdir: model.subdir.clone(),
            h: model.h,
            w: model.w,
            t: model.t,
            keyframe: model.keyframe,
            segment_index: model.segment_index,
            event: model.event_id,
            region_list: Vec::new(),
        }
    }
}

impl From<&regions::Model> for RegionRecord {
    fn from(model: &regions::Model) -> Self {
        Self {
            id: Some(model.id),
            x: model.x,
            y: model.y,
            h: model.h,
            w: model.w,
            polygon_points: model.polygon_points.clone(),
            region_type: model.region_type.clone(),
            confidence: model.confidence,
            object_name: model.object_name.clone(),
            full_frame: model.full_frame,
            text: Some(model.text.clone()),
            metadata_text: None,
            metadata: model.metadata.clone(),
            metadata_json: None,
            materialized: model.materialized,
            png: model.png,
            event: model.event_id,
            frame_index: Some(model.frame_index),
            parent_frame_index: None,
            segment_index: Some(model.segment_index),
            parent_segment_index: None,
        }
    }
}

impl From<&region_relations::Model> for RegionRelationRecord {
    fn from(model: &region_relations::Model) -> Self {
        Self {
            id: Some(model.id),
            source_region: model.source_region_id,
            target_region: model.target_region_id,
            name: model.name.clone(),
            weight: model.weight,
            metadata: model.metadata.clone(),
            event: model.event_id,
        }
    }
}

impl From<&tubes::Model> for TubeRecord {
    fn from(model: &tubes::Model) -> Self {
        Self {
            id: model.id,
            start_frame_index: model.start_frame_index,
            end_frame_index: model.end_frame_index,
            start_region: model.start_region_id,
            end_region: model.end_region_id,
            text: Some(model.text.clone()),
            metadata: model.metadata.clone(),
            event: model.event_id,
        }
    }
}

impl From<&tube_relations::Model> for TubeRelationRecord {
    fn from(model: &tube_relations::Model) -> Self {
        Self {
            id: Some(model.id),
            source_tube: model.source_tube_id,
            target_tube: model.target_tube_id,
            name: model.name.clone(),
            weight: model.weight,
            metadata: model.metadata.clone(),
            event: model.event_id,
        }
    }
}

impl From<&tube_region_relations::Model> for TubeRegionRelationRecord {
    fn from(model: &tube_region_relations::Model) -> Self {
        Self {
            id: Some(model.id),
            region: model.region_id,
            tube: model.tube_id,
            name: model.name.clone(),
            weight: model.weight,
            metadata: model.metadata.clone(),
            event: model.event_id,
        }
    }
}

impl From<&index_entries::Model> for IndexEntriesRecord {
    fn from(model: &index_entries::Model) -> Self {
        Self {
            algorithm: model.algorithm.clone(),
            indexer_shasum: Some(model.indexer_shasum.clone()),
            approximator_shasum: model.approximator_shasum.clone(),
            count: model.count,
            contains_detections: model.contains_detections,
            contains_frames: model.contains_frames,
            approximate: model.approximate,
            created: model.created,
            event: model.event_id,
            features_file_name: model.features_file_name.clone(),
            entries_file_name: None,
            entries: Some(model.entries.clone()),
            detection_name: model.detection_name.clone(),
            metadata: model.metadata.clone(),
        }
    }
}
