use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use vidsnap::database::entities::{
    events, frames, index_entries, region_relations, regions, segments, tubes, videos,
};
use vidsnap::database::migrations::Migrator;
use vidsnap::services::ImportService;
use vidsnap::snapshot::{EntityKind, ImportStage};
use vidsnap::{ImportExportError, SnapshotConfig};
use vidsnap_test_utils::{fixtures, TempDir, TestDb};

async fn setup_db() -> Result<DatabaseConnection> {
    Ok(TestDb::new_in_memory()
        .connect_migrated::<Migrator>()
        .await?)
}

async fn assert_nothing_persisted(db: &DatabaseConnection) -> Result<()> {
    assert_eq!(videos::Entity::find().count(db).await?, 0);
    assert_eq!(events::Entity::find().count(db).await?, 0);
    assert_eq!(frames::Entity::find().count(db).await?, 0);
    assert_eq!(regions::Entity::find().count(db).await?, 0);
    assert_eq!(region_relations::Entity::find().count(db).await?, 0);
    assert_eq!(index_entries::Entity::find().count(db).await?, 0);
    assert_eq!(tubes::Entity::find().count(db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn scenario_rebuilds_events_frames_regions_and_relations() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());

    let summary = service
        .import_snapshot(&fixtures::scenario_snapshot(), None, None)
        .await?;
    let remap = &summary.remapper;

    assert_eq!(summary.counts.events, 2);
    assert_eq!(summary.counts.frames, 1);
    assert_eq!(summary.counts.regions, 2);
    assert_eq!(summary.counts.region_relations, 1);

    let video = videos::Entity::find_by_id(summary.video_id)
        .one(&db)
        .await?
        .expect("video row");
    assert_eq!(video.name, "scenario");
    assert!(!video.dataset);

    let event_10 = remap.get(EntityKind::Event, 10).expect("event 10 remapped");
    let event_11 = remap.get(EntityKind::Event, 11).expect("event 11 remapped");
    let parent = events::Entity::find_by_id(event_10).one(&db).await?.expect("event");
    let child = events::Entity::find_by_id(event_11).one(&db).await?.expect("event");
    assert_eq!(parent.parent_id, None);
    assert_eq!(child.parent_id, Some(event_10));
    assert!(child.imported);
    assert_eq!(child.operation, "perform_indexing");

    let frame_id = remap.get(EntityKind::Frame, 100).expect("frame remapped");
    let frame_rows = frames::Entity::find().all(&db).await?;
    assert_eq!(frame_rows.len(), 1);
    assert_eq!(frame_rows[0].id, frame_id);
    assert_eq!(frame_rows[0].video_id, summary.video_id);

    let region_200 = remap.get(EntityKind::Region, 200).expect("region 200");
    let region_201 = remap.get(EntityKind::Region, 201).expect("region 201");
    assert_ne!(region_200, region_201);
    for region_id in [region_200, region_201] {
        let region = regions::Entity::find_by_id(region_id)
            .one(&db)
            .await?
            .expect("region");
        assert_eq!(region.frame_id, Some(frame_id));
        assert_eq!(region.frame_index, 0);
    }
    let person = regions::Entity::find_by_id(region_200).one(&db).await?.expect("region");
    assert_eq!(person.object_name, "person");

    let relations = region_relations::Entity::find().all(&db).await?;
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].source_region_id, region_200);
    assert_eq!(relations[0].target_region_id, region_201);
    assert_eq!(relations[0].name.as_deref(), Some("overlaps"));

    Ok(())
}

#[tokio::test]
async fn index_entries_are_rewritten_to_new_ids() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());

    let mut document = fixtures::scenario_snapshot();
    document["index_entries_list"] = json!([fixtures::scenario_index_entries()]);
    let summary = service.import_snapshot(&document, None, None).await?;
    let remap = &summary.remapper;

    let rows = index_entries::Entity::find().all(&db).await?;
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.event_id, remap.get(EntityKind::Event, 11).expect("event"));
    assert_eq!(row.indexer_shasum, "48b026cf77dfbd5d9841cca3ee550ef0ee5a0751");
    assert_eq!(
        row.entries,
        json!([{
            "detection_primary_key": remap.get(EntityKind::Region, 200),
            "frame_primary_key": remap.get(EntityKind::Frame, 100),
            "video_primary_key": summary.video_id,
        }])
    );

    Ok(())
}

#[tokio::test]
async fn unknown_algorithm_gets_sentinel_checksum() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());

    let mut entries = fixtures::scenario_index_entries();
    entries["algorithm"] = json!("sift");
    let mut document = fixtures::scenario_snapshot();
    document["index_entries_list"] = json!([entries]);
    service.import_snapshot(&document, None, None).await?;

    let row = index_entries::Entity::find().one(&db).await?.expect("row");
    assert_eq!(row.indexer_shasum, "UNKNOWN");
    Ok(())
}

#[tokio::test]
async fn second_import_into_same_database_gets_fresh_ids() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());

    let first = service
        .import_snapshot(&fixtures::scenario_snapshot(), None, None)
        .await?;
    let second = service
        .import_snapshot(&fixtures::scenario_snapshot(), None, Some("copy"))
        .await?;

    assert_ne!(first.video_id, second.video_id);
    let first_region = first.remapper.get(EntityKind::Region, 200).expect("region");
    let second_region = second.remapper.get(EntityKind::Region, 200).expect("region");
    assert_ne!(first_region, second_region);

    let region = regions::Entity::find_by_id(second_region)
        .one(&db)
        .await?
        .expect("region");
    assert_eq!(region.video_id, second.video_id);
    assert_eq!(
        region.frame_id,
        second.remapper.get(EntityKind::Frame, 100)
    );

    let copy = videos::Entity::find_by_id(second.video_id)
        .one(&db)
        .await?
        .expect("video");
    assert_eq!(copy.name, "copy");
    Ok(())
}

#[tokio::test]
async fn child_event_listed_before_parent_is_patched() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());

    let mut document = fixtures::scenario_snapshot();
    document["event_list"] = json!([
        fixtures::event(21, Some(22), "perform_indexing"),
        fixtures::event(22, Some(23), "perform_detection"),
        fixtures::event(23, None, "perform_import"),
    ]);
    document["region_relation_list"] = json!([]);
    let summary = service.import_snapshot(&document, None, None).await?;
    let remap = &summary.remapper;

    for (child, parent) in [(21, 22), (22, 23)] {
        let row = events::Entity::find_by_id(remap.get(EntityKind::Event, child).expect("child"))
            .one(&db)
            .await?
            .expect("event");
        assert_eq!(row.parent_id, remap.get(EntityKind::Event, parent));
    }
    Ok(())
}

#[tokio::test]
async fn unknown_parent_event_fails_the_import() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());

    let mut document = fixtures::scenario_snapshot();
    document["event_list"] = json!([fixtures::event(11, Some(99), "perform_indexing")]);
    let err = service
        .import_snapshot(&document, None, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ImportExportError::Reference {
            stage: ImportStage::Events,
            kind: EntityKind::Event,
            old_id: 99
        }
    ));
    assert_nothing_persisted(&db).await
}

#[tokio::test]
async fn legacy_detection_list_is_rejected_before_any_write() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());

    let mut document = fixtures::scenario_snapshot();
    document["frame_list"] = json!([{
        "id": 100,
        "frame_index": 0,
        "detection_list": [fixtures::region(200, 0, "person")],
    }]);
    let err = service
        .import_snapshot(&document, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ImportExportError::UnsupportedFormat(_)));
    assert_nothing_persisted(&db).await
}

#[tokio::test]
async fn relation_to_unknown_region_commits_nothing() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());

    let mut document = fixtures::scenario_snapshot();
    document["region_relation_list"] = json!([fixtures::region_relation(300, 200, 999)]);
    let err = service
        .import_snapshot(&document, None, None)
        .await
        .unwrap_err();

    match err {
        ImportExportError::Reference {
            stage,
            kind,
            old_id,
        } => {
            assert_eq!(stage, ImportStage::RegionRelations);
            assert_eq!(kind, EntityKind::Region);
            assert_eq!(old_id, 999);
        }
        other => panic!("expected reference error, got {other:?}"),
    }
    assert_nothing_persisted(&db).await
}

#[tokio::test]
async fn segment_with_unknown_event_is_a_reference_error() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());

    let mut document = fixtures::scenario_snapshot();
    document["segment_list"] = json!([{
        "id": 1,
        "segment_index": 0,
        "start_time": 0.0,
        "end_time": 2.0,
        "frame_count": 48,
        "start_index": 0,
        "event": 55,
    }]);
    let err = service
        .import_snapshot(&document, None, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ImportExportError::Reference {
            stage: ImportStage::Segments,
            kind: EntityKind::Event,
            old_id: 55
        }
    ));
    assert_eq!(segments::Entity::find().count(&db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn malformed_frame_is_a_validation_error() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());

    let mut document = fixtures::scenario_snapshot();
    document["frame_list"] = json!([{ "id": 100, "region_list": [] }]);
    let err = service
        .import_snapshot(&document, None, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ImportExportError::Validation {
            kind: EntityKind::Frame,
            old_id: Some(100),
            ..
        }
    ));
    assert_nothing_persisted(&db).await
}

#[tokio::test]
async fn regions_keep_their_frame_across_chunk_boundaries() -> Result<()> {
    let db = setup_db().await?;
    let config = SnapshotConfig::default()
        .with_batch_size(3)
        .with_region_batch_size(4);
    let service = ImportService::with_config(db.clone(), config);

    // 7 frames x 3 regions: 21 regions in 6 chunks, chunks straddle frames
    let summary = service
        .import_snapshot(&fixtures::dense_snapshot(7, 3), None, None)
        .await?;
    let remap = &summary.remapper;
    assert_eq!(summary.counts.frames, 7);
    assert_eq!(summary.counts.regions, 21);

    for frame in 0..7 {
        let frame_id = remap.get(EntityKind::Frame, 1000 + frame).expect("frame");
        for offset in 0..3 {
            let old_region = 5000 + frame * 3 + offset;
            let region_id = remap.get(EntityKind::Region, old_region).expect("region");
            let region = regions::Entity::find_by_id(region_id)
                .one(&db)
                .await?
                .expect("region row");
            assert_eq!(region.frame_id, Some(frame_id), "region {old_region}");
            assert_eq!(region.frame_index, frame);
        }
    }

    let per_frame = regions::Entity::find()
        .filter(regions::Column::FrameId.eq(remap.get(EntityKind::Frame, 1003)))
        .count(&db)
        .await?;
    assert_eq!(per_frame, 3);
    Ok(())
}

#[tokio::test]
async fn missing_entries_file_is_an_io_error() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());
    let dir = TempDir::new()?;

    let mut entries = fixtures::scenario_index_entries();
    entries.as_object_mut().expect("object").remove("entries");
    entries["entries_file_name"] = json!("inception.json");
    let mut document = fixtures::scenario_snapshot();
    document["index_entries_list"] = json!([entries]);

    let err = service
        .import_snapshot(&document, Some(dir.path()), None)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "IO_ERROR");
    assert_nothing_persisted(&db).await
}

#[tokio::test]
async fn named_entries_file_wins_over_inline_entries() -> Result<()> {
    let db = setup_db().await?;
    let service = ImportService::new(db.clone());
    let dir = TempDir::new()?;

    let mut entries = fixtures::scenario_index_entries();
    entries["entries_file_name"] = json!("missing.json");
    let mut document = fixtures::scenario_snapshot();
    document["index_entries_list"] = json!([entries]);

    let err = service
        .import_snapshot(&document, Some(dir.path()), None)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "IO_ERROR");
    assert_nothing_persisted(&db).await?;

    dir.write(
        "indexes/missing.json",
        br#"[{"detection_primary_key": 201, "frame_primary_key": 100}]"#,
    )?;
    let summary = service
        .import_snapshot(&document, Some(dir.path()), None)
        .await?;
    let stored = index_entries::Entity::find()
        .filter(index_entries::Column::VideoId.eq(summary.video_id))
        .one(&db)
        .await?
        .expect("index entries row");
    assert_eq!(
        stored.entries[0]["detection_primary_key"],
        json!(summary.remapper.get(EntityKind::Region, 201))
    );
    Ok(())
}

#[tokio::test]
async fn unresolved_tube_references_fail_the_import() -> Result<()> {
    let tube = |start: i32, end: i32| {
        json!({
            "id": 60,
            "start_frame_index": 0,
            "end_frame_index": 0,
            "start_region": start,
            "end_region": end,
        })
    };
    let cases = [
        (
            json!({ "tube_list": [tube(999, 201)] }),
            ImportStage::Tubes,
            EntityKind::Region,
            999,
        ),
        (
            json!({ "tube_list": [tube(200, 998)] }),
            ImportStage::Tubes,
            EntityKind::Region,
            998,
        ),
        (
            json!({
                "tube_list": [tube(200, 201)],
                "tube_relation_list": [{ "source_tube": 77, "target_tube": 60 }],
            }),
            ImportStage::TubeRelations,
            EntityKind::Tube,
            77,
        ),
        (
            json!({
                "tube_list": [tube(200, 201)],
                "tube_region_relation_list": [{ "region": 200, "tube": 78 }],
            }),
            ImportStage::TubeRegionRelations,
            EntityKind::Tube,
            78,
        ),
        (
            json!({
                "tube_list": [tube(200, 201)],
                "tube_region_relation_list": [{ "region": 997, "tube": 60 }],
            }),
            ImportStage::TubeRegionRelations,
            EntityKind::Region,
            997,
        ),
    ];

    for (lists, expected_stage, expected_kind, expected_old_id) in cases {
        let db = setup_db().await?;
        let mut document = fixtures::scenario_snapshot();
        for (key, value) in lists.as_object().expect("object") {
            document[key] = value.clone();
        }

        let err = ImportService::new(db.clone())
            .import_snapshot(&document, None, None)
            .await
            .unwrap_err();
        match err {
            ImportExportError::Reference {
                stage,
                kind,
                old_id,
            } => {
                assert_eq!(stage, expected_stage);
                assert_eq!(kind, expected_kind);
                assert_eq!(old_id, expected_old_id);
            }
            other => panic!("expected a reference error, got {other}"),
        }
        assert_nothing_persisted(&db).await?;
    }
    Ok(())
}
