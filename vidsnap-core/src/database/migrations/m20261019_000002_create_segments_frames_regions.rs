use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Segments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Segments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Segments::VideoId).integer().not_null())
                    .col(ColumnDef::new(Segments::EventId).integer().null())
                    .col(ColumnDef::new(Segments::SegmentIndex).integer().not_null())
                    .col(ColumnDef::new(Segments::StartTime).double().not_null())
                    .col(ColumnDef::new(Segments::EndTime).double().not_null())
                    .col(ColumnDef::new(Segments::FrameCount).integer().not_null())
                    .col(ColumnDef::new(Segments::StartIndex).integer().not_null())
                    .col(ColumnDef::new(Segments::Metadata).json_binary().null())
                    .col(ColumnDef::new(Segments::Framelist).json_binary().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_segments_video")
                            .from(Segments::Table, Segments::VideoId)
                            .to(Videos::Table, Videos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_segments_event")
                            .from(Segments::Table, Segments::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Frames::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Frames::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Frames::VideoId).integer().not_null())
                    .col(ColumnDef::new(Frames::EventId).integer().null())
                    .col(ColumnDef::new(Frames::FrameIndex).integer().not_null())
                    .col(ColumnDef::new(Frames::Name).string().null())
                    .col(ColumnDef::new(Frames::Subdir).string().null())
                    .col(ColumnDef::new(Frames::H).integer().not_null().default(0))
                    .col(ColumnDef::new(Frames::W).integer().not_null().default(0))
                    .col(ColumnDef::new(Frames::T).double().null())
                    .col(
                        ColumnDef::new(Frames::Keyframe)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Frames::SegmentIndex).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_frames_video")
                            .from(Frames::Table, Frames::VideoId)
                            .to(Videos::Table, Videos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_frames_event")
                            .from(Frames::Table, Frames::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Regions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Regions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Regions::VideoId).integer().not_null())
                    .col(ColumnDef::new(Regions::FrameId).integer().null())
                    .col(ColumnDef::new(Regions::EventId).integer().null())
                    .col(ColumnDef::new(Regions::RegionType).string().not_null())
                    .col(ColumnDef::new(Regions::X).integer().not_null().default(0))
                    .col(ColumnDef::new(Regions::Y).integer().not_null().default(0))
                    .col(ColumnDef::new(Regions::W).integer().not_null().default(0))
                    .col(ColumnDef::new(Regions::H).integer().not_null().default(0))
                    .col(ColumnDef::new(Regions::PolygonPoints).json_binary().null())
                    .col(
                        ColumnDef::new(Regions::Confidence)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Regions::ObjectName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Regions::FullFrame)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Regions::Text).text().not_null().default(""))
                    .col(ColumnDef::new(Regions::Metadata).json_binary().null())
                    .col(
                        ColumnDef::new(Regions::Materialized)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Regions::Png)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Regions::FrameIndex).integer().not_null())
                    .col(ColumnDef::new(Regions::SegmentIndex).integer().not_null())
                    .col(ColumnDef::new(Regions::SnapshotId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_regions_video")
                            .from(Regions::Table, Regions::VideoId)
                            .to(Videos::Table, Videos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_regions_frame")
                            .from(Regions::Table, Regions::FrameId)
                            .to(Frames::Table, Frames::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_regions_event")
                            .from(Regions::Table, Regions::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_frames_video_index")
                    .table(Frames::Table)
                    .col(Frames::VideoId)
                    .col(Frames::FrameIndex)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_regions_frame")
                    .table(Regions::Table)
                    .col(Regions::FrameId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_regions_video")
                    .table(Regions::Table)
                    .col(Regions::VideoId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Regions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Frames::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Segments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Segments {
    Table,
    Id,
    VideoId,
    EventId,
    SegmentIndex,
    StartTime,
    EndTime,
    FrameCount,
    StartIndex,
    Metadata,
    Framelist,
}

#[derive(Iden)]
enum Frames {
    Table,
    Id,
    VideoId,
    EventId,
    FrameIndex,
    Name,
    Subdir,
    H,
    W,
    T,
    Keyframe,
    SegmentIndex,
}

#[derive(Iden)]
enum Regions {
    Table,
    Id,
    VideoId,
    FrameId,
    EventId,
    RegionType,
    X,
    Y,
    W,
    H,
    PolygonPoints,
    Confidence,
    ObjectName,
    FullFrame,
    Text,
    Metadata,
    Materialized,
    Png,
    FrameIndex,
    SegmentIndex,
    SnapshotId,
}

#[derive(Iden)]
enum Videos {
    Table,
    Id,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
}
