use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RegionRelations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RegionRelations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RegionRelations::VideoId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegionRelations::SourceRegionId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegionRelations::TargetRegionId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RegionRelations::EventId).integer().null())
                    .col(ColumnDef::new(RegionRelations::Name).string().null())
                    .col(ColumnDef::new(RegionRelations::Weight).double().null())
                    .col(
                        ColumnDef::new(RegionRelations::Metadata)
                            .json_binary()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_region_relations_video")
                            .from(RegionRelations::Table, RegionRelations::VideoId)
                            .to(Videos::Table, Videos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_region_relations_source")
                            .from(RegionRelations::Table, RegionRelations::SourceRegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_region_relations_target")
                            .from(RegionRelations::Table, RegionRelations::TargetRegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_region_relations_event")
                            .from(RegionRelations::Table, RegionRelations::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tubes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tubes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tubes::VideoId).integer().not_null())
                    .col(ColumnDef::new(Tubes::EventId).integer().null())
                    .col(ColumnDef::new(Tubes::StartFrameIndex).integer().not_null())
                    .col(ColumnDef::new(Tubes::EndFrameIndex).integer().not_null())
                    .col(ColumnDef::new(Tubes::StartRegionId).integer().null())
                    .col(ColumnDef::new(Tubes::EndRegionId).integer().null())
                    .col(ColumnDef::new(Tubes::Text).text().not_null().default(""))
                    .col(ColumnDef::new(Tubes::Metadata).json_binary().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tubes_video")
                            .from(Tubes::Table, Tubes::VideoId)
                            .to(Videos::Table, Videos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tubes_start_region")
                            .from(Tubes::Table, Tubes::StartRegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tubes_end_region")
                            .from(Tubes::Table, Tubes::EndRegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TubeRelations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TubeRelations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TubeRelations::VideoId).integer().not_null())
                    .col(
                        ColumnDef::new(TubeRelations::SourceTubeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TubeRelations::TargetTubeId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TubeRelations::EventId).integer().null())
                    .col(ColumnDef::new(TubeRelations::Name).string().null())
                    .col(ColumnDef::new(TubeRelations::Weight).double().null())
                    .col(ColumnDef::new(TubeRelations::Metadata).json_binary().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tube_relations_video")
                            .from(TubeRelations::Table, TubeRelations::VideoId)
                            .to(Videos::Table, Videos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tube_relations_source")
                            .from(TubeRelations::Table, TubeRelations::SourceTubeId)
                            .to(Tubes::Table, Tubes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tube_relations_target")
                            .from(TubeRelations::Table, TubeRelations::TargetTubeId)
                            .to(Tubes::Table, Tubes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TubeRegionRelations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TubeRegionRelations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TubeRegionRelations::VideoId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TubeRegionRelations::RegionId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TubeRegionRelations::TubeId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TubeRegionRelations::EventId).integer().null())
                    .col(ColumnDef::new(TubeRegionRelations::Name).string().null())
                    .col(ColumnDef::new(TubeRegionRelations::Weight).double().null())
                    .col(
                        ColumnDef::new(TubeRegionRelations::Metadata)
                            .json_binary()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tube_region_relations_video")
                            .from(TubeRegionRelations::Table, TubeRegionRelations::VideoId)
                            .to(Videos::Table, Videos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tube_region_relations_region")
                            .from(TubeRegionRelations::Table, TubeRegionRelations::RegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tube_region_relations_tube")
                            .from(TubeRegionRelations::Table, TubeRegionRelations::TubeId)
                            .to(Tubes::Table, Tubes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TubeRegionRelations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TubeRelations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tubes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RegionRelations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RegionRelations {
    Table,
    Id,
    VideoId,
    SourceRegionId,
    TargetRegionId,
    EventId,
    Name,
    Weight,
    Metadata,
}

#[derive(Iden)]
enum Tubes {
    Table,
    Id,
    VideoId,
    EventId,
    StartFrameIndex,
    EndFrameIndex,
    StartRegionId,
    EndRegionId,
    Text,
    Metadata,
}

#[derive(Iden)]
enum TubeRelations {
    Table,
    Id,
    VideoId,
    SourceTubeId,
    TargetTubeId,
    EventId,
    Name,
    Weight,
    Metadata,
}

#[derive(Iden)]
enum TubeRegionRelations {
    Table,
    Id,
    VideoId,
    RegionId,
    TubeId,
    EventId,
    Name,
    Weight,
    Metadata,
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

#[derive(Iden)]
enum Regions {
    Table,
    Id,
}
