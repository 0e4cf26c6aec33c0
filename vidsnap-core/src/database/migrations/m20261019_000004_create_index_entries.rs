use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IndexEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IndexEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IndexEntries::VideoId).integer().not_null())
                    .col(ColumnDef::new(IndexEntries::EventId).integer().not_null())
                    .col(ColumnDef::new(IndexEntries::Algorithm).string().not_null())
                    .col(
                        ColumnDef::new(IndexEntries::IndexerShasum)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexEntries::ApproximatorShasum)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(IndexEntries::Count).integer().not_null())
                    .col(
                        ColumnDef::new(IndexEntries::ContainsDetections)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexEntries::ContainsFrames)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexEntries::Approximate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(IndexEntries::Created).timestamp().not_null())
                    .col(
                        ColumnDef::new(IndexEntries::FeaturesFileName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexEntries::DetectionName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IndexEntries::Entries).json_binary().not_null())
                    .col(ColumnDef::new(IndexEntries::Metadata).json_binary().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_index_entries_video")
                            .from(IndexEntries::Table, IndexEntries::VideoId)
                            .to(Videos::Table, Videos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_index_entries_event")
                            .from(IndexEntries::Table, IndexEntries::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_index_entries_video")
                    .table(IndexEntries::Table)
                    .col(IndexEntries::VideoId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IndexEntries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum IndexEntries {
    Table,
    Id,
    VideoId,
    EventId,
    Algorithm,
    IndexerShasum,
    ApproximatorShasum,
    Count,
    ContainsDetections,
    ContainsFrames,
    Approximate,
    Created,
    FeaturesFileName,
    DetectionName,
    Entries,
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
