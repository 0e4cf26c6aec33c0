use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Videos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Videos::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Videos::Name).string().not_null())
                    .col(
                        ColumnDef::new(Videos::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Videos::Metadata).json_binary().null())
                    .col(
                        ColumnDef::new(Videos::LengthInSeconds)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Videos::Height).integer().not_null())
                    .col(ColumnDef::new(Videos::Width).integer().not_null())
                    .col(ColumnDef::new(Videos::Frames).integer().not_null())
                    .col(
                        ColumnDef::new(Videos::Segments)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Videos::Dataset).boolean().not_null())
                    .col(
                        ColumnDef::new(Videos::Stream)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Videos::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::VideoId).integer().not_null())
                    .col(ColumnDef::new(Events::ParentId).integer().null())
                    .col(ColumnDef::new(Events::Operation).string().not_null())
                    .col(ColumnDef::new(Events::Started).boolean().not_null())
                    .col(ColumnDef::new(Events::Completed).boolean().not_null())
                    .col(ColumnDef::new(Events::Errored).boolean().not_null())
                    .col(
                        ColumnDef::new(Events::ErrorMessage)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Events::Created).timestamp().not_null())
                    .col(ColumnDef::new(Events::StartTs).timestamp().null())
                    .col(ColumnDef::new(Events::Duration).double().not_null())
                    .col(ColumnDef::new(Events::Arguments).json_binary().null())
                    .col(
                        ColumnDef::new(Events::TaskId)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Events::Imported)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_video")
                            .from(Events::Table, Events::VideoId)
                            .to(Videos::Table, Videos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_parent")
                            .from(Events::Table, Events::ParentId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_video")
                    .table(Events::Table)
                    .col(Events::VideoId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Videos::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Videos {
    Table,
    Id,
    Name,
    Description,
    Metadata,
    LengthInSeconds,
    Height,
    Width,
    Frames,
    Segments,
    Dataset,
    Stream,
    CreatedAt,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
    VideoId,
    ParentId,
    Operation,
    Started,
    Completed,
    Errored,
    ErrorMessage,
    Created,
    StartTs,
    Duration,
    Arguments,
    TaskId,
    Imported,
}
