use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Derived index vectors produced by an indexing event.
///
/// `entries` is an opaque JSON array. Object elements carry
/// `video_primary_key`, `frame_primary_key` and `detection_primary_key`
/// pointing back into this database.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "index_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub video_id: i32,
    pub event_id: i32,
    pub algorithm: String,
    pub indexer_shasum: String,
    pub approximator_shasum: Option<String>,
    pub count: i32,
    pub contains_detections: bool,
    pub contains_frames: bool,
    pub approximate: bool,
    pub created: ChronoDateTimeUtc,
    pub features_file_name: String,
    pub detection_name: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub entries: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::videos::Entity",
        from = "Column::VideoId",
        to = "super::videos::Column::Id"
    )]
    Videos,
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id"
    )]
    Events,
}

impl Related<super::videos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Videos.def()
    }
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
