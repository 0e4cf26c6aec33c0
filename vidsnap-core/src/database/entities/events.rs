use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A processing operation run against a video.
///
/// `parent_id` points at an older event of the same video. During import it is
/// back-patched after every event row exists.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub video_id: i32,
    pub parent_id: Option<i32>,
    pub operation: String,
    pub started: bool,
    pub completed: bool,
    pub errored: bool,
    #[sea_orm(column_type = "Text")]
    pub error_message: String,
    pub created: ChronoDateTimeUtc,
    pub start_ts: Option<ChronoDateTimeUtc>,
    pub duration: f64,
    #[sea_orm(column_type = "JsonBinary")]
    pub arguments: Option<Json>,
    pub task_id: String,
    pub imported: bool,
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
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
}

impl Related<super::videos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Videos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
