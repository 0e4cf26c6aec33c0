use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A detected or annotated area of a frame.
///
/// Geometry is either the `x`/`y`/`w`/`h` box or `polygon_points`. Regions
/// without a frame (`frame_id` null) describe whole-video or segment-level
/// annotations.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "regions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub video_id: i32,
    pub frame_id: Option<i32>,
    pub event_id: Option<i32>,
    pub region_type: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub polygon_points: Option<Json>,
    pub confidence: f64,
    pub object_name: String,
    pub full_frame: bool,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Option<Json>,
    pub materialized: bool,
    pub png: bool,
    pub frame_index: i32,
    pub segment_index: i32,
    /// Identifier the region carried in the snapshot it was imported from.
    pub snapshot_id: Option<i32>,
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
        belongs_to = "super::frames::Entity",
        from = "Column::FrameId",
        to = "super::frames::Column::Id"
    )]
    Frames,
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

impl Related<super::frames::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Frames.def()
    }
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
