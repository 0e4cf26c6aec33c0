use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Root aggregate of a snapshot. Every other entity belongs to exactly one video.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "videos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Option<Json>,
    pub length_in_seconds: f64,
    pub height: i32,
    pub width: i32,
    pub frames: i32,
    pub segments: i32,
    pub dataset: bool,
    pub stream: bool,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::events::Entity")]
    Events,
    #[sea_orm(has_many = "super::segments::Entity")]
    Segments,
    #[sea_orm(has_many = "super::frames::Entity")]
    Frames,
    #[sea_orm(has_many = "super::regions::Entity")]
    Regions,
    #[sea_orm(has_many = "super::index_entries::Entity")]
    IndexEntries,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl Related<super::segments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Segments.def()
    }
}

impl Related<super::frames::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Frames.def()
    }
}

impl Related<super::regions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Regions.def()
    }
}

impl Related<super::index_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IndexEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
