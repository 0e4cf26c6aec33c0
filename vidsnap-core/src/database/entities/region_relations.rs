use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Directed relation between two regions of the same video.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "region_relations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub video_id: i32,
    pub source_region_id: i32,
    pub target_region_id: i32,
    pub event_id: Option<i32>,
    pub name: Option<String>,
    pub weight: Option<f64>,
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
        belongs_to = "super::regions::Entity",
        from = "Column::SourceRegionId",
        to = "super::regions::Column::Id"
    )]
    SourceRegion,
    #[sea_orm(
        belongs_to = "super::regions::Entity",
        from = "Column::TargetRegionId",
        to = "super::regions::Column::Id"
    )]
    TargetRegion,
}

impl Related<super::videos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Videos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
