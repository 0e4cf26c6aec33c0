use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tube_relations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub video_id: i32,
    pub source_tube_id: i32,
    pub target_tube_id: i32,
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
        belongs_to = "super::tubes::Entity",
        from = "Column::SourceTubeId",
        to = "super::tubes::Column::Id"
    )]
    SourceTube,
    #[sea_orm(
        belongs_to = "super::tubes::Entity",
        from = "Column::TargetTubeId",
        to = "super::tubes::Column::Id"
    )]
    TargetTube,
}

impl Related<super::videos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Videos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
