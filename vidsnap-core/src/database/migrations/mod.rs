pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_videos_and_events;
mod m20261019_000002_create_segments_frames_regions;
mod m20261019_000003_create_relations_and_tubes;
mod m20261019_000004_create_index_entries;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_videos_and_events::Migration),
            Box::new(m20261019_000002_create_segments_frames_regions::Migration),
            Box::new(m20261019_000003_create_relations_and_tubes::Migration),
            Box::new(m20261019_000004_create_index_entries::Migration),
        ]
    }
}
