pub mod events;
pub mod frames;
pub mod index_entries;
pub mod region_relations;
pub mod regions;
pub mod segments;
pub mod tube_region_relations;
pub mod tube_relations;
pub mod tubes;
pub mod videos;
