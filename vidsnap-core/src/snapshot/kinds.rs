use serde::{Deserialize, Serialize};
use strum::Display;

/// Entity kinds that take part in a snapshot and own a remap table.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Video,
    Event,
    Segment,
    Frame,
    Region,
    RegionRelation,
    Tube,
    TubeRelation,
    TubeRegionRelation,
    IndexEntries,
}

/// Ordered import phases. The declaration order is the execution order.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum ImportStage {
    Video,
    Events,
    Segments,
    FramesAndRegions,
    RegionRelations,
    Tubes,
    TubeRelations,
    TubeRegionRelations,
    IndexEntries,
    Assets,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_render_snake_case() {
        assert_eq!(EntityKind::RegionRelation.to_string(), "region_relation");
        assert_eq!(ImportStage::FramesAndRegions.to_string(), "frames_and_regions");
    }

    #[test]
    fn stages_order_follows_dependencies() {
        assert!(ImportStage::Events < ImportStage::Segments);
        assert!(ImportStage::FramesAndRegions < ImportStage::RegionRelations);
        assert!(ImportStage::RegionRelations < ImportStage::IndexEntries);
        assert!(ImportStage::IndexEntries < ImportStage::Assets);
    }
}
