//! Material classes that matter when a ship lands or is torn down.

use crate::game::block::BlockState;

const AIR: [&str; 3] = ["air", "cave_air", "void_air"];

const LIQUIDS: [&str; 2] = ["water", "lava"];

const FRAGILE: &[&str] = &[
    "grass",
    "short_grass",
    "tall_grass",
    "fern",
    "large_fern",
    "dead_bush",
    "seagrass",
    "tall_seagrass",
    "kelp",
    "kelp_plant",
    "vine",
    "cave_vines",
    "cave_vines_plant",
    "weeping_vines",
    "weeping_vines_plant",
    "twisting_vines",
    "twisting_vines_plant",
    "glow_lichen",
    "hanging_roots",
    "dandelion",
    "poppy",
    "blue_orchid",
    "allium",
    "azure_bluet",
    "oxeye_daisy",
    "cornflower",
    "lily_of_the_valley",
    "wither_rose",
    "torchflower",
    "pink_petals",
    "sunflower",
    "lilac",
    "rose_bush",
    "peony",
    "spore_blossom",
    "wheat",
    "carrots",
    "potatoes",
    "beetroots",
    "melon_stem",
    "pumpkin_stem",
    "attached_melon_stem",
    "attached_pumpkin_stem",
    "sweet_berry_bush",
    "nether_wart",
    "brown_mushroom",
    "red_mushroom",
    "crimson_fungus",
    "warped_fungus",
    "crimson_roots",
    "warped_roots",
    "nether_sprouts",
    "mangrove_propagule",
    "snow",
    "powder_snow",
    "cobweb",
    "fire",
    "soul_fire",
    "lily_pad",
    "sugar_cane",
    "cactus",
    "bamboo",
    "bamboo_sapling",
    "chorus_plant",
    "chorus_flower",
];

const FRAGILE_SUFFIXES: [&str; 3] = ["_tulip", "_leaves", "_sapling"];

const ATTACHABLE_MARKERS: [&str; 7] = [
    "banner",
    "sign",
    "torch",
    "button",
    "lever",
    "carpet",
    "pressure_plate",
];

/// What occupies a target cell, from the point of view of a landing ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    /// Air or a passable liquid
    Clear,
    /// Decoration that can be destroyed without consequence
    Fragile,
    Hard,
}

pub fn is_air(material: &str) -> bool {
    AIR.contains(&material)
}

/// Liquids a ship may be placed into.
pub fn is_passable_liquid(material: &str) -> bool {
    LIQUIDS.contains(&material)
}

pub fn is_fragile(material: &str) -> bool {
    FRAGILE.contains(&material) || FRAGILE_SUFFIXES.iter().any(|suffix| material.ends_with(suffix))
}

/// Decoration that hangs off a neighbouring solid block.
pub fn is_attachable(material: &str) -> bool {
    ATTACHABLE_MARKERS.iter().any(|marker| material.contains(marker))
}

pub fn classify_occupant(state: &BlockState) -> Occupancy {
    let material = state.material();
    if is_air(material) || is_passable_liquid(material) {
        Occupancy::Clear
    } else if is_fragile(material) {
        Occupancy::Fragile
    } else {
        Occupancy::Hard
    }
}
