//! The embedded seed corpus. Built from literal `const` data the way
//! `skynet-agent::registry::KNOWN_PROVIDERS` embeds its provider table —
//! no disk I/O, no network fetch, recompiled whenever the corpus changes.

use serde::{Deserialize, Serialize};
use syrus_core::types::CampaignType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatCategory {
    Ecological,
    Metaphysical,
    Political,
    Criminal,
    Supernatural,
    Mechanical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStyle {
    Direct,
    Indirect,
    Offstage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStyle {
    Violent,
    Tactical,
    Survival,
    Social,
    Puzzle,
}

#[derive(Debug, Clone, Copy)]
pub struct Objective {
    pub id: &'static str,
    pub primary_threat_category: ThreatCategory,
    pub resolution_style: ResolutionStyle,
    pub terrain_tags: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct Antagonist {
    pub id: &'static str,
    pub presence_style: PresenceStyle,
    pub primary_threat_category: ThreatCategory,
}

#[derive(Debug, Clone, Copy)]
pub struct Twist {
    pub id: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct SetPiece {
    pub id: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Constraint {
    pub id: &'static str,
    pub weight: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct MapArea {
    pub id: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Map {
    pub id: &'static str,
    pub areas: &'static [MapArea],
    pub terrain_tags: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct BeatProfile {
    pub acts: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct CampaignTypeProfile {
    pub prefer_categories: &'static [ThreatCategory],
    pub force_non_environmental_threat: bool,
    pub require_sameness_killers: u32,
    pub require_perspective_bias: bool,
    pub require_multiple_threat_categories: bool,
    pub require_expectation_violation: bool,
    pub antagonists: Range,
    pub twists: Range,
    pub set_pieces: Range,
    pub featured_areas: Range,
    pub constraints: Range,
    pub default_excluded_motifs: &'static [&'static str],
    pub beat_profile: BeatProfile,
    pub max_combat_scenes: u32,
}

pub const OBJECTIVES: &[Objective] = &[
    Objective { id: "obj-reclaim-vault", primary_threat_category: ThreatCategory::Criminal, resolution_style: ResolutionStyle::Tactical, terrain_tags: &["underground", "urban"] },
    Objective { id: "obj-silence-oracle", primary_threat_category: ThreatCategory::Metaphysical, resolution_style: ResolutionStyle::Social, terrain_tags: &["wilderness"] },
    Objective { id: "obj-stem-the-blight", primary_threat_category: ThreatCategory::Ecological, resolution_style: ResolutionStyle::Survival, terrain_tags: &["wilderness", "coast"] },
    Objective { id: "obj-break-the-siege", primary_threat_category: ThreatCategory::Political, resolution_style: ResolutionStyle::Violent, terrain_tags: &["urban"] },
    Objective { id: "obj-unmake-the-engine", primary_threat_category: ThreatCategory::Mechanical, resolution_style: ResolutionStyle::Tactical, terrain_tags: &["underground"] },
    Objective { id: "obj-bind-the-revenant", primary_threat_category: ThreatCategory::Supernatural, resolution_style: ResolutionStyle::Violent, terrain_tags: &["wilderness"] },
    Objective { id: "obj-expose-the-cabal", primary_threat_category: ThreatCategory::Political, resolution_style: ResolutionStyle::Social, terrain_tags: &["urban"] },
    Objective { id: "obj-starve-the-swarm", primary_threat_category: ThreatCategory::Ecological, resolution_style: ResolutionStyle::Tactical, terrain_tags: &["wilderness"] },
    Objective { id: "obj-recover-the-heir", primary_threat_category: ThreatCategory::Criminal, resolution_style: ResolutionStyle::Survival, terrain_tags: &["coast", "urban"] },
    Objective { id: "obj-close-the-rift", primary_threat_category: ThreatCategory::Metaphysical, resolution_style: ResolutionStyle::Puzzle, terrain_tags: &["underground"] },
    Objective { id: "obj-outlast-the-machine", primary_threat_category: ThreatCategory::Mechanical, resolution_style: ResolutionStyle::Survival, terrain_tags: &["urban"] },
    Objective { id: "obj-appease-the-court", primary_threat_category: ThreatCategory::Supernatural, resolution_style: ResolutionStyle::Social, terrain_tags: &["wilderness"] },
];

pub const ANTAGONISTS: &[Antagonist] = &[
    Antagonist { id: "ant-warlord-kess", presence_style: PresenceStyle::Direct, primary_threat_category: ThreatCategory::Political },
    Antagonist { id: "ant-hollow-choir", presence_style: PresenceStyle::Offstage, primary_threat_category: ThreatCategory::Metaphysical },
    Antagonist { id: "ant-rot-matriarch", presence_style: PresenceStyle::Direct, primary_threat_category: ThreatCategory::Ecological },
    Antagonist { id: "ant-foreclosed-duke", presence_style: PresenceStyle::Indirect, primary_threat_category: ThreatCategory::Political },
    Antagonist { id: "ant-iron-broker", presence_style: PresenceStyle::Direct, primary_threat_category: ThreatCategory::Criminal },
    Antagonist { id: "ant-engine-prime", presence_style: PresenceStyle::Indirect, primary_threat_category: ThreatCategory::Mechanical },
    Antagonist { id: "ant-grave-tide", presence_style: PresenceStyle::Offstage, primary_threat_category: ThreatCategory::Supernatural },
    Antagonist { id: "ant-veiled-usurer", presence_style: PresenceStyle::Direct, primary_threat_category: ThreatCategory::Criminal },
    Antagonist { id: "ant-second-moon-cult", presence_style: PresenceStyle::Indirect, primary_threat_category: ThreatCategory::Metaphysical },
    Antagonist { id: "ant-plague-steward", presence_style: PresenceStyle::Direct, primary_threat_category: ThreatCategory::Ecological },
    Antagonist { id: "ant-widow-constable", presence_style: PresenceStyle::Direct, primary_threat_category: ThreatCategory::Political },
    Antagonist { id: "ant-unspoken-debt", presence_style: PresenceStyle::Offstage, primary_threat_category: ThreatCategory::Supernatural },
];

pub const TWISTS: &[Twist] = &[
    Twist { id: "twist-ally-is-quarry" },
    Twist { id: "twist-reward-is-trap" },
    Twist { id: "twist-patron-lied" },
    Twist { id: "twist-clock-was-shorter" },
    Twist { id: "twist-victim-is-complicit" },
    Twist { id: "twist-map-is-wrong" },
];

pub const SET_PIECES: &[SetPiece] = &[
    SetPiece { id: "setpiece-collapsing-bridge" },
    SetPiece { id: "setpiece-masked-gala" },
    SetPiece { id: "setpiece-flooding-vault" },
    SetPiece { id: "setpiece-running-auction" },
    SetPiece { id: "setpiece-burning-archive" },
];

pub const CONSTRAINTS: &[Constraint] = &[
    Constraint { id: "constraint-no-lethal-force", weight: 1 },
    Constraint { id: "constraint-silent-approach", weight: 2 },
    Constraint { id: "constraint-single-night", weight: 1 },
    Constraint { id: "constraint-no-magic-allowed", weight: 1 },
    Constraint { id: "constraint-protect-a-civilian", weight: 3 },
];

pub const MAPS: &[Map] = &[
    Map {
        id: "map-drowned-quarter",
        areas: &[
            MapArea { id: "area-flooded-market" },
            MapArea { id: "area-tidal-stairs" },
            MapArea { id: "area-rooftop-crossing" },
        ],
        terrain_tags: &["coast", "urban"],
    },
    Map {
        id: "map-ashfall-reach",
        areas: &[
            MapArea { id: "area-cinder-fields" },
            MapArea { id: "area-buried-tram" },
            MapArea { id: "area-watchtower-ring" },
            MapArea { id: "area-ember-camp" },
        ],
        terrain_tags: &["wilderness", "underground"],
    },
];

pub const GENRE_MODIFIERS: &[&str] = &["noir", "folk-horror", "heist", "pulp-adventure"];
pub const PERSPECTIVE_BIASES: &[&str] = &["underdog", "outsider-looking-in", "reluctant-authority"];
pub const ENVIRONMENTAL_ODDITIES: &[&str] =
    &["perpetual-dusk", "inverted-tides", "silence-zone", "migrating-ruins"];
pub const EXCLUDABLE_MOTIFS: &[&str] = &[
    "child-in-peril",
    "animal-cruelty",
    "body-horror",
    "mass-casualty",
    "betrayal-by-family",
    "imprisonment",
];

pub const SHORT_PROFILE: CampaignTypeProfile = CampaignTypeProfile {
    prefer_categories: &[ThreatCategory::Criminal, ThreatCategory::Political],
    force_non_environmental_threat: true,
    require_sameness_killers: 1,
    require_perspective_bias: false,
    require_multiple_threat_categories: false,
    require_expectation_violation: false,
    antagonists: Range { min: 1, max: 2 },
    twists: Range { min: 1, max: 2 },
    set_pieces: Range { min: 1, max: 2 },
    featured_areas: Range { min: 1, max: 2 },
    constraints: Range { min: 1, max: 2 },
    default_excluded_motifs: &["child-in-peril"],
    beat_profile: BeatProfile { acts: 2 },
    max_combat_scenes: 2,
};

pub const LONG_PROFILE: CampaignTypeProfile = CampaignTypeProfile {
    prefer_categories: &[ThreatCategory::Supernatural, ThreatCategory::Metaphysical],
    force_non_environmental_threat: false,
    require_sameness_killers: 2,
    require_perspective_bias: true,
    require_multiple_threat_categories: true,
    require_expectation_violation: true,
    antagonists: Range { min: 2, max: 3 },
    twists: Range { min: 2, max: 3 },
    set_pieces: Range { min: 2, max: 3 },
    featured_areas: Range { min: 2, max: 3 },
    constraints: Range { min: 1, max: 3 },
    default_excluded_motifs: &["child-in-peril", "animal-cruelty"],
    beat_profile: BeatProfile { acts: 3 },
    max_combat_scenes: 4,
};

pub const EPIC_PROFILE: CampaignTypeProfile = CampaignTypeProfile {
    prefer_categories: &[ThreatCategory::Political, ThreatCategory::Mechanical, ThreatCategory::Metaphysical],
    force_non_environmental_threat: false,
    require_sameness_killers: 2,
    require_perspective_bias: true,
    require_multiple_threat_categories: true,
    require_expectation_violation: true,
    antagonists: Range { min: 3, max: 4 },
    twists: Range { min: 2, max: 4 },
    set_pieces: Range { min: 2, max: 4 },
    featured_areas: Range { min: 2, max: 3 },
    constraints: Range { min: 2, max: 3 },
    default_excluded_motifs: &["child-in-peril", "animal-cruelty", "mass-casualty"],
    beat_profile: BeatProfile { acts: 5 },
    max_combat_scenes: 7,
};

/// Looks up the selection profile for a campaign type. The corpus carries
/// exactly one profile per `CampaignType` variant, so this never fails.
pub fn profile_for(campaign_type: CampaignType) -> &'static CampaignTypeProfile {
    match campaign_type {
        CampaignType::Short => &SHORT_PROFILE,
        CampaignType::Long => &LONG_PROFILE,
        CampaignType::Epic => &EPIC_PROFILE,
    }
}
