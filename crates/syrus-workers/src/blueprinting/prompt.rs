//! Assembles the Blueprinting system prompt from fixed sections (spec §4.4
//! step 5). Mirrors `skynet-agent::prompt::PromptBuilder`'s tiered
//! assembly — here the "tiers" are the five named sections rather than
//! cache-breakpoint tiers, joined in the same straight-concatenation style.

use syrus_core::types::CampaignType;
use syrus_seeds::SeedPackage;

use crate::boons::BOONS;

const SYSTEM_PREAMBLE: &str = "You are the blueprinting engine for a tabletop campaign \
narrator. Given a seed package, produce a complete campaign blueprint as a single JSON \
object with exactly two top-level keys: \"blueprint\" and \"intro\". Respond with JSON only, \
no surrounding prose.";

pub fn system_prompt(campaign_type: CampaignType, decision_model_label: &str) -> String {
    let mut out = String::new();
    out.push_str(SYSTEM_PREAMBLE);
    out.push_str("\n\n<configuration>\n");
    out.push_str(&format!("campaignType: {campaign_type}\ndecisionModel: {decision_model_label}\n"));
    out.push_str("</configuration>");
    out
}

pub fn beat_profile_section(acts: u32, max_combat_scenes: u32) -> String {
    format!("<beatProfile>\nacts: {acts}\nmaxCombatScenes: {max_combat_scenes}\n</beatProfile>")
}

pub fn available_boons_section() -> String {
    let mut out = String::from("<availableBoons>\n");
    for boon in BOONS {
        out.push_str(&format!("- {} ({}): {}\n", boon.id, boon.name, boon.description));
    }
    out.push_str("</availableBoons>");
    out
}

pub fn seed_package_section(seeds: &SeedPackage) -> String {
    let json = serde_json::to_string_pretty(seeds).unwrap_or_default();
    format!("<seedPackage>\n{json}\n</seedPackage>")
}

pub fn example_blueprint_section(campaign_type: CampaignType) -> String {
    format!("<exampleBlueprint>\n{}\n</exampleBlueprint>", example_for(campaign_type))
}

fn example_for(campaign_type: CampaignType) -> &'static str {
    match campaign_type {
        CampaignType::Short => SHORT_EXAMPLE,
        CampaignType::Long => LONG_EXAMPLE,
        CampaignType::Epic => EPIC_EXAMPLE,
    }
}

const SHORT_EXAMPLE: &str = r#"{
  "blueprint": {
    "title": "The Sundered Vault",
    "premise": "A buried reliquary wakes something that should have stayed asleep.",
    "thematicPillars": ["trust", "scarcity", "consequence"],
    "ingredientBinding": {"objectiveId": "obj-1", "antagonistIds": ["ant-1"], "twistIds": [], "setPieceIds": [], "constraintIds": [], "mapId": "map-1"},
    "acts": [
      {"actNumber": 1, "beats": ["arrival", "first contact"], "primaryArea": "vault-entry"},
      {"actNumber": 2, "beats": ["confrontation", "resolution"], "primaryArea": "vault-core"}
    ],
    "majorForces": ["the Sundered Cult"],
    "npcs": {"warden": {"name": "Warden Iss", "firstAppearanceAct": 1, "description": "a cautious keeper"}},
    "boonPlan": ["keen-edge"],
    "failurePaths": [{"id": "collapse", "description": "the vault seals permanently", "triggersAtAct": 2}],
    "endStates": {"success": "the relic is secured", "compromised": "the relic is split", "failure": "the vault is lost"},
    "memoryDirectives": ["track trust with the Warden"],
    "imagePlan": {"intro": {"prompt": "a collapsing stone vault lit by torchlight", "blobKey": null}}
  },
  "intro": "Dust falls from the ceiling as the vault door groans open..."
}"#;

const LONG_EXAMPLE: &str = r#"{
  "blueprint": {
    "title": "Embers of the Long Road",
    "premise": "A caravan's debts come due as an old war reignites along its route.",
    "thematicPillars": ["loyalty", "debt", "reinvention"],
    "ingredientBinding": {"objectiveId": "obj-2", "antagonistIds": ["ant-2", "ant-3"], "twistIds": ["twist-1"], "setPieceIds": ["set-1"], "constraintIds": ["con-1"], "mapId": "map-2"},
    "acts": [
      {"actNumber": 1, "beats": ["departure"], "primaryArea": "caravan-road"},
      {"actNumber": 2, "beats": ["ambush", "bargain"], "primaryArea": "ember-pass"},
      {"actNumber": 3, "beats": ["reckoning"], "primaryArea": "ember-pass"}
    ],
    "majorForces": ["the Ember Legion"],
    "npcs": {"quartermaster": {"name": "Quartermaster Vey", "firstAppearanceAct": 1, "description": "a debt-collector with a conscience"}},
    "boonPlan": ["second-wind", "silver-tongue"],
    "failurePaths": [{"id": "route-lost", "description": "the caravan's route is cut off", "triggersAtAct": 2}],
    "endStates": {"success": "the caravan reaches safe harbor", "compromised": "half the caravan survives", "failure": "the caravan is destroyed"},
    "memoryDirectives": ["track the party's debt to the Legion"],
    "imagePlan": {"intro": {"prompt": "a caravan silhouetted against a burning horizon", "blobKey": null}}
  },
  "intro": "The wheels creak under a sky already the color of embers..."
}"#;

const EPIC_EXAMPLE: &str = r#"{
  "blueprint": {
    "title": "The Unmaking of Thessara",
    "premise": "A kingdom's founding myth turns out to be the thing trying to destroy it.",
    "thematicPillars": ["legacy", "sacrifice", "truth"],
    "ingredientBinding": {"objectiveId": "obj-3", "antagonistIds": ["ant-4", "ant-5", "ant-6"], "twistIds": ["twist-2", "twist-3"], "setPieceIds": ["set-2", "set-3"], "constraintIds": ["con-2"], "mapId": "map-3"},
    "acts": [
      {"actNumber": 1, "beats": ["omen"], "primaryArea": "thessara-capital"},
      {"actNumber": 2, "beats": ["unraveling"], "primaryArea": "the-old-wastes"},
      {"actNumber": 3, "beats": ["descent"], "primaryArea": "the-old-wastes"},
      {"actNumber": 4, "beats": ["reckoning", "unmaking"], "primaryArea": "thessara-capital"}
    ],
    "majorForces": ["the First Dynasty's remnant"],
    "npcs": {"archivist": {"name": "Archivist Oren", "firstAppearanceAct": 1, "description": "keeper of a truth no one wants"}},
    "boonPlan": ["iron-resolve", "quick-study", "last-stand"],
    "failurePaths": [{"id": "capital-falls", "description": "Thessara's capital falls", "triggersAtAct": 3}],
    "endStates": {"success": "Thessara is remade honestly", "compromised": "Thessara survives on a new lie", "failure": "Thessara is unmade"},
    "memoryDirectives": ["track which founding-myth facts have been revealed"],
    "imagePlan": {"intro": {"prompt": "a shattering crown above a burning capital", "blobKey": null}}
  },
  "intro": "The crown cracks before anyone touches it..."
}"#;
