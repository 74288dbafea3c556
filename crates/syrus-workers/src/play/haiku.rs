//! `HaikuResponse` (spec §4.5): the extension-point shape the Play Worker
//! MUST accept and apply when a full turn-resolution LLM call is wired in,
//! even though nothing in the core pipeline constructs one today.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use syrus_store::model::{ActMemory, Campaign};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUpdates {
    pub flags: HashMap<String, bool>,
    pub facts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HaikuResponse {
    pub message: String,
    pub beat_advanced: bool,
    pub roll_required: bool,
    pub roll_type: Option<String>,
    pub combat_occurred: bool,
    pub failure_path_activated: Option<String>,
    pub success_path_activated: Option<String>,
    pub memory_updates: MemoryUpdates,
    pub image_trigger: Option<String>,
}

impl HaikuResponse {
    /// Folds the response onto the current act's memory and the campaign's
    /// runtime turn state. Does not touch `status`; act/turn advancement is
    /// the only state this extension point owns.
    pub fn apply_to(&self, campaign: &mut Campaign) {
        let act_key = campaign.runtime.current_act.to_string();
        let act_memory = campaign.memory.acts.entry(act_key).or_insert_with(ActMemory::default);

        if self.beat_advanced {
            campaign.runtime.current_beat += 1;
            act_memory.beats_completed += 1;
        }
        if self.combat_occurred {
            act_memory.combat_scenes += 1;
        }

        campaign.runtime.turn_state.awaiting_roll = self.roll_required;
        campaign.runtime.turn_state.roll_type = self.roll_type.clone();

        if let Some(id) = &self.failure_path_activated {
            act_memory.failures.push(id.clone());
            if !campaign.runtime.active_failure_paths.contains(id) {
                campaign.runtime.active_failure_paths.push(id.clone());
            }
        }
        if let Some(id) = &self.success_path_activated {
            act_memory.successes.push(id.clone());
        }

        for (flag, value) in &self.memory_updates.flags {
            act_memory.flags.insert(flag.clone(), *value);
        }
        act_memory.facts.extend(self.memory_updates.facts.iter().cloned());

        campaign.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syrus_core::types::{CampaignId, CampaignType, ChatSource, DecisionModel};

    fn campaign() -> Campaign {
        Campaign::new_configuring(
            CampaignId::from("chan-1"),
            CampaignType::Short,
            DecisionModel::Host,
            "host-1",
            ChatSource::Discord,
            "chan-1",
        )
    }

    #[test]
    fn beat_advanced_increments_runtime_and_act_memory() {
        let mut campaign = campaign();
        let response = HaikuResponse {
            message: "you press forward".into(),
            beat_advanced: true,
            roll_required: false,
            roll_type: None,
            combat_occurred: false,
            failure_path_activated: None,
            success_path_activated: None,
            memory_updates: MemoryUpdates::default(),
            image_trigger: None,
        };
        response.apply_to(&mut campaign);
        assert_eq!(campaign.runtime.current_beat, 1);
        assert_eq!(campaign.memory.acts.get("0").unwrap().beats_completed, 1);
    }

    #[test]
    fn failure_path_is_recorded_once_in_active_failure_paths() {
        let mut campaign = campaign();
        let response = HaikuResponse {
            message: "the vault seals".into(),
            beat_advanced: false,
            roll_required: false,
            roll_type: None,
            combat_occurred: false,
            failure_path_activated: Some("collapse".into()),
            success_path_activated: None,
            memory_updates: MemoryUpdates::default(),
            image_trigger: None,
        };
        response.apply_to(&mut campaign);
        response.apply_to(&mut campaign);
        assert_eq!(campaign.runtime.active_failure_paths, vec!["collapse".to_string()]);
        assert_eq!(campaign.memory.acts.get("0").unwrap().failures.len(), 2);
    }

    #[test]
    fn memory_updates_merge_flags_and_facts() {
        let mut campaign = campaign();
        let mut flags = HashMap::new();
        flags.insert("met_warden".to_string(), true);
        let response = HaikuResponse {
            message: "a new fact surfaces".into(),
            beat_advanced: false,
            roll_required: true,
            roll_type: Some("stealth".into()),
            combat_occurred: false,
            failure_path_activated: None,
            success_path_activated: None,
            memory_updates: MemoryUpdates { flags, facts: vec!["the warden is wary".into()] },
            image_trigger: None,
        };
        response.apply_to(&mut campaign);
        let act_memory = campaign.memory.acts.get("0").unwrap();
        assert_eq!(act_memory.flags.get("met_warden"), Some(&true));
        assert_eq!(act_memory.facts, vec!["the warden is wary".to_string()]);
        assert!(campaign.runtime.turn_state.awaiting_roll);
        assert_eq!(campaign.runtime.turn_state.roll_type.as_deref(), Some("stealth"));
    }
}
