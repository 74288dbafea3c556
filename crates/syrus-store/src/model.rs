//! The Campaign aggregate and its nested structures (spec.md §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use syrus_core::types::{CampaignId, CampaignType, ChatSource, DecisionModel, ModelClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Configuring,
    Active,
    Playing,
    Paused,
    Ended,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Lifecycle {
    pub paused: bool,
    pub ended_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignMeta {
    pub channel_id: String,
    pub engine_version: String,
    pub narrator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Host,
    Player,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyMember {
    pub user_id: String,
    pub role: MemberRole,
    #[serde(default)]
    pub boons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub members: Vec<PartyMember>,
    pub max_active_players: u32,
}

impl Party {
    pub fn with_host(host_id: &str) -> Self {
        Self {
            members: vec![PartyMember {
                user_id: host_id.to_string(),
                role: MemberRole::Host,
                boons: Vec::new(),
            }],
            max_active_players: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureCause {
    TimeLimit,
    Antagonist,
    Resource,
    Social,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Pressure {
    pub level: u32,
    pub causes: Vec<PressureCause>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TurnState {
    pub awaiting_roll: bool,
    pub roll_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Runtime {
    pub current_act: u32,
    pub current_beat: u32,
    pub turn_state: TurnState,
    pub active_failure_paths: Vec<String>,
    pub pressure: Pressure,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActMemory {
    pub beats_completed: u32,
    pub combat_scenes: u32,
    pub flags: HashMap<String, bool>,
    pub facts: Vec<String>,
    pub failures: Vec<String>,
    pub successes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GlobalMemory {
    pub canonical_facts: Vec<String>,
    pub relationships: HashMap<String, String>,
    pub decision_flags: HashMap<String, bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CampaignMemory {
    pub global: GlobalMemory,
    /// Per-act memory skeleton, keyed by act number as a string (JSON map
    /// keys must be strings). Created lazily by the Play worker the first
    /// time a turn touches a given act (spec §4.5).
    pub acts: HashMap<String, ActMemory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelUsage {
    pub calls: u64,
    pub tokens_in: u64,
    pub tokens_out: u64,
}

impl Default for ModelUsage {
    fn default() -> Self {
        Self {
            calls: 0,
            tokens_in: 0,
            tokens_out: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CostTracking {
    /// Soft cap in USD per model class; crossing it only logs a warning
    /// (spec is explicit that hard cutoffs are out of scope for the core).
    pub soft_limits_usd: HashMap<String, f64>,
    pub usage: HashMap<String, ModelUsage>,
}

/// Approximate USD-per-1K-token rates, not vendor-authoritative pricing —
/// only precise enough to drive the soft-limit warning.
fn price_per_1k_tokens(model_class: ModelClass) -> (f64, f64) {
    match model_class {
        ModelClass::Haiku => (0.001, 0.005),
        ModelClass::Sonnet => (0.003, 0.015),
    }
}

impl CostTracking {
    /// Accrues usage for a model class, returning its running total cost in
    /// USD. Callers compare the result against `soft_limits_usd` themselves
    /// and decide whether to warn (spec: hard cutoffs are out of scope).
    pub fn record(&mut self, model_class: ModelClass, tokens_in: u64, tokens_out: u64) -> f64 {
        let (in_rate, out_rate) = price_per_1k_tokens(model_class);
        let entry = self.usage.entry(model_class.to_string()).or_default();
        entry.calls += 1;
        entry.tokens_in += tokens_in;
        entry.tokens_out += tokens_out;
        (entry.tokens_in as f64 / 1000.0) * in_rate + (entry.tokens_out as f64 / 1000.0) * out_rate
    }

    pub fn soft_limit_exceeded(&self, model_class: ModelClass, cost_usd: f64) -> bool {
        self.soft_limits_usd.get(&model_class.to_string()).is_some_and(|&limit| cost_usd > limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPolicy {
    pub intent_parsing: ModelClass,
    pub narration: ModelClass,
    pub cinematics: ModelClass,
    pub blueprint: ModelClass,
    pub image_generation: ModelClass,
}

impl Default for ModelPolicy {
    fn default() -> Self {
        Self {
            intent_parsing: ModelClass::Haiku,
            narration: ModelClass::Sonnet,
            cinematics: ModelClass::Sonnet,
            blueprint: ModelClass::Sonnet,
            image_generation: ModelClass::Haiku,
        }
    }
}

// ── Blueprint ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientBinding {
    pub objective_id: String,
    pub antagonist_ids: Vec<String>,
    pub twist_ids: Vec<String>,
    pub set_piece_ids: Vec<String>,
    pub constraint_ids: Vec<String>,
    pub map_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActStructure {
    pub act_number: u32,
    pub beats: Vec<String>,
    pub primary_area: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    pub name: String,
    pub first_appearance_act: u32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailurePath {
    pub id: String,
    pub description: String,
    pub triggers_at_act: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndStates {
    pub success: String,
    pub compromised: String,
    pub failure: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePlanEntry {
    pub prompt: String,
    /// Set once the Blueprinting worker (or a queued image-gen message) has
    /// uploaded the rendered image; `ArtifactCache` blob key.
    pub blob_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub title: String,
    pub premise: String,
    /// Invariant: exactly 3 (spec §3).
    pub thematic_pillars: Vec<String>,
    pub ingredient_binding: IngredientBinding,
    pub acts: Vec<ActStructure>,
    pub major_forces: Vec<String>,
    pub npcs: HashMap<String, Npc>,
    pub boon_plan: Vec<String>,
    pub failure_paths: Vec<FailurePath>,
    pub end_states: EndStates,
    pub memory_directives: Vec<String>,
    pub image_plan: HashMap<String, ImagePlanEntry>,
}

impl Blueprint {
    /// Validates the invariants from spec §4.4 step 6.
    pub fn validate(&self, expected_acts: usize) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.premise.trim().is_empty() {
            return Err("premise must not be empty".to_string());
        }
        if self.thematic_pillars.len() != 3 {
            return Err(format!(
                "expected exactly 3 thematic pillars, got {}",
                self.thematic_pillars.len()
            ));
        }
        if self.acts.len() != expected_acts {
            return Err(format!(
                "expected {} acts (from seed beatProfile), got {}",
                expected_acts,
                self.acts.len()
            ));
        }
        Ok(())
    }
}

// ── Campaign ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub campaign_id: CampaignId,
    pub campaign_type: CampaignType,
    pub decision_model: DecisionModel,
    pub status: CampaignStatus,
    pub lifecycle: Lifecycle,
    pub host_id: String,
    pub source: ChatSource,
    pub meta: CampaignMeta,
    pub party: Party,
    pub blueprint: Option<Blueprint>,
    pub runtime: Runtime,
    pub memory: CampaignMemory,
    pub cost_tracking: CostTracking,
    pub model_policy: ModelPolicy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Construct a freshly-configured campaign (spec §4.2 `start`).
    pub fn new_configuring(
        campaign_id: CampaignId,
        campaign_type: CampaignType,
        decision_model: DecisionModel,
        host_id: &str,
        source: ChatSource,
        channel_id: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            campaign_id,
            campaign_type,
            decision_model,
            status: CampaignStatus::Configuring,
            lifecycle: Lifecycle::default(),
            host_id: host_id.to_string(),
            source,
            meta: CampaignMeta {
                channel_id: channel_id.to_string(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                narrator: "syrus".to_string(),
            },
            party: Party::with_host(host_id),
            blueprint: None,
            runtime: Runtime::default(),
            memory: CampaignMemory::default(),
            cost_tracking: CostTracking::default(),
            model_policy: ModelPolicy::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Invariant: `status = ended ⇔ lifecycle.ended_at ≠ null` (Testable Property 3).
    pub fn invariant_ended_matches_lifecycle(&self) -> bool {
        (self.status == CampaignStatus::Ended) == self.lifecycle.ended_at.is_some()
    }
}

// ── Host whitelist ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    pub source: ChatSource,
    pub display_name: Option<String>,
}
