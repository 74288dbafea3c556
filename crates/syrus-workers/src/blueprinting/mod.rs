//! Blueprinting Worker (spec §4.4): turns a drawn seed package into a full
//! campaign blueprint via the configured LLM, caches the raw vendor response
//! under a deterministic key, validates and persists the parsed result,
//! renders the intro image inline, fans out the remaining `imagePlan`
//! entries to the image-gen path, and narrates the outcome in five fixed
//! messages.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use syrus_core::types::{CampaignId, DecisionModel, ModelClass, Stage};
use syrus_llm::{BlueprintPromptRequest, ImageProvider, ImageRequest, LlmError, LlmProvider};
use syrus_messaging::{Attachment, ChannelSender, OutboundMessage};
use syrus_queue::{MessageGroupId, Queue};
use syrus_store::model::{Blueprint, Campaign, CampaignStatus};
use syrus_store::{load_or_not_found, BlobStore, CampaignStore, DedupStore, SecretStore};

use crate::error::{classify, outcome_for, ErrorPolicy, WorkerError, WorkerOutcome};
use crate::messages::{BlueprintMessage, ImageGenMessage};
use crate::narrative;

pub mod prompt;

/// Collaborator bundle the worker needs, grouped the way
/// `skynet-gateway::app::AppState` groups a handler's dependencies rather
/// than threading eight parameters through `process()`.
pub struct BlueprintingContext<'a> {
    pub campaigns: &'a dyn CampaignStore,
    pub dedup: &'a dyn DedupStore,
    pub blobs: &'a dyn BlobStore,
    pub secrets: &'a dyn SecretStore,
    pub llm: &'a dyn LlmProvider,
    pub images: &'a dyn ImageProvider,
    pub sender: &'a dyn ChannelSender,
    pub image_queue: &'a dyn Queue<ImageGenMessage>,
}

#[derive(Deserialize)]
struct BlueprintLlmResponse {
    blueprint: Blueprint,
    intro: String,
}

const LLM_TIMEOUT: Duration = Duration::from_secs(240);

/// Replicates `ArtifactCache::blueprint_response_key` without requiring a
/// `Sized` `BlobStore` — `ArtifactCache<B>` can't be parameterized over
/// `dyn BlobStore`, so this module talks to the blob store directly, the
/// same way `syrus_messaging::attachment::resolve` does.
fn blueprint_response_key(campaign_id: &CampaignId, model_class: ModelClass) -> String {
    format!("{campaign_id}/blueprint/{model_class}/response.json")
}

fn image_key(campaign_id: &CampaignId, image_id: &str) -> String {
    format!("{campaign_id}/images/{image_id}.png")
}

fn decision_model_label(decision_model: DecisionModel) -> &'static str {
    match decision_model {
        DecisionModel::Host => "host",
        DecisionModel::Flexible => "flexible",
        DecisionModel::Group => "group",
    }
}

fn record_dedup(dedup: &dyn DedupStore, interaction_id: &str) {
    if let Err(e) = dedup.record(Stage::Blueprinting, interaction_id, None) {
        warn!(error = %e, "dedup write failed after blueprinting");
    }
}

async fn send_narrative(sender: &dyn ChannelSender, campaign: &Campaign, content: &str) -> bool {
    sender
        .send(&OutboundMessage {
            channel_id: campaign.meta.channel_id.clone(),
            content: content.to_string(),
            ..Default::default()
        })
        .await
        .is_ok()
}

/// Retries a rate-limited vendor call exactly once, mirroring
/// `syrus_messaging::sender::send_with_single_retry`'s 429 handling.
async fn generate_blueprint_with_retry(
    llm: &dyn LlmProvider,
    request: &BlueprintPromptRequest,
) -> syrus_llm::Result<syrus_llm::BlueprintPromptResponse> {
    match llm.generate_blueprint(request).await {
        Err(LlmError::RateLimited { retry_after_ms }) => {
            warn!(retry_after_ms, "blueprint vendor call rate limited, retrying once");
            tokio::time::sleep(Duration::from_millis(retry_after_ms + 100)).await;
            llm.generate_blueprint(request).await
        }
        other => other,
    }
}

fn assemble_system_prompt(campaign: &Campaign, msg: &BlueprintMessage) -> String {
    let mut out = prompt::system_prompt(campaign.campaign_type, decision_model_label(campaign.decision_model));
    out.push_str("\n\n");
    out.push_str(&prompt::beat_profile_section(msg.seeds.beat_profile_acts, msg.seeds.max_combat_scenes));
    out.push_str("\n\n");
    out.push_str(&prompt::available_boons_section());
    out.push_str("\n\n");
    out.push_str(&prompt::seed_package_section(&msg.seeds));
    out.push_str("\n\n");
    out.push_str(&prompt::example_blueprint_section(campaign.campaign_type));
    out
}

pub async fn process(msg: BlueprintMessage, ctx: &BlueprintingContext<'_>) -> WorkerOutcome {
    match ctx.dedup.seen(Stage::Blueprinting, &msg.interaction_id, None) {
        Ok(true) => return WorkerOutcome::Success,
        Ok(false) => {}
        Err(e) => warn!(error = %e, "dedup read failed, proceeding as unseen"),
    }

    let mut campaign = match load_or_not_found(ctx.campaigns, &msg.campaign_id) {
        Ok(c) => c,
        Err(e) => return outcome_for(WorkerError::from(e), false),
    };

    // A redelivered message after the campaign already went active must not
    // regenerate the blueprint or re-send narration.
    if campaign.status == CampaignStatus::Active {
        return WorkerOutcome::Success;
    }

    let model_class = campaign.model_policy.blueprint;
    let response_key = blueprint_response_key(&msg.campaign_id, model_class);

    let cached = match ctx.blobs.get(&response_key) {
        Ok(c) => c,
        Err(e) => return outcome_for(WorkerError::from(e), false),
    };

    let raw_json = match cached {
        Some(bytes) => bytes,
        None => {
            if let Err(e) = ctx.secrets.get("anthropic_api_key") {
                return outcome_for(WorkerError::from(e), false);
            }
            let request = BlueprintPromptRequest {
                model_class,
                system_prompt: assemble_system_prompt(&campaign, &msg),
                user_message: "Produce the blueprint now.".to_string(),
            };

            let outcome = tokio::time::timeout(LLM_TIMEOUT, generate_blueprint_with_retry(ctx.llm, &request)).await;
            let response = match outcome {
                Ok(Ok(r)) => r,
                Ok(Err(e)) => {
                    let werr = WorkerError::from(e);
                    return if classify(&werr) == ErrorPolicy::Swallow {
                        let sent = send_narrative(ctx.sender, &campaign, narrative::blueprint_vendor_failure()).await;
                        record_dedup(ctx.dedup, &msg.interaction_id);
                        outcome_for(werr, sent)
                    } else {
                        outcome_for(werr, false)
                    };
                }
                Err(_) => {
                    // Vendor may simply be slow this attempt; let it redeliver
                    // rather than narrate a failure to the user.
                    return outcome_for(
                        WorkerError::Timeout(format!("blueprint generation exceeded {LLM_TIMEOUT:?}")),
                        false,
                    );
                }
            };

            let cost_usd = campaign.cost_tracking.record(model_class, response.tokens_in as u64, response.tokens_out as u64);
            if campaign.cost_tracking.soft_limit_exceeded(model_class, cost_usd) {
                warn!(campaign_id = %msg.campaign_id, %model_class, cost_usd, "blueprint generation crossed its soft cost limit");
            }

            let bytes = response.raw_json.into_bytes();
            if let Err(e) = ctx.blobs.put(&response_key, bytes.clone()) {
                return outcome_for(WorkerError::from(e), false);
            }
            bytes
        }
    };

    let parsed: BlueprintLlmResponse = match serde_json::from_slice(&raw_json) {
        Ok(p) => p,
        Err(e) => {
            let sent = send_narrative(ctx.sender, &campaign, narrative::blueprint_validation_failed()).await;
            record_dedup(ctx.dedup, &msg.interaction_id);
            return outcome_for(WorkerError::Validation(format!("malformed blueprint response: {e}")), sent);
        }
    };

    let BlueprintLlmResponse { mut blueprint, intro } = parsed;

    // A validation failure against a cached response would fail identically
    // on every retry, since the cache short-circuits the vendor call; always
    // swallow (spec §7's error-kind table) rather than let it retry forever.
    if let Err(reason) = blueprint.validate(msg.seeds.beat_profile_acts as usize) {
        warn!(reason, "blueprint validation failed");
        let sent = send_narrative(ctx.sender, &campaign, narrative::blueprint_validation_failed()).await;
        record_dedup(ctx.dedup, &msg.interaction_id);
        return outcome_for(WorkerError::Validation(reason), sent);
    }

    let intro_key = image_key(&msg.campaign_id, "intro");
    let intro_attached = match ctx.blobs.get(&intro_key) {
        Ok(Some(_)) => true,
        Ok(None) => match blueprint.image_plan.get("intro").cloned() {
            Some(entry) => {
                let image_request = ImageRequest {
                    model_class: campaign.model_policy.image_generation,
                    prompt: entry.prompt,
                };
                match ctx.images.generate_image(&image_request).await {
                    Ok(image) => match ctx.blobs.put(&intro_key, image.bytes) {
                        Ok(()) => true,
                        Err(e) => {
                            warn!(error = %e, "failed to cache intro image, proceeding without one");
                            false
                        }
                    },
                    // The blueprint text is the higher-priority artifact; a
                    // failed intro image must not block the rest of the flow.
                    Err(e) => {
                        warn!(error = %e, "intro image generation failed, proceeding without one");
                        false
                    }
                }
            }
            None => false,
        },
        Err(e) => {
            warn!(error = %e, "intro image cache read failed, proceeding without one");
            false
        }
    };
    if intro_attached {
        if let Some(entry) = blueprint.image_plan.get_mut("intro") {
            entry.blob_key = Some(intro_key.clone());
        }
    }

    for (image_id, entry) in blueprint.image_plan.iter() {
        if image_id == "intro" {
            continue;
        }
        let gen_msg = ImageGenMessage {
            campaign_id: msg.campaign_id.clone(),
            interaction_id: msg.interaction_id.clone(),
            image_id: image_id.clone(),
            prompt: entry.prompt.clone(),
            model: campaign.model_policy.image_generation,
        };
        if let Err(e) = ctx
            .image_queue
            .send(MessageGroupId::from(msg.campaign_id.as_str()), gen_msg)
            .await
        {
            warn!(error = %e, image_id, "failed to enqueue image-gen message");
        }
    }

    let title = blueprint.title.clone();
    let premise = blueprint.premise.clone();
    campaign.blueprint = Some(blueprint);
    campaign.status = CampaignStatus::Active;
    campaign.updated_at = Utc::now();
    if let Err(e) = ctx.campaigns.put(&campaign) {
        return outcome_for(WorkerError::from(e), false);
    }

    let channel_id = campaign.meta.channel_id.clone();
    let mut title_msg = OutboundMessage {
        channel_id: channel_id.clone(),
        content: format!("**{title}**"),
        ..Default::default()
    };
    if intro_attached {
        title_msg.attachments.push(Attachment { filename: "intro.png".to_string(), data: intro_key });
    }
    let premise_msg = OutboundMessage { channel_id: channel_id.clone(), content: premise, ..Default::default() };
    let intro_msg = OutboundMessage { channel_id: channel_id.clone(), content: intro, ..Default::default() };
    let weave_msg = OutboundMessage {
        channel_id: channel_id.clone(),
        content: narrative::weave_listens().to_string(),
        ..Default::default()
    };
    let howto_msg = OutboundMessage {
        channel_id,
        content: narrative::howto_instructions().to_string(),
        // Only Discord-like senders honour flags; ignored elsewhere.
        flags: Some(64),
        ..Default::default()
    };

    for m in [title_msg, premise_msg, intro_msg, weave_msg, howto_msg] {
        if let Err(e) = ctx.sender.send(&m).await {
            warn!(error = %e, "failed to send a blueprint narration message");
        }
    }

    record_dedup(ctx.dedup, &msg.interaction_id);
    WorkerOutcome::Success
}

/// Renders one non-intro `imagePlan` entry fanned out by [`process`]. There
/// is no dedicated Imagegen stage binary — `syrus-worker` runs this from the
/// same loop as the Blueprinting stage, polling `image_queue` in addition to
/// the blueprint queue, since spec.md names only four stage workers.
pub async fn process_image_gen(msg: ImageGenMessage, ctx: &BlueprintingContext<'_>) -> WorkerOutcome {
    match ctx.dedup.seen(Stage::Imagegen, &msg.interaction_id, Some(&msg.image_id)) {
        Ok(true) => return WorkerOutcome::Success,
        Ok(false) => {}
        Err(e) => warn!(error = %e, "dedup read failed, proceeding as unseen"),
    }

    let mut campaign = match load_or_not_found(ctx.campaigns, &msg.campaign_id) {
        Ok(c) => c,
        Err(e) => return outcome_for(WorkerError::from(e), false),
    };

    let key = image_key(&msg.campaign_id, &msg.image_id);
    match ctx.blobs.get(&key) {
        Ok(Some(_)) => {}
        Ok(None) => {
            let image_request = ImageRequest { model_class: msg.model, prompt: msg.prompt.clone() };
            match ctx.images.generate_image(&image_request).await {
                Ok(image) => {
                    if let Err(e) = ctx.blobs.put(&key, image.bytes) {
                        return outcome_for(WorkerError::from(e), false);
                    }
                }
                Err(e) => {
                    // No dedicated narration for a background illustration;
                    // a missing image is a degraded, not a failed, outcome.
                    warn!(error = %e, image_id = %msg.image_id, "image generation failed, leaving blobKey unset");
                    record_dedup(ctx.dedup, &msg.interaction_id);
                    return WorkerOutcome::Success;
                }
            }
        }
        Err(e) => return outcome_for(WorkerError::from(e), false),
    }

    if let Some(blueprint) = campaign.blueprint.as_mut() {
        if let Some(entry) = blueprint.image_plan.get_mut(&msg.image_id) {
            entry.blob_key = Some(key);
        }
    }
    campaign.updated_at = Utc::now();
    if let Err(e) = ctx.campaigns.put(&campaign) {
        return outcome_for(WorkerError::from(e), false);
    }

    record_dedup(ctx.dedup, &msg.interaction_id);
    WorkerOutcome::Success
}
