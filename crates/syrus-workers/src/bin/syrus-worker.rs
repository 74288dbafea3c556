//! Single configurable binary that runs one of the four stage loops,
//! selected by `SYRUS_STAGE_NAME` (configuring|birthing|blueprinting|play).
//! Horizontally replicable: every instance is stateless aside from the
//! shared collaborators it opens on startup (spec §5).

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::watch;
use tracing::info;

use syrus_core::config::SyrusConfig;
use syrus_llm::{AnthropicProvider, OpenAiImageProvider};
use syrus_messaging::{discord::DiscordLikeSender, whatsapp::WhatsAppLikeSender, ChannelSender};
use syrus_queue::InProcessQueue;
use syrus_seeds::EntropyRngSource;
use syrus_store::{db::init_db, EnvSecretStore, InMemoryBlobStore, SqliteCampaignStore, SqliteDedupStore};
use syrus_workers::messages::{BirthingMessage, BlueprintMessage, ConfiguringMessage, ImageGenMessage, PlayMessage};
use syrus_workers::{birthing, blueprinting, configuring, play};

/// `InProcessQueue` is an in-memory stand-in for the out-of-scope durable
/// queue substrate; it cannot be shared across separate OS processes. This
/// binary therefore only demonstrates a single stage's processing loop
/// against freshly-constructed queues — a real deployment would hand this
/// process a durable queue client built from `config.queues` instead.
fn build_sender(config: &SyrusConfig, secrets: Arc<dyn syrus_store::SecretStore>, blobs: Arc<dyn syrus_store::BlobStore>) -> Arc<dyn ChannelSender> {
    if let Some(discord) = &config.dialects.discord {
        Arc::new(DiscordLikeSender::new(secrets, blobs, discord.app_id.clone()))
    } else if let Some(whatsapp) = &config.dialects.whatsapp {
        Arc::new(WhatsAppLikeSender::new(secrets, blobs, whatsapp.app_id.clone()))
    } else {
        // No dialect configured: fall back to Discord's endpoint shape with
        // an empty app id rather than failing startup outright.
        Arc::new(DiscordLikeSender::new(secrets, blobs, String::new()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "syrus_workers=info".into()),
        )
        .init();

    let config_path = std::env::var("SYRUS_CONFIG").ok();
    let config = SyrusConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("config load failed ({}), using defaults", e);
        SyrusConfig::default()
    });

    let stage_name = std::env::var("SYRUS_STAGE_NAME").unwrap_or_else(|_| "configuring".to_string());

    let conn = Connection::open(&config.store.db_path)?;
    init_db(&conn)?;
    let campaigns = Arc::new(SqliteCampaignStore::new(conn)?);

    let dedup_conn = Connection::open(&config.store.db_path)?;
    let dedup = Arc::new(SqliteDedupStore::new(dedup_conn)?);

    let secrets: Arc<dyn syrus_store::SecretStore> = Arc::new(EnvSecretStore);
    let blobs: Arc<dyn syrus_store::BlobStore> = Arc::new(InMemoryBlobStore::default());
    let sender = build_sender(&config, secrets.clone(), blobs.clone());

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    info!(stage = %stage_name, "starting syrus-worker");

    match stage_name.as_str() {
        "configuring" => {
            let confirm_conn = Connection::open(&config.store.db_path)?;
            let confirmations = Arc::new(syrus_store::SqliteConfirmationStore::new(confirm_conn)?);
            let birthing_queue: Arc<InProcessQueue<BirthingMessage>> = Arc::new(InProcessQueue::new());
            let queue: Arc<dyn syrus_queue::Queue<ConfiguringMessage>> = Arc::new(InProcessQueue::new());
            syrus_workers::runtime::run_stage(queue, shutdown_rx, move |msg| {
                let campaigns = campaigns.clone();
                let confirmations = confirmations.clone();
                let birthing_queue = birthing_queue.clone();
                let sender = sender.clone();
                async move {
                    configuring::process(msg, campaigns.as_ref(), confirmations.as_ref(), birthing_queue.as_ref(), sender.as_ref()).await
                }
            })
            .await;
        }
        "birthing" => {
            let blueprint_queue: Arc<InProcessQueue<BlueprintMessage>> = Arc::new(InProcessQueue::new());
            let queue: Arc<dyn syrus_queue::Queue<BirthingMessage>> = Arc::new(InProcessQueue::new());
            let rng = Arc::new(EntropyRngSource);
            syrus_workers::runtime::run_stage(queue, shutdown_rx, move |msg| {
                let campaigns = campaigns.clone();
                let dedup = dedup.clone();
                let rng = rng.clone();
                let blueprint_queue = blueprint_queue.clone();
                let sender = sender.clone();
                async move {
                    birthing::process(msg, campaigns.as_ref(), dedup.as_ref(), rng.as_ref(), blueprint_queue.as_ref(), sender.as_ref()).await
                }
            })
            .await;
        }
        "blueprinting" => {
            let anthropic_key = secrets.get_optional("anthropic_api_key").unwrap_or_default();
            let openai_key = secrets.get_optional("openai_api_key").unwrap_or_default();
            let llm = Arc::new(AnthropicProvider::new(
                anthropic_key,
                config.vendors.anthropic.as_ref().map(|v| v.base_url.clone()),
            ));
            let images = Arc::new(OpenAiImageProvider::new(
                openai_key,
                config.vendors.openai.as_ref().map(|v| v.base_url.clone()),
            ));
            let image_queue: Arc<InProcessQueue<ImageGenMessage>> = Arc::new(InProcessQueue::new());
            let queue: Arc<dyn syrus_queue::Queue<BlueprintMessage>> = Arc::new(InProcessQueue::new());

            // The Imagegen fan-out has no dedicated stage binary (it folds
            // into Blueprinting, spec §0); run its poll loop as a second
            // task alongside the blueprint queue's, sharing every
            // collaborator except the queue polled.
            let (image_shutdown_tx, image_shutdown_rx) = watch::channel(false);
            let image_loop_queue: Arc<dyn syrus_queue::Queue<ImageGenMessage>> = image_queue.clone();
            {
                let campaigns = campaigns.clone();
                let dedup = dedup.clone();
                let blobs = blobs.clone();
                let secrets = secrets.clone();
                let llm = llm.clone();
                let images = images.clone();
                let sender = sender.clone();
                let image_queue = image_queue.clone();
                tokio::spawn(async move {
                    syrus_workers::runtime::run_stage(image_loop_queue, image_shutdown_rx, move |msg| {
                        let campaigns = campaigns.clone();
                        let dedup = dedup.clone();
                        let blobs = blobs.clone();
                        let secrets = secrets.clone();
                        let llm = llm.clone();
                        let images = images.clone();
                        let sender = sender.clone();
                        let image_queue = image_queue.clone();
                        async move {
                            let ctx = blueprinting::BlueprintingContext {
                                campaigns: campaigns.as_ref(),
                                dedup: dedup.as_ref(),
                                blobs: blobs.as_ref(),
                                secrets: secrets.as_ref(),
                                llm: llm.as_ref(),
                                images: images.as_ref(),
                                sender: sender.as_ref(),
                                image_queue: image_queue.as_ref(),
                            };
                            blueprinting::process_image_gen(msg, &ctx).await
                        }
                    })
                    .await;
                });
            }
            // Held for the remainder of main(); dropping it would close the
            // watch channel and spin the Imagegen loop's shutdown select arm.
            let _image_shutdown_tx = image_shutdown_tx;

            syrus_workers::runtime::run_stage(queue, shutdown_rx, move |msg| {
                let campaigns = campaigns.clone();
                let dedup = dedup.clone();
                let blobs = blobs.clone();
                let secrets = secrets.clone();
                let llm = llm.clone();
                let images = images.clone();
                let sender = sender.clone();
                let image_queue = image_queue.clone();
                async move {
                    let ctx = blueprinting::BlueprintingContext {
                        campaigns: campaigns.as_ref(),
                        dedup: dedup.as_ref(),
                        blobs: blobs.as_ref(),
                        secrets: secrets.as_ref(),
                        llm: llm.as_ref(),
                        images: images.as_ref(),
                        sender: sender.as_ref(),
                        image_queue: image_queue.as_ref(),
                    };
                    blueprinting::process(msg, &ctx).await
                }
            })
            .await;
        }
        "play" => {
            let queue: Arc<dyn syrus_queue::Queue<PlayMessage>> = Arc::new(InProcessQueue::new());
            syrus_workers::runtime::run_stage(queue, shutdown_rx, move |msg| {
                let campaigns = campaigns.clone();
                let dedup = dedup.clone();
                let sender = sender.clone();
                async move { play::process(msg, campaigns.as_ref(), dedup.as_ref(), sender.as_ref()).await }
            })
            .await;
        }
        other => {
            anyhow::bail!("unknown SYRUS_STAGE_NAME {other:?}, expected configuring|birthing|blueprinting|play");
        }
    }

    Ok(())
}
