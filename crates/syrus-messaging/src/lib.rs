pub mod attachment;
pub mod discord;
pub mod error;
pub mod sender;
pub mod types;
pub mod whatsapp;

pub use discord::DiscordLikeSender;
pub use error::{MessagingError, Result};
pub use sender::{split_chunks, ChannelSender};
pub use types::{Attachment, OutboundMessage};
pub use whatsapp::WhatsAppLikeSender;
