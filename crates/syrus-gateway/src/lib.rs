//! Entry Gateway (spec §4.1): single HTTP entry point for both chat-platform
//! dialects. Split into a library + thin binary, matching `syrus-workers`,
//! so the router is directly testable without spawning a process.

pub mod app;
pub mod discord;
pub mod dispatch;
pub mod http;
pub mod options;
pub mod verify;
pub mod whatsapp;
