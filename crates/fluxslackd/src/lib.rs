//! fluxslackd: receives Flux events over HTTP and forwards them to Slack.

pub mod config;
pub mod server;

pub use config::Cli;
pub use server::{create_router, start_server, EVENT_PATH};
