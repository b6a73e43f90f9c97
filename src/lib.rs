pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use api::create_router;
pub use config::{AppConfig, LedgerConfig, ServerArgs};
pub use crate::core::{command::CommandBuilder, gateway::LedgerGateway, invoker::SorobanCli};
pub use utils::error::{GatewayError, Result};
