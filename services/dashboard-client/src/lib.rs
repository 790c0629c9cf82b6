//! Dashboard Client Library
//!
//! Authenticated HTTP client for the Trawling Traders dashboard backend.

pub mod cache;
pub mod client;
pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod pipeline;
pub mod poller;
pub mod request;
pub mod transport;
pub mod types;


// Re-export main types for convenience
pub use cache::{BotCommand, CacheInvalidator, InvalidationLog, QueryKey};
pub use client::DashboardClient;
pub use config::ClientConfig;
pub use credentials::{AccessToken, CredentialContext, SharedCredentials, StaticCredentials};
pub use error::{ClientError, CredentialError, Result};
pub use poller::{spawn_status_poller, StatusUpdate, BOT_STATUS_POLL_INTERVAL};
pub use request::RequestDescriptor;
pub use transport::ResponseEnvelope;
pub use types::{
    AiDecision, AiDecisionHistory, BotCommandResponse, BotConfiguration, BotStatus,
    ManualTradeRequest, ManualTradeResponse, Page, PortfolioHistory, PortfolioSnapshot,
    SystemHealth, SystemLogs, Trade, TradeHistory, TradeSide,
};
