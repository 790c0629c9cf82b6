//! Request/response types for the dashboard API
//!
//! Response types keep a typed core and collect anything else the backend
//! sends into `extra`, so new server fields never break decoding.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::{ClientError, Result};

/// Unrecognised fields, kept verbatim
pub type Extra = BTreeMap<String, serde_json::Value>;

/// Default page size for history endpoints
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Backend ids arrive as numbers or strings depending on the table
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Signed(n) => n.to_string(),
        Id::Unsigned(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    })
}

/// Pagination for history endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

// Bot

/// Current bot state (GET /bot/status)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotStatus {
    /// Whether the trading loop is running
    pub is_running: bool,
    /// Backend status label ("running", "stopped", "emergency_stopped", ...)
    pub status: String,
    pub uptime_seconds: Option<u64>,
    pub last_trade_at: Option<DateTime<Utc>>,
    pub open_positions: Option<u32>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Acknowledgement for start/stop/emergency-stop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotCommandResponse {
    pub success: bool,
    pub message: Option<String>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

// Portfolio

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioPosition {
    pub pair: String,
    pub quantity: Decimal,
    pub value_usd: Decimal,
    pub avg_entry_price: Option<Decimal>,
    pub unrealized_pnl_usd: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Point-in-time portfolio (GET /portfolio/snapshot)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioSnapshot {
    /// Total equity in USD
    pub total_value_usd: Decimal,
    /// Uninvested cash
    pub cash_usd: Decimal,
    pub positions: Vec<PortfolioPosition>,
    pub pnl_24h_usd: Option<Decimal>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioHistoryPoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub total_value_usd: Decimal,
    pub pnl_usd: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Equity curve (GET /portfolio/history)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioHistory {
    pub days: Option<u32>,
    pub history: Vec<PortfolioHistoryPoint>,
    #[serde(flatten)]
    pub extra: Extra,
}

// Trades

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    #[default]
    Buy,
    Sell,
}

impl std::str::FromStr for TradeSide {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(TradeSide::Buy),
            "SELL" => Ok(TradeSide::Sell),
            other => Err(ClientError::InvalidRequest(format!(
                "trade type must be BUY or SELL, got {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Trade {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub pair: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub amount_usd: Decimal,
    pub price: Option<Decimal>,
    pub status: Option<String>,
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Page of executed trades (GET /trades/history)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeHistory {
    pub trades: Vec<Trade>,
    pub total: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Body for POST /trades/manual
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualTradeRequest {
    pub pair: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    /// Sent as a JSON number
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_usd: Decimal,
}

impl ManualTradeRequest {
    pub fn new(pair: &str, side: TradeSide, amount_usd: Decimal) -> Result<Self> {
        let pair = pair.trim();
        if pair.is_empty() {
            return Err(ClientError::InvalidRequest("trade pair is empty".to_string()));
        }
        if amount_usd <= Decimal::ZERO {
            return Err(ClientError::InvalidRequest(format!(
                "trade amount must be positive, got {}",
                amount_usd
            )));
        }
        Ok(Self {
            pair: pair.to_string(),
            side,
            amount_usd,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualTradeResponse {
    pub success: bool,
    pub message: Option<String>,
    pub trade: Option<Trade>,
    #[serde(flatten)]
    pub extra: Extra,
}

// AI decisions

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiDecision {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub pair: Option<String>,
    /// BUY / SELL / HOLD
    pub action: Option<String>,
    pub confidence: Option<f64>,
    pub reasoning: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Page of AI decisions (GET /ai-decisions/history)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiDecisionHistory {
    pub decisions: Vec<AiDecision>,
    pub total: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

// Configuration

/// Bot configuration document. The backend owns the schema; the client
/// passes it through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotConfiguration(pub serde_json::Map<String, serde_json::Value>);

impl BotConfiguration {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: &str, value: serde_json::Value) {
        self.0.insert(key.to_string(), value);
    }
}

// System

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceHealth {
    pub status: String,
    pub message: Option<String>,
    pub latency_ms: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// GET /system/health
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemHealth {
    pub status: String,
    pub services: BTreeMap<String, ServiceHealth>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    pub timestamp: Option<DateTime<Utc>>,
    pub level: String,
    pub service: Option<String>,
    pub message: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// GET /system/logs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemLogs {
    pub logs: Vec<LogEntry>,
    #[serde(flatten)]
    pub extra: Extra,
}
