//! Typed endpoint surface
//!
//! One method per backend route. No logic beyond path/query/body mapping,
//! except bot commands which report stale queries on success.

use tracing::info;

use crate::cache::BotCommand;
use crate::client::DashboardClient;
use crate::error::Result;
use crate::request::RequestDescriptor;
use crate::types::{
    AiDecision, AiDecisionHistory, BotCommandResponse, BotConfiguration, BotStatus,
    ManualTradeRequest, ManualTradeResponse, Page, PortfolioHistory, PortfolioSnapshot,
    SystemHealth, SystemLogs, TradeHistory,
};

impl DashboardClient {
    // Bot

    /// GET /bot/status
    pub async fn bot_status(&self) -> Result<BotStatus> {
        self.get("/bot/status").await
    }

    /// POST a control command, then invalidate the queries it makes stale
    pub async fn send_bot_command(&self, command: BotCommand) -> Result<BotCommandResponse> {
        let response: Option<BotCommandResponse> =
            self.request(RequestDescriptor::post(command.path())).await?;

        info!("Bot command {:?} accepted", command);

        if let Some(invalidator) = self.invalidator() {
            for key in command.invalidates() {
                invalidator.invalidate(*key);
            }
        }

        Ok(response.unwrap_or_default())
    }

    /// POST /bot/start
    pub async fn start_bot(&self) -> Result<BotCommandResponse> {
        self.send_bot_command(BotCommand::Start).await
    }

    /// POST /bot/stop
    pub async fn stop_bot(&self) -> Result<BotCommandResponse> {
        self.send_bot_command(BotCommand::Stop).await
    }

    /// POST /bot/emergency-stop
    pub async fn emergency_stop(&self) -> Result<BotCommandResponse> {
        self.send_bot_command(BotCommand::EmergencyStop).await
    }

    // Portfolio

    /// GET /portfolio/snapshot
    pub async fn portfolio_snapshot(&self) -> Result<PortfolioSnapshot> {
        self.get("/portfolio/snapshot").await
    }

    /// GET /portfolio/history?days=N
    pub async fn portfolio_history(&self, days: Option<u32>) -> Result<PortfolioHistory> {
        self.request(RequestDescriptor::get("/portfolio/history").query_opt("days", days))
            .await
    }

    // Trades

    /// GET /trades/history?limit=L&offset=O
    pub async fn trade_history(&self, page: Page) -> Result<TradeHistory> {
        self.request(
            RequestDescriptor::get("/trades/history")
                .query("limit", page.limit)
                .query("offset", page.offset),
        )
        .await
    }

    /// POST /trades/manual
    pub async fn manual_trade(&self, trade: &ManualTradeRequest) -> Result<ManualTradeResponse> {
        let response: Option<ManualTradeResponse> = self
            .request(RequestDescriptor::post("/trades/manual").json(trade)?)
            .await?;
        Ok(response.unwrap_or_default())
    }

    // AI decisions

    /// GET /ai-decisions/history?limit&offset
    pub async fn ai_decision_history(&self, page: Page) -> Result<AiDecisionHistory> {
        self.request(
            RequestDescriptor::get("/ai-decisions/history")
                .query("limit", page.limit)
                .query("offset", page.offset),
        )
        .await
    }

    /// GET /ai-decisions/{id}
    pub async fn ai_decision(&self, id: &str) -> Result<AiDecision> {
        self.get(&format!("/ai-decisions/{}", urlencoding::encode(id)))
            .await
    }

    // Configuration

    /// GET /config
    pub async fn get_config(&self) -> Result<BotConfiguration> {
        self.get("/config").await
    }

    /// POST /config, returns the stored document
    pub async fn update_config(&self, config: &BotConfiguration) -> Result<BotConfiguration> {
        let stored: Option<BotConfiguration> = self
            .request(RequestDescriptor::post("/config").json(config)?)
            .await?;
        Ok(stored.unwrap_or_else(|| config.clone()))
    }

    // System

    /// GET /system/health
    pub async fn system_health(&self) -> Result<SystemHealth> {
        self.get("/system/health").await
    }

    /// GET /system/logs?limit&service_filter
    pub async fn system_logs(
        &self,
        limit: Option<u32>,
        service_filter: Option<&str>,
    ) -> Result<SystemLogs> {
        self.request(
            RequestDescriptor::get("/system/logs")
                .query_opt("limit", limit)
                .query_opt("service_filter", service_filter),
        )
        .await
    }
}
