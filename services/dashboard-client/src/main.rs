//! Dashboard CLI - drive the trading bot backend from a terminal
//!
//! Usage: dashboard-cli <command> [args]
//!
//! Reads `DASHBOARD_BASE_URL`, `DASHBOARD_TIMEOUT_MS`, optional
//! `DASHBOARD_CONFIG` (TOML file) and `DASHBOARD_ACCESS_TOKEN`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};

use dashboard_client::{
    spawn_status_poller, BotConfiguration, ClientConfig, DashboardClient,
    ManualTradeRequest, Page, SharedCredentials, StaticCredentials, TradeSide,
    BOT_STATUS_POLL_INTERVAL,
};

const USAGE: &str = "usage: dashboard-cli <status|start|stop|emergency-stop|portfolio|history [days]|\
trades [limit] [offset]|trade <pair> <BUY|SELL> <amount_usd>|decisions [limit] [offset]|\
decision <id>|config|set-config <json>|health|logs [limit] [service]|watch>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let config_path = std::env::var("DASHBOARD_CONFIG").ok().map(PathBuf::from);
    let config = ClientConfig::load(config_path.as_deref())?;
    info!("Dashboard backend: {}", config.base_url());

    let credentials: SharedCredentials =
        Arc::new(StaticCredentials::from_env("DASHBOARD_ACCESS_TOKEN"));
    let client = Arc::new(DashboardClient::new(config)?.with_credentials(credentials));

    if let Err(e) = run(client, command, &args[1..]).await {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(client: Arc<DashboardClient>, command: &str, rest: &[String]) -> anyhow::Result<()> {
    match command {
        "status" => print_json(&client.bot_status().await?),
        "start" => print_json(&client.start_bot().await?),
        "stop" => print_json(&client.stop_bot().await?),
        "emergency-stop" => print_json(&client.emergency_stop().await?),
        "portfolio" => print_json(&client.portfolio_snapshot().await?),
        "history" => {
            let days = parse_opt::<u32>(rest.first(), "days")?;
            print_json(&client.portfolio_history(days).await?)
        }
        "trades" => print_json(&client.trade_history(parse_page(rest)?).await?),
        "trade" => {
            let [pair, side, amount] = rest else {
                return Err(anyhow!("trade needs <pair> <BUY|SELL> <amount_usd>"));
            };
            let side: TradeSide = side.parse()?;
            let amount: Decimal = amount
                .parse()
                .with_context(|| format!("Invalid amount: {}", amount))?;
            let trade = ManualTradeRequest::new(pair, side, amount)?;
            print_json(&client.manual_trade(&trade).await?)
        }
        "decisions" => print_json(&client.ai_decision_history(parse_page(rest)?).await?),
        "decision" => {
            let id = rest.first().ok_or_else(|| anyhow!("decision needs <id>"))?;
            print_json(&client.ai_decision(id).await?)
        }
        "config" => print_json(&client.get_config().await?),
        "set-config" => {
            let raw = rest.first().ok_or_else(|| anyhow!("set-config needs <json>"))?;
            let doc: BotConfiguration =
                serde_json::from_str(raw).context("Config must be a JSON object")?;
            print_json(&client.update_config(&doc).await?)
        }
        "health" => print_json(&client.system_health().await?),
        "logs" => {
            let limit = parse_opt::<u32>(rest.first(), "limit")?;
            let service = rest.get(1).map(String::as_str);
            print_json(&client.system_logs(limit, service).await?)
        }
        "watch" => watch(client).await,
        other => Err(anyhow!("Unknown command: {}\n{}", other, USAGE)),
    }
}

/// Print bot status every poll until interrupted
async fn watch(client: Arc<DashboardClient>) -> anyhow::Result<()> {
    let (mut updates, handle) = spawn_status_poller(client, BOT_STATUS_POLL_INTERVAL);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let update = updates.borrow_and_update().clone();
                if let Some(update) = update {
                    match (&update.status, &update.error) {
                        (Some(status), _) => print_json(status)?,
                        (None, Some(e)) => eprintln!("{} poll failed: {}", update.fetched_at, e),
                        (None, None) => {}
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                break;
            }
        }
    }

    drop(updates);
    handle.await.context("Poller task failed")?;
    Ok(())
}

fn parse_opt<T: std::str::FromStr>(raw: Option<&String>, name: &str) -> anyhow::Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    raw.map(|v| {
        v.parse::<T>()
            .map_err(|e| anyhow!("Invalid {} '{}': {}", name, v, e))
    })
    .transpose()
}

fn parse_page(rest: &[String]) -> anyhow::Result<Page> {
    let defaults = Page::default();
    Ok(Page::new(
        parse_opt(rest.first(), "limit")?.unwrap_or(defaults.limit),
        parse_opt(rest.get(1), "offset")?.unwrap_or(defaults.offset),
    ))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
