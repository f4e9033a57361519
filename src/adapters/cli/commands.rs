//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the intern quant ranker.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::adapters::pump_studio::PumpStudioClient;
use crate::adapters::quant::HeuristicAnalyzer;
use crate::application::{RankSession, SessionConfig, SessionReport};
use crate::config::{load_config, Config};
use crate::domain::{AnalysisResult, MarketTab, RecencyIndex, Snapshot, TradeSignal};
use crate::ports::{Analyzer, CatalogPort, PaperDeskPort, PaperPortfolio};
use crate::strategy::TradeEvaluator;

/// intern - Quant ranker for Pump Studio
#[derive(Parser, Debug)]
#[command(
    name = "intern",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Quant ranker for Pump Studio",
    long_about = "intern discovers tokens on the Pump Studio market, scores their DataPoint \
                  snapshots and submits the analyses for XP, paced to the submission quota. \
                  Accepted analyses can also be mirrored as paper trades."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a timed ranking session
    Rank(RankCmd),

    /// Fetch, analyze and evaluate a single token without submitting
    Evaluate(EvaluateCmd),

    /// Show the paper trading portfolio
    Portfolio(PortfolioCmd),
}

/// Run a ranking session
#[derive(Parser, Debug)]
pub struct RankCmd {
    /// One partition pass per tab, then exit
    #[arg(long)]
    pub once: bool,

    /// Override the session budget in minutes
    #[arg(long, value_name = "MINUTES")]
    pub duration_minutes: Option<u64>,

    /// Override the tabs to rotate through (comma separated)
    #[arg(long, value_name = "TABS", value_delimiter = ',')]
    pub tabs: Option<Vec<MarketTab>>,

    /// Override tokens per partition pass
    #[arg(long, value_name = "N")]
    pub count: Option<usize>,

    /// Force paper trading on, regardless of [paper] enabled
    #[arg(short, long)]
    pub paper: bool,

    /// Write the final session report as JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

/// Evaluate one token
#[derive(Parser, Debug)]
pub struct EvaluateCmd {
    /// Token mint address
    #[arg(value_name = "MINT")]
    pub mint: String,
}

/// Show paper portfolio
#[derive(Parser, Debug)]
pub struct PortfolioCmd {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Snapshot, analysis and trade decision for one token
#[derive(Debug, Serialize)]
pub struct Evaluation {
    pub snapshot: Snapshot,
    pub analysis: AnalysisResult,
    pub signal: TradeSignal,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let loaded = load_config(&app.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.as_str())
        .unwrap_or("info");
    init_logging(app.verbose, app.debug, level);

    let config = loaded.with_context(|| {
        format!("Failed to load configuration from {}", app.config.display())
    })?;

    match app.command {
        Command::Rank(cmd) => rank_command(cmd, &config).await,
        Command::Evaluate(cmd) => evaluate_command(cmd, &config).await,
        Command::Portfolio(cmd) => portfolio_command(cmd, &config).await,
    }
}

/// Initialize logging system. `RUST_LOG` wins, then the flags, then the
/// configured level.
fn init_logging(verbose: bool, debug: bool, config_level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let fallback = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        config_level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests, embedding) is not an error
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn build_client(config: &Config) -> Result<Arc<PumpStudioClient>> {
    let client_config = config.api.client_config()?;
    let client =
        PumpStudioClient::with_config(client_config).context("Failed to create Pump Studio client")?;
    Ok(Arc::new(client))
}

/// Session settings after command-line overrides
fn session_config(cmd: &RankCmd, config: &Config) -> Result<SessionConfig> {
    let mut session = SessionConfig::from(config);
    if let Some(minutes) = cmd.duration_minutes {
        let secs = minutes
            .checked_mul(60)
            .with_context(|| format!("--duration-minutes {} is too large", minutes))?;
        session.session_budget = Duration::from_secs(secs);
    }
    if let Some(ref tabs) = cmd.tabs {
        session.tabs = tabs.clone();
    }
    if let Some(count) = cmd.count {
        session.items_per_partition = count;
    }
    Ok(session)
}

/// Session deadline `budget` from now
fn session_deadline(budget: Duration) -> Result<Instant> {
    Instant::now()
        .checked_add(budget)
        .with_context(|| format!("Session budget {:?} is too large", budget))
}

/// Handle rank command
async fn rank_command(cmd: RankCmd, config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let session_config = session_config(&cmd, config)?;
    anyhow::ensure!(!session_config.tabs.is_empty(), "--tabs cannot be empty");
    anyhow::ensure!(session_config.items_per_partition > 0, "--count must be > 0");

    tracing::info!("Starting intern quant ranker...");
    tracing::info!("Config: {}", config_label(config));

    let catalog: Arc<dyn CatalogPort> = client.clone();
    let analyzer: Arc<dyn Analyzer> = Arc::new(HeuristicAnalyzer::default());
    let evaluator = TradeEvaluator::new(config.trader.clone());
    let recency = RecencyIndex::new(session_config.freshness_ttl);
    let tabs = session_config.tabs.clone();
    let deadline = session_deadline(session_config.session_budget)?;

    let mut session = RankSession::new(catalog, analyzer, evaluator, session_config, recency);
    if cmd.paper || config.paper.enabled {
        tracing::warn!("PAPER TRADING enabled - accepted signals are mirrored as paper trades");
        let desk: Arc<dyn PaperDeskPort> = client;
        session = session.with_paper_desk(desk);
    }

    let report = if cmd.once {
        session.run_single_pass(&tabs, deadline).await
    } else {
        session.run_session(&tabs, deadline).await
    };

    if let Some(ref path) = cmd.report {
        write_report(path, &report)?;
    }

    Ok(())
}

fn config_label(config: &Config) -> String {
    format!(
        "{} | quota {}/min | cooldown {}ms",
        config.api.base_url, config.session.quota_per_minute, config.session.cooldown_ms
    )
}

fn write_report(path: &Path, report: &SessionReport) -> Result<()> {
    let raw = path.to_string_lossy();
    let path = PathBuf::from(shellexpand::tilde(&raw).as_ref());
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write session report to {}", path.display()))?;
    tracing::info!("Session report written to {}", path.display());
    Ok(())
}

/// Handle evaluate command
async fn evaluate_command(cmd: EvaluateCmd, config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let evaluation = evaluate_mint(
        client.as_ref(),
        &HeuristicAnalyzer::default(),
        &TradeEvaluator::new(config.trader.clone()),
        &cmd.mint,
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    Ok(())
}

/// Snapshot -> analysis -> trade signal for one mint, without submitting
pub async fn evaluate_mint(
    catalog: &dyn CatalogPort,
    analyzer: &dyn Analyzer,
    evaluator: &TradeEvaluator,
    mint: &str,
) -> Result<Evaluation> {
    let snapshot = catalog
        .fetch_snapshot(mint)
        .await
        .with_context(|| format!("Failed to fetch snapshot for {}", mint))?;
    let analysis = analyzer.analyze(&snapshot);
    let signal = evaluator.evaluate(&snapshot, &analysis);

    Ok(Evaluation {
        snapshot,
        analysis,
        signal,
    })
}

/// Handle portfolio command
async fn portfolio_command(cmd: PortfolioCmd, config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let portfolio = client
        .portfolio()
        .await
        .context("Failed to fetch paper portfolio")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&portfolio)?);
    } else {
        print!("{}", render_portfolio(&portfolio));
    }
    Ok(())
}

fn render_portfolio(portfolio: &PaperPortfolio) -> String {
    let mut out = String::new();
    out.push_str("======================================\n");
    out.push_str("    Paper Portfolio\n");
    out.push_str("======================================\n");
    out.push_str(&format!("  Balance:   {:.4} SOL\n", portfolio.balance_sol));
    out.push_str(&format!("  Total PnL: {:+.4} SOL\n", portfolio.total_pnl_sol));
    out.push_str(&format!("  Holdings:  {}\n", portfolio.holdings.len()));

    for (i, holding) in portfolio.holdings.iter().enumerate() {
        let pnl = holding
            .pnl_pct
            .map(|p| format!("{:+.1}%", p))
            .unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!(
            "    {}. {} ({}) {:.4} SOL [{}] {}\n",
            i + 1,
            holding.symbol,
            holding.mint,
            holding.sol_invested,
            holding.strategy.as_deref().unwrap_or("-"),
            pnl
        ));
    }
    out.push_str("======================================\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::{tradeable_snapshot, FixedAnalyzer, MockCatalog};
    use crate::ports::PaperHolding;

    #[test]
    fn test_cli_app_parse_rank() {
        let args = vec!["intern", "rank", "--config", "test.toml"];
        let app = CliApp::try_parse_from(args).unwrap();

        assert_eq!(app.config, PathBuf::from("test.toml"));
        match app.command {
            Command::Rank(cmd) => {
                assert!(!cmd.once);
                assert!(!cmd.paper);
                assert!(cmd.tabs.is_none());
            }
            _ => panic!("Expected Rank command"),
        }
    }

    #[test]
    fn test_cli_app_default_config() {
        let app = CliApp::try_parse_from(["intern", "portfolio"]).unwrap();
        assert_eq!(app.config, PathBuf::from("config/default.toml"));
        assert!(matches!(app.command, Command::Portfolio(PortfolioCmd { json: false })));
    }

    #[test]
    fn test_cli_app_parse_rank_overrides() {
        let args = vec![
            "intern", "-v", "rank", "--once", "--tabs", "live,graduated", "--count", "3",
            "--duration-minutes", "15",
        ];
        let app = CliApp::try_parse_from(args).unwrap();
        assert!(app.verbose);

        match app.command {
            Command::Rank(cmd) => {
                assert!(cmd.once);
                assert_eq!(cmd.tabs, Some(vec![MarketTab::Live, MarketTab::Graduated]));
                assert_eq!(cmd.count, Some(3));
                assert_eq!(cmd.duration_minutes, Some(15));

                let session = session_config(&cmd, &Config::default()).unwrap();
                assert_eq!(session.items_per_partition, 3);
                assert_eq!(session.session_budget, Duration::from_secs(15 * 60));
                assert_eq!(session.tabs, vec![MarketTab::Live, MarketTab::Graduated]);
            }
            _ => panic!("Expected Rank command"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_duration_is_an_error() {
        let minutes = u64::MAX.to_string();
        let app = CliApp::try_parse_from(["intern", "rank", "--duration-minutes", minutes.as_str()])
            .unwrap();
        let Command::Rank(cmd) = app.command else {
            panic!("Expected Rank command");
        };
        let err = session_config(&cmd, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("too large"), "{}", err);

        assert!(session_deadline(Duration::MAX).is_err());
        assert!(session_deadline(Duration::from_secs(60 * 60)).is_ok());
    }

    #[test]
    fn test_cli_app_rejects_unknown_tab() {
        let result = CliApp::try_parse_from(["intern", "rank", "--tabs", "trending"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_app_parse_evaluate() {
        let app = CliApp::try_parse_from(["intern", "evaluate", "So1Mint", "--debug"]).unwrap();
        assert!(app.debug);
        match app.command {
            Command::Evaluate(cmd) => assert_eq!(cmd.mint, "So1Mint"),
            _ => panic!("Expected Evaluate command"),
        }
    }

    #[tokio::test]
    async fn test_evaluate_mint_does_not_submit() {
        let catalog = MockCatalog::new().with_snapshot(tradeable_snapshot("m1"));
        let evaluation = evaluate_mint(
            &catalog,
            &FixedAnalyzer::bullish(),
            &TradeEvaluator::default(),
            "m1",
        )
        .await
        .unwrap();

        assert!(evaluation.signal.should_trade);
        assert_eq!(evaluation.snapshot.mint, "m1");
        assert!(catalog.submitted_mints().is_empty());

        let json = serde_json::to_value(&evaluation).unwrap();
        assert!(json.get("snapshot").is_some());
        assert_eq!(json["signal"]["shouldTrade"], true);
    }

    #[tokio::test]
    async fn test_evaluate_mint_fetch_error() {
        let catalog = MockCatalog::new().with_fetch_error("m1");
        let result = evaluate_mint(
            &catalog,
            &FixedAnalyzer::bullish(),
            &TradeEvaluator::default(),
            "m1",
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_render_portfolio() {
        let portfolio = PaperPortfolio {
            balance_sol: 12.5,
            total_pnl_sol: -0.25,
            holdings: vec![PaperHolding {
                mint: "m1".to_string(),
                symbol: "ABC".to_string(),
                strategy: Some("graduation".to_string()),
                sol_invested: 2.0,
                pnl_pct: Some(12.34),
            }],
        };
        let out = render_portfolio(&portfolio);
        assert!(out.contains("12.5000 SOL"));
        assert!(out.contains("-0.2500 SOL"));
        assert!(out.contains("1. ABC (m1) 2.0000 SOL [graduation] +12.3%"));
    }
}
