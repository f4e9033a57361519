//! Rank Session
//!
//! Continuous discover -> fetch -> analyze -> submit loop, paced by a
//! per-minute submission quota and bounded by a wall-clock deadline.
//!
//! Key behaviors:
//! - Lookahead-1 pipeline: the snapshot for token i+1 is fetched while
//!   token i is analyzed and submitted
//! - Fixed cooldown after every submission (never faster than the quota),
//!   held across partition passes and rotations
//! - Recency index pruned at the start of each partition pass; tokens seen
//!   inside the freshness TTL are skipped
//! - Deadline checked before each partition pass and before each token step
//! - Discovery errors abort one partition pass; fetch and submission errors
//!   affect one token; neither stops the session
//! - Accepted trade signals are forwarded to the paper desk when one is set

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::{sleep_until, Instant};

use crate::application::lookahead::Lookahead;
use crate::domain::{CatalogItem, MarketTab, RecencyIndex, Snapshot, TradeSignal};
use crate::ports::{Analyzer, CatalogError, CatalogPort, PaperDeskPort, PaperOrder};
use crate::strategy::TradeEvaluator;

/// Minimum spacing between submissions for a per-minute quota:
/// `ceil(60s / quota)`. A zero quota is treated as one per minute.
pub fn cooldown_for_quota(quota_per_minute: u32) -> Duration {
    let quota = u64::from(quota_per_minute.max(1));
    Duration::from_millis((60_000 + quota - 1) / quota)
}

/// `from + wait`, truncated at `deadline`
fn wake_at(from: Instant, wait: Duration, deadline: Instant) -> Instant {
    from.checked_add(wait).map_or(deadline, |wake| wake.min(deadline))
}

/// Session tuning, built from the `[session]` config section
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Tokens requested from discovery per partition pass
    pub items_per_partition: usize,
    /// Pause after each submission
    pub cooldown: Duration,
    /// Accepted submissions per minute allowed upstream
    pub quota_per_minute: u32,
    /// Wall-clock budget of a session
    pub session_budget: Duration,
    /// Minimum time before a token may be processed again
    pub freshness_ttl: Duration,
    /// Pause between full rotations through the tabs
    pub rotation_pause: Duration,
    /// Partitions to rotate through, in order
    pub tabs: Vec<MarketTab>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            items_per_partition: 5,
            cooldown: Duration::from_secs(65),
            quota_per_minute: 1,
            session_budget: Duration::from_secs(60 * 60),
            freshness_ttl: Duration::from_secs(30 * 60),
            rotation_pause: Duration::from_secs(30),
            tabs: vec![MarketTab::All],
        }
    }
}

/// Counts for one partition pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PartitionOutcome {
    /// Token steps started
    pub processed: usize,
    /// Submissions accepted upstream
    pub submitted: usize,
    /// Submissions answered with `accepted == false`
    pub rejected: usize,
    /// Discovery, fetch and submission failures
    pub errors: usize,
    /// Accepted paper-trade signals
    pub trade_signals: usize,
    pub reward_total: f64,
}

impl PartitionOutcome {
    fn record(&mut self, step: &StepRecord) {
        self.processed += 1;
        match step.status {
            StepStatus::Submitted { reward } => {
                self.submitted += 1;
                self.reward_total += reward;
            }
            StepStatus::Rejected => self.rejected += 1,
            StepStatus::Failed => self.errors += 1,
        }
        if step.trade_signal {
            self.trade_signals += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StepStatus {
    Submitted { reward: f64 },
    Rejected,
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct StepRecord {
    status: StepStatus,
    trade_signal: bool,
}

impl StepRecord {
    fn failed() -> Self {
        Self {
            status: StepStatus::Failed,
            trade_signal: false,
        }
    }
}

/// Aggregated results of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Outer rotations entered
    pub cycles: u32,
    /// Partition passes run
    pub partitions: usize,
    pub processed: usize,
    pub submitted: usize,
    pub rejected: usize,
    pub errors: usize,
    pub trade_signals: usize,
    pub reward_total: f64,
    pub elapsed: Duration,
}

impl SessionReport {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            cycles: 0,
            partitions: 0,
            processed: 0,
            submitted: 0,
            rejected: 0,
            errors: 0,
            trade_signals: 0,
            reward_total: 0.0,
            elapsed: Duration::ZERO,
        }
    }

    fn absorb(&mut self, outcome: &PartitionOutcome) {
        self.partitions += 1;
        self.processed += outcome.processed;
        self.submitted += outcome.submitted;
        self.rejected += outcome.rejected;
        self.errors += outcome.errors;
        self.trade_signals += outcome.trade_signals;
        self.reward_total += outcome.reward_total;
    }

    fn finish(&mut self, elapsed: Duration) {
        self.finished_at = Utc::now();
        self.elapsed = elapsed;
    }

    /// Accepted submissions per hour of elapsed session time
    pub fn hourly_rate(&self) -> f64 {
        let hours = self.elapsed.as_secs_f64() / 3600.0;
        if hours <= 0.0 {
            return 0.0;
        }
        self.submitted as f64 / hours
    }

    /// Hourly rate extrapolated to 24 hours
    pub fn projected_daily(&self) -> f64 {
        self.hourly_rate() * 24.0
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "Session complete - cycles: {}, submitted: {}/{}, rejected: {}, errors: {}, reward: +{} XP, elapsed: {:.1}m",
            self.cycles,
            self.submitted,
            self.processed,
            self.rejected,
            self.errors,
            self.reward_total,
            self.elapsed.as_secs_f64() / 60.0
        );
        tracing::info!(
            "Throughput - {:.1} submissions/hour, projected {:.0}/day, {} paper signals",
            self.hourly_rate(),
            self.projected_daily(),
            self.trade_signals
        );
    }
}

/// Pipelined ranking session
pub struct RankSession {
    catalog: Arc<dyn CatalogPort>,
    analyzer: Arc<dyn Analyzer>,
    evaluator: TradeEvaluator,
    paper_desk: Option<Arc<dyn PaperDeskPort>>,
    config: SessionConfig,
    cooldown: Duration,
    recency: RecencyIndex,
    last_submission: Option<Instant>,
}

impl RankSession {
    pub fn new(
        catalog: Arc<dyn CatalogPort>,
        analyzer: Arc<dyn Analyzer>,
        evaluator: TradeEvaluator,
        config: SessionConfig,
        recency: RecencyIndex,
    ) -> Self {
        let floor = cooldown_for_quota(config.quota_per_minute);
        let cooldown = if config.cooldown < floor {
            tracing::warn!(
                "Cooldown {:?} is faster than the quota of {}/min allows, using {:?}",
                config.cooldown,
                config.quota_per_minute,
                floor
            );
            floor
        } else {
            config.cooldown
        };

        Self {
            catalog,
            analyzer,
            evaluator,
            paper_desk: None,
            config,
            cooldown,
            recency,
            last_submission: None,
        }
    }

    /// Forward accepted trade signals to a paper desk
    pub fn with_paper_desk(mut self, desk: Arc<dyn PaperDeskPort>) -> Self {
        self.paper_desk = Some(desk);
        self
    }

    /// Effective cooldown between submissions
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn recency(&self) -> &RecencyIndex {
        &self.recency
    }

    /// Rotate through `tabs` until `deadline`, then report
    pub async fn run_session(&mut self, tabs: &[MarketTab], deadline: Instant) -> SessionReport {
        self.run(tabs, deadline, None).await
    }

    /// One partition pass per tab, bounded by `deadline`
    pub async fn run_single_pass(&mut self, tabs: &[MarketTab], deadline: Instant) -> SessionReport {
        self.run(tabs, deadline, Some(1)).await
    }

    async fn run(&mut self, tabs: &[MarketTab], deadline: Instant, max_cycles: Option<u32>) -> SessionReport {
        let started = Instant::now();
        let mut report = SessionReport::start();

        let tab_names: Vec<&str> = tabs.iter().map(|t| t.as_str()).collect();
        tracing::info!(
            "Starting rank session - analyzer: {}, tabs: [{}], tokens/tab: {}, cooldown: {:?}, budget: {:?}",
            self.analyzer.name(),
            tab_names.join(", "),
            self.config.items_per_partition,
            self.cooldown,
            deadline.saturating_duration_since(started)
        );
        if tabs.is_empty() {
            tracing::warn!("No tabs configured, nothing to rank");
        }

        'session: while !tabs.is_empty() && Instant::now() < deadline {
            report.cycles += 1;
            let cycle = report.cycles;

            for &tab in tabs {
                if Instant::now() >= deadline {
                    break 'session;
                }
                let outcome = self
                    .process_partition(tab, self.config.items_per_partition, cycle, deadline)
                    .await;
                report.absorb(&outcome);
            }

            if max_cycles.is_some_and(|max| cycle >= max) {
                break;
            }

            let now = Instant::now();
            let wake = wake_at(now, self.config.rotation_pause, deadline);
            tracing::info!(
                "[cycle {}] rotation complete, pausing {:?} ({} tokens in recency index)",
                cycle,
                wake.saturating_duration_since(now),
                self.recency.len()
            );
            sleep_until(wake).await;
        }

        report.finish(started.elapsed());
        report.log_summary();
        report
    }

    /// Discover up to `target_count` tokens in `tab` and run each fresh one
    /// through the pipeline. Stops early, keeping what was recorded, once
    /// `deadline` has passed.
    pub async fn process_partition(
        &mut self,
        tab: MarketTab,
        target_count: usize,
        cycle: u32,
        deadline: Instant,
    ) -> PartitionOutcome {
        let mut outcome = PartitionOutcome::default();

        tracing::info!("[cycle {}] DISCOVER  {} tokens from '{}'", cycle, target_count, tab);
        let discovered = match self.catalog.discover(tab, target_count).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("[cycle {}] {}", cycle, e);
                outcome.errors = 1;
                return outcome;
            }
        };
        if discovered.is_empty() {
            tracing::info!("[cycle {}] no tokens found in '{}'", cycle, tab);
            return outcome;
        }

        let now = Instant::now();
        let expired = self.recency.prune(now);
        let found = discovered.len();
        let items = self.fresh_items(discovered, now);
        tracing::info!(
            "[cycle {}] found {} tokens, {} fresh ({} expired from recency index)",
            cycle,
            found,
            items.len(),
            expired
        );

        let total = items.len();
        let mut lookahead = Lookahead::new();
        if let Some(first) = items.first() {
            lookahead.issue(self.fetch_task(&first.mint));
        }

        for (i, item) in items.iter().enumerate() {
            self.wait_for_quota(deadline).await;
            if Instant::now() >= deadline {
                tracing::info!(
                    "[cycle {}] deadline reached, stopping '{}' after {}/{}",
                    cycle,
                    tab,
                    i,
                    total
                );
                break;
            }

            let label = format!("[{}/{}]", i + 1, total);
            let fetched = lookahead.take().await;
            if let Some(next) = items.get(i + 1) {
                lookahead.issue(self.fetch_task(&next.mint));
            }

            let record = self.step(&label, item, fetched).await;
            outcome.record(&record);
            self.recency.mark_seen(&item.mint, Instant::now());

            if i + 1 < total {
                let now = Instant::now();
                let wake = wake_at(now, self.cooldown, deadline);
                tracing::debug!("{} COOLDOWN  {:?}", label, wake.saturating_duration_since(now));
                sleep_until(wake).await;
            }
        }

        lookahead.cancel();
        outcome
    }

    /// Hold until one cooldown has passed since the previous submission,
    /// whichever partition or rotation issued it
    async fn wait_for_quota(&self, deadline: Instant) {
        let Some(last) = self.last_submission else {
            return;
        };
        let now = Instant::now();
        let wake = wake_at(last, self.cooldown, deadline);
        if wake > now {
            tracing::debug!("QUOTA     holding {:?} since last submission", wake - now);
            sleep_until(wake).await;
        }
    }

    /// Tokens not processed within the TTL, first occurrence only
    fn fresh_items(&self, discovered: Vec<CatalogItem>, now: Instant) -> Vec<CatalogItem> {
        let mut seen_in_pass = HashSet::new();
        discovered
            .into_iter()
            .filter(|item| !self.recency.is_fresh(&item.mint, now))
            .filter(|item| seen_in_pass.insert(item.mint.clone()))
            .collect()
    }

    fn fetch_task(
        &self,
        mint: &str,
    ) -> impl Future<Output = Result<Snapshot, CatalogError>> + Send + 'static {
        let catalog = Arc::clone(&self.catalog);
        let mint = mint.to_string();
        async move { catalog.fetch_snapshot(&mint).await }
    }

    async fn step(
        &mut self,
        label: &str,
        item: &CatalogItem,
        fetched: Option<Result<Snapshot, CatalogError>>,
    ) -> StepRecord {
        let snapshot = match fetched {
            Some(Ok(snapshot)) => snapshot,
            Some(Err(e)) => {
                tracing::warn!("{} ERROR     {} ({}): {}", label, item.symbol, item.short_mint(), e);
                return StepRecord::failed();
            }
            None => {
                tracing::warn!(
                    "{} ERROR     {} ({}): snapshot fetch did not complete",
                    label,
                    item.symbol,
                    item.short_mint()
                );
                return StepRecord::failed();
            }
        };

        let analysis = self.analyzer.analyze(&snapshot);
        tracing::info!(
            "{} ANALYZE   {} ({}) {} score={:.0}",
            label,
            item.symbol,
            item.short_mint(),
            analysis.sentiment.to_string().to_uppercase(),
            analysis.score
        );

        let signal = self.evaluator.evaluate(&snapshot, &analysis);
        if signal.should_trade {
            tracing::info!(
                "{} SIGNAL    {} {} SOL - {}",
                label,
                signal.strategy.map(|s| s.to_string()).unwrap_or_default(),
                signal.sol_amount(),
                signal.reason
            );
        } else {
            tracing::debug!("{} SIGNAL    skip - {}", label, signal.reason);
        }

        self.last_submission = Some(Instant::now());
        let status = match self.catalog.submit(item, &snapshot, &analysis).await {
            Ok(ack) if ack.accepted => {
                let reward = ack.reward_or_zero();
                let mut line = format!("{} SUBMIT    ✓ +{} XP", label, reward);
                if ack.validated == Some(true) {
                    match ack.deviation_pct {
                        Some(dev) => line.push_str(&format!(" (validated, {:.0}% dev)", dev)),
                        None => line.push_str(" (validated)"),
                    }
                }
                tracing::info!("{}", line);
                if let Some(warning) = &ack.warning {
                    tracing::warn!("{} WARNING   {}", label, warning);
                }
                StepStatus::Submitted { reward }
            }
            Ok(ack) => {
                tracing::info!(
                    "{} SUBMIT    ✗ {}",
                    label,
                    ack.error.as_deref().unwrap_or("not accepted")
                );
                StepStatus::Rejected
            }
            Err(e) => {
                tracing::warn!("{} ERROR     {}", label, e);
                StepStatus::Failed
            }
        };

        if signal.should_trade {
            self.forward_paper_trade(label, item, &signal).await;
        }

        StepRecord {
            status,
            trade_signal: signal.should_trade,
        }
    }

    async fn forward_paper_trade(&self, label: &str, item: &CatalogItem, signal: &TradeSignal) {
        let Some(desk) = &self.paper_desk else {
            return;
        };
        let order = match PaperOrder::from_signal(item, signal) {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!("{} PAPER     ✗ {}", label, e);
                return;
            }
        };
        match desk.place_order(&order).await {
            Ok(fill) => tracing::info!(
                "{} PAPER     ✓ {} {} SOL on {} (trade {})",
                label,
                order.strategy,
                order.sol_amount,
                order.symbol,
                fill.trade_id.as_deref().unwrap_or("-")
            ),
            Err(e) => tracing::warn!("{} PAPER     ✗ {}", label, e),
        }
    }
}
