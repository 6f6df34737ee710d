//! Run diagnostics
//!
//! Wall-clock cost of each simulation stage and a tally of AI state
//! transitions, summarised when the engine stops.

use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::ai::StateName;

/// Part of a tick whose cost is tracked on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// A whole `Game::update` call
    Update,
    Movement,
    Ai,
    Projectiles,
}

impl Stage {
    /// Stages in report order
    pub const ALL: [Stage; 4] = [Stage::Update, Stage::Movement, Stage::Ai, Stage::Projectiles];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Update => "Update",
            Stage::Movement => "Movement",
            Stage::Ai => "AI",
            Stage::Projectiles => "Projectiles",
        }
    }
}

/// Accumulated cost of one stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCost {
    pub runs: u64,
    pub total: Duration,
    pub worst: Duration,
}

impl StageCost {
    fn add(&mut self, cost: Duration) {
        self.runs += 1;
        self.total += cost;
        self.worst = self.worst.max(cost);
    }

    /// Mean cost per run, zero before the first run
    #[must_use]
    pub fn mean(&self) -> Duration {
        if self.runs == 0 {
            Duration::ZERO
        } else {
            let nanos = self.total.as_nanos() / u128::from(self.runs);
            Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
        }
    }
}

type TransitionKey = (Option<StateName>, StateName);

/// Diagnostics gathered over a run
#[derive(Debug, Default)]
pub struct DebugInfo {
    stages: FxHashMap<Stage, StageCost>,
    transitions: FxHashMap<TransitionKey, u64>,
    /// Lines the game adds at shutdown
    custom_lines: Vec<String>,
}

impl DebugInfo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record how long one run of `stage` took
    pub fn record(&mut self, stage: Stage, cost: Duration) {
        self.stages.entry(stage).or_default().add(cost);
    }

    #[must_use]
    pub fn stage(&self, stage: Stage) -> StageCost {
        self.stages.get(&stage).copied().unwrap_or_default()
    }

    /// Ticks simulated so far
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.stage(Stage::Update).runs
    }

    /// Count one state change. `from` is `None` for a machine's first state.
    pub fn record_transition(&mut self, from: Option<StateName>, to: StateName) {
        *self.transitions.entry((from, to)).or_default() += 1;
    }

    /// How often `from -> to` happened
    #[must_use]
    pub fn transitions(&self, from: Option<StateName>, to: StateName) -> u64 {
        self.transitions.get(&(from, to)).copied().unwrap_or(0)
    }

    pub fn add_line(&mut self, line: impl Into<String>) {
        self.custom_lines.push(line.into());
    }

    /// Summary lines: tick count, stage costs, transitions, then custom lines
    #[must_use]
    pub fn get_all_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Ticks: {}", self.ticks())];

        for stage in Stage::ALL {
            let cost = self.stage(stage);
            if cost.runs > 0 {
                lines.push(format!(
                    "{}: {:.3}ms mean, {:.3}ms worst",
                    stage.as_str(),
                    cost.mean().as_secs_f64() * 1000.0,
                    cost.worst.as_secs_f64() * 1000.0
                ));
            }
        }

        let mut transitions: Vec<_> = self.transitions.iter().collect();
        transitions.sort_unstable_by_key(|(key, _)| **key);
        for ((from, to), count) in transitions {
            let from = from.map_or("start", |s| s.as_str());
            lines.push(format!("{from} -> {to}: {count}"));
        }

        lines.extend(self.custom_lines.iter().cloned());
        lines
    }
}
