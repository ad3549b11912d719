use std::time::{Duration, Instant};

use crate::facade::session_facade::{SessionFacade, TickEvent};
use crate::scan::controller::ScanError;
use crate::scan::session::ScanMode;

/// Pacing and termination for the cooperative session loop.
#[derive(Clone, Copy, Debug)]
pub struct RunnerConfig {
    /// Interval between state machine re-evaluations. Stands in for the
    /// host's paint-synchronized callback.
    pub tick_interval: Duration,
    /// Hard stop after this many ticks, regardless of state.
    pub max_ticks: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            // ~30 Hz; detection attempts are far rarer than ticks.
            tick_interval: Duration::from_millis(33),
            max_ticks: None,
        }
    }
}

/// Why the loop ended.
#[derive(Debug)]
pub enum StopReason {
    /// The machine settled in idle with auto disabled.
    Idle,
    /// `max_ticks` reached.
    TickBudget,
    /// Scanning halted with an error.
    Halted(ScanError),
}

#[derive(Debug)]
pub struct RunSummary {
    pub ticks: u64,
    pub total_count: u64,
    pub stop: StopReason,
}

/// Drives the session until it settles.
///
/// One cooperative loop re-evaluates the state machine once per tick
/// and exits cleanly when the mode leaves the scanning states: after a
/// one-shot resolves (and its cooldown drains), when auto mode is
/// halted by an error, or when the tick budget runs out. Status
/// transitions are logged as they happen.
pub fn run(facade: &mut SessionFacade, config: &RunnerConfig) -> RunSummary {
    let ticker = crossbeam_channel::tick(config.tick_interval);
    let mut ticks: u64 = 0;
    let mut last_status = facade.status();
    log::info!("{last_status}");

    let stop = loop {
        if ticker.recv().is_err() {
            break StopReason::TickBudget;
        }
        let now = Instant::now();
        let event = facade.tick(now);
        ticks += 1;

        let status = facade.status();
        if status != last_status {
            log::info!("{status}");
            last_status = status;
        }
        match event {
            TickEvent::Hit { total } => log::info!("presence count: {total}"),
            TickEvent::Halted(e) => break StopReason::Halted(e),
            _ => {}
        }

        let session = facade.session();
        if session.mode == ScanMode::Idle && !session.auto_enabled {
            break StopReason::Idle;
        }
        if let Some(budget) = config.max_ticks {
            if ticks >= budget {
                break StopReason::TickBudget;
            }
        }
    };

    RunSummary {
        ticks,
        total_count: facade.session().total_count(),
        stop,
    }
}
