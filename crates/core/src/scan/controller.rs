use std::time::{Duration, Instant};

use thiserror::Error;

use crate::detection::domain::face_detector::DetectionError;
use crate::scan::session::{ScanMode, Session};
use crate::shared::constants::STREAM_READY_LIMIT;
use crate::shared::geometry::FaceBox;
use crate::shared::profile::ClientProfile;

#[derive(Error, Debug)]
pub enum ScanError {
    /// The stream never became decodable within the deferral window.
    #[error("video stream did not become ready within {0:?}")]
    StreamNotReady(Duration),
    /// The detection capability failed; scanning halts, no retry.
    #[error("face detection unavailable: {0}")]
    DetectionUnavailable(#[source] DetectionError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanConfig {
    /// Post-hit hold during which no attempts are issued.
    pub cooldown: Duration,
    /// Total not-ready deferral tolerated before `StreamNotReady`.
    pub defer_limit: Duration,
}

impl ScanConfig {
    pub fn for_profile(profile: ClientProfile) -> Self {
        Self {
            cooldown: profile.cooldown(),
            defer_limit: STREAM_READY_LIMIT,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::for_profile(ClientProfile::Standard)
    }
}

/// What the driver should do this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    /// Armed and clear to issue a detection attempt.
    Attempt,
    /// Nothing to do: idle, cooling down, or an attempt is in flight.
    Wait,
}

/// Proof that an attempt was begun. Must be handed back exactly once,
/// to `frame_not_ready` or `complete_attempt`.
#[derive(Debug)]
#[must_use]
pub struct AttemptToken {
    generation: u64,
}

/// Resolution of one detection attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Exactly one face: counted, cooldown entered.
    Hit { detection: FaceBox },
    /// No usable single face.
    Miss,
    /// The attempt resolved under an older stream generation (or after
    /// the machine left the armed states); its result is dropped.
    Stale,
    /// Detection failed: idle, auto disabled, no automatic retry.
    Halted(ScanError),
}

/// Resolution of a not-ready frame.
#[derive(Debug)]
pub enum DeferOutcome {
    /// Still within the deferral window; stay armed and retry next tick.
    Retry,
    /// Deferral window exhausted: scanning halts with `StreamNotReady`.
    Halted(ScanError),
}

/// The detection scan state machine.
///
/// `Idle → Scanning → {Hit, Miss}`; a hit enters `Cooldown`, which
/// re-arms under auto mode or returns to idle; a miss re-arms
/// immediately under auto mode. The controller never performs I/O; a
/// driver calls `poll` once per tick and routes frames and detection
/// results back in. At most one attempt is in flight at any time, and
/// results begun under an older stream generation are dropped without
/// side effects.
pub struct ScanController {
    session: Session,
    config: ScanConfig,
    cooldown_until: Option<Instant>,
    defer_since: Option<Instant>,
    in_flight: bool,
    generation: u64,
}

impl ScanController {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            session: Session::new(),
            config,
            cooldown_until: None,
            defer_since: None,
            in_flight: false,
            generation: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mode(&self) -> ScanMode {
        self.session.mode
    }

    /// Arms a single detection attempt. Only effective from idle.
    pub fn start_once(&mut self) -> bool {
        if self.session.mode != ScanMode::Idle {
            return false;
        }
        self.session.mode = ScanMode::Scanning;
        true
    }

    /// Enables or disables auto mode. Enabling while idle arms the loop
    /// immediately; disabling lets any in-flight attempt finish but
    /// suppresses all further re-arming.
    pub fn set_auto(&mut self, enabled: bool) {
        self.session.auto_enabled = enabled;
        if enabled {
            match self.session.mode {
                ScanMode::Idle | ScanMode::Scanning => {
                    self.session.mode = ScanMode::AutoScanning;
                }
                ScanMode::AutoScanning | ScanMode::Cooldown => {}
            }
        } else if self.session.mode == ScanMode::AutoScanning && !self.in_flight {
            self.session.mode = ScanMode::Idle;
        }
    }

    /// Zeroes the counters. Works in any state and leaves an in-flight
    /// cooldown's timing untouched.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Zeroes only the last-detection count.
    pub fn clear_last(&mut self) {
        self.session.clear_last();
    }

    /// Must be called after every successful camera open: attempts begun
    /// against the previous stream resolve as stale.
    pub fn on_stream_changed(&mut self) {
        self.generation += 1;
        self.defer_since = None;
    }

    /// Advances time-driven transitions and reports whether an attempt
    /// should be issued. Call once per tick, before `begin_attempt`.
    pub fn poll(&mut self, now: Instant) -> Directive {
        if self.session.mode == ScanMode::Cooldown {
            match self.cooldown_until {
                Some(until) if now >= until => {
                    self.cooldown_until = None;
                    self.session.mode = if self.session.auto_enabled {
                        ScanMode::AutoScanning
                    } else {
                        ScanMode::Idle
                    };
                }
                _ => return Directive::Wait,
            }
        }
        if self.in_flight || !self.session.is_armed() {
            return Directive::Wait;
        }
        Directive::Attempt
    }

    /// Claims the single in-flight attempt slot. `None` when an attempt
    /// is already in flight or the machine is not armed.
    pub fn begin_attempt(&mut self) -> Option<AttemptToken> {
        if self.in_flight || !self.session.is_armed() {
            return None;
        }
        self.in_flight = true;
        Some(AttemptToken {
            generation: self.generation,
        })
    }

    /// The frame source was not ready for this attempt. Not an error:
    /// the attempt is deferred to the next tick, bounded by the
    /// configured deferral window.
    pub fn frame_not_ready(&mut self, token: AttemptToken, now: Instant) -> DeferOutcome {
        self.in_flight = false;
        if token.generation != self.generation {
            return DeferOutcome::Retry;
        }
        let since = *self.defer_since.get_or_insert(now);
        if now.duration_since(since) >= self.config.defer_limit {
            self.defer_since = None;
            self.session.mode = ScanMode::Idle;
            self.session.auto_enabled = false;
            return DeferOutcome::Halted(ScanError::StreamNotReady(self.config.defer_limit));
        }
        DeferOutcome::Retry
    }

    /// Applies a resolved detection attempt.
    pub fn complete_attempt(
        &mut self,
        token: AttemptToken,
        result: Result<Option<FaceBox>, DetectionError>,
        now: Instant,
    ) -> AttemptOutcome {
        self.in_flight = false;
        self.defer_since = None;
        // A result from a previous stream, or one that lands after the
        // machine left the armed states, must not schedule anything.
        if token.generation != self.generation || !self.session.is_armed() {
            return AttemptOutcome::Stale;
        }
        match result {
            Err(e) => {
                self.session.mode = ScanMode::Idle;
                self.session.auto_enabled = false;
                AttemptOutcome::Halted(ScanError::DetectionUnavailable(e))
            }
            Ok(Some(detection)) => {
                self.session.record_hit();
                self.session.mode = ScanMode::Cooldown;
                self.cooldown_until = Some(now + self.config.cooldown);
                AttemptOutcome::Hit { detection }
            }
            Ok(None) => {
                self.session.record_miss();
                self.session.mode = if self.session.auto_enabled {
                    ScanMode::AutoScanning
                } else {
                    ScanMode::Idle
                };
                AttemptOutcome::Miss
            }
        }
    }

    /// Remaining cooldown, if one is active.
    pub fn cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        self.cooldown_until
            .map(|until| until.saturating_duration_since(now))
    }
}
