/// Where the scan state machine currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScanMode {
    #[default]
    Idle,
    /// One-shot attempt armed.
    Scanning,
    /// Armed, and re-arms itself after misses and cooldowns.
    AutoScanning,
    /// Post-hit hold: no attempts until the cooldown expires.
    Cooldown,
}

/// Mutable per-session counters and mode.
///
/// Owned by the scan controller; everything else reads it. The total is
/// monotonically non-decreasing except through `reset`, and the last
/// detection count is always 0 or 1.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    total_count: u64,
    last_detection: u8,
    pub mode: ScanMode,
    pub auto_enabled: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn last_detection(&self) -> u8 {
        self.last_detection
    }

    /// Armed means an attempt will be issued on the next ready frame.
    pub fn is_armed(&self) -> bool {
        matches!(self.mode, ScanMode::Scanning | ScanMode::AutoScanning)
    }

    pub fn record_hit(&mut self) {
        self.total_count += 1;
        self.last_detection = 1;
    }

    pub fn record_miss(&mut self) {
        self.last_detection = 0;
    }

    /// Zeroes both counters. Mode and auto flag are untouched.
    pub fn reset(&mut self) {
        self.total_count = 0;
        self.last_detection = 0;
    }

    /// Zeroes only the last-detection count (the "clear" intent).
    pub fn clear_last(&mut self) {
        self.last_detection = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle_and_zeroed() {
        let session = Session::new();
        assert_eq!(session.total_count(), 0);
        assert_eq!(session.last_detection(), 0);
        assert_eq!(session.mode, ScanMode::Idle);
        assert!(!session.auto_enabled);
        assert!(!session.is_armed());
    }

    #[test]
    fn test_hits_accumulate_and_misses_do_not() {
        let mut session = Session::new();
        session.record_hit();
        session.record_hit();
        assert_eq!(session.total_count(), 2);
        assert_eq!(session.last_detection(), 1);

        session.record_miss();
        assert_eq!(session.total_count(), 2);
        assert_eq!(session.last_detection(), 0);
    }

    #[test]
    fn test_reset_zeroes_counters_but_not_mode() {
        let mut session = Session::new();
        session.mode = ScanMode::Cooldown;
        session.auto_enabled = true;
        session.record_hit();

        session.reset();
        assert_eq!(session.total_count(), 0);
        assert_eq!(session.last_detection(), 0);
        assert_eq!(session.mode, ScanMode::Cooldown);
        assert!(session.auto_enabled);
    }

    #[test]
    fn test_clear_last_keeps_total() {
        let mut session = Session::new();
        session.record_hit();
        session.clear_last();
        assert_eq!(session.total_count(), 1);
        assert_eq!(session.last_detection(), 0);
    }

    #[test]
    fn test_armed_modes() {
        let mut session = Session::new();
        for (mode, armed) in [
            (ScanMode::Idle, false),
            (ScanMode::Scanning, true),
            (ScanMode::AutoScanning, true),
            (ScanMode::Cooldown, false),
        ] {
            session.mode = mode;
            assert_eq!(session.is_armed(), armed, "{mode:?}");
        }
    }
}
