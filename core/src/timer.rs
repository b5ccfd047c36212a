/// Solve clock. Starts on the first interaction, freezes on completion.
///
/// Timestamps are milliseconds from any monotonic source the caller owns.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PuzzleTimer {
    started_at_ms: Option<f64>,
    stopped_at_ms: Option<f64>,
}

impl PuzzleTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only for the call that actually started the clock.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.started_at_ms.is_some() {
            return false;
        }
        self.started_at_ms = Some(now_ms);
        true
    }

    /// Freezes the elapsed time; later calls keep the first stop.
    pub fn stop(&mut self, now_ms: f64) {
        if self.stopped_at_ms.is_none() {
            self.stopped_at_ms = Some(now_ms);
        }
    }

    pub fn started(&self) -> bool {
        self.started_at_ms.is_some()
    }

    pub fn stopped(&self) -> bool {
        self.stopped_at_ms.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.started() && !self.stopped()
    }

    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        let Some(start) = self.started_at_ms else {
            return 0.0;
        };
        let end = self.stopped_at_ms.unwrap_or(now_ms);
        (end - start).max(0.0)
    }
}

/// `mm:ss` with floored seconds; minutes keep growing past 59.
pub fn format_clock(ms: f64) -> String {
    let total = (ms.max(0.0) / 1000.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub fn format_best(best_ms: Option<f64>) -> String {
    match best_ms {
        Some(ms) => format!("Best: {}", format_clock(ms)),
        None => "Best: --:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_counts_only_after_start() {
        let mut timer = PuzzleTimer::new();
        assert_eq!(timer.elapsed_ms(5_000.0), 0.0);
        assert!(timer.start(1_000.0));
        assert!(!timer.start(2_000.0));
        assert_eq!(timer.elapsed_ms(4_500.0), 3_500.0);
    }

    #[test]
    fn stop_freezes_elapsed() {
        let mut timer = PuzzleTimer::new();
        timer.start(0.0);
        timer.stop(61_999.0);
        timer.stop(90_000.0);
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_ms(120_000.0), 61_999.0);
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(61_999.0), "01:01");
        assert_eq!(format_clock(3_600_000.0), "60:00");
        assert_eq!(format_best(None), "Best: --:--");
        assert_eq!(format_best(Some(9_000.0)), "Best: 00:09");
    }
}
