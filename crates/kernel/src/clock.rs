/// Fixed-rate step scheduler.
///
/// Hosts feed it real elapsed time; it answers how many `World::step` calls
/// are due. Catch-up is capped: after a stall the backlog beyond
/// `max_steps` is dropped instead of replayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    step: f64,
    accumulator: f64,
    max_steps: u32,
}

impl FixedStep {
    /// Non-positive or non-finite rates fall back to 60 Hz.
    pub fn new(rate_hz: f64, max_steps: u32) -> Self {
        let rate = if rate_hz.is_finite() && rate_hz > 0.0 {
            rate_hz
        } else {
            60.0
        };
        Self {
            step: 1.0 / rate,
            accumulator: 0.0,
            max_steps: max_steps.max(1),
        }
    }

    /// Seconds per step.
    pub fn step_seconds(&self) -> f64 {
        self.step
    }

    /// Add `dt` seconds and return the number of steps now due.
    pub fn advance(&mut self, dt: f64) -> u32 {
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }
        let mut due = 0;
        while self.accumulator >= self.step && due < self.max_steps {
            self.accumulator -= self.step;
            due += 1;
        }
        if self.accumulator >= self.step {
            tracing::debug!(
                dropped = self.accumulator / self.step,
                "step backlog dropped"
            );
            self.accumulator %= self.step;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_per_period() {
        let mut clock = FixedStep::new(60.0, 5);
        assert_eq!(clock.advance(1.0 / 120.0), 0);
        assert_eq!(clock.advance(1.0 / 120.0 + 1e-9), 1);
        assert_eq!(clock.advance(2.0 / 60.0 + 1e-9), 2);
    }

    #[test]
    fn backlog_is_capped() {
        let mut clock = FixedStep::new(60.0, 4);
        assert_eq!(clock.advance(1.0), 4);
        assert_eq!(clock.advance(0.0), 0);
    }

    #[test]
    fn invalid_rate_falls_back() {
        let clock = FixedStep::new(0.0, 0);
        assert!((clock.step_seconds() - 1.0 / 60.0).abs() < 1e-12);
        let mut clock = FixedStep::new(f64::NAN, 1);
        assert_eq!(clock.advance(f64::NAN), 0);
        assert_eq!(clock.advance(-1.0), 0);
    }
}
