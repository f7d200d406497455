use std::time::Duration;

pub const MIN_STEP_BUDGET: u32 = 1;
pub const MAX_STEP_BUDGET: u32 = 50;

const DEFAULT_STEP_BUDGET: u32 = 5;
const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(2);

/// Lifecycle of one instruction: waiting, stepping through the perceive →
/// decide → act cycle, or finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    AwaitingInstruction,
    Stepping { step: u32 },
    Terminated,
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Per-instruction step budget, clamped to 1..=50.
    pub max_steps: u32,
    /// Pause between steps; throttles the rate at which the model is polled.
    pub step_delay: Duration,
}

impl LoopConfig {
    pub fn new(max_steps: u32, step_delay: Duration) -> Self {
        Self {
            max_steps: max_steps.clamp(MIN_STEP_BUDGET, MAX_STEP_BUDGET),
            step_delay,
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_STEP_BUDGET,
            step_delay: DEFAULT_STEP_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_budget_is_clamped() {
        assert_eq!(LoopConfig::new(0, Duration::ZERO).max_steps, 1);
        assert_eq!(LoopConfig::new(25, Duration::ZERO).max_steps, 25);
        assert_eq!(LoopConfig::new(500, Duration::ZERO).max_steps, 50);
    }
}
