use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPhase {
    Pending,
    Checking,
    Ready,
}

impl WaitPhase {
    /// Edges of `Pending -> Checking -> (Ready | Pending)`.
    pub fn can_transition_to(self, next: WaitPhase) -> bool {
        matches!(
            (self, next),
            (WaitPhase::Pending, WaitPhase::Checking)
                | (WaitPhase::Checking, WaitPhase::Ready)
                | (WaitPhase::Checking, WaitPhase::Pending)
        )
    }
}

impl fmt::Display for WaitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitPhase::Pending => write!(f, "pending"),
            WaitPhase::Checking => write!(f, "checking"),
            WaitPhase::Ready => write!(f, "ready"),
        }
    }
}

/// Progress of a single wait. Lives only as long as the loop that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaitState {
    /// Failed probes so far.
    pub attempts: u32,
    pub ready: bool,
}

impl WaitState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> WaitPhase {
        if self.ready {
            WaitPhase::Ready
        } else {
            WaitPhase::Pending
        }
    }

    /// Number the next failed probe will carry. Saturates instead of wrapping.
    pub fn next_attempt(&self) -> u32 {
        self.attempts.saturating_add(1)
    }

    pub(crate) fn record_failure(&mut self) {
        self.attempts = self.next_attempt();
    }

    pub(crate) fn mark_ready(&mut self) {
        self.ready = true;
    }
}
