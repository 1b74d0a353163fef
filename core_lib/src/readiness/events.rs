use std::io::{self, Write};
use std::time::Duration;
use tracing::warn;

use crate::health::TargetSet;

#[derive(Debug, Clone, PartialEq)]
pub enum WaitEvent {
    Started {
        targets: TargetSet,
    },
    Unavailable {
        attempt: u32,
        retry_in: Duration,
        reason: String,
    },
    Available {
        attempts: u32,
    },
}

impl WaitEvent {
    pub fn status_line(&self) -> String {
        match self {
            WaitEvent::Started { .. } => "Waiting for database...".to_string(),
            WaitEvent::Unavailable { retry_in, .. } => format!(
                "Database unavailable, waiting for [{}]s",
                retry_in.as_secs_f64()
            ),
            WaitEvent::Available { .. } => "Database Available!".to_string(),
        }
    }
}

pub trait StatusReporter {
    fn report(&mut self, event: &WaitEvent);
}

impl StatusReporter for Vec<WaitEvent> {
    fn report(&mut self, event: &WaitEvent) {
        self.push(event.clone());
    }
}

/// Writes one plain-text status line per event.
pub struct LineReporter<W: Write> {
    out: W,
}

impl LineReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> LineReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StatusReporter for LineReporter<W> {
    fn report(&mut self, event: &WaitEvent) {
        let result = writeln!(self.out, "{}", event.status_line()).and_then(|_| self.out.flush());

        if let Err(e) = result {
            warn!("Failed to write status line: {}", e);
        }
    }
}
