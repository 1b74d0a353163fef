pub mod events;
pub mod state;
pub mod waiter;


pub use events::{LineReporter, StatusReporter, WaitEvent};
pub use state::{WaitPhase, WaitState};
pub use waiter::{ReadinessWaiter, WaitError, MIN_INTERVAL};
