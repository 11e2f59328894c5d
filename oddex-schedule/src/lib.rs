pub mod loops;
pub mod scheduler;

pub use loops::{LoopState, TrialLoop, TrialSnapshot};
pub use scheduler::{Scheduler, SchedulerEvent, SchedulerHandle, StopHandle, TickOutcome};
