pub mod clock;

pub use clock::{precise_sleep, Clock, FrameTimes, RefreshStats};
