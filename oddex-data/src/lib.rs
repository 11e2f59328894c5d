pub mod conditions;
pub mod experiment;
pub mod session;

pub use conditions::{load_conditions, sample_conditions, write_conditions};
pub use experiment::ExperimentHandler;
pub use session::SessionInfo;
