mod engine;
pub mod format;
mod types;

pub use engine::{DAYS_PER_YEAR, MAX_SIMULATED_YEARS, daily_budget, project, project_with};
pub use types::{DepletionPolicy, InputState, ProjectionResult, TrajectoryPoint};
