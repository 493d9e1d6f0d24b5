pub use self::{difficulty::DifficultyCalculator20250306, performance::PerformanceCalculator20250306};

mod aim;
mod difficulty;
mod performance;
mod speed;
