pub use self::{difficulty::DifficultyCalculator20241007, performance::PerformanceCalculator20241007};

mod aim;
mod difficulty;
mod performance;
mod speed;
