use crate::{
    attributes::{Attributes, StrainPeaks},
    difficulty::Difficulty,
    model::hit_object::HitObject,
    score::{PerfScore, PpResults},
};

/// Star rating calculation of a single version.
///
/// Implementations are stateless so one instance can be shared across
/// threads.
pub trait DifficultyCalculator: Send + Sync {
    /// Attributes of the whole chart.
    ///
    /// Fewer than two hit objects yield [`Attributes::default`].
    fn calculate_single(&self, objects: &[HitObject], diff: &Difficulty) -> Attributes;

    /// Attributes after every hit object, i.e. the `i`th element describes
    /// the chart cut off after `objects[i]`.
    fn calculate_step(&self, objects: &[HitObject], diff: &Difficulty) -> Vec<Attributes>;

    /// Per-section strain peaks of every skill.
    fn calculate_strain_peaks(&self, objects: &[HitObject], diff: &Difficulty) -> StrainPeaks;

    /// Numeric version, e.g. `20250306`.
    fn version(&self) -> u32;

    /// Short description of the version.
    fn version_message(&self) -> &'static str;
}

/// Performance point calculation of a single version.
pub trait PerformanceCalculator: Send + Sync {
    fn calculate(&self, attrs: &Attributes, score: &PerfScore, diff: &Difficulty) -> PpResults;
}
