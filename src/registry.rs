use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, IntoStaticStr};
use tracing::debug;

use crate::{
    api::{DifficultyCalculator, PerformanceCalculator},
    attributes::Attributes,
    difficulty::Difficulty,
    error::PpError,
    model::hit_object::HitObject,
    versions::{
        v20241007::{DifficultyCalculator20241007, PerformanceCalculator20241007},
        v20250306::{DifficultyCalculator20250306, PerformanceCalculator20250306},
    },
};

/// All available versions of the difficulty and performance calculation.
///
/// # Example
///
/// ```
/// use osu_pp_engine::PpVersion;
///
/// let version: PpVersion = "250306".parse().unwrap();
///
/// assert_eq!(version, PpVersion::LATEST);
/// assert_eq!(version.id(), 20250306);
/// assert_eq!(version.to_string(), "20250306");
/// ```
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum PpVersion {
    #[strum(to_string = "20241007")]
    #[serde(rename = "20241007")]
    V20241007,
    #[default]
    #[strum(to_string = "20250306")]
    #[serde(rename = "20250306")]
    V20250306,
}

/// The difficulty and performance calculators of one version.
pub struct Calculators {
    pub difficulty: &'static dyn DifficultyCalculator,
    pub performance: Box<dyn PerformanceCalculator>,
}

impl PpVersion {
    /// The most recent version.
    pub const LATEST: Self = Self::V20250306;

    /// Numeric id of the version, e.g. `20250306`.
    pub const fn id(self) -> u32 {
        match self {
            Self::V20241007 => 20_241_007,
            Self::V20250306 => 20_250_306,
        }
    }

    /// The shared star rating calculator of this version.
    pub fn difficulty_calculator(self) -> &'static dyn DifficultyCalculator {
        debug!("Selected difficulty calculator {self}");

        match self {
            Self::V20241007 => &DifficultyCalculator20241007,
            Self::V20250306 => &DifficultyCalculator20250306,
        }
    }

    /// A new performance calculator of this version.
    pub fn performance_calculator(self) -> Box<dyn PerformanceCalculator> {
        debug!("Selected performance calculator {self}");

        match self {
            Self::V20241007 => Box::new(PerformanceCalculator20241007),
            Self::V20250306 => Box::new(PerformanceCalculator20250306),
        }
    }

    /// Both calculators of this version.
    pub fn calculators(self) -> Calculators {
        Calculators {
            difficulty: self.difficulty_calculator(),
            performance: self.performance_calculator(),
        }
    }

    /// Calculate the attributes of many charts in parallel.
    ///
    /// The output is in the same order as `jobs`.
    pub fn calculate_many<O>(self, jobs: &[(O, Difficulty)]) -> Vec<Attributes>
    where
        O: AsRef<[HitObject]> + Sync,
    {
        let calculator = self.difficulty_calculator();

        debug!("Calculating {} charts with version {self}", jobs.len());

        jobs.par_iter()
            .map(|(objects, diff)| calculator.calculate_single(objects.as_ref(), diff))
            .collect()
    }

    /// Run [`DifficultyCalculator::calculate_step`] on a blocking worker of
    /// the tokio runtime.
    #[cfg(feature = "async_tokio")]
    pub async fn calculate_step_async(
        self,
        objects: Vec<HitObject>,
        diff: Difficulty,
    ) -> Result<Vec<Attributes>, PpError> {
        let calculator = self.difficulty_calculator();

        tokio::task::spawn_blocking(move || calculator.calculate_step(&objects, &diff))
            .await
            .map_err(|err| PpError::Worker(err.to_string()))
    }
}

impl FromStr for PpVersion {
    type Err = PpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "241007" | "20241007" => Ok(Self::V20241007),
            "250306" | "20250306" | "latest" => Ok(Self::V20250306),
            _ => Err(PpError::UnknownVersion(s.to_owned())),
        }
    }
}
