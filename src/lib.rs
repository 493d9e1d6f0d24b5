//! Library to calculate version-pinned difficulty and performance attributes for [osu!]standard.
//!
//! ## Description
//!
//! Star ratings and pp values changed many times over the years. To keep old scores
//! comparable with the difficulty values they were set on, every historical revision of the
//! algorithm is kept as its own frozen snapshot behind a shared interface.
//!
//! Available versions:
//!   - `20241007`: <https://osu.ppy.sh/home/news/2024-10-28-performance-points-star-rating-updates>
//!   - `20250306`: <https://osu.ppy.sh/home/news/2025-03-06-performance-points-star-rating-updates>
//!
//! ## Usage
//!
//! ```
//! use osu_pp_engine::{Difficulty, HitObject, PerfScore, Pos, PpVersion};
//!
//! let objects: Vec<_> = (0..64)
//!     .map(|i| HitObject::circle(Pos::new(64.0 + (i % 4) as f32 * 96.0, 192.0), f64::from(i) * 150.0))
//!     .collect();
//!
//! // HDHR
//! let diff = Difficulty::new(5.0, 4.0, 8.0, 9.0).mods(8 + 16);
//!
//! let calculators = PpVersion::LATEST.calculators();
//!
//! let attrs = calculators.difficulty.calculate_single(&objects, &diff);
//!
//! let score = PerfScore {
//!     count_ok: 2,
//!     accuracy: 0.9896,
//!     ..PerfScore::default()
//! };
//!
//! let pp = calculators.performance.calculate(&attrs, &score, &diff);
//!
//! println!("Stars: {} | PP: {}", attrs.total, pp.total);
//! ```
//!
//! ## Features
//!
//! | Flag | Description | Dependencies
//! | - | - | -
//! | `default` | No features |
//! | `async_tokio` | Step calculations can be moved onto a blocking worker through `PpVersion::calculate_step_async` | [`tokio`]
//!
//! [osu!]: https://osu.ppy.sh/home
//! [`tokio`]: https://docs.rs/tokio

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::missing_const_for_fn, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::struct_excessive_bools,
    clippy::match_same_arms,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::explicit_iter_loop,
    clippy::similar_names,
    clippy::cast_possible_wrap
)]

#[doc(inline)]
pub use self::{
    api::{DifficultyCalculator, PerformanceCalculator},
    attributes::{Attributes, StrainPeaks},
    difficulty::{Difficulty, SliderAccuracy},
    error::PpError,
    model::{
        hit_object::{HitObject, HitObjectKind, NestedSliderObject, NestedSliderObjectKind, Slider, SliderPath},
        pos::Pos,
    },
    mods::GameMods,
    registry::{Calculators, PpVersion},
    score::{PerfScore, PpResults},
};

/// Capability interfaces shared by all versions.
pub mod api;

/// Star rating attributes.
pub mod attributes;

/// Difficulty settings of a chart.
pub mod difficulty;

/// Hit objects and geometry.
pub mod model;

/// Mod bit flags.
pub mod mods;

/// Selecting a version of the calculation.
pub mod registry;

/// Played results and pp output.
pub mod score;

/// Frozen snapshots of the difficulty and performance calculation.
pub mod versions;

mod error;
mod preprocessing;
mod skills;
mod util;
