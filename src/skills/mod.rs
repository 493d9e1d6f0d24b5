//! Strain accumulation shared by every version.
//!
//! Version specific aim and speed evaluators live in their version module
//! and plug into [`strain::Skill`].

pub(crate) mod flashlight;
pub(crate) mod rhythm;
pub(crate) mod strain;
