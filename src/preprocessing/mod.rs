use crate::{difficulty::Difficulty, model::hit_object::HitObject};

use self::object::{DifficultyObject, PreparedObject};

pub(crate) mod lazy_slider;
pub(crate) mod object;

/// Builds one [`DifficultyObject`] for every hit object but the first.
///
/// The returned arena is append-only; objects refer to their neighbors
/// through their index.
pub(crate) fn create_difficulty_objects<'a>(
    objects: &'a [HitObject],
    diff: &Difficulty,
) -> Vec<DifficultyObject<'a>> {
    let prepared: Vec<_> = objects
        .iter()
        .map(|h| PreparedObject::new(h, diff))
        .collect();

    prepared
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, curr)| {
            let last = &prepared[i - 1];
            let last_last = i.checked_sub(2).map(|j| &prepared[j]);

            DifficultyObject::new(curr, last, last_last, diff, i - 1)
        })
        .collect()
}
