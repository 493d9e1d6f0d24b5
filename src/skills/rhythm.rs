use std::f64::consts::PI;

use crate::{
    preprocessing::object::{DifficultyObject, MIN_DELTA_TIME},
    util::difficulty::logistic,
};

const HISTORY_TIME_MAX: f64 = 5000.0;
const HISTORY_OBJECTS_MAX: usize = 32;
const RHYTHM_MULTIPLIER: f64 = 0.95;
const RATIO_MULTIPLIER: f64 = 12.0;

/// Rhythm complexity multiplier of the given object in `[1, ∞)`.
///
/// Deliberate changes in spacing are rewarded while mechanically repeating
/// groups of equal deltas ("islands") are penalized.
pub(crate) fn evaluate_rhythm<'a>(curr: &DifficultyObject<'a>, objects: &[DifficultyObject<'a>]) -> f64 {
    if curr.is_spinner() {
        return 0.0;
    }

    let eps = curr.great_window * 0.3;
    let historical_note_count = curr.idx.min(HISTORY_OBJECTS_MAX);

    let mut rhythm_start = 0;

    while rhythm_start + 2 < historical_note_count
        && curr
            .previous(rhythm_start, objects)
            .is_some_and(|prev| curr.start_time - prev.start_time < HISTORY_TIME_MAX)
    {
        rhythm_start += 1;
    }

    let (Some(mut prev_obj), Some(mut last_obj)) = (
        curr.previous(rhythm_start, objects),
        curr.previous(rhythm_start + 1, objects),
    ) else {
        return complexity_to_multiplier(0.0);
    };

    let mut complexity_sum = 0.0;
    let mut island = Island::empty(eps);
    let mut prev_island = Island::empty(eps);
    let mut island_counts: Vec<(Island, usize)> = Vec::new();
    let mut start_ratio = 0.0;
    let mut first_delta_switch = false;

    for i in (1..=rhythm_start).rev() {
        let Some(curr_obj) = curr.previous(i - 1, objects) else {
            break;
        };

        // Scales from 0 for the oldest object to 1 for the current one
        let time_decay = (HISTORY_TIME_MAX - (curr.start_time - curr_obj.start_time)) / HISTORY_TIME_MAX;
        let note_decay = (historical_note_count - i) as f64 / historical_note_count as f64;
        let historical_decay = note_decay.min(time_decay);

        let curr_delta = curr_obj.strain_time;
        let prev_delta = prev_obj.strain_time;
        let last_delta = last_obj.strain_time;

        let mut effective_ratio = delta_ratio(prev_delta, curr_delta, eps);

        if first_delta_switch {
            if (prev_delta - curr_delta).abs() < eps {
                island.add_delta(curr_delta as i32);
            } else {
                // Speed changes into or out of sliders have lenient windows
                if curr_obj.is_slider() {
                    effective_ratio *= 0.125;
                }

                if prev_obj.is_slider() {
                    effective_ratio *= 0.3;
                }

                if island.is_similar_polarity(&prev_island) {
                    effective_ratio *= 0.5;
                }

                // Speeding up twice in a row, e.g. 1/1 -> 1/2 -> 1/4
                if last_delta > prev_delta + eps && prev_delta > curr_delta + eps {
                    effective_ratio *= 0.125;
                }

                if prev_island.delta_count == island.delta_count {
                    effective_ratio *= 0.5;
                }

                if let Some((_, count)) = island_counts.iter_mut().find(|(counted, _)| *counted == island) {
                    // Only consecutive repetitions count
                    if prev_island == island {
                        *count += 1;
                    }

                    let count = *count as f64;
                    let power = logistic(f64::from(island.delta), 2.75, 0.24, 14.0);
                    effective_ratio *= (3.0 / count).min(count.recip().powf(power));
                } else {
                    island_counts.push((island, 1));
                }

                let doubletapness = prev_obj.doubletapness(Some(curr_obj));
                effective_ratio *= 1.0 - doubletapness * 0.75;

                complexity_sum += (effective_ratio * start_ratio).sqrt() * historical_decay;

                start_ratio = effective_ratio;
                prev_island = island;

                if prev_delta + eps < curr_delta {
                    // Slowing down ends the island
                    first_delta_switch = false;
                }

                island = Island::with_delta(curr_delta as i32, eps);
            }
        } else if prev_delta > curr_delta + eps {
            // Speeding up starts a new island
            first_delta_switch = true;

            if curr_obj.is_slider() {
                effective_ratio *= 0.6;
            }

            if prev_obj.is_slider() {
                effective_ratio *= 0.6;
            }

            start_ratio = effective_ratio;
            island = Island::with_delta(curr_delta as i32, eps);
        }

        last_obj = prev_obj;
        prev_obj = curr_obj;
    }

    complexity_to_multiplier(complexity_sum)
}

fn complexity_to_multiplier(complexity_sum: f64) -> f64 {
    (4.0 + complexity_sum * RHYTHM_MULTIPLIER).sqrt() / 2.0
}

/// Bonus for the change between two deltas. Deltas that are multiples of
/// each other or too far apart receive less.
fn delta_ratio(prev_delta: f64, curr_delta: f64, eps: f64) -> f64 {
    let difference_ratio = prev_delta.min(curr_delta) / prev_delta.max(curr_delta);
    let ratio = 1.0 + RATIO_MULTIPLIER * (PI / difference_ratio).sin().powf(2.0).min(0.5);

    let fraction = (prev_delta / curr_delta).max(curr_delta / prev_delta);
    let fraction_multiplier = (2.0 - fraction / 8.0).clamp(0.0, 1.0);

    let window_penalty = (((prev_delta - curr_delta).abs() - eps).max(0.0) / eps).min(1.0);

    window_penalty * ratio * fraction_multiplier
}

/// Group of consecutive objects sharing roughly the same delta.
#[derive(Copy, Clone, Debug)]
struct Island {
    eps: f64,
    delta: i32,
    delta_count: i32,
}

impl Island {
    const fn empty(eps: f64) -> Self {
        Self {
            eps,
            delta: i32::MAX,
            delta_count: 0,
        }
    }

    fn with_delta(delta: i32, eps: f64) -> Self {
        Self {
            eps,
            delta: delta.max(MIN_DELTA_TIME as i32),
            delta_count: 1,
        }
    }

    fn add_delta(&mut self, delta: i32) {
        if self.delta == i32::MAX {
            self.delta = delta.max(MIN_DELTA_TIME as i32);
        }

        self.delta_count += 1;
    }

    const fn is_similar_polarity(&self, other: &Self) -> bool {
        self.delta_count % 2 == other.delta_count % 2
    }
}

impl PartialEq for Island {
    fn eq(&self, other: &Self) -> bool {
        (f64::from(self.delta) - f64::from(other.delta)).abs() < self.eps
            && self.delta_count == other.delta_count
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::{preprocessing::create_difficulty_objects, Difficulty, HitObject, Pos};

    use super::*;

    fn rhythm_of(times: &[f64]) -> Vec<f64> {
        let diff = Difficulty::new(5.0, 5.0, 5.0, 5.0);
        let objects: Vec<_> = times
            .iter()
            .map(|&time| HitObject::circle(Pos::new(256.0, 192.0), time))
            .collect();

        let diff_objects = create_difficulty_objects(&objects, &diff);

        diff_objects
            .iter()
            .map(|curr| evaluate_rhythm(curr, &diff_objects))
            .collect()
    }

    #[test]
    fn constant_rhythm_has_no_bonus() {
        let times: Vec<_> = (0..40).map(|i| f64::from(i) * 150.0).collect();

        for rhythm in rhythm_of(&times) {
            assert_abs_diff_eq!(rhythm, 1.0);
        }
    }

    #[test]
    fn changing_rhythm_is_rewarded() {
        let mut times = Vec::new();
        let mut time = 0.0;

        for i in 0..40 {
            times.push(time);
            time += if i % 3 == 0 { 300.0 } else { 100.0 };
        }

        let max = rhythm_of(&times).into_iter().fold(0.0, f64::max);

        assert!(max > 1.0);
    }

    #[test]
    fn islands_compare_with_tolerance() {
        let a = Island::with_delta(100, 10.0);
        let b = Island::with_delta(105, 10.0);
        let c = Island::with_delta(120, 10.0);

        assert!(a == b);
        assert!(a != c);
        assert!(Island::empty(10.0) != a);
    }
}
