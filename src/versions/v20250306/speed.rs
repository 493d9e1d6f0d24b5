use crate::{
    preprocessing::object::{DifficultyObject, NORMALIZED_DIAMETER},
    skills::{
        rhythm::evaluate_rhythm,
        strain::{strain_decay, RelevantCount, StrainEvaluator},
    },
    util::difficulty::{bpm_to_milliseconds, milliseconds_to_bpm},
};

const SKILL_MULTIPLIER: f64 = 1.46;
const STRAIN_DECAY_BASE: f64 = 0.3;

const SINGLE_SPACING_THRESHOLD: f64 = NORMALIZED_DIAMETER * 1.25;
// 200 BPM 1/4th
const MIN_SPEED_BONUS: f64 = 200.0;
const SPEED_BALANCING_FACTOR: f64 = 40.0;
const DISTANCE_MULTIPLIER: f64 = 0.9;

/// Difficulty of tapping fast, scaled by rhythm complexity.
#[derive(Clone, Debug)]
pub(crate) struct SpeedEvaluator {
    curr_strain: f64,
    curr_rhythm: f64,
    autopilot: bool,
    relevant_notes: RelevantCount,
}

impl SpeedEvaluator {
    pub const fn new(autopilot: bool, step: bool) -> Self {
        Self {
            curr_strain: 0.0,
            curr_rhythm: 0.0,
            autopilot,
            relevant_notes: RelevantCount::new(step),
        }
    }

    pub fn relevant_note_count(&self) -> f64 {
        self.relevant_notes.value()
    }
}

impl StrainEvaluator for SpeedEvaluator {
    const REDUCED_SECTION_COUNT: usize = 5;

    fn strain_value_at<'a>(
        &mut self,
        curr: &DifficultyObject<'a>,
        objects: &[DifficultyObject<'a>],
    ) -> f64 {
        self.curr_strain *= strain_decay(curr.strain_time, STRAIN_DECAY_BASE);
        self.curr_strain += evaluate_speed(curr, objects, self.autopilot) * SKILL_MULTIPLIER;
        self.curr_rhythm = evaluate_rhythm(curr, objects);

        let total_strain = self.curr_strain * self.curr_rhythm;
        self.relevant_notes.push(total_strain);

        total_strain
    }

    fn initial_strain<'a>(
        &self,
        time: f64,
        curr: &DifficultyObject<'a>,
        objects: &[DifficultyObject<'a>],
    ) -> f64 {
        let prev_start_time = curr
            .previous(0, objects)
            .map_or(0.0, |prev| prev.start_time);

        (self.curr_strain * self.curr_rhythm)
            * strain_decay(time - prev_start_time, STRAIN_DECAY_BASE)
    }
}

fn evaluate_speed<'a>(
    curr: &DifficultyObject<'a>,
    objects: &[DifficultyObject<'a>],
    autopilot: bool,
) -> f64 {
    if curr.is_spinner() {
        return 0.0;
    }

    let doubletapness = 1.0 - curr.doubletapness(curr.next(0, objects));

    // Cap delta time to the great hit window
    let strain_time =
        curr.strain_time / ((curr.strain_time / curr.great_window) / 0.93).clamp(0.92, 1.0);

    let speed_bonus = if milliseconds_to_bpm(strain_time, None) > MIN_SPEED_BONUS {
        0.75 * ((bpm_to_milliseconds(MIN_SPEED_BONUS, None) - strain_time) / SPEED_BALANCING_FACTOR)
            .powf(2.0)
    } else {
        0.0
    };

    let travel_dist = curr
        .previous(0, objects)
        .map_or(0.0, |prev| prev.travel_dist);

    let distance = SINGLE_SPACING_THRESHOLD.min(travel_dist + curr.min_jump_dist);

    let distance_bonus = if autopilot {
        0.0
    } else {
        (distance / SINGLE_SPACING_THRESHOLD).powf(3.95) * DISTANCE_MULTIPLIER
    };

    (1.0 + speed_bonus + distance_bonus) * 1000.0 / strain_time * doubletapness
}

#[cfg(test)]
mod tests {
    use crate::{preprocessing::create_difficulty_objects, Difficulty, HitObject, Pos};

    use super::*;

    fn jumps() -> (Vec<HitObject>, Difficulty) {
        let objects = (0..16)
            .map(|i| HitObject::circle(Pos::new(64.0 + (i % 2) as f32 * 300.0, 192.0), f64::from(i) * 100.0))
            .collect();

        (objects, Difficulty::new(5.0, 5.0, 5.0, 5.0))
    }

    #[test]
    fn autopilot_ignores_spacing() {
        let (objects, diff) = jumps();
        let diff_objects = create_difficulty_objects(&objects, &diff);
        let curr = &diff_objects[4];

        let regular = evaluate_speed(curr, &diff_objects, false);
        let autopilot = evaluate_speed(curr, &diff_objects, true);

        assert!(autopilot < regular);
        assert!(autopilot > 0.0);
    }

    #[test]
    fn no_bonus_below_two_hundred_bpm() {
        let (objects, diff) = jumps();
        let diff_objects = create_difficulty_objects(&objects, &diff);
        let curr = &diff_objects[4];

        // 100ms spacing is 150 BPM 1/4, so only the distance bonus applies
        let expected = (1.0 + DISTANCE_MULTIPLIER) * 1000.0 / 100.0;

        assert!((evaluate_speed(curr, &diff_objects, false) - expected).abs() < 1e-9);
    }
}
