use crate::{
    preprocessing::object::DifficultyObject,
    skills::{
        rhythm::evaluate_rhythm,
        strain::{strain_decay, RelevantCount, StrainEvaluator},
    },
};

const SKILL_MULTIPLIER: f64 = 1.430;
const STRAIN_DECAY_BASE: f64 = 0.3;

const SINGLE_SPACING_THRESHOLD: f64 = 125.0;
// ~200 bpm 1/4
const MIN_SPEED_BONUS: f64 = 75.0;
const SPEED_BALANCING_FACTOR: f64 = 40.0;
const DISTANCE_MULTIPLIER: f64 = 0.94;

/// Difficulty of tapping fast, scaled by rhythm complexity.
#[derive(Clone, Debug)]
pub(crate) struct SpeedEvaluator {
    curr_strain: f64,
    curr_rhythm: f64,
    relevant_notes: RelevantCount,
}

impl SpeedEvaluator {
    pub const fn new(step: bool) -> Self {
        Self {
            curr_strain: 0.0,
            curr_rhythm: 0.0,
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
        self.curr_strain += evaluate_speed(curr, objects) * SKILL_MULTIPLIER;
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

fn evaluate_speed<'a>(curr: &DifficultyObject<'a>, objects: &[DifficultyObject<'a>]) -> f64 {
    if curr.is_spinner() {
        return 0.0;
    }

    let mut strain_time = curr.strain_time;
    let doubletapness = 1.0 - curr.doubletapness(curr.next(0, objects));

    // Cap delta time to the great hit window
    strain_time /= ((strain_time / curr.great_window) / 0.93).clamp(0.92, 1.0);

    let mut speed_bonus = 0.0;

    if strain_time < MIN_SPEED_BONUS {
        speed_bonus = 0.75 * ((MIN_SPEED_BONUS - strain_time) / SPEED_BALANCING_FACTOR).powf(2.0);
    }

    let travel_dist = curr
        .previous(0, objects)
        .map_or(0.0, |prev| prev.travel_dist);

    let distance = SINGLE_SPACING_THRESHOLD.min(travel_dist + curr.min_jump_dist);
    let distance_bonus = (distance / SINGLE_SPACING_THRESHOLD).powf(3.95) * DISTANCE_MULTIPLIER;

    let difficulty = (1.0 + speed_bonus + distance_bonus) * 1000.0 / strain_time;

    difficulty * doubletapness
}

#[cfg(test)]
mod tests {
    use crate::{preprocessing::create_difficulty_objects, Difficulty, HitObject, Pos};

    use super::*;

    fn max_speed(interval: f64) -> f64 {
        let diff = Difficulty::new(5.0, 5.0, 5.0, 5.0);
        let objects: Vec<_> = (0..20)
            .map(|i| HitObject::circle(Pos::new(100.0 + (i % 2) as f32 * 60.0, 192.0), f64::from(i) * interval))
            .collect();

        let diff_objects = create_difficulty_objects(&objects, &diff);

        diff_objects
            .iter()
            .map(|curr| evaluate_speed(curr, &diff_objects))
            .fold(0.0, f64::max)
    }

    #[test]
    fn faster_streams_are_harder() {
        assert!(max_speed(60.0) > max_speed(120.0));
    }

    #[test]
    fn spinners_have_no_speed() {
        let diff = Difficulty::new(5.0, 5.0, 5.0, 5.0);
        let objects = [
            HitObject::circle(Pos::new(0.0, 0.0), 0.0),
            HitObject::spinner(Pos::new(256.0, 192.0), 100.0, 1000.0),
        ];

        let diff_objects = create_difficulty_objects(&objects, &diff);

        assert!(evaluate_speed(&diff_objects[0], &diff_objects).abs() < f64::EPSILON);
    }
}
