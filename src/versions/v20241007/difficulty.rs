use std::time::Instant;

use tracing::{debug, info};

use crate::{
    api::DifficultyCalculator,
    attributes::{Attributes, StrainPeaks},
    difficulty::Difficulty,
    model::hit_object::HitObject,
    mods::GameMods,
    preprocessing::{create_difficulty_objects, object::DifficultyObject},
    skills::{
        flashlight::{flashlight_difficulty_to_performance, FlashlightEvaluator},
        strain::{difficulty_to_performance, Skill},
    },
};

use super::{aim::AimEvaluator, performance::PERFORMANCE_BASE_MULTIPLIER, speed::SpeedEvaluator};

const DIFFICULTY_MULTIPLIER: f64 = 0.0675;

pub(super) const VERSION: u32 = 20_241_007;

/// Star rating calculation as of 2024-10-07.
#[derive(Copy, Clone, Debug, Default)]
pub struct DifficultyCalculator20241007;

#[derive(Clone)]
struct Skills {
    aim: Skill<AimEvaluator>,
    aim_no_sliders: Skill<AimEvaluator>,
    speed: Skill<SpeedEvaluator>,
    flashlight: Skill<FlashlightEvaluator>,
}

impl Skills {
    fn new(diff: &Difficulty, step: bool) -> Self {
        Self {
            aim: Skill::new(AimEvaluator::new(true), false, step),
            aim_no_sliders: Skill::new(AimEvaluator::new(false), false, false),
            speed: Skill::new(SpeedEvaluator::new(step), false, step),
            flashlight: Skill::new(FlashlightEvaluator::new(diff), false, false),
        }
    }

    fn process<'a>(&mut self, curr: &DifficultyObject<'a>, objects: &[DifficultyObject<'a>]) {
        self.aim.process(curr, objects);
        self.aim_no_sliders.process(curr, objects);
        self.speed.process(curr, objects);
        self.flashlight.process(curr, objects);
    }

    fn eval(&self, mods: u32, mut attrs: Attributes) -> Attributes {
        eval_ratings(
            &mut attrs,
            mods,
            self.aim.difficulty_value(),
            self.aim_no_sliders.difficulty_value(),
            self.speed.difficulty_value(),
            self.flashlight.difficulty_value(),
        );

        attrs.speed_note_count = self.speed.evaluator.relevant_note_count();
        attrs.aim_difficult_strain_count = self.aim.count_difficult_strains();
        attrs.speed_difficult_strain_count = self.speed.count_difficult_strains();

        attrs
    }
}

/// Convert raw skill values into star ratings.
fn eval_ratings(
    attrs: &mut Attributes,
    mods: u32,
    aim_difficulty_value: f64,
    aim_no_sliders_difficulty_value: f64,
    speed_difficulty_value: f64,
    flashlight_difficulty_value: f64,
) {
    let mut aim_rating = aim_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;
    let aim_rating_no_sliders = aim_no_sliders_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;
    let mut speed_rating = speed_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;
    let mut flashlight_rating = flashlight_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;

    let slider_factor = if aim_rating > 0.00001 {
        aim_rating_no_sliders / aim_rating
    } else {
        1.0
    };

    if mods.td() {
        aim_rating = aim_rating.powf(0.8);
        flashlight_rating = flashlight_rating.powf(0.8);
    }

    if mods.rx() {
        aim_rating *= 0.9;
        speed_rating = 0.0;
        flashlight_rating *= 0.7;
    }

    let base_aim_performance = difficulty_to_performance(aim_rating);
    let base_speed_performance = difficulty_to_performance(speed_rating);

    let base_flashlight_performance = if mods.fl() {
        flashlight_difficulty_to_performance(flashlight_rating)
    } else {
        0.0
    };

    let base_performance = (base_aim_performance.powf(1.1)
        + base_speed_performance.powf(1.1)
        + base_flashlight_performance.powf(1.1))
    .powf(1.0 / 1.1);

    let total = if base_performance > 0.00001 {
        PERFORMANCE_BASE_MULTIPLIER.cbrt()
            * 0.027
            * ((100_000.0 / 2.0_f64.powf(1.0 / 1.1) * base_performance).cbrt() + 4.0)
    } else {
        0.0
    };

    attrs.total = total;
    attrs.aim = aim_rating;
    attrs.slider_factor = slider_factor;
    attrs.speed = speed_rating;
    attrs.flashlight = flashlight_rating;
}

impl DifficultyCalculator for DifficultyCalculator20241007 {
    fn calculate_single(&self, objects: &[HitObject], diff: &Difficulty) -> Attributes {
        let attrs = objects.iter().fold(Attributes::default(), |mut attrs, h| {
            attrs.add_object(h);

            attrs
        });

        if objects.len() < 2 {
            debug!("Fewer than two hit objects, skipping difficulty calculation");

            return attrs;
        }

        let diff_objects = create_difficulty_objects(objects, diff);
        let mut skills = Skills::new(diff, false);

        for curr in diff_objects.iter() {
            skills.process(curr, &diff_objects);
        }

        skills.eval(diff.get_mods(), attrs)
    }

    fn calculate_step(&self, objects: &[HitObject], diff: &Difficulty) -> Vec<Attributes> {
        let Some((first, rest)) = objects.split_first() else {
            debug!("No hit objects, skipping step calculation");

            return Vec::new();
        };

        let mods = diff.get_mods();
        info!("Calculating step attributes for mods: {}", mods.difficulty_mask().acronyms());

        let start = Instant::now();

        let diff_objects = create_difficulty_objects(objects, diff);
        let mut skills = Skills::new(diff, true);

        let mut counts = Attributes::default();
        counts.add_object(first);

        let mut steps = Vec::with_capacity(objects.len());
        steps.push(counts.clone());

        for (i, (curr, h)) in diff_objects.iter().zip(rest).enumerate() {
            counts.add_object(h);

            // The last object of a prefix has no successor to look ahead to
            let mut prefix = skills.clone();
            prefix.process(curr, &diff_objects[..=i]);
            steps.push(prefix.eval(mods, counts.clone()));

            skills.process(curr, &diff_objects);
        }

        info!("Step calculation finished in {:?}", start.elapsed());

        steps
    }

    fn calculate_strain_peaks(&self, objects: &[HitObject], diff: &Difficulty) -> StrainPeaks {
        let diff_objects = create_difficulty_objects(objects, diff);
        let mut skills = Skills::new(diff, false);

        for curr in diff_objects.iter() {
            skills.aim.process(curr, &diff_objects);
            skills.speed.process(curr, &diff_objects);
            skills.flashlight.process(curr, &diff_objects);
        }

        let aim = skills.aim.current_strain_peaks();
        let speed = skills.speed.current_strain_peaks();
        let flashlight = skills.flashlight.current_strain_peaks();
        let mods = diff.get_mods();

        let len = aim.len().max(speed.len()).max(flashlight.len());

        let total = (0..len)
            .map(|i| {
                let peak = |peaks: &[f64]| peaks.get(i).copied().unwrap_or(0.0);
                let mut attrs = Attributes::default();
                let aim_peak = peak(&aim);
                eval_ratings(&mut attrs, mods, aim_peak, aim_peak, peak(&speed), peak(&flashlight));

                attrs.total
            })
            .collect();

        StrainPeaks {
            aim,
            speed,
            flashlight,
            total,
        }
    }

    fn version(&self) -> u32 {
        VERSION
    }

    fn version_message(&self) -> &'static str {
        "2024-10-07: no post yet"
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::{HitObject, Pos};

    use super::*;

    #[test]
    fn zero_ratings_keep_base_total() {
        let mut attrs = Attributes::default();
        eval_ratings(&mut attrs, 0, 0.0, 0.0, 0.0, 0.0);

        assert_abs_diff_eq!(attrs.aim, 0.0);
        assert_abs_diff_eq!(attrs.slider_factor, 1.0);
        assert_abs_diff_eq!(attrs.total, 1.15_f64.cbrt() * 0.027 * 5.0, epsilon = 1e-9);
    }

    #[test]
    fn relax_removes_speed() {
        let mut attrs = Attributes::default();
        eval_ratings(&mut attrs, u32::RX, 400.0, 400.0, 400.0, 0.0);

        assert_abs_diff_eq!(attrs.speed, 0.0);
        assert_abs_diff_eq!(attrs.aim, 20.0 * DIFFICULTY_MULTIPLIER * 0.9, epsilon = 1e-12);
    }

    #[test]
    fn empty_strain_peaks() {
        let diff = Difficulty::new(5.0, 5.0, 5.0, 5.0);
        let objects = [HitObject::circle(Pos::new(0.0, 0.0), 0.0)];

        let peaks = DifficultyCalculator20241007.calculate_strain_peaks(&objects, &diff);

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks.total.len(), 1);
        assert_abs_diff_eq!(peaks.aim[0], 0.0);
    }
}
