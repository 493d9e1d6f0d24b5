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

pub(super) const VERSION: u32 = 20_250_306;

/// Star rating calculation as of 2025-03-06.
#[derive(Copy, Clone, Debug, Default)]
pub struct DifficultyCalculator20250306;

#[derive(Clone)]
struct Skills {
    aim: Skill<AimEvaluator>,
    aim_no_sliders: Skill<AimEvaluator>,
    speed: Skill<SpeedEvaluator>,
    flashlight: Skill<FlashlightEvaluator>,
}

impl Skills {
    fn new(diff: &Difficulty, step: bool) -> Self {
        let autopilot = diff.get_mods().ap();

        Self {
            aim: Skill::new(AimEvaluator::new(true, step), true, step),
            aim_no_sliders: Skill::new(AimEvaluator::new(false, false), true, false),
            speed: Skill::new(SpeedEvaluator::new(autopilot, step), true, step),
            flashlight: Skill::new(FlashlightEvaluator::new(diff), true, false),
        }
    }

    fn process<'a>(&mut self, curr: &DifficultyObject<'a>, objects: &[DifficultyObject<'a>]) {
        self.aim.process(curr, objects);
        self.aim_no_sliders.process(curr, objects);
        self.speed.process(curr, objects);
        self.flashlight.process(curr, objects);
    }

    fn eval(&self, mods: u32, mut attrs: Attributes) -> Attributes {
        let ratings = Ratings::new(
            mods,
            self.aim.difficulty_value(),
            self.aim_no_sliders.difficulty_value(),
            self.speed.difficulty_value(),
            self.flashlight.difficulty_value(),
        );

        ratings.apply(&mut attrs);

        attrs.speed_note_count = self.speed.evaluator.relevant_note_count();
        attrs.aim_difficult_strain_count = self.aim.count_difficult_strains();
        attrs.speed_difficult_strain_count = self.speed.count_difficult_strains();
        attrs.aim_difficult_slider_count = self.aim.evaluator.difficult_slider_count();

        attrs
    }
}

/// Star ratings derived from raw skill values.
struct Ratings {
    aim: f64,
    speed: f64,
    flashlight: f64,
    slider_factor: f64,
    total: f64,
}

impl Ratings {
    fn new(
        mods: u32,
        aim_difficulty_value: f64,
        aim_no_sliders_difficulty_value: f64,
        speed_difficulty_value: f64,
        flashlight_difficulty_value: f64,
    ) -> Self {
        let mut aim = aim_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;
        let aim_no_sliders = aim_no_sliders_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;
        let mut speed = speed_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;
        let mut flashlight = flashlight_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;

        let slider_factor = if aim > 0.00001 {
            aim_no_sliders / aim
        } else {
            1.0
        };

        if mods.td() {
            aim = aim.powf(0.8);
            flashlight = flashlight.powf(0.8);
        }

        if mods.rx() {
            aim *= 0.9;
            speed = 0.0;
            flashlight *= 0.7;
        }

        let base_flashlight_performance = if mods.fl() {
            flashlight_difficulty_to_performance(flashlight)
        } else {
            0.0
        };

        let base_performance = (difficulty_to_performance(aim).powf(1.1)
            + difficulty_to_performance(speed).powf(1.1)
            + base_flashlight_performance.powf(1.1))
        .powf(1.0 / 1.1);

        let total = if base_performance > 0.00001 {
            PERFORMANCE_BASE_MULTIPLIER.cbrt()
                * 0.027
                * ((100_000.0 / 2.0_f64.powf(1.0 / 1.1) * base_performance).cbrt() + 4.0)
        } else {
            0.0
        };

        Self {
            aim,
            speed,
            flashlight,
            slider_factor,
            total,
        }
    }

    fn apply(&self, attrs: &mut Attributes) {
        attrs.aim = self.aim;
        attrs.speed = self.speed;
        attrs.flashlight = self.flashlight;
        attrs.slider_factor = self.slider_factor;
        attrs.total = self.total;
    }
}

impl DifficultyCalculator for DifficultyCalculator20250306 {
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

        info!(
            "Step calculation finished for {} objects in {:?}",
            steps.len(),
            start.elapsed()
        );

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
        let peak = |peaks: &[f64], i: usize| peaks.get(i).copied().unwrap_or(0.0);

        let total = (0..len)
            .map(|i| {
                let aim_peak = peak(&aim, i);

                Ratings::new(mods, aim_peak, aim_peak, peak(&speed, i), peak(&flashlight, i)).total
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
        "2025-03-06: https://osu.ppy.sh/home/news/2025-03-06-performance-points-star-rating-updates"
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::{HitObject, Pos};

    use super::*;

    #[test]
    fn touch_device_softens_aim() {
        let nomod = Ratings::new(0, 900.0, 900.0, 0.0, 0.0);
        let touch = Ratings::new(u32::TD, 900.0, 900.0, 0.0, 0.0);

        assert_abs_diff_eq!(nomod.aim, 30.0 * DIFFICULTY_MULTIPLIER, epsilon = 1e-12);
        assert_abs_diff_eq!(touch.aim, nomod.aim.powf(0.8), epsilon = 1e-12);
    }

    #[test]
    fn flashlight_only_counts_with_mod() {
        let without = Ratings::new(0, 0.0, 0.0, 0.0, 10_000.0);
        let with = Ratings::new(u32::FL, 0.0, 0.0, 0.0, 10_000.0);

        assert_abs_diff_eq!(without.flashlight, with.flashlight);
        assert!(with.total > without.total);
    }

    #[test]
    fn first_step_only_counts() {
        let diff = Difficulty::new(5.0, 5.0, 5.0, 5.0);
        let objects: Vec<_> = (0..4)
            .map(|i| HitObject::circle(Pos::new(i as f32 * 80.0, 100.0), f64::from(i) * 200.0))
            .collect();

        let steps = DifficultyCalculator20250306.calculate_step(&objects, &diff);

        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].object_count, 1);
        assert_eq!(steps[0].circles, 1);
        assert_eq!(steps[0].max_combo, 1);
        assert_abs_diff_eq!(steps[0].total, 0.0);
        assert_eq!(steps[3].object_count, 4);
        assert_eq!(steps[3].max_combo, 4);
    }
}
