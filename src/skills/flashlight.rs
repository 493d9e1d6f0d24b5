use crate::{difficulty::Difficulty, preprocessing::object::DifficultyObject};

use super::strain::{strain_decay, StrainEvaluator, StrainSkill};

const SKILL_MULTIPLIER: f64 = 0.05512;
const STRAIN_DECAY_BASE: f64 = 0.15;

const MAX_OPACITY_BONUS: f64 = 0.4;
const HIDDEN_BONUS: f64 = 0.2;
const MIN_VELOCITY: f64 = 0.5;
const SLIDER_MULTIPLIER: f64 = 1.3;
const MIN_ANGLE_MULTIPLIER: f64 = 0.2;

/// Memorisation difficulty of objects hidden behind the flashlight.
#[derive(Clone, Debug)]
pub(crate) struct FlashlightEvaluator {
    curr_strain: f64,
    hidden: bool,
    scaling_factor: f64,
    time_preempt: f64,
    time_fade_in: f64,
}

impl FlashlightEvaluator {
    pub fn new(diff: &Difficulty) -> Self {
        Self {
            curr_strain: 0.0,
            hidden: diff.hidden(),
            scaling_factor: 52.0 / diff.circle_radius_unscaled(),
            time_preempt: diff.preempt(),
            time_fade_in: diff.time_fade_in(),
        }
    }

    fn evaluate<'a>(&self, curr: &DifficultyObject<'a>, objects: &[DifficultyObject<'a>]) -> f64 {
        if curr.is_spinner() {
            return 0.0;
        }

        let mut small_dist_nerf = 1.0;
        let mut cumulative_strain_time = 0.0;
        let mut angle_repeat_count = 0.0;
        let mut result = 0.0;

        let mut last_obj = curr;

        for i in 0..curr.idx.min(10) {
            let Some(curr_obj) = curr.previous(i, objects) else {
                break;
            };

            if !curr_obj.is_spinner() {
                let jump_dist = f64::from(curr.stacked_pos.distance(curr_obj.stacked_end_pos));
                cumulative_strain_time += last_obj.strain_time;

                // Objects within the flashlight radius are easy to see
                if i == 0 {
                    small_dist_nerf = (jump_dist / 75.0).min(1.0);
                }

                // Only the first object of a stack counts
                let stack_nerf = ((curr_obj.lazy_jump_dist / self.scaling_factor) / 25.0).min(1.0);

                let opacity = curr.opacity_at(
                    curr_obj.base.start_time,
                    self.hidden,
                    self.time_preempt,
                    self.time_fade_in,
                );
                let opacity_bonus = 1.0 + MAX_OPACITY_BONUS * (1.0 - opacity);

                result += stack_nerf * opacity_bonus * self.scaling_factor * jump_dist
                    / cumulative_strain_time;

                if let Some((obj_angle, curr_angle)) = curr_obj.angle.zip(curr.angle) {
                    // Older objects count less
                    if (obj_angle - curr_angle).abs() < 0.02 {
                        angle_repeat_count += (1.0 - 0.1 * i as f64).max(0.0);
                    }
                }
            }

            last_obj = curr_obj;
        }

        result = (small_dist_nerf * result).powf(2.0);

        if self.hidden {
            result *= 1.0 + HIDDEN_BONUS;
        }

        result *= MIN_ANGLE_MULTIPLIER + (1.0 - MIN_ANGLE_MULTIPLIER) / (angle_repeat_count + 1.0);

        let mut slider_bonus = 0.0;

        if let Some(ref slider) = curr.lazy_slider {
            let pixel_travel_dist = f64::from(slider.travel_dist) / self.scaling_factor;

            slider_bonus = (pixel_travel_dist / curr.travel_time - MIN_VELOCITY)
                .max(0.0)
                .powf(0.5);

            // Longer sliders need more memorisation, repeats need less
            slider_bonus *= pixel_travel_dist;

            if slider.repeat_count > 0 {
                slider_bonus /= (slider.repeat_count + 1) as f64;
            }
        }

        result + slider_bonus * SLIDER_MULTIPLIER
    }
}

impl StrainEvaluator for FlashlightEvaluator {
    fn strain_value_at<'a>(
        &mut self,
        curr: &DifficultyObject<'a>,
        objects: &[DifficultyObject<'a>],
    ) -> f64 {
        self.curr_strain *= strain_decay(curr.delta_time, STRAIN_DECAY_BASE);
        self.curr_strain += self.evaluate(curr, objects) * SKILL_MULTIPLIER;

        self.curr_strain
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

        self.curr_strain * strain_decay(time - prev_start_time, STRAIN_DECAY_BASE)
    }

    fn difficulty_value(strain: &StrainSkill) -> f64 {
        strain.summed_peaks()
    }
}

pub(crate) fn flashlight_difficulty_to_performance(difficulty: f64) -> f64 {
    difficulty.powf(2.0) * 25.0
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::{
        mods::GameMods, preprocessing::create_difficulty_objects, skills::strain::Skill,
        Difficulty, HitObject, Pos,
    };

    use super::*;

    fn flashlight_value(diff: &Difficulty, spacing: f32) -> f64 {
        let objects: Vec<_> = (0..30)
            .map(|i| {
                let x = if i % 2 == 0 { 100.0 } else { 100.0 + spacing };

                HitObject::circle(Pos::new(x, 192.0), f64::from(i) * 200.0)
            })
            .collect();

        let diff_objects = create_difficulty_objects(&objects, diff);
        let mut skill = Skill::new(FlashlightEvaluator::new(diff), false, false);

        for curr in diff_objects.iter() {
            skill.process(curr, &diff_objects);
        }

        skill.difficulty_value()
    }

    #[test]
    fn difficulty_is_sum_of_peaks() {
        let diff = Difficulty::new(5.0, 5.0, 5.0, 5.0).mods(u32::FL);
        let objects: Vec<_> = (0..10)
            .map(|i| HitObject::circle(Pos::new(i as f32 * 40.0, 0.0), f64::from(i) * 300.0))
            .collect();

        let diff_objects = create_difficulty_objects(&objects, &diff);
        let mut skill = Skill::new(FlashlightEvaluator::new(&diff), false, false);

        for curr in diff_objects.iter() {
            skill.process(curr, &diff_objects);
        }

        let sum: f64 = skill.current_strain_peaks().iter().sum();

        assert_abs_diff_eq!(skill.difficulty_value(), sum, epsilon = 1e-12);
    }

    #[test]
    fn larger_jumps_are_harder() {
        let diff = Difficulty::new(5.0, 5.0, 5.0, 5.0).mods(u32::FL);

        assert!(flashlight_value(&diff, 300.0) > flashlight_value(&diff, 50.0));
    }

    #[test]
    fn hidden_is_harder() {
        let fl = Difficulty::new(5.0, 5.0, 5.0, 5.0).mods(u32::FL);
        let hdfl = Difficulty::new(5.0, 5.0, 5.0, 5.0).mods(u32::FL | u32::HD);

        assert!(flashlight_value(&hdfl, 200.0) > flashlight_value(&fl, 200.0));
    }

    #[test]
    fn performance_is_quadratic() {
        assert_abs_diff_eq!(flashlight_difficulty_to_performance(2.0), 100.0);
    }
}
