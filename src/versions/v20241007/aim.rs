use std::f64::consts::{FRAC_PI_2, FRAC_PI_6, PI};

use crate::{
    preprocessing::object::DifficultyObject,
    skills::strain::{strain_decay, StrainEvaluator},
};

const SKILL_MULTIPLIER: f64 = 25.18;
const STRAIN_DECAY_BASE: f64 = 0.15;

const WIDE_ANGLE_MULTIPLIER: f64 = 1.5;
const ACUTE_ANGLE_MULTIPLIER: f64 = 1.95;
const SLIDER_MULTIPLIER: f64 = 1.35;
const VELOCITY_CHANGE_MULTIPLIER: f64 = 0.75;

/// Difficulty of moving the cursor between objects.
#[derive(Clone, Debug)]
pub(crate) struct AimEvaluator {
    curr_strain: f64,
    with_sliders: bool,
}

impl AimEvaluator {
    pub const fn new(with_sliders: bool) -> Self {
        Self {
            curr_strain: 0.0,
            with_sliders,
        }
    }
}

impl StrainEvaluator for AimEvaluator {
    fn strain_value_at<'a>(
        &mut self,
        curr: &DifficultyObject<'a>,
        objects: &[DifficultyObject<'a>],
    ) -> f64 {
        self.curr_strain *= strain_decay(curr.delta_time, STRAIN_DECAY_BASE);
        self.curr_strain += evaluate_aim(curr, objects, self.with_sliders) * SKILL_MULTIPLIER;

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
}

fn evaluate_aim<'a>(
    curr: &DifficultyObject<'a>,
    objects: &[DifficultyObject<'a>],
    with_sliders: bool,
) -> f64 {
    if curr.is_spinner() || curr.idx <= 1 {
        return 0.0;
    }

    let (Some(last), Some(last_last)) = (curr.previous(0, objects), curr.previous(1, objects))
    else {
        return 0.0;
    };

    if last.is_spinner() {
        return 0.0;
    }

    // Velocity of the jump, extended through the previous slider if there is one
    let mut curr_velocity = curr.lazy_jump_dist / curr.strain_time;

    if last.is_slider() && with_sliders {
        let travel_velocity = last.travel_dist / last.travel_time;
        let movement_velocity = curr.min_jump_dist / curr.min_jump_time;

        curr_velocity = curr_velocity.max(movement_velocity + travel_velocity);
    }

    let mut prev_velocity = last.lazy_jump_dist / last.strain_time;

    if last_last.is_slider() && with_sliders {
        let travel_velocity = last_last.travel_dist / last_last.travel_time;
        let movement_velocity = last.min_jump_dist / last.min_jump_time;

        prev_velocity = prev_velocity.max(movement_velocity + travel_velocity);
    }

    let mut wide_angle_bonus = 0.0;
    let mut acute_angle_bonus = 0.0;
    let mut velocity_change_bonus = 0.0;

    let mut aim_strain = curr_velocity;

    let same_rhythm = curr.strain_time.max(last.strain_time)
        < 1.25 * curr.strain_time.min(last.strain_time);

    if let (true, Some(curr_angle), Some(last_angle), Some(last_last_angle)) =
        (same_rhythm, curr.angle, last.angle, last_last.angle)
    {
        let angle_bonus = curr_velocity.min(prev_velocity);

        wide_angle_bonus = calc_wide_angle_bonus(curr_angle);
        acute_angle_bonus = calc_acute_angle_bonus(curr_angle);

        // Only above 300 bpm 1/2
        if curr.strain_time > 100.0 {
            acute_angle_bonus = 0.0;
        } else {
            acute_angle_bonus *= calc_acute_angle_bonus(last_angle)
                * angle_bonus.min(125.0 / curr.strain_time)
                * (FRAC_PI_2 * ((100.0 - curr.strain_time) / 25.0).min(1.0))
                    .sin()
                    .powf(2.0)
                * (FRAC_PI_2 * (curr.lazy_jump_dist.clamp(50.0, 100.0) - 50.0) / 50.0)
                    .sin()
                    .powf(2.0);
        }

        // Repeated angles are penalized
        wide_angle_bonus *= angle_bonus
            * (1.0 - wide_angle_bonus.min(calc_wide_angle_bonus(last_angle).powf(3.0)));
        acute_angle_bonus *= 0.5
            + 0.5 * (1.0 - acute_angle_bonus.min(calc_acute_angle_bonus(last_last_angle).powf(3.0)));
    }

    if prev_velocity.max(curr_velocity) > 0.0 {
        // Average velocity across the whole object instead of jump and path separately
        prev_velocity = (last.lazy_jump_dist + last_last.travel_dist) / last.strain_time;
        curr_velocity = (curr.lazy_jump_dist + last.travel_dist) / curr.strain_time;

        let dist_ratio = (FRAC_PI_2 * (prev_velocity - curr_velocity).abs()
            / prev_velocity.max(curr_velocity))
        .sin()
        .powf(2.0);

        let overlap_velocity_buff = (125.0 / curr.strain_time.min(last.strain_time))
            .min((prev_velocity - curr_velocity).abs());

        velocity_change_bonus = overlap_velocity_buff * dist_ratio;

        // Rhythm changes are penalized
        velocity_change_bonus *= (curr.strain_time.min(last.strain_time)
            / curr.strain_time.max(last.strain_time))
        .powf(2.0);
    }

    aim_strain += (acute_angle_bonus * ACUTE_ANGLE_MULTIPLIER).max(
        wide_angle_bonus * WIDE_ANGLE_MULTIPLIER
            + velocity_change_bonus * VELOCITY_CHANGE_MULTIPLIER,
    );

    if last.is_slider() && with_sliders {
        let slider_bonus = last.travel_dist / last.travel_time;
        aim_strain += slider_bonus * SLIDER_MULTIPLIER;
    }

    aim_strain
}

fn calc_wide_angle_bonus(angle: f64) -> f64 {
    (3.0 / 4.0 * ((5.0 / 6.0 * PI).min(angle.max(FRAC_PI_6)) - FRAC_PI_6))
        .sin()
        .powf(2.0)
}

fn calc_acute_angle_bonus(angle: f64) -> f64 {
    1.0 - calc_wide_angle_bonus(angle)
}
