use crate::{
    preprocessing::object::{DifficultyObject, NORMALIZED_DIAMETER, NORMALIZED_RADIUS},
    skills::strain::{strain_decay, RelevantCount, StrainEvaluator},
    util::difficulty::{degrees_to_radians, milliseconds_to_bpm, reverse_lerp, smootherstep, smoothstep},
};

const SKILL_MULTIPLIER: f64 = 25.6;
const STRAIN_DECAY_BASE: f64 = 0.15;

const WIDE_ANGLE_MULTIPLIER: f64 = 1.5;
const ACUTE_ANGLE_MULTIPLIER: f64 = 2.6;
const SLIDER_MULTIPLIER: f64 = 1.35;
const VELOCITY_CHANGE_MULTIPLIER: f64 = 0.75;
const WIGGLE_MULTIPLIER: f64 = 1.02;

/// Difficulty of moving the cursor between objects.
///
/// Also keeps track of how many sliders are difficult to follow.
#[derive(Clone, Debug)]
pub(crate) struct AimEvaluator {
    curr_strain: f64,
    with_sliders: bool,
    difficult_sliders: RelevantCount,
}

impl AimEvaluator {
    pub const fn new(with_sliders: bool, step: bool) -> Self {
        Self {
            curr_strain: 0.0,
            with_sliders,
            difficult_sliders: RelevantCount::new(step),
        }
    }

    pub fn difficult_slider_count(&self) -> f64 {
        self.difficult_sliders.value()
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

        if curr.is_slider() {
            self.difficult_sliders.push(self.curr_strain);
        }

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
    const RADIUS: f64 = NORMALIZED_RADIUS;
    const DIAMETER: f64 = NORMALIZED_DIAMETER;

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
    let mut slider_bonus = 0.0;
    let mut velocity_change_bonus = 0.0;
    let mut wiggle_bonus = 0.0;

    let mut aim_strain = curr_velocity;

    let same_rhythm = curr.strain_time.max(last.strain_time)
        < 1.25 * curr.strain_time.min(last.strain_time);

    if let (true, Some(curr_angle), Some(last_angle)) = (same_rhythm, curr.angle, last.angle) {
        let angle_bonus = curr_velocity.min(prev_velocity);

        wide_angle_bonus = calc_wide_angle_bonus(curr_angle);
        acute_angle_bonus = calc_acute_angle_bonus(curr_angle);

        // Repeated angles are penalized
        wide_angle_bonus *= 1.0 - wide_angle_bonus.min(calc_wide_angle_bonus(last_angle).powf(3.0));
        acute_angle_bonus *= 0.08
            + 0.92 * (1.0 - acute_angle_bonus.min(calc_acute_angle_bonus(last_angle).powf(3.0)));

        wide_angle_bonus *= angle_bonus * smootherstep(curr.lazy_jump_dist, 0.0, DIAMETER);

        // Above 300 bpm 1/2 and one diameter apart
        acute_angle_bonus *= angle_bonus
            * smootherstep(milliseconds_to_bpm(curr.strain_time, Some(2)), 300.0, 400.0)
            * smootherstep(curr.lazy_jump_dist, DIAMETER, DIAMETER * 2.0);

        // Jumps between one radius and three diameters with angles below 110 degrees
        wiggle_bonus = angle_bonus
            * smootherstep(curr.lazy_jump_dist, RADIUS, DIAMETER)
            * reverse_lerp(curr.lazy_jump_dist, DIAMETER * 3.0, DIAMETER).powf(1.8)
            * smootherstep(curr_angle, degrees_to_radians(110.0), degrees_to_radians(60.0))
            * smootherstep(last.lazy_jump_dist, RADIUS, DIAMETER)
            * reverse_lerp(last.lazy_jump_dist, DIAMETER * 3.0, DIAMETER).powf(1.8)
            * smootherstep(last_angle, degrees_to_radians(110.0), degrees_to_radians(60.0));
    }

    if prev_velocity.max(curr_velocity) > 0.0 {
        prev_velocity = (last.lazy_jump_dist + last_last.travel_dist) / last.strain_time;
        curr_velocity = (curr.lazy_jump_dist + last.travel_dist) / curr.strain_time;

        let dist_ratio = (std::f64::consts::FRAC_PI_2 * (prev_velocity - curr_velocity).abs()
            / prev_velocity.max(curr_velocity))
        .sin()
        .powf(2.0);

        let overlap_velocity_buff = (DIAMETER * 1.25 / curr.strain_time.min(last.strain_time))
            .min((prev_velocity - curr_velocity).abs());

        velocity_change_bonus = overlap_velocity_buff
            * dist_ratio
            * (curr.strain_time.min(last.strain_time) / curr.strain_time.max(last.strain_time))
                .powf(2.0);
    }

    if last.is_slider() {
        slider_bonus = last.travel_dist / last.travel_time;
    }

    aim_strain += wiggle_bonus * WIGGLE_MULTIPLIER;

    aim_strain += (acute_angle_bonus * ACUTE_ANGLE_MULTIPLIER).max(
        wide_angle_bonus * WIDE_ANGLE_MULTIPLIER
            + velocity_change_bonus * VELOCITY_CHANGE_MULTIPLIER,
    );

    if with_sliders {
        aim_strain += slider_bonus * SLIDER_MULTIPLIER;
    }

    aim_strain
}

fn calc_wide_angle_bonus(angle: f64) -> f64 {
    smoothstep(angle, degrees_to_radians(40.0), degrees_to_radians(140.0))
}

fn calc_acute_angle_bonus(angle: f64) -> f64 {
    smoothstep(angle, degrees_to_radians(140.0), degrees_to_radians(40.0))
}
