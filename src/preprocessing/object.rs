use crate::{
    difficulty::Difficulty,
    model::{
        hit_object::{HitObject, HitObjectKind},
        pos::Pos,
    },
};

use super::lazy_slider::LazySlider;

pub(crate) const NORMALIZED_RADIUS: f64 = 50.0;
pub(crate) const NORMALIZED_DIAMETER: f64 = NORMALIZED_RADIUS * 2.0;
pub(crate) const MIN_DELTA_TIME: f64 = 25.0;
pub(crate) const ASSUMED_SLIDER_RADIUS: f64 = NORMALIZED_RADIUS * 1.8;

const MAX_SLIDER_RADIUS: f64 = NORMALIZED_RADIUS * 2.4;
const CIRCLE_SIZE_BUFF_THRESHOLD: f64 = 30.0;

/// A hit object with everything that depends on the difficulty settings
/// resolved, i.e. stacked positions and the lazy slider approximation.
pub(crate) struct PreparedObject<'a> {
    pub base: &'a HitObject,
    pub stacked_pos: Pos,
    pub stacked_end_pos: Pos,
    pub lazy_slider: Option<LazySlider>,
}

impl<'a> PreparedObject<'a> {
    pub fn new(base: &'a HitObject, diff: &Difficulty) -> Self {
        let lazy_slider = match base.kind {
            HitObjectKind::Slider(ref slider) => Some(LazySlider::new(base, slider, diff)),
            HitObjectKind::Circle | HitObjectKind::Spinner { .. } => None,
        };

        Self {
            base,
            stacked_pos: base.stacked_pos(diff),
            stacked_end_pos: base.stacked_end_pos(diff),
            lazy_slider,
        }
    }

    fn end_cursor_pos(&self) -> Pos {
        self.lazy_slider
            .as_ref()
            .map_or(self.stacked_pos, |slider| slider.end_pos)
    }

    fn tail_pos(&self, diff: &Difficulty) -> Pos {
        match self.base.kind {
            HitObjectKind::Slider(ref slider) => slider
                .tail()
                .map_or(self.stacked_end_pos, |tail| self.base.stacked_nested_pos(tail, diff)),
            HitObjectKind::Circle | HitObjectKind::Spinner { .. } => self.stacked_pos,
        }
    }
}

/// Per-object features consumed by the skills. The object at `idx` belongs
/// to the hit object at `idx + 1`.
pub(crate) struct DifficultyObject<'a> {
    pub idx: usize,
    pub base: &'a HitObject,
    pub stacked_pos: Pos,
    pub stacked_end_pos: Pos,
    pub lazy_slider: Option<LazySlider>,

    pub start_time: f64,
    pub delta_time: f64,
    pub strain_time: f64,
    pub lazy_jump_dist: f64,
    pub min_jump_dist: f64,
    pub min_jump_time: f64,
    pub travel_dist: f64,
    pub travel_time: f64,
    pub angle: Option<f64>,
    pub great_window: f64,
}

impl<'a> DifficultyObject<'a> {
    pub fn new(
        curr: &PreparedObject<'a>,
        last: &PreparedObject<'_>,
        last_last: Option<&PreparedObject<'_>>,
        diff: &Difficulty,
        idx: usize,
    ) -> Self {
        let clock_rate = diff.speed();
        let base = curr.base;

        let delta_time = (base.start_time - last.base.start_time) / clock_rate;
        let strain_time = delta_time.max(MIN_DELTA_TIME);

        let mut this = Self {
            idx,
            base,
            stacked_pos: curr.stacked_pos,
            stacked_end_pos: curr.stacked_end_pos,
            lazy_slider: curr.lazy_slider.clone(),
            start_time: base.start_time / clock_rate,
            delta_time,
            strain_time,
            lazy_jump_dist: 0.0,
            min_jump_dist: 0.0,
            min_jump_time: 0.0,
            travel_dist: 0.0,
            travel_time: 0.0,
            angle: None,
            great_window: 2.0 * diff.hit_window_great() / clock_rate,
        };

        this.set_distances(last, last_last, diff);

        this
    }

    pub fn is_slider(&self) -> bool {
        self.base.is_slider()
    }

    pub fn is_spinner(&self) -> bool {
        self.base.is_spinner()
    }

    pub fn previous<'o>(
        &self,
        backwards_idx: usize,
        diff_objects: &'o [DifficultyObject<'a>],
    ) -> Option<&'o DifficultyObject<'a>> {
        self.idx
            .checked_sub(backwards_idx + 1)
            .and_then(|idx| diff_objects.get(idx))
    }

    pub fn next<'o>(
        &self,
        forwards_idx: usize,
        diff_objects: &'o [DifficultyObject<'a>],
    ) -> Option<&'o DifficultyObject<'a>> {
        diff_objects.get(self.idx + (forwards_idx + 1))
    }

    /// Visibility of this object at the given chart time in `[0, 1]`.
    pub fn opacity_at(&self, time: f64, hidden: bool, preempt: f64, time_fade_in: f64) -> f64 {
        let start_time = self.base.start_time;

        if time > start_time {
            // Invisible once its start time has passed
            return 0.0;
        }

        let fade_in_start_time = start_time - preempt;
        let fade_in = ((time - fade_in_start_time) / time_fade_in).clamp(0.0, 1.0);

        if hidden {
            let fade_out_start_time = start_time - preempt + time_fade_in;
            let fade_out_duration = preempt * Difficulty::HD_FADE_OUT_DURATION_MULTIPLIER;

            fade_in.min(1.0 - ((time - fade_out_start_time) / fade_out_duration).clamp(0.0, 1.0))
        } else {
            fade_in
        }
    }

    /// Likelihood that this object and the next one are hit as a single
    /// doubletapped note.
    pub fn doubletapness(&self, next: Option<&Self>) -> f64 {
        let Some(next) = next else { return 0.0 };

        let curr_delta_time = self.delta_time.max(1.0);
        let next_delta_time = next.delta_time.max(1.0);
        let delta_diff = (next_delta_time - curr_delta_time).abs();
        let speed_ratio = curr_delta_time / curr_delta_time.max(delta_diff);
        let window_ratio = (curr_delta_time / self.great_window).min(1.0).powf(2.0);

        1.0 - speed_ratio.powf(1.0 - window_ratio)
    }

    fn set_distances(
        &mut self,
        last: &PreparedObject<'_>,
        last_last: Option<&PreparedObject<'_>>,
        diff: &Difficulty,
    ) {
        let clock_rate = diff.speed();

        if let Some(ref slider) = self.lazy_slider {
            self.travel_dist = f64::from(
                slider.travel_dist
                    * ((1.0 + slider.repeat_count as f64 / 2.5).powf(1.0 / 2.5)) as f32,
            );

            self.travel_time = (slider.travel_time / clock_rate).max(MIN_DELTA_TIME);
        }

        if self.is_spinner() || last.base.is_spinner() {
            return;
        }

        let radius = diff.circle_radius_unscaled();
        let mut scaling_factor = NORMALIZED_RADIUS as f32 / radius as f32;

        if radius < CIRCLE_SIZE_BUFF_THRESHOLD {
            let small_circle_bonus =
                (CIRCLE_SIZE_BUFF_THRESHOLD as f32 - radius as f32).min(5.0) / 50.0;
            scaling_factor *= 1.0 + small_circle_bonus;
        }

        let last_cursor_pos = last.end_cursor_pos();

        self.lazy_jump_dist = f64::from(
            (self.stacked_pos * scaling_factor - last_cursor_pos * scaling_factor).length(),
        );
        self.min_jump_time = self.strain_time;
        self.min_jump_dist = self.lazy_jump_dist;

        if let Some(ref last_slider) = last.lazy_slider {
            let last_travel_time = (last_slider.travel_time / clock_rate).max(MIN_DELTA_TIME);
            self.min_jump_time = (self.strain_time - last_travel_time).max(MIN_DELTA_TIME);

            // The player either cuts the slider short or follows through to
            // its tail, whichever needs less movement
            let tail_jump_dist = (last.tail_pos(diff) - self.stacked_pos).length() * scaling_factor;

            self.min_jump_dist = (self.lazy_jump_dist - (MAX_SLIDER_RADIUS - ASSUMED_SLIDER_RADIUS))
                .min(f64::from(tail_jump_dist - MAX_SLIDER_RADIUS as f32))
                .max(0.0);
        }

        if let Some(last_last) = last_last.filter(|h| !h.base.is_spinner()) {
            let last_last_cursor_pos = last_last.end_cursor_pos();

            let v1 = last_last_cursor_pos - last.stacked_pos;
            let v2 = self.stacked_pos - last_cursor_pos;

            let dot = v1.dot(v2);
            let det = v1.x * v2.y - v1.y * v2.x;

            self.angle = Some(f64::from(det.atan2(dot).abs()));
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::{preprocessing::create_difficulty_objects, Difficulty, HitObject, Pos};

    #[test]
    fn first_object_has_no_angle() {
        let diff = Difficulty::new(5.0, 5.0, 5.0, 5.0);
        let objects = [
            HitObject::circle(Pos::new(0.0, 0.0), 0.0),
            HitObject::circle(Pos::new(100.0, 0.0), 200.0),
            HitObject::circle(Pos::new(100.0, 100.0), 400.0),
        ];

        let diff_objects = create_difficulty_objects(&objects, &diff);

        assert_eq!(diff_objects.len(), 2);
        assert!(diff_objects[0].angle.is_none());

        let angle = diff_objects[1].angle.unwrap();
        assert_abs_diff_eq!(angle, std::f64::consts::FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn jump_distance_is_radius_normalized() {
        // CS 4 gives a radius of 36.48
        let diff = Difficulty::new(5.0, 4.0, 5.0, 5.0);
        let objects = [
            HitObject::circle(Pos::new(0.0, 0.0), 0.0),
            HitObject::circle(Pos::new(100.0, 0.0), 10.0),
        ];

        let diff_objects = create_difficulty_objects(&objects, &diff);
        let expected = 100.0 * 50.0 / diff.circle_radius_unscaled();

        assert_abs_diff_eq!(diff_objects[0].lazy_jump_dist, expected, epsilon = 1e-3);
        assert_abs_diff_eq!(diff_objects[0].strain_time, 25.0);
    }

    #[test]
    fn spinners_suppress_distances() {
        let diff = Difficulty::new(5.0, 5.0, 5.0, 5.0);
        let objects = [
            HitObject::spinner(Pos::new(256.0, 192.0), 0.0, 1000.0),
            HitObject::circle(Pos::new(0.0, 0.0), 1500.0),
        ];

        let diff_objects = create_difficulty_objects(&objects, &diff);

        assert_abs_diff_eq!(diff_objects[0].lazy_jump_dist, 0.0);
    }

    #[test]
    fn doubletapness_needs_next_object() {
        let diff = Difficulty::new(5.0, 5.0, 5.0, 5.0);
        let objects = [
            HitObject::circle(Pos::new(0.0, 0.0), 0.0),
            HitObject::circle(Pos::new(0.0, 0.0), 10.0),
            HitObject::circle(Pos::new(0.0, 0.0), 200.0),
        ];

        let diff_objects = create_difficulty_objects(&objects, &diff);

        assert_abs_diff_eq!(diff_objects[1].doubletapness(None), 0.0);
        assert!(diff_objects[0].doubletapness(diff_objects.get(1)) > 0.5);
    }

    #[test]
    fn hidden_fades_out() {
        let diff = Difficulty::new(5.0, 5.0, 5.0, 5.0);
        let objects = [
            HitObject::circle(Pos::new(0.0, 0.0), 0.0),
            HitObject::circle(Pos::new(0.0, 0.0), 2000.0),
        ];

        let diff_objects = create_difficulty_objects(&objects, &diff);
        let curr = &diff_objects[0];
        let (preempt, fade_in) = (diff.preempt(), diff.time_fade_in());

        assert_abs_diff_eq!(curr.opacity_at(2000.0 - preempt, false, preempt, fade_in), 0.0);
        assert_abs_diff_eq!(curr.opacity_at(1900.0, false, preempt, fade_in), 1.0);
        assert_abs_diff_eq!(curr.opacity_at(1900.0, true, preempt, preempt * 0.4), 0.0);
        assert_abs_diff_eq!(curr.opacity_at(2001.0, false, preempt, fade_in), 0.0);
    }
}
