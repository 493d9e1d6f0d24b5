use crate::{
    difficulty::Difficulty,
    model::{
        hit_object::{HitObject, Slider},
        pos::Pos,
    },
};

use super::object::{ASSUMED_SLIDER_RADIUS, NORMALIZED_RADIUS};

/// Approximation of the cursor movement a player needs to follow a slider.
///
/// The cursor only follows the path once it leaves a tolerance radius around
/// the last cursor position.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LazySlider {
    pub end_pos: Pos,
    pub travel_dist: f32,
    /// Time between the head and the last nested object in chart time.
    pub travel_time: f64,
    pub repeat_count: usize,
}

impl LazySlider {
    pub fn new(h: &HitObject, slider: &Slider, diff: &Difficulty) -> Self {
        let travel_time = h.lazy_travel_time();

        // Temporary end position until the real one is derived
        let mut end_pos = h.stacked_pos_at(h.start_time + travel_time, diff);

        let mut curr_cursor_pos = h.stacked_pos(diff);
        let scaling_factor = NORMALIZED_RADIUS / diff.circle_radius_unscaled();
        let mut travel_dist = 0.0_f32;

        let nested = slider.nested_objects();

        for (curr_movement_obj, i) in nested.iter().zip(1..) {
            let mut curr_movement = h.stacked_nested_pos(curr_movement_obj, diff) - curr_cursor_pos;
            let mut curr_movement_len = scaling_factor * f64::from(curr_movement.length());
            let mut required_movement = ASSUMED_SLIDER_RADIUS;

            if i == nested.len() {
                // The player takes whichever of the lazy end and the actual
                // end requires less movement
                let lazy_movement = end_pos - curr_cursor_pos;

                if lazy_movement.length() < curr_movement.length() {
                    curr_movement = lazy_movement;
                }

                curr_movement_len = scaling_factor * f64::from(curr_movement.length());
            } else if curr_movement_obj.is_repeat() {
                required_movement = NORMALIZED_RADIUS;
            }

            if curr_movement_len > required_movement {
                curr_cursor_pos += curr_movement
                    * ((curr_movement_len - required_movement) / curr_movement_len) as f32;
                curr_movement_len *= (curr_movement_len - required_movement) / curr_movement_len;
                travel_dist += curr_movement_len as f32;
            }

            if i == nested.len() {
                end_pos = curr_cursor_pos;
            }
        }

        if nested.is_empty() {
            end_pos = curr_cursor_pos;
        }

        Self {
            end_pos,
            travel_dist,
            travel_time,
            repeat_count: slider.repeat_count(),
        }
    }
}
