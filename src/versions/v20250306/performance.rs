use std::f64::consts::{PI, SQRT_2};

use statrs::function::erf::{erf, erf_inv};

use crate::{
    api::PerformanceCalculator,
    attributes::Attributes,
    difficulty::{Difficulty, SliderAccuracy},
    mods::GameMods,
    score::{PerfScore, PpResults, ResolvedScore},
    skills::{flashlight::flashlight_difficulty_to_performance, strain::difficulty_to_performance},
    util::difficulty::{lerp, reverse_lerp},
};

pub(super) const PERFORMANCE_BASE_MULTIPLIER: f64 = 1.15;

/// Performance point calculation as of 2025-03-06.
#[derive(Copy, Clone, Debug, Default)]
pub struct PerformanceCalculator20250306;

impl PerformanceCalculator for PerformanceCalculator20250306 {
    fn calculate(&self, attrs: &Attributes, score: &PerfScore, diff: &Difficulty) -> PpResults {
        PpInner::new(attrs, score, diff).calculate()
    }
}

struct PpInner<'a> {
    attrs: &'a Attributes,
    diff: &'a Difficulty,
    mods: u32,
    state: ResolvedScore,
    max_combo: u32,
    acc: f64,
    total_hits: f64,
    effective_miss_count: f64,
    slider_ends_dropped: u32,
    n_objects_with_acc: u32,
    using_classic_slider_acc: bool,
    great_hit_window: f64,
    ok_hit_window: f64,
    meh_hit_window: f64,
}

impl<'a> PpInner<'a> {
    fn new(attrs: &'a Attributes, score: &PerfScore, diff: &'a Difficulty) -> Self {
        let mods = diff.get_mods();
        let state = ResolvedScore::new(score, attrs);

        let using_classic_slider_acc =
            diff.get_slider_accuracy() == SliderAccuracy::Classic && !mods.v2();

        let n_objects_with_acc = if using_classic_slider_acc {
            attrs.circles
        } else {
            attrs.circles + attrs.sliders
        };

        let clock_rate = diff.speed();

        let mut this = Self {
            attrs,
            diff,
            mods,
            state,
            max_combo: attrs.max_combo.max(1),
            acc: score.accuracy,
            total_hits: f64::from(state.total_hits()),
            effective_miss_count: 0.0,
            slider_ends_dropped: attrs.sliders.saturating_sub(state.slider_end),
            n_objects_with_acc,
            using_classic_slider_acc,
            great_hit_window: diff.hit_window_great() / clock_rate,
            ok_hit_window: diff.hit_window_ok() / clock_rate,
            meh_hit_window: diff.hit_window_meh() / clock_rate,
        };

        this.effective_miss_count = this.calculate_effective_miss_count();

        this
    }

    fn calculate(mut self) -> PpResults {
        let mut multiplier = PERFORMANCE_BASE_MULTIPLIER;

        if self.mods.nf() {
            multiplier *= (1.0 - 0.02 * self.effective_miss_count).max(0.9);
        }

        if self.mods.so() && self.total_hits > 0.0 {
            multiplier *= 1.0 - (f64::from(self.attrs.spinners) / self.total_hits).powf(0.85);
        }

        if self.mods.rx() {
            let od = self.diff.od_real();

            let (ok_multiplier, meh_multiplier) = if od > 0.0 {
                (
                    (1.0 - (od / 13.33).powf(1.8)).max(0.0),
                    (1.0 - (od / 13.33).powf(5.0)).max(0.0),
                )
            } else {
                (1.0, 1.0)
            };

            self.effective_miss_count = (self.effective_miss_count
                + f64::from(self.state.n_ok) * ok_multiplier
                + f64::from(self.state.n_meh) * meh_multiplier)
                .min(self.total_hits);
        }

        let speed_deviation = self.calculate_speed_deviation();

        let aim = self.compute_aim_value();
        let speed = self.compute_speed_value(speed_deviation);
        let acc = self.compute_accuracy_value();
        let flashlight = self.compute_flashlight_value();

        let total = (aim.powf(1.1) + speed.powf(1.1) + acc.powf(1.1) + flashlight.powf(1.1))
            .powf(1.0 / 1.1)
            * multiplier;

        PpResults {
            aim,
            speed,
            acc,
            flashlight,
            total,
        }
    }

    fn calculate_effective_miss_count(&self) -> f64 {
        let n_miss = f64::from(self.state.n_miss);
        let mut effective_miss_count = n_miss;

        if self.attrs.sliders > 0 {
            let (full_combo_threshold, possible_breaks) = if self.using_classic_slider_acc {
                (
                    f64::from(self.max_combo) - 0.1 * f64::from(self.attrs.sliders),
                    self.state.total_imperfect_hits(),
                )
            } else {
                (
                    f64::from(self.max_combo.saturating_sub(self.slider_ends_dropped)),
                    self.state.slider_breaks + self.state.n_miss,
                )
            };

            if f64::from(self.state.max_combo) < full_combo_threshold {
                effective_miss_count =
                    full_combo_threshold / f64::from(self.state.max_combo).max(1.0);
            }

            effective_miss_count = effective_miss_count.min(f64::from(possible_breaks));
        }

        effective_miss_count.max(n_miss).min(self.total_hits)
    }

    fn length_bonus(&self) -> f64 {
        let mut length_bonus = 0.95 + 0.4 * (self.total_hits / 2000.0).min(1.0);

        if self.total_hits > 2000.0 {
            length_bonus += (self.total_hits / 2000.0).log10() * 0.5;
        }

        length_bonus
    }

    fn compute_aim_value(&self) -> f64 {
        if self.mods.ap() {
            return 0.0;
        }

        let mut aim_difficulty = self.attrs.aim;
        let difficult_sliders = self.attrs.aim_difficult_slider_count;

        if self.attrs.sliders > 0 && difficult_sliders > 0.0 {
            let improperly_followed = if self.using_classic_slider_acc {
                // Only combo is known so dropped sliders have to be guessed
                let combo_loss = self.max_combo.saturating_sub(self.state.max_combo);

                f64::from(self.state.total_imperfect_hits().min(combo_loss))
            } else {
                f64::from(self.slider_ends_dropped + self.state.slider_breaks)
            };

            let estimate_improperly_followed = improperly_followed.clamp(0.0, difficult_sliders);

            let slider_nerf_factor = (1.0 - self.attrs.slider_factor)
                * (1.0 - estimate_improperly_followed / difficult_sliders).powf(3.0)
                + self.attrs.slider_factor;

            aim_difficulty *= slider_nerf_factor;
        }

        let mut aim_value = difficulty_to_performance(aim_difficulty);

        let length_bonus = self.length_bonus();
        aim_value *= length_bonus;

        if self.effective_miss_count > 0.0 {
            aim_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.aim_difficult_strain_count,
            );
        }

        let ar = self.diff.ar_real();

        let ar_factor = if self.mods.rx() {
            0.0
        } else if ar > 10.33 {
            0.3 * (ar - 10.33)
        } else if ar < 8.0 {
            0.05 * (8.0 - ar)
        } else {
            0.0
        };

        aim_value *= 1.0 + ar_factor * length_bonus;

        if self.mods.hd() {
            aim_value *= 1.0 + 0.04 * (12.0 - ar);
        }

        aim_value *= self.acc;
        aim_value *= 0.98 + self.diff.od_real().max(0.0).powf(2.0) / 2500.0;

        aim_value
    }

    fn compute_speed_value(&self, speed_deviation: Option<f64>) -> f64 {
        if self.mods.rx() {
            return 0.0;
        }

        let mut speed_value = difficulty_to_performance(self.attrs.speed);

        let length_bonus = self.length_bonus();
        speed_value *= length_bonus;

        if self.effective_miss_count > 0.0 {
            speed_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.speed_difficult_strain_count,
            );
        }

        let ar = self.diff.ar_real();

        let ar_factor = if self.mods.ap() || ar <= 10.33 {
            0.0
        } else {
            0.3 * (ar - 10.33)
        };

        speed_value *= 1.0 + ar_factor * length_bonus;

        if self.mods.hd() {
            speed_value *= 1.0 + 0.04 * (12.0 - ar);
        }

        speed_value *= self.speed_high_deviation_nerf(speed_deviation);

        let speed_note_count = self.attrs.speed_note_count;

        let relevant_acc = if speed_note_count > 0.0 {
            let n_great = f64::from(self.state.n_great);
            let n_ok = f64::from(self.state.n_ok);
            let n_meh = f64::from(self.state.n_meh);

            let relevant_total_diff = (self.total_hits - speed_note_count).max(0.0);
            let relevant_n_great = (n_great - relevant_total_diff).max(0.0);
            let relevant_n_ok = (n_ok - (relevant_total_diff - n_great).max(0.0)).max(0.0);
            let relevant_n_meh = (n_meh - (relevant_total_diff - n_great - n_ok).max(0.0)).max(0.0);

            (relevant_n_great * 6.0 + relevant_n_ok * 2.0 + relevant_n_meh)
                / (speed_note_count * 6.0)
        } else {
            0.0
        };

        let od = self.diff.od_real();

        speed_value *= (0.95 + od.powf(2.0) / 750.0)
            * ((self.acc + relevant_acc) / 2.0).powf((14.5 - od) / 2.0);

        speed_value
    }

    fn compute_accuracy_value(&self) -> f64 {
        if self.mods.rx() {
            return 0.0;
        }

        let amount = f64::from(self.n_objects_with_acc);

        let better_acc_percentage = if self.n_objects_with_acc > 0 {
            let n_great =
                f64::from(self.state.n_great) - (self.total_hits - amount).max(0.0);

            ((n_great * 6.0 + f64::from(self.state.n_ok) * 2.0 + f64::from(self.state.n_meh))
                / (amount * 6.0))
                .max(0.0)
        } else {
            0.0
        };

        let mut acc_value =
            1.52163_f64.powf(self.diff.od_real()) * better_acc_percentage.powf(24.0) * 2.83;

        acc_value *= (amount / 1000.0).powf(0.3).min(1.15);

        if self.mods.hd() {
            acc_value *= 1.08;
        }

        if self.mods.fl() {
            acc_value *= 1.02;
        }

        acc_value
    }

    fn compute_flashlight_value(&self) -> f64 {
        if !self.mods.fl() {
            return 0.0;
        }

        let mut flashlight_value = flashlight_difficulty_to_performance(self.attrs.flashlight);

        if self.effective_miss_count > 0.0 {
            flashlight_value *= 0.97
                * (1.0 - (self.effective_miss_count / self.total_hits).powf(0.775))
                    .powf(self.effective_miss_count.powf(0.875));
        }

        flashlight_value *= self.combo_scaling_factor();

        let mut scale = 0.7 + 0.1 * (self.total_hits / 200.0).min(1.0);

        if self.total_hits > 200.0 {
            scale += 0.2 * ((self.total_hits - 200.0) / 200.0).min(1.0);
        }

        flashlight_value *= scale;
        flashlight_value *= 0.5 + self.acc / 2.0;
        flashlight_value *= 0.98 + self.diff.od_real().max(0.0).powf(2.0) / 2500.0;

        flashlight_value
    }

    /// Estimated standard deviation of hit errors on speed relevant notes.
    ///
    /// Judgements are distributed onto the speed notes in the worst way
    /// possible: misses first, then 50s, then 100s.
    fn calculate_speed_deviation(&self) -> Option<f64> {
        if self.state.n_great + self.state.n_ok + self.state.n_meh == 0 {
            return None;
        }

        let mut speed_note_count = self.attrs.speed_note_count;
        speed_note_count += (self.total_hits - self.attrs.speed_note_count) * 0.1;

        let relevant_n_miss = f64::from(self.state.n_miss).min(speed_note_count);
        let relevant_n_meh = f64::from(self.state.n_meh).min(speed_note_count - relevant_n_miss);
        let relevant_n_ok = f64::from(self.state.n_ok)
            .min(speed_note_count - relevant_n_miss - relevant_n_meh);
        let relevant_n_great =
            (speed_note_count - relevant_n_miss - relevant_n_meh - relevant_n_ok).max(0.0);

        self.calculate_deviation(relevant_n_great, relevant_n_ok, relevant_n_meh, relevant_n_miss)
    }

    /// Deviation under a normal distribution of hit errors.
    ///
    /// Uses the lower bound of the 99% Wilson interval for the ratio of 300s
    /// and then accounts for the 100s and 50s.
    fn calculate_deviation(
        &self,
        relevant_n_great: f64,
        relevant_n_ok: f64,
        relevant_n_meh: f64,
        relevant_n_miss: f64,
    ) -> Option<f64> {
        // One-tailed 99% critical value of the normal distribution
        const Z: f64 = 2.326_347_874_04;

        if relevant_n_great + relevant_n_ok + relevant_n_meh <= 0.0 {
            return None;
        }

        let n_objects = relevant_n_great + relevant_n_ok + relevant_n_meh + relevant_n_miss;
        let n = (n_objects - relevant_n_miss - relevant_n_meh).max(1.0);
        let p = relevant_n_great / n;

        let p_lower_bound = (n * p + Z * Z / 2.0) / (n + Z * Z)
            - Z / (n + Z * Z) * (n * p * (1.0 - p) + Z * Z / 4.0).sqrt();

        let mut deviation = self.great_hit_window / (SQRT_2 * erf_inv(p_lower_bound));

        let random_value = (2.0 / PI).sqrt()
            * self.ok_hit_window
            * (-0.5 * (self.ok_hit_window / deviation).powf(2.0)).exp()
            / (deviation * erf(self.ok_hit_window / (SQRT_2 * deviation)));

        deviation *= (1.0 - random_value).sqrt();

        let limit_value = self.ok_hit_window / 3.0_f64.sqrt();

        if p_lower_bound <= 0.0 || random_value >= 1.0 || deviation.is_nan() || deviation > limit_value
        {
            deviation = limit_value;
        }

        let meh_variance = (self.meh_hit_window * self.meh_hit_window
            + self.ok_hit_window * self.meh_hit_window
            + self.ok_hit_window * self.ok_hit_window)
            / 3.0;

        let deviation = (((relevant_n_great + relevant_n_ok) * deviation.powf(2.0)
            + relevant_n_meh * meh_variance)
            / (relevant_n_great + relevant_n_ok + relevant_n_meh))
            .sqrt();

        Some(deviation)
    }

    /// Squashes speed values that are implausible for the estimated deviation.
    fn speed_high_deviation_nerf(&self, speed_deviation: Option<f64>) -> f64 {
        const SCALE: f64 = 50.0;

        let Some(speed_deviation) = speed_deviation else {
            return 0.0;
        };

        let speed_value = difficulty_to_performance(self.attrs.speed);

        let excess_speed_difficulty_cutoff = 100.0 + 220.0 * (22.0 / speed_deviation).powf(6.5);

        if speed_value <= excess_speed_difficulty_cutoff {
            return 1.0;
        }

        let adjusted_speed_value = SCALE
            * (((speed_value - excess_speed_difficulty_cutoff) / SCALE + 1.0).ln()
                + excess_speed_difficulty_cutoff / SCALE);

        let amount = 1.0 - reverse_lerp(speed_deviation, 22.0, 27.0);
        let adjusted_speed_value = lerp(adjusted_speed_value, speed_value, amount);

        adjusted_speed_value / speed_value
    }

    fn combo_scaling_factor(&self) -> f64 {
        (f64::from(self.state.max_combo).powf(0.8) / f64::from(self.max_combo).powf(0.8)).min(1.0)
    }
}

fn calculate_miss_penalty(miss_count: f64, difficult_strain_count: f64) -> f64 {
    0.96 / ((miss_count / (4.0 * difficult_strain_count.max(1.0).ln().powf(0.94))) + 1.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn attrs() -> Attributes {
        Attributes {
            total: 6.0,
            aim: 3.1,
            speed: 2.6,
            flashlight: 2.0,
            slider_factor: 0.95,
            speed_note_count: 250.0,
            aim_difficult_strain_count: 110.0,
            speed_difficult_strain_count: 85.0,
            aim_difficult_slider_count: 40.0,
            object_count: 500,
            circles: 350,
            sliders: 145,
            spinners: 5,
            max_combo: 800,
        }
    }

    fn diff() -> Difficulty {
        Difficulty::new(5.0, 4.0, 8.0, 9.0)
    }

    #[test]
    fn no_deviation_without_hits() {
        let attrs = attrs();
        let diff = diff();

        let score = PerfScore {
            count_great: Some(0),
            count_miss: 500,
            max_combo: Some(0),
            ..PerfScore::default()
        };

        let inner = PpInner::new(&attrs, &score, &diff);

        assert!(inner.calculate_speed_deviation().is_none());
        assert_abs_diff_eq!(inner.speed_high_deviation_nerf(None), 0.0);
    }

    #[test]
    fn more_100s_increase_deviation() {
        let attrs = attrs();
        let diff = diff();

        let deviation = |count_ok: u32| {
            let score = PerfScore {
                count_ok,
                ..PerfScore::default()
            };

            PpInner::new(&attrs, &score, &diff)
                .calculate_speed_deviation()
                .unwrap_or(f64::NAN)
        };

        let low = deviation(2);
        let high = deviation(40);

        assert!(low.is_finite());
        assert!(high > low);
    }

    #[test]
    fn deviation_is_capped() {
        let attrs = attrs();
        let diff = diff();
        let inner = PpInner::new(&attrs, &PerfScore::default(), &diff);

        let deviation = inner.calculate_deviation(0.0, 10.0, 0.0, 0.0).unwrap_or(f64::NAN);

        assert_abs_diff_eq!(deviation, inner.ok_hit_window / 3.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn high_deviation_compresses_speed() {
        let attrs = Attributes {
            speed: 4.0,
            ..attrs()
        };
        let diff = diff();
        let inner = PpInner::new(&attrs, &PerfScore::default(), &diff);

        let speed_value = difficulty_to_performance(4.0);
        let cutoff = 100.0 + 220.0 * (22.0_f64 / 30.0).powf(6.5);
        let adjusted = 50.0 * (((speed_value - cutoff) / 50.0 + 1.0).ln() + cutoff / 50.0);

        assert!(speed_value > cutoff);
        assert_abs_diff_eq!(
            inner.speed_high_deviation_nerf(Some(30.0)),
            adjusted / speed_value,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(inner.speed_high_deviation_nerf(Some(20.0)), 1.0);
    }

    #[test]
    fn exact_slider_accuracy_uses_slider_breaks() {
        let attrs = attrs();
        let diff = diff().slider_accuracy(SliderAccuracy::Exact);

        let score = PerfScore {
            max_combo: Some(400),
            slider_breaks: 1,
            slider_end: Some(145),
            count_ok: 20,
            ..PerfScore::default()
        };

        let inner = PpInner::new(&attrs, &score, &diff);

        // Capped by slider breaks and misses
        assert_abs_diff_eq!(inner.effective_miss_count, 1.0);
        assert_eq!(inner.n_objects_with_acc, 495);
    }

    #[test]
    fn autopilot_drops_aim() {
        let diff = diff().mods(u32::AP);
        let pp = PerformanceCalculator20250306.calculate(&attrs(), &PerfScore::default(), &diff);

        assert_abs_diff_eq!(pp.aim, 0.0);
        assert!(pp.speed > 0.0);
        assert!(pp.acc > 0.0);
    }

    #[test]
    fn dropped_difficult_sliders_reduce_aim() {
        let attrs = attrs();
        let diff = diff().slider_accuracy(SliderAccuracy::Exact);

        let aim = |slider_end: u32| {
            let score = PerfScore {
                slider_end: Some(slider_end),
                ..PerfScore::default()
            };

            PerformanceCalculator20250306.calculate(&attrs, &score, &diff).aim
        };

        assert!(aim(125) < aim(145));
    }
}
