use crate::{
    api::PerformanceCalculator,
    attributes::Attributes,
    difficulty::{Difficulty, SliderAccuracy},
    mods::GameMods,
    score::{PerfScore, PpResults, ResolvedScore},
    skills::{flashlight::flashlight_difficulty_to_performance, strain::difficulty_to_performance},
};

pub(super) const PERFORMANCE_BASE_MULTIPLIER: f64 = 1.15;

/// Performance point calculation as of 2024-10-07.
#[derive(Copy, Clone, Debug, Default)]
pub struct PerformanceCalculator20241007;

impl PerformanceCalculator for PerformanceCalculator20241007 {
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
    n_objects_with_acc: u32,
}

impl<'a> PpInner<'a> {
    fn new(attrs: &'a Attributes, score: &PerfScore, diff: &'a Difficulty) -> Self {
        let mods = diff.get_mods();
        let state = ResolvedScore::new(score, attrs);

        let n_objects_with_acc = if mods.v2() || diff.get_slider_accuracy() == SliderAccuracy::Exact
        {
            attrs.circles + attrs.sliders
        } else {
            attrs.circles
        };

        let mut this = Self {
            attrs,
            diff,
            mods,
            state,
            max_combo: attrs.max_combo.max(1),
            acc: score.accuracy,
            total_hits: f64::from(state.total_hits()),
            effective_miss_count: 0.0,
            n_objects_with_acc,
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

        let aim = self.compute_aim_value();
        let speed = self.compute_speed_value();
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

    fn length_bonus(&self) -> f64 {
        let mut length_bonus = 0.95 + 0.4 * (self.total_hits / 2000.0).min(1.0);

        if self.total_hits > 2000.0 {
            length_bonus += (self.total_hits / 2000.0).log10() * 0.5;
        }

        length_bonus
    }

    fn compute_aim_value(&self) -> f64 {
        let mut aim_value = difficulty_to_performance(self.attrs.aim);

        let length_bonus = self.length_bonus();
        aim_value *= length_bonus;

        if self.effective_miss_count > 0.0 {
            aim_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.aim_difficult_strain_count,
            );
        }

        let ar = self.diff.ar_real();

        let mut ar_factor = if ar > 10.33 {
            0.3 * (ar - 10.33)
        } else if ar < 8.0 {
            0.05 * (8.0 - ar)
        } else {
            0.0
        };

        if self.mods.rx() {
            ar_factor = 0.0;
        }

        aim_value *= 1.0 + ar_factor * length_bonus;

        // Lower AR is rewarded more with HD
        if self.mods.hd() {
            aim_value *= 1.0 + 0.04 * (12.0 - ar);
        }

        // 15% of sliders are assumed to be difficult
        let estimate_diff_sliders = f64::from(self.attrs.sliders) * 0.15;

        if self.attrs.sliders > 0 {
            let dropped = self
                .state
                .total_imperfect_hits()
                .min(self.max_combo.saturating_sub(self.state.max_combo));

            let estimate_slider_ends_dropped = f64::from(dropped).clamp(0.0, estimate_diff_sliders);
            let slider_nerf_factor = (1.0 - self.attrs.slider_factor)
                * (1.0 - estimate_slider_ends_dropped / estimate_diff_sliders).powf(3.0)
                + self.attrs.slider_factor;

            aim_value *= slider_nerf_factor;
        }

        aim_value *= self.acc;
        aim_value *= 0.98 + self.diff.od_real().powf(2.0) / 2500.0;

        aim_value
    }

    fn compute_speed_value(&self) -> f64 {
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
        let ar_factor = if ar > 10.33 { 0.3 * (ar - 10.33) } else { 0.0 };

        speed_value *= 1.0 + ar_factor * length_bonus;

        if self.mods.hd() {
            speed_value *= 1.0 + 0.04 * (12.0 - ar);
        }

        let speed_note_count = self.attrs.speed_note_count;

        let relevant_acc = if speed_note_count > 0.0 {
            let n_great = f64::from(self.state.n_great);
            let n_ok = f64::from(self.state.n_ok);
            let n_meh = f64::from(self.state.n_meh);

            let relevant_total_diff = self.total_hits - speed_note_count;
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

        // Punish doubletapping through 50s
        let n_meh = f64::from(self.state.n_meh);

        if n_meh >= self.total_hits / 500.0 {
            speed_value *= 0.99_f64.powf(n_meh - self.total_hits / 500.0);
        }

        speed_value
    }

    fn compute_accuracy_value(&self) -> f64 {
        if self.mods.rx() {
            return 0.0;
        }

        let amount = f64::from(self.n_objects_with_acc);

        let better_acc_percentage = if self.n_objects_with_acc > 0 {
            let n_great = f64::from(self.state.n_great) - (self.total_hits - amount);

            ((n_great * 6.0 + f64::from(self.state.n_ok) * 2.0 + f64::from(self.state.n_meh))
                / (amount * 6.0))
                .max(0.0)
        } else {
            0.0
        };

        let mut acc_value =
            1.52163_f64.powf(self.diff.od_real()) * better_acc_percentage.powf(24.0) * 2.83;

        // More objects make it harder to keep good accuracy
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

        // Short maps have a higher ratio of small flashlight radius
        let mut scale = 0.7 + 0.1 * (self.total_hits / 200.0).min(1.0);

        if self.total_hits > 200.0 {
            scale += 0.2 * ((self.total_hits - 200.0) / 200.0).min(1.0);
        }

        flashlight_value *= scale;
        flashlight_value *= 0.5 + self.acc / 2.0;
        flashlight_value *= 0.98 + self.diff.od_real().powf(2.0) / 2500.0;

        flashlight_value
    }

    fn calculate_effective_miss_count(&self) -> f64 {
        let mut combo_based_miss_count = 0.0;

        if self.attrs.sliders > 0 {
            let full_combo_threshold =
                f64::from(self.max_combo) - 0.1 * f64::from(self.attrs.sliders);

            if f64::from(self.state.max_combo) < full_combo_threshold {
                combo_based_miss_count =
                    full_combo_threshold / f64::from(self.state.max_combo).max(1.0);
            }
        }

        // Cannot be more than the amount of possible breaks
        combo_based_miss_count =
            combo_based_miss_count.min(f64::from(self.state.total_imperfect_hits()));

        combo_based_miss_count.max(f64::from(self.state.n_miss))
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
            total: 5.0,
            aim: 2.5,
            speed: 2.2,
            flashlight: 1.5,
            slider_factor: 0.97,
            speed_note_count: 180.0,
            aim_difficult_strain_count: 90.0,
            speed_difficult_strain_count: 70.0,
            aim_difficult_slider_count: 0.0,
            object_count: 400,
            circles: 300,
            sliders: 95,
            spinners: 5,
            max_combo: 600,
        }
    }

    #[test]
    fn combo_loss_estimates_misses() {
        let diff = Difficulty::new(5.0, 4.0, 8.0, 9.0);
        let attrs = attrs();

        let score = PerfScore {
            max_combo: Some(300),
            count_ok: 10,
            ..PerfScore::default()
        };

        let inner = PpInner::new(&attrs, &score, &diff);

        // (600 - 9.5) / 300
        assert_abs_diff_eq!(inner.effective_miss_count, 590.5 / 300.0, epsilon = 1e-9);
    }

    #[test]
    fn relax_drops_speed_and_accuracy() {
        let diff = Difficulty::new(5.0, 4.0, 8.0, 9.0).mods(u32::RX);
        let pp = PerformanceCalculator20241007.calculate(&attrs(), &PerfScore::default(), &diff);

        assert_abs_diff_eq!(pp.speed, 0.0);
        assert_abs_diff_eq!(pp.acc, 0.0);
        assert!(pp.aim > 0.0);
    }

    #[test]
    fn exact_slider_accuracy_counts_sliders() {
        let attrs = attrs();
        let classic = Difficulty::new(5.0, 4.0, 8.0, 9.0);
        let exact = classic.clone().slider_accuracy(SliderAccuracy::Exact);

        assert_eq!(PpInner::new(&attrs, &PerfScore::default(), &classic).n_objects_with_acc, 300);
        assert_eq!(PpInner::new(&attrs, &PerfScore::default(), &exact).n_objects_with_acc, 395);
    }

    #[test]
    fn flashlight_needs_mod() {
        let diff = Difficulty::new(5.0, 4.0, 8.0, 9.0);
        let pp = PerformanceCalculator20241007.calculate(&attrs(), &PerfScore::default(), &diff);

        assert_abs_diff_eq!(pp.flashlight, 0.0);

        let diff = diff.mods(u32::FL);
        let pp = PerformanceCalculator20241007.calculate(&attrs(), &PerfScore::default(), &diff);

        assert!(pp.flashlight > 0.0);
    }
}
