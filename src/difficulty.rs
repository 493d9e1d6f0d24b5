use serde::{Deserialize, Serialize};

use crate::mods::GameMods;

/// How slider accuracy is accounted for when estimating misses and accuracy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SliderAccuracy {
    /// Slider heads are not judged on timing and slider ends are not counted
    /// individually. Dropped sliders have to be estimated from combo.
    #[default]
    Classic,
    /// Slider heads are judged on timing and dropped slider ends are counted
    /// through [`PerfScore::slider_end`](crate::PerfScore::slider_end).
    Exact,
}

/// Difficulty settings of a chart combined with the active mods.
///
/// Every setter recalculates all derived values so the struct can be treated
/// as an immutable value once built.
///
/// # Example
///
/// ```
/// use osu_pp_engine::Difficulty;
///
/// // DT
/// let diff = Difficulty::new(6.0, 4.0, 8.0, 9.0).mods(64);
///
/// assert!((diff.speed() - 1.5).abs() < f64::EPSILON);
/// assert!(diff.ar_real() > 10.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Difficulty {
    base_hp: f64,
    base_cs: f64,
    base_od: f64,
    base_ar: f64,
    mods: u32,
    custom_speed: f64,
    slider_accuracy: SliderAccuracy,

    hp: f64,
    cs: f64,
    od: f64,
    ar: f64,
    circle_radius_unscaled: f64,
    circle_radius: f64,
    preempt: f64,
    fade_in: f64,
    time_fade_in: f64,
    hit_window_meh: f64,
    hit_window_ok: f64,
    hit_window_great: f64,
    speed: f64,
    ar_real: f64,
    od_real: f64,
}

impl Difficulty {
    /// Hidden fades objects in over this fraction of the preempt time.
    pub(crate) const HD_FADE_IN_DURATION_MULTIPLIER: f64 = 0.4;
    /// Hidden fades objects out over this fraction of the preempt time.
    pub(crate) const HD_FADE_OUT_DURATION_MULTIPLIER: f64 = 0.3;

    const PREEMPT_MIN: f64 = 450.0;
    const CIRCLE_RADIUS_ALLOWANCE: f64 = 1.000_41;

    /// Create difficulty settings from the chart's base values.
    pub fn new(hp: f64, cs: f64, od: f64, ar: f64) -> Self {
        let mut this = Self {
            base_hp: hp,
            base_cs: cs,
            base_od: od,
            base_ar: ar,
            mods: 0,
            custom_speed: 1.0,
            slider_accuracy: SliderAccuracy::default(),
            hp,
            cs,
            od,
            ar,
            circle_radius_unscaled: 0.0,
            circle_radius: 0.0,
            preempt: 0.0,
            fade_in: 0.0,
            time_fade_in: 0.0,
            hit_window_meh: 0.0,
            hit_window_ok: 0.0,
            hit_window_great: 0.0,
            speed: 1.0,
            ar_real: ar,
            od_real: od,
        };

        this.calculate();

        this
    }

    /// Specify mods through their bit values.
    ///
    /// See [https://github.com/ppy/osu-api/wiki#mods](https://github.com/ppy/osu-api/wiki#mods)
    pub fn mods(mut self, mods: u32) -> Self {
        self.mods = mods;
        self.calculate();

        self
    }

    /// Adjust the clock rate on top of the rate implied by DT or HT.
    pub fn clock_rate(mut self, clock_rate: f64) -> Self {
        self.custom_speed = clock_rate;
        self.calculate();

        self
    }

    /// Choose how slider accuracy is accounted for.
    pub fn slider_accuracy(mut self, slider_accuracy: SliderAccuracy) -> Self {
        self.slider_accuracy = slider_accuracy;
        self.calculate();

        self
    }

    fn calculate(&mut self) {
        let (mut hp, mut cs, mut od, mut ar) = (self.base_hp, self.base_cs, self.base_od, self.base_ar);

        if self.mods.hr() {
            ar = (ar * 1.4).min(10.0);
            cs = (cs * 1.3).min(10.0);
            od = (od * 1.4).min(10.0);
            hp = (hp * 1.4).min(10.0);
        }

        if self.mods.ez() {
            ar /= 2.0;
            cs /= 2.0;
            od /= 2.0;
            hp /= 2.0;
        }

        self.hp = hp;
        self.cs = cs;
        self.od = od;
        self.ar = ar;

        self.circle_radius_unscaled = difficulty_range(cs, 54.4, 32.0, 9.6);
        self.circle_radius = self.circle_radius_unscaled * Self::CIRCLE_RADIUS_ALLOWANCE;

        self.preempt = difficulty_range(ar, 1800.0, 1200.0, 450.0);
        self.fade_in = difficulty_range(ar, 1200.0, 800.0, 300.0);

        self.time_fade_in = if self.mods.hd() {
            self.preempt * Self::HD_FADE_IN_DURATION_MULTIPLIER
        } else {
            400.0 * (self.preempt / Self::PREEMPT_MIN).min(1.0)
        };

        self.hit_window_meh = difficulty_range(od, 200.0, 150.0, 100.0);
        self.hit_window_ok = difficulty_range(od, 140.0, 100.0, 60.0);
        self.hit_window_great = difficulty_range(od, 80.0, 50.0, 20.0);

        self.speed = self.mods.clock_rate() * self.custom_speed;

        self.ar_real = difficulty_from_range(self.preempt / self.speed, 1800.0, 1200.0, 450.0);
        self.od_real = difficulty_from_range(self.hit_window_great / self.speed, 80.0, 50.0, 20.0);
    }

    /// The base HP drain rate.
    pub const fn base_hp(&self) -> f64 {
        self.base_hp
    }

    /// The base circle size.
    pub const fn base_cs(&self) -> f64 {
        self.base_cs
    }

    /// The base overall difficulty.
    pub const fn base_od(&self) -> f64 {
        self.base_od
    }

    /// The base approach rate.
    pub const fn base_ar(&self) -> f64 {
        self.base_ar
    }

    /// HP drain rate after HR or EZ.
    pub const fn hp(&self) -> f64 {
        self.hp
    }

    /// Circle size after HR or EZ.
    pub const fn cs(&self) -> f64 {
        self.cs
    }

    /// Overall difficulty after HR or EZ but before clock rate adjustments.
    pub const fn od(&self) -> f64 {
        self.od
    }

    /// Approach rate after HR or EZ but before clock rate adjustments.
    pub const fn ar(&self) -> f64 {
        self.ar
    }

    /// The mod bit-set.
    pub const fn get_mods(&self) -> u32 {
        self.mods
    }

    /// The custom clock rate without the rate implied by mods.
    pub const fn custom_speed(&self) -> f64 {
        self.custom_speed
    }

    /// The selected slider accuracy accounting.
    pub const fn get_slider_accuracy(&self) -> SliderAccuracy {
        self.slider_accuracy
    }

    /// The circle radius in osu!pixels.
    pub const fn circle_radius_unscaled(&self) -> f64 {
        self.circle_radius_unscaled
    }

    /// The circle radius including the gameplay allowance.
    pub const fn circle_radius(&self) -> f64 {
        self.circle_radius
    }

    /// Time in ms between an object appearing and its start time.
    pub const fn preempt(&self) -> f64 {
        self.preempt
    }

    /// Fade in duration of stable.
    pub const fn fade_in(&self) -> f64 {
        self.fade_in
    }

    /// Fade in duration used for visibility calculations.
    pub const fn time_fade_in(&self) -> f64 {
        self.time_fade_in
    }

    /// Hit window of a 50 in chart time.
    pub const fn hit_window_meh(&self) -> f64 {
        self.hit_window_meh
    }

    /// Hit window of a 100 in chart time.
    pub const fn hit_window_ok(&self) -> f64 {
        self.hit_window_ok
    }

    /// Hit window of a 300 in chart time.
    pub const fn hit_window_great(&self) -> f64 {
        self.hit_window_great
    }

    /// The final clock rate.
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Approach rate as perceived after clock rate adjustments.
    pub const fn ar_real(&self) -> f64 {
        self.ar_real
    }

    /// Overall difficulty as perceived after clock rate adjustments.
    pub const fn od_real(&self) -> f64 {
        self.od_real
    }

    pub(crate) fn hidden(&self) -> bool {
        self.mods.hd()
    }
}

/// Maps a difficulty value in `[0, 10]` onto a range with `mid` at 5.
pub(crate) fn difficulty_range(difficulty: f64, min: f64, mid: f64, max: f64) -> f64 {
    let difficulty = f64::from(difficulty as f32);

    if difficulty > 5.0 {
        mid + (max - mid) * (difficulty - 5.0) / 5.0
    } else if difficulty < 5.0 {
        mid - (mid - min) * (5.0 - difficulty) / 5.0
    } else {
        mid
    }
}

/// Inverse of [`difficulty_range`].
pub(crate) fn difficulty_from_range(rate: f64, min: f64, mid: f64, max: f64) -> f64 {
    let rate = f64::from(rate as f32);

    let min_step = (min - mid) / 5.0;
    let max_step = (mid - max) / 5.0;

    if rate > mid {
        -(rate - min) / min_step
    } else {
        5.0 - (rate - mid) / max_step
    }
}
