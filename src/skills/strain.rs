use std::iter;

use crate::{preprocessing::object::DifficultyObject, util::difficulty::lerp};

/// Smallest positive subnormal `f64`.
const MIN_POSITIVE_SUBNORMAL: f64 = 4.940_656_458_412_465_4e-324;

/// The per-skill strain formula plugged into the shared [`Skill`] driver.
pub(crate) trait StrainEvaluator {
    /// Amount of top sections whose strain is reduced.
    const REDUCED_SECTION_COUNT: usize = 10;

    /// Update the skill's decayed strain with the given object and return it.
    fn strain_value_at<'a>(
        &mut self,
        curr: &DifficultyObject<'a>,
        objects: &[DifficultyObject<'a>],
    ) -> f64;

    /// Strain at the start of a new section at `time`, i.e. the current strain
    /// decayed up to that point.
    fn initial_strain<'a>(
        &self,
        time: f64,
        curr: &DifficultyObject<'a>,
        objects: &[DifficultyObject<'a>],
    ) -> f64;

    fn difficulty_value(strain: &StrainSkill) -> f64 {
        strain.weighted_difficulty()
    }
}

/// Section bookkeeping shared by all skills.
#[derive(Clone, Debug)]
pub(crate) struct StrainSkill {
    skip_empty_sections: bool,
    step: bool,
    peak_weights: Vec<f64>,
    curr_section_peak: f64,
    curr_section_end: f64,
    strain_peaks: Vec<f64>,
    /// Archived peaks in ascending order.
    sorted_peaks: Vec<f64>,
    object_strains: Vec<f64>,
    difficulty: f64,
    last_difficulty: f64,
    difficult_strain_count: f64,
}

impl StrainSkill {
    pub const DECAY_WEIGHT: f64 = 0.9;
    pub const SECTION_LEN: f64 = 400.0;
    pub const REDUCED_STRAIN_BASELINE: f64 = 0.75;

    pub fn new(reduced_section_count: usize, skip_empty_sections: bool, step: bool) -> Self {
        let peak_weights = (0..reduced_section_count)
            .map(|i| {
                let clamped = (i as f64 / reduced_section_count as f64).clamp(0.0, 1.0);
                let scale = lerp(1.0, 10.0, clamped).log10();

                lerp(Self::REDUCED_STRAIN_BASELINE, 1.0, scale)
            })
            .collect();

        Self {
            skip_empty_sections,
            step,
            peak_weights,
            curr_section_peak: 0.0,
            curr_section_end: 0.0,
            strain_peaks: Vec::new(),
            sorted_peaks: Vec::new(),
            object_strains: Vec::new(),
            difficulty: 0.0,
            last_difficulty: f64::MIN,
            difficult_strain_count: 0.0,
        }
    }

    /// Archived peaks including the current section.
    pub fn current_strain_peaks(&self) -> Vec<f64> {
        let mut peaks = Vec::with_capacity(self.strain_peaks.len() + 1);
        peaks.extend_from_slice(&self.strain_peaks);
        peaks.push(self.curr_section_peak);

        peaks
    }

    /// Sum of all peaks including the current section.
    pub fn summed_peaks(&self) -> f64 {
        self.strain_peaks
            .iter()
            .fold(0.0, |sum, strain| sum + strain)
            + self.curr_section_peak
    }

    /// Weighted sum of the peaks, highest first, after reducing the top
    /// sections.
    pub fn weighted_difficulty(&self) -> f64 {
        let mut strains = Vec::with_capacity(self.sorted_peaks.len() + 1);
        strains.extend_from_slice(&self.sorted_peaks);

        let idx = strains.partition_point(|&peak| peak < self.curr_section_peak);
        strains.insert(idx, self.curr_section_peak);

        for (strain, weight) in strains.iter_mut().rev().zip(self.peak_weights.iter()) {
            *strain *= weight;
        }

        strains.sort_by(f64::total_cmp);

        let mut difficulty = 0.0;
        let mut weight = 1.0;
        let mut last_difficulty = f64::MIN;

        for strain in strains.iter().rev() {
            difficulty += strain * weight;
            weight *= Self::DECAY_WEIGHT;

            // Remaining strains no longer contribute
            if (difficulty - last_difficulty).abs() < MIN_POSITIVE_SUBNORMAL {
                break;
            }

            last_difficulty = difficulty;
        }

        difficulty
    }

    pub fn count_difficult_strains(&self, difficulty: f64) -> f64 {
        if difficulty <= 0.0 {
            return 0.0;
        }

        // What would the top strain be if all strain values were identical
        let consistent_top_strain = difficulty / 10.0;

        self.object_strains
            .iter()
            .map(|&strain| difficult_strain_weight(strain, consistent_top_strain))
            .sum()
    }

    fn save_curr_peak(&mut self) {
        self.strain_peaks.push(self.curr_section_peak);

        if !self.skip_empty_sections || self.curr_section_peak > 0.0 {
            let idx = self
                .sorted_peaks
                .partition_point(|&peak| peak < self.curr_section_peak);
            self.sorted_peaks.insert(idx, self.curr_section_peak);
        }
    }

    /// Appends empty sections in bulk across long breaks.
    fn try_skip_empty_sections(&mut self, time: f64) -> bool {
        if !self.skip_empty_sections || self.curr_section_peak > 0.0 {
            return false;
        }

        let sections_left = ((time - self.curr_section_end) / Self::SECTION_LEN).floor();

        if sections_left <= 10.0 {
            return false;
        }

        self.strain_peaks
            .extend(iter::repeat(0.0).take(sections_left as usize));
        self.curr_section_end += Self::SECTION_LEN * sections_left;

        true
    }

    #[allow(clippy::float_cmp)]
    fn update_step(&mut self, strain: f64) {
        self.difficulty = self.weighted_difficulty();

        if self.last_difficulty != self.difficulty {
            self.difficult_strain_count = self.count_difficult_strains(self.difficulty);
        } else if self.difficulty != 0.0 {
            self.difficult_strain_count += difficult_strain_weight(strain, self.difficulty / 10.0);
        }

        self.last_difficulty = self.difficulty;
    }
}

fn difficult_strain_weight(strain: f64, consistent_top_strain: f64) -> f64 {
    // Constants are arbitrary and give nice values
    1.1 / (1.0 + f64::exp(-10.0 * (strain / consistent_top_strain - 0.88)))
}

/// Driver feeding objects to an evaluator while tracking sections.
#[derive(Clone, Debug)]
pub(crate) struct Skill<E> {
    strain: StrainSkill,
    pub evaluator: E,
}

impl<E: StrainEvaluator> Skill<E> {
    pub fn new(evaluator: E, skip_empty_sections: bool, step: bool) -> Self {
        Self {
            strain: StrainSkill::new(E::REDUCED_SECTION_COUNT, skip_empty_sections, step),
            evaluator,
        }
    }

    pub fn process<'a>(&mut self, curr: &DifficultyObject<'a>, objects: &[DifficultyObject<'a>]) {
        if curr.idx == 0 {
            self.strain.curr_section_end =
                (curr.start_time / StrainSkill::SECTION_LEN).ceil() * StrainSkill::SECTION_LEN;
        }

        while curr.start_time > self.strain.curr_section_end {
            if self.strain.try_skip_empty_sections(curr.start_time) {
                continue;
            }

            self.strain.save_curr_peak();
            let section_end = self.strain.curr_section_end;
            self.strain.curr_section_peak = self.evaluator.initial_strain(section_end, curr, objects);
            self.strain.curr_section_end += StrainSkill::SECTION_LEN;
        }

        let strain = self.evaluator.strain_value_at(curr, objects);
        self.strain.curr_section_peak = strain.max(self.strain.curr_section_peak);
        self.strain.object_strains.push(strain);

        if self.strain.step {
            self.strain.update_step(strain);
        }
    }

    pub fn difficulty_value(&self) -> f64 {
        if self.strain.step {
            self.strain.difficulty
        } else {
            E::difficulty_value(&self.strain)
        }
    }

    pub fn count_difficult_strains(&self) -> f64 {
        if self.strain.step {
            self.strain.difficult_strain_count
        } else {
            self.strain.count_difficult_strains(self.difficulty_value())
        }
    }

    pub fn current_strain_peaks(&self) -> Vec<f64> {
        self.strain.current_strain_peaks()
    }
}

/// Amount of strains that are relevant compared to the highest one.
#[derive(Clone, Debug, Default)]
pub(crate) struct RelevantCount {
    step: bool,
    strains: Vec<f64>,
    max_strain: f64,
    count: f64,
}

impl RelevantCount {
    pub const fn new(step: bool) -> Self {
        Self {
            step,
            strains: Vec::new(),
            max_strain: 0.0,
            count: 0.0,
        }
    }

    pub fn push(&mut self, strain: f64) {
        self.strains.push(strain);

        if !self.step {
            return;
        }

        if strain > self.max_strain {
            self.max_strain = strain;
            self.count = Self::count_with(&self.strains, self.max_strain);
        } else if self.max_strain > 0.0 {
            self.count += Self::weight(strain, self.max_strain);
        }
    }

    pub fn value(&self) -> f64 {
        if self.step {
            return self.count;
        }

        let max_strain = self.strains.iter().copied().fold(0.0, f64::max);

        Self::count_with(&self.strains, max_strain)
    }

    fn count_with(strains: &[f64], max_strain: f64) -> f64 {
        if max_strain <= 0.0 {
            return 0.0;
        }

        strains
            .iter()
            .fold(0.0, |sum, &strain| sum + Self::weight(strain, max_strain))
    }

    fn weight(strain: f64, max_strain: f64) -> f64 {
        1.0 / (1.0 + f64::exp(-(strain / max_strain * 12.0 - 6.0)))
    }
}

pub(crate) fn strain_decay(ms: f64, strain_decay_base: f64) -> f64 {
    f64::powf(strain_decay_base, ms / 1000.0)
}

pub(crate) fn difficulty_to_performance(difficulty: f64) -> f64 {
    f64::powf(5.0 * f64::max(1.0, difficulty / 0.0675) - 4.0, 3.0) / 100_000.0
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn peak_weights_reduce_top_sections() {
        let skill = StrainSkill::new(10, false, false);

        assert_abs_diff_eq!(skill.peak_weights[0], 0.75);
        assert!(skill.peak_weights.windows(2).all(|w| w[0] < w[1]));
        assert!(skill.peak_weights[9] < 1.0);
    }

    #[test]
    fn single_peak_is_reduced() {
        let mut skill = StrainSkill::new(10, false, false);
        skill.curr_section_peak = 100.0;

        assert_abs_diff_eq!(skill.weighted_difficulty(), 75.0);
    }

    #[test]
    fn peaks_decay_geometrically() {
        let mut skill = StrainSkill::new(0, false, false);

        for peak in [1.0, 3.0, 2.0] {
            skill.curr_section_peak = peak;
            skill.save_curr_peak();
        }

        skill.curr_section_peak = 0.0;

        assert_eq!(skill.sorted_peaks, [1.0, 2.0, 3.0]);
        assert_abs_diff_eq!(skill.weighted_difficulty(), 3.0 + 2.0 * 0.9 + 0.81, epsilon = 1e-12);
    }

    #[test]
    fn empty_sections_are_skipped_in_bulk() {
        let mut skill = StrainSkill::new(10, true, false);
        skill.curr_section_end = 400.0;

        assert!(skill.try_skip_empty_sections(400.0 * 20.0));
        assert_eq!(skill.strain_peaks.len(), 19);
        assert!(skill.sorted_peaks.is_empty());
        assert_abs_diff_eq!(skill.curr_section_end, 400.0 * 20.0);

        let mut no_skip = StrainSkill::new(10, false, false);
        no_skip.curr_section_end = 400.0;
        assert!(!no_skip.try_skip_empty_sections(400.0 * 20.0));
    }

    #[test]
    fn difficult_strains_need_difficulty() {
        let mut skill = StrainSkill::new(10, false, false);
        skill.object_strains = vec![1.0, 2.0];

        assert_abs_diff_eq!(skill.count_difficult_strains(0.0), 0.0);
        assert!(skill.count_difficult_strains(20.0) > 0.0);
    }

    #[test]
    fn relevant_count_step_matches_full() {
        let strains = [0.5, 2.0, 1.0, 3.0, 0.0, 2.5];

        let mut step = RelevantCount::new(true);
        let mut full = RelevantCount::new(false);

        for strain in strains {
            step.push(strain);
            full.push(strain);
        }

        assert_abs_diff_eq!(step.value(), full.value(), epsilon = 1e-9);
        assert!(full.value() > 0.0);
        assert_abs_diff_eq!(RelevantCount::new(false).value(), 0.0);
    }

    #[test]
    fn performance_floor() {
        assert_abs_diff_eq!(difficulty_to_performance(0.0), 1.0 / 100_000.0);
    }
}
