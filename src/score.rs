use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;

/// A played result as judged by the scoring layer.
///
/// `None` values are filled in from the difficulty attributes: a missing
/// combo or slider end count assumes a perfect value and a missing great
/// count is whatever remains after the other judgements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerfScore {
    /// Accuracy in `[0, 1]`.
    pub accuracy: f64,
    pub max_combo: Option<u32>,
    pub count_great: Option<u32>,
    pub count_ok: u32,
    pub count_meh: u32,
    pub count_miss: u32,
    /// Missed slider ticks that broke combo.
    pub slider_breaks: u32,
    /// Successfully hit slider ends.
    pub slider_end: Option<u32>,
}

impl Default for PerfScore {
    fn default() -> Self {
        Self {
            accuracy: 1.0,
            max_combo: None,
            count_great: None,
            count_ok: 0,
            count_meh: 0,
            count_miss: 0,
            slider_breaks: 0,
            slider_end: None,
        }
    }
}

/// The result of a performance calculation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PpResults {
    /// The aim portion of the final pp.
    pub aim: f64,
    /// The speed portion of the final pp.
    pub speed: f64,
    /// The accuracy portion of the final pp.
    pub acc: f64,
    /// The flashlight portion of the final pp.
    pub flashlight: f64,
    /// The final performance points.
    pub total: f64,
}

/// A [`PerfScore`] with all defaults filled in from the attributes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct ResolvedScore {
    pub max_combo: u32,
    pub n_great: u32,
    pub n_ok: u32,
    pub n_meh: u32,
    pub n_miss: u32,
    pub slider_breaks: u32,
    pub slider_end: u32,
}

impl ResolvedScore {
    pub fn new(score: &PerfScore, attrs: &Attributes) -> Self {
        let max_combo = attrs.max_combo.max(1);

        let n_great = score.count_great.unwrap_or_else(|| {
            attrs
                .object_count
                .saturating_sub(score.count_ok + score.count_meh + score.count_miss)
        });

        Self {
            max_combo: score.max_combo.unwrap_or(max_combo),
            n_great,
            n_ok: score.count_ok,
            n_meh: score.count_meh,
            n_miss: score.count_miss,
            slider_breaks: score.slider_breaks,
            slider_end: score.slider_end.unwrap_or(attrs.sliders),
        }
    }

    pub const fn total_hits(&self) -> u32 {
        self.n_great + self.n_ok + self.n_meh + self.n_miss
    }

    pub const fn total_imperfect_hits(&self) -> u32 {
        self.n_ok + self.n_meh + self.n_miss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_missing_counts() {
        let attrs = Attributes {
            object_count: 100,
            sliders: 20,
            max_combo: 150,
            ..Attributes::default()
        };

        let score = PerfScore {
            count_ok: 3,
            count_miss: 2,
            ..PerfScore::default()
        };

        let resolved = ResolvedScore::new(&score, &attrs);

        assert_eq!(resolved.n_great, 95);
        assert_eq!(resolved.max_combo, 150);
        assert_eq!(resolved.slider_end, 20);
        assert_eq!(resolved.total_hits(), 100);
        assert_eq!(resolved.total_imperfect_hits(), 5);
    }

    #[test]
    fn max_combo_is_at_least_one() {
        let resolved = ResolvedScore::new(&PerfScore::default(), &Attributes::default());

        assert_eq!(resolved.max_combo, 1);
        assert_eq!(resolved.n_great, 0);
    }
}
