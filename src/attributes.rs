use serde::{Deserialize, Serialize};

use crate::model::hit_object::{HitObject, HitObjectKind};

/// The result of a difficulty calculation.
///
/// Every version produces the same shape, only the values differ.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// The final star rating.
    pub total: f64,
    /// The difficulty of the aim skill.
    pub aim: f64,
    /// The difficulty of the speed skill.
    pub speed: f64,
    /// The difficulty of the flashlight skill.
    pub flashlight: f64,
    /// The ratio of the aim rating without and with sliders.
    pub slider_factor: f64,
    /// The number of clickable objects weighted by difficulty.
    pub speed_note_count: f64,
    /// Weighted sum of aim strains.
    pub aim_difficult_strain_count: f64,
    /// Weighted sum of speed strains.
    pub speed_difficult_strain_count: f64,
    /// The number of sliders weighted by difficulty.
    ///
    /// Only filled by versions that track it.
    pub aim_difficult_slider_count: f64,
    /// The amount of hit objects.
    pub object_count: u32,
    /// The amount of circles.
    pub circles: u32,
    /// The amount of sliders.
    pub sliders: u32,
    /// The amount of spinners.
    pub spinners: u32,
    /// The maximum combo.
    pub max_combo: u32,
}

impl Attributes {
    /// Count the hit object towards the object counts and max combo.
    pub(crate) fn add_object(&mut self, h: &HitObject) {
        match h.kind {
            HitObjectKind::Circle => self.circles += 1,
            HitObjectKind::Slider(_) => self.sliders += 1,
            HitObjectKind::Spinner { .. } => self.spinners += 1,
        }

        self.max_combo += h.max_combo();
        self.object_count += 1;
    }
}

/// Raw per-section strain peaks of each skill.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrainPeaks {
    pub aim: Vec<f64>,
    pub speed: Vec<f64>,
    pub flashlight: Vec<f64>,
    /// Peaks of all skills passed through the star rating formula.
    pub total: Vec<f64>,
}

impl StrainPeaks {
    /// Amount of sections.
    pub fn len(&self) -> usize {
        self.total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::{HitObject, Pos, Slider, SliderPath};

    use super::*;

    #[test]
    fn counts_objects() {
        let slider = Slider::new(SliderPath::linear(Pos::new(100.0, 0.0)), 500.0, 400.0, 1, 100.0);

        let objects = [
            HitObject::circle(Pos::new(0.0, 0.0), 0.0),
            HitObject::slider(Pos::new(0.0, 0.0), slider),
            HitObject::spinner(Pos::new(256.0, 192.0), 2000.0, 3000.0),
        ];

        let mut attrs = Attributes::default();

        for h in objects.iter() {
            attrs.add_object(h);
        }

        assert_eq!(attrs.object_count, 3);
        assert_eq!((attrs.circles, attrs.sliders, attrs.spinners), (1, 1, 1));
        assert_eq!(attrs.max_combo, 2 + objects[1].max_combo());
    }
}
