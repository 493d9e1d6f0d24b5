#![allow(unused)]

use osu_pp_engine::{Difficulty, HitObject, Pos, Slider, SliderPath};

pub use self::mods::*;

/// Bit values for mods
mod mods {
    pub const NM: u32 = 0;
    pub const NF: u32 = 1 << 0;
    pub const EZ: u32 = 1 << 1;
    pub const HD: u32 = 1 << 3;
    pub const HR: u32 = 1 << 4;
    pub const DT: u32 = 1 << 6;
    pub const RX: u32 = 1 << 7;
    pub const FL: u32 = 1 << 10;
    pub const SO: u32 = 1 << 12;
    pub const AP: u32 = 1 << 13;
}

/// AR9 OD8 CS4, a typical hard chart.
pub fn difficulty() -> Difficulty {
    Difficulty::new(5.0, 4.0, 8.0, 9.0)
}

/// Circles alternating between two points `spacing` apart every `interval`
/// ms.
pub fn jumps(count: u32, spacing: f32, interval: f64) -> Vec<HitObject> {
    (0..count)
        .map(|i| {
            let x = 256.0 - spacing / 2.0 + (i % 2) as f32 * spacing;

            HitObject::circle(Pos::new(x, 192.0), f64::from(i) * interval)
        })
        .collect()
}

/// Circles on the corners of a square with alternating sliders in between.
pub fn mixed_chart(count: u32) -> Vec<HitObject> {
    const CORNERS: [(f32, f32); 4] = [(96.0, 96.0), (416.0, 96.0), (416.0, 288.0), (96.0, 288.0)];

    (0..count)
        .map(|i| {
            let (x, y) = CORNERS[i as usize % CORNERS.len()];
            let pos = Pos::new(x, y);
            let start_time = f64::from(i) * 250.0;

            if i % 3 == 2 {
                let path = SliderPath::linear(Pos::new(0.0, 80.0));

                HitObject::slider(pos, Slider::new(path, start_time, 120.0, 0, 60.0))
            } else {
                HitObject::circle(pos, start_time)
            }
        })
        .collect()
}
