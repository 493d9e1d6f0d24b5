use std::f64::consts::{E, PI};

pub fn bpm_to_milliseconds(bpm: f64, delimiter: Option<i32>) -> f64 {
    60_000.0 / f64::from(delimiter.unwrap_or(4)) / bpm
}

pub fn milliseconds_to_bpm(ms: f64, delimiter: Option<i32>) -> f64 {
    60_000.0 / (ms * f64::from(delimiter.unwrap_or(4)))
}

// `E.powf` rather than `f64::exp` to keep results bit-identical
pub fn logistic(x: f64, max_value: f64, multiplier: f64, offset: f64) -> f64 {
    max_value / (1.0 + E.powf(offset - multiplier * x))
}

pub fn lerp(start: f64, end: f64, amount: f64) -> f64 {
    start + (end - start) * amount
}

pub fn reverse_lerp(x: f64, start: f64, end: f64) -> f64 {
    ((x - start) / (end - start)).clamp(0.0, 1.0)
}

pub fn smoothstep(x: f64, start: f64, end: f64) -> f64 {
    let x = reverse_lerp(x, start, end);

    x * x * (3.0 - 2.0 * x)
}

pub fn smootherstep(x: f64, start: f64, end: f64) -> f64 {
    let x = reverse_lerp(x, start, end);

    x * x * x * (x * (6.0 * x - 15.0) + 10.0)
}

// Not `f64::to_radians` to keep the order of float operations
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}
