use approx::assert_abs_diff_eq;
use osu_pp_engine::{Attributes, PerfScore, PpVersion, SliderAccuracy};
use strum::IntoEnumIterator;

mod common;

fn attributes(version: PpVersion, mods: u32) -> Attributes {
    let objects = common::mixed_chart(300);
    let diff = common::difficulty().mods(mods);

    version.difficulty_calculator().calculate_single(&objects, &diff)
}

#[test]
fn full_combo_ss_is_best() {
    let diff = common::difficulty();

    for version in PpVersion::iter() {
        let attrs = attributes(version, common::NM);
        let calculator = version.performance_calculator();

        let best = calculator.calculate(&attrs, &PerfScore::default(), &diff);

        let worse = PerfScore {
            accuracy: 0.97,
            count_ok: 12,
            ..PerfScore::default()
        };

        let worse = calculator.calculate(&attrs, &worse, &diff);

        assert!(best.total > 0.0, "[{version}]");
        assert!(best.total > worse.total, "[{version}]");
        assert!(best.acc > worse.acc, "[{version}]");
    }
}

#[test]
fn full_combo_ss_accuracy_value() {
    let objects = common::jumps(300, 120.0, 200.0);
    let diff = common::difficulty();

    let length_bonus = (300.0_f64 / 1000.0).powf(0.3).min(1.15);
    let expected = 1.52163_f64.powf(diff.od_real()) * 2.83 * length_bonus;

    for version in PpVersion::iter() {
        let attrs = version.difficulty_calculator().calculate_single(&objects, &diff);
        let pp = version.performance_calculator().calculate(&attrs, &PerfScore::default(), &diff);

        assert_eq!(attrs.circles, 300, "[{version}]");
        assert_abs_diff_eq!(pp.acc, expected, epsilon = 1e-9);
    }
}

#[test]
fn misses_never_increase_pp() {
    let diff = common::difficulty();

    for version in PpVersion::iter() {
        let attrs = attributes(version, common::NM);
        let calculator = version.performance_calculator();

        let mut prev = f64::INFINITY;

        for count_miss in 0..8 {
            let score = PerfScore {
                count_miss,
                ..PerfScore::default()
            };

            let pp = calculator.calculate(&attrs, &score, &diff).total;

            assert!(pp <= prev, "[{version}] {count_miss} misses: {pp} > {prev}");
            prev = pp;
        }
    }
}

#[test]
fn combo_never_increases_pp_when_lower() {
    let diff = common::difficulty();

    for version in PpVersion::iter() {
        let attrs = attributes(version, common::NM);
        let calculator = version.performance_calculator();

        let pp = |max_combo: u32| {
            let score = PerfScore {
                max_combo: Some(max_combo),
                count_miss: 1,
                ..PerfScore::default()
            };

            calculator.calculate(&attrs, &score, &diff).total
        };

        assert!(pp(attrs.max_combo / 4) <= pp(attrs.max_combo / 2), "[{version}]");
        assert!(pp(attrs.max_combo / 2) <= pp(attrs.max_combo), "[{version}]");
    }
}

#[test]
fn hidden_increases_pp() {
    let nomod = common::difficulty();
    let hidden = common::difficulty().mods(common::HD);

    for version in PpVersion::iter() {
        let attrs = attributes(version, common::NM);
        let calculator = version.performance_calculator();

        let nomod = calculator.calculate(&attrs, &PerfScore::default(), &nomod);
        let hidden = calculator.calculate(&attrs, &PerfScore::default(), &hidden);

        assert!(hidden.total > nomod.total, "[{version}]");
    }
}

#[test]
fn no_fail_reduces_pp_with_misses() {
    let nomod = common::difficulty();
    let no_fail = common::difficulty().mods(common::NF);

    let score = PerfScore {
        count_miss: 3,
        ..PerfScore::default()
    };

    for version in PpVersion::iter() {
        let attrs = attributes(version, common::NM);
        let calculator = version.performance_calculator();

        let nomod = calculator.calculate(&attrs, &score, &nomod);
        let no_fail = calculator.calculate(&attrs, &score, &no_fail);

        assert!(no_fail.total < nomod.total, "[{version}]");
        assert_abs_diff_eq!(no_fail.aim, nomod.aim);
    }
}

#[test]
fn relax_only_rewards_aim() {
    let diff = common::difficulty().mods(common::RX);

    for version in PpVersion::iter() {
        let attrs = attributes(version, common::RX);
        let pp = version
            .performance_calculator()
            .calculate(&attrs, &PerfScore::default(), &diff);

        assert_abs_diff_eq!(pp.speed, 0.0);
        assert_abs_diff_eq!(pp.acc, 0.0);
        assert!(pp.aim > 0.0, "[{version}]");
    }
}

#[test]
fn autopilot_drops_aim_in_latest() {
    let diff = common::difficulty().mods(common::AP);
    let attrs = attributes(PpVersion::LATEST, common::AP);

    let pp = PpVersion::LATEST
        .performance_calculator()
        .calculate(&attrs, &PerfScore::default(), &diff);

    assert_abs_diff_eq!(pp.aim, 0.0);
    assert!(pp.speed > 0.0);
}

#[test]
fn exact_slider_accuracy_counts_dropped_ends() {
    let diff = common::difficulty().slider_accuracy(SliderAccuracy::Exact);
    let attrs = attributes(PpVersion::LATEST, common::NM);
    let calculator = PpVersion::LATEST.performance_calculator();

    let all_ends = calculator.calculate(&attrs, &PerfScore::default(), &diff);

    let dropped_ends = PerfScore {
        slider_end: Some(attrs.sliders / 2),
        ..PerfScore::default()
    };

    let dropped_ends = calculator.calculate(&attrs, &dropped_ends, &diff);

    assert!(dropped_ends.aim <= all_ends.aim);
}

#[test]
fn flashlight_value_needs_mod() {
    let nomod = common::difficulty();
    let flashlight = common::difficulty().mods(common::FL);

    for version in PpVersion::iter() {
        let attrs = attributes(version, common::FL);
        let calculator = version.performance_calculator();

        let nomod = calculator.calculate(&attrs, &PerfScore::default(), &nomod);
        let flashlight = calculator.calculate(&attrs, &PerfScore::default(), &flashlight);

        assert_abs_diff_eq!(nomod.flashlight, 0.0);
        assert!(flashlight.flashlight > 0.0, "[{version}]");
    }
}

#[test]
fn empty_attributes_do_not_panic() {
    let diff = common::difficulty();

    for version in PpVersion::iter() {
        let pp = version
            .performance_calculator()
            .calculate(&Attributes::default(), &PerfScore::default(), &diff);

        assert!(!pp.total.is_nan(), "[{version}]");
    }
}
