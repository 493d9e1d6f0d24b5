use osu_pp_engine::{Difficulty, HitObject, PpError, PpVersion};

mod common;

#[test]
fn parse_versions() {
    assert_eq!("20241007".parse::<PpVersion>().ok(), Some(PpVersion::V20241007));
    assert_eq!(" 250306 ".parse::<PpVersion>().ok(), Some(PpVersion::V20250306));
    assert_eq!("Latest".parse::<PpVersion>().ok(), Some(PpVersion::LATEST));

    let err = "211112".parse::<PpVersion>();

    assert!(matches!(err, Err(PpError::UnknownVersion(_))));
}

#[test]
fn version_metadata() {
    let calculators = PpVersion::V20241007.calculators();

    assert_eq!(calculators.difficulty.version(), 20241007);
    assert_eq!(calculators.difficulty.version_message(), "2024-10-07: no post yet");

    let latest = PpVersion::LATEST.difficulty_calculator();

    assert_eq!(latest.version(), 20250306);
    assert!(latest.version_message().starts_with("2025-03-06"));
}

#[test]
fn calculate_many_keeps_order() {
    let jobs: Vec<(Vec<HitObject>, Difficulty)> = vec![
        (common::jumps(50, 300.0, 200.0), common::difficulty()),
        (common::mixed_chart(60), common::difficulty().mods(common::DT)),
        (Vec::new(), common::difficulty()),
        (common::jumps(80, 60.0, 90.0), common::difficulty().mods(common::HR)),
    ];

    for version in [PpVersion::V20241007, PpVersion::V20250306] {
        let many = version.calculate_many(&jobs);
        let calculator = version.difficulty_calculator();

        assert_eq!(many.len(), jobs.len());

        for ((objects, diff), attrs) in jobs.iter().zip(many.iter()) {
            assert_eq!(&calculator.calculate_single(objects, diff), attrs, "[{version}]");
        }
    }
}

#[cfg(feature = "async_tokio")]
#[tokio::test]
async fn step_on_blocking_worker() {
    let objects = common::jumps(40, 200.0, 150.0);
    let diff = common::difficulty();

    let steps = PpVersion::LATEST
        .calculate_step_async(objects.clone(), diff.clone())
        .await
        .unwrap();

    let expected = PpVersion::LATEST
        .difficulty_calculator()
        .calculate_step(&objects, &diff);

    assert_eq!(steps, expected);
}
