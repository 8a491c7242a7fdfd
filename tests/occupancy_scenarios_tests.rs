// End-to-end engine scenarios: reference cases for each sampling semantics,
// room merging, weekday exclusion and the consistency report

mod utils;

use chrono::Weekday;
use ortrend::aggregate::OccupancyCurve;
use ortrend::config::EngineConfig;
use ortrend::engine::{EngineReport, OccupancyEngine};
use ortrend::error::OccupancyError;
use ortrend::sampler::Semantics;
use ortrend::utilization::{Denominator, Scope, Variant, Weighting};
use utils::{row, sample_week, standard_config};

fn value_at(curve: &OccupancyCurve, time: u32) -> f64 {
    let i = curve
        .anchors
        .iter()
        .position(|&a| a == time)
        .expect("anchor present");
    curve.values[i]
}

fn run(config: EngineConfig) -> EngineReport {
    OccupancyEngine::new(config)
        .unwrap()
        .run(&sample_week())
        .unwrap()
}

fn with_semantics(semantics: Semantics) -> EngineConfig {
    EngineConfig {
        semantics,
        ..standard_config()
    }
}

const NINE: u32 = 540;
const TEN: u32 = 600;

#[test]
fn test_room_09_reference_cases() {
    let engine = OccupancyEngine::new(standard_config()).unwrap();

    let morning = engine
        .run(&[row("2025-09-01", "09", "8:44", "13:39", "定時")])
        .unwrap();
    assert_eq!(value_at(&morning.overall.combined, NINE), 1.0);

    let afternoon = engine
        .run(&[row("2025-09-01", "09", "14:13", "15:50", "定時")])
        .unwrap();
    assert_eq!(value_at(&afternoon.overall.combined, NINE), 0.0);

    let point = OccupancyEngine::new(with_semantics(Semantics::PointSample)).unwrap();
    let morning = point
        .run(&[row("2025-09-01", "09", "8:44", "13:39", "定時")])
        .unwrap();
    assert_eq!(value_at(&morning.overall.combined, NINE), 1.0);
    let afternoon = point
        .run(&[row("2025-09-01", "09", "14:13", "15:50", "定時")])
        .unwrap();
    assert_eq!(value_at(&afternoon.overall.combined, NINE), 0.0);
}

#[test]
fn test_window_overlap_sample_week() {
    let report = run(standard_config());
    let combined = &report.overall.combined;

    // Mon 2 rooms, Tue 1, Wed 1; Saturday excluded
    assert_eq!(combined.day_count, 3);
    assert_eq!(value_at(combined, NINE), 1.33);
    // Mon adds the merged 01B (weight 0.5) at 10:00
    assert_eq!(value_at(combined, TEN), 1.5);

    // urgent averages over its own two days
    assert_eq!(report.overall.urgent.day_count, 2);
    assert_eq!(value_at(&report.overall.urgent, TEN), 0.25);
}

#[test]
fn test_semantics_give_different_curves() {
    let window = run(standard_config());
    let point = run(with_semantics(Semantics::PointSample));
    let minute = run(with_semantics(Semantics::minute_averaged()));
    let fraction = run(with_semantics(Semantics::OverlapFraction { window: 30 }));

    assert_eq!(value_at(&window.overall.combined, NINE), 1.33);
    assert_eq!(value_at(&point.overall.combined, NINE), 1.0);
    assert_eq!(value_at(&minute.overall.combined, NINE), 1.28);
    assert_eq!(value_at(&fraction.overall.combined, NINE), 1.28);

    assert_eq!(point.semantics, "point-sample");
    assert_ne!(window.input_digest, "");
    assert_eq!(window.input_digest, point.input_digest);
}

#[test]
fn test_diagnostics_account_for_every_row() {
    let report = run(standard_config());
    let d = &report.diagnostics;
    assert_eq!(d.input_rows, 9);
    assert_eq!(d.unknown_count(), 1);
    assert_eq!(d.unknown_rooms["HYBRID"], 1);
    assert_eq!(d.resolved_records, 8);
    assert_eq!(d.merged_records, 1);
    assert_eq!(d.excluded_by_weekday, 1);
    assert_eq!(d.inverted_intervals, 0);
    assert!(d.dropped_rooms.is_empty());
}

#[test]
fn test_saturday_only_in_weekday_breakdown() {
    let report = run(standard_config());
    let labels: Vec<&str> = report.weekdays.iter().map(|w| w.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["月曜日", "火曜日", "水曜日", "木曜日", "金曜日", "土曜日"]
    );

    let saturday = report
        .weekdays
        .iter()
        .find(|w| w.weekday == Weekday::Sat)
        .unwrap();
    assert_eq!(saturday.combined.day_count, 1);
    assert_eq!(value_at(&saturday.combined, NINE), 1.0);

    let thursday = report
        .weekdays
        .iter()
        .find(|w| w.weekday == Weekday::Thu)
        .unwrap();
    assert_eq!(thursday.combined.day_count, 0);
    assert!(thursday.combined.values.iter().all(|v| *v == 0.0));
}

#[test]
fn test_sample_week_reconciles() {
    let report = run(standard_config());
    assert_eq!(report.consistency.mismatch_count, 0);
    assert!(report.consistency.ceiling_violations.is_empty());
    assert_eq!(report.consistency.ceiling, 4.0);
    assert!(report.consistency.max_observed <= 4.0);
}

#[test]
fn test_shared_room_across_categories_is_a_mismatch_not_an_error() {
    let engine = OccupancyEngine::new(standard_config()).unwrap();
    let report = engine
        .run(&[
            row("2025-09-01", "02", "8:00", "9:00", "定時"),
            row("2025-09-01", "02", "9:05", "10:00", "緊急"),
        ])
        .unwrap();
    // both touch 02 inside the 9:00 window; combined counts the room once
    assert!(report.consistency.mismatch_count >= 1);
    let cell = report
        .consistency
        .mismatches
        .iter()
        .find(|m| m.anchor == NINE)
        .unwrap();
    assert_eq!(cell.partition_sum, 2.0);
    assert_eq!(cell.combined, 1.0);
}

#[test]
fn test_zero_weight_room_without_sibling_is_dropped() {
    let mut config = standard_config();
    config.rooms.push(ortrend::registry::RoomRow::new("07C", 0.0));
    let engine = OccupancyEngine::new(config).unwrap();
    let report = engine
        .run(&[row("2025-09-01", "07C", "8:00", "12:00", "定時")])
        .unwrap();
    assert_eq!(report.diagnostics.dropped_rooms, vec!["07C".to_string()]);
    assert_eq!(report.diagnostics.unknown_count(), 1);
    assert_eq!(report.overall.combined.day_count, 0);
}

#[test]
fn test_bad_rows_abort_with_row_number() {
    let engine = OccupancyEngine::new(standard_config()).unwrap();
    let mut rows = sample_week();
    rows[4].category = "routine".to_string();
    let err = engine.run(&rows).unwrap_err();
    assert!(matches!(err, OccupancyError::Record { row: 5, .. }));
    assert!(err.to_string().contains("routine"));
}

#[test]
fn test_calibration_variants_ranked_against_target() {
    let config = EngineConfig {
        target_rate: Some(30.0),
        variants: vec![
            Variant::new("configured", Semantics::default()),
            Variant {
                scope: Scope::Scheduled,
                weighting: Weighting::Uniform,
                exclude_rooms: vec!["ｱﾝｷﾞｵ".to_string()],
                denominator: Some(Denominator::Fixed { value: 9.0 }),
                ..Variant::new("scheduled, flat, fixed 9", Semantics::PointSample)
            },
        ],
        ..standard_config()
    };
    let report = run(config);
    assert_eq!(report.calibration.len(), 2);
    for pair in report.calibration.windows(2) {
        let a = pair[0].distance.unwrap().abs();
        let b = pair[1].distance.unwrap().abs();
        assert!(a <= b);
    }
    for result in &report.calibration {
        assert!(result.rate >= 0.0 && result.rate <= 100.0);
        assert_eq!(result.day_count, 3);
    }
}

#[test]
fn test_utilization_reported() {
    let report = run(standard_config());
    let u = &report.utilization;
    assert_eq!((u.start, u.end), (540, 990));
    assert_eq!(u.capacity, 4.0);
    assert_eq!(u.denominator, "weight-sum");
    assert!(u.combined > 0.0 && u.combined < 100.0);
    assert!(u.scheduled > 0.0 && u.scheduled <= u.combined + 1e-9);
}
