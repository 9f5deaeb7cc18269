mod common;

use common::*;
use image::{DynamicImage, ImageFormat, RgbImage};
use plumb_tilt::config::Config;
use plumb_tilt::*;
use std::io::Cursor;

fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(32, 32))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn level() -> Option<OrientationSample> {
    Some(OrientationSample::now(0.0, 0.0))
}

#[test]
fn test_failing_image_does_not_abort_batch() {
    let analyzer = BatchAnalyzer::new(pipeline_with(leaning_verticals(&[3.0; 8]))).unwrap();
    let inputs = vec![
        CaptureInput::new(blank_image(), level()),
        CaptureInput::new(vec![0xde_u8, 0xad, 0xbe, 0xef], level()),
        CaptureInput::new(png_bytes(), level()),
    ];

    let report = analyzer.analyze(&inputs);

    assert_eq!(report.estimates.len(), 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].kind, FailureKind::Decode);

    let failed = &report.estimates[1];
    assert_eq!(failed.confidence, 0.0);
    assert!(failed.warning.is_some());

    assert_eq!(report.reliable_count, 2);
    assert!((report.aggregate.corrected_vertical - 3.0).abs() < 1e-9);
    assert_eq!(report.aggregate.severity, Severity::Moderate);
    assert_eq!(report.aggregate.line_count, 16);
}

#[test]
fn test_single_reliable_image_is_identity() {
    let analyzer = BatchAnalyzer::new(pipeline_with(leaning_verticals(&[1.5; 12]))).unwrap();
    let inputs = vec![
        CaptureInput::new(blank_image(), Some(OrientationSample::now(0.5, 0.2))),
        CaptureInput::new(Vec::<u8>::new(), None),
    ];

    let report = analyzer.analyze(&inputs);
    let single = &report.estimates[0];

    assert_eq!(report.reliable_count, 1);
    assert_eq!(report.aggregate.corrected_vertical, single.corrected_vertical);
    assert_eq!(report.aggregate.corrected_horizontal, single.corrected_horizontal);
    assert_eq!(report.aggregate.confidence, single.confidence);
    assert_eq!(report.aggregate.line_count, single.line_count);
    assert_eq!(report.aggregate.severity, single.severity);
}

#[test]
fn test_all_unreliable_batch() {
    // Two lines and no orientation: 0.25 × 0.7 falls below the reliability bar.
    let analyzer = BatchAnalyzer::new(pipeline_with(leaning_verticals(&[6.0, 6.0]))).unwrap();
    let inputs = vec![
        CaptureInput::new(blank_image(), None),
        CaptureInput::new(blank_image(), None),
    ];

    let report = analyzer.analyze(&inputs);

    assert_eq!(report.reliable_count, 0);
    assert!(report.failures.is_empty());
    assert_eq!(report.aggregate.severity, Severity::None);
    assert_eq!(report.aggregate.confidence, 0.0);
    assert_eq!(report.aggregate.warning.as_deref(), Some(NO_RELIABLE_WARNING));
    assert_eq!(report.aggregate.risk_points(), 0);
}

#[test]
fn test_results_keep_input_order() {
    let mut config = Config::default();
    config.aggregation.max_workers = 4;
    let pipeline = TiltPipeline::builder(config)
        .with_detector(StubDetector::new(leaning_verticals(&[2.0; 6])))
        .build();
    let analyzer = BatchAnalyzer::new(pipeline).unwrap();

    let inputs: Vec<CaptureInput> = (0..16)
        .map(|i| {
            if i % 5 == 0 {
                CaptureInput::new(Vec::<u8>::new(), None)
            } else {
                CaptureInput::new(blank_image(), level())
            }
        })
        .collect();

    let report = analyzer.analyze(&inputs);
    let failed: Vec<usize> = report.failures.iter().map(|f| f.index).collect();

    assert_eq!(failed, vec![0, 5, 10, 15]);
    for index in failed {
        assert_eq!(report.estimates[index].confidence, 0.0);
    }
    assert_eq!(report.reliable_count, 12);
}

#[test]
fn test_report_serializes() {
    let analyzer = BatchAnalyzer::new(pipeline_with(leaning_verticals(&[1.0; 4]))).unwrap();
    let report = analyzer.analyze(&[CaptureInput::new(Vec::<u8>::new(), None)]);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["failures"][0]["kind"], "invalid_image");
    assert!(json["aggregate"]["warning"].is_string());
    assert_eq!(json["reliableCount"], 0);
}
