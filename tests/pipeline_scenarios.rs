mod common;

use common::{CANVAS, canvas_with_square, raster_with_rect, speckled_raster};
use ink_normalize::processing::{NoContent, NormalizationPipeline, Normalized, TargetResolution};
use ink_normalize::{Extent, InkThreshold, RasterBuffer, RescalePlan, normalize};
use ink_scale::boxfilter::box_downsample;
use ink_scale::extent::detect_extent;
use ink_scale::raster::Rect;

#[test]
fn small_square_is_rejected_by_scale() {
    let raster = canvas_with_square(135, 135, 10);
    let trace = NormalizationPipeline::default().normalize_traced(&raster).unwrap();

    assert_eq!(trace.extent, Some(Extent { x: 135, y: 135, width: 10, height: 10 }));
    let scale = trace.scale_factor().unwrap();
    assert!((scale - 10.0 / 280.0).abs() < 1e-12);
    assert!(matches!(trace.plan, Some(RescalePlan::Reject { .. })));
    assert!(matches!(
        trace.outcome,
        Normalized::NoContent(NoContent::RejectedByScale { .. })
    ));
    assert!(trace.working.is_none());
}

#[test]
fn large_region_passes_through_uncropped() {
    let raster = raster_with_rect(CANVAS, CANVAS, 20, 20, 240, 240);
    let trace = NormalizationPipeline::default().normalize_traced(&raster).unwrap();

    let scale = trace.scale_factor().unwrap();
    assert!((scale - 240.0 / 280.0).abs() < 1e-12);
    assert!(matches!(trace.plan, Some(RescalePlan::PassThrough { .. })));
    assert_eq!(trace.working, trace.centered);

    let features = trace.outcome.features().unwrap();
    assert_eq!((features.width(), features.height()), (28, 28));
    assert_eq!(features.len(), 784);
    // 240 ink columns centered on 280 leave two empty cells per side.
    assert_eq!(features.get(0, 14), Some(0));
    assert_eq!(features.get(1, 14), Some(0));
    assert_eq!(features.get(2, 14), Some(255));
    assert_eq!(features.get(14, 14), Some(255));
    assert_eq!(features.get(25, 14), Some(255));
    assert_eq!(features.get(26, 14), Some(0));
}

#[test]
fn medium_region_is_cropped_before_downsampling() {
    let raster = canvas_with_square(10, 150, 80);
    let trace = NormalizationPipeline::default().normalize_traced(&raster).unwrap();

    let Some(RescalePlan::Crop { scale_factor, window }) = trace.plan else {
        panic!("expected a crop plan, got {:?}", trace.plan);
    };
    assert!((scale_factor - 80.0 / 280.0).abs() < 1e-12);
    // ceil(280 * (80/280) * 1.5), evaluated in f64.
    assert_eq!(window, Rect { x: 80, y: 80, w: 120, h: 120 });

    let working = trace.working.as_ref().unwrap();
    assert_eq!((working.width(), working.height()), (120, 120));
    // The ink sits at 100..180 on the canvas, i.e. 20..100 in the window.
    assert_eq!(
        detect_extent(working, InkThreshold::default()),
        Some(Extent { x: 20, y: 20, width: 80, height: 80 })
    );

    let features = trace.outcome.features().unwrap();
    assert_eq!(features.len(), 784);
    assert_eq!(features.get(4, 4), Some(0));
    assert_eq!(features.get(5, 5), Some(255));
    assert_eq!(features.get(24, 24), Some(255));
    assert_eq!(features.get(25, 25), Some(0));
}

#[test]
fn crop_window_has_no_float_overshoot() {
    // 58 * 1.5 = 87 exactly; the f64 product of the rounded ratio lands just above it.
    let raster = canvas_with_square(0, 0, 58);
    let trace = NormalizationPipeline::default().normalize_traced(&raster).unwrap();

    let Some(RescalePlan::Crop { window, .. }) = trace.plan else {
        panic!("expected a crop plan, got {:?}", trace.plan);
    };
    assert_eq!((window.w, window.h), (87, 87));
    let working = trace.working.as_ref().unwrap();
    assert_eq!((working.width(), working.height()), (87, 87));
}

#[test]
fn blank_rasters_are_empty_for_any_size() {
    for (w, h) in [(1, 1), (28, 28), (280, 280), (17, 300)] {
        let raster = RasterBuffer::from_vec(w, h, vec![0; (w * h) as usize]).unwrap();
        let trace = NormalizationPipeline::default().normalize_traced(&raster).unwrap();
        assert_eq!(trace.outcome, Normalized::NoContent(NoContent::EmptyExtent));
        assert!(trace.centered.is_none());
        assert!(trace.working.is_none());
    }
}

#[test]
fn full_canvas_ink_leaves_centered_buffer_unchanged() {
    let raster = RasterBuffer::from_vec(90, 60, vec![200; 90 * 60]).unwrap();
    let trace = NormalizationPipeline::default().normalize_traced(&raster).unwrap();
    assert_eq!(trace.scale_factor(), Some(1.0));
    assert_eq!(trace.centered.as_ref(), Some(&raster));
    assert_eq!(trace.working.as_ref(), Some(&raster));
}

#[test]
fn extent_is_the_minimal_bounding_box() {
    for seed in 0..24 {
        let raster = speckled_raster(37, 23, seed, 40);
        let Some(extent) = detect_extent(&raster, InkThreshold::default()) else {
            continue;
        };

        let mut left = false;
        let mut right = false;
        let mut top = false;
        let mut bottom = false;
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                if raster.get(x, y).unwrap() == 0 {
                    continue;
                }
                assert!(extent.contains(x, y), "seed {seed}: ink at ({x}, {y}) outside {extent:?}");
                left |= x == extent.x;
                right |= x == extent.x + extent.width - 1;
                top |= y == extent.y;
                bottom |= y == extent.y + extent.height - 1;
            }
        }
        assert!(left && right && top && bottom, "seed {seed}: {extent:?} is not minimal");
    }
}

#[test]
fn downsample_length_matches_target() {
    let raster = speckled_raster(61, 47, 7, 3);
    for (tw, th) in [(1, 1), (28, 28), (5, 90), (61, 47), (100, 3)] {
        let features = box_downsample(&raster, tw, th).unwrap();
        assert_eq!(features.len(), (tw * th) as usize);
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let pipeline = NormalizationPipeline::default();
    for seed in 0..8 {
        let raster = speckled_raster(280, 280, seed, 500);
        let first = pipeline.normalize(&raster).unwrap();
        let second = pipeline.normalize(&raster).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn zero_target_is_a_contract_violation() {
    let err = TargetResolution::new(28, 0).unwrap_err();
    assert!(ink_normalize::error::classify::is_contract_violation(&err));
}

#[test]
fn convenience_normalize_uses_target() {
    let raster = canvas_with_square(100, 100, 100);
    let target = TargetResolution::new(8, 4).unwrap();
    let features = normalize(&raster, target).unwrap().into_features().unwrap();
    assert_eq!((features.width(), features.height()), (8, 4));
}
