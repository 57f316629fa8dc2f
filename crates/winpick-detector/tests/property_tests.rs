//! Property-based tests for window region detection.
//!
//! Uses proptest to generate random frames and verify detector invariants.

use proptest::prelude::*;

use winpick_core::{DetectionSettings, Frame, PixelFormat, RegionCategory};
use winpick_detector::testing::SyntheticScreen;
use winpick_detector::{FrameDetector, RegionDetector};

fn pixel_format() -> impl Strategy<Value = PixelFormat> {
    prop_oneof![
        Just(PixelFormat::Rgba8),
        Just(PixelFormat::Bgra8),
        Just(PixelFormat::Rgb8),
        Just(PixelFormat::Gray8),
    ]
}

/// A well-formed frame of random noise.
fn noise_frame() -> impl Strategy<Value = Frame> {
    (1u32..96, 1u32..72, pixel_format()).prop_flat_map(|(width, height, format)| {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        prop::collection::vec(any::<u8>(), len)
            .prop_map(move |pixels| Frame::new(pixels, width, height, format))
    })
}

/// A single grid-aligned window on a 400x300 desktop that the tracer can
/// capture in one pass: `(x, y, width, height)`.
fn aligned_window() -> impl Strategy<Value = (u32, u32, u32, u32)> {
    (55u32..=190, 55u32..=190).prop_flat_map(|(w, h)| {
        let max_kx = (400 - w - 3) / 5;
        let max_ky = (300 - h - 3) / 5;
        (1..=max_kx, 1..=max_ky).prop_map(move |(kx, ky)| (kx * 5, ky * 5, w, h))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Detection never panics, whatever the buffer length.
    #[test]
    fn detector_never_panics_on_any_buffer(
        width in 0u32..64,
        height in 0u32..64,
        format in pixel_format(),
        pixels in prop::collection::vec(any::<u8>(), 0..4096),
    ) {
        let frame = Frame::new(pixels, width, height, format);
        let regions = RegionDetector::new().detect(&frame, 0);

        if frame.validate().is_err() {
            prop_assert!(regions.is_empty());
        }
    }

    /// Every region lies inside the frame and passes the size filter.
    #[test]
    fn regions_are_inside_frame_and_sized(frame in noise_frame(), cycle in 0u32..20) {
        let settings = DetectionSettings::default();
        let regions = RegionDetector::new().detect(&frame, cycle);
        let (width, height) = (f64::from(frame.width()), f64::from(frame.height()));

        for region in &regions {
            let bounds = region.bounds();
            prop_assert!(bounds.left() >= 0.0 && bounds.top() >= 0.0);
            prop_assert!(bounds.right() <= width);
            prop_assert!(bounds.bottom() <= height);
            prop_assert!(bounds.width() > f64::from(settings.min_region_size));
            prop_assert!(bounds.height() > f64::from(settings.min_region_size));
            prop_assert!(bounds.width() < settings.max_screen_fraction * width);
            prop_assert!(bounds.height() < settings.max_screen_fraction * height);
            prop_assert_eq!(region.cycle_position(), cycle);
            prop_assert!(!region.thumbnail().is_empty());
        }
    }

    /// An aligned window is found exactly, outline included.
    #[test]
    fn aligned_window_is_found((x, y, w, h) in aligned_window()) {
        let frame = SyntheticScreen::new(400, 300).with_window(x, y, w, h).render();
        let regions = RegionDetector::new().detect(&frame, 1);

        prop_assert_eq!(regions.len(), 1);
        let bounds = regions[0].bounds();
        prop_assert_eq!(bounds.left(), f64::from(x));
        prop_assert_eq!(bounds.top(), f64::from(y));
        prop_assert_eq!(bounds.width(), f64::from(w + 1));
        prop_assert_eq!(bounds.height(), f64::from(h + 1));

        let share = bounds.area() / 120_000.0;
        prop_assert_eq!(regions[0].category(), RegionCategory::classify(share));
    }

    /// Detection is a pure function of the frame.
    #[test]
    fn detection_is_deterministic(frame in noise_frame()) {
        let detector = RegionDetector::new();
        let first = detector.detect(&frame, 0);
        let second = detector.detect(&frame, 0);
        prop_assert_eq!(first, second);
    }
}
