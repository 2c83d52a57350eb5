use std::time::Duration;

use photobooth::{
    BurstCaptureController, CameraProvider, CaptureEvent, CaptureSettings, EncodedStill, Filter,
    Layout, ManualClock, PatternCamera, PhotoboothError, ReplayCamera,
};

fn settings(layout: Layout) -> CaptureSettings {
    CaptureSettings {
        layout,
        filter: Filter::Soft,
        ..CaptureSettings::default()
    }
}

fn still(level: u8) -> EncodedStill {
    let img = image::RgbaImage::from_pixel(16, 12, image::Rgba([level, level, level, 255]));
    EncodedStill::encode_jpeg(&img, 90).unwrap()
}

#[test]
fn every_layout_yields_one_burst_per_slot() {
    for layout in Layout::ALL {
        let controller = BurstCaptureController::new(settings(layout)).unwrap();
        let mut camera = PatternCamera::new(64, 48);
        let mut clock = ManualClock::new();

        let outcome = controller
            .run_with_camera(&mut camera, None, &mut clock, &mut |_| {})
            .unwrap();

        assert_eq!(outcome.photos.layout(), layout);
        assert_eq!(outcome.photos.bursts().len(), layout.shot_count());
        assert_eq!(outcome.filter, Filter::Soft);
        for burst in outcome.photos.bursts() {
            assert_eq!(burst.len(), 30);
        }
    }
}

#[test]
fn missed_samples_are_dropped_but_bursts_never_empty() {
    let controller = BurstCaptureController::new(settings(Layout::FourSquare)).unwrap();
    let mut camera = PatternCamera::new(32, 24).with_miss_every(2);
    let mut clock = ManualClock::new();
    let mut dropped = 0usize;

    let outcome = controller
        .run_with_camera(&mut camera, None, &mut clock, &mut |ev| {
            if let CaptureEvent::BurstCommitted { dropped: d, .. } = ev {
                dropped += *d;
            }
        })
        .unwrap();

    assert!(dropped > 0);
    for burst in outcome.photos.bursts() {
        assert!(!burst.is_empty());
        assert!(burst.len() < 30);
    }
}

#[test]
fn replay_of_only_final_frames_gives_single_frame_bursts() {
    // One frame per shot, delivered only at the forced capture.
    let ticks_per_shot = 30;
    let mut grabs = Vec::new();
    for shot in 0..4u8 {
        grabs.extend(std::iter::repeat_n(None, ticks_per_shot - 1));
        grabs.push(Some(still(shot * 40)));
    }
    let mut camera = ReplayCamera::new(grabs);
    assert_eq!(camera.video_inputs().len(), 1);

    let controller = BurstCaptureController::new(settings(Layout::FourDiagonal)).unwrap();
    let mut clock = ManualClock::new();
    let outcome = controller
        .run_with_camera(&mut camera, None, &mut clock, &mut |_| {})
        .unwrap();

    assert_eq!(outcome.photos.shortest_burst(), 1);
}

#[test]
fn empty_device_list_blocks_before_any_timer() {
    let controller = BurstCaptureController::new(settings(Layout::FourSquare)).unwrap();
    let mut camera = ReplayCamera::new(Vec::new());
    let mut clock = ManualClock::new();

    let err = controller
        .run_with_camera(&mut camera, None, &mut clock, &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, PhotoboothError::DeviceUnavailable(_)));
    assert_eq!(clock.elapsed(), Duration::ZERO);
}

#[test]
fn cancelling_mid_run_stops_the_clock() {
    let controller = BurstCaptureController::new(settings(Layout::SixGrid)).unwrap();
    let token = controller.cancel_token();
    let mut camera = PatternCamera::new(32, 24);
    let mut clock = ManualClock::new();

    let err = controller
        .run_with_camera(&mut camera, None, &mut clock, &mut |ev| {
            if matches!(ev, CaptureEvent::BurstCommitted { shot: 1, .. }) {
                token.cancel();
            }
        })
        .unwrap_err();
    assert!(matches!(err, PhotoboothError::Cancelled));
    assert!(clock.elapsed() < Duration::from_secs(3 * 6));
}
