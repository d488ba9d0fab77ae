//! Turns the live camera frame into a stored photo.

use image::RgbaImage;

use super::{
    cameras::CameraBackendCamera,
    filters::Filter,
    slots::{Photo, SlotError, SlotStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured { index: usize },
    /// Every slot already holds a photo; nothing was read or changed.
    NoCapacity,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no live frame available: {0}")]
    SourceUnavailable(String),
    #[error("failed to encode captured frame: {0}")]
    Encode(#[from] image::ImageError),
    #[error(transparent)]
    Slot(#[from] SlotError),
}

/// Apply the active filter, then mirror if requested.
pub fn process_frame(mut frame: RgbaImage, filter: Filter, flipped: bool) -> RgbaImage {
    filter.descriptor().apply_in_place(&mut frame);
    if flipped {
        image::imageops::flip_horizontal_in_place(&mut frame);
    }
    frame
}

/// Read the camera's current frame and store it in the first empty slot.
///
/// The slot store is only touched once the photo is fully prepared, so a
/// failure at any step leaves it unchanged.
pub fn capture<C: CameraBackendCamera>(
    camera: &mut C,
    filter: Filter,
    flipped: bool,
    slots: &mut SlotStore,
) -> Result<CaptureOutcome, CaptureError> {
    let Some(index) = slots.first_empty_index() else {
        log::debug!("Capture ignored, all {} slots are filled", slots.len());
        return Ok(CaptureOutcome::NoCapacity);
    };

    let frame = camera
        .capture_video_frame()
        .map_err(|err| CaptureError::SourceUnavailable(err.to_string()))?;
    if frame.width() == 0 || frame.height() == 0 {
        return Err(CaptureError::SourceUnavailable(
            "camera returned an empty frame".to_string(),
        ));
    }
    let (width, height) = frame.dimensions();

    let photo = Photo::encode(&process_frame(frame, filter, flipped))?;
    slots.set(index, photo)?;
    log::info!(
        "Captured {}x{} frame into slot {} ({}, flipped: {})",
        width,
        height,
        index,
        filter,
        flipped
    );
    Ok(CaptureOutcome::Captured { index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::cameras::still::StillCamera;
    use image::Rgba;

    struct UnpluggedCamera;

    impl CameraBackendCamera for UnpluggedCamera {
        type Error = String;

        fn capture_video_frame(&mut self) -> Result<RgbaImage, String> {
            Err("device disconnected".to_string())
        }
    }

    fn gradient() -> RgbaImage {
        RgbaImage::from_fn(6, 3, |x, _| Rgba([x as u8 * 40, 0, 0, 255]))
    }

    #[test]
    fn fills_slots_in_ascending_order() {
        let mut camera = StillCamera::new(vec![gradient()]);
        let mut slots = SlotStore::new(3);
        for expected in 0..3 {
            assert_eq!(
                capture(&mut camera, Filter::None, false, &mut slots).unwrap(),
                CaptureOutcome::Captured { index: expected }
            );
        }
        assert!(slots.first_empty_index().is_none());
    }

    #[test]
    fn full_store_is_left_alone() {
        let mut camera = StillCamera::new(vec![gradient()]);
        let mut slots = SlotStore::new(2);
        capture(&mut camera, Filter::None, false, &mut slots).unwrap();
        capture(&mut camera, Filter::None, false, &mut slots).unwrap();
        let before = slots.clone();
        for _ in 0..3 {
            assert_eq!(
                capture(&mut UnpluggedCamera, Filter::Sepia, true, &mut slots).unwrap(),
                CaptureOutcome::NoCapacity
            );
        }
        assert_eq!(slots, before);
    }

    #[test]
    fn cleared_slot_is_refilled_first() {
        let mut camera = StillCamera::new(vec![gradient()]);
        let mut slots = SlotStore::new(3);
        for _ in 0..3 {
            capture(&mut camera, Filter::None, false, &mut slots).unwrap();
        }
        slots.clear(1).unwrap();
        assert_eq!(
            capture(&mut camera, Filter::None, false, &mut slots).unwrap(),
            CaptureOutcome::Captured { index: 1 }
        );
    }

    #[test]
    fn missing_frame_leaves_store_unchanged() {
        let mut slots = SlotStore::new(2);
        let result = capture(&mut UnpluggedCamera, Filter::None, false, &mut slots);
        assert!(matches!(result, Err(CaptureError::SourceUnavailable(_))));
        assert!(!slots.has_any_content());
    }

    #[test]
    fn flip_is_baked_into_the_photo() {
        let mut camera = StillCamera::new(vec![gradient()]);
        let mut slots = SlotStore::new(1);
        capture(&mut camera, Filter::None, true, &mut slots).unwrap();
        let stored = slots.get(0).unwrap().decode().unwrap();
        assert_eq!(stored.dimensions(), (6, 3));
        assert_eq!(stored.get_pixel(0, 0).0[0], 200);
        assert_eq!(stored.get_pixel(5, 2).0[0], 0);
    }

    #[test]
    fn filter_is_baked_into_the_photo() {
        let frame = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 100, 255]));
        let mut camera = StillCamera::new(vec![frame]);
        let mut slots = SlotStore::new(1);
        capture(&mut camera, Filter::Invert, false, &mut slots).unwrap();
        let stored = slots.get(0).unwrap().decode().unwrap();
        assert_eq!(*stored.get_pixel(1, 1), Rgba([255, 0, 155, 255]));
    }
}
