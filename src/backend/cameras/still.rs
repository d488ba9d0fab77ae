//! A camera that replays image files as its live feed.

use std::path::{Path, PathBuf};

use image::RgbaImage;

#[derive(Debug, thiserror::Error)]
pub enum StillCameraError {
    #[error("failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("no frames to play back")]
    NoFrames,
}

/// Serves its frames in order, one per capture, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct StillCamera {
    frames: Vec<RgbaImage>,
    next: usize,
}

impl StillCamera {
    pub fn new(frames: Vec<RgbaImage>) -> Self {
        Self { frames, next: 0 }
    }

    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self, StillCameraError> {
        if paths.is_empty() {
            return Err(StillCameraError::NoFrames);
        }
        let frames = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                log::debug!("Loading frame {}", path.display());
                image::open(path)
                    .map(|image| image.to_rgba8())
                    .map_err(|source| StillCameraError::Load {
                        path: path.to_path_buf(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(frames))
    }
}

impl super::CameraBackendCamera for StillCamera {
    type Error = StillCameraError;

    fn capture_video_frame(&mut self) -> Result<RgbaImage, StillCameraError> {
        if self.frames.is_empty() {
            return Err(StillCameraError::NoFrames);
        }
        let frame = self.frames[self.next % self.frames.len()].clone();
        self.next = (self.next + 1) % self.frames.len();
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::cameras::CameraBackendCamera;

    #[test]
    fn frames_cycle_in_order() {
        let a = RgbaImage::from_pixel(2, 2, image::Rgba([1, 0, 0, 255]));
        let b = RgbaImage::from_pixel(2, 2, image::Rgba([2, 0, 0, 255]));
        let mut camera = StillCamera::new(vec![a.clone(), b.clone()]);
        assert_eq!(camera.capture_video_frame().unwrap(), a);
        assert_eq!(camera.capture_video_frame().unwrap(), b);
        assert_eq!(camera.capture_video_frame().unwrap(), a);
    }

    #[test]
    fn empty_camera_has_no_frame() {
        let mut camera = StillCamera::new(Vec::new());
        assert!(matches!(
            camera.capture_video_frame(),
            Err(StillCameraError::NoFrames)
        ));
    }

    #[test]
    fn missing_file_fails_to_open() {
        let result = StillCamera::open(&["/definitely/not/here.png"]);
        assert!(matches!(result, Err(StillCameraError::Load { .. })));
    }
}
