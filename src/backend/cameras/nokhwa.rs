use nokhwa::{
    self,
    pixel_format::RgbAFormat,
    utils::{CameraIndex, CameraInfo, RequestedFormat},
    Camera, NokhwaError,
};

#[derive(Debug, Clone, Copy)]
pub struct NokhwaBackend {}

impl super::CameraBackend for NokhwaBackend {
    type Error = NokhwaError;
    type EnumeratedCamera = CameraInfo;
    type Camera = NokhwaCamera;

    fn initialize() -> Result<(), Self::Error> {
        nokhwa::nokhwa_initialize(|granted| {
            if !granted {
                log::warn!("Camera access was not granted");
            }
        });
        // Permission is reported asynchronously; a denial surfaces when the
        // camera is opened.
        Ok(())
    }

    fn enumerate_cameras() -> Result<Vec<nokhwa::utils::CameraInfo>, NokhwaError> {
        if !nokhwa::nokhwa_check() {
            return Err(NokhwaError::UnitializedError);
        }
        nokhwa::query(nokhwa::utils::ApiBackend::Auto)
    }

    fn open_camera(item: Self::EnumeratedCamera) -> Result<NokhwaCamera, Self::Error> {
        NokhwaCamera::open(item.index().clone())
    }
}

pub struct NokhwaCamera {
    index: CameraIndex,
    camera: Camera,
}

impl NokhwaCamera {
    pub fn open(index: CameraIndex) -> Result<Self, NokhwaError> {
        let mut camera = Camera::new(
            index.clone(),
            RequestedFormat::new::<RgbAFormat>(
                nokhwa::utils::RequestedFormatType::AbsoluteHighestResolution,
            ),
        )?;
        camera.open_stream()?;
        log::info!(
            "Opened camera {:?} at {}x{}",
            index,
            camera.resolution().width(),
            camera.resolution().height()
        );
        Ok(NokhwaCamera { index, camera })
    }
}

impl super::CameraBackendCamera for NokhwaCamera {
    type Error = NokhwaError;

    fn capture_video_frame(&mut self) -> Result<image::RgbaImage, NokhwaError> {
        self.camera.frame()?.decode_image::<RgbAFormat>()
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        if let Err(err) = self.camera.stop_stream() {
            log::warn!("Failed to stop camera {:?}: {}", self.index, err);
        } else {
            log::debug!("Stopped camera {:?}", self.index);
        }
    }
}
