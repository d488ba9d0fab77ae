use std::fmt::{Debug, Display};

#[cfg(feature = "camera_gphoto2")]
pub mod gphoto2;
#[cfg(feature = "camera_nokhwa")]
pub mod nokhwa;
pub mod still;

pub trait CameraBackend: Clone {
    type Error: Debug + Display + Send;
    type EnumeratedCamera: Debug + Display + PartialEq + Clone + Send;
    type Camera: CameraBackendCamera;

    fn initialize() -> Result<(), Self::Error> {
        Ok(())
    }
    fn enumerate_cameras() -> Result<Vec<Self::EnumeratedCamera>, Self::Error>;
    /// Acquire the device and start its live feed. The feed stops when the
    /// returned camera is dropped.
    fn open_camera(item: Self::EnumeratedCamera) -> Result<Self::Camera, Self::Error>;
}

pub trait CameraBackendCamera: Send {
    type Error: Debug + Display + Send;

    /// The frame currently on the live feed, at the camera's native resolution.
    fn capture_video_frame(&mut self) -> Result<image::RgbaImage, Self::Error>;
}

#[cfg(feature = "camera_nokhwa")]
pub type DefaultCameraBackend = nokhwa::NokhwaBackend;
#[cfg(all(not(feature = "camera_nokhwa"), feature = "camera_gphoto2"))]
pub type DefaultCameraBackend = gphoto2::GPhoto2Backend;
