//! One booth session: the strip settings, the slots, and the live camera.

use std::{fmt::Display, future::Future, path::PathBuf};

use image::RgbaImage;

use super::{
    cameras::CameraBackendCamera,
    capture::{self, CaptureError, CaptureOutcome},
    compositor::{CompositeOptions, DeviceClass, DEFAULT_CAPTION},
    export::{self, ExportError},
    filters::Filter,
    pattern::PatternKind,
    slots::{SlotError, SlotStore, Template},
};

pub const DEFAULT_BORDER_COLOR: &str = "#D4AF37";

#[derive(Debug, Clone, PartialEq)]
pub struct StripSettings {
    pub template: Template,
    pub filter: Filter,
    pub flipped: bool,
    pub border_color: String,
    pub pattern: PatternKind,
    pub device_class: DeviceClass,
    pub caption: String,
}

impl Default for StripSettings {
    fn default() -> Self {
        Self {
            template: Template::default(),
            filter: Filter::default(),
            flipped: false,
            border_color: DEFAULT_BORDER_COLOR.to_string(),
            pattern: PatternKind::default(),
            device_class: DeviceClass::default(),
            caption: DEFAULT_CAPTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Booth,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
}

/// Holds at most one live camera. The camera is released when the session
/// leaves the booth or is dropped, whichever comes first.
pub struct BoothSession<C: CameraBackendCamera> {
    settings: StripSettings,
    slots: SlotStore,
    camera: Option<C>,
}

impl<C: CameraBackendCamera> BoothSession<C> {
    pub fn new(settings: StripSettings) -> Self {
        let slots = SlotStore::for_template(settings.template);
        Self {
            settings,
            slots,
            camera: None,
        }
    }

    pub fn stage(&self) -> Stage {
        if self.camera.is_some() {
            Stage::Booth
        } else {
            Stage::Idle
        }
    }

    /// Enter the booth with the result of opening a camera.
    ///
    /// On failure the session stays idle.
    pub fn enter<E: Display>(&mut self, camera: Result<C, E>) -> Result<(), SessionError> {
        self.release_camera();
        match camera {
            Ok(camera) => {
                self.camera = Some(camera);
                self.slots.reset(self.settings.template.slot_count());
                log::info!(
                    "Entered booth with {} template ({} slots)",
                    self.settings.template,
                    self.slots.len()
                );
                Ok(())
            }
            Err(err) => {
                log::warn!("Could not open camera: {}", err);
                Err(SessionError::CameraUnavailable(err.to_string()))
            }
        }
    }

    /// Release the camera and return to idle, discarding captured photos.
    pub fn leave(&mut self) {
        self.release_camera();
        self.slots.reset(self.settings.template.slot_count());
    }

    fn release_camera(&mut self) {
        if let Some(camera) = self.camera.take() {
            drop(camera);
            log::info!("Released camera");
        }
    }

    pub fn capture(&mut self) -> Result<CaptureOutcome, CaptureError> {
        if self.slots.first_empty_index().is_none() {
            return Ok(CaptureOutcome::NoCapacity);
        }
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| CaptureError::SourceUnavailable("no active camera".to_string()))?;
        capture::capture(
            camera,
            self.settings.filter,
            self.settings.flipped,
            &mut self.slots,
        )
    }

    pub fn clear(&mut self, index: usize) -> Result<(), SlotError> {
        self.slots.clear(index)
    }

    pub fn clear_all(&mut self) {
        self.slots.clear_all();
    }

    /// Switch layouts. Captured photos never carry over.
    pub fn select_template(&mut self, template: Template) {
        self.settings.template = template;
        self.slots.reset(template.slot_count());
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.settings.filter = filter;
    }

    pub fn toggle_flip(&mut self) -> bool {
        self.settings.flipped = !self.settings.flipped;
        self.settings.flipped
    }

    pub fn set_border_color(&mut self, color: impl Into<String>) {
        self.settings.border_color = color.into();
    }

    pub fn set_pattern(&mut self, pattern: PatternKind) {
        self.settings.pattern = pattern;
    }

    pub fn set_device_class(&mut self, device_class: DeviceClass) {
        self.settings.device_class = device_class;
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.settings.caption = caption.into();
    }

    pub fn settings(&self) -> &StripSettings {
        &self.settings
    }

    pub fn slots(&self) -> &SlotStore {
        &self.slots
    }

    pub fn remaining(&self) -> usize {
        self.slots.remaining()
    }

    /// Decoded pixels of a filled slot, for on-screen display.
    pub fn preview(&self, index: usize) -> Option<Result<RgbaImage, image::ImageError>> {
        self.slots.get(index).map(|photo| photo.decode())
    }

    pub fn composite_options(&self) -> CompositeOptions {
        let mut options = CompositeOptions::new(
            self.settings.border_color.clone(),
            self.settings.pattern,
            self.settings.device_class,
        );
        options.caption = self.settings.caption.clone();
        options
    }

    /// Export the strip as it stands now.
    ///
    /// The slots are snapshotted before this returns, so later captures or
    /// clears don't affect the export in flight.
    pub fn export(
        &self,
        output_dir: impl Into<PathBuf>,
    ) -> impl Future<Output = Result<PathBuf, ExportError>> + Send + 'static {
        export::export_strip(
            self.slots.snapshot(),
            self.composite_options(),
            output_dir.into(),
        )
    }
}

impl<C: CameraBackendCamera> Drop for BoothSession<C> {
    fn drop(&mut self) {
        self.release_camera();
    }
}
