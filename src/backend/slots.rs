use std::{fmt::Display, io::Cursor, str::FromStr};

use bytes::Bytes;
use image::RgbaImage;

/// A strip layout, choosing how many photos the strip holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Classic,
    Quad,
    Duo,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Classic, Template::Quad, Template::Duo];

    pub fn slot_count(self) -> usize {
        match self {
            Template::Classic => 3,
            Template::Quad => 4,
            Template::Duo => 2,
        }
    }

    pub fn identifier(self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Quad => "quad",
            Template::Duo => "duo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Template::Classic => "3 Photos",
            Template::Quad => "4 Photos",
            Template::Duo => "2 Photos",
        }
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|t| t.identifier().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown template: {}", s))
    }
}

/// A captured photo, held PNG-encoded until someone needs the pixels.
///
/// Cloning is cheap; the encoded bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    encoded: Bytes,
}

impl Photo {
    pub fn encode(image: &RgbaImage) -> Result<Self, image::ImageError> {
        let mut encoded = Vec::new();
        image.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)?;
        Ok(Self {
            encoded: Bytes::from(encoded),
        })
    }

    /// Wrap already-encoded image data. Nothing is validated until [`Photo::decode`].
    pub fn from_encoded(encoded: impl Into<Bytes>) -> Self {
        Self {
            encoded: encoded.into(),
        }
    }

    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }

    pub fn decode(&self) -> Result<RgbaImage, image::ImageError> {
        Ok(image::load_from_memory(&self.encoded)?.to_rgba8())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("slot {index} is out of range for a strip of {len} slots")]
    OutOfRange { index: usize, len: usize },
}

/// The fixed-length, ordered sequence of capture slots.
///
/// Slots are addressed by index only; index order is top-to-bottom strip order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStore {
    slots: Vec<Option<Photo>>,
}

impl SlotStore {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    pub fn for_template(template: Template) -> Self {
        Self::new(template.slot_count())
    }

    pub fn reset(&mut self, slot_count: usize) {
        self.slots = vec![None; slot_count];
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn first_empty_index(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn get(&self, index: usize) -> Option<&Photo> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn set(&mut self, index: usize, photo: Photo) -> Result<(), SlotError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(SlotError::OutOfRange { index, len })?;
        *slot = Some(photo);
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> Result<(), SlotError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(SlotError::OutOfRange { index, len })?;
        *slot = None;
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.reset(self.slots.len());
    }

    pub fn has_any_content(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Number of slots still waiting for a capture.
    pub fn remaining(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// A copy of the current slot contents for rendering.
    pub fn snapshot(&self) -> Vec<Option<Photo>> {
        self.slots.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<&Photo>)> {
        self.slots.iter().enumerate().map(|(i, s)| (i, s.as_ref()))
    }
}
