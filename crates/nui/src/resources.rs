//! Shared, reference-counted resource handles.
//!
//! Fonts, cursors and images are opaque to the core: it only needs identity
//! (so redundant assignments can be skipped without touching the backend) and,
//! for images, a size. Pixel data, glyph rasterization and codecs live behind
//! the platform binding.

use crate::geometry::{Pixels, Size};
use std::rc::Rc;

/// Weight of a [`Font`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum FontWeight {
    Thin,
    Light,
    #[default]
    Normal,
    Medium,
    Semibold,
    Bold,
    Black,
}

/// Slant of a [`Font`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// A font description handed to the platform binding verbatim. Views compare
/// fonts by `Rc` identity, not by value, so cloning the description into a new
/// `Rc` produces a distinct resource.
#[derive(Clone, Debug)]
pub struct Font {
    pub family: String,
    pub size: Pixels,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl Font {
    pub fn new(family: impl Into<String>, size: Pixels) -> Rc<Self> {
        Rc::new(Font {
            family: family.into(),
            size,
            weight: FontWeight::default(),
            style: FontStyle::default(),
        })
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }
}

/// Standard cursor shapes a view can request while hovered.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum CursorStyle {
    #[default]
    Arrow,
    IBeam,
    Crosshair,
    PointingHand,
    ResizeLeftRight,
    ResizeUpDown,
    NotAllowed,
}

/// A cursor handle. Compared by `Rc` identity when assigned to a view.
#[derive(Debug)]
pub struct Cursor {
    pub style: CursorStyle,
}

impl Cursor {
    pub fn new(style: CursorStyle) -> Rc<Self> {
        Rc::new(Cursor { style })
    }
}

/// An image handle: identity plus logical size. Used only for drag images in
/// the core; decoding and rendering are the platform's concern.
#[derive(Debug)]
pub struct Image {
    size: Size<Pixels>,
}

impl Image {
    pub fn new(size: Size<Pixels>) -> Rc<Self> {
        Rc::new(Image { size })
    }

    pub fn size(&self) -> Size<Pixels> {
        self.size
    }
}
