//! Geometry primitives shared by the view tree and the platform boundary.
//!
//! Public view APIs speak [`Pixels`] (scale-independent logical units); the
//! platform binding speaks [`DevicePixels`] (integer device units). The only
//! conversions between the two live here, so rounding behavior is uniform:
//! logical rectangles round each edge to the nearest device pixel, which is
//! lossy but idempotent.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A logical, DPI-independent unit of length.
#[derive(Clone, Copy, Default, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Pixels(pub f32);

/// Constructs a [`Pixels`] value.
pub const fn px(value: f32) -> Pixels {
    Pixels(value)
}

impl Pixels {
    /// The zero length.
    pub const ZERO: Pixels = Pixels(0.0);

    /// Rounds to the nearest device pixel at the given scale factor.
    pub fn to_device(self, scale_factor: f32) -> DevicePixels {
        DevicePixels((self.0 * scale_factor).round() as i32)
    }
}

impl fmt::Debug for Pixels {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

impl Add for Pixels {
    type Output = Pixels;
    fn add(self, rhs: Pixels) -> Pixels {
        Pixels(self.0 + rhs.0)
    }
}

impl AddAssign for Pixels {
    fn add_assign(&mut self, rhs: Pixels) {
        self.0 += rhs.0;
    }
}

impl Sub for Pixels {
    type Output = Pixels;
    fn sub(self, rhs: Pixels) -> Pixels {
        Pixels(self.0 - rhs.0)
    }
}

impl SubAssign for Pixels {
    fn sub_assign(&mut self, rhs: Pixels) {
        self.0 -= rhs.0;
    }
}

impl Neg for Pixels {
    type Output = Pixels;
    fn neg(self) -> Pixels {
        Pixels(-self.0)
    }
}

impl Mul<f32> for Pixels {
    type Output = Pixels;
    fn mul(self, rhs: f32) -> Pixels {
        Pixels(self.0 * rhs)
    }
}

impl Div<f32> for Pixels {
    type Output = Pixels;
    fn div(self, rhs: f32) -> Pixels {
        Pixels(self.0 / rhs)
    }
}

/// An integer device pixel unit. Only the platform binding layer operates on
/// these directly.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct DevicePixels(pub i32);

impl DevicePixels {
    /// The zero length.
    pub const ZERO: DevicePixels = DevicePixels(0);

    /// Converts back to logical units at the given scale factor.
    pub fn to_logical(self, scale_factor: f32) -> Pixels {
        Pixels(self.0 as f32 / scale_factor)
    }
}

impl fmt::Debug for DevicePixels {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}dpx", self.0)
    }
}

impl Add for DevicePixels {
    type Output = DevicePixels;
    fn add(self, rhs: DevicePixels) -> DevicePixels {
        DevicePixels(self.0 + rhs.0)
    }
}

impl Sub for DevicePixels {
    type Output = DevicePixels;
    fn sub(self, rhs: DevicePixels) -> DevicePixels {
        DevicePixels(self.0 - rhs.0)
    }
}

/// A 2D point or offset.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

/// Constructs a [`Point`].
pub const fn point<T>(x: T, y: T) -> Point<T> {
    Point { x, y }
}

impl<T: Add<Output = T>> Add for Point<T> {
    type Output = Point<T>;
    fn add(self, rhs: Point<T>) -> Point<T> {
        point(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Sub<Output = T>> Sub for Point<T> {
    type Output = Point<T>;
    fn sub(self, rhs: Point<T>) -> Point<T> {
        point(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Point<DevicePixels> {
    pub fn to_logical(self, scale_factor: f32) -> Point<Pixels> {
        point(
            self.x.to_logical(scale_factor),
            self.y.to_logical(scale_factor),
        )
    }
}

impl Point<Pixels> {
    pub fn to_device(self, scale_factor: f32) -> Point<DevicePixels> {
        point(self.x.to_device(scale_factor), self.y.to_device(scale_factor))
    }
}

/// A 2D extent.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

/// Constructs a [`Size`].
pub const fn size<T>(width: T, height: T) -> Size<T> {
    Size { width, height }
}

impl Size<DevicePixels> {
    pub fn to_logical(self, scale_factor: f32) -> Size<Pixels> {
        size(
            self.width.to_logical(scale_factor),
            self.height.to_logical(scale_factor),
        )
    }
}

impl Size<Pixels> {
    pub fn to_device(self, scale_factor: f32) -> Size<DevicePixels> {
        size(
            self.width.to_device(scale_factor),
            self.height.to_device(scale_factor),
        )
    }
}

/// An axis-aligned rectangle described by origin and size.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct Bounds<T> {
    pub origin: Point<T>,
    pub size: Size<T>,
}

/// Constructs a [`Bounds`] from origin and size components.
pub const fn bounds<T>(x: T, y: T, width: T, height: T) -> Bounds<T> {
    Bounds {
        origin: point(x, y),
        size: size(width, height),
    }
}

impl Bounds<Pixels> {
    /// Converts to device pixels by rounding each edge to the nearest device
    /// pixel. Rounding the edges rather than the size keeps adjacent
    /// rectangles gap-free after conversion.
    pub fn to_device(&self, scale_factor: f32) -> Bounds<DevicePixels> {
        let left = self.origin.x.to_device(scale_factor);
        let top = self.origin.y.to_device(scale_factor);
        let right = (self.origin.x + self.size.width).to_device(scale_factor);
        let bottom = (self.origin.y + self.size.height).to_device(scale_factor);
        Bounds {
            origin: point(left, top),
            size: size(right - left, bottom - top),
        }
    }

    /// Whether the rectangle contains the given point. The right and bottom
    /// edges are exclusive.
    pub fn contains(&self, p: Point<Pixels>) -> bool {
        p.x.0 >= self.origin.x.0
            && p.x.0 < self.origin.x.0 + self.size.width.0
            && p.y.0 >= self.origin.y.0
            && p.y.0 < self.origin.y.0 + self.size.height.0
    }
}

impl Bounds<DevicePixels> {
    /// Converts to logical units at the given scale factor.
    pub fn to_logical(&self, scale_factor: f32) -> Bounds<Pixels> {
        Bounds {
            origin: self.origin.to_logical(scale_factor),
            size: self.size.to_logical(scale_factor),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.width.0 <= 0 || self.size.height.0 <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_to_device_rounds_edges() {
        let b = bounds(px(0.0), px(0.0), px(100.0), px(50.0));
        assert_eq!(b.to_device(2.0), bounds(DevicePixels(0), DevicePixels(0), DevicePixels(200), DevicePixels(100)));

        // A fractional rect rounds each edge independently.
        let b = bounds(px(0.3), px(0.3), px(1.0), px(1.0));
        let d = b.to_device(1.0);
        assert_eq!(d.origin, point(DevicePixels(0), DevicePixels(0)));
        assert_eq!(d.size, size(DevicePixels(1), DevicePixels(1)));
    }

    #[test]
    fn device_round_trip_is_idempotent() {
        let d = bounds(DevicePixels(3), DevicePixels(7), DevicePixels(11), DevicePixels(13));
        let logical = d.to_logical(1.5);
        assert_eq!(logical.to_device(1.5), d);
    }

    #[test]
    fn contains_excludes_far_edges() {
        let b = bounds(px(10.0), px(10.0), px(20.0), px(20.0));
        assert!(b.contains(point(px(10.0), px(10.0))));
        assert!(b.contains(point(px(29.9), px(29.9))));
        assert!(!b.contains(point(px(30.0), px(10.0))));
        assert!(!b.contains(point(px(9.9), px(10.0))));
    }
}
