// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2D render transforms.
//!
//! A [`RenderTransform`] is a translation plus a rotation about the center of
//! the node it is applied to. Render transforms do not take part in layout:
//! they never change a node's desired size or arranged rectangle, only where
//! its content (and everything beneath it) ends up.

use core::f64::consts::PI;

use kurbo::{Affine, Point, Size, Vec2};

/// Translation plus rotation about the node center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderTransform {
    /// Translation in the parent's content space.
    pub translate: Vec2,
    /// Clockwise rotation in degrees, about the node center.
    pub rotation_degrees: f64,
}

impl RenderTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        rotation_degrees: 0.0,
    };

    /// Creates a transform from a translation and a rotation in degrees.
    #[must_use]
    pub const fn new(translate_x: f64, translate_y: f64, rotation_degrees: f64) -> Self {
        Self {
            translate: Vec2::new(translate_x, translate_y),
            rotation_degrees,
        }
    }

    /// Returns `true` if this transform leaves every point in place.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.translate == Vec2::ZERO && self.rotation_degrees == 0.0
    }

    /// Builds the affine map for a node of the given size.
    ///
    /// The rotation is applied about the node center, then the translation.
    #[must_use]
    pub fn to_affine(&self, size: Size) -> Affine {
        if self.is_identity() {
            return Affine::IDENTITY;
        }
        let center = Point::new(size.width / 2.0, size.height / 2.0);
        let rotation = Affine::rotate_about(self.rotation_degrees * PI / 180.0, center);
        Affine::translate(self.translate) * rotation
    }
}

impl Default for RenderTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn identity_is_identity_affine() {
        assert!(RenderTransform::IDENTITY.is_identity());
        assert_eq!(
            RenderTransform::IDENTITY.to_affine(Size::new(10.0, 10.0)),
            Affine::IDENTITY
        );
    }

    #[test]
    fn translation_only() {
        let xf = RenderTransform::new(5.0, -3.0, 0.0).to_affine(Size::new(10.0, 10.0));
        assert!(approx(xf * Point::ORIGIN, Point::new(5.0, -3.0)));
    }

    #[test]
    fn rotation_keeps_center_fixed() {
        let size = Size::new(40.0, 20.0);
        let xf = RenderTransform::new(0.0, 0.0, 90.0).to_affine(size);
        let center = Point::new(20.0, 10.0);
        assert!(approx(xf * center, center));
        // The top-left corner swings around the center.
        assert!(approx(xf * Point::ORIGIN, Point::new(30.0, -10.0)));
    }
}
