//! Geometric primitives shared by every extractor.
//!
//! All coordinates use a top-left origin with y increasing downward, matching
//! the rendered-page coordinate space the layout detector works in. The one
//! exception is the raw PDF space handled inside the image extractor, which
//! flips to this convention before anything else sees the box.

use crate::error::{LaminaError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Two boxes whose vertical overlap ratio exceeds this share a visual line
/// and are ordered left-to-right; otherwise top-to-bottom wins.
const Y_OVERLAP_THRESHOLD: f32 = 0.40;

/// Axis-aligned rectangle, top-left origin, y down.
///
/// Immutable value type. Width and height are never negative; construction
/// through [`BoundingBox::new`] enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Create a box, failing with a `Validation` error on negative dimensions.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Result<Self> {
        if width < 0.0 || height < 0.0 {
            return Err(LaminaError::validation(format!(
                "Dimensions cannot be negative: w={width}, h={height}"
            )));
        }
        Ok(Self { x, y, width, height })
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn centroid(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Edge-inclusive variant of [`intersects`](Self::intersects). A
    /// zero-thickness box lying exactly on this box's border touches it even
    /// though the open-interval test rejects it; ruling lines drawn on a
    /// table's outer frame need this.
    pub fn touches(&self, other: &BoundingBox) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// Area of the overlap between two boxes, 0 when disjoint.
    pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let w = (self.right().min(other.right()) - self.x.max(other.x)).max(0.0);
        let h = (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0.0);
        w * h
    }

    /// Smallest box enclosing both inputs.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        BoundingBox {
            x,
            y,
            width: max_x - x,
            height: max_y - y,
        }
    }

    /// Signed horizontal distance from this box's right edge to `other`'s
    /// left edge, clamped to 0 when the boxes already overlap on that axis.
    pub fn horizontal_gap(&self, other: &BoundingBox) -> f32 {
        (other.x - self.right()).max(0.0)
    }

    /// Vertical counterpart of [`horizontal_gap`](Self::horizontal_gap).
    pub fn vertical_gap(&self, other: &BoundingBox) -> f32 {
        (other.y - self.bottom()).max(0.0)
    }

    /// Overlap height divided by the smaller of the two heights.
    ///
    /// Returns 0 when either height is not positive.
    pub fn vertical_overlap_ratio(&self, other: &BoundingBox) -> f32 {
        let max_top = self.y.max(other.y);
        let min_bottom = self.bottom().min(other.bottom());

        let overlap_height = (min_bottom - max_top).max(0.0);
        let min_height = self.height.min(other.height);

        if min_height <= 0.0 {
            return 0.0;
        }
        overlap_height / min_height
    }

    /// The single source of truth for element ordering across all content
    /// types: boxes sharing a visual line (overlap ratio above 0.40) order by
    /// ascending x, otherwise by ascending y.
    pub fn compare_reading_order(a: &BoundingBox, b: &BoundingBox) -> Ordering {
        let on_same_line = a.vertical_overlap_ratio(b) > Y_OVERLAP_THRESHOLD;

        if on_same_line {
            total_cmp(a.x, b.x)
        } else {
            total_cmp(a.y, b.y)
        }
    }
}

fn total_cmp(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// 2x3 affine transform in the PDF row-vector convention:
/// `[x' y' 1] = [x y 1] * M` with `M = [a b 0; c d 0; e f 1]`.
///
/// Used by the image extractor's graphics-state stack to recover the
/// displayed size and origin of drawn objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// `self * other` in the row-vector convention, so applying the result is
    /// equivalent to applying `self` first and `other` second. A content
    /// stream `cm` operator therefore computes `ctm = m.multiply(&ctm)`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Magnitude of the transformed x basis vector: the displayed width of a
    /// unit square drawn under this matrix.
    pub fn scaling_x(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Magnitude of the transformed y basis vector.
    pub fn scaling_y(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    pub fn translate_x(&self) -> f32 {
        self.e
    }

    pub fn translate_y(&self) -> f32 {
        self.f
    }
}
