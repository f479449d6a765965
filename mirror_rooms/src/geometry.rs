use super::*;

/// Image of the abscissa `x` through the vertical line at `axis_x`
#[inline]
#[must_use]
pub fn reflect_across_vertical(x: Float, axis_x: Float) -> Float {
    2.0 * axis_x - x
}

/// Image of the ordinate `y` through the horizontal line at `axis_y`
#[inline]
#[must_use]
pub fn reflect_across_horizontal(y: Float, axis_y: Float) -> Float {
    2.0 * axis_y - y
}

#[inline]
#[must_use]
pub fn distance(p: &Point, q: &Point) -> Float {
    (p - q).norm()
}

/// The distance from `p` to the closest point of the segment `[a, b]`
#[must_use]
pub fn distance_to_segment(p: &Point, a: &Point, b: &Point) -> Float {
    let ab = b - a;
    let len_sq = ab.norm_squared();

    if len_sq == 0.0 {
        return distance(p, a);
    }

    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    distance(p, &(a + ab * t))
}

/// Whether `p` lies (approximately) on the segment `[a, b]`.
///
/// By the triangle inequality, `dist(p, a) + dist(p, b) >= dist(a, b)`, with
/// equality exactly on the segment, `tolerance` bounds the excess.
#[inline]
#[must_use]
pub fn point_near_segment(p: &Point, a: &Point, b: &Point, tolerance: Float) -> bool {
    (distance(p, a) + distance(p, b) - distance(a, b)).abs() < tolerance
}

/// An axis-aligned line in the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Axis {
    /// The line `x = c`
    Vertical(Float),
    /// The line `y = c`
    Horizontal(Float),
}

impl Axis {
    /// The fixed coordinate of this line
    #[inline]
    #[must_use]
    pub const fn coordinate(&self) -> Float {
        match *self {
            Self::Vertical(c) | Self::Horizontal(c) => c,
        }
    }

    /// This line, translated by `delta` along its normal
    #[inline]
    #[must_use]
    pub fn shifted(self, delta: Float) -> Self {
        match self {
            Self::Vertical(x) => Self::Vertical(x + delta),
            Self::Horizontal(y) => Self::Horizontal(y + delta),
        }
    }

    /// Orthogonal symmetry of `p` w.r.t. this line
    #[inline]
    #[must_use]
    pub fn reflect(&self, p: &Point) -> Point {
        match *self {
            Self::Vertical(x) => point(reflect_across_vertical(p.x, x), p.y),
            Self::Horizontal(y) => point(p.x, reflect_across_horizontal(p.y, y)),
        }
    }

    /// Orthogonal symmetry of `rect` w.r.t. this line.
    ///
    /// The far edge of `rect` becomes the near edge of the image, so the
    /// result is again stored with a positive width and height.
    #[inline]
    #[must_use]
    pub fn reflect_rect(&self, rect: &Rect) -> Rect {
        match *self {
            Self::Vertical(x) => Rect {
                x: reflect_across_vertical(rect.right(), x),
                ..*rect
            },
            Self::Horizontal(y) => Rect {
                y: reflect_across_horizontal(rect.bottom(), y),
                ..*rect
            },
        }
    }

    /// Returns `t` such that `start + t * (end - start)` lies on this line.
    ///
    /// Returns `None` if the segment is parallel to it.
    #[inline]
    #[must_use]
    pub fn crossing(&self, start: &Point, end: &Point) -> Option<Float> {
        let (s, e) = match self {
            Self::Vertical(_) => (start.x, end.x),
            Self::Horizontal(_) => (start.y, end.y),
        };

        let d = e - s;
        (d.abs() > Float::EPSILON).then(|| (self.coordinate() - s) / d)
    }

    /// Moves `p` onto this line along its normal
    #[inline]
    #[must_use]
    pub fn snap(&self, mut p: Point) -> Point {
        match *self {
            Self::Vertical(x) => p.x = x,
            Self::Horizontal(y) => p.y = y,
        }
        p
    }
}

/// An axis-aligned rectangle, `(x, y)` being its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: Float,
    pub y: Float,
    pub w: Float,
    pub h: Float,
}

impl Rect {
    #[inline]
    #[must_use]
    pub const fn new(x: Float, y: Float, w: Float, h: Float) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    #[must_use]
    pub fn right(&self) -> Float {
        self.x + self.w
    }

    #[inline]
    #[must_use]
    pub fn bottom(&self) -> Float {
        self.y + self.h
    }

    /// Whether `p` is inside this rectangle, or on its border
    #[inline]
    #[must_use]
    pub fn contains(&self, p: &Point) -> bool {
        (self.x..=self.right()).contains(&p.x) && (self.y..=self.bottom()).contains(&p.y)
    }

    /// Whether the interiors of `self` and `other` intersect.
    ///
    /// Rectangles sharing only an edge or a corner do not overlap.
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Intersection of the segment `[start, end]` with the wall line of `side`.
///
/// Returns `None` if the segment doesn't reach that line, i. e. the
/// crossing parameter falls outside `[0, 1]`, or if it runs parallel to it.
#[inline]
#[must_use]
pub fn intersect_segment_with_axis(
    start: &Point,
    end: &Point,
    side: MirrorSide,
    rect: &Rect,
) -> Option<Point> {
    let axis = side.axis(rect);

    axis.crossing(start, end)
        .filter(|t| (0.0..=1.0).contains(t))
        // snapping removes the roundoff across the axis
        .map(|t| axis.snap(start + (end - start) * t))
}

/// Where light leaving `object` must hit the `side` mirror of `rect` to reach `eye`.
///
/// Image method: the reflected path `object -> P -> eye` is as long as the
/// straight segment from `object` to the image of `eye` through the mirror,
/// and `P` is where that segment crosses the mirror line.
///
/// Returns `None` if that crossing isn't on the segment, or falls outside the wall.
#[must_use]
pub fn bounce_point(object: &Point, eye: &Point, side: MirrorSide, rect: &Rect) -> Option<Point> {
    let virtual_eye = side.axis(rect).reflect(eye);

    intersect_segment_with_axis(object, &virtual_eye, side, rect).filter(|p| side.spans(rect, p))
}
