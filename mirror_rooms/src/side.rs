use super::*;

use arrayvec::ArrayVec;
use core::fmt;

/// One of the four walls of a room, which may carry a mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MirrorSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl MirrorSide {
    /// All sides, in the order [`detect_edge`] tries them.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Top, Self::Bottom];

    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    /// The wall this one becomes in the image of its room through `axis`
    #[inline]
    #[must_use]
    pub const fn reflected(self, axis: &Axis) -> Self {
        match (axis, self) {
            (Axis::Vertical(_), Self::Left | Self::Right)
            | (Axis::Horizontal(_), Self::Top | Self::Bottom) => self.opposite(),
            _ => self,
        }
    }

    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// `-1` if this wall faces towards decreasing coordinates, `1` otherwise.
    #[inline]
    #[must_use]
    pub const fn outward(self) -> Float {
        match self {
            Self::Left | Self::Top => -1.0,
            Self::Right | Self::Bottom => 1.0,
        }
    }

    /// The line this wall of `rect` lies on, and thus, the reflection axis of its mirror.
    #[inline]
    #[must_use]
    pub fn axis(self, rect: &Rect) -> Axis {
        match self {
            Self::Left => Axis::Vertical(rect.x),
            Self::Right => Axis::Vertical(rect.right()),
            Self::Top => Axis::Horizontal(rect.y),
            Self::Bottom => Axis::Horizontal(rect.bottom()),
        }
    }

    /// The axis through which the virtual room behind this wall of `rect` is imaged.
    ///
    /// It is the wall line, pushed outward by `offset / 2`, which leaves a gap of `offset`
    /// between the wall and the near edge of the image.
    #[inline]
    #[must_use]
    pub fn image_axis(self, rect: &Rect, offset: Float) -> Axis {
        self.axis(rect).shifted(self.outward() * offset / 2.0)
    }

    /// The end points of this wall of `rect`
    #[must_use]
    pub fn wall(self, rect: &Rect) -> (Point, Point) {
        let (l, r, t, b) = (rect.x, rect.right(), rect.y, rect.bottom());
        match self {
            Self::Left => (point(l, t), point(l, b)),
            Self::Right => (point(r, t), point(r, b)),
            Self::Top => (point(l, t), point(r, t)),
            Self::Bottom => (point(l, b), point(r, b)),
        }
    }

    /// Whether the projection of `p` on this wall's line falls within the wall.
    #[inline]
    #[must_use]
    pub fn spans(self, rect: &Rect, p: &Point) -> bool {
        match self {
            Self::Left | Self::Right => (rect.y..=rect.bottom()).contains(&p.y),
            Self::Top | Self::Bottom => (rect.x..=rect.right()).contains(&p.x),
        }
    }
}

impl fmt::Display for MirrorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies `p` as being on one of the walls of `rect`.
///
/// A point is on a wall if it's closer than `margin` to the wall's segment, inside or
/// outside the room. Near corners, more than one wall matches, and the first one in
/// [`MirrorSide::ALL`] is picked.
#[must_use]
pub fn detect_edge(rect: &Rect, p: &Point, margin: Float) -> Option<MirrorSide> {
    MirrorSide::ALL.into_iter().find(|&side| {
        let (a, b) = side.wall(rect);
        distance_to_segment(p, &a, &b) < margin
    })
}

/// The set of mirrored walls of a room.
///
/// Holds each side at most once, and iterates in insertion order.
#[derive(Clone, Debug, Default, Eq)]
pub struct MirrorSet {
    sides: ArrayVec<MirrorSide, 4>,
}

impl MirrorSet {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, side: MirrorSide) -> bool {
        self.sides.contains(&side)
    }

    /// Returns `false`, leaving `self` unchanged, if `side` was already present.
    #[inline]
    pub fn insert(&mut self, side: MirrorSide) -> bool {
        let absent = !self.contains(side);
        if absent {
            // at most 4 distinct sides, never overflows
            self.sides.push(side);
        }
        absent
    }

    /// Returns whether `side` was present.
    #[inline]
    pub fn remove(&mut self, side: MirrorSide) -> bool {
        self.sides
            .iter()
            .position(|&s| s == side)
            .map(|i| self.sides.remove(i))
            .is_some()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = MirrorSide> + '_ {
        self.sides.iter().copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sides.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    /// Every side of `self`, swapped with its opposite
    #[inline]
    #[must_use]
    pub fn opposite(&self) -> Self {
        Self {
            sides: self.sides.iter().map(|s| s.opposite()).collect(),
        }
    }
}

// order doesn't matter
impl PartialEq for MirrorSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|s| other.contains(s))
    }
}

impl FromIterator<MirrorSide> for MirrorSet {
    fn from_iter<T: IntoIterator<Item = MirrorSide>>(iter: T) -> Self {
        let mut set = Self::new();
        iter.into_iter().for_each(|side| {
            set.insert(side);
        });
        set
    }
}

impl<const N: usize> From<[MirrorSide; N]> for MirrorSet {
    fn from(sides: [MirrorSide; N]) -> Self {
        sides.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_edge() {
        let room = Rect::new(0., 0., 100., 100.);

        assert_eq!(detect_edge(&room, &point(5., 50.), 10.), Some(MirrorSide::Left));
        assert_eq!(detect_edge(&room, &point(95., 50.), 10.), Some(MirrorSide::Right));
        assert_eq!(detect_edge(&room, &point(50., 5.), 10.), Some(MirrorSide::Top));
        assert_eq!(detect_edge(&room, &point(50., 95.), 10.), Some(MirrorSide::Bottom));
        assert_eq!(detect_edge(&room, &point(50., 50.), 10.), None);
    }

    #[test]
    fn test_detect_edge_outside_and_corners() {
        let room = Rect::new(0., 0., 100., 100.);

        // just outside the wall still counts
        assert_eq!(detect_edge(&room, &point(-4., 50.), 10.), Some(MirrorSide::Left));
        // but not far along the wall's line
        assert_eq!(detect_edge(&room, &point(2., 150.), 10.), None);
        // left wins over top, right over bottom
        assert_eq!(detect_edge(&room, &point(3., 3.), 10.), Some(MirrorSide::Left));
        assert_eq!(detect_edge(&room, &point(97., 97.), 10.), Some(MirrorSide::Right));
    }

    #[test]
    fn test_detect_edge_measures_distance_to_the_wall_segment() {
        let room = Rect::new(0., 0., 100., 100.);

        // within the margin of both wall lines, but over 13 away from the corner
        assert_eq!(detect_edge(&room, &point(-9., -9.5), 10.), None);
        assert_eq!(detect_edge(&room, &point(-6., -6.), 10.), Some(MirrorSide::Left));
        assert_eq!(detect_edge(&room, &point(50., 109.), 10.), Some(MirrorSide::Bottom));
        assert_eq!(detect_edge(&room, &point(108., 106.), 10.), None);
    }

    #[test]
    fn test_image_axis() {
        let room = Rect::new(0., 0., 100., 50.);

        assert_eq!(MirrorSide::Left.image_axis(&room, 20.), Axis::Vertical(-10.));
        assert_eq!(MirrorSide::Right.image_axis(&room, 20.), Axis::Vertical(110.));
        assert_eq!(MirrorSide::Top.image_axis(&room, 20.), Axis::Horizontal(-10.));
        assert_eq!(MirrorSide::Bottom.image_axis(&room, 20.), Axis::Horizontal(60.));
    }

    #[test]
    fn test_mirror_set() {
        let mut set = MirrorSet::new();

        assert!(set.insert(MirrorSide::Top));
        assert!(set.insert(MirrorSide::Left));
        assert!(!set.insert(MirrorSide::Top));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            [MirrorSide::Top, MirrorSide::Left]
        );

        assert_eq!(
            set.opposite(),
            MirrorSet::from([MirrorSide::Right, MirrorSide::Bottom])
        );

        assert!(set.remove(MirrorSide::Top));
        assert!(!set.remove(MirrorSide::Top));
        assert_eq!(set, MirrorSet::from([MirrorSide::Left]));
    }
}
