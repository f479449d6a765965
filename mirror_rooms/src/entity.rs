use super::*;

use core::{f64::consts::TAU, fmt};

/// Identifies an entity within the room that holds it.
///
/// Ids are handed out in increasing order and never reused by the same room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub const OBJECT_RADIUS: Float = 10.0;
pub const EYE_RADIUS: Float = 15.0;
pub const ATTENTION_RADIUS: Float = 12.0;
pub const REFLECTION_POINT_RADIUS: Float = 6.0;

/// How far the pulsing ring of an [`Entity::AttentionMarker`] grows and shrinks
pub const PULSE_AMPLITUDE: Float = 4.0;
/// Radians per second
pub const PULSE_RATE: Float = TAU;

/// What end of a direct ray an entity can be
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Object,
    Eye,
}

/// A light ray going from one entity to another, in the same room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayLink {
    pub source: EntityId,
    pub target: EntityId,
    /// Set on rays rebuilt in virtual rooms
    pub is_virtual: bool,
}

impl RayLink {
    #[inline]
    #[must_use]
    pub const fn new(source: EntityId, target: EntityId) -> Self {
        Self {
            source,
            target,
            is_virtual: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn touches(&self, id: EntityId) -> bool {
        self.source.0 == id.0 || self.target.0 == id.0
    }
}

/// Everything that can be placed in a room.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    ObjectMarker {
        position: Point,
    },
    Eye {
        position: Point,
    },
    /// A pulsing ring drawing attention to a spot. `phase` is in `[0, TAU)`.
    AttentionMarker {
        position: Point,
        phase: Float,
    },
    /// Where a bounced ray meets the mirror on `side`.
    ///
    /// It is placed by the ends of its ray, see [`RealRoom::create_bounced_ray`],
    /// and can't be moved directly.
    ReflectionPoint {
        position: Point,
        side: MirrorSide,
    },
    RayLink(RayLink),
}

impl Entity {
    #[inline]
    #[must_use]
    pub const fn object(position: Point) -> Self {
        Self::ObjectMarker { position }
    }

    #[inline]
    #[must_use]
    pub const fn eye(position: Point) -> Self {
        Self::Eye { position }
    }

    #[inline]
    #[must_use]
    pub const fn attention_marker(position: Point) -> Self {
        Self::AttentionMarker {
            position,
            phase: 0.,
        }
    }

    #[inline]
    #[must_use]
    pub const fn reflection_point(position: Point, side: MirrorSide) -> Self {
        Self::ReflectionPoint { position, side }
    }

    /// `None` for rays, which are placed by their end points
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Option<&Point> {
        match self {
            Self::ObjectMarker { position }
            | Self::Eye { position }
            | Self::AttentionMarker { position, .. }
            | Self::ReflectionPoint { position, .. } => Some(position),
            Self::RayLink(_) => None,
        }
    }

    #[inline]
    pub fn position_mut(&mut self) -> Option<&mut Point> {
        match self {
            Self::ObjectMarker { position }
            | Self::Eye { position }
            | Self::AttentionMarker { position, .. }
            | Self::ReflectionPoint { position, .. } => Some(position),
            Self::RayLink(_) => None,
        }
    }

    /// Whether [`Self::reflected`] returns an image of this entity.
    ///
    /// Rays aren't reflected themselves: the engine rebuilds them between
    /// the images of their end points.
    #[inline]
    #[must_use]
    pub const fn supports_reflection(&self) -> bool {
        !matches!(self, Self::RayLink(_))
    }

    #[inline]
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::ObjectMarker { .. } => Some(Role::Object),
            Self::Eye { .. } => Some(Role::Eye),
            _ => None,
        }
    }

    /// The mirror a reflection point lies on
    #[inline]
    #[must_use]
    pub const fn mirror_side(&self) -> Option<MirrorSide> {
        match self {
            Self::ReflectionPoint { side, .. } => Some(*side),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_ray(&self) -> Option<&RayLink> {
        match self {
            Self::RayLink(ray) => Some(ray),
            _ => None,
        }
    }

    /// The same kind of entity, at the image of this one's position through `axis`.
    ///
    /// Animation state isn't carried over. Reflection points move to the image of their wall.
    #[must_use]
    pub fn reflected(&self, axis: &Axis) -> Option<Self> {
        if !self.supports_reflection() {
            return None;
        }

        let mut image = match self {
            Self::AttentionMarker { position, .. } => Self::attention_marker(*position),
            Self::ReflectionPoint { position, side } => {
                Self::reflection_point(*position, side.reflected(axis))
            }
            other => other.clone(),
        };

        if let Some(p) = image.position_mut() {
            *p = axis.reflect(p);
        }

        Some(image)
    }

    /// The radius of the disc this entity can be picked with, if positioned.
    #[inline]
    #[must_use]
    pub const fn hit_radius(&self) -> Option<Float> {
        match self {
            Self::ObjectMarker { .. } => Some(OBJECT_RADIUS),
            Self::Eye { .. } => Some(EYE_RADIUS),
            Self::AttentionMarker { .. } => Some(ATTENTION_RADIUS),
            Self::ReflectionPoint { .. } => Some(REFLECTION_POINT_RADIUS),
            Self::RayLink(_) => None,
        }
    }

    /// Whether `p` picks this entity.
    ///
    /// Always `false` for rays: see [`RoomContents::hit_test`], which knows where their ends are.
    #[inline]
    #[must_use]
    pub fn hit_test(&self, p: &Point) -> bool {
        self.position()
            .zip(self.hit_radius())
            .is_some_and(|(pos, r)| distance(pos, p) < r)
    }

    /// Moves the animation of an attention marker forward by `dt` seconds
    #[inline]
    pub fn advance(&mut self, dt: Float) {
        if let Self::AttentionMarker { phase, .. } = self {
            *phase = (*phase + dt * PULSE_RATE).rem_euclid(TAU);
        }
    }

    /// The current ring radius of an attention marker
    #[inline]
    #[must_use]
    pub fn pulse_radius(phase: Float) -> Float {
        ATTENTION_RADIUS + PULSE_AMPLITUDE * phase.sin()
    }
}
