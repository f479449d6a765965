use super::*;

use log::{debug, trace};
use std::collections::HashMap;

pub const DEFAULT_MAX_LAYERS: usize = 3;
/// Gap left between a mirrored wall and the near edge of its image
pub const DEFAULT_OFFSET: Float = 20.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineParams {
    /// How many times images are themselves reflected
    pub max_layers: usize,
    pub offset: Float,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            max_layers: DEFAULT_MAX_LAYERS,
            offset: DEFAULT_OFFSET,
        }
    }
}

/// Derives the virtual rooms seen through the mirrors of a real room.
///
/// The engine holds no state between calls, every call recomputes the whole
/// tree of images from the current contents of the room.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReflectionEngine {
    params: EngineParams,
}

impl ReflectionEngine {
    #[inline]
    #[must_use]
    pub const fn new(params: EngineParams) -> Self {
        Self { params }
    }

    #[inline]
    #[must_use]
    pub const fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Returns the virtual rooms behind the mirrors of `room`, layer after layer.
    ///
    /// Layer `1` holds the images of `room` through each of its mirrors, layer `k + 1`
    /// the images of layer `k` rooms through each of theirs, up to `max_layers`.
    ///
    /// A virtual room is never reflected back through the wall facing the room it is
    /// the image of, since that would only reproduce its parent.
    ///
    /// An image overlapping `room`, or any of `real_rooms`, is dropped, and so is
    /// the whole branch it would have started. This keeps images from covering real
    /// rooms, and stops two facing mirrors from imaging back onto the room, but it
    /// may hide legitimate deep reflections when rooms are packed closely.
    ///
    /// The result has at most `m + m^2 + ... + m^max_layers` rooms, `m` being the
    /// number of mirrors of `room`.
    #[must_use]
    pub fn reflect_room(&self, room: &RealRoom, real_rooms: &[Rect]) -> Vec<VirtualRoom> {
        let mut images: Vec<VirtualRoom> = Vec::new();
        let mut layer: Vec<Option<usize>> = vec![None];

        for depth in 1..=self.params.max_layers {
            let mut next = Vec::new();

            for &parent in &layer {
                let (base, back) = match parent {
                    None => (room.contents(), None),
                    Some(i) => {
                        let image = &images[i];
                        (image.contents(), Some(image.origin().side.opposite()))
                    }
                };

                let children: Vec<_> = base
                    .mirrors()
                    .iter()
                    // the wall facing the parent would just image it again
                    .filter(|&side| back != Some(side))
                    .filter_map(|side| {
                        self.image_of(base, side, room.rect(), real_rooms)
                            .map(|contents| {
                                let origin = ImageOrigin {
                                    side,
                                    layer: depth,
                                    parent,
                                };
                                VirtualRoom::new(contents, origin)
                            })
                    })
                    .collect();

                for child in children {
                    next.push(Some(images.len()));
                    images.push(child);
                }
            }

            if next.is_empty() {
                break;
            }
            layer = next;
        }

        debug!(
            "{} virtual rooms for the room at {:?}",
            images.len(),
            room.rect()
        );

        images
    }

    /// The image of `base` through its mirror on `side`, `None` if it overlaps a real room.
    fn image_of(
        &self,
        base: &RoomContents,
        side: MirrorSide,
        origin: &Rect,
        real_rooms: &[Rect],
    ) -> Option<RoomContents> {
        let axis = side.image_axis(base.rect(), self.params.offset);
        let rect = axis.reflect_rect(base.rect());

        if let Some(real) = core::iter::once(origin)
            .chain(real_rooms)
            .find(|real| real.overlaps(&rect))
        {
            trace!("image {rect:?} through the {side} mirror covers the real room {real:?}");
            return None;
        }

        let mut image = RoomContents::new(rect, base.mirrors().opposite());

        // base id -> image id, only valid for this image
        let mut provenance = HashMap::new();

        for (id, entity) in base.entities() {
            if let Some(reflected) = entity.reflected(&axis) {
                provenance.insert(id, image.push(reflected));
            }
        }

        for (id, ray) in base.rays() {
            match (provenance.get(&ray.source), provenance.get(&ray.target)) {
                (Some(&source), Some(&target)) => {
                    image.push(Entity::RayLink(RayLink {
                        source,
                        target,
                        is_virtual: true,
                    }));
                }
                _ => trace!("ray {id} has an end without an image, skipped"),
            }
        }

        Some(image)
    }
}

/// Returns the virtual rooms behind the mirrors of `room`, with the default offset,
/// up to `max_layers` (see [`ReflectionEngine::reflect_room`]).
///
/// Only `room` itself is guarded against overlaps, see [`Scene::frame`] for
/// a version aware of all real rooms.
#[inline]
#[must_use]
pub fn reflect_room(room: &RealRoom, max_layers: usize) -> Vec<VirtualRoom> {
    ReflectionEngine::new(EngineParams {
        max_layers,
        ..Default::default()
    })
    .reflect_room(room, &[])
}
