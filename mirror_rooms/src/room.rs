use super::*;

use core::ops::Deref;
use log::{debug, warn};

/// The geometry and contents common to real and virtual rooms.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomContents {
    rect: Rect,
    mirrors: MirrorSet,
    /// Sorted by id, ids only grow
    components: Vec<(EntityId, Entity)>,
    next_id: u32,
}

impl RoomContents {
    #[inline]
    #[must_use]
    pub(crate) fn new(rect: Rect, mirrors: MirrorSet) -> Self {
        Self {
            rect,
            mirrors,
            components: Vec::new(),
            next_id: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn rect(&self) -> &Rect {
        &self.rect
    }

    #[inline]
    #[must_use]
    pub const fn mirrors(&self) -> &MirrorSet {
        &self.mirrors
    }

    /// All entities, in the order they were added
    #[inline]
    pub fn entities(&self) -> impl DoubleEndedIterator<Item = (EntityId, &Entity)> + '_ {
        self.components.iter().map(|(id, e)| (*id, e))
    }

    #[inline]
    pub fn rays(&self) -> impl Iterator<Item = (EntityId, &RayLink)> + '_ {
        self.entities()
            .filter_map(|(id, e)| e.as_ray().map(|ray| (id, ray)))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn slot(&self, id: EntityId) -> Option<usize> {
        self.components.binary_search_by_key(&id, |(id, _)| *id).ok()
    }

    #[inline]
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.slot(id).map(|i| &self.components[i].1)
    }

    #[inline]
    #[must_use]
    pub fn position_of(&self, id: EntityId) -> Option<&Point> {
        self.entity(id).and_then(Entity::position)
    }

    /// The positions of both ends of `ray`.
    ///
    /// Returns `None`, and logs it, if any of them isn't a positioned entity of this room,
    /// which construction rules out.
    #[must_use]
    pub fn ray_endpoints(&self, ray: &RayLink) -> Option<(Point, Point)> {
        let ends = self
            .position_of(ray.source)
            .zip(self.position_of(ray.target))
            .map(|(s, t)| (*s, *t));

        if ends.is_none() {
            warn!(
                "ray {} -> {} references an entity outside its room",
                ray.source, ray.target
            );
        }
        ends
    }

    /// The topmost (last added) entity picked by `p`.
    ///
    /// Rays are picked within `tolerance` of their segment, but only if no positioned
    /// entity is, since they always touch one at both ends.
    #[must_use]
    pub fn hit_test(&self, p: &Point, tolerance: Float) -> Option<EntityId> {
        let on_ray = |ray: &RayLink| {
            self.ray_endpoints(ray)
                .is_some_and(|(a, b)| point_near_segment(p, &a, &b, tolerance))
        };

        self.entities()
            .rev()
            .find(|(_, e)| e.hit_test(p))
            .or_else(|| {
                self.entities()
                    .rev()
                    .find(|(_, e)| e.as_ray().is_some_and(|ray| on_ray(ray)))
            })
            .map(|(id, _)| id)
    }

    /// The first entity with the given role, in insertion order
    #[must_use]
    pub fn first_with_role(&self, role: Role) -> Option<EntityId> {
        self.entities()
            .find(|(_, e)| e.role() == Some(role))
            .map(|(id, _)| id)
    }

    pub(crate) fn push(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.components.push((id, entity));
        id
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slot(id).map(|i| &mut self.components[i].1)
    }
}

/// The pieces of a ray bounced off a mirror, see [`RealRoom::create_bounced_ray`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BouncedRay {
    /// The [`Entity::ReflectionPoint`] on the mirror
    pub point: EntityId,
    /// object -> point
    pub incoming: EntityId,
    /// point -> eye
    pub outgoing: EntityId,
}

/// A room the user edits. Its contents are what virtual rooms are derived from.
///
/// Every fallible operation leaves the room untouched when it fails.
#[derive(Clone, Debug, PartialEq)]
pub struct RealRoom {
    contents: RoomContents,
}

impl Deref for RealRoom {
    type Target = RoomContents;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.contents
    }
}

impl RealRoom {
    #[inline]
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self {
            contents: RoomContents::new(rect, MirrorSet::new()),
        }
    }

    #[inline]
    #[must_use]
    pub const fn contents(&self) -> &RoomContents {
        &self.contents
    }

    #[inline]
    pub fn add_object(&mut self, position: Point) -> EntityId {
        self.contents.push(Entity::object(position))
    }

    #[inline]
    pub fn add_eye(&mut self, position: Point) -> EntityId {
        self.contents.push(Entity::eye(position))
    }

    #[inline]
    pub fn add_attention_marker(&mut self, position: Point) -> EntityId {
        self.contents.push(Entity::attention_marker(position))
    }

    /// # Errors
    ///
    /// [`SceneError::EdgeAlreadyMirrored`] if `side` already has a mirror.
    pub fn add_mirror(&mut self, side: MirrorSide) -> Result<()> {
        if self.contents.mirrors.insert(side) {
            debug!("mirror added on the {side} edge of {:?}", self.rect());
            Ok(())
        } else {
            Err(SceneError::EdgeAlreadyMirrored(side))
        }
    }

    /// Returns whether there was a mirror on `side`.
    ///
    /// Rays bounced off that mirror are removed with it.
    pub fn remove_mirror(&mut self, side: MirrorSide) -> bool {
        if !self.contents.mirrors.remove(side) {
            return false;
        }

        let points: Vec<_> = self
            .entities()
            .filter(|(_, e)| e.mirror_side() == Some(side))
            .map(|(id, _)| id)
            .collect();

        for point in points {
            let _ = self.detach(point);
        }
        true
    }

    /// Moves a positioned entity. Rays follow their ends, and the reflection points of
    /// bounced rays move along their mirror to keep the bounce a reflection.
    ///
    /// A bounced ray whose ends can no longer see each other through its mirror is removed.
    ///
    /// # Errors
    ///
    /// - [`SceneError::PinnedToMirror`] if `id` is a reflection point.
    /// - [`SceneError::UnknownEntity`] if `id` isn't a positioned entity of this room.
    pub fn move_entity(&mut self, id: EntityId, to: Point) -> Result<()> {
        let entity = self
            .contents
            .entity_mut(id)
            .ok_or(SceneError::UnknownEntity(id))?;

        if entity.mirror_side().is_some() {
            return Err(SceneError::PinnedToMirror(id));
        }

        let p = entity
            .position_mut()
            .ok_or(SceneError::UnknownEntity(id))?;
        *p = to;

        self.follow_bounces(id);
        Ok(())
    }

    /// The object and eye at the ends of the bounced ray through the reflection point `point`
    fn bounce_ends(&self, point: EntityId) -> Option<(EntityId, EntityId)> {
        let object = self
            .rays()
            .find(|(_, ray)| ray.target == point)
            .map(|(_, ray)| ray.source)?;
        let eye = self
            .rays()
            .find(|(_, ray)| ray.source == point)
            .map(|(_, ray)| ray.target)?;
        Some((object, eye))
    }

    /// Puts back on their mirror the bounced rays ending at `moved`.
    fn follow_bounces(&mut self, moved: EntityId) {
        let bounces: Vec<_> = self
            .entities()
            .filter_map(|(point, e)| e.mirror_side().map(|side| (point, side)))
            .filter_map(|(point, side)| {
                let (object, eye) = self.bounce_ends(point)?;
                (object == moved || eye == moved).then_some((point, object, eye, side))
            })
            .collect();

        for (point, object, eye, side) in bounces {
            let bounce = self
                .position_of(object)
                .zip(self.position_of(eye))
                .and_then(|(o, e)| bounce_point(o, e, side, self.rect()));

            match bounce {
                Some(p) => {
                    if let Some(pos) = self
                        .contents
                        .entity_mut(point)
                        .and_then(Entity::position_mut)
                    {
                        *pos = p;
                    }
                }
                None => {
                    debug!("ray {object} -> {eye} no longer bounces off the {side} mirror");
                    let _ = self.detach(point);
                }
            }
        }
    }

    /// Removes an entity, along with every ray attached to it.
    ///
    /// A bounced ray losing one of its ends is removed entirely, reflection point included.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] if `id` isn't in this room.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity> {
        let removed = self.detach(id)?;

        let orphans: Vec<_> = self
            .entities()
            .filter(|&(point, e)| e.mirror_side().is_some() && self.bounce_ends(point).is_none())
            .map(|(point, _)| point)
            .collect();

        for point in orphans {
            let _ = self.detach(point);
        }

        Ok(removed)
    }

    /// Removes an entity and the rays attached to it
    fn detach(&mut self, id: EntityId) -> Result<Entity> {
        let i = self.contents.slot(id).ok_or(SceneError::UnknownEntity(id))?;
        let (_, removed) = self.contents.components.remove(i);

        let before = self.len();
        self.contents
            .components
            .retain(|(_, e)| !e.as_ray().is_some_and(|ray| ray.touches(id)));

        debug!(
            "removed entity {id} and {} attached rays",
            before - self.len()
        );
        Ok(removed)
    }

    /// Adds a direct ray between an object and an eye (in any order).
    ///
    /// # Errors
    ///
    /// - [`SceneError::UnknownEntity`] if either isn't in this room.
    /// - [`SceneError::InvalidLink`] if they aren't one object and one eye.
    pub fn create_ray(&mut self, source: EntityId, target: EntityId) -> Result<EntityId> {
        let role = |id| {
            self.entity(id)
                .map(Entity::role)
                .ok_or(SceneError::UnknownEntity(id))
        };

        match (role(source)?, role(target)?) {
            (Some(Role::Object), Some(Role::Eye)) | (Some(Role::Eye), Some(Role::Object)) => {
                Ok(self
                    .contents
                    .push(Entity::RayLink(RayLink::new(source, target))))
            }
            _ => Err(SceneError::InvalidLink),
        }
    }

    /// Adds a ray going from `object` to `eye` by bouncing off the mirror on `side`.
    ///
    /// The bounce point is found with [`bounce_point`], and marked with a new
    /// [`Entity::ReflectionPoint`], linked to `object` and `eye` with two rays.
    ///
    /// # Errors
    ///
    /// - [`SceneError::UnknownEntity`] if either isn't in this room.
    /// - [`SceneError::InvalidLink`] if `object` isn't an object or `eye` isn't an eye.
    /// - [`SceneError::EdgeNotMirrored`] if there is no mirror on `side`.
    /// - [`SceneError::NoReflectionPath`] if no path bouncing off that wall joins them.
    pub fn create_bounced_ray(
        &mut self,
        object: EntityId,
        eye: EntityId,
        side: MirrorSide,
    ) -> Result<BouncedRay> {
        let get = |id| self.entity(id).ok_or(SceneError::UnknownEntity(id));
        let (o, e) = (get(object)?, get(eye)?);

        let (Some(Role::Object), Some(Role::Eye)) = (o.role(), e.role()) else {
            return Err(SceneError::InvalidLink);
        };

        if !self.mirrors().contains(side) {
            return Err(SceneError::EdgeNotMirrored(side));
        }

        // positioned, since they have a role
        let (o, e) = (o.position(), e.position());
        let p = o
            .zip(e)
            .and_then(|(o, e)| bounce_point(o, e, side, self.rect()))
            .ok_or(SceneError::NoReflectionPath(side))?;

        let point = self.contents.push(Entity::reflection_point(p, side));
        let incoming = self
            .contents
            .push(Entity::RayLink(RayLink::new(object, point)));
        let outgoing = self.contents.push(Entity::RayLink(RayLink::new(point, eye)));

        debug!("ray {object} -> {eye} bounced off the {side} mirror at {p:?}");

        Ok(BouncedRay {
            point,
            incoming,
            outgoing,
        })
    }

    /// Links the first object of this room to its first eye.
    ///
    /// # Errors
    ///
    /// [`SceneError::MissingObject`] or [`SceneError::MissingEye`] if there is none.
    pub fn link_first_object_to_eye(&mut self) -> Result<EntityId> {
        let (object, eye) = self.first_pair()?;
        self.create_ray(object, eye)
    }

    /// Bounces a ray from the first object of this room to its first eye, off `side`.
    ///
    /// # Errors
    ///
    /// Those of [`Self::create_bounced_ray`], and [`SceneError::MissingObject`] or
    /// [`SceneError::MissingEye`] if there is none.
    pub fn bounce_first_object_to_eye(&mut self, side: MirrorSide) -> Result<BouncedRay> {
        let (object, eye) = self.first_pair()?;
        self.create_bounced_ray(object, eye, side)
    }

    fn first_pair(&self) -> Result<(EntityId, EntityId)> {
        let object = self
            .first_with_role(Role::Object)
            .ok_or(SceneError::MissingObject)?;
        let eye = self
            .first_with_role(Role::Eye)
            .ok_or(SceneError::MissingEye)?;
        Ok((object, eye))
    }

    /// Moves the animations of this room forward by `dt` seconds.
    pub fn advance(&mut self, dt: Float) {
        self.contents
            .components
            .iter_mut()
            .for_each(|(_, e)| e.advance(dt));
    }
}

/// Where a virtual room comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageOrigin {
    /// The mirrored wall of the base room this room is the image through
    pub side: MirrorSide,
    /// `1` for images of the real room, `2` for images of those, etc...
    pub layer: usize,
    /// The index of the base room in the list returned by the engine,
    /// `None` if the base room is the real room.
    pub parent: Option<usize>,
}

/// The image of a room through one of its mirrors.
///
/// Built only by the [`ReflectionEngine`], and immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct VirtualRoom {
    contents: RoomContents,
    origin: ImageOrigin,
}

impl Deref for VirtualRoom {
    type Target = RoomContents;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.contents
    }
}

impl VirtualRoom {
    #[inline]
    #[must_use]
    pub(crate) fn new(contents: RoomContents, origin: ImageOrigin) -> Self {
        Self { contents, origin }
    }

    #[inline]
    #[must_use]
    pub const fn contents(&self) -> &RoomContents {
        &self.contents
    }

    #[inline]
    #[must_use]
    pub const fn origin(&self) -> &ImageOrigin {
        &self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_room() -> (RealRoom, EntityId, EntityId) {
        let mut room = RealRoom::new(Rect::new(0., 0., 200., 200.));
        room.add_mirror(MirrorSide::Right).unwrap();
        let object = room.add_object(point(50., 100.));
        let eye = room.add_eye(point(150., 50.));
        (room, object, eye)
    }

    #[test]
    fn test_add_mirror_twice() {
        let (mut room, ..) = sample_room();

        assert_eq!(
            room.add_mirror(MirrorSide::Right),
            Err(SceneError::EdgeAlreadyMirrored(MirrorSide::Right))
        );
        assert_eq!(room.mirrors().len(), 1);

        assert!(room.remove_mirror(MirrorSide::Right));
        assert!(!room.remove_mirror(MirrorSide::Right));
        assert!(room.mirrors().is_empty());
    }

    #[test]
    fn test_create_ray() {
        let (mut room, object, eye) = sample_room();

        let ray = room.create_ray(eye, object).unwrap();
        assert_eq!(
            room.entity(ray),
            Some(&Entity::RayLink(RayLink::new(eye, object)))
        );
        assert_eq!(
            room.ray_endpoints(room.entity(ray).unwrap().as_ray().unwrap()),
            Some((point(150., 50.), point(50., 100.)))
        );
    }

    #[test]
    fn test_create_ray_rejects_same_role() {
        let (mut room, object, eye) = sample_room();
        let other = room.add_object(point(10., 10.));
        let marker = room.add_attention_marker(point(20., 20.));
        let len = room.len();

        assert_eq!(room.create_ray(object, other), Err(SceneError::InvalidLink));
        assert_eq!(room.create_ray(marker, eye), Err(SceneError::InvalidLink));
        assert_eq!(
            room.create_ray(object, EntityId(99)),
            Err(SceneError::UnknownEntity(EntityId(99)))
        );
        assert_eq!(room.len(), len);
    }

    #[test]
    fn test_bounced_ray() {
        let (mut room, object, eye) = sample_room();

        let bounce = room
            .create_bounced_ray(object, eye, MirrorSide::Right)
            .unwrap();

        assert_eq!(room.position_of(bounce.point), Some(&point(200., 62.5)));

        let incoming = room.entity(bounce.incoming).unwrap().as_ray().unwrap();
        let outgoing = room.entity(bounce.outgoing).unwrap().as_ray().unwrap();

        assert_eq!(
            room.ray_endpoints(incoming),
            Some((point(50., 100.), point(200., 62.5)))
        );
        assert_eq!(
            room.ray_endpoints(outgoing),
            Some((point(200., 62.5), point(150., 50.)))
        );
    }

    #[test]
    fn test_bounced_ray_failures_leave_room_untouched() {
        let (mut room, object, eye) = sample_room();
        let before = room.clone();

        assert_eq!(
            room.create_bounced_ray(object, eye, MirrorSide::Left),
            Err(SceneError::EdgeNotMirrored(MirrorSide::Left))
        );
        assert_eq!(
            room.create_bounced_ray(eye, object, MirrorSide::Right),
            Err(SceneError::InvalidLink)
        );

        // both beyond the bottom of the wall
        let far_object = room.add_object(point(50., 400.));
        let far_eye = room.add_eye(point(150., 300.));
        let with_far = room.clone();
        assert_eq!(
            room.create_bounced_ray(far_object, far_eye, MirrorSide::Right),
            Err(SceneError::NoReflectionPath(MirrorSide::Right))
        );
        assert_eq!(room, with_far);

        room.remove(far_object).unwrap();
        room.remove(far_eye).unwrap();
        assert_eq!(room.entities().count(), before.entities().count());
    }

    #[test]
    fn test_first_pair_flows() {
        let mut room = RealRoom::new(Rect::new(0., 0., 200., 200.));
        room.add_mirror(MirrorSide::Top).unwrap();

        assert_eq!(
            room.link_first_object_to_eye(),
            Err(SceneError::MissingObject)
        );
        room.add_object(point(50., 100.));
        assert_eq!(
            room.bounce_first_object_to_eye(MirrorSide::Top),
            Err(SceneError::MissingEye)
        );
        room.add_eye(point(150., 100.));

        assert!(room.link_first_object_to_eye().is_ok());
        let bounce = room.bounce_first_object_to_eye(MirrorSide::Top).unwrap();
        assert_eq!(room.position_of(bounce.point), Some(&point(100., 0.)));
    }

    #[test]
    fn test_remove_drops_attached_rays() {
        let (mut room, object, eye) = sample_room();
        room.create_ray(object, eye).unwrap();
        let bounce = room
            .create_bounced_ray(object, eye, MirrorSide::Right)
            .unwrap();
        let marker = room.add_attention_marker(point(1., 1.));

        assert_eq!(room.remove(eye), Ok(Entity::eye(point(150., 50.))));

        // the direct ray, and the whole bounced one, are gone
        assert_eq!(room.rays().count(), 0);
        assert_eq!(room.entity(bounce.point), None);
        assert!(room.entity(object).is_some());
        assert!(room.entity(marker).is_some());
        assert_eq!(room.remove(eye), Err(SceneError::UnknownEntity(eye)));
    }

    #[test]
    fn test_remove_reflection_point_keeps_ends() {
        let (mut room, object, eye) = sample_room();
        let bounce = room
            .create_bounced_ray(object, eye, MirrorSide::Right)
            .unwrap();

        assert!(room.remove(bounce.point).is_ok());
        assert_eq!(room.rays().count(), 0);
        assert_eq!(room.len(), 2);
    }

    #[test]
    fn test_remove_mirror_drops_its_bounced_rays() {
        let (mut room, object, eye) = sample_room();
        room.add_mirror(MirrorSide::Top).unwrap();
        let direct = room.create_ray(object, eye).unwrap();
        room.create_bounced_ray(object, eye, MirrorSide::Right)
            .unwrap();
        let top = room
            .create_bounced_ray(object, eye, MirrorSide::Top)
            .unwrap();

        assert!(room.remove_mirror(MirrorSide::Right));

        let rays: Vec<_> = room.rays().map(|(id, _)| id).collect();
        assert_eq!(rays, [direct, top.incoming, top.outgoing]);
        assert_eq!(
            room.entities()
                .filter(|(_, e)| e.mirror_side().is_some())
                .count(),
            1
        );
    }

    #[test]
    fn test_bounce_follows_its_ends() {
        let (mut room, object, eye) = sample_room();
        let bounce = room
            .create_bounced_ray(object, eye, MirrorSide::Right)
            .unwrap();

        room.move_entity(object, point(50., 180.)).unwrap();
        assert_eq!(room.position_of(bounce.point), Some(&point(200., 82.5)));

        room.move_entity(eye, point(100., 180.)).unwrap();
        assert_eq!(room.position_of(bounce.point), Some(&point(200., 180.)));

        let outgoing = room.entity(bounce.outgoing).unwrap().as_ray().unwrap();
        assert_eq!(
            room.ray_endpoints(outgoing),
            Some((point(200., 180.), point(100., 180.)))
        );
    }

    #[test]
    fn test_bounce_out_of_the_wall_is_dropped() {
        let (mut room, object, eye) = sample_room();
        let direct = room.create_ray(object, eye).unwrap();
        let bounce = room
            .create_bounced_ray(object, eye, MirrorSide::Right)
            .unwrap();

        // the path to the eye's image now crosses x = 200 far below the wall
        room.move_entity(object, point(190., 900.)).unwrap();

        assert_eq!(room.entity(bounce.point), None);
        assert_eq!(room.rays().map(|(id, _)| id).collect::<Vec<_>>(), [direct]);
    }

    #[test]
    fn test_reflection_points_stay_on_their_mirror() {
        let (mut room, object, eye) = sample_room();
        let bounce = room
            .create_bounced_ray(object, eye, MirrorSide::Right)
            .unwrap();
        let before = room.clone();

        assert_eq!(
            room.move_entity(bounce.point, point(100., 150.)),
            Err(SceneError::PinnedToMirror(bounce.point))
        );
        assert_eq!(room, before);
    }

    #[test]
    fn test_move_entity() {
        let (mut room, object, eye) = sample_room();
        let ray = room.create_ray(object, eye).unwrap();

        room.move_entity(object, point(20., 20.)).unwrap();
        assert_eq!(room.position_of(object), Some(&point(20., 20.)));
        assert_eq!(
            room.move_entity(ray, point(0., 0.)),
            Err(SceneError::UnknownEntity(ray))
        );
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let (mut room, object, eye) = sample_room();
        let ray = room.create_ray(object, eye).unwrap();
        let above = room.add_object(point(55., 100.));

        assert_eq!(room.hit_test(&point(52., 100.), 5.), Some(above));
        // on the ray, away from both ends
        assert_eq!(room.hit_test(&point(100., 75.), 5.), Some(ray));
        // ends of rays pick what they link
        assert_eq!(room.hit_test(&point(150., 50.), 5.), Some(eye));
        assert_eq!(room.hit_test(&point(10., 190.), 5.), None);
    }
}
