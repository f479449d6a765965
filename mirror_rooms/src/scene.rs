use super::*;

use core::fmt;
use log::{debug, info};

/// Identifies a real room within a [`Scene`]. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entity, addressed through the room that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub room: RoomId,
    pub entity: EntityId,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneParams {
    /// How close to a wall a click places a mirror on it
    pub edge_margin: Float,
    /// How close to a ray a click picks it
    pub ray_tolerance: Float,
    pub engine: EngineParams,
    pub style: StyleParams,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            edge_margin: 10.,
            ray_tolerance: 5.,
            engine: EngineParams::default(),
            style: StyleParams::default(),
        }
    }
}

/// What a pointer press does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Pick and drag entities
    #[default]
    Select,
    /// Put a mirror on the wall under the pointer
    PlaceMirror,
    /// Pick an object and an eye, in any order, to link them with a ray
    DrawRay,
}

/// The result of [`Scene::pointer_down`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerOutcome {
    Nothing,
    Selected(EntityRef),
    MirrorPlaced { room: RoomId, side: MirrorSide },
    RayStarted(EntityRef),
    RayCreated(EntityRef),
}

/// The whole editable state: real rooms, and what the user is doing with them.
///
/// Virtual rooms aren't part of it, see [`Self::frame`].
#[derive(Clone, Debug, Default)]
pub struct Scene {
    params: SceneParams,
    /// In drawing order, the last room is on top
    rooms: Vec<(RoomId, RealRoom)>,
    next_room: u32,
    active: Option<RoomId>,
    mode: Mode,
    selected: Option<EntityRef>,
    /// The dragged entity, and the pointer's position relative to it
    drag: Option<(EntityRef, Point)>,
    /// The first end of a ray being drawn
    pending_ray: Option<EntityRef>,
}

impl Scene {
    #[inline]
    #[must_use]
    pub fn new(params: SceneParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub const fn params(&self) -> &SceneParams {
        &self.params
    }

    #[inline]
    #[must_use]
    pub fn engine(&self) -> ReflectionEngine {
        ReflectionEngine::new(self.params.engine)
    }

    /// Adds an empty room, which becomes the active one.
    pub fn add_room(&mut self, rect: Rect) -> RoomId {
        self.insert_room(RealRoom::new(rect))
    }

    /// Adds a room, which becomes the active one.
    pub fn insert_room(&mut self, room: RealRoom) -> RoomId {
        let id = RoomId(self.next_room);
        self.next_room += 1;

        info!("room {id} added at {:?}", room.rect());

        self.rooms.push((id, room));
        self.active = Some(id);
        id
    }

    /// Removes a room and everything in it.
    ///
    /// If it was active, the topmost remaining room becomes active.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownRoom`] if there is no such room.
    pub fn remove_room(&mut self, id: RoomId) -> Result<RealRoom> {
        let i = self.index_of(id)?;
        let (_, room) = self.rooms.remove(i);

        let in_room = |r: &Option<EntityRef>| r.is_some_and(|e| e.room == id);
        if in_room(&self.selected) {
            self.selected = None;
        }
        if in_room(&self.pending_ray) {
            self.pending_ray = None;
        }
        if self.drag.is_some_and(|(e, _)| e.room == id) {
            self.drag = None;
        }
        if self.active == Some(id) {
            self.active = self.rooms.last().map(|(id, _)| *id);
        }

        info!("room {id} removed");
        Ok(room)
    }

    fn index_of(&self, id: RoomId) -> Result<usize> {
        self.rooms
            .iter()
            .position(|(i, _)| *i == id)
            .ok_or(SceneError::UnknownRoom(id))
    }

    /// # Errors
    ///
    /// [`SceneError::UnknownRoom`] if there is no such room.
    pub fn room(&self, id: RoomId) -> Result<&RealRoom> {
        self.index_of(id).map(|i| &self.rooms[i].1)
    }

    /// # Errors
    ///
    /// [`SceneError::UnknownRoom`] if there is no such room.
    pub fn room_mut(&mut self, id: RoomId) -> Result<&mut RealRoom> {
        self.index_of(id).map(|i| &mut self.rooms[i].1)
    }

    #[inline]
    pub fn rooms(&self) -> impl DoubleEndedIterator<Item = (RoomId, &RealRoom)> + '_ {
        self.rooms.iter().map(|(id, room)| (*id, room))
    }

    /// The room new entities are added to.
    #[inline]
    #[must_use]
    pub const fn active_room(&self) -> Option<RoomId> {
        self.active
    }

    /// # Errors
    ///
    /// [`SceneError::UnknownRoom`] if there is no such room.
    pub fn select_room(&mut self, id: RoomId) -> Result<()> {
        self.index_of(id)?;
        self.active = Some(id);
        Ok(())
    }

    fn add_to_active(
        &mut self,
        add: impl FnOnce(&mut RealRoom) -> EntityId,
    ) -> Result<EntityRef> {
        let room = self.active.ok_or(SceneError::NoActiveRoom)?;
        let entity = add(self.room_mut(room)?);
        Ok(EntityRef { room, entity })
    }

    /// Adds an object to the active room.
    ///
    /// # Errors
    ///
    /// [`SceneError::NoActiveRoom`] if there is no room.
    pub fn add_object(&mut self, position: Point) -> Result<EntityRef> {
        self.add_to_active(|room| room.add_object(position))
    }

    /// Adds an eye to the active room.
    ///
    /// # Errors
    ///
    /// [`SceneError::NoActiveRoom`] if there is no room.
    pub fn add_eye(&mut self, position: Point) -> Result<EntityRef> {
        self.add_to_active(|room| room.add_eye(position))
    }

    /// Adds an attention marker to the active room.
    ///
    /// # Errors
    ///
    /// [`SceneError::NoActiveRoom`] if there is no room.
    pub fn add_attention_marker(&mut self, position: Point) -> Result<EntityRef> {
        self.add_to_active(|room| room.add_attention_marker(position))
    }

    /// Links an object and an eye with a direct ray.
    ///
    /// # Errors
    ///
    /// [`SceneError::CrossRoomLink`] if they are in different rooms, and those of
    /// [`RealRoom::create_ray`] otherwise.
    pub fn create_ray(&mut self, source: EntityRef, target: EntityRef) -> Result<EntityRef> {
        if source.room != target.room {
            return Err(SceneError::CrossRoomLink);
        }

        let room = source.room;
        let entity = self.room_mut(room)?.create_ray(source.entity, target.entity)?;
        Ok(EntityRef { room, entity })
    }

    /// Puts a mirror on the wall under `p`, topmost room first.
    ///
    /// # Errors
    ///
    /// - [`SceneError::NotOnEdge`] if `p` isn't on any wall.
    /// - [`SceneError::EdgeAlreadyMirrored`] if that wall already has one.
    pub fn place_mirror(&mut self, p: &Point) -> Result<(RoomId, MirrorSide)> {
        let margin = self.params.edge_margin;

        let (id, side) = self
            .rooms()
            .rev()
            .find_map(|(id, room)| detect_edge(room.rect(), p, margin).map(|side| (id, side)))
            .ok_or(SceneError::NotOnEdge)?;

        self.room_mut(id)?.add_mirror(side)?;
        Ok((id, side))
    }

    /// The topmost entity under `p`.
    #[must_use]
    pub fn hit_test(&self, p: &Point) -> Option<EntityRef> {
        self.rooms().rev().find_map(|(room, r)| {
            r.hit_test(p, self.params.ray_tolerance)
                .map(|entity| EntityRef { room, entity })
        })
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Abandons any ray being drawn, or entity being dragged.
    pub fn set_mode(&mut self, mode: Mode) {
        debug!("mode: {mode:?}");
        self.mode = mode;
        self.pending_ray = None;
        self.drag = None;
    }

    #[inline]
    #[must_use]
    pub const fn selected(&self) -> Option<EntityRef> {
        self.selected
    }

    #[inline]
    #[must_use]
    pub const fn pending_ray(&self) -> Option<EntityRef> {
        self.pending_ray
    }

    /// Handles a pointer press at `p`, according to the current [`Mode`].
    ///
    /// # Errors
    ///
    /// Those of [`Self::place_mirror`] in [`Mode::PlaceMirror`], and of
    /// [`Self::create_ray`] in [`Mode::DrawRay`]. In the latter case, the first
    /// end stays picked, so another second end can be tried.
    pub fn pointer_down(&mut self, p: &Point) -> Result<PointerOutcome> {
        match self.mode {
            Mode::Select => {
                let hit = self.hit_test(p);
                self.selected = hit;
                self.drag = hit.and_then(|e| {
                    let entity = self.room(e.room).ok()?.entity(e.entity)?;
                    // reflection points follow the ends of their ray
                    if entity.mirror_side().is_some() {
                        return None;
                    }
                    entity.position().map(|pos| (e, p - pos))
                });
                Ok(hit.map_or(PointerOutcome::Nothing, PointerOutcome::Selected))
            }
            Mode::PlaceMirror => self
                .place_mirror(p)
                .map(|(room, side)| PointerOutcome::MirrorPlaced { room, side }),
            Mode::DrawRay => {
                let Some(hit) = self.hit_test(p) else {
                    self.pending_ray = None;
                    return Ok(PointerOutcome::Nothing);
                };

                match self.pending_ray {
                    None => {
                        self.pending_ray = Some(hit);
                        Ok(PointerOutcome::RayStarted(hit))
                    }
                    Some(first) => {
                        let ray = self.create_ray(first, hit)?;
                        self.pending_ray = None;
                        Ok(PointerOutcome::RayCreated(ray))
                    }
                }
            }
        }
    }

    /// Moves the dragged entity, if any, keeping its offset to the pointer.
    pub fn pointer_drag(&mut self, p: &Point) {
        if let Some((e, offset)) = self.drag {
            // the entity may have been deleted mid-drag
            if self
                .room_mut(e.room)
                .and_then(|room| room.move_entity(e.entity, p - offset))
                .is_err()
            {
                self.drag = None;
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Deletes the selected entity, and the rays attached to it (see [`RealRoom::remove`]).
    ///
    /// Returns `None` if nothing was selected.
    ///
    /// # Errors
    ///
    /// Those of [`RealRoom::remove`].
    pub fn delete_selected(&mut self) -> Result<Option<Entity>> {
        let Some(e) = self.selected else {
            return Ok(None);
        };

        let removed = self.room_mut(e.room)?.remove(e.entity)?;

        self.selected = None;
        self.drag = None;

        // the first end of the ray being drawn may have gone with the attached rays
        let room = self.room(e.room)?;
        let gone =
            |pending: EntityRef| pending.room == e.room && room.entity(pending.entity).is_none();
        if self.pending_ray.is_some_and(gone) {
            self.pending_ray = None;
        }
        Ok(Some(removed))
    }

    /// Moves animations forward by `dt` seconds.
    pub fn tick(&mut self, dt: Float) {
        self.rooms
            .iter_mut()
            .for_each(|(_, room)| room.advance(dt));
    }

    /// The virtual rooms behind the mirrors of a room, guarded against all real rooms.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownRoom`] if there is no such room.
    pub fn virtual_rooms(&self, id: RoomId) -> Result<Vec<VirtualRoom>> {
        let room = self.room(id)?;
        Ok(self.engine().reflect_room(room, &self.real_rects()))
    }

    fn real_rects(&self) -> Vec<Rect> {
        self.rooms().map(|(_, room)| *room.rect()).collect()
    }

    /// Everything to draw this frame: all virtual rooms, recomputed, then all real rooms.
    #[must_use]
    pub fn frame(&self) -> Vec<Descriptor> {
        let engine = self.engine();
        let rects = self.real_rects();
        let style = &self.params.style;

        let mut list = Vec::new();

        for (_, room) in self.rooms() {
            engine
                .reflect_room(room, &rects)
                .append_descriptors(style, &mut list);
        }

        for (_, room) in self.rooms() {
            room.append_descriptors(style, &mut list);
        }

        list
    }
}
