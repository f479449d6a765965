use super::*;

use thiserror::Error;

/// Why a user request was refused.
///
/// All of these are recoverable: the operation that returned one changed nothing,
/// and the message can be shown to the user as is.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SceneError {
    #[error("place an object in the room first")]
    MissingObject,

    #[error("place an eye in the room first")]
    MissingEye,

    #[error("click closer to a wall to place a mirror")]
    NotOnEdge,

    #[error("the {0} edge is already mirrored")]
    EdgeAlreadyMirrored(MirrorSide),

    #[error("the {0} edge has no mirror")]
    EdgeNotMirrored(MirrorSide),

    #[error("no valid reflection path off the {0} mirror")]
    NoReflectionPath(MirrorSide),

    #[error("a ray must link an object to an eye")]
    InvalidLink,

    #[error("a ray can't leave its room")]
    CrossRoomLink,

    #[error("room {0} doesn't exist")]
    UnknownRoom(RoomId),

    #[error("entity {0} doesn't exist in this room")]
    UnknownEntity(EntityId),

    #[error("add a room first")]
    NoActiveRoom,

    #[error("entity {0} sits where its ray meets the mirror, move the ray's ends instead")]
    PinnedToMirror(EntityId),
}

pub type Result<T> = core::result::Result<T, SceneError>;
