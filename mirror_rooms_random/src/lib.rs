use mirror_rooms::*;

use core::iter;
pub use rand;

pub trait Random: Sized {
    /// Generate a random value of this type using the provided `rng`
    ///
    /// This method must not fail. If creating a value is faillible, keep trying until success
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self;
}

impl Random for MirrorSide {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        MirrorSide::ALL[rng.gen_range(0..MirrorSide::ALL.len())]
    }
}

impl Random for Rect {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        const EXTENT: Float = 1200.0;
        const MIN_SIDE: Float = 80.0;
        const MAX_SIDE: Float = 320.0;

        Rect::new(
            rng.gen_range(0.0..EXTENT),
            rng.gen_range(0.0..EXTENT),
            rng.gen_range(MIN_SIDE..MAX_SIDE),
            rng.gen_range(MIN_SIDE..MAX_SIDE),
        )
    }
}

/// A random point inside `rect`, at least `margin` away from its walls
pub fn rand_point_in(rng: &mut (impl rand::Rng + ?Sized), rect: &Rect, margin: Float) -> Point {
    let margin = margin.min(rect.w / 2.0).min(rect.h / 2.0);

    point(
        rng.gen_range(rect.x + margin..=rect.right() - margin),
        rng.gen_range(rect.y + margin..=rect.bottom() - margin),
    )
}

impl Random for RealRoom {
    /// A random room, with some mirrors, an eye, a few objects, and the rays
    /// between them, some of which bounce off the mirrors.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        const MAX_OBJECTS: usize = 3;

        let mut room = RealRoom::new(Rect::random(rng));

        for side in MirrorSide::ALL {
            if rng.gen_bool(0.5) {
                // each side once, can't fail
                let _ = room.add_mirror(side);
            }
        }

        let rect = *room.rect();
        let eye = room.add_eye(rand_point_in(rng, &rect, EYE_RADIUS));

        let num_objects = rng.gen_range(1..=MAX_OBJECTS);
        let objects: Vec<_> = iter::repeat_with(|| rand_point_in(rng, &rect, OBJECT_RADIUS))
            .take(num_objects)
            .collect();

        for position in objects {
            let object = room.add_object(position);

            if rng.gen_bool(0.5) {
                let _ = room.create_ray(object, eye);
            }

            let side = MirrorSide::random(rng);
            // mirrorless sides and unreachable bounces are refused, leaving the room untouched
            let _ = room.create_bounced_ray(object, eye, side);
        }

        if rng.gen_bool(0.25) {
            room.add_attention_marker(rand_point_in(rng, &rect, ATTENTION_RADIUS));
        }

        room
    }
}

/// A scene of (up to) `num_rooms` random, non overlapping, rooms.
///
/// Rooms that can't be placed without overlapping those already there are skipped.
pub fn random_scene(
    rng: &mut (impl rand::Rng + ?Sized),
    params: SceneParams,
    num_rooms: usize,
) -> Scene {
    const MAX_ATTEMPTS: usize = 64;

    let mut scene = Scene::new(params);

    for _ in 0..num_rooms {
        let room = iter::repeat_with(|| RealRoom::random(rng))
            .take(MAX_ATTEMPTS)
            .find(|room| {
                scene
                    .rooms()
                    .all(|(_, other)| !other.rect().overlaps(room.rect()))
            });

        if let Some(room) = room {
            scene.insert_room(room);
        }
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_random_rooms_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..64 {
            let room = RealRoom::random(&mut rng);

            assert!(room.first_with_role(Role::Eye).is_some());
            assert!(room
                .entities()
                .filter_map(|(_, e)| e.position())
                .all(|p| room.rect().contains(p)));
            assert!(room.rays().all(|(_, ray)| room.ray_endpoints(ray).is_some()));
        }
    }

    #[test]
    fn test_random_scenes_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..16 {
            let scene = random_scene(&mut rng, SceneParams::default(), 4);
            let rects: Vec<_> = scene.rooms().map(|(_, r)| *r.rect()).collect();

            for (i, a) in rects.iter().enumerate() {
                assert!(rects[i + 1..].iter().all(|b| !a.overlaps(b)));
            }

            for (id, room) in scene.rooms() {
                let images = scene.virtual_rooms(id).unwrap();

                for image in &images {
                    assert!(rects.iter().all(|r| !r.overlaps(image.rect())));
                    assert!(image.origin().layer <= scene.params().engine.max_layers);
                    // images hold as many positioned entities as the real room
                    assert_eq!(
                        image.entities().filter(|(_, e)| e.supports_reflection()).count(),
                        room.entities().filter(|(_, e)| e.supports_reflection()).count(),
                    );
                    for (_, ray) in image.rays() {
                        assert!(ray.is_virtual);
                        assert!(image.ray_endpoints(ray).is_some());
                    }
                }
            }

            assert!(!scene.frame().is_empty() || rects.is_empty());
        }
    }
}
