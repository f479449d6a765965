use std::{env, error::Error, fs::File};

use log::info;
use mirror_rooms::{
    point, Descriptor, EngineParams, MirrorSide, Point, Rect, Scene, SceneParams, Shape, Style,
    DEFAULT_MAX_LAYERS,
};
use mirror_rooms_random::{rand, random_scene};
use serde_json::json;

trait JsonSer {
    /// Serialize `self` into a JSON object.
    fn to_json(&self) -> serde_json::Value;
}

impl<T: JsonSer> JsonSer for [T] {
    fn to_json(&self) -> serde_json::Value {
        self.iter().map(T::to_json).collect()
    }
}

impl JsonSer for Point {
    fn to_json(&self) -> serde_json::Value {
        json!([self.x, self.y])
    }
}

impl JsonSer for Rect {
    fn to_json(&self) -> serde_json::Value {
        json!({
            "x": self.x,
            "y": self.y,
            "w": self.w,
            "h": self.h,
        })
    }
}

impl JsonSer for Shape {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Shape::Disc { center, radius } => json!({
                "type": "disc",
                "center": center.to_json(),
                "radius": radius,
            }),
            Shape::Glyph { center, size } => json!({
                "type": "eye",
                "center": center.to_json(),
                "size": size,
            }),
            Shape::Ring { center, radius } => json!({
                "type": "ring",
                "center": center.to_json(),
                "radius": radius,
            }),
            Shape::Segment { from, to } => json!({
                "type": "segment",
                "from": from.to_json(),
                "to": to.to_json(),
            }),
            Shape::Outline { rect } => json!({
                "type": "outline",
                "rect": rect.to_json(),
            }),
        }
    }
}

impl JsonSer for Style {
    fn to_json(&self) -> serde_json::Value {
        json!({
            "fill": self.fill,
            "stroke": self.stroke,
            "weight": self.weight,
            "dash": self.dash,
        })
    }
}

impl JsonSer for Descriptor {
    fn to_json(&self) -> serde_json::Value {
        json!({
            "shape": self.shape.to_json(),
            "style": self.style.to_json(),
            "virtual": self.is_virtual,
        })
    }
}

/// Two rooms: one with a mirror on its right wall, an object seen by an eye both
/// directly and through that mirror, the other with a corner of mirrors.
fn demo_scene(params: SceneParams) -> Result<Scene, Box<dyn Error>> {
    let mut scene = Scene::new(params);

    let first = scene.add_room(Rect::new(0., 0., 200., 200.));
    scene.room_mut(first)?.add_mirror(MirrorSide::Right)?;
    scene.add_object(point(50., 100.))?;
    scene.add_eye(point(150., 50.))?;

    let room = scene.room_mut(first)?;
    room.link_first_object_to_eye()?;
    room.bounce_first_object_to_eye(MirrorSide::Right)?;

    let second = scene.add_room(Rect::new(600., 0., 240., 160.));
    let room = scene.room_mut(second)?;
    room.add_mirror(MirrorSide::Left)?;
    room.add_mirror(MirrorSide::Top)?;
    scene.add_object(point(700., 90.))?;
    scene.add_attention_marker(point(780., 40.))?;

    Ok(scene)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);

    let file_path = args
        .next()
        .ok_or("please provide a path to write the frame json data to")?;

    let max_layers = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_MAX_LAYERS);

    // 0 for the demo scene
    let num_rooms = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(0);

    let params = SceneParams {
        engine: EngineParams {
            max_layers,
            ..Default::default()
        },
        ..Default::default()
    };

    let scene = if num_rooms == 0 {
        demo_scene(params)?
    } else {
        random_scene(&mut rand::thread_rng(), params, num_rooms)
    };

    let frame = scene.frame();
    info!(
        "{} descriptors for {} rooms, {max_layers} layers deep",
        frame.len(),
        scene.rooms().count(),
    );

    let rooms: Vec<_> = scene
        .rooms()
        .map(|(id, room)| {
            json!({
                "id": id.to_string(),
                "rect": room.rect().to_json(),
                "mirrors": room.mirrors().iter().map(|side| side.name()).collect::<Vec<_>>(),
            })
        })
        .collect();

    let json = json!({
        "max_layers": max_layers,
        "rooms": rooms,
        "frame": frame.to_json(),
    });

    serde_json::to_writer_pretty(File::create(file_path)?, &json)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_scene_frame_json() {
        let scene = demo_scene(SceneParams::default()).unwrap();
        let json = scene.frame().to_json();
        let frame = json.as_array().unwrap();

        assert!(frame.iter().any(|d| d["virtual"] == true));
        // real rooms are drawn last
        assert_eq!(frame.last().unwrap()["virtual"], false);
        assert!(frame
            .iter()
            .any(|d| d["shape"]["type"] == "segment" && d["shape"]["from"][0] == 200.0));
    }
}
