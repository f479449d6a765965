use super::*;

/// RGBA, components in `[0, 1]`
pub type Color = [f32; 4];

#[inline]
#[must_use]
pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    let [r, g, b] = [r, g, b].map(|c| f32::from(c) / 255.);
    [r, g, b, 1.]
}

/// What to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Disc { center: Point, radius: Float },
    /// The eye symbol, `size` being its font size
    Glyph { center: Point, size: Float },
    Ring { center: Point, radius: Float },
    Segment { from: Point, to: Point },
    Outline { rect: Rect },
}

/// How to draw it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub weight: f32,
    /// Dash and gap lengths, `None` for a solid line
    pub dash: Option<[f32; 2]>,
}

impl Style {
    #[inline]
    #[must_use]
    pub const fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            weight: 0.,
            dash: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn stroked(color: Color, weight: f32) -> Self {
        Self {
            fill: None,
            stroke: Some(color),
            weight,
            dash: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn dashed(self, dash: [f32; 2]) -> Self {
        Self {
            dash: Some(dash),
            ..self
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_dashed(&self) -> bool {
        self.dash.is_some()
    }
}

/// One item for the drawing layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Descriptor {
    pub shape: Shape,
    pub style: Style,
    /// Whether this belongs to a virtual room
    pub is_virtual: bool,
}

/// The look of everything drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleParams {
    pub object_color: Color,
    pub eye_color: Color,
    pub eye_size: Float,
    pub attention_color: Color,
    pub reflection_point_color: Color,
    pub ray_color: Color,
    pub ray_weight: f32,
    pub mirror_color: Color,
    pub mirror_weight: f32,
    pub wall_color: Color,
    /// Outline of reflected objects, eyes, markers and rooms
    pub virtual_color: Color,
    pub virtual_ray_color: Color,
    pub virtual_ray_weight: f32,
    pub virtual_dash: [f32; 2],
    pub virtual_ray_dash: [f32; 2],
}

impl Default for StyleParams {
    fn default() -> Self {
        Self {
            object_color: rgb(255, 100, 100),
            eye_color: rgb(0, 0, 0),
            eye_size: 24.,
            attention_color: rgb(255, 200, 0),
            reflection_point_color: rgb(100, 100, 100),
            ray_color: rgb(255, 150, 0),
            ray_weight: 2.,
            mirror_color: rgb(100, 100, 100),
            mirror_weight: 3.,
            wall_color: rgb(0, 0, 0),
            virtual_color: rgb(0, 0, 0),
            virtual_ray_color: rgb(100, 100, 100),
            virtual_ray_weight: 1.5,
            virtual_dash: [4., 4.],
            virtual_ray_dash: [5., 5.],
        }
    }
}

/// Anything the drawing layer can be handed.
pub trait Renderable {
    /// Pushes the descriptors of `self` to `list`, in drawing order.
    fn append_descriptors(&self, style: &StyleParams, list: &mut Vec<Descriptor>);

    fn descriptors(&self, style: &StyleParams) -> Vec<Descriptor> {
        let mut list = Vec::new();
        self.append_descriptors(style, &mut list);
        list
    }
}

impl Renderable for RealRoom {
    fn append_descriptors(&self, style: &StyleParams, list: &mut Vec<Descriptor>) {
        describe_room(self, false, style, list);
    }
}

impl Renderable for VirtualRoom {
    fn append_descriptors(&self, style: &StyleParams, list: &mut Vec<Descriptor>) {
        describe_room(self, true, style, list);
    }
}

impl<T: Renderable> Renderable for [T] {
    fn append_descriptors(&self, style: &StyleParams, list: &mut Vec<Descriptor>) {
        self.iter()
            .for_each(|item| item.append_descriptors(style, list));
    }
}

impl<T: Renderable> Renderable for Vec<T> {
    fn append_descriptors(&self, style: &StyleParams, list: &mut Vec<Descriptor>) {
        self.as_slice().append_descriptors(style, list);
    }
}

/// Walls first, then mirrors, rays, and finally positioned entities, on top.
fn describe_room(
    room: &RoomContents,
    is_virtual: bool,
    style: &StyleParams,
    list: &mut Vec<Descriptor>,
) {
    let mut push = |shape, s: Style| {
        list.push(Descriptor {
            shape,
            style: if is_virtual {
                s.dashed(s.dash.unwrap_or(style.virtual_dash))
            } else {
                s
            },
            is_virtual,
        });
    };

    let wall = if is_virtual {
        style.virtual_color
    } else {
        style.wall_color
    };
    push(Shape::Outline { rect: *room.rect() }, Style::stroked(wall, 1.));

    for side in room.mirrors().iter() {
        let (from, to) = side.wall(room.rect());
        push(
            Shape::Segment { from, to },
            Style::stroked(style.mirror_color, style.mirror_weight),
        );
    }

    for (_, ray) in room.rays() {
        let Some((from, to)) = room.ray_endpoints(ray) else {
            continue;
        };

        let s = if ray.is_virtual {
            Style::stroked(style.virtual_ray_color, style.virtual_ray_weight)
                .dashed(style.virtual_ray_dash)
        } else {
            Style::stroked(style.ray_color, style.ray_weight)
        };
        push(Shape::Segment { from, to }, s);
    }

    for (_, entity) in room.entities() {
        let Some((shape, s)) = describe_entity(entity, is_virtual, style) else {
            continue;
        };
        push(shape, s);
    }
}

fn describe_entity(
    entity: &Entity,
    is_virtual: bool,
    style: &StyleParams,
) -> Option<(Shape, Style)> {
    // reflected markers are drawn hollow
    let solid = |color| {
        if is_virtual {
            Style::stroked(style.virtual_color, 1.)
        } else {
            Style::filled(color)
        }
    };

    let description = match *entity {
        Entity::ObjectMarker { position } => (
            Shape::Disc {
                center: position,
                radius: OBJECT_RADIUS,
            },
            solid(style.object_color),
        ),
        Entity::Eye { position } => (
            Shape::Glyph {
                center: position,
                size: style.eye_size,
            },
            Style::filled(style.eye_color),
        ),
        Entity::AttentionMarker { position, phase } => (
            Shape::Ring {
                center: position,
                radius: Entity::pulse_radius(phase),
            },
            Style::stroked(style.attention_color, 2.),
        ),
        Entity::ReflectionPoint { position, .. } => (
            Shape::Disc {
                center: position,
                radius: REFLECTION_POINT_RADIUS / 2.,
            },
            solid(style.reflection_point_color),
        ),
        Entity::RayLink(_) => return None,
    };

    Some(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RealRoom {
        let mut room = RealRoom::new(Rect::new(0., 0., 200., 200.));
        room.add_mirror(MirrorSide::Right).unwrap();
        let object = room.add_object(point(50., 100.));
        let eye = room.add_eye(point(150., 50.));
        room.create_ray(object, eye).unwrap();
        room
    }

    #[test]
    fn test_rgb() {
        assert_eq!(rgb(255, 0, 51), [1., 0., 0.2, 1.]);
    }

    #[test]
    fn test_real_room_is_solid() {
        let style = StyleParams::default();
        let list = room().descriptors(&style);

        // outline, mirror, ray, object, eye
        assert_eq!(list.len(), 5);
        assert!(list.iter().all(|d| !d.is_virtual && !d.style.is_dashed()));

        assert_eq!(
            list[2],
            Descriptor {
                shape: Shape::Segment {
                    from: point(50., 100.),
                    to: point(150., 50.)
                },
                style: Style::stroked(style.ray_color, 2.),
                is_virtual: false,
            }
        );
        assert_eq!(list[3].style.fill, Some(style.object_color));
    }

    #[test]
    fn test_virtual_room_is_dashed() {
        let style = StyleParams::default();
        let list = reflect_room(&room(), 1).descriptors(&style);

        assert_eq!(list.len(), 5);
        assert!(list.iter().all(|d| d.is_virtual && d.style.is_dashed()));

        // rays keep their own dash pattern
        assert_eq!(list[2].style.dash, Some(style.virtual_ray_dash));
        assert_eq!(list[2].style.stroke, Some(style.virtual_ray_color));
        // and reflected objects are hollow
        assert_eq!(list[3].style.fill, None);
        assert_eq!(list[3].style.dash, Some(style.virtual_dash));
    }

    #[test]
    fn test_mirror_on_the_left_wall_of_the_image() {
        let list = reflect_room(&room(), 1).descriptors(&StyleParams::default());

        assert_eq!(
            list[1].shape,
            Shape::Segment {
                from: point(220., 0.),
                to: point(220., 200.)
            }
        );
    }
}
