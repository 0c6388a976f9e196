use crate::core::gfx::{ObjectType, RenderList, RenderObject};
use crate::ui::actors::Actor;
use glam::Vec2;
use std::borrow::Cow;

/* ============================ SCREEN BUILD ============================ */

/// Flattens an actor tree into a z-sorted render list. Frames add their
/// offset, z and alpha to every descendant; equal z keeps submission order.
pub fn build_screen<'a>(actors: &'a [Actor], clear_color: [f32; 4]) -> RenderList<'a> {
    let mut objects = Vec::with_capacity(estimate_object_count(actors));
    let mut order_counter: u32 = 0;

    for actor in actors {
        build_actor_recursive(
            actor,
            Vec2::ZERO,
            1.0,
            0,
            &mut order_counter,
            &mut objects,
        );
    }

    objects.sort_by_key(|o| (o.z, o.order));

    RenderList {
        clear_color,
        objects,
    }
}

fn estimate_object_count(actors: &[Actor]) -> usize {
    let mut stack: Vec<&Actor> = Vec::with_capacity(actors.len());
    stack.extend(actors.iter());
    let mut total = 0usize;

    while let Some(a) = stack.pop() {
        match a {
            Actor::Frame { children, .. } => stack.extend(children.iter()),
            _ => total += 1,
        }
    }
    total
}

#[inline(always)]
fn faded(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}

#[inline(always)]
fn push<'a>(
    out: &mut Vec<RenderObject<'a>>,
    order: &mut u32,
    base_z: i16,
    z: i16,
    object_type: ObjectType<'a>,
) {
    out.push(RenderObject {
        object_type,
        z: base_z.saturating_add(z),
        order: *order,
    });
    *order += 1;
}

fn build_actor_recursive<'a>(
    actor: &'a Actor,
    parent_offset: Vec2,
    parent_alpha: f32,
    base_z: i16,
    order: &mut u32,
    out: &mut Vec<RenderObject<'a>>,
) {
    match actor {
        Actor::Quad {
            offset,
            size,
            color,
            z,
        } => {
            let color = faded(*color, parent_alpha);
            if color[3] <= 0.0 {
                return;
            }
            push(
                out,
                order,
                base_z,
                *z,
                ObjectType::Rect {
                    min: parent_offset + Vec2::from(*offset),
                    size: Vec2::from(*size),
                    color,
                },
            );
        }
        Actor::Circle {
            center,
            radius,
            color,
            z,
        } => {
            let color = faded(*color, parent_alpha);
            if color[3] <= 0.0 {
                return;
            }
            push(
                out,
                order,
                base_z,
                *z,
                ObjectType::Circle {
                    center: parent_offset + Vec2::from(*center),
                    radius: *radius,
                    color,
                },
            );
        }
        Actor::Text {
            offset,
            valign,
            align_text,
            color,
            font,
            zoom,
            content,
            clip,
            z,
        } => {
            let color = faded(*color, parent_alpha);
            let text: &str = content;
            if color[3] <= 0.0 || text.is_empty() {
                return;
            }
            let [w, h] = font.measure(text, *zoom);
            let anchor = parent_offset + Vec2::from(*offset);
            let origin = anchor - Vec2::new(w * align_text.pivot(), h * *valign);
            push(
                out,
                order,
                base_z,
                *z,
                ObjectType::Text {
                    origin,
                    text: Cow::Borrowed(text),
                    font: *font,
                    zoom: *zoom,
                    color,
                    clip: *clip,
                },
            );
        }
        Actor::Frame {
            offset,
            alpha,
            children,
            z,
        } => {
            let alpha = parent_alpha * alpha.clamp(0.0, 1.0);
            if alpha <= 0.0 {
                return;
            }
            let offset = parent_offset + Vec2::from(*offset);
            let layer = base_z.saturating_add(*z);
            for child in children {
                build_actor_recursive(child, offset, alpha, layer, order, out);
            }
        }
    }
}
