//! Physics debug renderer
//!
//! Collects collider outlines and AABBs from rapier's debug render pipeline as
//! colored line vertices ready for upload.

use bytemuck::{Pod, Zeroable};
use rapier3d::pipeline::{
    DebugColor, DebugRenderBackend, DebugRenderMode, DebugRenderObject, DebugRenderPipeline,
    DebugRenderStyle,
};
use rapier3d::prelude::{Point, Real};

use super::conversions::point3_from_na;

/// One end of a debug line segment
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Line list rebuilt from the physics world on demand
pub struct DebugLines {
    pipeline: DebugRenderPipeline,
    vertices: Vec<LineVertex>,
}

impl Default for DebugLines {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DebugLines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugLines")
            .field("vertices", &self.vertices.len())
            .finish()
    }
}

impl DebugLines {
    pub fn new() -> Self {
        Self {
            pipeline: DebugRenderPipeline::new(
                DebugRenderStyle::default(),
                DebugRenderMode::COLLIDER_SHAPES | DebugRenderMode::COLLIDER_AABBS,
            ),
            vertices: Vec::new(),
        }
    }

    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    pub fn line_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub(super) fn rebuild(&mut self, world: &super::PhysicsWorld) {
        self.vertices.clear();
        let mut sink = LineSink {
            vertices: &mut self.vertices,
        };
        self.pipeline.render(
            &mut sink,
            &world.bodies,
            &world.colliders,
            &world.impulse_joints,
            &world.multibody_joints,
            &world.narrow_phase,
        );
    }
}

struct LineSink<'a> {
    vertices: &'a mut Vec<LineVertex>,
}

impl DebugRenderBackend for LineSink<'_> {
    fn draw_line(
        &mut self,
        _object: DebugRenderObject,
        a: Point<Real>,
        b: Point<Real>,
        color: DebugColor,
    ) {
        let color = hsla_to_rgba(color);
        self.vertices.push(LineVertex {
            position: point3_from_na(&a).to_array(),
            color,
        });
        self.vertices.push(LineVertex {
            position: point3_from_na(&b).to_array(),
            color,
        });
    }
}

/// Rapier hands out colors as HSLA with hue in degrees.
pub fn hsla_to_rgba([h, s, l, a]: DebugColor) -> [f32; 4] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [r + m, g + m, b + m, a]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::red([0.0, 1.0, 0.5, 1.0], [1.0, 0.0, 0.0, 1.0])]
    #[case::green([120.0, 1.0, 0.5, 1.0], [0.0, 1.0, 0.0, 1.0])]
    #[case::blue([240.0, 1.0, 0.5, 0.5], [0.0, 0.0, 1.0, 0.5])]
    #[case::grey([42.0, 0.0, 0.25, 1.0], [0.25, 0.25, 0.25, 1.0])]
    fn hsla_conversion(#[case] hsla: [f32; 4], #[case] rgba: [f32; 4]) {
        let out = hsla_to_rgba(hsla);
        for (got, want) in out.iter().zip(rgba) {
            assert!((got - want).abs() < 1e-5, "{out:?} != {rgba:?}");
        }
    }
}
