//! CPU tessellation of a [`DrawList`] into a triangle list.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::render::{DrawCommand, DrawList, Rgba};

/// Segments used to approximate a circle.
pub const CIRCLE_SEGMENTS: usize = 24;

/// One vertex: logical-pixel position and straight-alpha color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    fn new(position: Vec2, color: Rgba) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Turn recorded commands into triangles, appending to `out`.
///
/// Returns the clear color of the list, if it starts with one.
pub fn tessellate(list: &DrawList, out: &mut Vec<Vertex>) -> Option<Rgba> {
    out.clear();
    let mut clear = None;
    for command in list.commands() {
        match *command {
            DrawCommand::Clear { color } => {
                out.clear();
                clear = Some(color);
            }
            DrawCommand::Line { from, to, width, color } => line(out, from, to, width, color),
            DrawCommand::Disc { center, radius, color } => disc(out, center, radius, color),
            DrawCommand::Ring {
                center,
                radius,
                width,
                color,
            } => ring(out, center, radius, width, color),
        }
    }
    clear
}

fn quad(out: &mut Vec<Vertex>, a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2, color: Rgba) {
    for p in [a0, a1, b0, a1, b0, b1] {
        out.push(Vertex::new(p, color));
    }
}

fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: Rgba) {
    let dir = to - from;
    let len = dir.length();
    if len < 1e-4 || width <= 0.0 {
        return;
    }
    let perp = dir.perp() / len * (width * 0.5);
    quad(out, from - perp, from + perp, to - perp, to + perp, color);
}

fn unit(i: usize) -> Vec2 {
    let angle = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
    Vec2::new(angle.cos(), angle.sin())
}

fn disc(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: Rgba) {
    if radius <= 0.0 {
        return;
    }
    for i in 0..CIRCLE_SEGMENTS {
        out.push(Vertex::new(center, color));
        out.push(Vertex::new(center + unit(i) * radius, color));
        out.push(Vertex::new(center + unit(i + 1) * radius, color));
    }
}

fn ring(out: &mut Vec<Vertex>, center: Vec2, radius: f32, width: f32, color: Rgba) {
    if radius <= 0.0 || width <= 0.0 {
        return;
    }
    let inner = (radius - width * 0.5).max(0.0);
    let outer = radius + width * 0.5;
    for i in 0..CIRCLE_SEGMENTS {
        let (u0, u1) = (unit(i), unit(i + 1));
        quad(
            out,
            center + u0 * inner,
            center + u0 * outer,
            center + u1 * inner,
            center + u1 * outer,
            color,
        );
    }
}
