use anyhow::Result;

use crate::{
    color::Rgba,
    texture::{Bitmap, BlendMode, TextureHandle},
};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect from signed extents. Negative sizes collapse to empty.
    pub fn from_signed(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, w.max(0) as u32, h.max(0) as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.h as i64
    }
}

/// The rendering backend every draw call ends up in.
///
/// Each call either succeeds or reports the backend's failure, there is no
/// partial success. Draw color is sticky state, like a renderer's.
pub trait Canvas {
    fn size(&self) -> (u32, u32);

    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    fn set_draw_color(&mut self, color: Rgba) -> Result<()>;

    fn draw_color(&self) -> Rgba;

    /// Fills the whole target with the draw color, ignoring blending.
    fn clear(&mut self) -> Result<()>;

    fn fill_rect(&mut self, rect: Rect) -> Result<()>;

    fn draw_rect(&mut self, rect: Rect) -> Result<()>;

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()>;

    fn create_texture(&mut self, bitmap: &Bitmap) -> Result<TextureHandle>;

    fn set_texture_blend_mode(&mut self, texture: TextureHandle, mode: BlendMode) -> Result<()>;

    /// Copies `src` of the texture into `dst` of the target, scaling if the sizes differ.
    fn copy(&mut self, texture: TextureHandle, src: Rect, dst: Rect) -> Result<()>;

    fn destroy_texture(&mut self, texture: TextureHandle) -> Result<()>;
}
