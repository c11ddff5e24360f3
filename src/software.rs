use anyhow::{anyhow, ensure, Result};
use generational_arena::Arena;

use crate::{
    canvas::{Canvas, Rect},
    color::Rgba,
    texture::{mul_u8, Bitmap, BlendMode, Texture, TextureHandle},
};

/// A canvas that rasterizes into an RGBA8 framebuffer on the CPU.
/// The framebuffer is handed to the presenter once per frame.
pub struct SoftwareCanvas {
    target: Bitmap,
    draw_color: Rgba,
    blend_mode: BlendMode,
    textures: Arena<Texture>,
}

impl SoftwareCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target: Bitmap::new(width, height),
            draw_color: Rgba::TRANSPARENT,
            blend_mode: BlendMode::Blend,
            textures: Arena::new(),
        }
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn pixels(&self) -> &[u8] {
        &self.target.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.target.pixel(x, y)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.0)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba, mode: BlendMode) {
        if x < 0 || y < 0 || x >= self.target.width as i64 || y >= self.target.height as i64 {
            return;
        }
        let offset = (y as usize * self.target.width as usize + x as usize) * 4;
        let dst = &mut self.target.data[offset..offset + 4];
        match mode {
            BlendMode::None => dst.copy_from_slice(&color.to_array()),
            BlendMode::Blend => {
                let inv = 255 - color.a;
                dst[0] = mul_u8(color.r, color.a) + mul_u8(dst[0], inv);
                dst[1] = mul_u8(color.g, color.a) + mul_u8(dst[1], inv);
                dst[2] = mul_u8(color.b, color.a) + mul_u8(dst[2], inv);
                dst[3] = color.a + mul_u8(dst[3], inv);
            }
        }
    }

    fn span(&mut self, x0: i64, x1: i64, y: i64) {
        let (color, mode) = (self.draw_color, self.blend_mode);
        for x in x0.max(0)..x1.min(self.target.width as i64) {
            self.put(x, y, color, mode);
        }
    }
}

impl Canvas for SoftwareCanvas {
    fn size(&self) -> (u32, u32) {
        (self.target.width, self.target.height)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        // textures keep whatever they were created with
        self.target = Bitmap::new(width, height);
        Ok(())
    }

    fn set_draw_color(&mut self, color: Rgba) -> Result<()> {
        self.draw_color = color;
        Ok(())
    }

    fn draw_color(&self) -> Rgba {
        self.draw_color
    }

    fn clear(&mut self) -> Result<()> {
        let color = self.draw_color.to_array();
        for pixel in self.target.data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect) -> Result<()> {
        if rect.is_empty() {
            return Ok(());
        }
        let y0 = (rect.y as i64).max(0);
        let y1 = rect.bottom().min(self.target.height as i64);
        for y in y0..y1 {
            self.span(rect.x as i64, rect.right(), y);
        }
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect) -> Result<()> {
        if rect.is_empty() {
            return Ok(());
        }
        let (x, y) = (rect.x as i64, rect.y as i64);
        let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);
        let (color, mode) = (self.draw_color, self.blend_mode);

        self.span(x, right + 1, y);
        if bottom > y {
            self.span(x, right + 1, bottom);
        }
        // sides without the corners, so nothing gets blended twice
        for row in (y + 1).max(0)..bottom.min(self.target.height as i64) {
            self.put(x, row, color, mode);
            if right > x {
                self.put(right, row, color, mode);
            }
        }
        Ok(())
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        let (w, h) = (self.target.width as i64, self.target.height as i64);
        let Some((mut x, mut y, x2, y2)) = clip_line(
            (x1 as i64, y1 as i64),
            (x2 as i64, y2 as i64),
            w - 1,
            h - 1,
        ) else {
            return Ok(());
        };

        let (color, mode) = (self.draw_color, self.blend_mode);
        let dx = (x2 - x).abs();
        let dy = -(y2 - y).abs();
        let sx = if x < x2 { 1 } else { -1 };
        let sy = if y < y2 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put(x, y, color, mode);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        Ok(())
    }

    fn create_texture(&mut self, bitmap: &Bitmap) -> Result<TextureHandle> {
        ensure!(
            bitmap.width > 0 && bitmap.height > 0,
            "Can't create a {}x{} texture",
            bitmap.width,
            bitmap.height
        );
        Ok(TextureHandle(
            self.textures.insert(Texture::from_bitmap(bitmap)),
        ))
    }

    fn set_texture_blend_mode(&mut self, texture: TextureHandle, mode: BlendMode) -> Result<()> {
        let texture = self
            .textures
            .get_mut(texture.0)
            .ok_or(anyhow!("No texture for handle {:?}", texture))?;
        texture.blend_mode = mode;
        Ok(())
    }

    fn copy(&mut self, texture: TextureHandle, src: Rect, dst: Rect) -> Result<()> {
        let source = self
            .textures
            .get(texture.0)
            .ok_or(anyhow!("No texture for handle {:?}", texture))?;

        // clip the source to the texture
        let sx0 = (src.x as i64).max(0);
        let sy0 = (src.y as i64).max(0);
        let sx1 = src.right().min(source.width() as i64);
        let sy1 = src.bottom().min(source.height() as i64);
        if sx1 <= sx0 || sy1 <= sy0 || dst.is_empty() {
            return Ok(());
        }
        let (sw, sh) = (sx1 - sx0, sy1 - sy0);

        let dx0 = (dst.x as i64).max(0);
        let dy0 = (dst.y as i64).max(0);
        let dx1 = dst.right().min(self.target.width as i64);
        let dy1 = dst.bottom().min(self.target.height as i64);

        let mut samples = Vec::new();
        for y in dy0..dy1 {
            let ty = sy0 + (y - dst.y as i64) * sh / dst.h as i64;
            for x in dx0..dx1 {
                let tx = sx0 + (x - dst.x as i64) * sw / dst.w as i64;
                if let Some(color) = source.bitmap.pixel(tx as u32, ty as u32) {
                    samples.push((x, y, color));
                }
            }
        }

        let mode = source.blend_mode;
        for (x, y, color) in samples {
            self.put(x, y, color, mode);
        }
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> Result<()> {
        self.textures
            .remove(texture.0)
            .map(|_| ())
            .ok_or(anyhow!("No texture for handle {:?}", texture))
    }
}

/// Liang-Barsky: the part of the segment inside `[0, max_x] x [0, max_y]`,
/// or `None` if it misses the box entirely.
fn clip_line(
    (x1, y1): (i64, i64),
    (x2, y2): (i64, i64),
    max_x: i64,
    max_y: i64,
) -> Option<(i64, i64, i64, i64)> {
    if max_x < 0 || max_y < 0 {
        return None;
    }
    let (dx, dy) = ((x2 - x1) as f64, (y2 - y1) as f64);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let edges = [
        (-dx, x1 as f64),
        (dx, (max_x - x1) as f64),
        (-dy, y1 as f64),
        (dy, (max_y - y1) as f64),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| {
        (
            ((x1 as f64 + t * dx).round() as i64).clamp(0, max_x),
            ((y1 as f64 + t * dy).round() as i64).clamp(0, max_y),
        )
    };
    let (cx1, cy1) = if t0 > 0.0 { at(t0) } else { (x1, y1) };
    let (cx2, cy2) = if t1 < 1.0 { at(t1) } else { (x2, y2) };
    Some((cx1, cy1, cx2, cy2))
}
