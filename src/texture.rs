use anyhow::{ensure, Result};
use generational_arena::Index;

use crate::color::Rgba;

/// CPU side RGBA8 image, row-major, 4 bytes per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Bitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        ensure!(
            data.len() == width as usize * height as usize * 4,
            "Bitmap data is {} bytes, expected {} for {}x{}",
            data.len(),
            width as usize * height as usize * 4,
            width,
            height
        );
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Tints an 8-bit coverage mask with `fg`. Alpha is coverage scaled by `fg.a`.
    pub fn from_coverage(width: u32, height: u32, coverage: &[u8], fg: Rgba) -> Result<Self> {
        ensure!(
            coverage.len() == width as usize * height as usize,
            "Coverage mask is {} bytes, expected {} for {}x{}",
            coverage.len(),
            width as usize * height as usize,
            width,
            height
        );
        let data = coverage
            .iter()
            .flat_map(|&c| [fg.r, fg.g, fg.b, mul_u8(c, fg.a)])
            .collect();
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.data[offset..offset + 4];
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }
}

/// `a * b / 255`, rounded.
pub(crate) fn mul_u8(a: u8, b: u8) -> u8 {
    let t = a as u32 * b as u32 + 128;
    ((t + (t >> 8)) >> 8) as u8
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    None,
    Blend,
}

#[derive(Eq, Hash, PartialEq, Clone, Copy, Debug)]
pub struct TextureHandle(pub Index);

/// A drawable owned by a canvas. Built once from a bitmap and never regenerated.
#[derive(Debug)]
pub struct Texture {
    pub bitmap: Bitmap,
    pub blend_mode: BlendMode,
}

impl Texture {
    pub fn from_bitmap(bitmap: &Bitmap) -> Self {
        Self {
            bitmap: bitmap.clone(),
            blend_mode: BlendMode::None,
        }
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height
    }
}
