//! Stand-ins for the font and rendering backends, used by the unit tests.

use std::{cell::RefCell, rc::Rc};

use anyhow::{anyhow, ensure, Result};

use crate::{
    canvas::{Canvas, Rect},
    color::Rgba,
    software::SoftwareCanvas,
    text::font::{Font, FontLoader},
    texture::{Bitmap, BlendMode, TextureHandle},
};

/// Monospace font: every char is `size / 2` wide, the line is `size` tall,
/// descent is a fifth of the size. Glyphs are solid blocks.
pub struct BlockFont {
    pub size: u32,
}

impl Font for BlockFont {
    fn size(&self) -> u32 {
        self.size
    }

    fn descent(&self) -> i32 {
        -(self.size as i32 / 5)
    }

    fn height(&self) -> u32 {
        self.size
    }

    fn render_blended(&self, text: &str, fg: Rgba) -> Result<Bitmap> {
        let width = text.chars().count() as u32 * (self.size / 2).max(1);
        ensure!(width > 0, "Text \"{}\" has zero width", text);
        let coverage = vec![255; width as usize * self.size as usize];
        Bitmap::from_coverage(width, self.size, &coverage, fg)
    }
}

/// Opens `BlockFont`s and counts how often it was asked to.
#[derive(Default, Clone)]
pub struct BlockFontLoader {
    pub opened: Rc<RefCell<Vec<u32>>>,
    pub reject: Option<u32>,
}

impl FontLoader for BlockFontLoader {
    fn open(&mut self, size: u32) -> Result<Box<dyn Font>> {
        if self.reject == Some(size) || size == 0 {
            return Err(anyhow!("Couldn't open font at size {}", size));
        }
        self.opened.borrow_mut().push(size);
        Ok(Box::new(BlockFont { size }))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    SetDrawColor(Rgba),
    Clear,
    FillRect(Rect),
    DrawRect(Rect),
    DrawLine(i32, i32, i32, i32),
    CreateTexture(TextureHandle),
    SetTextureBlendMode(TextureHandle, BlendMode),
    Copy(TextureHandle, Rect, Rect),
    DestroyTexture(TextureHandle),
}

/// Wraps a `SoftwareCanvas` and remembers every call made on it.
pub struct RecordingCanvas {
    pub inner: SoftwareCanvas,
    pub commands: Vec<Command>,
    pub fail_textures: bool,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            inner: SoftwareCanvas::new(width, height),
            commands: Vec::new(),
            fail_textures: false,
        }
    }

    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.inner.resize(width, height)
    }

    fn set_draw_color(&mut self, color: Rgba) -> Result<()> {
        self.commands.push(Command::SetDrawColor(color));
        self.inner.set_draw_color(color)
    }

    fn draw_color(&self) -> Rgba {
        self.inner.draw_color()
    }

    fn clear(&mut self) -> Result<()> {
        self.commands.push(Command::Clear);
        self.inner.clear()
    }

    fn fill_rect(&mut self, rect: Rect) -> Result<()> {
        self.commands.push(Command::FillRect(rect));
        self.inner.fill_rect(rect)
    }

    fn draw_rect(&mut self, rect: Rect) -> Result<()> {
        self.commands.push(Command::DrawRect(rect));
        self.inner.draw_rect(rect)
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        self.commands.push(Command::DrawLine(x1, y1, x2, y2));
        self.inner.draw_line(x1, y1, x2, y2)
    }

    fn create_texture(&mut self, bitmap: &Bitmap) -> Result<TextureHandle> {
        ensure!(!self.fail_textures, "Out of texture memory");
        let handle = self.inner.create_texture(bitmap)?;
        self.commands.push(Command::CreateTexture(handle));
        Ok(handle)
    }

    fn set_texture_blend_mode(&mut self, texture: TextureHandle, mode: BlendMode) -> Result<()> {
        self.commands.push(Command::SetTextureBlendMode(texture, mode));
        self.inner.set_texture_blend_mode(texture, mode)
    }

    fn copy(&mut self, texture: TextureHandle, src: Rect, dst: Rect) -> Result<()> {
        self.commands.push(Command::Copy(texture, src, dst));
        self.inner.copy(texture, src, dst)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> Result<()> {
        self.commands.push(Command::DestroyTexture(texture));
        self.inner.destroy_texture(texture)
    }
}
