use std::collections::HashMap;

use anyhow::{anyhow, Result};
use generational_arena::{Arena, Index};

use crate::{
    canvas::Canvas,
    color::Rgba,
    diagnostics::LogSink,
    texture::{Bitmap, BlendMode, TextureHandle},
};

use super::{
    font::Font,
    font_cache::{FontCache, FontRef},
};

/// Foreground every string is rasterized with.
pub const TEXT_FOREGROUND: Rgba = Rgba::WHITE;

#[derive(Eq, Hash, PartialEq, Clone, Copy, Debug)]
pub struct TextRef {
    pub font: FontRef,
    pub(crate) text: Index,
}

/// A rendered string: the bitmap and the texture made from it at creation time.
#[derive(Debug)]
pub struct TextEntry {
    text: String,
    bitmap: Bitmap,
    texture: TextureHandle,
}

impl TextEntry {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height
    }
}

/// Strings rendered at one font size, keyed byte for byte.
#[derive(Default)]
pub struct TextCache {
    entries: Arena<TextEntry>,
    by_text: HashMap<String, Index>,
}

impl TextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, text: &str) -> Option<&TextEntry> {
        self.by_text.get(text).and_then(|index| self.entries.get(*index))
    }

    pub(crate) fn get_or_create(
        &mut self,
        font: &dyn Font,
        canvas: &mut dyn Canvas,
        sink: &mut dyn LogSink,
        text: &str,
    ) -> Result<Index> {
        if let Some(index) = self.by_text.get(text) {
            return Ok(*index);
        }

        let bitmap = font.render_blended(text, TEXT_FOREGROUND)?;
        let texture = canvas.create_texture(&bitmap)?;
        canvas.set_texture_blend_mode(texture, BlendMode::Blend)?;

        let index = self.entries.insert(TextEntry {
            text: text.to_string(),
            bitmap,
            texture,
        });
        self.by_text.insert(text.to_string(), index);
        sink.log(&format!("new text \"{}\"", text));
        Ok(index)
    }

    pub(crate) fn release(&self, canvas: &mut dyn Canvas) -> Result<usize> {
        for (_, entry) in self.entries.iter() {
            canvas.destroy_texture(entry.texture)?;
        }
        Ok(self.entries.len())
    }
}

impl FontCache {
    /// Returns the cached rendering of `text` at `font`'s size, rendering it on first use.
    pub fn get_text(
        &mut self,
        canvas: &mut dyn Canvas,
        font: FontRef,
        text: &str,
    ) -> Result<TextRef> {
        let entry = self
            .fonts
            .get_mut(font.0)
            .ok_or(anyhow!("No font for handle {:?}", font))?;
        let index = entry
            .texts
            .get_or_create(&*entry.font, canvas, &mut *self.sink, text)?;
        Ok(TextRef { font, text: index })
    }

    pub fn text(&self, text_ref: TextRef) -> Option<&TextEntry> {
        self.font(text_ref.font)
            .and_then(|entry| entry.texts.entries.get(text_ref.text))
    }

    pub(crate) fn text_entry(&self, text_ref: TextRef) -> Result<&TextEntry> {
        self.text(text_ref)
            .ok_or(anyhow!("No text for handle {:?}", text_ref))
    }

    /// Pixel width `text` has at `font`'s size. Renders and caches it if it hasn't been yet.
    pub fn width_of(&mut self, canvas: &mut dyn Canvas, font: FontRef, text: &str) -> Result<u32> {
        let text_ref = self.get_text(canvas, font, text)?;
        Ok(self.text_entry(text_ref)?.width())
    }
}
