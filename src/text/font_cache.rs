use std::collections::HashMap;

use anyhow::{anyhow, Result};
use generational_arena::{Arena, Index};

use crate::{canvas::Canvas, diagnostics::LogSink};

use super::{
    font::{Font, FontLoader},
    text_cache::TextCache,
};

#[derive(Eq, Hash, PartialEq, Clone, Copy, Debug)]
pub struct FontRef(pub(crate) Index);

/// A font at one size and every string rendered with it so far.
pub struct FontEntry {
    pub(crate) size: u32,
    pub(crate) font: Box<dyn Font>,
    pub(crate) texts: TextCache,
}

impl FontEntry {
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn font(&self) -> &dyn Font {
        &*self.font
    }

    pub fn texts(&self) -> &TextCache {
        &self.texts
    }
}

/// Owns every opened font and, through them, every rendered string.
///
/// Entries are created on first request and live until [`FontCache::shutdown`].
/// The canvas the textures live on isn't owned here, it is passed in by the
/// caller whenever a texture has to be made or destroyed.
pub struct FontCache {
    loader: Box<dyn FontLoader>,
    pub(crate) sink: Box<dyn LogSink>,
    pub(crate) fonts: Arena<FontEntry>,
    by_size: HashMap<u32, FontRef>,
}

impl FontCache {
    pub fn new(loader: impl FontLoader + 'static, sink: impl LogSink + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            sink: Box::new(sink),
            fonts: Arena::new(),
            by_size: HashMap::new(),
        }
    }

    pub fn get_font(&mut self, size: u32) -> Result<FontRef> {
        if let Some(font_ref) = self.by_size.get(&size) {
            return Ok(*font_ref);
        }

        let font = self.loader.open(size)?;
        let font_ref = FontRef(self.fonts.insert(FontEntry {
            size,
            font,
            texts: TextCache::new(),
        }));
        self.by_size.insert(size, font_ref);
        self.sink.log(&format!("new font size {}", size));
        Ok(font_ref)
    }

    pub fn font(&self, font_ref: FontRef) -> Option<&FontEntry> {
        self.fonts.get(font_ref.0)
    }

    pub(crate) fn entry(&self, font_ref: FontRef) -> Result<&FontEntry> {
        self.font(font_ref)
            .ok_or(anyhow!("No font for handle {:?}", font_ref))
    }

    pub fn descent(&self, font_ref: FontRef) -> Result<i32> {
        Ok(self.entry(font_ref)?.font.descent())
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn text_count(&self, font_ref: FontRef) -> usize {
        self.font(font_ref).map_or(0, |entry| entry.texts.len())
    }

    /// Destroys every cached texture. Has to run while `canvas` is still alive.
    pub fn shutdown(self, canvas: &mut dyn Canvas) -> Result<()> {
        let mut released = 0;
        for (_, entry) in self.fonts.iter() {
            released += entry.texts.release(canvas)?;
        }
        log::debug!("font cache shut down, released {} textures", released);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::{
        diagnostics::RecordingSink,
        testing::{BlockFontLoader, RecordingCanvas},
    };

    fn cache() -> (FontCache, BlockFontLoader, RecordingSink) {
        let loader = BlockFontLoader::default();
        let sink = RecordingSink::new();
        (FontCache::new(loader.clone(), sink.clone()), loader, sink)
    }

    #[test]
    fn font_is_opened_once_per_size() {
        let (mut cache, loader, sink) = cache();

        let first = cache.get_font(24).unwrap();
        let second = cache.get_font(24).unwrap();

        assert_eq!(first, second);
        assert_eq!(*loader.opened.borrow(), vec![24]);
        assert_eq!(sink.count("new font size 24"), 1);
        assert_eq!(cache.font_count(), 1);
        assert_eq!(cache.font(first).unwrap().size(), 24);
    }

    #[test]
    fn sizes_do_not_alias() {
        let (mut cache, _, sink) = cache();

        let small = cache.get_font(10).unwrap();
        let large = cache.get_font(12).unwrap();

        assert_ne!(small, large);
        assert_eq!(cache.font(small).unwrap().font().size(), 10);
        assert_eq!(cache.font(large).unwrap().font().size(), 12);
        assert_eq!(sink.messages(), vec!["new font size 10", "new font size 12"]);
    }

    #[test]
    fn rejected_size_is_an_error_and_not_cached() {
        let loader = BlockFontLoader {
            reject: Some(7),
            ..Default::default()
        };
        let sink = RecordingSink::new();
        let mut cache = FontCache::new(loader, sink.clone());

        assert!(cache.get_font(7).is_err());
        assert_eq!(cache.font_count(), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn descent_comes_from_the_font() {
        let (mut cache, _, _) = cache();
        let font = cache.get_font(20).unwrap();
        assert_eq!(cache.descent(font).unwrap(), -4);
    }

    #[test]
    fn shutdown_destroys_every_texture() {
        let (mut cache, _, _) = cache();
        let mut canvas = RecordingCanvas::new(64, 64);

        let small = cache.get_font(10).unwrap();
        let large = cache.get_font(12).unwrap();
        cache.get_text(&mut canvas, small, "A").unwrap();
        cache.get_text(&mut canvas, small, "B").unwrap();
        cache.get_text(&mut canvas, large, "A").unwrap();
        assert_eq!(canvas.inner.texture_count(), 3);

        cache.shutdown(&mut canvas).unwrap();
        assert_eq!(canvas.inner.texture_count(), 0);
    }
}
