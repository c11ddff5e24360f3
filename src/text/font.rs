use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, ensure, Context, Result};
use fontdue::{
    layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle},
    FontSettings,
};
use pixplat_asset::Loader;

use crate::{color::Rgba, texture::Bitmap};

/// A typeface opened at one point size.
pub trait Font {
    fn size(&self) -> u32;

    /// Distance from the baseline to the bottom of the line. Negative, as TTF reports it.
    fn descent(&self) -> i32;

    /// Line height: ascent minus descent.
    fn height(&self) -> u32;

    /// Rasterizes `text` as a single line, antialiased and tinted with `fg`.
    /// Line breaks don't start a new line, they render as spaces.
    fn render_blended(&self, text: &str, fg: Rgba) -> Result<Bitmap>;
}

/// Opens the configured typeface at a given size.
pub trait FontLoader {
    fn open(&mut self, size: u32) -> Result<Box<dyn Font>>;
}

pub struct FontdueFont {
    font: fontdue::Font,
    size: u32,
    ascent: f32,
    descent: f32,
}

impl FontdueFont {
    pub fn from_bytes(bytes: &[u8], size: u32) -> Result<Self> {
        ensure!(size > 0, "Invalid font size {}", size);
        let px = size as f32;
        let font = fontdue::Font::from_bytes(
            bytes,
            FontSettings {
                scale: px,
                ..FontSettings::default()
            },
        )
        .map_err(|err| anyhow!(err))?;
        let metrics = font
            .horizontal_line_metrics(px)
            .ok_or(anyhow!("Font has no horizontal line metrics"))?;

        Ok(Self {
            font,
            size,
            ascent: metrics.ascent,
            descent: metrics.descent,
        })
    }

    fn px(&self) -> f32 {
        self.size as f32
    }
}

impl Font for FontdueFont {
    fn size(&self) -> u32 {
        self.size
    }

    fn descent(&self) -> i32 {
        self.descent.round() as i32
    }

    fn height(&self) -> u32 {
        (self.ascent - self.descent).ceil().max(0.0) as u32
    }

    fn render_blended(&self, text: &str, fg: Rgba) -> Result<Bitmap> {
        let px = self.px();
        let mut layout: Layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[&self.font], &TextStyle::new(&single_line(text), px, 0));

        // pen position after the last glyph, or the ink extent if that's wider
        let width = layout
            .glyphs()
            .iter()
            .map(|glyph| {
                let metrics = self.font.metrics_indexed(glyph.key.glyph_index, px);
                let pen = glyph.x - metrics.xmin as f32 + metrics.advance_width;
                pen.max(glyph.x + glyph.width as f32)
            })
            .fold(0.0f32, f32::max)
            .ceil() as u32;
        let height = self.height();
        ensure!(width > 0, "Text \"{}\" has zero width", text);

        let mut coverage = vec![0u8; width as usize * height as usize];
        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (metrics, mask) = self.font.rasterize_config(glyph.key);
            let gx = glyph.x.round() as i64;
            let gy = glyph.y.round() as i64;
            for row in 0..metrics.height {
                let y = gy + row as i64;
                if y < 0 || y >= height as i64 {
                    continue;
                }
                for col in 0..metrics.width {
                    let x = gx + col as i64;
                    if x < 0 || x >= width as i64 {
                        continue;
                    }
                    let dst = &mut coverage[y as usize * width as usize + x as usize];
                    *dst = (*dst).max(mask[row * metrics.width + col]);
                }
            }
        }

        Bitmap::from_coverage(width, height, &coverage, fg)
    }
}

/// The bitmap is one line tall, so nothing may make fontdue wrap.
fn single_line(text: &str) -> Cow<'_, str> {
    let is_break = |c: char| c == '\n' || c == '\r';
    if text.contains(is_break) {
        Cow::Owned(text.replace(is_break, " "))
    } else {
        Cow::Borrowed(text)
    }
}

/// Opens one typeface file at whatever size is asked for.
/// The file is read on the first `open` and the bytes reused afterwards.
pub struct FontdueLoader {
    path: PathBuf,
    assets: Loader,
}

impl FontdueLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            assets: Loader::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FontLoader for FontdueLoader {
    fn open(&mut self, size: u32) -> Result<Box<dyn Font>> {
        let asset = self.assets.load(&self.path)?;
        let font = FontdueFont::from_bytes(&asset.bytes, size)
            .with_context(|| format!("Couldn't open {} at size {}", self.path.display(), size))?;
        Ok(Box::new(font))
    }
}
