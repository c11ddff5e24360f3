use anyhow::Result;

use crate::{
    canvas::{Canvas, Rect},
    color::Rgba,
    diagnostics::LogSink,
    text::FontCache,
};

pub fn fill_rect(canvas: &mut dyn Canvas, x: i32, y: i32, w: i32, h: i32, color: u32) -> Result<()> {
    canvas.set_draw_color(Rgba::unpack(color))?;
    canvas.fill_rect(Rect::from_signed(x, y, w, h))
}

pub fn stroke_rect(
    canvas: &mut dyn Canvas,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: u32,
) -> Result<()> {
    canvas.set_draw_color(Rgba::unpack(color))?;
    canvas.draw_rect(Rect::from_signed(x, y, w, h))
}

pub fn stroke_line(
    canvas: &mut dyn Canvas,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    color: u32,
) -> Result<()> {
    canvas.set_draw_color(Rgba::unpack(color))?;
    canvas.draw_line(x1, y1, x2, y2)
}

/// Where a `w`x`h` text block goes so that `y` is its baseline.
pub fn text_dest_rect(x: i32, y: i32, w: u32, h: u32, descent: i32) -> Rect {
    let top = y as i64 - h as i64 - descent as i64;
    Rect::new(x, top.clamp(i32::MIN as i64, i32::MAX as i64) as i32, w, h)
}

/// Draws `text` with its baseline at `y`.
///
/// `_color` is accepted but not applied yet: text always comes out in the
/// cache's white foreground.
pub fn fill_text(
    canvas: &mut dyn Canvas,
    cache: &mut FontCache,
    x: i32,
    y: i32,
    text: &str,
    size: u32,
    _color: u32,
) -> Result<()> {
    let font = cache.get_font(size)?;
    let text_ref = cache.get_text(canvas, font, text)?;
    let descent = cache.descent(font)?;
    let entry = cache.text_entry(text_ref)?;

    let src = Rect::new(0, 0, entry.width(), entry.height());
    let dst = text_dest_rect(x, y, entry.width(), entry.height(), descent);
    canvas.copy(entry.texture(), src, dst)
}

pub fn text_width(
    canvas: &mut dyn Canvas,
    cache: &mut FontCache,
    text: &str,
    size: u32,
) -> Result<u32> {
    let font = cache.get_font(size)?;
    cache.width_of(canvas, font, text)
}

/// What the game gets to draw with during `render`.
pub struct Platform<'a> {
    canvas: &'a mut dyn Canvas,
    cache: &'a mut FontCache,
    sink: &'a mut dyn LogSink,
}

impl<'a> Platform<'a> {
    pub fn new(
        canvas: &'a mut dyn Canvas,
        cache: &'a mut FontCache,
        sink: &'a mut dyn LogSink,
    ) -> Self {
        Self {
            canvas,
            cache,
            sink,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) -> Result<()> {
        fill_rect(self.canvas, x, y, w, h, color)
    }

    pub fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) -> Result<()> {
        stroke_rect(self.canvas, x, y, w, h, color)
    }

    pub fn stroke_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: u32) -> Result<()> {
        stroke_line(self.canvas, x1, y1, x2, y2, color)
    }

    pub fn fill_text(&mut self, x: i32, y: i32, text: &str, size: u32, color: u32) -> Result<()> {
        fill_text(self.canvas, self.cache, x, y, text, size, color)
    }

    pub fn text_width(&mut self, text: &str, size: u32) -> Result<u32> {
        text_width(self.canvas, self.cache, text, size)
    }

    pub fn log(&mut self, message: &str) {
        self.sink.log(message);
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::{
        diagnostics::{EnvLogSink, RecordingSink},
        testing::{BlockFontLoader, Command, RecordingCanvas},
    };

    fn cache() -> (FontCache, RecordingSink) {
        let sink = RecordingSink::new();
        (FontCache::new(BlockFontLoader::default(), sink.clone()), sink)
    }

    #[test]
    fn fill_rect_sets_color_then_fills() {
        let mut canvas = RecordingCanvas::new(32, 32);
        fill_rect(&mut canvas, 0, 0, 10, 10, 0x112233FF).unwrap();
        assert_eq!(
            canvas.take(),
            vec![
                Command::SetDrawColor(Rgba::new(0xFF, 0x33, 0x22, 0x11)),
                Command::FillRect(Rect::new(0, 0, 10, 10)),
            ]
        );
        assert_eq!(canvas.draw_color(), Rgba::unpack(0x112233FF));
    }

    #[test]
    fn stroke_rect_and_line_issue_one_draw_each() {
        let mut canvas = RecordingCanvas::new(32, 32);
        stroke_rect(&mut canvas, 1, 2, 3, 4, 0xFF00FF00).unwrap();
        stroke_line(&mut canvas, 0, 0, 5, 7, 0xFFFF0000).unwrap();
        assert_eq!(
            canvas.take(),
            vec![
                Command::SetDrawColor(Rgba::new(0, 0xFF, 0, 0xFF)),
                Command::DrawRect(Rect::new(1, 2, 3, 4)),
                Command::SetDrawColor(Rgba::new(0, 0, 0xFF, 0xFF)),
                Command::DrawLine(0, 0, 5, 7),
            ]
        );
    }

    #[test]
    fn text_top_edge_sits_above_baseline() {
        assert_eq!(text_dest_rect(5, 100, 30, 20, 4), Rect::new(5, 76, 30, 20));
        assert_eq!(text_dest_rect(5, 100, 30, 20, -4), Rect::new(5, 84, 30, 20));
    }

    #[test]
    fn fill_text_blits_cached_texture() {
        let (mut cache, _) = cache();
        let mut canvas = RecordingCanvas::new(64, 64);

        fill_text(&mut canvas, &mut cache, 3, 40, "hi", 20, 0xFFFFFFFF).unwrap();
        let font = cache.get_font(20).unwrap();
        let text_ref = cache.get_text(&mut canvas, font, "hi").unwrap();
        let texture = cache.text(text_ref).unwrap().texture();

        // BlockFont at 20: 10px per char, 20px tall, descent -4
        let commands = canvas.take();
        assert_eq!(
            commands.last(),
            Some(&Command::Copy(
                texture,
                Rect::new(0, 0, 20, 20),
                Rect::new(3, 24, 20, 20)
            ))
        );
        assert_eq!(
            commands
                .iter()
                .filter(|c| matches!(c, Command::Copy(..)))
                .count(),
            1
        );
    }

    #[test]
    fn fill_text_reuses_cache_across_frames() {
        let (mut cache, sink) = cache();
        let mut canvas = RecordingCanvas::new(64, 64);

        for _ in 0..5 {
            fill_text(&mut canvas, &mut cache, 0, 30, "Hello", 12, 0xFFFFFFFF).unwrap();
        }

        assert_eq!(sink.count("new font size 12"), 1);
        assert_eq!(sink.count("new text \"Hello\""), 1);
        let copies = canvas
            .take()
            .into_iter()
            .filter(|c| matches!(c, Command::Copy(..)))
            .count();
        assert_eq!(copies, 5);
    }

    #[test]
    fn fill_text_ignores_color() {
        let (mut cache, sink) = cache();
        let mut canvas = RecordingCanvas::new(64, 64);

        fill_text(&mut canvas, &mut cache, 2, 30, "Hi", 10, 0xFF0000FF).unwrap();
        let red = canvas.inner.pixels().to_vec();
        let red_copy = canvas.take().pop();

        canvas.set_draw_color(Rgba::TRANSPARENT).unwrap();
        canvas.clear().unwrap();
        canvas.take();

        fill_text(&mut canvas, &mut cache, 2, 30, "Hi", 10, 0xFFFF0000).unwrap();
        let commands = canvas.take();

        assert_eq!(canvas.inner.pixels(), &red[..]);
        assert_eq!(canvas.inner.pixel(2, 30), Some(Rgba::WHITE));
        assert_eq!(commands.last(), red_copy.as_ref());
        assert_eq!(commands.len(), 1);
        assert_eq!(sink.count("new text \"Hi\""), 1);
        let font = cache.get_font(10).unwrap();
        assert_eq!(cache.text_count(font), 1);
    }

    #[test]
    fn text_placement_saturates_instead_of_overflowing() {
        assert_eq!(text_dest_rect(0, i32::MIN + 5, 10, 20, -4).y, i32::MIN);
        assert_eq!(text_dest_rect(0, i32::MAX, 10, 0, -4).y, i32::MAX);
        assert_eq!(text_dest_rect(0, i32::MAX, 10, 20, -4).y, i32::MAX - 16);
    }

    #[test]
    fn text_width_does_not_draw() {
        let (mut cache, _) = cache();
        let mut canvas = RecordingCanvas::new(64, 64);

        assert_eq!(text_width(&mut canvas, &mut cache, "abc", 10).unwrap(), 15);
        assert!(!canvas
            .take()
            .iter()
            .any(|c| matches!(c, Command::Copy(..) | Command::FillRect(_))));
    }

    #[test]
    fn negative_sizes_draw_nothing() {
        let mut canvas = RecordingCanvas::new(8, 8);
        fill_rect(&mut canvas, 2, 2, -3, 4, 0xFFFFFFFF).unwrap();
        assert!(canvas.inner.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn platform_forwards_to_adapter() {
        let (mut cache, sink) = cache();
        let mut canvas = RecordingCanvas::new(64, 64);
        let mut log = sink.clone();

        {
            let mut platform = Platform::new(&mut canvas, &mut cache, &mut log);
            assert_eq!(platform.size(), (64, 64));
            platform.fill_rect(0, 0, 4, 4, 0xFF0000FF).unwrap();
            assert_eq!(platform.text_width("ok", 10).unwrap(), 10);
            platform.fill_text(0, 20, "ok", 10, 0).unwrap();
            platform.log("score 3");
        }

        assert_eq!(sink.count("score 3"), 1);
        assert_eq!(canvas.inner.pixel(0, 0), Some(Rgba::new(0xFF, 0, 0, 0xFF)));

        let mut env = EnvLogSink;
        Platform::new(&mut canvas, &mut cache, &mut env).log("to the log facade");
    }
}
