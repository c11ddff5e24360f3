pub mod canvas;
pub mod color;
pub mod diagnostics;
pub mod draw;
pub mod input;
pub mod render;
pub mod software;
pub mod text;
pub mod texture;
pub mod window;

#[cfg(test)]
mod testing;

pub use winit::keyboard::{Key, NamedKey};

// how the pieces fit:
// - `window` owns the loop, the window, the presenter, the canvas and the font cache
// - the game only ever sees `draw::Platform` during render
// - `draw` turns rect/line/text requests into canvas calls, text goes through `text::FontCache`
// - `software::SoftwareCanvas` rasterizes on the cpu and `render::Render` puts the result on screen
//
// a different backend only needs a `canvas::Canvas` and a `text::FontLoader`.
