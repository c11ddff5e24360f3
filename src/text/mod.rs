// text is rasterized a whole string at a time and cached forever:
// - one font per point size, opened on first use
// - per font, one bitmap + texture per exact string
// nothing is ever evicted. a score counter makes one entry per value it shows.

pub mod font;
pub mod font_cache;
pub mod text_cache;

pub use font::{Font, FontLoader, FontdueFont, FontdueLoader};
pub use font_cache::{FontCache, FontEntry, FontRef};
pub use text_cache::{TextCache, TextEntry, TextRef};
