use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{anyhow, Context, Result};

/// Raw bytes of a file read from disk. Cheap to clone, the bytes are shared.
#[derive(Clone, Debug)]
pub struct Asset {
    pub bytes: Rc<[u8]>,
}

/// Reads files once and hands out the same bytes for every later request of that path.
#[derive(Default)]
pub struct Loader {
    assets: HashMap<PathBuf, Asset>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            assets: HashMap::new(),
        }
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Result<Asset> {
        let path = path.as_ref();
        self.assets
            .get(path)
            .cloned()
            .ok_or(anyhow!("Asset {} hasn't been loaded.", path.display()))
    }

    pub fn is_loaded<P: AsRef<Path>>(&self, path: P) -> bool {
        self.assets.contains_key(path.as_ref())
    }

    /// Loads `path` if it isn't cached yet and returns its bytes.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<Asset> {
        let path = path.as_ref();
        if let Some(asset) = self.assets.get(path) {
            return Ok(asset.clone());
        }

        let file = File::open(path)
            .with_context(|| format!("Couldn't open asset {}", path.display()))?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .with_context(|| format!("Couldn't read asset {}", path.display()))?;
        log::debug!("loaded asset {} ({} bytes)", path.display(), bytes.len());

        let asset = Asset {
            bytes: bytes.into(),
        };
        self.assets.insert(path.to_path_buf(), asset.clone());
        Ok(asset)
    }
}
