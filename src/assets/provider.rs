use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::assets::decode::{decode_image, decode_svg, premultiply_rgba8_in_place};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{PromoError, PromoResult};

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Raster {
    /// Wrap already-premultiplied bytes.
    pub fn from_premul_rgba8(width: u32, height: u32, bytes: Vec<u8>) -> PromoResult<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if width == 0 || height == 0 {
            return Err(PromoError::validation("raster width/height must be > 0"));
        }
        if bytes.len() != expected {
            return Err(PromoError::validation(format!(
                "raster byte len {} does not match {width}x{height}",
                bytes.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(bytes),
        })
    }

    /// Premultiply straight-alpha bytes.
    pub fn from_straight_rgba8(width: u32, height: u32, mut bytes: Vec<u8>) -> PromoResult<Self> {
        premultiply_rgba8_in_place(&mut bytes);
        Self::from_premul_rgba8(width, height, bytes)
    }

    /// Uniformly colored raster.
    pub fn solid(width: u32, height: u32, color: Rgba8) -> PromoResult<Self> {
        let px = color.to_premul();
        let bytes = px.repeat((width as usize).saturating_mul(height as usize));
        Self::from_premul_rgba8(width, height, bytes)
    }
}

/// Source of decoded rasters (logo, product cutout, ...).
///
/// `None` is the not-found signal. Implementations must not panic on unknown identifiers; any
/// fetch or decode retry policy lives behind this trait.
pub trait AssetProvider: Send + Sync {
    /// Look up a raster by identifier.
    fn get_raster(&self, id: &str) -> Option<Arc<Raster>>;
}

/// In-memory asset map, mostly for tests and for callers that fetch assets themselves.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssets {
    rasters: HashMap<String, Arc<Raster>>,
}

impl MemoryAssets {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decoded raster under `id`, replacing any previous entry.
    pub fn insert(&mut self, id: impl Into<String>, raster: Raster) -> &mut Self {
        self.rasters.insert(id.into(), Arc::new(raster));
        self
    }

    /// Decode encoded image bytes and register them under `id`.
    pub fn insert_encoded(
        &mut self,
        id: impl Into<String>,
        bytes: &[u8],
    ) -> PromoResult<&mut Self> {
        let raster = decode_image(bytes)?;
        Ok(self.insert(id, raster))
    }

    /// Number of registered rasters.
    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }
}

impl AssetProvider for MemoryAssets {
    fn get_raster(&self, id: &str) -> Option<Arc<Raster>> {
        self.rasters.get(id).cloned()
    }
}

/// Assets read from files below a root directory; identifiers are relative paths.
///
/// Decoded results (including failures) are cached for the lifetime of the provider.
#[derive(Debug)]
pub struct DirAssets {
    root: PathBuf,
    cache: Mutex<HashMap<String, Option<Arc<Raster>>>>,
}

impl DirAssets {
    /// Provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load(&self, id: &str) -> PromoResult<Raster> {
        let norm = normalize_rel_path(id)?;
        let path = self.root.join(Path::new(&norm));
        let bytes = std::fs::read(&path).map_err(|e| {
            PromoError::missing_asset(format!("failed to read asset '{}': {e}", path.display()))
        })?;
        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        if is_svg {
            decode_svg(&bytes)
        } else {
            decode_image(&bytes)
        }
    }
}

impl AssetProvider for DirAssets {
    fn get_raster(&self, id: &str) -> Option<Arc<Raster>> {
        let Ok(mut cache) = self.cache.lock() else {
            tracing::warn!(asset = id, "asset cache poisoned");
            return None;
        };
        if let Some(hit) = cache.get(id) {
            return hit.clone();
        }
        let loaded = match self.load(id) {
            Ok(raster) => Some(Arc::new(raster)),
            Err(err) => {
                tracing::warn!(asset = id, error = %err, "asset unavailable");
                None
            }
        };
        cache.insert(id.to_owned(), loaded.clone());
        loaded
    }
}

/// Normalize and validate provider-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> PromoResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PromoError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(PromoError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PromoError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PromoError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/provider.rs"]
mod tests;
