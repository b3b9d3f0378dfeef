//! Sprite catalog
//!
//! Holds every sliceable sprite, knows which ones are hazards, and keeps a
//! memoized table of resized variants keyed by `(sprite, size)`.

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ResizeError, ResourceInitError};

/// Marker in a sprite file name that flags it as a hazard
pub const HAZARD_MARKER: &str = "bomb";

/// Sprite file extension picked up by [`Catalog::load`]
pub const SPRITE_EXTENSION: &str = "png";

/// Index of a sprite inside its catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteId(pub u32);

/// Composite cache key for resized sprites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteKey {
    pub id: SpriteId,
    pub size: u32,
}

/// RGBA8 bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, 4 bytes per pixel
    pub pixels: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Solid-colour square, handy for placeholder sprites
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = (width * height) as usize;
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self::new(width, height, pixels)
    }

    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Nearest-neighbour resample to `width` x `height`
    pub fn resized(&self, width: u32, height: u32) -> Result<Bitmap, ResizeError> {
        if width == 0 || height == 0 {
            return Err(ResizeError::EmptyTarget { width, height });
        }
        let expected = self.expected_len();
        if self.pixels.len() != expected || expected == 0 {
            return Err(ResizeError::MalformedSource {
                expected,
                actual: self.pixels.len(),
            });
        }

        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            let src_y = (y as u64 * self.height as u64 / height as u64) as usize;
            for x in 0..width {
                let src_x = (x as u64 * self.width as u64 / width as u64) as usize;
                let i = (src_y * self.width as usize + src_x) * 4;
                pixels.extend_from_slice(&self.pixels[i..i + 4]);
            }
        }
        Ok(Bitmap::new(width, height, pixels))
    }
}

/// Turns sprite file bytes into a bitmap
pub trait SpriteDecoder {
    fn decode(&self, bytes: &[u8]) -> Option<Bitmap>;
}

/// PNG sprites. Palette, greyscale and 16-bit images come out as RGBA8.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngDecoder;

impl SpriteDecoder for PngDecoder {
    fn decode(&self, bytes: &[u8]) -> Option<Bitmap> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = match decoder.read_info() {
            Ok(reader) => reader,
            Err(e) => {
                log::debug!("png header: {}", e);
                return None;
            }
        };
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = match reader.next_frame(&mut buf) {
            Ok(info) => info,
            Err(e) => {
                log::debug!("png data: {}", e);
                return None;
            }
        };
        buf.truncate(info.buffer_size());
        let pixels = to_rgba8(&buf, info.color_type)?;
        Some(Bitmap::new(info.width, info.height, pixels))
    }
}

fn to_rgba8(data: &[u8], color: png::ColorType) -> Option<Vec<u8>> {
    use png::ColorType;
    let pixels = match color {
        ColorType::Rgba => data.to_vec(),
        ColorType::Rgb => data
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        ColorType::Grayscale => data.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        // EXPAND turns palettes into RGB(A)
        ColorType::Indexed => return None,
    };
    Some(pixels)
}

/// A named sprite before it enters the catalog
#[derive(Debug, Clone)]
pub struct SpriteAsset {
    pub name: String,
    pub bitmap: Bitmap,
}

impl SpriteAsset {
    pub fn new(name: impl Into<String>, bitmap: Bitmap) -> Self {
        Self {
            name: name.into(),
            bitmap,
        }
    }
}

#[derive(Debug, Clone)]
struct Sprite {
    name: String,
    is_hazard: bool,
    bitmap: Bitmap,
}

/// Loaded sprites plus the resize cache
#[derive(Debug, Clone)]
pub struct Catalog {
    sprites: Vec<Sprite>,
    cache: HashMap<SpriteKey, Bitmap>,
}

/// File-name convention for hazards
pub fn is_hazard_name(name: &str) -> bool {
    name.to_lowercase().contains(HAZARD_MARKER)
}

impl Catalog {
    /// Load every `.png` in `dir`, in file-name order
    pub fn load(dir: &Path, decoder: &dyn SpriteDecoder) -> Result<Self, ResourceInitError> {
        let entries = fs::read_dir(dir).map_err(|source| ResourceInitError::SpriteDir {
            dir: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(SPRITE_EXTENSION))
            })
            .collect();
        paths.sort();

        let mut assets = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let bitmap = fs::read(&path).ok().and_then(|bytes| decoder.decode(&bytes));
            match bitmap {
                Some(bitmap) => assets.push(SpriteAsset::new(name, bitmap)),
                None => log::warn!("Skipping undecodable sprite {}", path.display()),
            }
        }

        Self::build(assets).ok_or_else(|| ResourceInitError::EmptyCatalog {
            dir: dir.to_path_buf(),
        })
    }

    /// Build from in-memory sprites
    pub fn from_assets(assets: Vec<SpriteAsset>) -> Result<Self, ResourceInitError> {
        Self::build(assets).ok_or_else(|| ResourceInitError::EmptyCatalog {
            dir: "<memory>".into(),
        })
    }

    fn build(assets: Vec<SpriteAsset>) -> Option<Self> {
        if assets.is_empty() {
            return None;
        }
        let sprites: Vec<Sprite> = assets
            .into_iter()
            .map(|a| Sprite {
                is_hazard: is_hazard_name(&a.name),
                name: a.name,
                bitmap: a.bitmap,
            })
            .collect();
        log::info!(
            "Catalog loaded: {} sprites ({} hazards)",
            sprites.len(),
            sprites.iter().filter(|s| s.is_hazard).count()
        );
        Some(Self {
            sprites,
            cache: HashMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn name(&self, id: SpriteId) -> Option<&str> {
        self.sprites.get(id.0 as usize).map(|s| s.name.as_str())
    }

    pub fn is_hazard(&self, id: SpriteId) -> bool {
        self.sprites.get(id.0 as usize).is_some_and(|s| s.is_hazard)
    }

    /// Unscaled sprite
    pub fn original(&self, id: SpriteId) -> Option<&Bitmap> {
        self.sprites.get(id.0 as usize).map(|s| &s.bitmap)
    }

    /// Uniformly random sprite
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> SpriteId {
        SpriteId(rng.random_range(0..self.sprites.len()) as u32)
    }

    /// Square `size` x `size` variant of a sprite, memoized.
    ///
    /// Falls back to the unscaled original when resampling fails. Returns
    /// `None` only for an id that is not in this catalog.
    pub fn resize(&mut self, id: SpriteId, size: u32) -> Option<&Bitmap> {
        let sprite = self.sprites.get(id.0 as usize)?;
        let key = SpriteKey { id, size };
        let bitmap = self.cache.entry(key).or_insert_with(|| {
            sprite.bitmap.resized(size, size).unwrap_or_else(|err| {
                log::warn!("Resize of '{}' to {} failed ({}), using original", sprite.name, size, err);
                sprite.bitmap.clone()
            })
        });
        Some(bitmap)
    }

    /// Number of memoized variants
    pub fn cached_variants(&self) -> usize {
        self.cache.len()
    }
}
