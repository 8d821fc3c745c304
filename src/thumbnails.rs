// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Location image cache and texture loading.
//!
//! Images referenced by records are either local paths or http(s) URLs.
//! Remote images are downloaded on a background thread and stored on disk
//! under SHA256-based filenames; each image becomes two egui textures, a list
//! thumbnail and a larger popup preview.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// List thumbnail bounds in pixels
pub const THUMBNAIL_SIZE: [u32; 2] = [48, 32];
/// Popup preview bounds in pixels
pub const PREVIEW_SIZE: [u32; 2] = [240, 160];

/// Textures decoded from one image
#[derive(Clone)]
pub struct ImageTextures {
    pub thumbnail: egui::TextureHandle,
    pub preview: egui::TextureHandle,
}

impl std::fmt::Debug for ImageTextures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageTextures")
            .field("thumbnail", &self.thumbnail.id())
            .field("preview", &self.preview.id())
            .finish()
    }
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Disk cache for downloaded images
#[derive(Debug, Clone)]
pub struct ImageCache {
    cache_dir: PathBuf,
}

impl ImageCache {
    pub fn new() -> Result<Self, BoxError> {
        let cache_dir = dirs::cache_dir()
            .ok_or("Could not determine cache directory")?
            .join("poi-map")
            .join("images");

        fs::create_dir_all(&cache_dir)?;

        Ok(Self { cache_dir })
    }

    /// Get cache file path for a given URL
    fn get_cache_path(&self, url: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        self.cache_dir.join(format!("{hash}.{}", cache_extension(url)))
    }

    /// Get cached image bytes
    pub fn get_cached_bytes(&self, url: &str) -> Option<Vec<u8>> {
        fs::read(self.get_cache_path(url)).ok()
    }

    /// Download and cache an image
    pub async fn download_and_cache(&self, url: &str) -> Result<Vec<u8>, BoxError> {
        let response = reqwest::get(url).await?;

        if !response.status().is_success() {
            return Err(format!("HTTP error: {}", response.status()).into());
        }

        let bytes = response.bytes().await?.to_vec();
        fs::write(self.get_cache_path(url), &bytes)?;

        Ok(bytes)
    }
}

/// File extension for a cached URL, ignoring query strings
fn cache_extension(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.len() <= 4 && !ext.contains('/') => ext,
        _ => "img",
    }
}

/// Loads record images into egui textures
pub struct ImageTextureManager {
    cache: Option<ImageCache>,
    textures: Arc<Mutex<HashMap<String, ImageTextures>>>,
    loading: Arc<Mutex<HashSet<String>>>,
    failed: Arc<Mutex<HashSet<String>>>,
}

impl std::fmt::Debug for ImageTextureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageTextureManager")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ImageTextureManager {
    pub fn new() -> Self {
        let cache = match ImageCache::new() {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!("Image disk cache disabled: {e}");
                None
            }
        };
        Self {
            cache,
            textures: Arc::new(Mutex::new(HashMap::new())),
            loading: Arc::new(Mutex::new(HashSet::new())),
            failed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Get textures for an image reference, starting a load if needed.
    /// Returns `None` while loading or when the image cannot be decoded.
    pub fn get_or_load(&self, ctx: &egui::Context, reference: &str) -> Option<ImageTextures> {
        if let Some(textures) = lock(&self.textures).get(reference) {
            return Some(textures.clone());
        }
        if lock(&self.failed).contains(reference) || !lock(&self.loading).insert(reference.to_string()) {
            return None;
        }

        if !is_remote(reference) {
            let result = fs::read(reference).map_err(BoxError::from);
            self.finish(ctx, reference, result);
            return lock(&self.textures).get(reference).cloned();
        }

        if let Some(bytes) = self.cache.as_ref().and_then(|c| c.get_cached_bytes(reference)) {
            self.finish(ctx, reference, Ok(bytes));
            return lock(&self.textures).get(reference).cloned();
        }

        // Download in background thread
        let worker = self.clone_handles();
        let cache = self.cache.clone();
        let url = reference.to_string();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(async {
                    match cache {
                        Some(cache) => cache.download_and_cache(&url).await,
                        None => download(&url).await,
                    }
                }),
                Err(e) => Err(e.into()),
            };
            worker.finish(&ctx, &url, result);
            ctx.request_repaint();
        });

        None
    }

    fn clone_handles(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            textures: Arc::clone(&self.textures),
            loading: Arc::clone(&self.loading),
            failed: Arc::clone(&self.failed),
        }
    }

    fn finish(&self, ctx: &egui::Context, reference: &str, bytes: Result<Vec<u8>, BoxError>) {
        let decoded = bytes.and_then(|b| load_textures(ctx, &b, reference));
        match decoded {
            Ok(textures) => {
                debug!("Loaded image {reference}");
                lock(&self.textures).insert(reference.to_string(), textures);
            }
            Err(e) => {
                warn!("Failed to load image {reference}: {e}");
                lock(&self.failed).insert(reference.to_string());
            }
        }
        lock(&self.loading).remove(reference);
    }
}

impl Default for ImageTextureManager {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

async fn download(url: &str) -> Result<Vec<u8>, BoxError> {
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(format!("HTTP error: {}", response.status()).into());
    }
    Ok(response.bytes().await?.to_vec())
}

fn to_color_image(image: &image::DynamicImage, bounds: [u32; 2]) -> egui::ColorImage {
    let resized = image.resize(bounds[0], bounds[1], image::imageops::FilterType::Lanczos3);
    let rgba = resized.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}

fn load_textures(
    ctx: &egui::Context,
    bytes: &[u8],
    reference: &str,
) -> Result<ImageTextures, BoxError> {
    let image = image::load_from_memory(bytes)?;
    Ok(ImageTextures {
        thumbnail: ctx.load_texture(
            format!("thumb_{reference}"),
            to_color_image(&image, THUMBNAIL_SIZE),
            egui::TextureOptions::LINEAR,
        ),
        preview: ctx.load_texture(
            format!("preview_{reference}"),
            to_color_image(&image, PREVIEW_SIZE),
            egui::TextureOptions::LINEAR,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_extension() {
        assert_eq!(cache_extension("https://example.com/a/photo.jpg"), "jpg");
        assert_eq!(cache_extension("https://example.com/a/photo.png?w=320"), "png");
        assert_eq!(cache_extension("https://example.com/a/photo"), "img");
        assert_eq!(cache_extension("https://example.com/a.b/photo"), "img");
    }

    #[test]
    fn test_remote_detection() {
        assert!(is_remote("https://example.com/x.jpg"));
        assert!(is_remote("http://example.com/x.jpg"));
        assert!(!is_remote("data/img/x.jpg"));
    }

    #[test]
    fn test_thumbnail_fits_bounds() {
        let image = image::DynamicImage::new_rgba8(400, 200);
        let color = to_color_image(&image, THUMBNAIL_SIZE);
        assert_eq!(color.size, [48, 24]);
    }
}
