//! Directory-backed texture libraries.
//!
//! A library enumerates one directory, decodes every image it can, and
//! exposes the results as an indexed list. Undecodable files and images
//! larger than the device's 2D texture limit are logged and skipped, so a
//! bad asset only shrinks the selectable set.

use std::path::{Path, PathBuf};

use crate::gpu::render_context::RenderContext;

/// An image decoded to tightly packed RGBA8, flipped so row 0 is the bottom.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// File stem, used as the display name.
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

/// Decode one image file.
///
/// # Errors
///
/// Returns the decoder's error for unreadable or unsupported files.
pub fn decode_image(path: &Path) -> Result<DecodedImage, image::ImageError> {
    let image = image::open(path)?.flipv().to_rgba8();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("texture")
        .to_owned();
    Ok(DecodedImage {
        name,
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

/// Decode every image in `dir`, sorted by file name. Missing directories
/// yield an empty list; undecodable files are skipped with a warning.
pub fn scan_directory(dir: &Path) -> Vec<DecodedImage> {
    let mut paths: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect(),
        Err(e) => {
            log::debug!("texture directory {} unavailable: {e}", dir.display());
            return Vec::new();
        }
    };
    paths.sort();

    paths
        .iter()
        .filter_map(|path| match decode_image(path) {
            Ok(image) => Some(image),
            Err(e) => {
                log::warn!("skipping texture {}: {e}", path.display());
                None
            }
        })
        .collect()
}

/// A GPU texture uploaded from a [`DecodedImage`].
pub struct LibraryTexture {
    /// Display name (file stem).
    pub name: String,
    /// The GPU texture.
    pub texture: wgpu::Texture,
    /// Full view of the texture.
    pub view: wgpu::TextureView,
}

/// Texture format of every library texture.
pub const LIBRARY_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba8Unorm;

/// Indexed set of textures plus a 1x1 fallback for empty libraries.
pub struct TextureLibrary {
    label: &'static str,
    textures: Vec<LibraryTexture>,
    fallback: LibraryTexture,
}

impl TextureLibrary {
    /// Load every decodable image under `dir`. `fallback` is the RGBA color
    /// of the 1x1 texture used when nothing loads.
    pub fn load(
        context: &RenderContext,
        label: &'static str,
        dir: &Path,
        fallback: [u8; 4],
    ) -> Self {
        let images = scan_directory(dir);
        let library = Self::from_images(context, label, &images, fallback);
        log::info!(
            "{label} library: {} texture(s) from {}",
            library.len(),
            dir.display()
        );
        library
    }

    /// Upload already-decoded images, leaving out any the device cannot
    /// hold.
    pub fn from_images(
        context: &RenderContext,
        label: &'static str,
        images: &[DecodedImage],
        fallback: [u8; 4],
    ) -> Self {
        let max_dimension = context.device.limits().max_texture_dimension_2d;
        let textures = uploadable(images, max_dimension)
            .map(|image| upload(context, label, image))
            .collect();
        let fallback = upload(
            context,
            label,
            &DecodedImage {
                name: "fallback".to_owned(),
                width: 1,
                height: 1,
                rgba: fallback.to_vec(),
            },
        );
        Self {
            label,
            textures,
            fallback,
        }
    }

    /// Number of loaded textures (the fallback is not counted).
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether nothing loaded.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Library label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Names of the loaded textures, in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.textures.iter().map(|t| t.name.as_str())
    }

    /// View of texture `index`, clamped to the library; the fallback when
    /// the library is empty.
    pub fn view(&self, index: usize) -> &wgpu::TextureView {
        clamp_index(index, self.textures.len())
            .map_or(&self.fallback.view, |i| &self.textures[i].view)
    }
}

/// Clamp a selection index into `0..len`, `None` for an empty library.
pub fn clamp_index(index: usize, len: usize) -> Option<usize> {
    (len > 0).then(|| index.min(len - 1))
}

/// Images whose sides are non-zero and at most `max_dimension`; the rest are
/// skipped with a warning.
pub fn uploadable(
    images: &[DecodedImage],
    max_dimension: u32,
) -> impl Iterator<Item = &DecodedImage> {
    images.iter().filter(move |image| {
        let fits = (1..=max_dimension).contains(&image.width)
            && (1..=max_dimension).contains(&image.height);
        if !fits {
            log::warn!(
                "skipping texture {}: {}x{} exceeds the {max_dimension} texel limit",
                image.name,
                image.width,
                image.height
            );
        }
        fits
    })
}

fn upload(
    context: &RenderContext,
    label: &str,
    image: &DecodedImage,
) -> LibraryTexture {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&format!("{label} {}", image.name)),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: LIBRARY_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    context.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.width * 4),
            rows_per_image: Some(image.height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    LibraryTexture {
        name: image.name.clone(),
        texture,
        view,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "dynasurf-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn decode_flips_rows() {
        let dir = temp_dir("flip");
        let path = dir.join("stripe.png");
        let mut img = image::RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        img.save(&path).unwrap();

        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.name, "stripe");
        assert_eq!((decoded.width, decoded.height), (1, 2));
        // Bottom row (blue) now comes first.
        assert_eq!(&decoded.rgba[0..4], &[0, 0, 255, 255]);
        assert_eq!(&decoded.rgba[4..8], &[255, 0, 0, 255]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn undecodable_files_are_skipped() {
        let dir = temp_dir("skip");
        image::RgbaImage::new(2, 2).save(dir.join("a.png")).unwrap();
        std::fs::write(dir.join("b.png"), b"not an image").unwrap();
        image::RgbaImage::new(4, 4).save(dir.join("c.png")).unwrap();

        let images = scan_directory(&dir);
        let names: Vec<&str> =
            images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn oversized_images_are_skipped() {
        let image = |name: &str, width, height| DecodedImage {
            name: name.to_owned(),
            width,
            height,
            rgba: Vec::new(),
        };
        let images = [
            image("small", 64, 32),
            image("wide", 16384, 8192),
            image("edge", 8192, 8192),
            image("tall", 1, 8193),
            image("empty", 0, 4),
        ];

        let names: Vec<&str> = uploadable(&images, 8192)
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["small", "edge"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = std::env::temp_dir().join("dynasurf-does-not-exist-42");
        assert!(scan_directory(&dir).is_empty());
    }

    #[test]
    fn selection_index_is_clamped() {
        assert_eq!(clamp_index(0, 0), None);
        assert_eq!(clamp_index(5, 0), None);
        assert_eq!(clamp_index(1, 3), Some(1));
        assert_eq!(clamp_index(9, 3), Some(2));
    }
}
