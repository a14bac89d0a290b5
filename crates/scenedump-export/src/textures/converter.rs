//! Texture to image file converter

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::{DynamicImage, ImageFormat as ImgFormat, RgbaImage};
use scenedump_core::{Error as CoreError, Texture};
use tracing::{info, warn};

use crate::textures::{TextureError, TextureResult};

/// Output image container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// TGA format (uncompressed truecolor, the default)
    Tga,
    /// PNG format (lossless, good compression)
    Png,
    /// BMP format (lossless, no compression)
    Bmp,
    /// JPEG format (lossy, alpha is dropped)
    Jpeg { quality: u8 },
}

impl ImageFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Tga => "tga",
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Jpeg { .. } => "jpg",
        }
    }

    /// Look up a format by file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "tga" => Some(ImageFormat::Tga),
            "png" => Some(ImageFormat::Png),
            "bmp" => Some(ImageFormat::Bmp),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg { quality: 90 }),
            _ => None,
        }
    }

    /// Whether an encoder for this container was compiled in
    pub fn has_encoder(&self) -> bool {
        match self {
            ImageFormat::Tga => cfg!(feature = "tga"),
            ImageFormat::Png => cfg!(feature = "png"),
            ImageFormat::Bmp => cfg!(feature = "bmp"),
            ImageFormat::Jpeg { .. } => cfg!(feature = "jpeg"),
        }
    }

    /// Convert to image crate's format
    fn to_img_format(self) -> ImgFormat {
        match self {
            ImageFormat::Tga => ImgFormat::Tga,
            ImageFormat::Png => ImgFormat::Png,
            ImageFormat::Bmp => ImgFormat::Bmp,
            ImageFormat::Jpeg { .. } => ImgFormat::Jpeg,
        }
    }
}

impl Default for ImageFormat {
    fn default() -> Self {
        ImageFormat::Tga
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Tga => "TGA",
            ImageFormat::Png => "PNG",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Jpeg { .. } => "JPEG",
        };
        f.write_str(name)
    }
}

impl FromStr for ImageFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageFormat::from_extension(s).ok_or_else(|| CoreError::unsupported_format(s))
    }
}

/// Texture export options
#[derive(Debug, Clone, Default)]
pub struct TextureExportOptions {
    /// Output format
    pub format: ImageFormat,

    /// Flip Y axis (bottom-up source data)
    pub flip_y: bool,
}

/// Why a texture was not written
#[derive(Debug)]
pub enum SkipReason {
    /// Texture export was switched off for this dump
    Disabled,
    /// No encoder available for the requested container
    NoEncoder(ImageFormat),
    /// Pixel data could not be turned into an image buffer
    Conversion(TextureError),
    /// Destination could not be created or written
    Write(TextureError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => write!(f, "texture export disabled"),
            SkipReason::NoEncoder(format) => {
                write!(f, "No writer for {format} file format available")
            }
            SkipReason::Conversion(err) => write!(f, "cannot convert pixel data: {err}"),
            SkipReason::Write(err) => write!(f, "failed to write: {err}"),
        }
    }
}

/// Result of exporting a single texture
#[derive(Debug)]
pub enum ExportOutcome {
    Written { path: PathBuf },
    Skipped { path: PathBuf, reason: SkipReason },
}

impl ExportOutcome {
    /// Destination the texture was (or would have been) written to
    pub fn path(&self) -> &Path {
        match self {
            ExportOutcome::Written { path } | ExportOutcome::Skipped { path, .. } => path,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, ExportOutcome::Written { .. })
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            ExportOutcome::Written { .. } => None,
            ExportOutcome::Skipped { reason, .. } => Some(reason),
        }
    }
}

/// Convert a scene texture into an RGBA8 image buffer
///
/// Compressed textures are decoded using their format hint, falling back
/// to content sniffing when the hint is empty or unknown.
pub fn texture_to_image(texture: &Texture) -> TextureResult<RgbaImage> {
    match texture {
        Texture::Texels { width, height, rgba } => {
            let (width, height) = (*width, *height);
            if width == 0 || height == 0 {
                return Err(TextureError::InvalidDimensions { width, height });
            }

            let expected = width as usize * height as usize * 4;
            if rgba.len() != expected {
                return Err(TextureError::SizeMismatch {
                    expected,
                    actual: rgba.len(),
                });
            }

            RgbaImage::from_raw(width, height, rgba.clone()).ok_or(TextureError::SizeMismatch {
                expected,
                actual: rgba.len(),
            })
        }
        Texture::Compressed { format_hint, data } => {
            let decoded = match ImgFormat::from_extension(format_hint) {
                Some(format) => image::load_from_memory_with_format(data, format)?,
                None => image::load_from_memory(data)?,
            };
            Ok(decoded.to_rgba8())
        }
    }
}

/// Writes scene textures to image files
pub struct TextureExporter {
    options: TextureExportOptions,
}

impl TextureExporter {
    /// Create new exporter with default options (TGA output)
    pub fn new() -> Self {
        Self {
            options: TextureExportOptions::default(),
        }
    }

    /// Create exporter with custom options
    pub fn with_options(options: TextureExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TextureExportOptions {
        &self.options
    }

    /// Export one texture to `path`
    ///
    /// Never fails: every problem is logged and returned as
    /// [`ExportOutcome::Skipped`]. The encoder check happens before the
    /// destination is touched.
    pub fn export(&self, texture: &Texture, path: &Path) -> ExportOutcome {
        let format = self.options.format;
        if !format.has_encoder() {
            return skipped(path, SkipReason::NoEncoder(format));
        }

        let mut img = match texture_to_image(texture) {
            Ok(img) => img,
            Err(err) => return skipped(path, SkipReason::Conversion(err)),
        };

        if self.options.flip_y {
            image::imageops::flip_vertical_in_place(&mut img);
        }

        match self.write_image(img, path) {
            Ok(()) => {
                info!("{} has been written", path.display());
                ExportOutcome::Written {
                    path: path.to_path_buf(),
                }
            }
            Err(err) => skipped(path, SkipReason::Write(err)),
        }
    }

    /// Write image to file
    fn write_image(&self, img: RgbaImage, output_path: &Path) -> TextureResult<()> {
        let dynamic_img = DynamicImage::ImageRgba8(img);
        match self.options.format {
            ImageFormat::Tga => write_tga(&dynamic_img, output_path),
            ImageFormat::Jpeg { quality } => write_jpeg(&dynamic_img, quality, output_path),
            format => {
                dynamic_img.save_with_format(output_path, format.to_img_format())?;
                Ok(())
            }
        }
    }
}

impl Default for TextureExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn skipped(path: &Path, reason: SkipReason) -> ExportOutcome {
    warn!("Skipping texture {}: {}", path.display(), reason);
    ExportOutcome::Skipped {
        path: path.to_path_buf(),
        reason,
    }
}

/// Uncompressed truecolor TGA (image type 2); the encoder defaults to RLE
#[cfg(feature = "tga")]
fn write_tga(img: &DynamicImage, output_path: &Path) -> TextureResult<()> {
    use std::io::Write;

    let file = std::fs::File::create(output_path)?;
    let mut writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::tga::TgaEncoder::new(&mut writer).disable_rle();
    img.write_with_encoder(encoder)?;
    writer.flush()?;
    Ok(())
}

#[cfg(not(feature = "tga"))]
fn write_tga(_img: &DynamicImage, _output_path: &Path) -> TextureResult<()> {
    Err(TextureError::NoEncoder(ImageFormat::Tga))
}

#[cfg(feature = "jpeg")]
fn write_jpeg(img: &DynamicImage, quality: u8, output_path: &Path) -> TextureResult<()> {
    use std::io::Write;

    let file = std::fs::File::create(output_path)?;
    let mut writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality);
    DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
    writer.flush()?;
    Ok(())
}

#[cfg(not(feature = "jpeg"))]
fn write_jpeg(_img: &DynamicImage, quality: u8, _output_path: &Path) -> TextureResult<()> {
    Err(TextureError::NoEncoder(ImageFormat::Jpeg { quality }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        let rgba = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 128,
        ];
        Texture::texels(2, 2, rgba)
    }

    #[test]
    fn test_extension_lookup() {
        assert_eq!(ImageFormat::from_extension("TGA"), Some(ImageFormat::Tga));
        assert_eq!(ImageFormat::from_extension("jpeg").map(|f| f.extension()), Some("jpg"));
        assert_eq!(ImageFormat::from_extension("gif"), None);
        assert!("webp".parse::<ImageFormat>().is_err());
        assert_eq!("png".parse::<ImageFormat>().ok(), Some(ImageFormat::Png));
    }

    #[test]
    fn test_default_format_is_tga() {
        assert_eq!(TextureExporter::new().options().format, ImageFormat::Tga);
        assert_eq!(ImageFormat::default().extension(), "tga");
    }

    #[test]
    fn test_texels_to_image() {
        let img = texture_to_image(&checker()).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255, 128]);
    }

    #[test]
    fn test_texels_size_mismatch() {
        let err = texture_to_image(&Texture::texels(2, 2, vec![0; 10])).unwrap_err();
        assert!(matches!(err, TextureError::SizeMismatch { expected: 16, actual: 10 }));
    }

    #[test]
    fn test_zero_dimensions() {
        let err = texture_to_image(&Texture::texels(0, 4, Vec::new())).unwrap_err();
        assert!(matches!(err, TextureError::InvalidDimensions { width: 0, height: 4 }));
    }

    #[test]
    fn test_garbage_compressed_texture() {
        let err = texture_to_image(&Texture::compressed("", vec![1, 2, 3, 4])).unwrap_err();
        assert!(matches!(err, TextureError::Image(_)));
    }

    #[cfg(feature = "png")]
    #[test]
    fn test_compressed_png_is_decoded() {
        let source = texture_to_image(&checker()).unwrap();
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(source.clone())
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImgFormat::Png)
            .unwrap();

        let decoded = texture_to_image(&Texture::compressed("png", bytes)).unwrap();
        assert_eq!(decoded, source);
    }

    #[cfg(feature = "tga")]
    #[test]
    fn test_export_writes_tga() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out_tex0.tga");

        let outcome = TextureExporter::new().export(&checker(), &path);
        assert!(outcome.is_written());
        assert_eq!(outcome.path(), path.as_path());

        let read_back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(read_back, texture_to_image(&checker()).unwrap());
    }

    #[cfg(feature = "tga")]
    #[test]
    fn test_tga_is_uncompressed_truecolor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uniform.tga");
        let uniform = Texture::texels(8, 8, [10u8, 20, 30, 255].repeat(64));

        assert!(TextureExporter::new().export(&uniform, &path).is_written());

        let bytes = std::fs::read(&path).unwrap();
        // Image type 2: uncompressed truecolor, 32 bits per pixel
        assert_eq!(bytes[2], 2);
        assert_eq!(bytes[16], 32);
        assert!(bytes.len() >= 18 + 8 * 8 * 4);
    }

    #[cfg(feature = "tga")]
    #[test]
    fn test_flip_y() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flipped.tga");
        let exporter = TextureExporter::with_options(TextureExportOptions {
            format: ImageFormat::Tga,
            flip_y: true,
        });

        assert!(exporter.export(&checker(), &path).is_written());
        let read_back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(read_back.get_pixel(0, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_conversion_failure_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tga");

        let outcome = TextureExporter::new().export(&Texture::texels(4, 4, vec![0; 3]), &path);
        assert!(matches!(outcome.skip_reason(), Some(SkipReason::Conversion(_))));
        assert!(!path.exists());
    }

    #[cfg(feature = "tga")]
    #[test]
    fn test_unwritable_destination_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("deeper").join("tex.tga");

        let outcome = TextureExporter::new().export(&checker(), &path);
        assert!(matches!(outcome.skip_reason(), Some(SkipReason::Write(_))));
    }

    #[cfg(not(feature = "jpeg"))]
    #[test]
    fn test_missing_encoder_is_skipped_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tex.jpg");
        let exporter = TextureExporter::with_options(TextureExportOptions {
            format: ImageFormat::Jpeg { quality: 80 },
            flip_y: false,
        });

        let outcome = exporter.export(&checker(), &path);
        let reason = outcome.skip_reason().unwrap();
        assert!(matches!(reason, SkipReason::NoEncoder(ImageFormat::Jpeg { .. })));
        assert_eq!(reason.to_string(), "No writer for JPEG file format available");
        assert!(!path.exists());
    }
}
