use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageError, RgbaImage};
use rfd::FileDialog;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Default file name offered by the save dialog.
pub const DEFAULT_FILE_NAME: &str = "drawing.png";

const OPEN_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Bmp => "bmp",
        }
    }

    /// Format by name or extension ("png", "jpg", "jpeg", "bmp").
    pub fn from_name(name: &str) -> Option<SaveFormat> {
        match name.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "jpg" | "jpeg" => Some(SaveFormat::Jpeg),
            "bmp" => Some(SaveFormat::Bmp),
            _ => None,
        }
    }

    /// Format implied by a path's extension; anything unknown saves as PNG.
    pub fn from_path(path: &Path) -> SaveFormat {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(SaveFormat::from_name)
            .unwrap_or_default()
    }
}

/// Decode any format the `image` crate understands into straight RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, String> {
    let img = image::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(img.to_rgba8())
}

/// Encode and write an image to a file. JPEG drops the alpha channel.
pub fn encode_and_write(
    image: &RgbaImage,
    path: &Path,
    format: SaveFormat,
    quality: u8,
) -> Result<(), ImageError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        SaveFormat::Png => {
            let encoder = PngEncoder::new(&mut writer);
            #[allow(deprecated)]
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
        SaveFormat::Jpeg => {
            let rgb_image = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            encoder.encode(
                rgb_image.as_raw(),
                rgb_image.width(),
                rgb_image.height(),
                image::ColorType::Rgb8,
            )?;
        }
        SaveFormat::Bmp => {
            let mut encoder = BmpEncoder::new(&mut writer);
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
    }
    Ok(())
}

// ============================================================================
// FILE HANDLER
// ============================================================================

pub struct FileHandler {
    /// Current file path (None if new/unsaved file)
    pub current_path: Option<PathBuf>,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHandler {
    pub fn new() -> Self {
        Self { current_path: None }
    }

    /// Forget the current path (new document).
    pub fn reset(&mut self) {
        self.current_path = None;
    }

    /// Show the native open dialog and decode the chosen file.
    pub fn open_image(&mut self) -> Option<Result<(RgbaImage, PathBuf), String>> {
        let path = FileDialog::new()
            .add_filter(&t!("dialog.filter_images"), OPEN_EXTENSIONS)
            .add_filter(&t!("dialog.filter_all"), &["*"])
            .pick_file()?;

        Some(load_image(&path).map(|rgba| {
            self.current_path = Some(path.clone());
            (rgba, path)
        }))
    }

    /// Show the native save dialog. `None` when the user cancels.
    pub fn pick_save_path(&self) -> Option<PathBuf> {
        let file_name = self
            .current_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

        let mut dialog = FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"])
            .add_filter("BMP", &["bmp"])
            .set_file_name(&file_name);
        if let Some(dir) = self.current_path.as_ref().and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }
        dialog.save_file()
    }

    /// Save to `path`, picking the format from its extension.
    pub fn save_image(&mut self, image: &RgbaImage, path: &Path, quality: u8) -> Result<(), ImageError> {
        encode_and_write(image, path, SaveFormat::from_path(path), quality)?;
        self.current_path = Some(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("minipaint_io_{}_{}", std::process::id(), name))
    }

    #[test]
    fn format_follows_extension_with_png_fallback() {
        assert_eq!(SaveFormat::from_path(Path::new("a/b.JPEG")), SaveFormat::Jpeg);
        assert_eq!(SaveFormat::from_path(Path::new("x.jpg")), SaveFormat::Jpeg);
        assert_eq!(SaveFormat::from_path(Path::new("x.bmp")), SaveFormat::Bmp);
        assert_eq!(SaveFormat::from_path(Path::new("x.gif")), SaveFormat::Png);
        assert_eq!(SaveFormat::from_path(Path::new("noext")), SaveFormat::Png);
        assert_eq!(SaveFormat::from_name(".png"), Some(SaveFormat::Png));
    }

    #[test]
    fn png_save_is_lossless() {
        let mut img = RgbaImage::from_pixel(20, 10, Rgba([255, 255, 255, 255]));
        img.put_pixel(3, 4, Rgba([12, 34, 56, 255]));
        let path = temp_path("lossless.png");
        encode_and_write(&img, &path, SaveFormat::Png, 90).unwrap();
        let back = load_image(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, img);
    }

    #[test]
    fn jpeg_and_bmp_keep_dimensions() {
        let img = RgbaImage::from_pixel(33, 17, Rgba([0, 191, 255, 255]));
        for format in [SaveFormat::Jpeg, SaveFormat::Bmp] {
            let path = temp_path(&format!("dims.{}", format.extension()));
            encode_and_write(&img, &path, format, 80).unwrap();
            let back = load_image(&path).unwrap();
            let _ = std::fs::remove_file(&path);
            assert_eq!(back.dimensions(), (33, 17));
        }
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(err.contains("here.png"));
    }

    #[test]
    fn save_remembers_path() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let path = temp_path("remember.bmp");
        let mut handler = FileHandler::new();
        handler.save_image(&img, &path, 75).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(handler.current_path.as_deref(), Some(path.as_path()));
        handler.reset();
        assert!(handler.current_path.is_none());
    }
}
