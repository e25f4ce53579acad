use std::path::{Path, PathBuf};

/// Application settings that persist across sessions.
///
/// Tool and brush style are deliberately absent: every session starts from
/// the default style.
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// UI language code ("en", "hu"); empty means detect from the system.
    pub language: String,
    /// Ask before New/Open throws away the current picture.
    pub confirm_destructive: bool,
    /// JPEG quality used by Save (1-100).
    pub jpeg_quality: u8,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            language: String::new(),
            confirm_destructive: true,
            jpeg_quality: 90,
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/minipaint/minipaint_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\MiniPaint\minipaint_settings.cfg
    /// On macOS:   ~/Library/Application Support/MiniPaint/minipaint_settings.cfg
    pub(crate) fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        let config_dir = PathBuf::from(std::env::var("APPDATA").ok()?).join("MiniPaint");
        #[cfg(target_os = "macos")]
        let config_dir = PathBuf::from(std::env::var("HOME").ok()?)
            .join("Library")
            .join("Application Support")
            .join("MiniPaint");
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .ok()?
            .join("minipaint");

        Some(config_dir.join("minipaint_settings.cfg"))
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "language={}\n\
             confirm_destructive={}\n\
             jpeg_quality={}\n",
            self.language, self.confirm_destructive, self.jpeg_quality,
        )
    }

    /// Parse a settings file. Unknown keys and bad values keep the defaults.
    pub fn from_config_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim();
            match key.trim() {
                "language" => s.language = val.to_string(),
                "confirm_destructive" => s.confirm_destructive = val == "true",
                "jpeg_quality" => {
                    if let Ok(q) = val.parse::<u8>() {
                        s.jpeg_quality = q.clamp(1, 100);
                    }
                }
                _ => {}
            }
        }
        s
    }

    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = self.save_to(&path) {
            log_warn!("could not write settings {}: {}", path.display(), e);
        }
    }

    /// Write to `path`, creating its directory first.
    pub(crate) fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_config_string())
    }

    /// Load settings from disk (defaults if the file is missing).
    pub fn load() -> Self {
        Self::settings_path().map_or_else(Self::default, |path| Self::load_from(&path))
    }

    pub(crate) fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_config_str(&content),
            Err(_) => Self::default(),
        }
    }
}
