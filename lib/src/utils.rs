use std::path::{Path, PathBuf};

/// Subfolder of the pad folder that holds resolved snapshots
pub const IMAGES_SUBFOLDER: &str = "images";

pub fn get_default_pad_dir() -> PathBuf {
    if let Ok(path) = std::env::var("URLPAD_DEFAULT_DIR") {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(path).join("urlpad");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/share/urlpad");
    }

    #[cfg(target_os = "windows")]
    if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata).join("urlpad");
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub fn get_config_dir() -> PathBuf {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(path).join("urlpad");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/urlpad");
    }

    #[cfg(target_os = "windows")]
    if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata).join("urlpad");
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Turn a local path into a `file:///` URI suitable for an image view
pub fn file_uri(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    format!("file:///{}", text.trim_start_matches('/'))
}
