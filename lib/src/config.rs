use crate::codec::DecodePolicy;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Custom user-agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout for page and thumbnail downloads
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Threads in each of the fetch and snapshot pools
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Hosts whose URLs get a video thumbnail instead of a page render.
    /// Ids are only read from YouTube URL shapes (`?v=`, `youtu.be/<id>`,
    /// `/shorts/`, `/embed/`, `/live/`, `/v/`), so another host listed here
    /// gets a snapshot failure rather than a page render.
    #[serde(default = "default_video_hosts")]
    pub video_hosts: Vec<String>,

    /// Thumbnail download URL; `{id}` is replaced by the video id
    #[serde(default = "default_thumbnail_url")]
    pub thumbnail_url: String,

    /// External renderer invocation; `{url}` and `{output}` are substituted
    #[serde(default = "default_renderer_command")]
    pub renderer_command: Vec<String>,

    /// Seconds a renderer may run before it is killed
    #[serde(default = "default_render_timeout_secs")]
    pub render_timeout_secs: u64,

    /// Longest side, in pixels, of a stored snapshot
    #[serde(default = "default_snapshot_max_size")]
    pub snapshot_max_size: u32,

    /// What to do with entries that fail to decode when a pad is loaded
    #[serde(default)]
    pub decode_policy: DecodePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            worker_threads: default_worker_threads(),
            video_hosts: default_video_hosts(),
            thumbnail_url: default_thumbnail_url(),
            renderer_command: default_renderer_command(),
            render_timeout_secs: default_render_timeout_secs(),
            snapshot_max_size: default_snapshot_max_size(),
            decode_policy: DecodePolicy::default(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) \
     Version/18.5 Safari/605.1.15"
        .to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    20
}

fn default_worker_threads() -> usize {
    num_cpus::get().clamp(1, 8)
}

fn default_video_hosts() -> Vec<String> {
    vec!["youtube.com".to_string(), "youtu.be".to_string()]
}

fn default_thumbnail_url() -> String {
    "https://img.youtube.com/vi/{id}/hqdefault.jpg".to_string()
}

fn default_renderer_command() -> Vec<String> {
    [
        "chromium",
        "--headless",
        "--disable-gpu",
        "--hide-scrollbars",
        "--window-size=1280,800",
        "--screenshot={output}",
        "{url}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_render_timeout_secs() -> u64 {
    crate::snapshot::DEFAULT_RENDER_TIMEOUT_SECS
}

fn default_snapshot_max_size() -> u32 {
    320
}

impl Config {
    /// Load configuration from a file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from default location (~/.config/urlpad/config.yml)
    /// Falls back to default config if file doesn't exist
    pub fn load() -> Self {
        let config_path = crate::utils::get_config_dir().join("config.yml");

        if config_path.exists() {
            match Self::load_from_path(&config_path) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!(
                        "Failed to load config from {:?}: {}; using default configuration",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }
}
