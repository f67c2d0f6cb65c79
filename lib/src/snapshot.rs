//! Snapshot resolution: one local image per entry
//!
//! URLs on a known video host get the video's thumbnail; every other URL gets a
//! rendered page snapshot. The dispatch is decided by [`classify`] alone, so a
//! video URL never reaches the page renderer and vice versa.

use crate::config::Config;
use crate::error::{Result, UrlPadError};
use crate::fetch::normalize_url;
use crate::models::entry::PLACEHOLDER_FILE;
use crate::utils::IMAGES_SUBFOLDER;
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

/// Renders a web page to encoded image bytes
pub trait PageRenderer: Send + Sync {
    fn render_page(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches the thumbnail image for a video id
pub trait ThumbnailSource: Send + Sync {
    fn fetch_video_thumbnail(&self, video_id: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotKind {
    Video { id: String },
    Page,
}

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{6,32}$").expect("valid regex"))
}

/// Host equals one of `video_hosts` or is a subdomain of one
pub fn is_video_host(url: &Url, video_hosts: &[String]) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    video_hosts.iter().any(|candidate| {
        let candidate = candidate.trim().to_ascii_lowercase();
        !candidate.is_empty()
            && (host == candidate || host.ends_with(&format!(".{}", candidate)))
    })
}

/// YouTube id shapes only; `thumbnail_url` is expected to take the same ids
fn extract_video_id(url: &Url) -> Option<String> {
    let from_query = url
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned());

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let from_path = match segments.as_slice() {
        ["shorts" | "embed" | "live" | "v", id, ..] => Some(id.to_string()),
        [id] if url.host_str().is_some_and(|h| h.ends_with("youtu.be")) => Some(id.to_string()),
        _ => None,
    };

    from_query
        .or(from_path)
        .filter(|id| video_id_pattern().is_match(id))
}

/// Decide which snapshot strategy a URL gets
pub fn classify(url: &str, video_hosts: &[String]) -> Result<SnapshotKind> {
    let parsed = normalize_url(url).map_err(|e| UrlPadError::Snapshot(e.to_string()))?;
    if !is_video_host(&parsed, video_hosts) {
        return Ok(SnapshotKind::Page);
    }

    extract_video_id(&parsed)
        .map(|id| SnapshotKind::Video { id })
        .ok_or_else(|| UrlPadError::Snapshot(format!("no video id in {}", url)))
}

/// Stable file stem for a page snapshot
fn url_digest(url: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(url.as_bytes()));
    digest[..16].to_string()
}

/// Decode, downscale to `max_size` and write as PNG via a temp file in the same dir
fn store_image(bytes: &[u8], path: &Path, max_size: u32) -> Result<()> {
    let source = image::load_from_memory(bytes)?;
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(UrlPadError::Snapshot(format!(
            "invalid image dimensions {}x{}",
            width, height
        )));
    }

    let bounded_max = max_size.max(1);
    let image = if width.max(height) > bounded_max {
        source.resize(bounded_max, bounded_max, FilterType::Triangle)
    } else {
        source
    };

    let dir = path
        .parent()
        .ok_or_else(|| UrlPadError::Snapshot(format!("no parent for {}", path.display())))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    image.write_to(&mut tmp, ImageFormat::Png)?;
    tmp.persist(path).map_err(|e| UrlPadError::Io(e.error))?;
    Ok(())
}

/// Placeholder image shipped with the crate
pub const PLACEHOLDER_PNG: &[u8] = include_bytes!("../assets/octopus.png");

/// Write the bundled placeholder into `images_dir` unless it is already there
pub fn ensure_placeholder(images_dir: &Path) -> Result<PathBuf> {
    let path = images_dir.join(PLACEHOLDER_FILE);
    if path.is_file() {
        return Ok(path);
    }

    fs::create_dir_all(images_dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(images_dir)?;
    tmp.write_all(PLACEHOLDER_PNG)?;
    tmp.persist(&path).map_err(|e| UrlPadError::Io(e.error))?;
    log::debug!("Placeholder written to {}", path.display());
    Ok(path)
}

/// Produces the local image for an entry under `<padFolder>/images/`
#[derive(Clone)]
pub struct SnapshotResolver {
    renderer: Arc<dyn PageRenderer>,
    thumbnails: Arc<dyn ThumbnailSource>,
    video_hosts: Vec<String>,
    max_size: u32,
}

impl SnapshotResolver {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        thumbnails: Arc<dyn ThumbnailSource>,
        video_hosts: Vec<String>,
        max_size: u32,
    ) -> Self {
        Self {
            renderer,
            thumbnails,
            video_hosts,
            max_size,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Arc::new(
                CommandRenderer::new(config.renderer_command.clone())
                    .with_timeout(Duration::from_secs(config.render_timeout_secs)),
            ),
            Arc::new(HttpThumbnailSource::from_config(config)?),
            config.video_hosts.clone(),
            config.snapshot_max_size,
        ))
    }

    /// Resolve the snapshot for `url`; returns a path relative to `pad_folder`
    pub fn resolve(&self, url: &str, pad_folder: &Path) -> Result<String> {
        let images_dir = pad_folder.join(IMAGES_SUBFOLDER);
        ensure_placeholder(&images_dir)?;

        let (bytes, file_name) = match classify(url, &self.video_hosts)? {
            SnapshotKind::Video { id } => {
                log::debug!("Fetching video thumbnail {} for {}", id, url);
                let bytes = self.thumbnails.fetch_video_thumbnail(&id)?;
                (bytes, format!("video-{}.png", id))
            }
            SnapshotKind::Page => {
                log::debug!("Rendering page snapshot for {}", url);
                let bytes = self.renderer.render_page(url)?;
                (bytes, format!("page-{}.png", url_digest(url)))
            }
        };

        store_image(&bytes, &images_dir.join(&file_name), self.max_size)?;

        Ok(format!("{}/{}", IMAGES_SUBFOLDER, file_name))
    }
}

/// Runs an external renderer such as headless Chromium
///
/// Arguments may contain `{url}` and `{output}`. Without an `{output}` argument
/// the image is read from the renderer's stdout. A renderer still running after
/// the timeout is killed.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    command: Vec<String>,
    timeout: Duration,
}

impl CommandRenderer {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 60;

impl PageRenderer for CommandRenderer {
    fn render_page(&self, url: &str) -> Result<Vec<u8>> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| UrlPadError::Snapshot("renderer_command is empty".to_string()))?;

        let output = tempfile::Builder::new()
            .prefix("urlpad-render-")
            .suffix(".png")
            .tempfile()?;
        let output_path = output.path().to_string_lossy().to_string();
        let writes_file = args.iter().any(|a| a.contains("{output}"));

        let args: Vec<String> = args
            .iter()
            .map(|a| a.replace("{url}", url).replace("{output}", &output_path))
            .collect();

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(if writes_file { Stdio::null() } else { Stdio::piped() })
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| UrlPadError::Snapshot(format!("failed to run {}: {}", program, e)))?;

        // Drain stdout concurrently so a large image cannot fill the pipe
        let reader = child.stdout.take().map(|mut stdout| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                stdout.read_to_end(&mut buf).map(|_| buf)
            })
        });

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(UrlPadError::Snapshot(format!(
                    "{} timed out after {}s for {}",
                    program,
                    self.timeout.as_secs_f32(),
                    url
                )));
            }
        };

        let stdout = match reader {
            Some(handle) => handle
                .join()
                .map_err(|_| UrlPadError::Snapshot("renderer output reader panicked".to_string()))??,
            None => Vec::new(),
        };

        if !status.success() {
            return Err(UrlPadError::Snapshot(format!(
                "{} exited with {}",
                program, status
            )));
        }

        let bytes = if writes_file {
            fs::read(output.path())?
        } else {
            stdout
        };

        if bytes.is_empty() {
            return Err(UrlPadError::Snapshot(format!(
                "{} produced no image for {}",
                program, url
            )));
        }
        Ok(bytes)
    }
}

/// Downloads video thumbnails from a URL template
#[derive(Debug, Clone)]
pub struct HttpThumbnailSource {
    client: Client,
    url_template: String,
}

impl HttpThumbnailSource {
    pub fn new(client: Client, url_template: String) -> Self {
        Self {
            client,
            url_template,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;
        Ok(Self::new(client, config.thumbnail_url.clone()))
    }
}

impl ThumbnailSource for HttpThumbnailSource {
    fn fetch_video_thumbnail(&self, video_id: &str) -> Result<Vec<u8>> {
        let url = self.url_template.replace("{id}", video_id);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| UrlPadError::Snapshot(format!("thumbnail download failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UrlPadError::Snapshot(format!(
                "thumbnail {} returned status {}",
                url, status
            )));
        }

        let bytes = resp
            .bytes()
            .map_err(|e| UrlPadError::Snapshot(format!("thumbnail download failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}
