use crate::client::SyncError::*;
use crate::entities::{
    AggregateSyncResult, FileList, RemoteFileEntry, Source, SyncResult, SynologyResponse,
};
use crate::utils::is_image;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use reqwest::{Client, Url};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;

const API_PATH: &str = "/webapi/entry.cgi";

/// DSM management ports, used when a sharing link carries no explicit port
const DSM_HTTPS_PORT: u16 = 5001;
const DSM_HTTP_PORT: u16 = 5000;

const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Custom error types for the [`SynoPhotoSync`] client
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid sharing URL: {0}")]
    InvalidSharingUrl(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Resolves a sharing link into API coordinates: `(base_url, sharing_id)`
///
/// The sharing id is the path segment following the literal `sharing`
/// segment, e.g. `dRCQK2EDv` in `https://nas.example.com/mo/sharing/dRCQK2EDv`.
/// When the link carries no explicit port, the DSM management ports are
/// assumed: 5001 for https, 5000 for http.
///
/// # Errors
///
/// Returns [`SyncError::InvalidSharingUrl`] if:
/// - The URL cannot be parsed or has no host
/// - The URL path contains no `/sharing/<id>` segment
pub fn resolve_sharing_url(url: &str) -> Result<(String, String)> {
    let parsed = Url::parse(url).map_err(|e| InvalidSharingUrl(format!("{url}: {e}")))?;

    let sharing_id = extract_sharing_id(&parsed).ok_or_else(|| {
        InvalidSharingUrl(format!("Could not extract sharing ID from URL: {url}"))
    })?;

    let host = parsed
        .host_str()
        .ok_or_else(|| InvalidSharingUrl(format!("URL has no host: {url}")))?;

    let scheme = parsed.scheme();
    let port = parsed.port().unwrap_or(if scheme == "https" {
        DSM_HTTPS_PORT
    } else {
        DSM_HTTP_PORT
    });

    Ok((format!("{scheme}://{host}:{port}"), sharing_id))
}

fn extract_sharing_id(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == "sharing" {
            return segments
                .next()
                .filter(|id| !id.is_empty())
                .map(str::to_string);
        }
    }
    None
}

/// Synology sharing-link photo sync client
#[derive(Debug)]
pub struct SynoPhotoSync {
    data_dir: PathBuf,
    sources: Vec<Source>,
    client: Client,
    list_timeout: Duration,
    download_timeout: Duration,
}

impl SynoPhotoSync {
    /// Creates a new `SynoPhotoSync` client with the given data directory
    /// and configured sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data directory path is empty
    /// - A source has an empty folder name
    /// - Two sources share a folder name
    pub fn new(data_dir: PathBuf, sources: Vec<Source>) -> Result<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(Configuration("Data directory cannot be empty".into()).into());
        }

        // Folder names identify sources and name their destination folders
        let mut seen = HashSet::new();
        for source in &sources {
            if source.folder_name.is_empty() {
                return Err(Configuration("Source folder name cannot be empty".into()).into());
            }
            if !seen.insert(source.folder_name.as_str()) {
                return Err(Configuration(format!(
                    "Duplicate source folder name: {}",
                    source.folder_name
                ))
                .into());
            }
        }

        let client = Self::create_client();

        Ok(Self {
            data_dir,
            sources,
            client,
            list_timeout: DEFAULT_LIST_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        })
    }

    /// Creates the shared HTTP client; timeouts are applied per request
    fn create_client() -> Client {
        Client::builder().build().unwrap_or_default()
    }

    /// Creates a new `SynoPhotoSync` client with a builder pattern
    #[must_use]
    pub fn builder() -> SynoPhotoSyncBuilder {
        SynoPhotoSyncBuilder::default()
    }

    /// Syncs all configured sources, best-effort
    ///
    /// Sources without a URL are skipped with a warning and do not appear
    /// in the result's `sources` map. A failing source flips the overall
    /// success flag but does not stop the remaining sources from syncing.
    pub async fn sync_all(&self) -> AggregateSyncResult {
        let mut results = AggregateSyncResult {
            success: true,
            total_downloaded: 0,
            sources: HashMap::new(),
            error: None,
        };

        for source in &self.sources {
            if source.url.is_empty() {
                warn!("Skipping source {}: no URL provided", source.folder_name);
                continue;
            }

            let result = self.sync_source(&source.folder_name).await;
            if result.success {
                results.total_downloaded += result.files_downloaded;
            } else {
                results.success = false;
                results.error = result
                    .error
                    .clone()
                    .or_else(|| Some("Unknown error".to_string()));
            }
            results.sources.insert(source.folder_name.clone(), result);
        }

        results
    }

    /// Syncs a specific source by folder name
    ///
    /// Never returns an error: configuration problems (unknown source,
    /// missing URL) and failures during listing or downloading are all
    /// reported through the returned [`SyncResult`].
    pub async fn sync_source(&self, source_name: &str) -> SyncResult {
        let Some(source) = self
            .sources
            .iter()
            .find(|source| source.folder_name == source_name)
        else {
            return SyncResult {
                success: false,
                files_downloaded: 0,
                error: Some(format!("Source '{source_name}' not found")),
            };
        };

        if source.url.is_empty() {
            return SyncResult {
                success: false,
                files_downloaded: 0,
                error: Some(format!("No URL configured for source '{source_name}'")),
            };
        }

        let target_folder = self.data_dir.join(&source.folder_name);

        match self.download_images(&source.url, &target_folder).await {
            Ok(files_downloaded) => SyncResult {
                success: true,
                files_downloaded,
                error: None,
            },
            Err(e) => {
                error!("Error syncing source {source_name}: {e:#}");
                SyncResult {
                    success: false,
                    files_downloaded: 0,
                    error: Some(format!("{e:#}")),
                }
            }
        }
    }

    /// Downloads all previously-unseen images from a sharing URL into a
    /// target folder, returning the number of files downloaded
    ///
    /// Entries are processed in listing order; directories, non-image
    /// extensions and files already present in the target folder are
    /// skipped. Downloads run sequentially.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The sharing URL is malformed ([`SyncError::InvalidSharingUrl`])
    /// - The target folder cannot be created
    /// - A downloaded file cannot be written to disk
    pub async fn download_images(&self, url: &str, target_folder: &Path) -> Result<u32> {
        info!(
            "Starting download from {url} to {}",
            target_folder.display()
        );

        fs::create_dir_all(target_folder)
            .await
            .with_context(|| format!("Failed to create folder {}", target_folder.display()))?;

        let (base_url, sharing_id) = resolve_sharing_url(url)?;

        let files = self.list_shared_files(&base_url, &sharing_id).await;
        if files.is_empty() {
            warn!("No files found in sharing link");
            return Ok(0);
        }
        info!("Found {} files in sharing link", files.len());

        let mut files_downloaded = 0;
        for file in files {
            if file.isdir {
                debug!("Skipping directory: {}", file.name);
                continue;
            }

            if !file.is_image_file() {
                debug!("Skipping non-image file: {}", file.name);
                continue;
            }

            let target_file = target_folder.join(&file.name);
            if target_file.exists() {
                debug!("File already exists, skipping: {}", file.name);
                continue;
            }

            if self
                .download_file(&base_url, &sharing_id, &file.path, &target_file)
                .await?
            {
                files_downloaded += 1;
            }
        }

        info!("Downloaded {files_downloaded} files from {url}");
        Ok(files_downloaded)
    }

    /// Lists the files behind a sharing id via `SYNO.FileStation.List`
    ///
    /// Degrades to an empty list on any failure: request errors, timeouts,
    /// non-2xx responses, unparseable bodies and API-level error envelopes
    /// are logged and treated as "no files found" rather than surfaced to
    /// the caller.
    pub async fn list_shared_files(&self, base_url: &str, sharing_id: &str) -> Vec<RemoteFileEntry> {
        let params = [
            ("api", "SYNO.FileStation.List"),
            ("version", "2"),
            ("method", "list"),
            ("_sharing_id", sharing_id),
            ("folder_path", "/"),
            ("additional", r#"["size","time","perm"]"#),
        ];

        let url = format!("{base_url}{API_PATH}");
        debug!("Listing shared files via {url}");

        let response = match self
            .client
            .get(&url)
            .query(&params)
            .timeout(self.list_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("API list request failed: {e}");
                return Vec::new();
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("API list request failed: HTTP {status}");
            return Vec::new();
        }

        let body = match response.json::<SynologyResponse<FileList>>().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to parse API response: {e}");
                return Vec::new();
            }
        };

        if !body.success {
            // The error code is diagnostic only; the caller sees an empty list
            let error_code = body
                .error
                .map_or_else(|| "unknown".to_string(), |error| error.code.to_string());
            error!("API list request failed: {error_code}");
            return Vec::new();
        }

        body.data.map(|data| data.files).unwrap_or_default()
    }

    /// Downloads one file via `SYNO.FileStation.Download` and writes it to
    /// `target_file` after verifying the content is an image
    ///
    /// Returns `Ok(true)` when the file was written, `Ok(false)` when the
    /// download failed or the body did not carry an image signature (the
    /// failure is logged, nothing is written).
    ///
    /// # Errors
    ///
    /// Returns an error only if the verified content cannot be written to
    /// disk.
    pub async fn download_file(
        &self,
        base_url: &str,
        sharing_id: &str,
        file_path: &str,
        target_file: &Path,
    ) -> Result<bool> {
        let params = [
            ("api", "SYNO.FileStation.Download"),
            ("version", "2"),
            ("method", "download"),
            ("_sharing_id", sharing_id),
            ("path", file_path),
            ("mode", "download"),
        ];

        let url = format!("{base_url}{API_PATH}");

        let response = match self
            .client
            .get(&url)
            .query(&params)
            .timeout(self.download_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to download {file_path}: {e}");
                return Ok(false);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Failed to download {file_path}: HTTP {status}");
            return Ok(false);
        }

        let content = match response.bytes().await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read download body for {file_path}: {e}");
                return Ok(false);
            }
        };

        // Shares can answer a download request with an HTML error page and
        // status 200; only signature-verified content reaches the disk
        if !is_image(&content) {
            warn!("Downloaded content is not an image: {file_path}");
            return Ok(false);
        }

        fs::write(target_file, &content)
            .await
            .with_context(|| format!("Failed to write {}", target_file.display()))?;

        info!("Downloaded: {}", target_file.display());
        Ok(true)
    }
}

/// Builder for [`SynoPhotoSync`] client
#[derive(Default)]
pub struct SynoPhotoSyncBuilder {
    data_dir: Option<PathBuf>,
    sources: Vec<Source>,
    list_timeout: Option<Duration>,
    download_timeout: Option<Duration>,
}

impl SynoPhotoSyncBuilder {
    /// Sets the root directory that source folders are created under
    #[must_use]
    pub fn data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    /// Adds a single source
    #[must_use]
    pub fn source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    /// Adds multiple sources
    #[must_use]
    pub fn sources(mut self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Overrides the per-request timeout for listing calls (default 30s)
    #[must_use]
    pub fn list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = Some(timeout);
        self
    }

    /// Overrides the per-request timeout for download calls (default 60s)
    #[must_use]
    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = Some(timeout);
        self
    }

    /// Builds the [`SynoPhotoSync`] client
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data directory is not provided or empty
    /// - A source has an empty folder name
    /// - Two sources share a folder name
    pub fn build(self) -> Result<SynoPhotoSync> {
        let data_dir = self
            .data_dir
            .ok_or_else(|| Configuration("Data directory is required".into()))?;

        let mut client = SynoPhotoSync::new(data_dir, self.sources)?;

        if let Some(timeout) = self.list_timeout {
            client.list_timeout = timeout;
        }
        if let Some(timeout) = self.download_timeout {
            client.download_timeout = timeout;
        }

        Ok(client)
    }
}
