use std::time::{Duration, Instant};

use futures_util::StreamExt;
use log::{debug, info, warn};
use reqwest::Client;

use crate::config::DEFAULT_CHANNEL;
use crate::engine::models::{Manifest, VersionInfo};
use crate::error::{LauncherError, LauncherResult};
use crate::util::{format_size, format_speed, progress_percent};

const CLIENT_SETTINGS_BASE: &str =
    "https://clientsettingscdn.roblox.com/v2/client-version/WindowsPlayer";
const CDN_BASE: &str = "https://setup.rbxcdn.com";
const CDN_CHANNEL_BASE: &str = "https://setup.rbxcdn.com/channel/common";
const MANIFEST_SUFFIX: &str = "rbxPkgManifest.txt";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);
const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Upper bound on the buffer reserved from an advertised Content-Length.
const MAX_PREALLOC: u64 = 256 * 1024 * 1024;

/// Where release metadata and packages are fetched from.
pub trait ReleaseSource {
    async fn fetch_version_info(&self, channel: &str) -> LauncherResult<VersionInfo>;

    async fn fetch_manifest_text(&self, info: &VersionInfo) -> LauncherResult<String>;

    async fn fetch_archive(&self, info: &VersionInfo, archive: &str) -> LauncherResult<Vec<u8>>;

    async fn fetch_manifest_archives(&self, info: &VersionInfo) -> LauncherResult<Manifest> {
        let text = self.fetch_manifest_text(info).await?;
        Manifest::parse(&text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub client_settings_base: String,
    pub cdn_base: String,
}

impl Endpoints {
    pub fn for_channel(channel: &str) -> Self {
        let cdn_base = if channel.eq_ignore_ascii_case(DEFAULT_CHANNEL) {
            CDN_BASE
        } else {
            CDN_CHANNEL_BASE
        };
        Self {
            client_settings_base: CLIENT_SETTINGS_BASE.to_owned(),
            cdn_base: cdn_base.to_owned(),
        }
    }

    pub fn client_settings_url(&self, channel: &str) -> String {
        format!("{}/channel/{}", self.client_settings_base, channel)
    }

    pub fn manifest_url(&self, info: &VersionInfo) -> String {
        self.package_url(info, MANIFEST_SUFFIX)
    }

    pub fn package_url(&self, info: &VersionInfo, file: &str) -> String {
        format!("{}/{}-{}", self.cdn_base, info.client_version_upload, file)
    }
}

#[derive(Clone)]
pub struct NetworkClient {
    client: Client,
    endpoints: Endpoints,
}

impl NetworkClient {
    pub fn new(channel: &str) -> Self {
        Self::with_endpoints(Endpoints::for_channel(channel))
    }

    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("leeklaunch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|err| {
                warn!("network client: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self { client, endpoints }
    }

    async fn get(&self, url: &str, timeout: Duration) -> LauncherResult<reqwest::Response> {
        self.client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| LauncherError::network(url, e))?
            .error_for_status()
            .map_err(|e| LauncherError::network(url, e))
    }
}

fn initial_capacity(content_length: Option<u64>) -> usize {
    content_length.unwrap_or(0).min(MAX_PREALLOC) as usize
}

impl ReleaseSource for NetworkClient {
    async fn fetch_version_info(&self, channel: &str) -> LauncherResult<VersionInfo> {
        let url = self.endpoints.client_settings_url(channel);
        debug!("metadata: GET {url}");
        let body = self
            .get(&url, METADATA_TIMEOUT)
            .await?
            .text()
            .await
            .map_err(|e| LauncherError::network(&url, e))?;
        let info: VersionInfo =
            serde_json::from_str(&body).map_err(|source| LauncherError::Decode {
                url: url.clone(),
                source,
            })?;
        info!(
            "metadata: channel {} is at {} ({})",
            channel, info.version, info.client_version_upload
        );
        Ok(info)
    }

    async fn fetch_manifest_text(&self, info: &VersionInfo) -> LauncherResult<String> {
        let url = self.endpoints.manifest_url(info);
        debug!("manifest: GET {url}");
        self.get(&url, METADATA_TIMEOUT)
            .await?
            .text()
            .await
            .map_err(|e| LauncherError::network(&url, e))
    }

    async fn fetch_archive(&self, info: &VersionInfo, archive: &str) -> LauncherResult<Vec<u8>> {
        let url = self.endpoints.package_url(info, archive);
        debug!("download: GET {url}");
        let response = self.get(&url, ARCHIVE_TIMEOUT).await?;

        let total = response.content_length();
        let mut bytes = Vec::with_capacity(initial_capacity(total));
        let mut stream = response.bytes_stream();
        let mut last_tick = Instant::now();
        let mut last_len = 0usize;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| LauncherError::network(&url, e))?;
            bytes.extend_from_slice(&chunk);

            let elapsed = last_tick.elapsed().as_secs_f32();
            if elapsed > 0.2 {
                let speed = (bytes.len() - last_len) as f32 / elapsed;
                debug!(
                    "download: {} {:.1}% at {}",
                    archive,
                    progress_percent(bytes.len() as u64, total),
                    format_speed(speed)
                );
                last_tick = Instant::now();
                last_len = bytes.len();
            }
        }

        debug!("download: {} complete ({})", archive, format_size(bytes.len() as u64));
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_info() -> VersionInfo {
        VersionInfo {
            version: "0.650.0.6500789".into(),
            client_version_upload: "version-0123456789abcdef".into(),
            bootstrapper_version: "1, 6, 0, 6500789".into(),
        }
    }

    fn client_for(server: &MockServer) -> NetworkClient {
        NetworkClient::with_endpoints(Endpoints {
            client_settings_base: format!("{}/v2/client-version/WindowsPlayer", server.uri()),
            cdn_base: server.uri(),
        })
    }

    #[test]
    fn builds_urls_per_channel() {
        let info = sample_info();

        let live = Endpoints::for_channel("LIVE");
        assert_eq!(
            live.client_settings_url("LIVE"),
            "https://clientsettingscdn.roblox.com/v2/client-version/WindowsPlayer/channel/LIVE"
        );
        assert_eq!(
            live.manifest_url(&info),
            "https://setup.rbxcdn.com/version-0123456789abcdef-rbxPkgManifest.txt"
        );
        assert_eq!(
            live.package_url(&info, "content-sky.zip"),
            "https://setup.rbxcdn.com/version-0123456789abcdef-content-sky.zip"
        );

        let beta = Endpoints::for_channel("zcanary");
        assert_eq!(
            beta.manifest_url(&info),
            "https://setup.rbxcdn.com/channel/common/version-0123456789abcdef-rbxPkgManifest.txt"
        );
    }

    #[test]
    fn caps_preallocation_from_content_length() {
        assert_eq!(initial_capacity(None), 0);
        assert_eq!(initial_capacity(Some(4096)), 4096);
        assert_eq!(initial_capacity(Some(u64::MAX)), MAX_PREALLOC as usize);
    }

    #[tokio::test]
    async fn fetches_version_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/client-version/WindowsPlayer/channel/LIVE"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"version":"0.650.0.6500789","clientVersionUpload":"version-0123456789abcdef","bootstrapperVersion":"1, 6, 0, 6500789"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let info = client_for(&server).fetch_version_info("LIVE").await.unwrap();
        assert_eq!(info, sample_info());
    }

    #[tokio::test]
    async fn malformed_metadata_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/client-version/WindowsPlayer/channel/LIVE"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"version\":"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_version_info("LIVE")
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::Decode { .. }));
    }

    #[tokio::test]
    async fn http_failure_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_manifest_text(&sample_info())
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::Network { .. }));
    }

    #[tokio::test]
    async fn fetches_and_parses_manifest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/version-0123456789abcdef-rbxPkgManifest.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "v0\r\nRobloxApp.zip\r\nd41d8cd98f00b204e9800998ecf8427e\r\n10\r\n20\r\nssl.zip\r\n",
            ))
            .mount(&server)
            .await;

        let manifest = client_for(&server)
            .fetch_manifest_archives(&sample_info())
            .await
            .unwrap();
        assert_eq!(manifest.archives, vec!["RobloxApp.zip", "ssl.zip"]);
    }

    #[tokio::test]
    async fn downloads_archive_bytes() {
        let server = MockServer::start().await;
        let payload = vec![7u8; 64 * 1024];
        Mock::given(method("GET"))
            .and(path("/version-0123456789abcdef-shaders.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .mount(&server)
            .await;

        let bytes = client_for(&server)
            .fetch_archive(&sample_info(), "shaders.zip")
            .await
            .unwrap();
        assert_eq!(bytes, payload);
    }
}
