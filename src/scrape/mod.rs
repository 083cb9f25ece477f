mod cache;

use reqwest::{blocking::Client, StatusCode};
use scraper::Html;
use std::{error::Error, net::IpAddr, thread::sleep, time::Duration};

use crate::config::ScrapeConfig;
pub use cache::PageCache;

/// Error types for page fetching, distinguishing retryable from terminal failures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transient failures (5xx, timeout, connection error) that ran out of attempts
    #[error("retryable: {0}")]
    Retryable(String),
    /// Permanent failures (4xx, invalid URL)
    #[error("terminal: {0}")]
    Terminal(String),
    /// Rejected by the scrape policy before any request was made
    #[error("blocked: {0}")]
    Blocked(String),
}

/// Source of page bodies. Implementations may cache responses for `cache_for`.
pub trait PageFetcher: Send + Sync {
    /// Fetch the body of `url`, reusing a cached copy younger than `cache_for`.
    fn get(&self, url: &str, cache_for: Duration) -> Result<String, FetchError>;

    /// Same as [`PageFetcher::get`], parsed as an HTML document.
    fn parsed_get(&self, url: &str, cache_for: Duration) -> Result<Html, FetchError> {
        self.get(url, cache_for)
            .map(|body| Html::parse_document(&body))
    }
}

fn is_ip_private(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
        }
    }
}

fn is_private_ip(host: &str) -> bool {
    use std::net::ToSocketAddrs;

    if let Ok(ip) = host.parse::<IpAddr>() {
        return is_ip_private(&ip);
    }

    if let Ok(addrs) = (host, 80).to_socket_addrs() {
        for addr in addrs {
            if is_ip_private(&addr.ip()) {
                return true;
            }
        }
    }

    false
}

fn validate_url_policy(url_parsed: &reqwest::Url, config: &ScrapeConfig) -> Result<(), FetchError> {
    if !config.allowed_schemes.iter().any(|s| s == url_parsed.scheme()) {
        log::warn!("URL scheme '{}' not allowed", url_parsed.scheme());
        return Err(FetchError::Blocked(format!(
            "scheme '{}' not allowed",
            url_parsed.scheme()
        )));
    }

    let host = url_parsed.host_str().unwrap_or_default();

    if config.blocked_hosts.iter().any(|h| h == host) {
        log::warn!("Host '{}' is blocked", host);
        return Err(FetchError::Blocked(format!("host '{host}' is blocked")));
    }

    if config.block_private_ips && is_private_ip(host) {
        log::warn!("Host '{}' resolves to private IP (blocked by SSRF policy)", host);
        return Err(FetchError::Blocked(format!(
            "host '{host}' resolves to a private address"
        )));
    }

    Ok(())
}

fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

fn build_client(config: &ScrapeConfig, proxy: Option<&str>) -> Result<Client, FetchError> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .danger_accept_invalid_hostnames(config.accept_invalid_certs)
        .timeout(Duration::from_secs(config.timeout_secs))
        .pool_idle_timeout(Duration::from_secs(config.timeout_secs));

    if let Some(proxy) = proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| FetchError::Terminal(format!("invalid proxy {proxy:?}: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| FetchError::Terminal(format!("failed to build http client: {}", get_error(&e))))
}

/// Blocking HTTP fetcher with retries, an SSRF policy and an in-memory response cache.
pub struct HttpFetcher {
    config: ScrapeConfig,
    client: Client,
    /// Used after a failed attempt when a proxy is configured.
    proxy_client: Option<Client>,
    cache: PageCache,
}

impl HttpFetcher {
    pub fn new(config: ScrapeConfig) -> Result<Self, FetchError> {
        let client = build_client(&config, None)?;
        let proxy_client = match config.proxy.as_deref() {
            Some(proxy) if !proxy.is_empty() => Some(build_client(&config, Some(proxy))?),
            _ => None,
        };

        Ok(Self {
            config,
            client,
            proxy_client,
            cache: PageCache::new(),
        })
    }

    fn request(&self, url: &str) -> Result<String, FetchError> {
        let url = if url.starts_with("//") {
            format!("https:{url}")
        } else {
            url.to_string()
        };

        let url_parsed = reqwest::Url::parse(&url)
            .map_err(|e| FetchError::Terminal(format!("{url}: invalid URL: {e}")))?;
        validate_url_policy(&url_parsed, &self.config)?;

        let host = url_parsed.host_str().unwrap_or_default();
        let path = url_parsed.path();
        let iden = format!("{host}{path}");

        let mut attempt: u32 = 0;
        let mut force_proxy = false;
        let mut last_error = format!("{iden}: no attempts made");

        while attempt < self.config.max_retries {
            if attempt > 0 {
                log::debug!("{iden}: retrying");
            }

            attempt += 1;

            let client = match (&self.proxy_client, force_proxy) {
                (Some(proxy_client), true) => {
                    log::debug!("{iden}: using proxy");
                    proxy_client
                }
                _ => &self.client,
            };

            log::debug!("{iden}: requesting");

            let resp = match client.get(url_parsed.clone()).send() {
                Ok(r) => r,
                Err(err) => {
                    force_proxy = true;
                    last_error = format!("{iden}: {}", get_error(&err));
                    log::error!("{last_error}");
                    continue;
                }
            };

            let status = resp.status();

            if status.is_success() {
                // we might get OK, but no text response.
                match resp.text() {
                    Ok(body) => return Ok(body),
                    Err(err) => {
                        log::debug!("{iden}: body read failed, timeout={}", err.is_timeout());
                        last_error = format!("{iden}: {}", get_error(&err));
                        force_proxy = true;
                        continue;
                    }
                }
            }

            log::debug!("{iden}: {status}");
            last_error = format!("{iden}: status {status}");

            if status == StatusCode::TOO_MANY_REQUESTS {
                sleep(Duration::from_secs(u64::from(attempt) * 4));
                continue;
            }

            if status.is_client_error() {
                // no need to try again without a proxy to fall back on
                if force_proxy || self.proxy_client.is_none() {
                    return Err(FetchError::Terminal(last_error));
                }

                force_proxy = true;
            }
        }

        Err(FetchError::Retryable(last_error))
    }
}

impl PageFetcher for HttpFetcher {
    fn get(&self, url: &str, cache_for: Duration) -> Result<String, FetchError> {
        if let Some(body) = self.cache.get(url, cache_for) {
            log::debug!("{url}: cache hit");
            return Ok(body);
        }

        let body = self.request(url)?;

        if !cache_for.is_zero() {
            self.cache.insert(url, body.clone());
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> ScrapeConfig {
        ScrapeConfig {
            block_private_ips: false,
            max_retries: 2,
            timeout_secs: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_repeated_get_within_window_hits_server_once() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/post/abc")
            .with_status(200)
            .with_body("<html><body>hi</body></html>")
            .expect(1)
            .create();

        let fetcher = HttpFetcher::new(local_config()).unwrap();
        let url = format!("{}/post/abc", server.url());

        let first = fetcher.get(&url, Duration::from_secs(60)).unwrap();
        let second = fetcher.get(&url, Duration::from_secs(60)).unwrap();

        assert_eq!(first, second);
        mock.assert();
    }

    #[test]
    fn test_zero_duration_bypasses_cache() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_body("body")
            .expect(2)
            .create();

        let fetcher = HttpFetcher::new(local_config()).unwrap();
        let url = format!("{}/page", server.url());

        fetcher.get(&url, Duration::ZERO).unwrap();
        fetcher.get(&url, Duration::ZERO).unwrap();

        mock.assert();
    }

    #[test]
    fn test_client_error_is_terminal() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(1)
            .create();

        let fetcher = HttpFetcher::new(local_config()).unwrap();
        let err = fetcher
            .get(&format!("{}/missing", server.url()), Duration::from_secs(60))
            .unwrap_err();

        assert!(matches!(err, FetchError::Terminal(_)), "got {err:?}");
        mock.assert();
    }

    #[test]
    fn test_server_error_exhausts_attempts() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(2)
            .create();

        let fetcher = HttpFetcher::new(local_config()).unwrap();
        let err = fetcher
            .get(&format!("{}/flaky", server.url()), Duration::from_secs(60))
            .unwrap_err();

        assert!(matches!(err, FetchError::Retryable(_)), "got {err:?}");
        mock.assert();
    }

    #[test]
    fn test_failed_fetch_is_not_cached() {
        let mut server = mockito::Server::new();
        let failing = server
            .mock("GET", "/later")
            .with_status(404)
            .expect(1)
            .create();

        let fetcher = HttpFetcher::new(local_config()).unwrap();
        let url = format!("{}/later", server.url());
        assert!(fetcher.get(&url, Duration::from_secs(60)).is_err());
        failing.assert();
        failing.remove();

        let ok = server
            .mock("GET", "/later")
            .with_status(200)
            .with_body("now")
            .expect(1)
            .create();
        assert_eq!(fetcher.get(&url, Duration::from_secs(60)).unwrap(), "now");
        ok.assert();
    }

    #[test]
    fn test_disallowed_scheme_is_blocked() {
        let fetcher = HttpFetcher::new(local_config()).unwrap();
        let err = fetcher
            .get("ftp://example.com/file", Duration::from_secs(60))
            .unwrap_err();
        assert!(matches!(err, FetchError::Blocked(_)));
    }

    #[test]
    fn test_blocked_host() {
        let config = ScrapeConfig {
            blocked_hosts: vec!["blocked.example".into()],
            ..local_config()
        };
        let fetcher = HttpFetcher::new(config).unwrap();
        let err = fetcher
            .get("https://blocked.example/", Duration::from_secs(60))
            .unwrap_err();
        assert!(matches!(err, FetchError::Blocked(_)));
    }

    #[test]
    fn test_private_ip_blocked_by_default_policy() {
        let fetcher = HttpFetcher::new(ScrapeConfig::default()).unwrap();
        let err = fetcher
            .get("http://127.0.0.1:1/", Duration::from_secs(60))
            .unwrap_err();
        assert!(matches!(err, FetchError::Blocked(_)));
    }

    #[test]
    fn test_invalid_url_is_terminal() {
        let fetcher = HttpFetcher::new(local_config()).unwrap();
        let err = fetcher.get("not a url", Duration::ZERO).unwrap_err();
        assert!(matches!(err, FetchError::Terminal(_)));
    }
}
