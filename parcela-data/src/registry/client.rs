//! Blocking registry client over async `reqwest`.
//!
//! The registry traits are synchronous so the resolution engine stays
//! embeddable anywhere. [`RegistryClient`] bridges to async HTTP by blocking
//! on a Tokio runtime it owns.

use std::fmt;
use std::thread;
use std::time::Duration;

use log::debug;
use parcela_core::{
    DetailLookup, Located, ParcelDetailSource, ParcelLocator, ParcelReference, ProjectedPoint,
    RegistryError,
};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::detail::{self, DetailStrategy};
use super::distance;

/// Public endpoint of the cadastral registry's web services.
pub const DEFAULT_BASE_URL: &str = "https://ovc.catastro.meh.es";

/// Default user agent for registry requests.
pub const DEFAULT_USER_AGENT: &str = concat!("parcela/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Distance-search error codes meaning "no data at this coordinate".
pub const DEFAULT_NOT_FOUND_CODES: &[&str] = &["17"];

/// Parcel data error codes meaning "more than one property matched".
pub const DEFAULT_MULTIPLE_RESULTS_CODES: &[&str] = &["6"];

const DISTANCE_SEARCH_PATH: &str =
    "OVCServWeb/OVCWcfCallejero/COVCCoordenadas.svc/json/Consulta_RCCOOR_Distancia";
const PARCEL_DATA_PATH: &str = "OVCServWeb/OVCWcfCallejero/COVCCallejero.svc/json/Consulta_DNPRC";

/// Error type for [`RegistryClient`] construction failures.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The base URL could not be parsed or cannot carry a path.
    #[error("invalid registry base URL {url:?}: {message}")]
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
        /// Parser message.
        message: String,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`RegistryClient`].
#[derive(Debug, Clone)]
pub struct RegistryClientConfig {
    /// Scheme and host of the registry, optionally with a path prefix.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Distance-search codes mapped to [`Located::NotFound`].
    pub not_found_codes: Vec<String>,
    /// Parcel data codes that still carry a usable first property.
    pub multiple_results_codes: Vec<String>,
}

impl Default for RegistryClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            not_found_codes: owned(DEFAULT_NOT_FOUND_CODES),
            multiple_results_codes: owned(DEFAULT_MULTIPLE_RESULTS_CODES),
        }
    }
}

impl RegistryClientConfig {
    /// Create a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replace the distance-search not-found codes.
    #[must_use]
    pub fn with_not_found_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.not_found_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the parcel data multiple-results codes.
    #[must_use]
    pub fn with_multiple_results_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.multiple_results_codes = codes.into_iter().map(Into::into).collect();
        self
    }
}

fn owned(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| (*code).to_owned()).collect()
}

/// HTTP client for the registry's distance search and parcel data lookup.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime, requests run on the client's own runtime.
/// Inside a multi-threaded runtime the caller's handle is used through
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime the
/// request runs on the client's runtime from a scoped helper thread.
///
/// Dropping the client shuts its runtime down in the background, so a
/// client may be dropped from async code.
pub struct RegistryClient {
    client: Client,
    config: RegistryClientConfig,
    base_url: Url,
    strategies: Vec<DetailStrategy>,
    runtime: Option<Runtime>,
}

impl fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryClient")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("strategies", &self.strategies)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl RegistryClient {
    /// Create a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(RegistryClientConfig::new(base_url))
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: RegistryClientConfig) -> Result<Self, ClientBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            base_url,
            strategies: DetailStrategy::defaults(),
            runtime: Some(runtime),
        })
    }

    /// Replace the detail strategies, tried in the given order.
    #[must_use]
    pub fn with_detail_strategies(mut self, strategies: Vec<DetailStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// The configuration this client was built from.
    #[must_use]
    pub const fn config(&self) -> &RegistryClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{prefix}/{path}"));
        url.query_pairs_mut().clear().extend_pairs(query);
        url
    }

    fn distance_search_url(&self, point: &ProjectedPoint) -> Url {
        let x = point.x().to_string();
        let y = point.y().to_string();
        self.endpoint(
            DISTANCE_SEARCH_PATH,
            &[
                ("SRS", point.reference_system()),
                ("Coordenada_X", &x),
                ("Coordenada_Y", &y),
            ],
        )
    }

    fn parcel_data_url(&self, reference: &ParcelReference) -> Url {
        self.endpoint(
            PARCEL_DATA_PATH,
            &[
                ("Provincia", ""),
                ("Municipio", ""),
                ("RefCat", reference.as_str()),
            ],
        )
    }

    /// Fetch `url` and decode the body as JSON.
    async fn fetch_json(&self, url: &Url) -> Result<Value, RegistryError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))?;

        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;

        serde_json::from_slice(&body).map_err(|err| RegistryError::Parse {
            message: err.to_string(),
        })
    }

    /// Convert a reqwest error to a [`RegistryError`].
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &Url) -> RegistryError {
        if error.is_timeout() {
            return RegistryError::Timeout {
                url: url.to_string(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return RegistryError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        RegistryError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    /// Fetch `url` from synchronous code, whatever runtime the caller is in.
    fn get_json(&self, url: &Url) -> Result<Value, RegistryError> {
        let Some(runtime) = self.runtime.as_ref() else {
            return Err(RegistryError::Network {
                url: url.to_string(),
                message: "registry client runtime has shut down".to_owned(),
            });
        };
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.fetch_json(url)))
            }
            Ok(_) => thread::scope(|scope| {
                scope
                    .spawn(|| runtime.block_on(self.fetch_json(url)))
                    .join()
            })
            .unwrap_or_else(|_| {
                Err(RegistryError::Network {
                    url: url.to_string(),
                    message: "registry request thread panicked".to_owned(),
                })
            }),
            Err(_) => runtime.block_on(self.fetch_json(url)),
        }
    }
}

impl Drop for RegistryClient {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    let invalid = |message: String| ClientBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        message,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_owned()));
    }
    Ok(url)
}

impl ParcelLocator for RegistryClient {
    fn locate(&self, point: &ProjectedPoint) -> Result<Located, RegistryError> {
        let url = self.distance_search_url(point);
        let payload = self.get_json(&url)?;
        distance::decode(&payload, &self.config.not_found_codes)
    }
}

impl ParcelDetailSource for RegistryClient {
    fn fetch_detail(&self, reference: &ParcelReference) -> Result<DetailLookup, RegistryError> {
        let url = self.parcel_data_url(reference);
        let payload = self.get_json(&url)?;
        detail::decode(
            &payload,
            &self.config.multiple_results_codes,
            &self.strategies,
        )
    }
}
