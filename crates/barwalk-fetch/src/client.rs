//! HTTP provider backed by a brokerage Client Portal gateway.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use barwalk_types::{Bar, Contract};
use chrono::DateTime;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::url::{DEFAULT_BASE_URL, auth_status_url, history_query, history_url, search_query, search_url};
use crate::{HistoricalProvider, HistoricalRequest, ProviderError};

/// Configuration for the gateway provider.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway API, e.g. `https://localhost:5000/v1/api`.
    pub base_url: String,
    /// Transport-level request timeout.
    pub timeout: Duration,
    /// Accept the gateway's self-signed certificate.
    pub accept_invalid_certs: bool,
    /// User agent string.
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            accept_invalid_certs: false,
            user_agent: format!("barwalk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Historical bar provider talking to a Client Portal gateway over HTTPS.
///
/// The gateway session must already be authenticated; a 401 answer is
/// surfaced as [`ProviderError::Unauthorized`]. Symbols are resolved to
/// contract ids once and cached for the lifetime of the provider.
#[derive(Debug)]
pub struct GatewayProvider {
    client: Client,
    config: GatewayConfig,
    conids: Mutex<HashMap<Contract, String>>,
}

impl GatewayProvider {
    /// Creates a new provider with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            // A single gateway host serves every request
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            config,
            conids: Mutex::new(HashMap::new()),
        })
    }

    /// Creates a provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(GatewayConfig::default())
    }

    /// Returns the provider configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Checks that the gateway session is authenticated.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unauthorized`] if it is not, or a transport
    /// error if the gateway cannot be reached.
    pub async fn check_session(&self) -> Result<(), ProviderError> {
        let response = self.client.get(auth_status_url(&self.config.base_url)).send().await?;
        let status: AuthStatus = decode(checked(response).await?).await?;
        if status.authenticated {
            Ok(())
        } else {
            Err(ProviderError::Unauthorized)
        }
    }

    /// Resolves a contract to the gateway's contract id.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownSymbol`] if the search has no match.
    pub async fn resolve(&self, contract: &Contract) -> Result<String, ProviderError> {
        if let Some(conid) = self.cached_conid(contract) {
            return Ok(conid);
        }

        let response = self
            .client
            .get(search_url(&self.config.base_url))
            .query(&search_query(contract))
            .send()
            .await?;
        let matches: Vec<SearchMatch> = decode(checked(response).await?).await?;
        let conid = pick_conid(contract, matches)?;

        tracing::debug!(symbol = %contract, %conid, "resolved contract id");
        self.conids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(contract.clone(), conid.clone());
        Ok(conid)
    }

    fn cached_conid(&self, contract: &Contract) -> Option<String> {
        self.conids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(contract)
            .cloned()
    }
}

#[async_trait]
impl HistoricalProvider for GatewayProvider {
    async fn request_bars(&self, request: &HistoricalRequest) -> Result<Vec<Bar>, ProviderError> {
        let conid = self.resolve(&request.contract).await?;
        let response = self
            .client
            .get(history_url(&self.config.base_url))
            .query(&history_query(&conid, request))
            .send()
            .await?;
        let history: HistoryResponse = decode(checked(response).await?).await?;
        history.into_bars()
    }
}

/// Maps error statuses onto provider errors.
async fn checked(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ProviderError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
}

fn pick_conid(contract: &Contract, matches: Vec<SearchMatch>) -> Result<String, ProviderError> {
    let mut fallback = None;
    for candidate in matches {
        let Some(conid) = candidate.conid else {
            continue;
        };
        if candidate
            .symbol
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(contract.symbol()))
        {
            return Ok(conid.into_string());
        }
        fallback.get_or_insert(conid);
    }
    fallback
        .map(Conid::into_string)
        .ok_or_else(|| ProviderError::UnknownSymbol(contract.symbol().to_string()))
}

#[derive(Debug, Deserialize)]
struct AuthStatus {
    #[serde(default)]
    authenticated: bool,
}

/// Contract ids arrive as either strings or integers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Conid {
    Text(String),
    Number(u64),
}

impl Conid {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchMatch {
    conid: Option<Conid>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    data: Vec<HistoryBar>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryBar {
    /// Bar open time in epoch milliseconds.
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    #[serde(default)]
    v: f64,
}

impl HistoryResponse {
    fn into_bars(self) -> Result<Vec<Bar>, ProviderError> {
        if let Some(error) = self.error {
            return Err(classify_gateway_error(error));
        }
        self.data
            .into_iter()
            .map(|bar| {
                let timestamp = DateTime::from_timestamp_millis(bar.t)
                    .ok_or_else(|| ProviderError::Decode(format!("invalid bar time {}", bar.t)))?;
                Ok(Bar::new(timestamp, bar.o, bar.h, bar.l, bar.c, bar.v))
            })
            .collect()
    }
}

/// Pacing and session messages reported inside a successful response.
fn classify_gateway_error(message: String) -> ProviderError {
    let lower = message.to_lowercase();
    if lower.contains("pacing") || lower.contains("busy") || lower.contains("try again") {
        ProviderError::Unavailable(message)
    } else if lower.contains("not authenticated") {
        ProviderError::Unauthorized
    } else {
        ProviderError::Decode(message)
    }
}
