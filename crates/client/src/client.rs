use crate::error::ClientError;
use ledger_check_types::{
    Amount,
    BroadcastResult,
};
use reqwest::StatusCode;
use schema::{
    BalanceResponse,
    BroadcastTxRequest,
    BroadcastTxResponse,
    GetTxResponse,
    NodeInfoResponse,
    BROADCAST_MODE_SYNC,
};
use serde::de::DeserializeOwned;
use std::{
    net,
    str::FromStr,
    time::Duration,
};
use url::Url;

pub mod schema;
pub mod types;

pub use types::NodeInfo;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Client of the REST (LCD) gateway of a Cosmos SDK node.
///
/// Cloning is cheap, clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    client: reqwest::Client,
    url: Url,
    poll_interval: Duration,
}

impl FromStr for LedgerClient {
    type Err = ClientError;

    fn from_str(str: &str) -> Result<Self, Self::Err> {
        let mut raw_url = str.to_string();
        if !raw_url.starts_with("http") {
            raw_url = format!("http://{raw_url}");
        }

        let url = Url::parse(&raw_url).map_err(|e| ClientError::InvalidUrl {
            url: str.to_string(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: str.to_string(),
                reason: "the URL cannot carry a path".to_string(),
            })
        }

        Ok(Self {
            client: reqwest::Client::new(),
            url,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }
}

impl<S> From<S> for LedgerClient
where
    S: Into<net::SocketAddr>,
{
    fn from(socket: S) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: Url::parse(&format!("http://{}", socket.into()))
                .expect("a socket address is always a valid base URL"),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl LedgerClient {
    pub fn new(url: impl AsRef<str>) -> Result<Self, ClientError> {
        Self::from_str(url.as_ref())
    }

    /// Sets how often [`LedgerClient::await_inclusion`] asks the node about a
    /// pending transaction.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send_get(&self, url: &Url) -> Result<reqwest::Response, ClientError> {
        self.client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })
    }

    /// Sends a `GET` and decodes the body. Any non-success status, `404`
    /// included, is an error.
    async fn get<R>(&self, url: Url) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let response = self.send_get(&url).await?;
        Self::decode_response(url, response).await
    }

    /// Like [`LedgerClient::get`], but a `404` is reported as `None`. Only for
    /// resources the node legitimately does not know yet.
    async fn get_optional<R>(&self, url: Url) -> Result<Option<R>, ClientError>
    where
        R: DeserializeOwned,
    {
        let response = self.send_get(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None)
        }
        Self::decode_response(url, response).await.map(Some)
    }

    async fn decode_response<R>(
        url: Url,
        response: reqwest::Response,
    ) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Returns `true` if the gateway answers the node info query.
    pub async fn health(&self) -> Result<bool, ClientError> {
        match self.node_info().await {
            Ok(_) => Ok(true),
            Err(e) if e.is_transport() => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn node_info(&self) -> Result<NodeInfo, ClientError> {
        let url = self.endpoint(&["cosmos", "base", "tendermint", "v1beta1", "node_info"]);
        let info: NodeInfoResponse = self.get(url).await?;
        Ok(info.into())
    }

    /// The balance of `address` in `denom`.
    ///
    /// An address the ledger has never seen reads as zero, never as an error.
    /// The gateway answers such queries with a zero or `null` balance; a
    /// `404` means the route is not served and is reported as
    /// [`ClientError::Status`].
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn balance(&self, address: &str, denom: &str) -> Result<Amount, ClientError> {
        let mut url = self.endpoint(&[
            "cosmos",
            "bank",
            "v1beta1",
            "balances",
            address,
            "by_denom",
        ]);
        url.query_pairs_mut().append_pair("denom", denom);

        let balance = self
            .get::<BalanceResponse>(url)
            .await?
            .balance
            .unwrap_or_else(|| Amount::zero(denom));
        tracing::debug!(%balance, "balance fetched");
        Ok(balance)
    }

    /// Broadcasts signed transaction bytes (base64) and returns the
    /// check-tx result.
    ///
    /// The returned result only says whether the mempool accepted the
    /// transaction; its `height` stays `0` until inclusion.
    pub async fn broadcast(&self, tx_bytes: &str) -> Result<BroadcastResult, ClientError> {
        let url = self.endpoint(&["cosmos", "tx", "v1beta1", "txs"]);
        let request = BroadcastTxRequest {
            tx_bytes,
            mode: BROADCAST_MODE_SYNC,
        };
        let response = self
            .client
            .post(url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;

        let response: BroadcastTxResponse = Self::decode_response(url, response).await?;
        let result: BroadcastResult = response.tx_response.into();
        tracing::debug!(
            hash = %result.transaction_hash,
            code = result.code,
            "transaction broadcast"
        );
        Ok(result)
    }

    /// The execution result of the transaction `hash`, `None` while it is not
    /// part of a block.
    pub async fn transaction(
        &self,
        hash: &str,
    ) -> Result<Option<BroadcastResult>, ClientError> {
        let url = self.endpoint(&["cosmos", "tx", "v1beta1", "txs", hash]);
        let response = self.get_optional::<GetTxResponse>(url).await?;
        Ok(response
            .map(|r| BroadcastResult::from(r.tx_response))
            .filter(BroadcastResult::is_included))
    }

    /// Awaits for the transaction to be included into a block.
    ///
    /// This will wait forever if needed, so consider wrapping this call
    /// with a `tokio::time::timeout`.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn await_inclusion(&self, hash: &str) -> Result<BroadcastResult, ClientError> {
        loop {
            if let Some(result) = self.transaction(hash).await? {
                tracing::debug!(height = result.height, "transaction included");
                return Ok(result)
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Broadcasts the transaction and waits until the node reports its
    /// inclusion. A transaction rejected by check-tx is returned as is, it
    /// will never be included.
    ///
    /// This will wait forever if needed, so consider wrapping this call
    /// with a `tokio::time::timeout`.
    pub async fn submit_and_await_inclusion(
        &self,
        tx_bytes: &str,
    ) -> Result<BroadcastResult, ClientError> {
        let checked = self.broadcast(tx_bytes).await?;
        if !checked.is_success() {
            return Ok(checked)
        }
        self.await_inclusion(&checked.transaction_hash).await
    }
}
