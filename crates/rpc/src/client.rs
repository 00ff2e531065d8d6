//! JSON-RPC client for a node and its indexer.

use alloy_primitives::{B256, Bytes as HexBytes};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use spore_mint::{CellProvider, LedgerClient, TxStatus};
use spore_primitives::{LiveCell, Script, Transaction};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::RpcError;
use crate::retry::{RetryPolicy, retry};
use crate::types::{
    IndexerCell, JsonTransaction, Order, Pagination, SearchKey, TransactionWithStatus, quantity,
};

/// Node error code for a transaction already in the pool.
pub const DUPLICATED_TRANSACTION_CODE: i64 = -1107;

/// Default indexer page size.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
struct Response<R> {
    #[serde(default)]
    result: Option<R>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// Client for a node RPC endpoint and an indexer endpoint.
///
/// The two may be the same URL; a node with the indexer module enabled
/// serves both.
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    rpc_url: Url,
    indexer_url: Url,
    retry: RetryPolicy,
    page_size: u64,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Creates a client for the given endpoints.
    pub fn new(rpc_url: &str, indexer_url: &str) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(RpcError::Client)?;
        Ok(Self {
            http,
            rpc_url: Url::parse(rpc_url)?,
            indexer_url: Url::parse(indexer_url)?,
            retry: RetryPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            next_id: AtomicU64::new(1),
        })
    }

    /// Sets how transient failures are retried.
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the number of cells requested per indexer page.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Node endpoint.
    pub const fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    /// Indexer endpoint.
    pub const fn indexer_url(&self) -> &Url {
        &self.indexer_url
    }

    async fn call<P, R>(
        &self,
        endpoint: &Url,
        method: &'static str,
        params: P,
    ) -> Result<Option<R>, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = Request {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let http = &self.http;
        let request = &request;

        let body = retry(&self.retry, method, move || async move {
            let response = http
                .post(endpoint.clone())
                .json(request)
                .send()
                .await
                .map_err(|source| RpcError::Http { method, source })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RpcError::Status {
                    method,
                    status: status.as_u16(),
                    body,
                });
            }
            response
                .bytes()
                .await
                .map_err(|source| RpcError::Http { method, source })
        })
        .await?;

        let response: Response<R> =
            serde_json::from_slice(&body).map_err(|source| RpcError::Decode { method, source })?;
        match response.error {
            Some(error) => Err(RpcError::Rpc {
                method,
                code: error.code,
                message: error.message,
            }),
            None => Ok(response.result),
        }
    }

    /// One page of indexer cells.
    pub async fn get_cells(
        &self,
        search_key: &SearchKey,
        order: Order,
        limit: u64,
        cursor: Option<&HexBytes>,
    ) -> Result<Pagination<IndexerCell>, RpcError> {
        const METHOD: &str = "get_cells";
        let params = (search_key, order, quantity::format(limit), cursor);
        self.call(&self.indexer_url, METHOD, params)
            .await?
            .ok_or(RpcError::EmptyResult { method: METHOD })
    }

    /// Every live cell locked by `lock` with no type script and no data.
    pub async fn plain_cells(&self, lock: &Script) -> Result<Vec<LiveCell>, RpcError> {
        let search_key = SearchKey::plain_cells(lock);
        let mut cursor: Option<HexBytes> = None;
        let mut cells = Vec::new();

        loop {
            let page = self
                .get_cells(&search_key, Order::Asc, self.page_size, cursor.as_ref())
                .await?;
            let count = page.objects.len() as u64;

            for object in page.objects {
                let cell = LiveCell::try_from(object).map_err(|value| RpcError::InvalidField {
                    method: "get_cells",
                    field: "out_point",
                    value,
                })?;
                if cell.cell.is_plain() {
                    cells.push(cell);
                }
            }

            if count < self.page_size || page.last_cursor.is_empty() {
                break;
            }
            cursor = Some(page.last_cursor);
        }

        debug!(count = cells.len(), "collected live cells");
        Ok(cells)
    }

    /// Broadcasts a transaction without output validation.
    ///
    /// A transaction the pool already holds counts as sent.
    pub async fn send_transaction(&self, tx: &Transaction) -> Result<B256, RpcError> {
        const METHOD: &str = "send_transaction";
        let tx_hash = tx.hash();
        let params = (JsonTransaction::from(tx), "passthrough");

        match self.call::<_, B256>(&self.rpc_url, METHOD, params).await {
            Ok(Some(hash)) => {
                debug!(%hash, "transaction sent");
                Ok(hash)
            }
            Ok(None) => Err(RpcError::EmptyResult { method: METHOD }),
            Err(RpcError::Rpc { code, .. }) if code == DUPLICATED_TRANSACTION_CODE => {
                debug!(%tx_hash, "transaction already in pool");
                Ok(tx_hash)
            }
            Err(e) => Err(e),
        }
    }

    /// A transaction and its status, if the node knows it.
    pub async fn get_transaction(
        &self,
        tx_hash: &B256,
    ) -> Result<Option<TransactionWithStatus>, RpcError> {
        self.call(&self.rpc_url, "get_transaction", [tx_hash]).await
    }

    /// Status of a transaction.
    pub async fn transaction_status(&self, tx_hash: &B256) -> Result<TxStatus, RpcError> {
        let Some(found) = self.get_transaction(tx_hash).await? else {
            return Ok(TxStatus::Unknown);
        };
        TxStatus::try_from(found.tx_status).map_err(|value| RpcError::InvalidField {
            method: "get_transaction",
            field: "tx_status",
            value,
        })
    }
}

impl CellProvider for RpcClient {
    type Error = RpcError;

    fn live_cells(
        &self,
        lock: &Script,
    ) -> impl Future<Output = Result<Vec<LiveCell>, Self::Error>> + Send {
        self.plain_cells(lock)
    }
}

impl LedgerClient for RpcClient {
    type Error = RpcError;

    fn send_transaction(
        &self,
        tx: &Transaction,
    ) -> impl Future<Output = Result<B256, Self::Error>> + Send {
        Self::send_transaction(self, tx)
    }

    fn transaction_status(
        &self,
        tx_hash: &B256,
    ) -> impl Future<Output = Result<TxStatus, Self::Error>> + Send {
        Self::transaction_status(self, tx_hash)
    }
}
