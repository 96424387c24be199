//! The engine: one node endpoint, a bounded connection pool and the generic RPC dispatcher.

mod build;
mod query;

use crate::config::{ClientConfig, PoolConfig};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::grpc::{GrpcTransport, Transport, WalletClient};
use crate::pool::{ConnFactory, ConnPool};
use crate::protocol::r#return::ResponseCode;
use crate::protocol::{EstimateEnergyMessage, Return, TransactionExtention};
use crate::telemetry::ClientTelemetry;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tonic::Status;

/// Client for a single node.
///
/// Cheap to share behind an `Arc`; every method takes `&self` and borrows one pooled
/// connection per RPC.
pub struct TronClient<T: Transport = GrpcTransport> {
    pool: ConnPool<T>,
    timeout: Duration,
    endpoint: String,
    closed: AtomicBool,
    telemetry: ClientTelemetry,
}

impl TronClient<GrpcTransport> {
    /// Builds the client. No connection is opened until the first RPC.
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let endpoint = cfg.endpoint.clone();
        let api_key = cfg.api_key.clone();
        let factory: ConnFactory<GrpcTransport> = Arc::new(move || {
            let endpoint = endpoint.clone();
            let api_key = api_key.clone();
            Box::pin(async move { GrpcTransport::connect(&endpoint, api_key.as_deref()).await })
        });
        Self::with_factory(cfg.endpoint.to_string(), factory, cfg.pool, cfg.timeout)
    }

    /// Shorthand for [`TronClient::new`] with defaults.
    pub fn connect(endpoint: &str) -> Result<Self> {
        Self::new(ClientConfig::new(endpoint)?)
    }

    /// Reads [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<T: Transport> TronClient<T> {
    /// Builds a client over an arbitrary transport factory.
    pub fn with_factory(
        endpoint: impl Into<String>,
        factory: ConnFactory<T>,
        pool: PoolConfig,
        timeout: Duration,
    ) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::InvalidParameter("timeout must be non-zero".into()));
        }
        let endpoint = endpoint.into();
        let pool = ConnPool::new(factory, pool)?;
        tracing::info!(endpoint = %endpoint, timeout_ms = timeout.as_millis() as u64, "tron client ready");
        Ok(Self {
            pool,
            timeout,
            endpoint,
            closed: AtomicBool::new(false),
            telemetry: ClientTelemetry::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Per-RPC timeout used when the caller's context carries no deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn pool(&self) -> &ConnPool<T> {
        &self.pool
    }

    pub(crate) fn telemetry(&self) -> &ClientTelemetry {
        &self.telemetry
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closes the pool. Idempotent; later operations fail with [`Error::ClientClosed`].
    pub async fn close(&self) {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        self.pool.close().await;
        tracing::info!(endpoint = %self.endpoint, "tron client closed");
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ClientClosed);
        }
        Ok(())
    }

    /// Runs one RPC on a pooled connection.
    ///
    /// The client timeout applies to this call only, and only when `ctx` has no deadline. The
    /// connection goes back to the pool on every exit path. Transport errors come back as
    /// `<label>: <status>`.
    pub async fn dispatch<R, F, Fut>(&self, ctx: &Context, label: &'static str, f: F) -> Result<R>
    where
        F: FnOnce(WalletClient<T>) -> Fut,
        Fut: Future<Output = std::result::Result<R, Status>>,
    {
        self.dispatch_validated(ctx, label, f, |_: &R, _: &str| Ok(()))
            .await
    }

    /// [`TronClient::dispatch`] followed by `validate` on the response.
    pub async fn dispatch_validated<R, F, Fut, V>(
        &self,
        ctx: &Context,
        label: &'static str,
        f: F,
        validate: V,
    ) -> Result<R>
    where
        F: FnOnce(WalletClient<T>) -> Fut,
        Fut: Future<Output = std::result::Result<R, Status>>,
        V: FnOnce(&R, &str) -> Result<()>,
    {
        self.ensure_open()?;
        let ctx = ctx.or_timeout(self.timeout);
        let started = Instant::now();

        let out = match self.call(&ctx, label, f).await {
            Ok(resp) => validate(&resp, label).map(|()| resp),
            Err(err) => Err(err),
        };

        let ok = out.is_ok();
        self.telemetry
            .rpc_ms(label, ok, started.elapsed().as_millis() as u64);
        if let Err(err) = &out {
            tracing::debug!(label, err = %err, "tron rpc failed");
        }
        out
    }

    async fn call<R, F, Fut>(&self, ctx: &Context, label: &'static str, f: F) -> Result<R>
    where
        F: FnOnce(WalletClient<T>) -> Fut,
        Fut: Future<Output = std::result::Result<R, Status>>,
    {
        let conn = self
            .pool
            .get(ctx)
            .await
            .map_err(|e| Error::labelled(label, e))?;
        let client = WalletClient::new((*conn).clone());

        match ctx.run(f(client)).await {
            Ok(Ok(resp)) => Ok(resp),
            Ok(Err(status)) => {
                if status.code() == tonic::Code::Unavailable {
                    conn.discard();
                }
                Err(Error::rpc(label, status))
            }
            Err(err) => Err(Error::labelled(label, err)),
        }
    }

    /// Dispatch of a build RPC: the envelope must report success and carry a transaction.
    pub(crate) async fn build<F, Fut>(
        &self,
        ctx: &Context,
        label: &'static str,
        f: F,
    ) -> Result<TransactionExtention>
    where
        F: FnOnce(WalletClient<T>) -> Fut,
        Fut: Future<Output = std::result::Result<TransactionExtention, Status>>,
    {
        self.dispatch_validated(ctx, label, f, check_built).await
    }
}

/// Responses that carry a `(result, code, message)` envelope.
pub trait Envelope {
    fn envelope(&self) -> Option<&Return>;
}

impl Envelope for Return {
    fn envelope(&self) -> Option<&Return> {
        Some(self)
    }
}

impl Envelope for TransactionExtention {
    fn envelope(&self) -> Option<&Return> {
        self.result.as_ref()
    }
}

impl Envelope for EstimateEnergyMessage {
    fn envelope(&self) -> Option<&Return> {
        self.result.as_ref()
    }
}

/// Fails with [`Error::BuildRejected`] unless the envelope reports success.
pub fn check_envelope<R: Envelope>(resp: &R, label: &str) -> Result<()> {
    match resp.envelope() {
        Some(ret) if ret.result => Ok(()),
        Some(ret) => Err(Error::BuildRejected {
            label: label.to_string(),
            code: ret.response_code(),
            message: ret.message_utf8(),
        }),
        None => Err(Error::BuildRejected {
            label: label.to_string(),
            code: ResponseCode::OtherError,
            message: "response carries no result envelope".to_string(),
        }),
    }
}

fn check_built(ext: &TransactionExtention, label: &str) -> Result<()> {
    check_envelope(ext, label)?;
    match ext.transaction.as_ref() {
        Some(tx) if tx.raw_data.is_some() => Ok(()),
        _ => Err(Error::BuildRejected {
            label: label.to_string(),
            code: ext
                .result
                .as_ref()
                .map(Return::response_code)
                .unwrap_or(ResponseCode::OtherError),
            message: "node returned no transaction".to_string(),
        }),
    }
}
