use crate::config::PoolConfig;
use crate::context::Context;
use crate::error::{Error, Result};
use futures::future::BoxFuture;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, mpsc};
use tokio_util::sync::CancellationToken;

/// Opens one new connection.
pub type ConnFactory<C> = Arc<dyn Fn() -> BoxFuture<'static, Result<C>> + Send + Sync>;

/// Bounded, lazily filled pool of long-lived connections.
///
/// Idle connections sit in a channel of capacity `max_capacity`; `created` counts connections
/// alive (idle + borrowed). A borrowed connection is a [`PooledConn`] guard that goes back to
/// the pool when dropped.
pub struct ConnPool<C: Send + 'static> {
    inner: Arc<Inner<C>>,
}

struct Inner<C> {
    factory: ConnFactory<C>,
    config: PoolConfig,
    idle_tx: mpsc::Sender<C>,
    idle_rx: tokio::sync::Mutex<mpsc::Receiver<C>>,
    created: Mutex<usize>,
    slot_freed: Notify,
    closed: AtomicBool,
    closing: CancellationToken,
}

impl<C: Send + 'static> Clone for ConnPool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Send + 'static> ConnPool<C> {
    /// Builds an empty pool. No connection is opened until the first [`ConnPool::get`], whatever
    /// `config.initial_size` says.
    pub fn new(factory: ConnFactory<C>, config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let (idle_tx, idle_rx) = mpsc::channel(config.max_capacity);
        tracing::debug!(
            initial_size = config.initial_size,
            max_capacity = config.max_capacity,
            "connection pool created"
        );
        Ok(Self {
            inner: Arc::new(Inner {
                factory,
                config,
                idle_tx,
                idle_rx: tokio::sync::Mutex::new(idle_rx),
                created: Mutex::new(0),
                slot_freed: Notify::new(),
                closed: AtomicBool::new(false),
                closing: CancellationToken::new(),
            }),
        })
    }

    pub fn config(&self) -> PoolConfig {
        self.inner.config
    }

    /// Connections currently alive, idle or borrowed.
    pub fn created(&self) -> usize {
        *lock(&self.inner.created)
    }

    /// Idle connections waiting in the pool.
    pub fn idle(&self) -> usize {
        self.inner.config.max_capacity - self.inner.idle_tx.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Borrows a connection, creating one if the pool is below capacity, otherwise waiting
    /// until another caller returns one or `ctx` expires.
    pub async fn get(&self, ctx: &Context) -> Result<PooledConn<C>> {
        let conn = ctx.run(self.acquire()).await??;
        Ok(PooledConn {
            conn: Some(conn),
            pool: self.inner.clone(),
        })
    }

    async fn acquire(&self) -> Result<C> {
        let inner = &self.inner;
        loop {
            if self.is_closed() {
                return Err(Error::ClientClosed);
            }

            if let Ok(mut rx) = inner.idle_rx.try_lock() {
                if let Ok(conn) = rx.try_recv() {
                    return Ok(conn);
                }
            }

            if let Some(slot) = inner.reserve_slot() {
                // Dropping this future mid-dial drops `slot`, which frees it.
                return match (inner.factory)().await {
                    Ok(conn) => Ok(slot.fill(conn)),
                    Err(err) => {
                        drop(slot);
                        tracing::warn!(err = %err, "failed to open pooled connection");
                        Err(match err {
                            Error::Connection(_) => err,
                            other => Error::Connection(other.to_string()),
                        })
                    }
                };
            }

            let mut rx = tokio::select! {
                rx = inner.idle_rx.lock() => rx,
                _ = inner.closing.cancelled() => return Err(Error::ClientClosed),
            };
            tokio::select! {
                conn = rx.recv() => match conn {
                    Some(conn) => return Ok(conn),
                    None => return Err(Error::ClientClosed),
                },
                _ = inner.slot_freed.notified() => continue,
                _ = inner.closing.cancelled() => return Err(Error::ClientClosed),
            }
        }
    }

    /// Returns a connection. Closed pools drop it instead.
    pub fn put(&self, conn: Option<C>) {
        if let Some(conn) = conn {
            self.inner.put(conn);
        }
    }

    /// Drops every idle connection; later returns are dropped too. Blocked waiters fail with
    /// `ClientClosed`. Idempotent.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.closing.cancel();
        let mut rx = self.inner.idle_rx.lock().await;
        rx.close();
        let mut drained = 0usize;
        while let Ok(conn) = rx.try_recv() {
            drop(conn);
            self.inner.release_slot();
            drained += 1;
        }
        tracing::debug!(drained, "connection pool closed");
    }
}

impl<C> Inner<C> {
    fn reserve_slot(&self) -> Option<Slot<'_, C>> {
        let mut created = lock(&self.created);
        if *created < self.config.max_capacity {
            *created += 1;
            Some(Slot {
                inner: self,
                filled: false,
            })
        } else {
            None
        }
    }

    fn release_slot(&self) {
        let mut created = lock(&self.created);
        *created = created.saturating_sub(1);
        drop(created);
        self.slot_freed.notify_one();
    }

    fn put(&self, conn: C) {
        if self.closed.load(Ordering::Acquire) {
            drop(conn);
            self.release_slot();
            return;
        }
        if let Err(err) = self.idle_tx.try_send(conn) {
            // Full or closed: the connection is not wanted anymore.
            drop(err.into_inner());
            self.release_slot();
        }
    }
}

/// A counted creation slot with no connection in it yet. Released on drop unless filled.
struct Slot<'a, C> {
    inner: &'a Inner<C>,
    filled: bool,
}

impl<C> Slot<'_, C> {
    fn fill(mut self, conn: C) -> C {
        self.filled = true;
        conn
    }
}

impl<C> Drop for Slot<'_, C> {
    fn drop(&mut self) {
        if !self.filled {
            self.inner.release_slot();
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Exclusive borrow of a pooled connection; returned to the pool on drop.
pub struct PooledConn<C: Send + 'static> {
    conn: Option<C>,
    pool: Arc<Inner<C>>,
}

impl<C: Send + 'static> PooledConn<C> {
    /// Closes the connection instead of returning it.
    pub fn discard(mut self) {
        if self.conn.take().is_some() {
            self.pool.release_slot();
        }
    }
}

impl<C: Send + 'static> Deref for PooledConn<C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.conn.as_ref().expect("pooled connection already released")
    }
}

impl<C: Send + 'static> DerefMut for PooledConn<C> {
    fn deref_mut(&mut self) -> &mut C {
        self.conn.as_mut().expect("pooled connection already released")
    }
}

impl<C: Send + 'static> Drop for PooledConn<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put(conn);
        }
    }
}
