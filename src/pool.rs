use rusqlite::Connection;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use std::{
    ops::{Deref, DerefMut},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    config::Config,
    error::{DBResult, DbError},
};

/// A bounded set of SQLite connections shared by every request.
///
/// At most `pool_size` connections exist at once. Connections are opened on demand,
/// handed back on drop and reused. Blocking `rusqlite` work runs on tokio's blocking
/// threads so callers stay async.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    path: PathBuf,
    foreign_keys: bool,
    timeout: Duration,
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
}

/// A connection checked out of the pool. Returned to the idle list when dropped.
pub struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl Pool {
    /// Creates the pool and opens one connection up front so a bad path fails at startup.
    pub fn open(config: &Config) -> DBResult<Self> {
        let inner = PoolInner {
            path: config.db_path.clone(),
            foreign_keys: config.foreign_keys,
            timeout: config.timeout,
            idle: Mutex::new(Vec::with_capacity(config.pool_size)),
            permits: Arc::new(Semaphore::new(config.pool_size)),
        };

        let first = inner.connect()?;
        inner.lock_idle()?.push(first);

        log::debug!(
            "[Pool::open] Opened {} (pool size {}, timeout {:?})",
            inner.path.display(),
            config.pool_size,
            inner.timeout
        );

        Ok(Self { inner: Arc::new(inner) })
    }

    /// Runs `f` on a pooled connection, bounded by the configured deadline.
    ///
    /// The deadline covers both waiting for a free connection and the work itself.
    /// On timeout the blocking task is not interrupted; its result is discarded.
    pub async fn run<T, F>(&self, f: F) -> DBResult<T>
    where
        F: FnOnce(&mut Connection) -> DBResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let timeout = inner.timeout;

        let work = async move {
            let permit = Arc::clone(&inner.permits)
                .acquire_owned()
                .await
                .map_err(|_| DbError::Pool(String::from("connection pool is closed")))?;

            tokio::task::spawn_blocking(move || {
                let mut conn = PoolInner::checkout(inner, permit)?;
                f(&mut *conn)
            })
            .await
            .map_err(|err| DbError::Pool(format!("blocking task failed: {err}")))?
        };

        tokio::time::timeout(timeout, work)
            .await
            .map_err(|_| DbError::Timeout)
            .inspect_err(|_| log::error!("[Pool::run] Operation exceeded {timeout:?}"))?
    }

    /// Stops handing out connections and closes the idle ones.
    ///
    /// Connections still checked out are closed when their holder drops them.
    pub fn close(&self) {
        self.inner.permits.close();
        match self.inner.idle.lock() {
            Ok(mut idle) => {
                log::debug!("[Pool::close] Closing {} idle connection(s)", idle.len());
                idle.clear();
            }
            Err(err) => log::error!("[Pool::close] Idle list poisoned: {err}"),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.permits.is_closed()
    }
}

impl PoolInner {
    fn connect(&self) -> DBResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.timeout)?;
        if self.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        Ok(conn)
    }

    fn lock_idle(&self) -> DBResult<std::sync::MutexGuard<'_, Vec<Connection>>> {
        self.idle
            .lock()
            .map_err(|err| DbError::Pool(format!("idle list poisoned: {err}")))
    }

    /// Reuses an idle connection or opens a new one. The permit guarantees we stay under the bound.
    fn checkout(pool: Arc<PoolInner>, permit: OwnedSemaphorePermit) -> DBResult<PooledConnection> {
        let reused = pool.lock_idle()?.pop();
        let conn = match reused {
            Some(conn) => conn,
            None => {
                log::trace!("[Pool::checkout] Opening a new connection to {}", pool.path.display());
                pool.connect()?
            }
        };

        Ok(PooledConnection { conn: Some(conn), pool, _permit: permit })
    }
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("connection is only taken on drop")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection is only taken on drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else { return };
        if self.pool.permits.is_closed() {
            return;
        }
        if let Ok(mut idle) = self.pool.idle.lock() {
            idle.push(conn);
        }
    }
}
