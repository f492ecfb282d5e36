//! Fixed-size pool of fetch sessions
//!
//! The pool hands out exclusive access to one session per worker and
//! suspends callers while every session is lent out. Waiters are queued
//! fairly by a tokio semaphore, so a session freed under contention goes to
//! the longest-waiting caller rather than to whichever task polls first.

use crate::SessionError;
use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// A fixed-size pool of reusable sessions
///
/// The pool never grows: the sessions passed to [`SessionPool::new`] are the
/// only ones it will ever hand out. `acquire` suspends until a session is
/// free and fails only after [`SessionPool::close`].
pub struct SessionPool<S> {
    free: Mutex<VecDeque<S>>,
    permits: Semaphore,
    capacity: usize,
}

impl<S: Send + 'static> SessionPool<S> {
    /// Creates a pool owning the given sessions
    pub fn new(sessions: Vec<S>) -> Arc<Self> {
        let capacity = sessions.len();
        Arc::new(Self {
            free: Mutex::new(sessions.into()),
            permits: Semaphore::new(capacity),
            capacity,
        })
    }

    /// Number of sessions the pool was created with
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of sessions currently available without waiting
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Borrows a session, suspending until one is free
    ///
    /// The returned guard gives exclusive access and returns the session to
    /// the pool when dropped, on every exit path.
    ///
    /// # Returns
    ///
    /// * `Ok(PooledSession)` - Exclusive access to one session
    /// * `Err(SessionError::PoolClosed)` - The pool was shut down
    pub async fn acquire(self: &Arc<Self>) -> Result<PooledSession<S>, SessionError> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| SessionError::PoolClosed)?;
        // The permit is restored by PooledSession::drop, not by the
        // permit's own RAII.
        permit.forget();

        let session = self
            .free
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(SessionError::PoolClosed)?;

        Ok(PooledSession {
            session: Some(session),
            pool: Arc::clone(self),
        })
    }

    /// Shuts the pool down
    ///
    /// Every pending and future `acquire` fails with `PoolClosed`. Sessions
    /// still lent out are returned and dropped with the pool.
    pub fn close(&self) {
        self.permits.close();
    }
}

/// Exclusive access to one pooled session
///
/// Dereferences to the session itself; dropping the guard returns the
/// session to the pool.
pub struct PooledSession<S: Send + 'static> {
    session: Option<S>,
    pool: Arc<SessionPool<S>>,
}

impl<S: Send + 'static> Deref for PooledSession<S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.session.as_ref().unwrap()
    }
}

impl<S: Send + 'static> DerefMut for PooledSession<S> {
    fn deref_mut(&mut self) -> &mut S {
        self.session.as_mut().unwrap()
    }
}

impl<S: Send + 'static> Drop for PooledSession<S> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.pool.free.lock().unwrap().push_back(session);
            self.pool.permits.add_permits(1);
        }
    }
}
