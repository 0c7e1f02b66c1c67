//! Single-owner message-passing strategy.
//!
//! A tokio task owns the table and serves requests from a bounded mailbox one
//! at a time. Callers send a command carrying a `oneshot` reply sender and
//! await the reply; nobody else can reach the table, so there is no shared
//! memory to race on and every operation is totally ordered by mailbox order.
//!
//! ```text
//!   task ─┐  Command::Get { key, reply }      ┌─► owner task ──reply──► task
//!   task ─┼──────────► [ mpsc mailbox ] ──────┤    (FxHashMap)
//!   task ─┘  Command::Set { key, value, reply }
//! ```
//!
//! The async path ([`AsyncCacheStore`]) suspends the caller without holding a
//! thread. The blocking path ([`CacheStore`]) is a bridge for callers outside
//! any runtime; calling it from inside a runtime worker panics, as with every
//! tokio `blocking_*` call.
//!
//! When the last handle is dropped the mailbox closes and the owner task
//! exits. If the runtime is shut down first, requests cannot be delivered:
//! `get` yields `None` and `set` is dropped, each with a warning.

use std::hash::Hash;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::traits::{AsyncCacheStore, CacheStore};

/// Default mailbox depth; senders wait once this many requests are queued.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1024;

enum Command<K, V> {
    Get {
        key: K,
        reply: oneshot::Sender<Option<V>>,
    },
    Set {
        key: K,
        value: V,
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a cache owned by a dedicated async task.
pub struct ActorCache<K, V> {
    mailbox: mpsc::Sender<Command<K, V>>,
}

impl<K, V> ActorCache<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Spawns the owner task on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime; use [`ActorCache::spawn_on`]
    /// with an explicit handle instead.
    pub fn spawn(mailbox_capacity: usize) -> Self {
        Self::spawn_on(&Handle::current(), mailbox_capacity)
    }

    /// Spawns the owner task on `runtime`.
    pub fn spawn_on(runtime: &Handle, mailbox_capacity: usize) -> Self {
        let (mailbox, inbox) = mpsc::channel(mailbox_capacity.max(1));
        runtime.spawn(serve(inbox));
        Self { mailbox }
    }
}

async fn serve<K, V>(mut inbox: mpsc::Receiver<Command<K, V>>)
where
    K: Eq + Hash,
    V: Clone,
{
    let mut table = FxHashMap::default();
    while let Some(command) = inbox.recv().await {
        match command {
            Command::Get { key, reply } => {
                let _ = reply.send(table.get(&key).cloned());
            },
            Command::Set { key, value, reply } => {
                table.insert(key, value);
                let _ = reply.send(());
            },
        }
    }
    debug!(entries = table.len(), "actor mailbox closed");
}

#[async_trait]
impl<K, V> AsyncCacheStore<K, V> for ActorCache<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let (reply, response) = oneshot::channel();
        let command = Command::Get {
            key: key.clone(),
            reply,
        };
        if self.mailbox.send(command).await.is_err() {
            warn!("actor owner task is gone; get answered as absent");
            return None;
        }
        response.await.ok().flatten()
    }

    async fn set(&self, key: K, value: V) {
        let (reply, response) = oneshot::channel();
        if self
            .mailbox
            .send(Command::Set { key, value, reply })
            .await
            .is_err()
        {
            warn!("actor owner task is gone; set dropped");
            return;
        }
        let _ = response.await;
    }
}

impl<K, V> CacheStore<K, V> for ActorCache<K, V>
where
    K: Clone + Send,
    V: Send,
{
    fn get(&self, key: &K) -> Option<V> {
        let (reply, response) = oneshot::channel();
        let command = Command::Get {
            key: key.clone(),
            reply,
        };
        if self.mailbox.blocking_send(command).is_err() {
            warn!("actor owner task is gone; get answered as absent");
            return None;
        }
        response.blocking_recv().ok().flatten()
    }

    fn set(&self, key: K, value: V) {
        let (reply, response) = oneshot::channel();
        if self
            .mailbox
            .blocking_send(Command::Set { key, value, reply })
            .is_err()
        {
            warn!("actor owner task is gone; set dropped");
            return;
        }
        let _ = response.blocking_recv();
    }

    fn label(&self) -> &'static str {
        "Actor"
    }
}
