use std::{collections::BTreeSet, sync::Arc};

use log::{debug, warn};
use tokio::sync::{Mutex, broadcast, mpsc, oneshot};

use crate::{
    contact::{Contact, ContactPatch},
    core::store::{ContactStore, StoreError},
    persist::{ContactSink, PersistError},
    types::ContactId,
};

use super::events::ContactEvent;

/// Errors surfaced by [`ContactBookHandle`] calls.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The store rejected the mutation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Saving to the sink failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// Refused to add a contact with every text field empty.
    #[error("refusing to add an empty contact")]
    EmptyContact,
    /// The runtime loop has stopped.
    #[error("contact book runtime is not running")]
    ChannelClosed,
}

/// Tuning for [`spawn_contact_book`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Capacity of the command queue.
    pub command_queue_bound: usize,
    /// Capacity of the broadcast event channel.
    pub event_capacity: usize,
    /// Save after every successful mutation instead of only on demand and
    /// at shutdown.
    pub save_after_mutation: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
            save_after_mutation: false,
        }
    }
}

/// Cloneable handle to a running contact book.
#[derive(Clone)]
pub struct ContactBookHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<ContactEvent>,
}

type SharedSink = Arc<Mutex<Box<dyn ContactSink>>>;

enum Command {
    Add {
        contact: Contact,
        resp: oneshot::Sender<Result<usize, RuntimeError>>,
    },
    Update {
        contact: Contact,
        resp: oneshot::Sender<Result<usize, RuntimeError>>,
    },
    Patch {
        id: ContactId,
        patch: ContactPatch,
        resp: oneshot::Sender<Result<usize, RuntimeError>>,
    },
    RemoveAt {
        positions: BTreeSet<usize>,
        resp: oneshot::Sender<Result<Vec<Contact>, RuntimeError>>,
    },
    Remove {
        id: ContactId,
        resp: oneshot::Sender<Result<Contact, RuntimeError>>,
    },
    Get {
        id: ContactId,
        resp: oneshot::Sender<Option<Contact>>,
    },
    List {
        resp: oneshot::Sender<Vec<Contact>>,
    },
    Save {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

/// Moves `store` into a single-writer task and returns a handle to it.
///
/// Every mutation is applied in arrival order by that one task. With a
/// `sink`, the store is saved on [`ContactBookHandle::save`], at shutdown
/// when dirty, and after each mutation if configured. Must be called within
/// a tokio runtime.
pub fn spawn_contact_book(
    store: ContactStore,
    sink: Option<Box<dyn ContactSink>>,
    config: RuntimeConfig,
) -> ContactBookHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound.max(1));
    let (events_tx, _) = broadcast::channel::<ContactEvent>(config.event_capacity.max(1));
    let sink: Option<SharedSink> = sink.map(|s| Arc::new(Mutex::new(s)));

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut store = store;
        let mut shut_down = false;
        debug!("contact book started with {} contacts", store.len());

        while let Some(cmd) = cmd_rx.recv().await {
            let done = handle_command(cmd, &mut store, &events_tx_loop, sink.as_ref(), &config).await;
            if done {
                shut_down = true;
                break;
            }
        }

        if !shut_down && store.is_dirty() {
            debug!("all handles dropped, saving pending changes");
            let _ = save_store(&mut store, sink.as_ref(), &events_tx_loop).await;
        }
        debug!("contact book stopped");
    });

    ContactBookHandle { cmd_tx, events_tx }
}

impl ContactBookHandle {
    /// Subscribes to change and save events.
    pub fn subscribe(&self) -> broadcast::Receiver<ContactEvent> {
        self.events_tx.subscribe()
    }

    /// Adds a contact in sorted order and returns its position.
    pub async fn add(&self, contact: Contact) -> Result<usize, RuntimeError> {
        self.request(|resp| Command::Add { contact, resp }).await?
    }

    /// Replaces the stored contact with the same id.
    pub async fn update(&self, contact: Contact) -> Result<usize, RuntimeError> {
        self.request(|resp| Command::Update { contact, resp }).await?
    }

    /// Applies `patch` to the contact with `id`.
    pub async fn patch(&self, id: ContactId, patch: ContactPatch) -> Result<usize, RuntimeError> {
        self.request(|resp| Command::Patch { id, patch, resp }).await?
    }

    /// Removes contacts at `positions` of the current sorted order.
    pub async fn remove_at(&self, positions: BTreeSet<usize>) -> Result<Vec<Contact>, RuntimeError> {
        self.request(|resp| Command::RemoveAt { positions, resp }).await?
    }

    /// Removes the contact with `id`.
    pub async fn remove(&self, id: ContactId) -> Result<Contact, RuntimeError> {
        self.request(|resp| Command::Remove { id, resp }).await?
    }

    /// Looks up a contact by id.
    pub async fn get(&self, id: ContactId) -> Result<Option<Contact>, RuntimeError> {
        self.request(|resp| Command::Get { id, resp }).await
    }

    /// Returns every contact in sorted order.
    pub async fn list(&self) -> Result<Vec<Contact>, RuntimeError> {
        self.request(|resp| Command::List { resp }).await
    }

    /// Writes the store to the sink now.
    pub async fn save(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Save { resp }).await?
    }

    /// Saves if there are unsaved changes, then stops the runtime.
    ///
    /// When that save fails the error is returned and the runtime keeps
    /// running with every contact intact, so the call can be retried.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await?
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

async fn handle_command(
    cmd: Command,
    store: &mut ContactStore,
    events_tx: &broadcast::Sender<ContactEvent>,
    sink: Option<&SharedSink>,
    config: &RuntimeConfig,
) -> bool {
    match cmd {
        Command::Add { contact, resp } => {
            let res = if contact.is_empty() {
                warn!("rejected empty contact {}", contact.id());
                Err(RuntimeError::EmptyContact)
            } else {
                let id = contact.id();
                store.insert(contact).map_err(RuntimeError::from).inspect(|&index| {
                    let _ = events_tx.send(ContactEvent::Inserted { id, index });
                })
            };
            after_mutation(res.is_ok(), store, events_tx, sink, config).await;
            let _ = resp.send(res);
        }
        Command::Update { contact, resp } => {
            let id = contact.id();
            let res = store.update(contact).map_err(RuntimeError::from).inspect(|&index| {
                let _ = events_tx.send(ContactEvent::Updated { id, index });
            });
            after_mutation(res.is_ok(), store, events_tx, sink, config).await;
            let _ = resp.send(res);
        }
        Command::Patch { id, patch, resp } => {
            let res = store.patch(id, &patch).map_err(RuntimeError::from).inspect(|&index| {
                let _ = events_tx.send(ContactEvent::Updated { id, index });
            });
            after_mutation(res.is_ok(), store, events_tx, sink, config).await;
            let _ = resp.send(res);
        }
        Command::RemoveAt { positions, resp } => {
            let res = store.remove_at(&positions).map_err(RuntimeError::from).inspect(|removed| {
                if !removed.is_empty() {
                    let ids = removed.iter().map(Contact::id).collect();
                    let _ = events_tx.send(ContactEvent::Removed { ids });
                }
            });
            let changed = res.as_ref().is_ok_and(|removed| !removed.is_empty());
            after_mutation(changed, store, events_tx, sink, config).await;
            let _ = resp.send(res);
        }
        Command::Remove { id, resp } => {
            let res = store.remove(id).map_err(RuntimeError::from).inspect(|_| {
                let _ = events_tx.send(ContactEvent::Removed { ids: vec![id] });
            });
            after_mutation(res.is_ok(), store, events_tx, sink, config).await;
            let _ = resp.send(res);
        }
        Command::Get { id, resp } => {
            let _ = resp.send(store.get(id).cloned());
        }
        Command::List { resp } => {
            let _ = resp.send(store.export());
        }
        Command::Save { resp } => {
            let res = save_store(store, sink, events_tx).await;
            let _ = resp.send(res);
        }
        Command::Shutdown { resp } => {
            let res = if store.is_dirty() {
                save_store(store, sink, events_tx).await
            } else {
                Ok(())
            };
            // A failed save keeps the loop and the store alive.
            let done = res.is_ok();
            if !done {
                warn!("shutdown aborted, {} unsaved contacts kept in memory", store.len());
            }
            let _ = resp.send(res);
            return done;
        }
    }

    false
}

async fn after_mutation(
    changed: bool,
    store: &mut ContactStore,
    events_tx: &broadcast::Sender<ContactEvent>,
    sink: Option<&SharedSink>,
    config: &RuntimeConfig,
) {
    if changed && config.save_after_mutation {
        // Failure is already logged and broadcast; the mutation stands.
        let _ = save_store(store, sink, events_tx).await;
    }
}

async fn save_store(
    store: &mut ContactStore,
    sink: Option<&SharedSink>,
    events_tx: &broadcast::Sender<ContactEvent>,
) -> Result<(), RuntimeError> {
    let Some(sink) = sink else {
        return Ok(());
    };

    let count = store.len();
    let written = match store.to_json() {
        Ok(bytes) => {
            let sink_ref = Arc::clone(sink);
            match tokio::task::spawn_blocking(move || {
                let mut sink = sink_ref.blocking_lock();
                sink.write_bytes(&bytes).map(|()| bytes.len())
            })
            .await
            {
                Ok(inner) => inner,
                Err(e) => Err(PersistError::Io(std::io::Error::other(format!("join error: {e}")))),
            }
        }
        Err(err) => Err(err),
    };

    match store.finish_save(written) {
        Ok(()) => {
            let _ = events_tx.send(ContactEvent::Saved { count });
            Ok(())
        }
        Err(err) => {
            let _ = events_tx.send(ContactEvent::SaveFailed {
                message: err.to_string(),
            });
            Err(err.into())
        }
    }
}
