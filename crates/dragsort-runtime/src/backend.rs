#![forbid(unsafe_code)]

//! Async persistence backends and a driver that runs coordinator commands.
//!
//! The coordinator is sans-IO. Hosts either match on [`ReorderCmd`]
//! themselves or implement [`OrderBackend`] and let [`drive`] run the
//! command chain (persist, then reload on failure) to completion. Any
//! executor works; nothing here spawns or sleeps.

use tracing::Instrument;

use crate::cmd::{PersistenceFailure, ReorderCmd, ReorderMsg};
use crate::coordinator::{ReorderCoordinator, ReorderDispatch};
use crate::item::{ReorderItem, RepositionItem, sort_by_position};

/// Remote store for the list order.
#[allow(async_fn_in_trait)]
pub trait OrderBackend<T> {
    /// Store `ordered_ids` as the new order.
    async fn persist_order(&mut self, ordered_ids: &[String]) -> Result<(), PersistenceFailure>;

    /// Fetch the authoritative collection.
    async fn reload_items(&mut self) -> Result<Vec<T>, PersistenceFailure>;
}

/// Run the persistence leaves of `cmd` in order and collect their results.
///
/// Capture commands are host concerns and are skipped.
pub async fn execute<T, B>(backend: &mut B, cmd: ReorderCmd) -> Vec<ReorderMsg<T>>
where
    B: OrderBackend<T>,
{
    let mut msgs = Vec::new();
    for leaf in cmd.into_leaves() {
        match leaf {
            ReorderCmd::Persist {
                ticket,
                ordered_ids,
            } => {
                let span = tracing::debug_span!(
                    "dragsort.persist",
                    ticket = ticket.0,
                    items = ordered_ids.len()
                );
                let result = backend.persist_order(&ordered_ids).instrument(span).await;
                msgs.push(ReorderMsg::PersistResolved { ticket, result });
            }
            ReorderCmd::Reload { ticket } => {
                let span = tracing::debug_span!("dragsort.reload", ticket = ticket.0);
                let result = backend.reload_items().instrument(span).await;
                msgs.push(ReorderMsg::ReloadResolved { ticket, result });
            }
            ReorderCmd::None | ReorderCmd::Capture { .. } | ReorderCmd::Batch { .. } => {}
        }
    }
    msgs
}

/// Execute `cmd` against `backend`, feed every result back into
/// `coordinator`, and keep going until no persistence work remains.
///
/// Returns the dispatches produced by the fed-back results, in order.
pub async fn drive<T, B>(
    coordinator: &mut ReorderCoordinator<T>,
    backend: &mut B,
    cmd: ReorderCmd,
) -> Vec<ReorderDispatch>
where
    T: ReorderItem,
    B: OrderBackend<T>,
{
    let mut dispatches = Vec::new();
    let mut pending = cmd;
    while !pending.is_none() {
        let mut next = Vec::new();
        for msg in execute(backend, pending).await {
            let dispatch = coordinator.update(msg);
            next.push(dispatch.cmd.clone());
            dispatches.push(dispatch);
        }
        pending = ReorderCmd::batch(next);
    }
    dispatches
}

/// In-process backend holding the authoritative collection.
///
/// Failures can be scripted one call at a time. Persisting rewrites item
/// positions to match the stored order, so a reload returns the persisted
/// order.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend<T> {
    items: Vec<T>,
    persist_calls: usize,
    reload_calls: usize,
    last_persisted: Option<Vec<String>>,
    fail_next_persist: Option<String>,
    fail_next_reload: Option<String>,
}

impl<T: RepositionItem + Clone> MemoryBackend<T> {
    #[must_use]
    pub fn new(mut items: Vec<T>) -> Self {
        sort_by_position(&mut items);
        Self {
            items,
            persist_calls: 0,
            reload_calls: 0,
            last_persisted: None,
            fail_next_persist: None,
            fail_next_reload: None,
        }
    }

    /// Stored items in position order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Stored ids in position order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id().to_owned()).collect()
    }

    /// Replace the stored collection, as another client would.
    pub fn replace_items(&mut self, mut items: Vec<T>) {
        sort_by_position(&mut items);
        self.items = items;
    }

    /// Reject the next persist with `message`.
    pub fn fail_next_persist(&mut self, message: impl Into<String>) {
        self.fail_next_persist = Some(message.into());
    }

    /// Reject the next reload with `message`.
    pub fn fail_next_reload(&mut self, message: impl Into<String>) {
        self.fail_next_reload = Some(message.into());
    }

    #[must_use]
    pub fn persist_calls(&self) -> usize {
        self.persist_calls
    }

    #[must_use]
    pub fn reload_calls(&self) -> usize {
        self.reload_calls
    }

    /// Ids of the last accepted persist.
    #[must_use]
    pub fn last_persisted(&self) -> Option<&[String]> {
        self.last_persisted.as_deref()
    }

    fn store(&mut self, ordered_ids: &[String]) -> Result<(), PersistenceFailure> {
        if ordered_ids.len() != self.items.len() {
            return Err(PersistenceFailure::new(format!(
                "expected {} ids, got {}",
                self.items.len(),
                ordered_ids.len()
            )));
        }
        let mut reordered = Vec::with_capacity(self.items.len());
        for (slot, id) in ordered_ids.iter().enumerate() {
            let Some(item) = self.items.iter().find(|item| item.id() == id.as_str()) else {
                return Err(PersistenceFailure::new(format!("unknown id {id:?}")));
            };
            if reordered.iter().any(|placed: &T| placed.id() == id.as_str()) {
                return Err(PersistenceFailure::new(format!("duplicate id {id:?}")));
            }
            let mut item = item.clone();
            item.set_position(slot as i64);
            reordered.push(item);
        }
        self.items = reordered;
        self.last_persisted = Some(ordered_ids.to_vec());
        Ok(())
    }
}

impl<T: RepositionItem + Clone> OrderBackend<T> for MemoryBackend<T> {
    async fn persist_order(&mut self, ordered_ids: &[String]) -> Result<(), PersistenceFailure> {
        self.persist_calls += 1;
        if let Some(message) = self.fail_next_persist.take() {
            return Err(PersistenceFailure::new(message));
        }
        self.store(ordered_ids)
    }

    async fn reload_items(&mut self) -> Result<Vec<T>, PersistenceFailure> {
        self.reload_calls += 1;
        if let Some(message) = self.fail_next_reload.take() {
            return Err(PersistenceFailure::new(message));
        }
        Ok(self.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SimpleItem;
    use futures::executor::block_on;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|id| (*id).to_owned()).collect()
    }

    #[test]
    fn persist_rewrites_positions() {
        let mut backend = MemoryBackend::new(SimpleItem::sequence(["a", "b", "c"]));
        block_on(backend.persist_order(&ids(&["c", "a", "b"]))).unwrap();
        assert_eq!(backend.ids(), ids(&["c", "a", "b"]));
        let positions: Vec<i64> = backend.items().iter().map(|item| item.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(backend.persist_calls(), 1);
        assert_eq!(backend.last_persisted(), Some(ids(&["c", "a", "b"]).as_slice()));
    }

    #[test]
    fn persist_rejects_bad_id_sets() {
        let mut backend = MemoryBackend::new(SimpleItem::sequence(["a", "b"]));
        assert!(block_on(backend.persist_order(&ids(&["a"]))).is_err());
        assert!(block_on(backend.persist_order(&ids(&["a", "z"]))).is_err());
        assert!(block_on(backend.persist_order(&ids(&["a", "a"]))).is_err());
        assert_eq!(backend.ids(), ids(&["a", "b"]));
        assert!(backend.last_persisted().is_none());
    }

    #[test]
    fn scripted_failures_fire_once() {
        let mut backend = MemoryBackend::new(SimpleItem::sequence(["a", "b"]));
        backend.fail_next_persist("conflict");
        backend.fail_next_reload("offline");
        let err = block_on(backend.persist_order(&ids(&["b", "a"]))).unwrap_err();
        assert_eq!(err.message, "conflict");
        assert!(block_on(backend.persist_order(&ids(&["b", "a"]))).is_ok());
        assert!(block_on(backend.reload_items()).is_err());
        assert_eq!(block_on(backend.reload_items()).unwrap().len(), 2);
        assert_eq!(backend.persist_calls(), 2);
        assert_eq!(backend.reload_calls(), 2);
    }

    #[test]
    fn execute_skips_capture_commands() {
        use dragsort_core::event::CaptureCommand;

        let mut backend = MemoryBackend::new(SimpleItem::sequence(["a", "b"]));
        let cmd = ReorderCmd::batch(vec![
            ReorderCmd::capture(CaptureCommand::Release { pointer_id: 1 }),
            ReorderCmd::Persist {
                ticket: crate::cmd::PersistTicket(1),
                ordered_ids: ids(&["b", "a"]),
            },
        ]);
        let msgs: Vec<ReorderMsg<SimpleItem>> = block_on(execute(&mut backend, cmd));
        assert_eq!(msgs.len(), 1);
        assert!(matches!(
            msgs[0],
            ReorderMsg::PersistResolved { result: Ok(()), .. }
        ));
    }
}
