#![forbid(unsafe_code)]

//! Reorder coordinator: pointer gestures in, optimistic order and persistence
//! commands out.
//!
//! [`ReorderCoordinator`] owns the item collection, the committed and visual
//! [`OrderArray`]s, a [`GestureTracker`] and a [`LayoutAnimator`]. It is the
//! only thing that mutates the order; everything else reads it.
//!
//! # State Machine
//!
//! ```text
//!            pointer_down                 pointer_up (order changed)
//!   Idle ----------------> Dragging --------------------------------> Persisting
//!    ^  ^                    |  |                                      |      |
//!    |  |  cancel / no-op up |  | move: speculative visual order      ok|      |err
//!    |  +--------------------+  +-----------------                     |      v
//!    +-----------------------------------------------------------------+  Reloading
//!    ^                                                                        |
//!    +------------------------------ reload ok / reload err (rollback) -------+
//! ```
//!
//! Keyboard moves ([`ReorderCoordinator::move_by`],
//! [`ReorderCoordinator::move_to_slot`]) commit from `Idle` directly.
//!
//! # Invariants
//!
//! 1. Committed and visual orders are permutations of `0..items.len()`.
//! 2. A drag session exists iff the phase is `Dragging`.
//! 3. At most one persist or reload is outstanding, identified by its
//!    [`PersistTicket`]. Results for any other ticket are ignored.
//! 4. A completed drag emits exactly one persist command, and none when the
//!    order did not change.
//! 5. The committed order is visible through [`ReorderCoordinator::ordered_ids`]
//!    as soon as the drop is processed.
//!
//! # Failure Modes
//!
//! - Persist rejected: the optimistic order stays visible and a reload is
//!   requested. The reloaded collection replaces the local one.
//! - Reload rejected: the pre-drop order is restored when the collection has
//!   not changed since; otherwise the current order is kept. Either way the
//!   coordinator returns to `Idle` and logs an error.
//! - The collection changes identity mid-drag: the drag is abandoned, capture
//!   is released and the order resets over the new collection.
//! - A pointer-down while a persist or reload is outstanding is ignored.

use std::time::Duration;

use dragsort_core::event::{CancelReason, PointerButton, PointerPosition};
use dragsort_core::gesture::{
    GestureDispatch, GestureIgnoredReason, GestureLogOutcome, GesturePhase, GestureTracker,
    GestureUpdate,
};
use dragsort_core::layout::{DragView, ItemFrame, LayoutAnimator};
use dragsort_core::order::{OrderArray, OrderError, desired_slot};

use crate::cmd::{PersistTicket, PersistenceFailure, ReorderCmd, ReorderMsg};
use crate::config::ReorderConfig;
use crate::item::{ReorderItem, same_identity, sort_by_position};

/// Coordinator lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(tag = "phase", rename_all = "snake_case"))]
pub enum ReorderPhase {
    #[default]
    Idle,
    Dragging,
    /// Committed order sent to the backend, awaiting the result.
    Persisting { ticket: PersistTicket },
    /// Persist rejected; authoritative collection requested.
    Reloading { ticket: PersistTicket },
}

impl ReorderPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging => "dragging",
            Self::Persisting { .. } => "persisting",
            Self::Reloading { .. } => "reloading",
        }
    }

    /// Ticket of the outstanding request, if any.
    #[must_use]
    pub const fn ticket(self) -> Option<PersistTicket> {
        match self {
            Self::Persisting { ticket } | Self::Reloading { ticket } => Some(ticket),
            Self::Idle | Self::Dragging => None,
        }
    }
}

/// The drag in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct DragSession {
    pub original_index: usize,
    pub pointer_id: u32,
    /// Committed slot of the item when the drag began.
    pub start_slot: usize,
    /// Slot the item would drop into now.
    pub desired_slot: usize,
    pub vertical_delta: f64,
    pub active: bool,
}

impl DragSession {
    #[must_use]
    pub fn view(&self) -> DragView {
        DragView {
            original_index: self.original_index,
            start_slot: self.start_slot,
            vertical_delta: self.vertical_delta,
            active: self.active,
        }
    }
}

/// What a transition did.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(tag = "effect", rename_all = "snake_case"))]
pub enum ReorderEffect {
    DragStarted {
        original_index: usize,
        start_slot: usize,
    },
    DragMoved {
        original_index: usize,
        desired_slot: usize,
    },
    CaptureAcquired {
        pointer_id: u32,
    },
    /// New order committed locally and sent for persistence.
    Committed {
        original_index: usize,
        from_slot: usize,
        to_slot: usize,
        ticket: PersistTicket,
    },
    /// Drop or keyboard move left the order as it was.
    Unchanged {
        original_index: usize,
    },
    Cancelled {
        original_index: usize,
        reason: CancelReason,
    },
    PersistConfirmed {
        ticket: PersistTicket,
    },
    PersistRejected {
        ticket: PersistTicket,
        reload: PersistTicket,
    },
    Reloaded {
        ticket: PersistTicket,
        len: usize,
    },
    ReloadFailed {
        ticket: PersistTicket,
        restored: bool,
    },
    Resynced {
        identity_changed: bool,
        drag_cancelled: bool,
    },
}

/// One applied state transition.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct ReorderTransition {
    /// Monotonic transition id, starting at 1.
    pub id: u64,
    pub from: ReorderPhase,
    pub to: ReorderPhase,
    pub effect: ReorderEffect,
}

/// Why a call changed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoredReason {
    /// The gesture tracker rejected the pointer signal.
    Gesture(GestureIgnoredReason),
    UnknownItem { original_index: usize },
    /// A persist or reload is outstanding.
    PersistInFlight,
    /// Keyboard move attempted during a pointer drag.
    DragInProgress,
    /// Result for a request that is not the outstanding one.
    StaleTicket { ticket: PersistTicket },
    /// Internal order inconsistency. The coordinator reset itself.
    InvalidOrder(OrderError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Applied(ReorderTransition),
    Ignored(IgnoredReason),
}

/// Result of one coordinator call: the command to run and what happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderDispatch {
    pub cmd: ReorderCmd,
    pub outcome: DispatchOutcome,
}

impl ReorderDispatch {
    fn ignored(reason: IgnoredReason) -> Self {
        Self {
            cmd: ReorderCmd::None,
            outcome: DispatchOutcome::Ignored(reason),
        }
    }

    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self.outcome, DispatchOutcome::Ignored(_))
    }

    #[must_use]
    pub fn transition(&self) -> Option<&ReorderTransition> {
        match &self.outcome {
            DispatchOutcome::Applied(transition) => Some(transition),
            DispatchOutcome::Ignored(_) => None,
        }
    }

    #[must_use]
    pub fn effect(&self) -> Option<ReorderEffect> {
        self.transition().map(|transition| transition.effect)
    }

    #[must_use]
    pub fn ignored_reason(&self) -> Option<&IgnoredReason> {
        match &self.outcome {
            DispatchOutcome::Applied(_) => None,
            DispatchOutcome::Ignored(reason) => Some(reason),
        }
    }
}

type Step = (ReorderCmd, ReorderEffect);

/// Drag-to-reorder state machine over a collection of `T`.
#[derive(Debug)]
pub struct ReorderCoordinator<T> {
    config: ReorderConfig,
    items: Vec<T>,
    committed: OrderArray,
    visual: OrderArray,
    tracker: GestureTracker,
    animator: LayoutAnimator,
    session: Option<DragSession>,
    phase: ReorderPhase,
    rollback: Option<OrderArray>,
    next_ticket: u64,
    next_transition: u64,
}

impl<T: ReorderItem> ReorderCoordinator<T> {
    /// Coordinator over `items`, sorted by position.
    ///
    /// `config` is expected to pass [`ReorderConfig::validate`]; each problem
    /// is logged at `warn` and the coordinator runs with it anyway. A zero
    /// `item_height`, for one, means drags never change the order.
    #[must_use]
    pub fn new(config: ReorderConfig, mut items: Vec<T>) -> Self {
        for problem in config.validate() {
            tracing::warn!(target: "dragsort.reorder", %problem, "reorder config is invalid");
        }
        sort_by_position(&mut items);
        let order = OrderArray::initialize(items.len());
        let mut coordinator = Self {
            tracker: GestureTracker::new(config.gesture),
            animator: LayoutAnimator::new(config.motion, config.item_height),
            config,
            items,
            committed: order.clone(),
            visual: order,
            session: None,
            phase: ReorderPhase::Idle,
            rollback: None,
            next_ticket: 1,
            next_transition: 1,
        };
        coordinator.resync_animator();
        coordinator
    }

    #[must_use]
    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> ReorderPhase {
        self.phase
    }

    #[must_use]
    pub fn session(&self) -> Option<DragSession> {
        self.session
    }

    /// Ticket of the outstanding persist or reload.
    #[must_use]
    pub fn pending_ticket(&self) -> Option<PersistTicket> {
        self.phase.ticket()
    }

    /// Items by original index (position order at load).
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Committed order.
    #[must_use]
    pub fn order(&self) -> &OrderArray {
        &self.committed
    }

    /// Order currently shown, including the speculative drag preview.
    #[must_use]
    pub fn visual_order(&self) -> &OrderArray {
        &self.visual
    }

    /// Items in committed slot order.
    #[must_use]
    pub fn ordered_items(&self) -> Vec<&T> {
        Self::arrange(&self.committed, &self.items)
    }

    /// Items in visual slot order.
    #[must_use]
    pub fn visual_items(&self) -> Vec<&T> {
        Self::arrange(&self.visual, &self.items)
    }

    /// Ids in committed slot order, as sent to persistence.
    #[must_use]
    pub fn ordered_ids(&self) -> Vec<String> {
        self.ordered_items()
            .into_iter()
            .map(|item| item.id().to_owned())
            .collect()
    }

    fn arrange<'a>(order: &OrderArray, items: &'a [T]) -> Vec<&'a T> {
        order
            .as_slice()
            .iter()
            .filter_map(|&index| items.get(index))
            .collect()
    }

    // -- pointer input -----------------------------------------------------

    /// Pointer-down on the drag handle of the item at `original_index`.
    pub fn pointer_down(
        &mut self,
        original_index: usize,
        pointer_id: u32,
        button: PointerButton,
        position: PointerPosition,
    ) -> ReorderDispatch {
        if matches!(
            self.phase,
            ReorderPhase::Persisting { .. } | ReorderPhase::Reloading { .. }
        ) {
            return self.ignore(IgnoredReason::PersistInFlight);
        }
        if original_index >= self.items.len() {
            return self.ignore(IgnoredReason::UnknownItem { original_index });
        }
        let dispatch = self
            .tracker
            .pointer_down(original_index, pointer_id, button, position);
        self.on_gesture(dispatch)
    }

    /// Host confirmed pointer capture.
    pub fn capture_acquired(&mut self, pointer_id: u32) -> ReorderDispatch {
        let dispatch = self.tracker.capture_acquired(pointer_id);
        self.on_gesture(dispatch)
    }

    pub fn pointer_move(&mut self, pointer_id: u32, position: PointerPosition) -> ReorderDispatch {
        let dispatch = self.tracker.pointer_move(pointer_id, position);
        self.on_gesture(dispatch)
    }

    /// Pointer released. The release position is authoritative.
    pub fn pointer_up(
        &mut self,
        pointer_id: u32,
        button: PointerButton,
        position: PointerPosition,
    ) -> ReorderDispatch {
        let dispatch = self.tracker.pointer_up(pointer_id, button, position);
        self.on_gesture(dispatch)
    }

    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> ReorderDispatch {
        let dispatch = self.tracker.pointer_cancel(pointer_id);
        self.on_gesture(dispatch)
    }

    pub fn pointer_leave(&mut self, pointer_id: u32) -> ReorderDispatch {
        let dispatch = self.tracker.pointer_leave(pointer_id);
        self.on_gesture(dispatch)
    }

    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> ReorderDispatch {
        let dispatch = self.tracker.lost_pointer_capture(pointer_id);
        self.on_gesture(dispatch)
    }

    pub fn blur(&mut self) -> ReorderDispatch {
        let dispatch = self.tracker.blur();
        self.on_gesture(dispatch)
    }

    pub fn visibility_hidden(&mut self) -> ReorderDispatch {
        let dispatch = self.tracker.visibility_hidden();
        self.on_gesture(dispatch)
    }

    /// Abandon the drag in progress.
    pub fn cancel(&mut self, reason: CancelReason) -> ReorderDispatch {
        let dispatch = self.tracker.cancel(reason);
        self.on_gesture(dispatch)
    }

    fn on_gesture(&mut self, dispatch: GestureDispatch) -> ReorderDispatch {
        if let GestureLogOutcome::Ignored(reason) = dispatch.log.outcome {
            return self.ignore(IgnoredReason::Gesture(reason));
        }
        let from = self.phase;
        let capture = dispatch
            .capture_command
            .map(ReorderCmd::capture)
            .unwrap_or_default();
        let step = match dispatch.update {
            None => Ok((
                ReorderCmd::None,
                ReorderEffect::CaptureAcquired {
                    pointer_id: dispatch.log.pointer_id.unwrap_or_default(),
                },
            )),
            Some(update) => match update.phase {
                GesturePhase::Started => self.begin_drag(&update),
                GesturePhase::Moved => self.drag_to(&update),
                GesturePhase::Released => self.drop_drag(&update),
                GesturePhase::Cancelled(reason) => self.abandon_drag(update.original_index, reason),
            },
        };
        self.settle(from, capture, step)
    }

    fn begin_drag(&mut self, update: &GestureUpdate) -> Result<Step, OrderError> {
        let start_slot = self.committed.slot_of(update.original_index)?;
        self.session = Some(DragSession {
            original_index: update.original_index,
            pointer_id: update.pointer_id,
            start_slot,
            desired_slot: start_slot,
            vertical_delta: update.vertical_delta,
            active: true,
        });
        self.visual = self.committed.clone();
        self.phase = ReorderPhase::Dragging;
        self.relayout()?;
        Ok((
            ReorderCmd::None,
            ReorderEffect::DragStarted {
                original_index: update.original_index,
                start_slot,
            },
        ))
    }

    fn drag_to(&mut self, update: &GestureUpdate) -> Result<Step, OrderError> {
        let mut session = self.session_for(update)?;
        let to_slot = desired_slot(
            session.start_slot,
            update.vertical_delta,
            self.config.item_height,
            self.committed.len(),
        );
        self.visual = self.committed.compute_swap(session.start_slot, to_slot)?;
        session.vertical_delta = update.vertical_delta;
        session.desired_slot = to_slot;
        self.session = Some(session);
        self.relayout()?;
        Ok((
            ReorderCmd::None,
            ReorderEffect::DragMoved {
                original_index: session.original_index,
                desired_slot: to_slot,
            },
        ))
    }

    fn drop_drag(&mut self, update: &GestureUpdate) -> Result<Step, OrderError> {
        let session = self.session_for(update)?;
        let to_slot = desired_slot(
            session.start_slot,
            update.vertical_delta,
            self.config.item_height,
            self.committed.len(),
        );
        let next = self.committed.compute_swap(session.start_slot, to_slot)?;
        self.session = None;
        self.commit(session.original_index, session.start_slot, to_slot, next)
    }

    fn abandon_drag(&mut self, original_index: usize, reason: CancelReason) -> Result<Step, OrderError> {
        self.session = None;
        self.visual = self.committed.clone();
        self.phase = ReorderPhase::Idle;
        self.relayout()?;
        Ok((
            ReorderCmd::None,
            ReorderEffect::Cancelled {
                original_index,
                reason,
            },
        ))
    }

    fn session_for(&self, update: &GestureUpdate) -> Result<DragSession, OrderError> {
        self.session
            .filter(|session| {
                session.original_index == update.original_index
                    && session.pointer_id == update.pointer_id
            })
            .ok_or(OrderError::NotFound {
                original_index: update.original_index,
                len: self.committed.len(),
            })
    }

    // -- keyboard input ----------------------------------------------------

    /// Move the item at `original_index` by `delta` slots (clamped).
    pub fn move_by(&mut self, original_index: usize, delta: isize) -> ReorderDispatch {
        self.keyboard_move(original_index, |from_slot, len| {
            let last = len.saturating_sub(1);
            from_slot.saturating_add_signed(delta).min(last)
        })
    }

    /// Move the item at `original_index` to `slot` (clamped).
    pub fn move_to_slot(&mut self, original_index: usize, slot: usize) -> ReorderDispatch {
        self.keyboard_move(original_index, |_, len| slot.min(len.saturating_sub(1)))
    }

    fn keyboard_move(
        &mut self,
        original_index: usize,
        target: impl FnOnce(usize, usize) -> usize,
    ) -> ReorderDispatch {
        match self.phase {
            ReorderPhase::Idle => {}
            ReorderPhase::Dragging => return self.ignore(IgnoredReason::DragInProgress),
            ReorderPhase::Persisting { .. } | ReorderPhase::Reloading { .. } => {
                return self.ignore(IgnoredReason::PersistInFlight);
            }
        }
        if original_index >= self.items.len() {
            return self.ignore(IgnoredReason::UnknownItem { original_index });
        }
        let from = self.phase;
        let step = self.keyboard_step(original_index, target);
        self.settle(from, ReorderCmd::None, step)
    }

    fn keyboard_step(
        &mut self,
        original_index: usize,
        target: impl FnOnce(usize, usize) -> usize,
    ) -> Result<Step, OrderError> {
        let from_slot = self.committed.slot_of(original_index)?;
        let to_slot = target(from_slot, self.committed.len());
        let next = self.committed.compute_swap(from_slot, to_slot)?;
        self.commit(original_index, from_slot, to_slot, next)
    }

    fn commit(
        &mut self,
        original_index: usize,
        from_slot: usize,
        to_slot: usize,
        next: OrderArray,
    ) -> Result<Step, OrderError> {
        if next == self.committed {
            self.visual = self.committed.clone();
            self.phase = ReorderPhase::Idle;
            self.relayout()?;
            return Ok((ReorderCmd::None, ReorderEffect::Unchanged { original_index }));
        }
        debug_assert!(next.validate().is_ok());
        let ticket = self.issue_ticket();
        self.rollback = Some(std::mem::replace(&mut self.committed, next));
        self.visual = self.committed.clone();
        self.phase = ReorderPhase::Persisting { ticket };
        self.relayout()?;
        Ok((
            ReorderCmd::Persist {
                ticket,
                ordered_ids: self.ordered_ids(),
            },
            ReorderEffect::Committed {
                original_index,
                from_slot,
                to_slot,
                ticket,
            },
        ))
    }

    // -- persistence results -----------------------------------------------

    /// Feed back the result of a command.
    pub fn update(&mut self, msg: ReorderMsg<T>) -> ReorderDispatch {
        match msg {
            ReorderMsg::PersistResolved { ticket, result } => self.persist_resolved(ticket, result),
            ReorderMsg::ReloadResolved { ticket, result } => self.reload_resolved(ticket, result),
        }
    }

    /// The backend answered [`ReorderCmd::Persist`].
    pub fn persist_resolved(
        &mut self,
        ticket: PersistTicket,
        result: Result<(), PersistenceFailure>,
    ) -> ReorderDispatch {
        if self.phase != (ReorderPhase::Persisting { ticket }) {
            return self.ignore(IgnoredReason::StaleTicket { ticket });
        }
        let from = self.phase;
        match result {
            Ok(()) => {
                self.phase = ReorderPhase::Idle;
                self.rollback = None;
                self.applied(from, ReorderCmd::None, ReorderEffect::PersistConfirmed { ticket })
            }
            Err(failure) => {
                let reload = self.issue_ticket();
                tracing::warn!(
                    target: "dragsort.reorder",
                    ticket = ticket.0,
                    reload_ticket = reload.0,
                    error = %failure,
                    "persist rejected; reloading authoritative order"
                );
                self.phase = ReorderPhase::Reloading { ticket: reload };
                self.applied(
                    from,
                    ReorderCmd::Reload { ticket: reload },
                    ReorderEffect::PersistRejected { ticket, reload },
                )
            }
        }
    }

    /// The backend answered [`ReorderCmd::Reload`].
    pub fn reload_resolved(
        &mut self,
        ticket: PersistTicket,
        result: Result<Vec<T>, PersistenceFailure>,
    ) -> ReorderDispatch {
        if self.phase != (ReorderPhase::Reloading { ticket }) {
            return self.ignore(IgnoredReason::StaleTicket { ticket });
        }
        let from = self.phase;
        self.phase = ReorderPhase::Idle;
        let step = match result {
            Ok(mut items) => {
                sort_by_position(&mut items);
                self.items = items;
                self.rollback = None;
                let len = self.items.len();
                self.reset_order()
                    .map(|()| (ReorderCmd::None, ReorderEffect::Reloaded { ticket, len }))
            }
            Err(failure) => {
                let restored = match self.rollback.take() {
                    Some(snapshot) if snapshot.len() == self.items.len() => {
                        self.committed = snapshot;
                        true
                    }
                    _ => false,
                };
                self.visual = self.committed.clone();
                tracing::error!(
                    target: "dragsort.reorder",
                    ticket = ticket.0,
                    restored,
                    error = %failure,
                    "reload failed after rejected persist"
                );
                self.relayout()
                    .map(|()| (ReorderCmd::None, ReorderEffect::ReloadFailed { ticket, restored }))
            }
        };
        self.settle(from, ReorderCmd::None, step)
    }

    // -- collection sync ---------------------------------------------------

    /// Replace the collection, for example after a background refresh.
    ///
    /// Same ids in the same position order only refresh payloads. Anything
    /// else abandons a drag in progress and resets the order over the new
    /// collection. An outstanding persist stays outstanding.
    pub fn sync_items(&mut self, mut items: Vec<T>) -> ReorderDispatch {
        sort_by_position(&mut items);
        let identity_changed = !same_identity(&self.items, &items);
        let from = self.phase;
        self.items = items;
        if !identity_changed {
            return self.applied(
                from,
                ReorderCmd::None,
                ReorderEffect::Resynced {
                    identity_changed,
                    drag_cancelled: false,
                },
            );
        }

        let mut cmd = ReorderCmd::None;
        let drag_cancelled = self.tracker.is_active();
        if drag_cancelled {
            let dispatch = self.tracker.cancel(CancelReason::CollectionChanged);
            cmd = dispatch
                .capture_command
                .map(ReorderCmd::capture)
                .unwrap_or_default();
        }
        self.session = None;
        if self.phase == ReorderPhase::Dragging {
            self.phase = ReorderPhase::Idle;
        }
        self.rollback = None;
        let step = self.reset_order().map(|()| {
            (
                ReorderCmd::None,
                ReorderEffect::Resynced {
                    identity_changed,
                    drag_cancelled,
                },
            )
        });
        self.settle(from, cmd, step)
    }

    // -- animation ---------------------------------------------------------

    /// Advance item motion by one frame.
    pub fn tick(&mut self, dt: Duration) {
        self.animator.tick(dt);
    }

    /// Render values for every item, by original index.
    #[must_use]
    pub fn frames(&self) -> Vec<ItemFrame> {
        self.animator.frames()
    }

    #[must_use]
    pub fn frame(&self, original_index: usize) -> Option<ItemFrame> {
        self.animator.frame(original_index)
    }

    /// Whether all motion has come to rest.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.animator.is_settled()
    }

    #[must_use]
    pub fn animator(&self) -> &LayoutAnimator {
        &self.animator
    }

    // -- internals ---------------------------------------------------------

    fn issue_ticket(&mut self) -> PersistTicket {
        let ticket = PersistTicket(self.next_ticket);
        self.next_ticket = self.next_ticket.saturating_add(1);
        ticket
    }

    fn relayout(&mut self) -> Result<(), OrderError> {
        let drag = self.session.map(|session| session.view());
        self.animator.retarget(&self.visual, drag)
    }

    fn resync_animator(&mut self) {
        self.sync_animator_keys();
        if let Err(err) = self.relayout() {
            tracing::error!(target: "dragsort.reorder", error = %err, "layout retarget failed");
        }
    }

    fn reset_order(&mut self) -> Result<(), OrderError> {
        self.committed = OrderArray::initialize(self.items.len());
        self.visual = self.committed.clone();
        self.sync_animator_keys();
        self.relayout()
    }

    fn sync_animator_keys(&mut self) {
        let repeats = self
            .animator
            .sync_keys(self.items.iter().map(|item| item.id().to_owned()));
        if repeats > 0 {
            tracing::error!(
                target: "dragsort.reorder",
                repeats,
                len = self.items.len(),
                "collection has duplicate item ids"
            );
        }
    }

    fn settle(
        &mut self,
        from: ReorderPhase,
        lead: ReorderCmd,
        step: Result<Step, OrderError>,
    ) -> ReorderDispatch {
        match step {
            Ok((cmd, effect)) => self.applied(from, ReorderCmd::batch(vec![lead, cmd]), effect),
            Err(err) => self.invariant_violation(from, lead, err),
        }
    }

    fn invariant_violation(
        &mut self,
        from: ReorderPhase,
        lead: ReorderCmd,
        err: OrderError,
    ) -> ReorderDispatch {
        tracing::error!(
            target: "dragsort.reorder",
            phase = from.as_str(),
            error = %err,
            "order invariant violated; resetting to identity"
        );
        let mut cmds = vec![lead];
        if self.tracker.is_active() {
            let dispatch = self.tracker.cancel(CancelReason::Programmatic);
            cmds.extend(dispatch.capture_command.map(ReorderCmd::capture));
        }
        self.session = None;
        // A step that started outside persistence never emitted its ticket.
        if matches!(from, ReorderPhase::Idle | ReorderPhase::Dragging)
            || self.phase == ReorderPhase::Dragging
        {
            self.phase = ReorderPhase::Idle;
        }
        self.rollback = None;
        self.committed = OrderArray::initialize(self.items.len());
        self.visual = self.committed.clone();
        self.resync_animator();
        ReorderDispatch {
            cmd: ReorderCmd::batch(cmds),
            outcome: DispatchOutcome::Ignored(IgnoredReason::InvalidOrder(err)),
        }
    }

    fn ignore(&self, reason: IgnoredReason) -> ReorderDispatch {
        tracing::trace!(
            target: "dragsort.reorder",
            phase = self.phase.as_str(),
            reason = ?reason,
            "reorder signal ignored"
        );
        ReorderDispatch::ignored(reason)
    }

    fn applied(&mut self, from: ReorderPhase, cmd: ReorderCmd, effect: ReorderEffect) -> ReorderDispatch {
        let transition = ReorderTransition {
            id: self.next_transition,
            from,
            to: self.phase,
            effect,
        };
        self.next_transition = self.next_transition.saturating_add(1);
        log_transition(&transition);
        ReorderDispatch {
            cmd,
            outcome: DispatchOutcome::Applied(transition),
        }
    }
}

fn log_transition(transition: &ReorderTransition) {
    let from = transition.from.as_str();
    let to = transition.to.as_str();
    match transition.effect {
        ReorderEffect::DragMoved {
            original_index,
            desired_slot,
        } => tracing::trace!(
            target: "dragsort.reorder",
            original_index,
            to_slot = desired_slot,
            "drag moved"
        ),
        ReorderEffect::DragStarted {
            original_index,
            start_slot,
        } => tracing::debug!(
            target: "dragsort.reorder",
            from,
            to,
            original_index,
            from_slot = start_slot,
            "drag started"
        ),
        ReorderEffect::Committed {
            original_index,
            from_slot,
            to_slot,
            ticket,
        } => tracing::debug!(
            target: "dragsort.reorder",
            from,
            to,
            ticket = ticket.0,
            original_index,
            from_slot,
            to_slot,
            "order committed"
        ),
        ReorderEffect::Cancelled {
            original_index,
            reason,
        } => tracing::debug!(
            target: "dragsort.reorder",
            from,
            to,
            original_index,
            reason = reason.as_str(),
            "drag cancelled"
        ),
        ReorderEffect::PersistConfirmed { ticket }
        | ReorderEffect::PersistRejected { ticket, .. }
        | ReorderEffect::Reloaded { ticket, .. }
        | ReorderEffect::ReloadFailed { ticket, .. } => tracing::debug!(
            target: "dragsort.reorder",
            from,
            to,
            ticket = ticket.0,
            effect = ?transition.effect,
            "persistence resolved"
        ),
        ReorderEffect::CaptureAcquired { .. }
        | ReorderEffect::Unchanged { .. }
        | ReorderEffect::Resynced { .. } => tracing::debug!(
            target: "dragsort.reorder",
            from,
            to,
            effect = ?transition.effect,
            "reorder transition"
        ),
    }
}
