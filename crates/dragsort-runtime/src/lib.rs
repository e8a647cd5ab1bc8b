#![forbid(unsafe_code)]

//! Dragsort Runtime
//!
//! Ties the order model, gesture tracker and layout animator from
//! `dragsort-core` into a reorder coordinator with optimistic persistence.
//!
//! # Key Components
//!
//! - [`ReorderCoordinator`] - state machine driven by pointer, keyboard and
//!   persistence events
//! - [`ReorderCmd`] / [`ReorderMsg`] - side effects out, results back in
//! - [`OrderBackend`] / [`drive`] - async persistence and a driver loop
//! - [`MemoryBackend`] - scriptable in-process backend
//! - [`ReorderConfig`] - tunables, loadable from TOML/JSON with the `config`
//!   feature
//!
//! # Example
//!
//! ```
//! use dragsort_core::{PointerButton, PointerPosition};
//! use dragsort_runtime::{ReorderConfig, ReorderCoordinator, SimpleItem};
//!
//! let items = SimpleItem::sequence(["W", "X", "Y", "Z"]);
//! let config = ReorderConfig::default().with_item_height(40.0);
//! let mut list = ReorderCoordinator::new(config, items);
//!
//! list.pointer_down(1, 1, PointerButton::Primary, PointerPosition::new(0.0, 50.0));
//! list.pointer_move(1, PointerPosition::new(0.0, 130.0));
//! let drop = list.pointer_up(1, PointerButton::Primary, PointerPosition::new(0.0, 130.0));
//!
//! let (_, ids) = drop.cmd.persist().unwrap();
//! assert_eq!(ids, ["W", "Y", "Z", "X"]);
//! ```
//!
//! # Logging
//!
//! Transitions are logged with `tracing` under the `dragsort.reorder`
//! target; backend calls run inside `dragsort.persist` / `dragsort.reload`
//! spans. Install any subscriber to see them.

pub mod backend;
pub mod cmd;
pub mod config;
pub mod coordinator;
pub mod item;

pub use backend::{MemoryBackend, OrderBackend, drive, execute};
pub use cmd::{PersistTicket, PersistenceFailure, ReorderCmd, ReorderMsg};
pub use config::{ConfigError, DEFAULT_ITEM_HEIGHT, ReorderConfig};
pub use coordinator::{
    DispatchOutcome, DragSession, IgnoredReason, ReorderCoordinator, ReorderDispatch,
    ReorderEffect, ReorderPhase, ReorderTransition,
};
pub use item::{ReorderItem, RepositionItem, SimpleItem};
