#![forbid(unsafe_code)]

//! Core: order model, pointer gesture tracking, and spring layout for
//! drag-to-reorder lists.
//!
//! # Role in Dragsort
//! `dragsort-core` is pure data. It owns no items, performs no I/O and never
//! reads a clock; the runtime (`dragsort-runtime`) wires these pieces into a
//! coordinator that hosts drive with pointer events and frame ticks.
//!
//! # Primary responsibilities
//! - **OrderArray**: permutation of original indices, moved insertion-style.
//! - **GestureTracker**: single-pointer lifecycle with host capture commands.
//! - **LayoutAnimator**: per-item targets and spring interpolation.
//!
//! # Example
//! ```
//! use dragsort_core::order::{desired_slot, OrderArray};
//!
//! let committed = OrderArray::initialize(4);
//! // Item at slot 1 dragged 85px down a list of 40px rows.
//! let to = desired_slot(1, 85.0, 40.0, committed.len());
//! let visual = committed.compute_swap(1, to).unwrap();
//! assert_eq!(visual.as_slice(), &[0, 2, 3, 1]);
//! ```

pub mod animation;
pub mod event;
pub mod gesture;
pub mod layout;
pub mod order;

pub use animation::{Animation, Spring, SpringParams};
pub use event::{CancelReason, CaptureCommand, PointerButton, PointerPosition};
pub use gesture::{
    GestureConfig, GestureDispatch, GestureIgnoredReason, GestureLogEntry, GestureLogOutcome,
    GesturePhase, GestureSignal, GestureTracker, GestureUpdate,
};
pub use layout::{
    AnimationTarget, DragView, ItemFrame, LayoutAnimator, MotionConfig, MotionFields,
    ShadowDepth, compute_targets,
};
pub use order::{OrderArray, OrderError, clamp_slot, desired_slot};
