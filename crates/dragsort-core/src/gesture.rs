#![forbid(unsafe_code)]

//! Single-pointer drag tracking for reorderable list handles.
//!
//! [`GestureTracker`] turns host pointer lifecycle signals into
//! [`GestureUpdate`]s of the form `(original_index, active, vertical_delta)`
//! and tells the host when to acquire or release pointer capture.
//!
//! # State Machine
//!
//! ```text
//! Idle --pointer_down--> Tracking --pointer_move--> Tracking
//!                            |--pointer_up--> Idle (Released)
//!                            \--cancel/blur/lost capture--> Idle (Cancelled)
//! ```
//!
//! # Invariants
//!
//! 1. At most one pointer is tracked. A second pointer-down while tracking is
//!    ignored with [`GestureIgnoredReason::ActivePointerAlreadyInProgress`].
//! 2. Only the handle that received pointer-down is tracked; later events are
//!    matched by pointer id, never by hit-testing.
//! 3. `vertical_delta` is cumulative from the pointer-down position. The
//!    horizontal component is discarded.
//! 4. Every move produces an update synchronously; there is no debouncing.
//! 5. Ignored events never mutate tracker state.
//!
//! # Failure Modes
//!
//! - Pointer id 0 is reserved and rejected.
//! - Non-finite positions are rejected rather than poisoning the delta.

use crate::event::{CancelReason, CaptureCommand, PointerButton, PointerPosition};

/// Tracker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GestureConfig {
    /// Button required to begin a drag.
    pub activation_button: PointerButton,
    /// Cancel on pointer-leave when capture was requested but never acknowledged.
    pub cancel_on_leave_without_capture: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            activation_button: PointerButton::Primary,
            cancel_on_leave_without_capture: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Requested,
    Acquired,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveGesture {
    pointer_id: u32,
    original_index: usize,
    button: PointerButton,
    origin_y: f64,
    last_y: f64,
    capture: CaptureState,
}

impl ActiveGesture {
    fn delta(&self) -> f64 {
        self.last_y - self.origin_y
    }
}

/// Where the tracked gesture is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "phase", content = "reason", rename_all = "snake_case"))]
pub enum GesturePhase {
    Started,
    Moved,
    Released,
    Cancelled(CancelReason),
}

/// One normalized update for the tracked item.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureUpdate {
    pub original_index: usize,
    pub pointer_id: u32,
    pub phase: GesturePhase,
    pub active: bool,
    pub vertical_delta: f64,
}

/// Host signal recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GestureSignal {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    PointerLeave,
    Blur,
    VisibilityHidden,
    LostPointerCapture,
    CaptureAcquired,
    Cancel,
}

/// Why a host signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GestureIgnoredReason {
    InvalidPointerId,
    ButtonNotAllowed,
    ButtonMismatch,
    ActivePointerAlreadyInProgress,
    NoActivePointer,
    PointerMismatch,
    LeaveWhileCaptured,
    NonFinitePosition,
}

/// Outcome category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", content = "reason", rename_all = "snake_case"))]
pub enum GestureLogOutcome {
    UpdateEmitted,
    CaptureStateUpdated,
    Ignored(GestureIgnoredReason),
}

/// Structured record of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureLogEntry {
    pub signal: GestureSignal,
    pub sequence: Option<u64>,
    pub pointer_id: Option<u32>,
    pub original_index: Option<usize>,
    pub capture_command: Option<CaptureCommand>,
    pub outcome: GestureLogOutcome,
}

/// Result of one host signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureDispatch {
    pub update: Option<GestureUpdate>,
    pub capture_command: Option<CaptureCommand>,
    pub log: GestureLogEntry,
}

impl GestureDispatch {
    fn ignored(
        signal: GestureSignal,
        reason: GestureIgnoredReason,
        pointer_id: Option<u32>,
        original_index: Option<usize>,
    ) -> Self {
        Self {
            update: None,
            capture_command: None,
            log: GestureLogEntry {
                signal,
                sequence: None,
                pointer_id,
                original_index,
                capture_command: None,
                outcome: GestureLogOutcome::Ignored(reason),
            },
        }
    }

    /// Whether the signal was ignored.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self.log.outcome, GestureLogOutcome::Ignored(_))
    }
}

/// Deterministic single-pointer tracker for list drag handles.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    config: GestureConfig,
    active: Option<ActiveGesture>,
    next_sequence: u64,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureTracker {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            active: None,
            next_sequence: 1,
        }
    }

    #[must_use]
    pub const fn config(&self) -> GestureConfig {
        self.config
    }

    /// Whether a pointer is being tracked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Pointer id of the tracked gesture.
    #[must_use]
    pub fn active_pointer_id(&self) -> Option<u32> {
        self.active.map(|active| active.pointer_id)
    }

    /// Original index of the item whose handle is held.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active.map(|active| active.original_index)
    }

    /// Cumulative vertical displacement of the tracked pointer.
    #[must_use]
    pub fn vertical_delta(&self) -> Option<f64> {
        self.active.map(|active| active.delta())
    }

    /// Pointer-down on the drag handle of `original_index`.
    pub fn pointer_down(
        &mut self,
        original_index: usize,
        pointer_id: u32,
        button: PointerButton,
        position: PointerPosition,
    ) -> GestureDispatch {
        let signal = GestureSignal::PointerDown;
        let ignore = |reason| {
            GestureDispatch::ignored(signal, reason, Some(pointer_id), Some(original_index))
        };
        if pointer_id == 0 {
            return ignore(GestureIgnoredReason::InvalidPointerId);
        }
        if button != self.config.activation_button {
            return ignore(GestureIgnoredReason::ButtonNotAllowed);
        }
        if self.active.is_some() {
            return ignore(GestureIgnoredReason::ActivePointerAlreadyInProgress);
        }
        if !position.is_finite() {
            return ignore(GestureIgnoredReason::NonFinitePosition);
        }

        let active = ActiveGesture {
            pointer_id,
            original_index,
            button,
            origin_y: position.y,
            last_y: position.y,
            capture: CaptureState::Requested,
        };
        self.active = Some(active);
        self.emit(
            signal,
            &active,
            GesturePhase::Started,
            Some(CaptureCommand::Acquire { pointer_id }),
        )
    }

    /// Host confirmed pointer capture for `pointer_id`.
    pub fn capture_acquired(&mut self, pointer_id: u32) -> GestureDispatch {
        let signal = GestureSignal::CaptureAcquired;
        let Some(mut active) = self.active else {
            return GestureDispatch::ignored(
                signal,
                GestureIgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
            );
        };
        if active.pointer_id != pointer_id {
            return GestureDispatch::ignored(
                signal,
                GestureIgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.original_index),
            );
        }
        active.capture = CaptureState::Acquired;
        self.active = Some(active);
        GestureDispatch {
            update: None,
            capture_command: None,
            log: GestureLogEntry {
                signal,
                sequence: None,
                pointer_id: Some(pointer_id),
                original_index: Some(active.original_index),
                capture_command: None,
                outcome: GestureLogOutcome::CaptureStateUpdated,
            },
        }
    }

    /// Pointer moved while (possibly) tracking.
    pub fn pointer_move(&mut self, pointer_id: u32, position: PointerPosition) -> GestureDispatch {
        let signal = GestureSignal::PointerMove;
        let mut active = match self.matching(signal, pointer_id) {
            Ok(active) => active,
            Err(dispatch) => return dispatch,
        };
        if !position.is_finite() {
            return GestureDispatch::ignored(
                signal,
                GestureIgnoredReason::NonFinitePosition,
                Some(pointer_id),
                Some(active.original_index),
            );
        }
        active.last_y = position.y;
        self.active = Some(active);
        self.emit(signal, &active, GesturePhase::Moved, None)
    }

    /// Pointer released; emits the final update and ends tracking.
    pub fn pointer_up(
        &mut self,
        pointer_id: u32,
        button: PointerButton,
        position: PointerPosition,
    ) -> GestureDispatch {
        let signal = GestureSignal::PointerUp;
        let mut active = match self.matching(signal, pointer_id) {
            Ok(active) => active,
            Err(dispatch) => return dispatch,
        };
        if active.button != button {
            return GestureDispatch::ignored(
                signal,
                GestureIgnoredReason::ButtonMismatch,
                Some(pointer_id),
                Some(active.original_index),
            );
        }
        // A non-finite release keeps the last good position.
        if position.is_finite() {
            active.last_y = position.y;
        }
        self.active = None;
        let release = (active.capture == CaptureState::Acquired)
            .then_some(CaptureCommand::Release { pointer_id });
        self.emit(signal, &active, GesturePhase::Released, release)
    }

    /// Host `pointercancel`. `None` cancels whatever pointer is tracked.
    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> GestureDispatch {
        self.cancel_active(
            GestureSignal::PointerCancel,
            pointer_id,
            CancelReason::PointerCancel,
            true,
        )
    }

    /// Pointer left the list element.
    pub fn pointer_leave(&mut self, pointer_id: u32) -> GestureDispatch {
        let signal = GestureSignal::PointerLeave;
        let active = match self.matching(signal, pointer_id) {
            Ok(active) => active,
            Err(dispatch) => return dispatch,
        };
        if active.capture == CaptureState::Requested && self.config.cancel_on_leave_without_capture
        {
            self.cancel_active(signal, Some(pointer_id), CancelReason::PointerLeave, true)
        } else {
            GestureDispatch::ignored(
                signal,
                GestureIgnoredReason::LeaveWhileCaptured,
                Some(pointer_id),
                Some(active.original_index),
            )
        }
    }

    /// Window lost focus.
    pub fn blur(&mut self) -> GestureDispatch {
        self.cancel_active(GestureSignal::Blur, None, CancelReason::Blur, true)
    }

    /// Document became hidden.
    pub fn visibility_hidden(&mut self) -> GestureDispatch {
        self.cancel_active(
            GestureSignal::VisibilityHidden,
            None,
            CancelReason::VisibilityHidden,
            true,
        )
    }

    /// Host reported `lostpointercapture`. Capture is already gone, so no
    /// release command is emitted.
    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> GestureDispatch {
        self.cancel_active(
            GestureSignal::LostPointerCapture,
            Some(pointer_id),
            CancelReason::LostCapture,
            false,
        )
    }

    /// Tear down the tracked gesture for a caller-supplied reason.
    pub fn cancel(&mut self, reason: CancelReason) -> GestureDispatch {
        self.cancel_active(GestureSignal::Cancel, None, reason, true)
    }

    fn cancel_active(
        &mut self,
        signal: GestureSignal,
        pointer_id: Option<u32>,
        reason: CancelReason,
        release_capture: bool,
    ) -> GestureDispatch {
        let Some(active) = self.active else {
            return GestureDispatch::ignored(
                signal,
                GestureIgnoredReason::NoActivePointer,
                pointer_id,
                None,
            );
        };
        if let Some(id) = pointer_id
            && id != active.pointer_id
        {
            return GestureDispatch::ignored(
                signal,
                GestureIgnoredReason::PointerMismatch,
                Some(id),
                Some(active.original_index),
            );
        }
        self.active = None;
        let release = (release_capture && active.capture == CaptureState::Acquired).then_some(
            CaptureCommand::Release {
                pointer_id: active.pointer_id,
            },
        );
        self.emit(signal, &active, GesturePhase::Cancelled(reason), release)
    }

    fn matching(
        &self,
        signal: GestureSignal,
        pointer_id: u32,
    ) -> Result<ActiveGesture, GestureDispatch> {
        let Some(active) = self.active else {
            return Err(GestureDispatch::ignored(
                signal,
                GestureIgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
            ));
        };
        if active.pointer_id != pointer_id {
            return Err(GestureDispatch::ignored(
                signal,
                GestureIgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.original_index),
            ));
        }
        Ok(active)
    }

    fn emit(
        &mut self,
        signal: GestureSignal,
        active: &ActiveGesture,
        phase: GesturePhase,
        capture_command: Option<CaptureCommand>,
    ) -> GestureDispatch {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        let update = GestureUpdate {
            original_index: active.original_index,
            pointer_id: active.pointer_id,
            phase,
            active: matches!(phase, GesturePhase::Started | GesturePhase::Moved),
            vertical_delta: active.delta(),
        };
        GestureDispatch {
            update: Some(update),
            capture_command,
            log: GestureLogEntry {
                signal,
                sequence: Some(sequence),
                pointer_id: Some(active.pointer_id),
                original_index: Some(active.original_index),
                capture_command,
                outcome: GestureLogOutcome::UpdateEmitted,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(y: f64) -> PointerPosition {
        PointerPosition::new(12.0, y)
    }

    fn down(tracker: &mut GestureTracker, index: usize, pointer_id: u32, y: f64) -> GestureDispatch {
        tracker.pointer_down(index, pointer_id, PointerButton::Primary, pos(y))
    }

    #[test]
    fn pointer_down_starts_session_and_requests_capture() {
        let mut tracker = GestureTracker::default();
        let dispatch = down(&mut tracker, 2, 7, 100.0);
        let update = dispatch.update.expect("update");
        assert_eq!(update.original_index, 2);
        assert_eq!(update.phase, GesturePhase::Started);
        assert!(update.active);
        assert_eq!(update.vertical_delta, 0.0);
        assert_eq!(
            dispatch.capture_command,
            Some(CaptureCommand::Acquire { pointer_id: 7 })
        );
        assert_eq!(tracker.active_index(), Some(2));
        assert_eq!(dispatch.log.sequence, Some(1));
    }

    #[test]
    fn moves_report_cumulative_vertical_delta() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 0, 1, 50.0);
        let first = tracker.pointer_move(1, PointerPosition::new(400.0, 70.0));
        assert_eq!(first.update.unwrap().vertical_delta, 20.0);
        let second = tracker.pointer_move(1, PointerPosition::new(-3.0, 35.0));
        let update = second.update.unwrap();
        assert_eq!(update.vertical_delta, -15.0);
        assert_eq!(update.phase, GesturePhase::Moved);
        assert_eq!(second.log.sequence, Some(3));
    }

    #[test]
    fn pointer_up_emits_final_inactive_update() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 3, 4, 10.0);
        tracker.pointer_move(4, pos(30.0));
        let dispatch = tracker.pointer_up(4, PointerButton::Primary, pos(55.0));
        let update = dispatch.update.unwrap();
        assert_eq!(update.phase, GesturePhase::Released);
        assert!(!update.active);
        assert_eq!(update.vertical_delta, 45.0);
        assert!(!tracker.is_active());
        // Capture never acknowledged, so nothing to release.
        assert_eq!(dispatch.capture_command, None);
    }

    #[test]
    fn pointer_up_releases_acquired_capture() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 0, 9, 0.0);
        let ack = tracker.capture_acquired(9);
        assert_eq!(ack.log.outcome, GestureLogOutcome::CaptureStateUpdated);
        let dispatch = tracker.pointer_up(9, PointerButton::Primary, pos(1.0));
        assert_eq!(
            dispatch.capture_command,
            Some(CaptureCommand::Release { pointer_id: 9 })
        );
    }

    #[test]
    fn second_pointer_down_is_ignored() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 1, 5, 0.0);
        let dispatch = down(&mut tracker, 2, 6, 0.0);
        assert!(dispatch.update.is_none());
        assert_eq!(
            dispatch.log.outcome,
            GestureLogOutcome::Ignored(GestureIgnoredReason::ActivePointerAlreadyInProgress)
        );
        assert_eq!(tracker.active_index(), Some(1));
        assert_eq!(tracker.active_pointer_id(), Some(5));
    }

    #[test]
    fn foreign_pointer_moves_do_not_disturb_session() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 1, 5, 0.0);
        let dispatch = tracker.pointer_move(8, pos(300.0));
        assert_eq!(
            dispatch.log.outcome,
            GestureLogOutcome::Ignored(GestureIgnoredReason::PointerMismatch)
        );
        assert_eq!(tracker.vertical_delta(), Some(0.0));
    }

    #[test]
    fn move_without_session_is_ignored() {
        let mut tracker = GestureTracker::default();
        let dispatch = tracker.pointer_move(1, pos(10.0));
        assert_eq!(
            dispatch.log.outcome,
            GestureLogOutcome::Ignored(GestureIgnoredReason::NoActivePointer)
        );
    }

    #[test]
    fn invalid_pointer_and_button_rejected() {
        let mut tracker = GestureTracker::default();
        assert_eq!(
            down(&mut tracker, 0, 0, 0.0).log.outcome,
            GestureLogOutcome::Ignored(GestureIgnoredReason::InvalidPointerId)
        );
        let dispatch = tracker.pointer_down(0, 3, PointerButton::Secondary, pos(0.0));
        assert_eq!(
            dispatch.log.outcome,
            GestureLogOutcome::Ignored(GestureIgnoredReason::ButtonNotAllowed)
        );
        assert!(!tracker.is_active());
    }

    #[test]
    fn wrong_button_release_keeps_session() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 0, 2, 0.0);
        let dispatch = tracker.pointer_up(2, PointerButton::Secondary, pos(5.0));
        assert_eq!(
            dispatch.log.outcome,
            GestureLogOutcome::Ignored(GestureIgnoredReason::ButtonMismatch)
        );
        assert!(tracker.is_active());
    }

    #[test]
    fn non_finite_move_rejected() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 0, 2, 10.0);
        let dispatch = tracker.pointer_move(2, pos(f64::NAN));
        assert_eq!(
            dispatch.log.outcome,
            GestureLogOutcome::Ignored(GestureIgnoredReason::NonFinitePosition)
        );
        assert_eq!(tracker.vertical_delta(), Some(0.0));
    }

    #[test]
    fn lost_capture_cancels_without_release() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 1, 3, 0.0);
        tracker.capture_acquired(3);
        tracker.pointer_move(3, pos(25.0));
        let dispatch = tracker.lost_pointer_capture(3);
        let update = dispatch.update.unwrap();
        assert_eq!(update.phase, GesturePhase::Cancelled(CancelReason::LostCapture));
        assert!(!update.active);
        assert_eq!(dispatch.capture_command, None);
        assert!(!tracker.is_active());
    }

    #[test]
    fn blur_cancels_and_releases_capture() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 1, 3, 0.0);
        tracker.capture_acquired(3);
        let dispatch = tracker.blur();
        assert_eq!(
            dispatch.update.unwrap().phase,
            GesturePhase::Cancelled(CancelReason::Blur)
        );
        assert_eq!(
            dispatch.capture_command,
            Some(CaptureCommand::Release { pointer_id: 3 })
        );
    }

    #[test]
    fn leave_before_capture_cancels_but_leave_while_captured_does_not() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 0, 1, 0.0);
        let dispatch = tracker.pointer_leave(1);
        assert_eq!(
            dispatch.update.unwrap().phase,
            GesturePhase::Cancelled(CancelReason::PointerLeave)
        );

        down(&mut tracker, 0, 2, 0.0);
        tracker.capture_acquired(2);
        let dispatch = tracker.pointer_leave(2);
        assert_eq!(
            dispatch.log.outcome,
            GestureLogOutcome::Ignored(GestureIgnoredReason::LeaveWhileCaptured)
        );
        assert!(tracker.is_active());
    }

    #[test]
    fn cancel_with_mismatched_pointer_is_ignored() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 0, 1, 0.0);
        let dispatch = tracker.pointer_cancel(Some(2));
        assert!(dispatch.is_ignored());
        assert!(tracker.is_active());
        let dispatch = tracker.pointer_cancel(None);
        assert!(!dispatch.is_ignored());
        assert!(!tracker.is_active());
    }

    #[test]
    fn programmatic_cancel_reports_reason() {
        let mut tracker = GestureTracker::default();
        down(&mut tracker, 4, 1, 0.0);
        let dispatch = tracker.cancel(CancelReason::CollectionChanged);
        assert_eq!(
            dispatch.update.unwrap().phase,
            GesturePhase::Cancelled(CancelReason::CollectionChanged)
        );
        assert!(tracker.cancel(CancelReason::Programmatic).is_ignored());
    }
}
