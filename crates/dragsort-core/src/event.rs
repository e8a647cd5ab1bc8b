#![forbid(unsafe_code)]

//! Pointer lifecycle vocabulary shared by the gesture tracker and its hosts.

/// Pointer button reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Auxiliary,
}

/// Pointer position in list-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Why an in-progress drag ended without a clean pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CancelReason {
    /// Host delivered `pointercancel`.
    PointerCancel,
    /// Host lost pointer capture.
    LostCapture,
    /// Pointer left the list before capture was acknowledged.
    PointerLeave,
    /// Window lost focus.
    Blur,
    /// Document became hidden.
    VisibilityHidden,
    /// Underlying item collection changed identity mid-drag.
    CollectionChanged,
    /// Caller tore the session down explicitly.
    Programmatic,
}

impl CancelReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PointerCancel => "pointer_cancel",
            Self::LostCapture => "lost_capture",
            Self::PointerLeave => "pointer_leave",
            Self::Blur => "blur",
            Self::VisibilityHidden => "visibility_hidden",
            Self::CollectionChanged => "collection_changed",
            Self::Programmatic => "programmatic",
        }
    }
}

/// Host command for browser-style pointer capture.
///
/// Wire `Acquire` to `setPointerCapture()` and `Release` to
/// `releasePointerCapture()`, then report acquisition back through
/// [`GestureTracker::capture_acquired`](crate::gesture::GestureTracker::capture_acquired).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "command", rename_all = "snake_case"))]
pub enum CaptureCommand {
    Acquire { pointer_id: u32 },
    Release { pointer_id: u32 },
}
