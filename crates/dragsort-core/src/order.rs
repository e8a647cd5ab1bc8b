#![forbid(unsafe_code)]

//! Slot permutation for reorderable lists.
//!
//! An [`OrderArray`] maps visual slots to the original index of the item shown
//! there: `order[slot] == original_index`. Every operation either returns a
//! new array or an [`OrderError`]; nothing mutates an array in place, so a
//! failed operation can never leave a half-moved permutation behind.
//!
//! # Invariants
//!
//! 1. An `OrderArray` of length `n` contains each of `0..n` exactly once.
//! 2. [`OrderArray::compute_swap`] is an insertion-style move: the element at
//!    `from` lands at `to` and everything in between shifts one slot toward
//!    the vacated position.
//! 3. [`clamp_slot`] never panics and always returns a slot in `[0, n-1]`
//!    (or `0` for an empty list).
//!
//! # Failure Modes
//!
//! - Out-of-range slots or indices produce [`OrderError`] values rather than
//!   panics. Under correct use they never occur.
//! - [`OrderError::InvalidPermutation`] only appears when building an array
//!   from untrusted data; it indicates a programming defect upstream.

use std::fmt;

/// A permutation of `0..n` mapping visual slots to original item indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<usize>", into = "Vec<usize>")
)]
pub struct OrderArray(Vec<usize>);

impl OrderArray {
    /// The identity permutation `[0, 1, ..., n-1]`.
    #[must_use]
    pub fn initialize(n: usize) -> Self {
        Self((0..n).collect())
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the permutation is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Slot-ordered view of original indices.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Original index shown at `slot`.
    #[inline]
    #[must_use]
    pub fn original_at(&self, slot: usize) -> Option<usize> {
        self.0.get(slot).copied()
    }

    /// Whether every item sits in its original slot.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(slot, &index)| slot == index)
    }

    /// Current slot of the item whose original index is `original_index`.
    pub fn slot_of(&self, original_index: usize) -> Result<usize, OrderError> {
        self.0
            .iter()
            .position(|&index| index == original_index)
            .ok_or(OrderError::NotFound {
                original_index,
                len: self.0.len(),
            })
    }

    /// Return a new array with the element at `from_slot` moved to `to_slot`.
    ///
    /// Elements between the two slots shift by one toward `from_slot`.
    /// `from_slot == to_slot` returns an equal array.
    pub fn compute_swap(&self, from_slot: usize, to_slot: usize) -> Result<Self, OrderError> {
        let len = self.0.len();
        for slot in [from_slot, to_slot] {
            if slot >= len {
                return Err(OrderError::SlotOutOfRange { slot, len });
            }
        }
        let mut next = self.0.clone();
        let moved = next.remove(from_slot);
        next.insert(to_slot, moved);
        Ok(Self(next))
    }

    /// Check the bijection invariant.
    pub fn validate(&self) -> Result<(), OrderError> {
        let len = self.0.len();
        let mut seen = vec![false; len];
        for &index in &self.0 {
            match seen.get_mut(index) {
                Some(slot_seen) if !*slot_seen => *slot_seen = true,
                _ => {
                    return Err(OrderError::InvalidPermutation {
                        len,
                        offending: index,
                    });
                }
            }
        }
        Ok(())
    }

    /// Arrange `items` (indexed by original position) into slot order.
    pub fn apply<'a, T>(&self, items: &'a [T]) -> Result<Vec<&'a T>, OrderError> {
        if items.len() != self.0.len() {
            return Err(OrderError::LengthMismatch {
                order_len: self.0.len(),
                items_len: items.len(),
            });
        }
        Ok(self.0.iter().map(|&index| &items[index]).collect())
    }

    /// Consume the array, returning the raw slot vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl TryFrom<Vec<usize>> for OrderArray {
    type Error = OrderError;

    fn try_from(raw: Vec<usize>) -> Result<Self, Self::Error> {
        let order = Self(raw);
        order.validate()?;
        Ok(order)
    }
}

impl From<OrderArray> for Vec<usize> {
    fn from(order: OrderArray) -> Self {
        order.0
    }
}

impl AsRef<[usize]> for OrderArray {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

/// Round a continuous slot position to the nearest slot in `[0, n-1]`.
///
/// Rounding is half-up (`1.5 -> 2`, `-0.5 -> 0`). NaN maps to slot 0 and
/// infinities clamp to the nearest end.
#[must_use]
pub fn clamp_slot(raw_slot: f64, n: usize) -> usize {
    if n == 0 || raw_slot.is_nan() {
        return 0;
    }
    let last = n - 1;
    let rounded = (raw_slot + 0.5).floor();
    if rounded <= 0.0 {
        0
    } else if rounded >= last as f64 {
        last
    } else {
        rounded as usize
    }
}

/// Slot a dragged item should occupy after moving `vertical_delta` pixels
/// from `start_slot`, for rows `item_height` pixels tall.
///
/// A non-positive or non-finite `item_height` keeps the item at its start
/// slot.
#[must_use]
pub fn desired_slot(start_slot: usize, vertical_delta: f64, item_height: f64, n: usize) -> usize {
    if !(item_height.is_finite() && item_height > 0.0) {
        return clamp_slot(start_slot as f64, n);
    }
    let offset = start_slot as f64 * item_height + vertical_delta;
    clamp_slot(offset / item_height, n)
}

/// Errors produced by order operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The original index does not appear in the permutation.
    NotFound { original_index: usize, len: usize },
    /// A slot argument lies outside `[0, len-1]`.
    SlotOutOfRange { slot: usize, len: usize },
    /// The array is not a bijection over `0..len`.
    InvalidPermutation { len: usize, offending: usize },
    /// Items and order disagree on the collection size.
    LengthMismatch { order_len: usize, items_len: usize },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound {
                original_index,
                len,
            } => write!(f, "original index {original_index} not found in order of length {len}"),
            Self::SlotOutOfRange { slot, len } => {
                write!(f, "slot {slot} out of range for order of length {len}")
            }
            Self::InvalidPermutation { len, offending } => write!(
                f,
                "order is not a permutation of 0..{len} (offending entry {offending})"
            ),
            Self::LengthMismatch {
                order_len,
                items_len,
            } => write!(
                f,
                "order has {order_len} slots but collection has {items_len} items"
            ),
        }
    }
}

impl std::error::Error for OrderError {}
