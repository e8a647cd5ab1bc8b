#![forbid(unsafe_code)]

//! Per-item animation targets and spring interpolation for a reorderable list.
//!
//! [`compute_targets`] is the pure mapping from `(order, drag)` to one
//! [`AnimationTarget`] per item. [`LayoutAnimator`] owns the springs that move
//! each rendered item toward its target every frame.
//!
//! # Targets
//!
//! | item | offset | scale | stack | shadow | immediate |
//! |------|--------|-------|-------|--------|-----------|
//! | dragged | `start_slot*h + delta` | `drag_scale` | 1 | High | offset, stack |
//! | others | `slot*h` | 1.0 | 0 | Low | none |
//!
//! The dragged item follows the pointer with no lag; every displaced item
//! glides. After release the dropped item keeps its raised stack order until
//! its offset spring settles, so it never slides underneath its neighbours.
//!
//! # Invariants
//!
//! 1. Motion state is keyed by item key, not index, so a collection resync
//!    that renumbers items continues in-flight motion.
//! 2. The animator never stores or mutates the order; it only reads the
//!    order passed to [`LayoutAnimator::retarget`].

use std::time::Duration;

use ahash::{AHashMap, AHashSet};
use bitflags::bitflags;

use crate::animation::{Animation, Spring, SpringParams};
use crate::order::{OrderArray, OrderError};

bitflags! {
    /// Fields of an [`AnimationTarget`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MotionFields: u8 {
        const OFFSET = 1 << 0;
        const SCALE = 1 << 1;
        const STACK_ORDER = 1 << 2;
        const SHADOW = 1 << 3;
    }
}

/// Shadow depth of a rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ShadowDepth {
    #[default]
    Low,
    High,
}

/// Where one item should be heading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationTarget {
    pub vertical_offset: f64,
    pub scale: f64,
    pub stack_order: i32,
    pub shadow_depth: ShadowDepth,
    /// Fields applied without interpolation.
    pub immediate_fields: MotionFields,
}

/// Read-only view of the drag in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragView {
    pub original_index: usize,
    pub start_slot: usize,
    pub vertical_delta: f64,
    pub active: bool,
}

/// Spring and styling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    pub stiffness: f64,
    pub damping: f64,
    /// Settle distance for offsets and shadow elevation.
    pub offset_rest_threshold: f64,
    /// Settle distance for scale.
    pub scale_rest_threshold: f64,
    /// Scale of the item under the pointer.
    pub drag_scale: f64,
    pub low_elevation: f64,
    pub high_elevation: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        let stiffness = 170.0_f64;
        Self {
            stiffness,
            damping: 2.0 * stiffness.sqrt(),
            offset_rest_threshold: 0.01,
            scale_rest_threshold: 1e-4,
            drag_scale: 1.02,
            low_elevation: 1.0,
            high_elevation: 8.0,
        }
    }
}

impl MotionConfig {
    /// Numeric elevation of a shadow depth.
    #[must_use]
    pub fn elevation(&self, depth: ShadowDepth) -> f64 {
        match depth {
            ShadowDepth::Low => self.low_elevation,
            ShadowDepth::High => self.high_elevation,
        }
    }

    fn spring(&self, value: f64, rest_threshold: f64) -> Spring {
        let params = SpringParams {
            stiffness: self.stiffness,
            damping: self.damping,
            rest_threshold,
        };
        Spring::at(value, params)
    }
}

/// Compute the target of every item.
///
/// `order` is the visual order to lay out (speculative while dragging). A
/// drag whose index is out of range is treated as absent.
pub fn compute_targets(
    order: &OrderArray,
    drag: Option<DragView>,
    item_height: f64,
    config: &MotionConfig,
) -> Result<Vec<AnimationTarget>, OrderError> {
    let n = order.len();
    let dragged = drag.filter(|d| d.active && d.original_index < n);
    (0..n)
        .map(|index| match dragged {
            Some(d) if d.original_index == index => Ok(AnimationTarget {
                vertical_offset: d.start_slot as f64 * item_height + d.vertical_delta,
                scale: config.drag_scale,
                stack_order: 1,
                shadow_depth: ShadowDepth::High,
                immediate_fields: MotionFields::OFFSET | MotionFields::STACK_ORDER,
            }),
            _ => Ok(AnimationTarget {
                vertical_offset: order.slot_of(index)? as f64 * item_height,
                scale: 1.0,
                stack_order: 0,
                shadow_depth: ShadowDepth::Low,
                immediate_fields: MotionFields::empty(),
            }),
        })
        .collect()
}

/// Interpolated render values for one item.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemFrame {
    pub index: usize,
    pub vertical_offset: f64,
    pub scale: f64,
    pub stack_order: i32,
    pub shadow_elevation: f64,
}

#[derive(Debug, Clone)]
struct ItemMotion {
    offset: Spring,
    scale: Spring,
    elevation: Spring,
    stack_order: i32,
    pending_stack_order: Option<i32>,
}

impl ItemMotion {
    fn at(target: &AnimationTarget, config: &MotionConfig) -> Self {
        Self {
            offset: config.spring(target.vertical_offset, config.offset_rest_threshold),
            scale: config.spring(target.scale, config.scale_rest_threshold),
            elevation: config.spring(
                config.elevation(target.shadow_depth),
                config.offset_rest_threshold,
            ),
            stack_order: target.stack_order,
            pending_stack_order: None,
        }
    }

    fn apply(&mut self, target: &AnimationTarget, config: &MotionConfig) {
        let immediate = target.immediate_fields;
        retarget(
            &mut self.offset,
            target.vertical_offset,
            immediate.contains(MotionFields::OFFSET),
        );
        retarget(
            &mut self.scale,
            target.scale,
            immediate.contains(MotionFields::SCALE),
        );
        retarget(
            &mut self.elevation,
            config.elevation(target.shadow_depth),
            immediate.contains(MotionFields::SHADOW),
        );
        if immediate.contains(MotionFields::STACK_ORDER) || self.offset.is_settled() {
            self.stack_order = target.stack_order;
            self.pending_stack_order = None;
        } else if target.stack_order != self.stack_order {
            self.pending_stack_order = Some(target.stack_order);
        }
    }

    fn frame(&self, index: usize) -> ItemFrame {
        ItemFrame {
            index,
            vertical_offset: self.offset.value(),
            scale: self.scale.value(),
            stack_order: self.stack_order,
            shadow_elevation: self.elevation.value(),
        }
    }
}

fn retarget(spring: &mut Spring, value: f64, immediate: bool) {
    if immediate {
        spring.jump_to(value);
    } else {
        spring.retarget(value);
    }
}

impl Animation for ItemMotion {
    fn tick(&mut self, dt: Duration) {
        self.offset.tick(dt);
        self.scale.tick(dt);
        self.elevation.tick(dt);
        if self.offset.is_settled()
            && let Some(stack_order) = self.pending_stack_order.take()
        {
            self.stack_order = stack_order;
        }
    }

    fn is_complete(&self) -> bool {
        self.offset.is_settled()
            && self.scale.is_settled()
            && self.elevation.is_settled()
            && self.pending_stack_order.is_none()
    }
}

/// Item id plus how many earlier items carry the same id, so repeated ids
/// still get one motion each.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MotionKey {
    id: String,
    occurrence: usize,
}

/// Spring-driven layout for a list of keyed items.
#[derive(Debug, Clone)]
pub struct LayoutAnimator {
    config: MotionConfig,
    item_height: f64,
    keys: Vec<MotionKey>,
    motions: AHashMap<MotionKey, ItemMotion>,
    targets: Vec<AnimationTarget>,
}

impl LayoutAnimator {
    #[must_use]
    pub fn new(config: MotionConfig, item_height: f64) -> Self {
        Self {
            config,
            item_height,
            keys: Vec::new(),
            motions: AHashMap::new(),
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    #[must_use]
    pub fn item_height(&self) -> f64 {
        self.item_height
    }

    /// Number of keyed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Replace the item keys (one per original index).
    ///
    /// Motion for keys that survive is kept; motion for vanished keys is
    /// dropped. New keys start at rest on their first target. A repeated key
    /// gets its own motion per occurrence. Returns the number of repeats.
    pub fn sync_keys<I, S>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: AHashMap<String, usize> = AHashMap::new();
        let mut repeats = 0;
        self.keys = keys
            .into_iter()
            .map(|key| {
                let id = key.into();
                let count = seen.entry(id.clone()).or_insert(0);
                let occurrence = *count;
                *count += 1;
                if occurrence > 0 {
                    repeats += 1;
                }
                MotionKey { id, occurrence }
            })
            .collect();
        let live: AHashSet<&MotionKey> = self.keys.iter().collect();
        self.motions.retain(|key, _| live.contains(key));
        self.targets.clear();
        repeats
    }

    /// Recompute targets for `order` and the optional drag, and retarget springs.
    pub fn retarget(&mut self, order: &OrderArray, drag: Option<DragView>) -> Result<(), OrderError> {
        if order.len() != self.keys.len() {
            return Err(OrderError::LengthMismatch {
                order_len: order.len(),
                items_len: self.keys.len(),
            });
        }
        let targets = compute_targets(order, drag, self.item_height, &self.config)?;
        for (key, target) in self.keys.iter().zip(&targets) {
            match self.motions.get_mut(key) {
                Some(motion) => motion.apply(target, &self.config),
                None => {
                    self.motions
                        .insert(key.clone(), ItemMotion::at(target, &self.config));
                }
            }
        }
        self.targets = targets;
        Ok(())
    }

    /// Advance every spring by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        for motion in self.motions.values_mut() {
            motion.tick(dt);
        }
    }

    /// Whether every item has reached its target.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.motions.values().all(ItemMotion::is_complete)
    }

    /// Last computed targets, by original index.
    #[must_use]
    pub fn targets(&self) -> &[AnimationTarget] {
        &self.targets
    }

    /// Current interpolated values for the item at `index`.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<ItemFrame> {
        let key = self.keys.get(index)?;
        self.motions.get(key).map(|motion| motion.frame(index))
    }

    /// Current interpolated values for every item, by original index.
    #[must_use]
    pub fn frames(&self) -> Vec<ItemFrame> {
        (0..self.keys.len())
            .filter_map(|index| self.frame(index))
            .collect()
    }
}
