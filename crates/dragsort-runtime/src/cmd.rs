#![forbid(unsafe_code)]

//! Commands the coordinator asks its host to run, and the messages that
//! report their results.
//!
//! The coordinator never performs I/O. After a drop it returns
//! [`ReorderCmd::Persist`]; the host runs it (directly or through
//! [`crate::backend::drive`]) and feeds the outcome back as a
//! [`ReorderMsg`]. Every persist and reload carries a [`PersistTicket`] so
//! late results from a superseded request are recognised and dropped.

use std::fmt;

use dragsort_core::event::CaptureCommand;

/// Monotonic id pairing a persist or reload command with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(transparent))]
pub struct PersistTicket(pub u64);

impl fmt::Display for PersistTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The backend rejected a persist or reload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistenceFailure {
    pub message: String,
}

impl PersistenceFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for PersistenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "persistence failed: {}", self.message)
    }
}

impl std::error::Error for PersistenceFailure {}

/// Side effect requested by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(tag = "cmd", rename_all = "snake_case"))]
pub enum ReorderCmd {
    /// Nothing to do.
    #[default]
    None,
    /// Acquire or release host pointer capture.
    Capture { command: CaptureCommand },
    /// Store the committed order. Answer with [`ReorderMsg::PersistResolved`].
    Persist {
        ticket: PersistTicket,
        ordered_ids: Vec<String>,
    },
    /// Fetch the authoritative collection. Answer with
    /// [`ReorderMsg::ReloadResolved`].
    Reload { ticket: PersistTicket },
    /// Run each command in order.
    Batch { cmds: Vec<ReorderCmd> },
}

impl ReorderCmd {
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    #[must_use]
    pub fn capture(command: CaptureCommand) -> Self {
        Self::Capture { command }
    }

    /// Combine commands, dropping `None`s and collapsing single entries.
    #[must_use]
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|cmd| !cmd.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Batch { cmds },
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Flatten nested batches into leaf commands, in execution order.
    #[must_use]
    pub fn into_leaves(self) -> Vec<Self> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(cmd) = stack.pop() {
            match cmd {
                Self::None => {}
                Self::Batch { cmds } => stack.extend(cmds.into_iter().rev()),
                leaf => leaves.push(leaf),
            }
        }
        leaves
    }

    /// The persist command among the leaves, if any.
    #[must_use]
    pub fn persist(&self) -> Option<(PersistTicket, &[String])> {
        match self {
            Self::Persist {
                ticket,
                ordered_ids,
            } => Some((*ticket, ordered_ids.as_slice())),
            Self::Batch { cmds } => cmds.iter().find_map(Self::persist),
            _ => None,
        }
    }

    /// The capture command among the leaves, if any.
    #[must_use]
    pub fn capture_command(&self) -> Option<CaptureCommand> {
        match self {
            Self::Capture { command } => Some(*command),
            Self::Batch { cmds } => cmds.iter().find_map(Self::capture_command),
            _ => None,
        }
    }
}

/// Result of a command, fed back into the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum ReorderMsg<T> {
    PersistResolved {
        ticket: PersistTicket,
        result: Result<(), PersistenceFailure>,
    },
    ReloadResolved {
        ticket: PersistTicket,
        result: Result<Vec<T>, PersistenceFailure>,
    },
}

impl<T> ReorderMsg<T> {
    #[must_use]
    pub fn ticket(&self) -> PersistTicket {
        match self {
            Self::PersistResolved { ticket, .. } | Self::ReloadResolved { ticket, .. } => *ticket,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persist(ticket: u64) -> ReorderCmd {
        ReorderCmd::Persist {
            ticket: PersistTicket(ticket),
            ordered_ids: vec!["a".into()],
        }
    }

    #[test]
    fn batch_collapses() {
        assert_eq!(ReorderCmd::batch(vec![]), ReorderCmd::None);
        assert_eq!(
            ReorderCmd::batch(vec![ReorderCmd::None, persist(1), ReorderCmd::None]),
            persist(1)
        );
        let release = ReorderCmd::capture(CaptureCommand::Release { pointer_id: 3 });
        assert_eq!(
            ReorderCmd::batch(vec![release.clone(), persist(2)]),
            ReorderCmd::Batch {
                cmds: vec![release, persist(2)]
            }
        );
    }

    #[test]
    fn leaves_keep_execution_order() {
        let nested = ReorderCmd::Batch {
            cmds: vec![
                ReorderCmd::capture(CaptureCommand::Release { pointer_id: 1 }),
                ReorderCmd::Batch {
                    cmds: vec![persist(4), ReorderCmd::None],
                },
                ReorderCmd::Reload {
                    ticket: PersistTicket(5),
                },
            ],
        };
        assert_eq!(nested.persist().map(|(t, _)| t), Some(PersistTicket(4)));
        assert_eq!(
            nested.capture_command(),
            Some(CaptureCommand::Release { pointer_id: 1 })
        );
        let leaves = nested.into_leaves();
        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[1], persist(4));
        assert!(matches!(leaves[2], ReorderCmd::Reload { .. }));
    }
}
