//! Error types for meshfix-repair.
//!
//! Plan rejections (exit code 2) are kept apart from runtime failures
//! (exit code 1) so callers can map them without string matching.

use meshfix_types::CellKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepairError {
    /// The plan asked a fixer for something it does not support.
    #[error("invalid plan option for {rule}: {key} = {value}")]
    InvalidOption {
        rule: String,
        key: String,
        value: String,
    },

    /// An edit referenced a cell past the end of its block.
    #[error("{kind} index {index} out of range (block has {len} cells)")]
    IndexOutOfRange {
        kind: CellKind,
        index: usize,
        len: usize,
    },

    /// A non-dry-run repair had nowhere to write the mesh.
    #[error("no mesh writer available; rerun as a dry run or provide an output sink")]
    WriterUnavailable,
}

impl RepairError {
    pub fn is_plan_rejection(&self) -> bool {
        matches!(self, RepairError::InvalidOption { .. })
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_plan_rejection() { 2 } else { 1 }
    }
}

pub type RepairResult<T> = Result<T, RepairError>;
