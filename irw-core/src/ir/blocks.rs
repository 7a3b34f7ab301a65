//! Basic Block Management

use serde::{Deserialize, Serialize};
use crate::ir::{InstId, TerminatorData};

/// Basic block - sequence of instructions with a single terminator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    /// Label; unnamed blocks are numbered when rendered
    pub name: Option<String>,
    pub(crate) instructions: Vec<InstId>,
    pub(crate) terminator: Option<TerminatorData>,
}

impl BasicBlock {
    pub(crate) fn new(name: Option<String>) -> Self {
        Self {
            name,
            instructions: Vec::new(),
            terminator: None,
        }
    }

    pub fn instructions(&self) -> &[InstId] {
        &self.instructions
    }

    pub fn terminator(&self) -> Option<&TerminatorData> {
        self.terminator.as_ref()
    }

    /// Check if block has a terminator
    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }
}
