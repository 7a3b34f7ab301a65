//! Handles into a Module
//!
//! Every handle carries the tag of the module that created it. A handle that
//! is presented to a different module is reported as dangling instead of
//! silently aliasing an unrelated entity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_MODULE_TAG: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleTag(u32);

impl ModuleTag {
    pub(crate) fn fresh() -> Self {
        ModuleTag(NEXT_MODULE_TAG.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ModuleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// Handle to a function declaration or definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionId {
    pub(crate) module: ModuleTag,
    pub(crate) index: u32,
}

/// Handle to a basic block; also names the block's terminator for attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    pub(crate) func: FunctionId,
    pub(crate) index: u32,
}

/// Handle to a non-terminator instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstId {
    pub(crate) func: FunctionId,
    pub(crate) index: u32,
}

/// Handle to a global variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalId {
    pub(crate) module: ModuleTag,
    pub(crate) index: u32,
}

/// Handle to an attribute group (`#N`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttrGroupId {
    pub(crate) module: ModuleTag,
    pub(crate) index: u32,
}

/// Handle to a registered metadata node (`!N`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataId {
    pub(crate) module: ModuleTag,
    pub(crate) index: u32,
}

impl FunctionId {
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl BlockId {
    pub fn function(&self) -> FunctionId {
        self.func
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl InstId {
    pub fn function(&self) -> FunctionId {
        self.func
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl GlobalId {
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl AttrGroupId {
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl MetadataId {
    /// Registration index; equals the `!N` number printed for the node
    pub fn index(&self) -> u32 {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_tags_are_unique() {
        let a = ModuleTag::fresh();
        let b = ModuleTag::fresh();
        assert_ne!(a, b);
    }
}
