//! Build-time debug symbol table
//!
//! Programs that assemble debug info usually register all descriptors first
//! and then look them up by a symbolic name while emitting instructions.
//! `DebugSymbols` keeps that lookup explicit and typed: each entry records
//! what kind of descriptor it wraps, so asking for a location under a name
//! that holds a subprogram is an error rather than a silent reinterpretation.

use std::collections::HashMap;
use crate::error::{IrError, IrResult};
use crate::ir::{MetadataId, MetadataNode, Module};

/// A named debug descriptor, tagged by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugEntry {
    Location(MetadataId),
    Subprogram(MetadataId),
    Variable(MetadataId),
    Other(MetadataId),
}

impl DebugEntry {
    pub fn id(&self) -> MetadataId {
        match self {
            DebugEntry::Location(id)
            | DebugEntry::Subprogram(id)
            | DebugEntry::Variable(id)
            | DebugEntry::Other(id) => *id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DebugEntry::Location(_) => "location",
            DebugEntry::Subprogram(_) => "subprogram",
            DebugEntry::Variable(_) => "variable",
            DebugEntry::Other(_) => "node",
        }
    }
}

#[derive(Debug, Default)]
pub struct DebugSymbols {
    entries: HashMap<String, MetadataId>,
}

impl DebugSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` under `name`. Only the handle is stored; the entry kind
    /// is read from `module` on lookup, so a reserved slot registered before
    /// it is filled resolves to whatever it holds by then.
    pub fn register(&mut self, module: &Module, name: &str, id: MetadataId) -> IrResult<()> {
        module.metadata_def(id)?;
        if self.entries.contains_key(name) {
            return Err(IrError::DuplicateSymbol {
                name: name.to_string(),
                scope: "debug symbols".to_string(),
            });
        }
        self.entries.insert(name.to_string(), id);
        Ok(())
    }

    pub fn get(&self, module: &Module, name: &str) -> IrResult<DebugEntry> {
        let id = self
            .entries
            .get(name)
            .copied()
            .ok_or_else(|| IrError::UnknownSymbol {
                name: name.to_string(),
            })?;
        let entry = match &module.metadata_def(id)?.node {
            Some(MetadataNode::Location(_)) => DebugEntry::Location(id),
            Some(MetadataNode::Subprogram(_)) => DebugEntry::Subprogram(id),
            Some(MetadataNode::LocalVariable(_)) => DebugEntry::Variable(id),
            _ => DebugEntry::Other(id),
        };
        Ok(entry)
    }

    pub fn location(&self, module: &Module, name: &str) -> IrResult<MetadataId> {
        match self.get(module, name)? {
            DebugEntry::Location(id) => Ok(id),
            other => Err(mismatch(name, "location", other)),
        }
    }

    pub fn subprogram(&self, module: &Module, name: &str) -> IrResult<MetadataId> {
        match self.get(module, name)? {
            DebugEntry::Subprogram(id) => Ok(id),
            other => Err(mismatch(name, "subprogram", other)),
        }
    }

    pub fn variable(&self, module: &Module, name: &str) -> IrResult<MetadataId> {
        match self.get(module, name)? {
            DebugEntry::Variable(id) => Ok(id),
            other => Err(mismatch(name, "variable", other)),
        }
    }

    /// Handle of any kind of entry
    pub fn node(&self, module: &Module, name: &str) -> IrResult<MetadataId> {
        Ok(self.get(module, name)?.id())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn mismatch(name: &str, expected: &'static str, found: DebugEntry) -> IrError {
    IrError::SymbolKindMismatch {
        name: name.to_string(),
        expected,
        found: found.kind_name(),
    }
}
