//! Whole-module structural checks run before rendering
//!
//! Most invariants are enforced when entities are appended. What can only be
//! checked on the finished graph lives here: terminators, phi edges, filled
//! metadata slots, and handles stored through the public fields of
//! functions and globals. Operand types are checked again, since a
//! signature may have been edited after its body was built.

use log::debug;
use std::collections::HashSet;
use crate::error::{IrError, IrResult};
use crate::ir::{BlockId, FuncAttr, Function, Instruction, Module, Value};

impl Module {
    pub fn verify(&self) -> IrResult<()> {
        self.verify_symbols()?;
        self.verify_metadata()?;
        for global in &self.globals {
            if let Some(init) = &global.initializer {
                let init_type = self.constant_type(init)?;
                if init_type != global.value_type {
                    return Err(IrError::invalid_operand(format!(
                        "initializer of '@{}' has type {init_type}, expected {}",
                        global.name, global.value_type
                    )));
                }
            }
            for attachment in &global.metadata {
                self.check_metadata(None, &attachment.node)?;
            }
        }
        for function in &self.functions {
            self.verify_function(function)?;
        }
        debug!(
            "verified {}: {} functions, {} metadata nodes",
            self.tag,
            self.functions.len(),
            self.metadata.len()
        );
        Ok(())
    }

    /// Global names and the local names of each function must be unique
    fn verify_symbols(&self) -> IrResult<()> {
        let mut globals = HashSet::new();
        let names = self
            .globals
            .iter()
            .map(|g| g.name.as_str())
            .chain(self.functions.iter().map(|f| f.name.as_str()));
        for name in names {
            if !globals.insert(name) {
                return Err(IrError::DuplicateSymbol {
                    name: name.to_string(),
                    scope: "module".to_string(),
                });
            }
        }

        for function in &self.functions {
            let mut locals = HashSet::new();
            let names = function
                .params
                .iter()
                .filter_map(|p| p.name.as_deref())
                .chain(function.blocks.iter().filter_map(|b| b.name.as_deref()))
                .chain(function.instructions.iter().filter_map(|i| i.name.as_deref()));
            for name in names {
                if !locals.insert(name) {
                    return Err(IrError::DuplicateSymbol {
                        name: name.to_string(),
                        scope: format!("function '@{}'", function.name),
                    });
                }
            }
        }
        Ok(())
    }

    fn verify_metadata(&self) -> IrResult<()> {
        for (index, def) in self.metadata.iter().enumerate() {
            let index = index as u32;
            let Some(node) = &def.node else {
                return Err(IrError::incomplete(index, "reserved but never filled"));
            };
            if let Some(field) = node.missing_field() {
                return Err(IrError::incomplete(
                    index,
                    format!("required field '{field}' of {} is unset", node.kind_name()),
                ));
            }
            self.check_node_operands(node)?;
        }
        for named in &self.named_metadata {
            for id in &named.nodes {
                self.check_metadata_id(*id)?;
            }
        }
        Ok(())
    }

    fn verify_function(&self, function: &Function) -> IrResult<()> {
        for attr in &function.attrs {
            if let FuncAttr::Group(group) = attr {
                self.check_attr_group(*group)?;
            }
        }
        for attachment in &function.metadata {
            self.check_metadata(None, &attachment.node)?;
        }

        for block_id in function.block_ids() {
            let block = &function.blocks[block_id.index as usize];
            let Some(term) = &block.terminator else {
                return Err(IrError::UnterminatedBlock {
                    function: function.name.clone(),
                    block: function.block_label(block_id),
                });
            };
            self.check_terminator(function.id, &term.terminator)?;
            for attachment in &term.metadata {
                self.check_metadata(Some(function.id), &attachment.node)?;
            }

            let mut seen_non_phi = false;
            for inst_id in &block.instructions {
                let data = &function.instructions[inst_id.index as usize];
                for attachment in &data.metadata {
                    self.check_metadata(Some(function.id), &attachment.node)?;
                }
                let ty = self.result_type(function.id, &data.instruction)?;
                if ty != data.ty {
                    return Err(IrError::invalid_operand(format!(
                        "instruction in '@{}' was built as {}, its operands now give {ty}",
                        function.name, data.ty
                    )));
                }
                match &data.instruction {
                    Instruction::Phi { incoming, .. } => {
                        if seen_non_phi {
                            return Err(IrError::PhiMismatch {
                                function: function.name.clone(),
                                block: function.block_label(block_id),
                                message: "phi after a non-phi instruction".to_string(),
                            });
                        }
                        check_phi_edges(function, block_id, incoming)?;
                    }
                    _ => seen_non_phi = true,
                }
            }
        }
        Ok(())
    }
}

/// Incoming blocks must equal the predecessors as a multiset, and repeated
/// edges from one block must carry the same value
fn check_phi_edges(function: &Function, block: BlockId, incoming: &[(Value, BlockId)]) -> IrResult<()> {
    let mismatch = |message: String| IrError::PhiMismatch {
        function: function.name.clone(),
        block: function.block_label(block),
        message,
    };
    if incoming.is_empty() {
        return Err(mismatch("phi without incoming values".to_string()));
    }
    for (i, (value, from)) in incoming.iter().enumerate() {
        if incoming[..i].iter().any(|(v, b)| b == from && v != value) {
            return Err(mismatch(format!(
                "different values for the edge from {}",
                function.block_label(*from)
            )));
        }
    }

    let mut edges: Vec<BlockId> = incoming.iter().map(|(_, b)| *b).collect();
    let mut preds = function.predecessors(block);
    preds.sort_by_key(|b| b.index);
    edges.sort_by_key(|b| b.index);
    if preds == edges {
        return Ok(());
    }
    let labels = |blocks: &[BlockId]| {
        blocks
            .iter()
            .map(|b| function.block_label(*b))
            .collect::<Vec<_>>()
            .join(", ")
    };
    Err(mismatch(format!(
        "incoming [{}], predecessors [{}]",
        labels(&edges),
        labels(&preds)
    )))
}
