//! IR Builder
//!
//! Provides utilities for constructing IR programmatically: an insertion
//! block plus an optional current debug location that is attached as `!dbg`
//! to everything the builder emits.

use crate::error::{IrError, IrResult};
use crate::ir::{
    AttachTarget, BinaryFlags, BlockId, CastOp, FunctionId, InstId, Instruction, IntPredicate,
    IrBinaryOp, IrType, Metadata, Module, TailKind, Terminator, Value,
};

/// Builder for appending instructions to a module
///
/// Every `build_*` method that produces a value takes a `name`; an empty
/// name leaves the result unnamed so it gets a local number when rendered.
pub struct IrBuilder<'m> {
    module: &'m mut Module,
    insert_block: Option<BlockId>,
    debug_location: Option<Metadata>,
}

impl<'m> IrBuilder<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        Self {
            module,
            insert_block: None,
            debug_location: None,
        }
    }

    pub fn module(&self) -> &Module {
        &*self.module
    }

    pub fn module_mut(&mut self) -> &mut Module {
        &mut *self.module
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.insert_block = Some(block);
    }

    pub fn insert_block(&self) -> Option<BlockId> {
        self.insert_block
    }

    /// Attach `location` as `!dbg` to everything built from now on
    pub fn set_debug_location(&mut self, location: impl Into<Metadata>) {
        self.debug_location = Some(location.into());
    }

    pub fn clear_debug_location(&mut self) {
        self.debug_location = None;
    }

    fn current_block(&self) -> IrResult<BlockId> {
        self.insert_block.ok_or(IrError::NoInsertionPoint)
    }

    fn insert(&mut self, instruction: Instruction, name: &str) -> IrResult<InstId> {
        let block = self.current_block()?;
        let id = self.module.append_instruction(block, instruction)?;
        if !name.is_empty() {
            self.module.set_value_name(id, name)?;
        }
        if let Some(location) = self.debug_location.clone() {
            self.module.attach_metadata(id, "dbg", location)?;
        }
        Ok(id)
    }

    fn terminate(&mut self, terminator: Terminator) -> IrResult<()> {
        let block = self.current_block()?;
        self.module.terminate_block(block, terminator)?;
        if let Some(location) = self.debug_location.clone() {
            self.module
                .attach_metadata(AttachTarget::Terminator(block), "dbg", location)?;
        }
        Ok(())
    }

    pub fn build_binary(&mut self, op: IrBinaryOp, lhs: Value, rhs: Value, name: &str) -> IrResult<Value> {
        self.build_binary_with_flags(op, BinaryFlags::NONE, lhs, rhs, name)
    }

    pub fn build_binary_with_flags(
        &mut self,
        op: IrBinaryOp,
        flags: BinaryFlags,
        lhs: Value,
        rhs: Value,
        name: &str,
    ) -> IrResult<Value> {
        let instr = Instruction::Binary { op, lhs, rhs, flags };
        Ok(self.insert(instr, name)?.into())
    }

    pub fn build_icmp(
        &mut self,
        predicate: IntPredicate,
        lhs: Value,
        rhs: Value,
        name: &str,
    ) -> IrResult<Value> {
        let instr = Instruction::ICmp { predicate, lhs, rhs };
        Ok(self.insert(instr, name)?.into())
    }

    pub fn build_cast(&mut self, op: CastOp, value: Value, target_type: IrType, name: &str) -> IrResult<Value> {
        let instr = Instruction::Cast { op, value, target_type };
        Ok(self.insert(instr, name)?.into())
    }

    pub fn build_bitcast(&mut self, value: Value, target_type: IrType, name: &str) -> IrResult<Value> {
        self.build_cast(CastOp::BitCast, value, target_type, name)
    }

    pub fn build_alloca(&mut self, alloc_type: IrType, align: Option<u32>, name: &str) -> IrResult<Value> {
        let instr = Instruction::Alloca { alloc_type, count: None, align };
        Ok(self.insert(instr, name)?.into())
    }

    pub fn build_load(&mut self, ptr: Value, align: Option<u32>, name: &str) -> IrResult<Value> {
        let instr = Instruction::Load { ptr, align, volatile: false };
        Ok(self.insert(instr, name)?.into())
    }

    pub fn build_store(&mut self, value: Value, ptr: Value, align: Option<u32>) -> IrResult<InstId> {
        let instr = Instruction::Store { value, ptr, align, volatile: false };
        self.insert(instr, "")
    }

    pub fn build_gep(&mut self, ptr: Value, indices: Vec<Value>, name: &str) -> IrResult<Value> {
        let instr = Instruction::GetElementPtr { ptr, indices, inbounds: false };
        Ok(self.insert(instr, name)?.into())
    }

    pub fn build_inbounds_gep(&mut self, ptr: Value, indices: Vec<Value>, name: &str) -> IrResult<Value> {
        let instr = Instruction::GetElementPtr { ptr, indices, inbounds: true };
        Ok(self.insert(instr, name)?.into())
    }

    /// Direct call; the handle stays usable for void callees, where it has no value
    pub fn build_call(&mut self, callee: FunctionId, args: Vec<Value>, name: &str) -> IrResult<InstId> {
        let instr = Instruction::Call {
            callee: Value::Function(callee),
            args,
            tail: TailKind::None,
            calling_conv: self.module.function(callee)?.calling_conv,
        };
        self.insert(instr, name)
    }

    pub fn build_tail_call(&mut self, callee: FunctionId, args: Vec<Value>, name: &str) -> IrResult<InstId> {
        let instr = Instruction::Call {
            callee: Value::Function(callee),
            args,
            tail: TailKind::Tail,
            calling_conv: self.module.function(callee)?.calling_conv,
        };
        self.insert(instr, name)
    }

    /// Phi with its initial incoming edges; back-edges can be added later
    /// with [`Module::add_phi_incoming`]
    pub fn build_phi(&mut self, ty: IrType, incoming: Vec<(Value, BlockId)>, name: &str) -> IrResult<InstId> {
        let instr = Instruction::Phi { ty, incoming };
        self.insert(instr, name)
    }

    pub fn build_select(
        &mut self,
        condition: Value,
        true_value: Value,
        false_value: Value,
        name: &str,
    ) -> IrResult<Value> {
        let instr = Instruction::Select { condition, true_value, false_value };
        Ok(self.insert(instr, name)?.into())
    }

    pub fn build_ret(&mut self, value: Option<Value>) -> IrResult<()> {
        self.terminate(Terminator::Ret(value))
    }

    pub fn build_br(&mut self, target: BlockId) -> IrResult<()> {
        self.terminate(Terminator::Br(target))
    }

    pub fn build_cond_br(&mut self, condition: Value, then_block: BlockId, else_block: BlockId) -> IrResult<()> {
        self.terminate(Terminator::CondBr { condition, then_block, else_block })
    }

    pub fn build_unreachable(&mut self) -> IrResult<()> {
        self.terminate(Terminator::Unreachable)
    }
}
