//! IR Instructions
//!
//! Defines the non-terminator instructions and the block terminators.
//! Result slots are not stored here; they are assigned when the module is
//! rendered.

use serde::{Deserialize, Serialize};
use crate::ir::{
    Attachment, BinaryFlags, BlockId, CastOp, IntPredicate, IrBinaryOp, IrType, Value,
};

/// Calling conventions other than the default `ccc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallingConv {
    Fast,
    Cold,
    WebKitJs,
    AnyReg,
    Swift,
    /// Numbered convention, `ccN`
    Numbered(u32),
}

impl std::fmt::Display for CallingConv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallingConv::Fast => write!(f, "fastcc"),
            CallingConv::Cold => write!(f, "coldcc"),
            CallingConv::WebKitJs => write!(f, "webkit_jscc"),
            CallingConv::AnyReg => write!(f, "anyregcc"),
            CallingConv::Swift => write!(f, "swiftcc"),
            CallingConv::Numbered(n) => write!(f, "cc {n}"),
        }
    }
}

/// Tail call marker on a call instruction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TailKind {
    #[default]
    None,
    Tail,
    MustTail,
    NoTail,
}

/// IR Instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Binary operation: result = op lhs, rhs
    Binary {
        op: IrBinaryOp,
        lhs: Value,
        rhs: Value,
        flags: BinaryFlags,
    },

    /// Integer or pointer comparison, yields i1
    ICmp {
        predicate: IntPredicate,
        lhs: Value,
        rhs: Value,
    },

    /// Type cast: result = op value to target_type
    Cast {
        op: CastOp,
        value: Value,
        target_type: IrType,
    },

    /// Allocate stack memory: result = alloca type, count
    Alloca {
        alloc_type: IrType,
        count: Option<Value>,
        align: Option<u32>,
    },

    /// Load from memory: result = load ptr
    Load {
        ptr: Value,
        align: Option<u32>,
        volatile: bool,
    },

    /// Store to memory: store value, ptr
    Store {
        value: Value,
        ptr: Value,
        align: Option<u32>,
        volatile: bool,
    },

    /// Get element pointer: result = getelementptr ptr, indices...
    GetElementPtr {
        ptr: Value,
        indices: Vec<Value>,
        inbounds: bool,
    },

    /// Function call: result = call callee(args...)
    Call {
        callee: Value,
        args: Vec<Value>,
        tail: TailKind,
        calling_conv: Option<CallingConv>,
    },

    /// Phi node: result = phi ty [val1, block1], [val2, block2], ...
    Phi {
        ty: IrType,
        incoming: Vec<(Value, BlockId)>,
    },

    /// Select (ternary): result = select condition, true_value, false_value
    Select {
        condition: Value,
        true_value: Value,
        false_value: Value,
    },
}

impl Instruction {
    pub fn is_phi(&self) -> bool {
        matches!(self, Instruction::Phi { .. })
    }
}

/// Block terminators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Terminator {
    /// Return: ret value or ret void
    Ret(Option<Value>),

    /// Unconditional branch: br label
    Br(BlockId),

    /// Conditional branch: br i1 condition, label then, label else
    CondBr {
        condition: Value,
        then_block: BlockId,
        else_block: BlockId,
    },

    Unreachable,
}

impl Terminator {
    /// Successor blocks, in printing order (duplicates kept)
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Br(target) => vec![*target],
            Terminator::CondBr { then_block, else_block, .. } => vec![*then_block, *else_block],
            Terminator::Ret(_) | Terminator::Unreachable => Vec::new(),
        }
    }
}

/// An instruction placed in a function, with its computed result type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionData {
    pub instruction: Instruction,
    /// Result type; `void` for instructions that produce no value
    pub ty: IrType,
    pub name: Option<String>,
    /// Owning block
    pub block: BlockId,
    pub metadata: Vec<Attachment>,
}

impl InstructionData {
    /// Whether this instruction defines a value that can be numbered
    pub fn has_result(&self) -> bool {
        !self.ty.is_void()
    }
}

/// A terminator with its metadata attachments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminatorData {
    pub terminator: Terminator,
    pub metadata: Vec<Attachment>,
}
