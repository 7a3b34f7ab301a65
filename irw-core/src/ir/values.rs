//! IR Value Representations
//!
//! Defines values that can be used as operands in IR instructions:
//! parameters, instruction results, constants, globals, functions and
//! metadata wrapped as a call argument.

use serde::{Deserialize, Serialize};
use crate::ir::{FunctionId, GlobalId, InstId, IrType, Metadata};

/// IR Value - represents operands in IR instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Function parameter by position
    Param(FunctionId, u32),

    /// Result of an instruction
    Inst(InstId),

    /// Constant
    Constant(Constant),

    /// Address of a global variable
    Global(GlobalId),

    /// Address of a function
    Function(FunctionId),

    /// Metadata passed as a value, `metadata !11`
    Metadata(Box<Metadata>),
}

impl Value {
    pub fn int(ty: IrType, value: i64) -> Self {
        Value::Constant(Constant::Int { ty, value })
    }

    pub fn i1(value: bool) -> Self {
        Value::int(IrType::I1, value as i64)
    }

    pub fn i8(value: i64) -> Self {
        Value::int(IrType::I8, value)
    }

    pub fn i32(value: i64) -> Self {
        Value::int(IrType::I32, value)
    }

    pub fn i64(value: i64) -> Self {
        Value::int(IrType::I64, value)
    }

    pub fn null(pointer_type: IrType) -> Self {
        Value::Constant(Constant::Null(pointer_type))
    }

    pub fn undef(ty: IrType) -> Self {
        Value::Constant(Constant::Undef(ty))
    }

    pub fn metadata(md: impl Into<Metadata>) -> Self {
        Value::Metadata(Box::new(md.into()))
    }

    /// Instruction handle, when this value is an instruction result
    pub fn inst(&self) -> Option<InstId> {
        match self {
            Value::Inst(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<Constant> for Value {
    fn from(constant: Constant) -> Self {
        Value::Constant(constant)
    }
}

impl From<InstId> for Value {
    fn from(id: InstId) -> Self {
        Value::Inst(id)
    }
}

/// Constant operands and initializers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    /// Integer constant; `i1` prints as `true`/`false`
    Int { ty: IrType, value: i64 },

    /// Null pointer of the given pointer type
    Null(IrType),

    Undef(IrType),

    ZeroInitializer(IrType),

    /// Byte string, printed `c"..."` with type `[N x i8]`
    Bytes(Vec<u8>),

    Array { element_type: IrType, elements: Vec<Constant> },

    Struct { fields: Vec<Constant>, packed: bool },

    /// Address of a global variable
    Global(GlobalId),

    /// Constant `getelementptr` over a global
    GetElementPtr {
        inbounds: bool,
        base: GlobalId,
        indices: Vec<Constant>,
    },

    /// Constant `bitcast`
    BitCast { value: Box<Constant>, to: IrType },
}

impl Constant {
    pub fn i32(value: i64) -> Self {
        Constant::Int { ty: IrType::I32, value }
    }

    pub fn i64(value: i64) -> Self {
        Constant::Int { ty: IrType::I64, value }
    }

    /// Byte string from UTF-8 text, without a trailing NUL
    pub fn string(text: &str) -> Self {
        Constant::Bytes(text.as_bytes().to_vec())
    }

    /// Integer value, when this is an integer constant
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Constant::Int { value, .. } => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_constructors() {
        assert_eq!(
            Value::i32(12),
            Value::Constant(Constant::Int { ty: IrType::I32, value: 12 })
        );
        assert_eq!(Value::i1(true), Value::int(IrType::I1, 1));
        assert_eq!(Value::i32(5).inst(), None);
    }

    #[test]
    fn test_constant_helpers() {
        assert_eq!(Constant::string("hi"), Constant::Bytes(vec![b'h', b'i']));
        assert_eq!(Constant::i64(-3).as_int(), Some(-3));
        assert_eq!(Constant::Null(IrType::I8.ptr()).as_int(), None);
    }
}
