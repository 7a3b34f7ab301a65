//! IR Operations
//!
//! Binary operations with their wrap flags, integer comparison predicates
//! and cast opcodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operations in IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrBinaryOp {
    // Arithmetic
    Add, Sub, Mul,
    SDiv, UDiv,    // Signed/unsigned division
    SRem, URem,    // Signed/unsigned remainder

    // Bitwise
    And, Or, Xor,
    Shl, LShr, AShr, // Logical/arithmetic shift right
}

impl IrBinaryOp {
    /// Whether `nuw`/`nsw` may be set on this operation
    pub fn allows_wrap_flags(&self) -> bool {
        matches!(self, IrBinaryOp::Add | IrBinaryOp::Sub | IrBinaryOp::Mul | IrBinaryOp::Shl)
    }

    /// Whether `exact` may be set on this operation
    pub fn allows_exact(&self) -> bool {
        matches!(
            self,
            IrBinaryOp::SDiv | IrBinaryOp::UDiv | IrBinaryOp::LShr | IrBinaryOp::AShr
        )
    }
}

impl fmt::Display for IrBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            IrBinaryOp::Add => "add",
            IrBinaryOp::Sub => "sub",
            IrBinaryOp::Mul => "mul",
            IrBinaryOp::SDiv => "sdiv",
            IrBinaryOp::UDiv => "udiv",
            IrBinaryOp::SRem => "srem",
            IrBinaryOp::URem => "urem",
            IrBinaryOp::And => "and",
            IrBinaryOp::Or => "or",
            IrBinaryOp::Xor => "xor",
            IrBinaryOp::Shl => "shl",
            IrBinaryOp::LShr => "lshr",
            IrBinaryOp::AShr => "ashr",
        };
        write!(f, "{op_str}")
    }
}

/// Optional flags on a binary operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinaryFlags {
    pub nuw: bool,
    pub nsw: bool,
    pub exact: bool,
}

impl BinaryFlags {
    pub const NONE: BinaryFlags = BinaryFlags { nuw: false, nsw: false, exact: false };
    pub const NSW: BinaryFlags = BinaryFlags { nuw: false, nsw: true, exact: false };
    pub const NUW: BinaryFlags = BinaryFlags { nuw: true, nsw: false, exact: false };
    pub const EXACT: BinaryFlags = BinaryFlags { nuw: false, nsw: false, exact: true };
}

impl fmt::Display for BinaryFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // LLVM order: nuw before nsw
        if self.nuw {
            write!(f, " nuw")?;
        }
        if self.nsw {
            write!(f, " nsw")?;
        }
        if self.exact {
            write!(f, " exact")?;
        }
        Ok(())
    }
}

/// Integer comparison predicates for `icmp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntPredicate {
    Eq, Ne,
    Ugt, Uge, Ult, Ule, // Unsigned comparisons
    Sgt, Sge, Slt, Sle, // Signed comparisons
}

impl fmt::Display for IntPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pred = match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Ugt => "ugt",
            IntPredicate::Uge => "uge",
            IntPredicate::Ult => "ult",
            IntPredicate::Ule => "ule",
            IntPredicate::Sgt => "sgt",
            IntPredicate::Sge => "sge",
            IntPredicate::Slt => "slt",
            IntPredicate::Sle => "sle",
        };
        write!(f, "{pred}")
    }
}

/// Cast operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastOp {
    Trunc,    // Truncate
    ZExt,     // Zero extend
    SExt,     // Sign extend
    PtrToInt, // Pointer to integer cast
    IntToPtr, // Integer to pointer cast
    BitCast,
}

impl fmt::Display for CastOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            CastOp::Trunc => "trunc",
            CastOp::ZExt => "zext",
            CastOp::SExt => "sext",
            CastOp::PtrToInt => "ptrtoint",
            CastOp::IntToPtr => "inttoptr",
            CastOp::BitCast => "bitcast",
        };
        write!(f, "{op_str}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_display() {
        assert_eq!(BinaryFlags::NONE.to_string(), "");
        assert_eq!(BinaryFlags::NSW.to_string(), " nsw");
        let both = BinaryFlags { nuw: true, nsw: true, exact: false };
        assert_eq!(both.to_string(), " nuw nsw");
    }

    #[test]
    fn test_flag_legality() {
        assert!(IrBinaryOp::Add.allows_wrap_flags());
        assert!(!IrBinaryOp::UDiv.allows_wrap_flags());
        assert!(IrBinaryOp::LShr.allows_exact());
        assert!(!IrBinaryOp::Add.allows_exact());
    }
}
