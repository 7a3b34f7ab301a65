//! IR Type System
//!
//! First-class integer types, typed pointers, aggregates and function
//! signatures, printed in LLVM assembly syntax.

use serde::{Deserialize, Serialize};
use std::fmt;

/// IR Type system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrType {
    /// Void type
    Void,

    /// Integer types with bit width
    I1,
    I8,
    I16,
    I32,
    I64,

    /// Typed pointer (`i32*`)
    Ptr(Box<IrType>),

    /// Array type [size x element_type]
    Array { size: u64, element_type: Box<IrType> },

    /// Literal struct type, `{ ... }` or `<{ ... }>` when packed
    Struct { fields: Vec<IrType>, packed: bool },

    /// Function type
    Function {
        return_type: Box<IrType>,
        param_types: Vec<IrType>,
        is_vararg: bool,
    },

    /// Label type (for basic block addresses)
    Label,

    /// Metadata operand type, used by debug intrinsics
    Metadata,
}

impl IrType {
    /// Pointer to this type
    pub fn ptr(self) -> IrType {
        IrType::Ptr(Box::new(self))
    }

    pub fn array(size: u64, element_type: IrType) -> IrType {
        IrType::Array {
            size,
            element_type: Box::new(element_type),
        }
    }

    pub fn structure(fields: Vec<IrType>) -> IrType {
        IrType::Struct {
            fields,
            packed: false,
        }
    }

    pub fn function(return_type: IrType, param_types: Vec<IrType>, is_vararg: bool) -> IrType {
        IrType::Function {
            return_type: Box::new(return_type),
            param_types,
            is_vararg,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(self, IrType::I1 | IrType::I8 | IrType::I16 | IrType::I32 | IrType::I64)
    }

    /// Check if this is a pointer type
    pub fn is_pointer(&self) -> bool {
        matches!(self, IrType::Ptr(_))
    }

    pub fn int_width(&self) -> Option<u32> {
        match self {
            IrType::I1 => Some(1),
            IrType::I8 => Some(8),
            IrType::I16 => Some(16),
            IrType::I32 => Some(32),
            IrType::I64 => Some(64),
            _ => None,
        }
    }

    /// Type a pointer points to
    pub fn pointee(&self) -> Option<&IrType> {
        match self {
            IrType::Ptr(target) => Some(&**target),
            _ => None,
        }
    }

    /// Return type, parameters and vararg flag of a function type
    pub fn signature(&self) -> Option<(&IrType, &[IrType], bool)> {
        match self {
            IrType::Function {
                return_type,
                param_types,
                is_vararg,
            } => Some((&**return_type, param_types.as_slice(), *is_vararg)),
            _ => None,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::I1 => write!(f, "i1"),
            IrType::I8 => write!(f, "i8"),
            IrType::I16 => write!(f, "i16"),
            IrType::I32 => write!(f, "i32"),
            IrType::I64 => write!(f, "i64"),
            IrType::Ptr(target) => write!(f, "{target}*"),
            IrType::Array { size, element_type } => write!(f, "[{size} x {element_type}]"),
            IrType::Struct { fields, packed } => {
                if fields.is_empty() {
                    return if *packed { write!(f, "<{{}}>") } else { write!(f, "{{}}") };
                }
                if *packed {
                    write!(f, "<")?;
                }
                write!(f, "{{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, " }}")?;
                if *packed {
                    write!(f, ">")?;
                }
                Ok(())
            }
            IrType::Function { return_type, param_types, is_vararg } => {
                write!(f, "{return_type} (")?;
                for (i, param) in param_types.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{param}")?;
                }
                if *is_vararg {
                    if param_types.is_empty() {
                        write!(f, "...")?;
                    } else {
                        write!(f, ", ...")?;
                    }
                }
                write!(f, ")")
            }
            IrType::Label => write!(f, "label"),
            IrType::Metadata => write!(f, "metadata"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        assert_eq!(IrType::I32.ptr().to_string(), "i32*");
        assert_eq!(IrType::array(13, IrType::I8).to_string(), "[13 x i8]");
        assert_eq!(
            IrType::structure(vec![IrType::I8.ptr(), IrType::I32]).to_string(),
            "{ i8*, i32 }"
        );
        assert_eq!(
            IrType::Struct { fields: vec![IrType::I8], packed: true }.to_string(),
            "<{ i8 }>"
        );
        assert_eq!(
            IrType::function(IrType::I32, vec![IrType::I8.ptr()], true).to_string(),
            "i32 (i8*, ...)"
        );
        assert_eq!(IrType::function(IrType::Void, vec![], true).to_string(), "void (...)");
    }

    #[test]
    fn test_type_queries() {
        assert_eq!(IrType::I16.int_width(), Some(16));
        assert!(IrType::I1.is_integer());
        assert!(!IrType::I32.ptr().is_integer());
        assert_eq!(IrType::I32.ptr().pointee(), Some(&IrType::I32));
    }
}
