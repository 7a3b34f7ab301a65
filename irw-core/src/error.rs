//! Error handling for the IR writer
//!
//! Every failure the builder can report is structural: it means the calling
//! code assembled an invalid module. None of them is retried or recovered;
//! they propagate with `?` up to the program that is building the module.

use thiserror::Error;

/// Result alias used throughout the crate
pub type IrResult<T> = Result<T, IrError>;

/// Structural errors raised while building, verifying or rendering a module
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("duplicate symbol '{name}' in {scope}")]
    DuplicateSymbol { name: String, scope: String },

    #[error("block {block} in function '@{function}' already has a terminator")]
    BlockAlreadyTerminated { function: String, block: String },

    #[error("block {block} in function '@{function}' has no terminator")]
    UnterminatedBlock { function: String, block: String },

    #[error("metadata node #{index} is incomplete: {reason}")]
    IncompleteNode { index: u32, reason: String },

    #[error("dangling handle: {message}")]
    DanglingHandle { message: String },

    #[error("phi in block {block} of '@{function}' does not match its predecessors: {message}")]
    PhiMismatch {
        function: String,
        block: String,
        message: String,
    },

    #[error("invalid operand: {message}")]
    InvalidOperand { message: String },

    #[error("no insertion block is set on the builder")]
    NoInsertionPoint,

    #[error("unknown debug symbol '{name}'")]
    UnknownSymbol { name: String },

    #[error("debug symbol '{name}' is a {found}, expected a {expected}")]
    SymbolKindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("failed to format IR text")]
    Format,
}

impl IrError {
    pub fn dangling(message: impl Into<String>) -> Self {
        IrError::DanglingHandle {
            message: message.into(),
        }
    }

    pub fn invalid_operand(message: impl Into<String>) -> Self {
        IrError::InvalidOperand {
            message: message.into(),
        }
    }

    pub fn incomplete(index: u32, reason: impl Into<String>) -> Self {
        IrError::IncompleteNode {
            index,
            reason: reason.into(),
        }
    }
}

impl From<std::fmt::Error> for IrError {
    fn from(_: std::fmt::Error) -> Self {
        IrError::Format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = IrError::DuplicateSymbol {
            name: "foo".to_string(),
            scope: "module".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate symbol 'foo' in module");

        let err = IrError::incomplete(3, "field 'scope' of DILocation is unset");
        assert_eq!(
            err.to_string(),
            "metadata node #3 is incomplete: field 'scope' of DILocation is unset"
        );
    }

    #[test]
    fn test_fmt_error_conversion() {
        let err: IrError = std::fmt::Error.into();
        assert_eq!(err, IrError::Format);
    }
}
