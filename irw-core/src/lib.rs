//! IR Writer - core library
//!
//! Builds LLVM-style IR modules in memory and renders them as textual
//! assembly:
//! - IR: types, values, instructions, blocks, functions and debug metadata
//! - Builder: `IrBuilder` for appending instructions with a current debug location
//! - Verifier and writer: structural checks, then numbering and emission
//!
//! A module is built once, rendered, and dropped. Every handle it gives out
//! is tied to it; see [`ir::Module`].

pub mod error;
pub mod ir;

pub use error::{IrError, IrResult};
pub use ir::{DebugSymbols, IrBuilder, IrType, Module, Value};
