//! LLVM-style Intermediate Representation
//!
//! An in-memory IR graph that is built once and rendered to textual
//! assembly.
//!
//! ## Architecture
//!
//! The module is structured as follows:
//! - `handles` - Tagged handles into a module's arenas
//! - `types` - Type system (IrType)
//! - `values` - Operands and constants
//! - `ops` - Binary operations, predicates and casts
//! - `instructions` - Instructions and terminators
//! - `metadata` - Debug metadata nodes and DWARF enums
//! - `blocks` - Basic block management
//! - `function` - Function definitions and attributes
//! - `module` - Module, global variables and all mutation
//! - `symbols` - Named debug descriptors for use during a build
//! - `builder` - IR construction utilities
//! - `verify` - Whole-module structural checks
//! - `writer` - Numbering and textual emission

// Public exports - clean API surface
pub use self::handles::{AttrGroupId, BlockId, FunctionId, GlobalId, InstId, MetadataId, ModuleTag};
pub use self::types::IrType;
pub use self::values::{Constant, Value};
pub use self::ops::{BinaryFlags, CastOp, IntPredicate, IrBinaryOp};
pub use self::instructions::{
    CallingConv, Instruction, InstructionData, TailKind, Terminator, TerminatorData,
};
pub use self::metadata::{
    Attachment, DIBasicType, DICompileUnit, DICompositeType, DIDerivedType, DIExpression, DIFile,
    DIFlags, DILexicalBlock, DILocalVariable, DILocation, DISPFlags, DISubprogram,
    DISubroutineType, DwarfEncoding, DwarfLang, DwarfOp, DwarfTag, EmissionKind, Metadata,
    MetadataDef, MetadataNode, NameTableKind, NamedMetadata,
};
pub use self::blocks::BasicBlock;
pub use self::function::{FuncAttr, Function, Linkage, Param, Preemption, UnnamedAddr, Visibility};
pub use self::module::{AttachTarget, GlobalVariable, Module};
pub use self::symbols::{DebugEntry, DebugSymbols};
pub use self::builder::IrBuilder;

// Internal modules
mod handles;
mod types;
mod values;
mod ops;
mod instructions;
mod metadata;
mod blocks;
mod function;
mod module;
mod symbols;
mod builder;
mod verify;
mod writer;
