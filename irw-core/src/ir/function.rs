//! Function Definitions
//!
//! Defines IR functions with their parameters, attributes, linkage and the
//! arenas holding their blocks and instructions.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{
    AttrGroupId, Attachment, BasicBlock, BlockId, CallingConv, FunctionId, InstId,
    InstructionData, IrType,
};

/// Linkage types for global symbols
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Linkage {
    #[default]
    External,    // Visible to other modules; not printed
    Internal,    // Only visible within this module (static)
    Private,     // Not even in the symbol table
    LinkOnceOdr,
    Weak,
    Common,
}

impl Linkage {
    /// Keyword printed before the type, `None` for the default
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Linkage::External => None,
            Linkage::Internal => Some("internal"),
            Linkage::Private => Some("private"),
            Linkage::LinkOnceOdr => Some("linkonce_odr"),
            Linkage::Weak => Some("weak"),
            Linkage::Common => Some("common"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preemption {
    #[default]
    Default,
    DsoLocal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Default,
    Hidden,
    Protected,
}

impl Visibility {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Visibility::Default => None,
            Visibility::Hidden => Some("hidden"),
            Visibility::Protected => Some("protected"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnnamedAddr {
    #[default]
    None,
    Local,
    Global,
}

impl UnnamedAddr {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            UnnamedAddr::None => None,
            UnnamedAddr::Local => Some("local_unnamed_addr"),
            UnnamedAddr::Global => Some("unnamed_addr"),
        }
    }
}

/// Function attribute, either inline or a reference to a group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuncAttr {
    NoInline,
    NoUnwind,
    OptNone,
    ReadNone,
    ReadOnly,
    Speculatable,
    UwTable,
    NoReturn,
    AlwaysInline,
    Cold,
    WillReturn,
    /// `"key"` or `"key"="value"`
    String { key: String, value: Option<String> },
    /// `#N`; only valid on functions, never inside a group
    Group(AttrGroupId),
}

impl FuncAttr {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        FuncAttr::String {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

impl fmt::Display for FuncAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuncAttr::NoInline => write!(f, "noinline"),
            FuncAttr::NoUnwind => write!(f, "nounwind"),
            FuncAttr::OptNone => write!(f, "optnone"),
            FuncAttr::ReadNone => write!(f, "readnone"),
            FuncAttr::ReadOnly => write!(f, "readonly"),
            FuncAttr::Speculatable => write!(f, "speculatable"),
            FuncAttr::UwTable => write!(f, "uwtable"),
            FuncAttr::NoReturn => write!(f, "noreturn"),
            FuncAttr::AlwaysInline => write!(f, "alwaysinline"),
            FuncAttr::Cold => write!(f, "cold"),
            FuncAttr::WillReturn => write!(f, "willreturn"),
            FuncAttr::String { key, value: None } => write!(f, "\"{key}\""),
            FuncAttr::String { key, value: Some(value) } => write!(f, "\"{key}\"=\"{value}\""),
            FuncAttr::Group(group) => write!(f, "#{}", group.index()),
        }
    }
}

/// Formal parameter; unnamed parameters get a local number when rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Option<String>,
    pub ty: IrType,
}

impl Param {
    pub fn new(ty: IrType) -> Self {
        Self { name: None, ty }
    }

    pub fn named(name: impl Into<String>, ty: IrType) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }
}

/// Function in IR
///
/// Blocks are kept in emission order. Instructions live in a per-function
/// arena indexed by [`InstId`]; each block lists the ids it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub(crate) id: FunctionId,
    pub name: String,
    pub return_type: IrType,
    pub params: Vec<Param>,
    pub is_vararg: bool,
    pub linkage: Linkage,
    pub preemption: Preemption,
    pub visibility: Visibility,
    pub calling_conv: Option<CallingConv>,
    pub unnamed_addr: UnnamedAddr,
    pub attrs: Vec<FuncAttr>,
    pub section: Option<String>,
    pub metadata: Vec<Attachment>,
    pub(crate) blocks: Vec<BasicBlock>,
    pub(crate) instructions: Vec<InstructionData>,
}

impl Function {
    pub(crate) fn new(id: FunctionId, name: String, return_type: IrType, params: Vec<Param>, is_vararg: bool) -> Self {
        Self {
            id,
            name,
            return_type,
            params,
            is_vararg,
            linkage: Linkage::External,
            preemption: Preemption::Default,
            visibility: Visibility::Default,
            calling_conv: None,
            unnamed_addr: UnnamedAddr::None,
            attrs: Vec::new(),
            section: None,
            metadata: Vec::new(),
            blocks: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    /// A function without blocks is printed as a `declare`
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The function's type, e.g. `i32 (i32, i32)`
    pub fn function_type(&self) -> IrType {
        IrType::function(
            self.return_type.clone(),
            self.params.iter().map(|p| p.ty.clone()).collect(),
            self.is_vararg,
        )
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        if id.func != self.id {
            return None;
        }
        self.blocks.get(id.index as usize)
    }

    pub fn instruction(&self, id: InstId) -> Option<&InstructionData> {
        if id.func != self.id {
            return None;
        }
        self.instructions.get(id.index as usize)
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        (0..self.blocks.len() as u32).map(move |index| BlockId { func: self.id, index })
    }

    /// Whether `name` is already used by a parameter, block or instruction
    pub(crate) fn has_local_name(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name.as_deref() == Some(name))
            || self.blocks.iter().any(|b| b.name.as_deref() == Some(name))
            || self.instructions.iter().any(|i| i.name.as_deref() == Some(name))
    }

    /// Predecessors of `target`, one entry per incoming edge
    pub fn predecessors(&self, target: BlockId) -> Vec<BlockId> {
        let mut preds = Vec::new();
        for block_id in self.block_ids() {
            let Some(term) = self.blocks[block_id.index as usize].terminator.as_ref() else {
                continue;
            };
            for succ in term.terminator.successors() {
                if succ == target {
                    preds.push(block_id);
                }
            }
        }
        preds
    }

    /// Label used in error messages, `%name` or `#index`
    pub(crate) fn block_label(&self, id: BlockId) -> String {
        match self.blocks.get(id.index as usize).and_then(|b| b.name.as_deref()) {
            Some(name) => format!("%{name}"),
            None => format!("#{}", id.index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_display() {
        assert_eq!(FuncAttr::NoUnwind.to_string(), "nounwind");
        assert_eq!(
            FuncAttr::string("wasm-import-name", "fd_write").to_string(),
            "\"wasm-import-name\"=\"fd_write\""
        );
        let flag = FuncAttr::String { key: "no-frame-pointer-elim".to_string(), value: None };
        assert_eq!(flag.to_string(), "\"no-frame-pointer-elim\"");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(Linkage::External.keyword(), None);
        assert_eq!(Linkage::Internal.keyword(), Some("internal"));
        assert_eq!(UnnamedAddr::Global.keyword(), Some("unnamed_addr"));
        assert_eq!(Visibility::Hidden.keyword(), Some("hidden"));
    }
}
