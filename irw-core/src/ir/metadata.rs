//! Debug metadata
//!
//! DWARF-style descriptors (`DICompileUnit`, `DISubprogram`, `DILocation`, ...)
//! and generic tuples. Registered nodes live in the module's metadata list and
//! are referenced by [`MetadataId`]; their `!N` number is their registration
//! index. Nodes that are only ever used in one place, such as an empty
//! `!DIExpression()`, can be embedded inline instead.
//!
//! Reference fields are `Option<Metadata>`. For fields the printer treats as
//! required, `None` means "not populated yet" and rendering fails with
//! `IncompleteNode`; use [`Metadata::Null`] for an explicit `null`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{MetadataId, Value};

/// A metadata operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Metadata {
    /// Reference to a registered node, `!N`
    Node(MetadataId),
    /// Node printed in place, e.g. `!DIExpression()`
    Inline(Box<MetadataNode>),
    /// Metadata string, `!"..."`
    String(String),
    /// Typed value, `i32 4` or `i32* %3`
    Value(Value),
    Null,
}

impl Metadata {
    pub fn string(text: impl Into<String>) -> Self {
        Metadata::String(text.into())
    }

    pub fn inline(node: impl Into<MetadataNode>) -> Self {
        Metadata::Inline(Box::new(node.into()))
    }
}

impl From<MetadataId> for Metadata {
    fn from(id: MetadataId) -> Self {
        Metadata::Node(id)
    }
}

impl From<Value> for Metadata {
    fn from(value: Value) -> Self {
        Metadata::Value(value)
    }
}

/// Metadata attached to a function, global, instruction or terminator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: String,
    pub node: Metadata,
}

/// Source languages for `DICompileUnit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DwarfLang {
    C89,
    C99,
    C11,
    CPlusPlus,
    CPlusPlus11,
    CPlusPlus14,
    Go,
    Rust,
}

impl fmt::Display for DwarfLang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DwarfLang::C89 => "DW_LANG_C89",
            DwarfLang::C99 => "DW_LANG_C99",
            DwarfLang::C11 => "DW_LANG_C11",
            DwarfLang::CPlusPlus => "DW_LANG_C_plus_plus",
            DwarfLang::CPlusPlus11 => "DW_LANG_C_plus_plus_11",
            DwarfLang::CPlusPlus14 => "DW_LANG_C_plus_plus_14",
            DwarfLang::Go => "DW_LANG_Go",
            DwarfLang::Rust => "DW_LANG_Rust",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmissionKind {
    NoDebug,
    #[default]
    FullDebug,
    LineTablesOnly,
    DebugDirectivesOnly,
}

impl fmt::Display for EmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EmissionKind::NoDebug => "NoDebug",
            EmissionKind::FullDebug => "FullDebug",
            EmissionKind::LineTablesOnly => "LineTablesOnly",
            EmissionKind::DebugDirectivesOnly => "DebugDirectivesOnly",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameTableKind {
    #[default]
    Default,
    Gnu,
    None,
}

impl fmt::Display for NameTableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NameTableKind::Default => "Default",
            NameTableKind::Gnu => "GNU",
            NameTableKind::None => "None",
        };
        write!(f, "{name}")
    }
}

/// DWARF tags used by derived and composite types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DwarfTag {
    PointerType,
    ReferenceType,
    Typedef,
    Member,
    ConstType,
    VolatileType,
    StructureType,
    UnionType,
    ArrayType,
    EnumerationType,
}

impl fmt::Display for DwarfTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DwarfTag::PointerType => "DW_TAG_pointer_type",
            DwarfTag::ReferenceType => "DW_TAG_reference_type",
            DwarfTag::Typedef => "DW_TAG_typedef",
            DwarfTag::Member => "DW_TAG_member",
            DwarfTag::ConstType => "DW_TAG_const_type",
            DwarfTag::VolatileType => "DW_TAG_volatile_type",
            DwarfTag::StructureType => "DW_TAG_structure_type",
            DwarfTag::UnionType => "DW_TAG_union_type",
            DwarfTag::ArrayType => "DW_TAG_array_type",
            DwarfTag::EnumerationType => "DW_TAG_enumeration_type",
        };
        write!(f, "{name}")
    }
}

/// Base type encodings for `DIBasicType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DwarfEncoding {
    Address,
    Boolean,
    Float,
    Signed,
    SignedChar,
    Unsigned,
    UnsignedChar,
    Utf,
}

impl fmt::Display for DwarfEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DwarfEncoding::Address => "DW_ATE_address",
            DwarfEncoding::Boolean => "DW_ATE_boolean",
            DwarfEncoding::Float => "DW_ATE_float",
            DwarfEncoding::Signed => "DW_ATE_signed",
            DwarfEncoding::SignedChar => "DW_ATE_signed_char",
            DwarfEncoding::Unsigned => "DW_ATE_unsigned",
            DwarfEncoding::UnsignedChar => "DW_ATE_unsigned_char",
            DwarfEncoding::Utf => "DW_ATE_UTF",
        };
        write!(f, "{name}")
    }
}

bitflags! {
    /// `DIFlag*` values
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DIFlags: u32 {
        const PRIVATE = 1;
        const PROTECTED = 2;
        const PUBLIC = 3;
        const FWD_DECL = 1 << 2;
        const APPLE_BLOCK = 1 << 3;
        const VIRTUAL = 1 << 5;
        const ARTIFICIAL = 1 << 6;
        const EXPLICIT = 1 << 7;
        const PROTOTYPED = 1 << 8;
        const OBJECT_POINTER = 1 << 10;
        const VECTOR = 1 << 11;
        const STATIC_MEMBER = 1 << 12;
        const NO_RETURN = 1 << 20;
    }
}

const DI_FLAG_NAMES: &[(DIFlags, &str)] = &[
    (DIFlags::PUBLIC, "DIFlagPublic"),
    (DIFlags::PROTECTED, "DIFlagProtected"),
    (DIFlags::PRIVATE, "DIFlagPrivate"),
    (DIFlags::FWD_DECL, "DIFlagFwdDecl"),
    (DIFlags::APPLE_BLOCK, "DIFlagAppleBlock"),
    (DIFlags::VIRTUAL, "DIFlagVirtual"),
    (DIFlags::ARTIFICIAL, "DIFlagArtificial"),
    (DIFlags::EXPLICIT, "DIFlagExplicit"),
    (DIFlags::PROTOTYPED, "DIFlagPrototyped"),
    (DIFlags::OBJECT_POINTER, "DIFlagObjectPointer"),
    (DIFlags::VECTOR, "DIFlagVector"),
    (DIFlags::STATIC_MEMBER, "DIFlagStaticMember"),
    (DIFlags::NO_RETURN, "DIFlagNoReturn"),
];

impl fmt::Display for DIFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_flag_names(f, self.bits(), DI_FLAG_NAMES.iter().map(|(flag, name)| (flag.bits(), *name)), "DIFlagZero")
    }
}

bitflags! {
    /// `DISPFlag*` values for subprograms
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DISPFlags: u32 {
        const VIRTUAL = 1;
        const PURE_VIRTUAL = 2;
        const LOCAL_TO_UNIT = 1 << 2;
        const DEFINITION = 1 << 3;
        const OPTIMIZED = 1 << 4;
        const PURE = 1 << 5;
        const ELEMENTAL = 1 << 6;
        const RECURSIVE = 1 << 7;
    }
}

const DISP_FLAG_NAMES: &[(DISPFlags, &str)] = &[
    (DISPFlags::PURE_VIRTUAL, "DISPFlagPureVirtual"),
    (DISPFlags::VIRTUAL, "DISPFlagVirtual"),
    (DISPFlags::LOCAL_TO_UNIT, "DISPFlagLocalToUnit"),
    (DISPFlags::DEFINITION, "DISPFlagDefinition"),
    (DISPFlags::OPTIMIZED, "DISPFlagOptimized"),
    (DISPFlags::PURE, "DISPFlagPure"),
    (DISPFlags::ELEMENTAL, "DISPFlagElemental"),
    (DISPFlags::RECURSIVE, "DISPFlagRecursive"),
];

impl fmt::Display for DISPFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_flag_names(f, self.bits(), DISP_FLAG_NAMES.iter().map(|(flag, name)| (flag.bits(), *name)), "DISPFlagZero")
    }
}

/// Prints `A | B | C`. Multi-bit names (e.g. `DIFlagPublic`) are listed
/// before their component bits so they win when all of their bits are set.
fn write_flag_names(
    f: &mut fmt::Formatter<'_>,
    bits: u32,
    names: impl Iterator<Item = (u32, &'static str)>,
    zero: &str,
) -> fmt::Result {
    if bits == 0 {
        return write!(f, "{zero}");
    }
    let mut remaining = bits;
    let mut first = true;
    for (flag, name) in names {
        if flag != 0 && remaining & flag == flag {
            if !first {
                write!(f, " | ")?;
            }
            write!(f, "{name}")?;
            first = false;
            remaining &= !flag;
        }
    }
    if remaining != 0 {
        if !first {
            write!(f, " | ")?;
        }
        write!(f, "{remaining}")?;
    }
    Ok(())
}

/// `DW_OP_*` elements of a `DIExpression`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DwarfOp {
    Deref,
    Plus,
    Minus,
    PlusUconst(u64),
    Constu(u64),
    StackValue,
    /// `DW_OP_LLVM_fragment, offset, size`
    Fragment { offset: u64, size: u64 },
}

impl fmt::Display for DwarfOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DwarfOp::Deref => write!(f, "DW_OP_deref"),
            DwarfOp::Plus => write!(f, "DW_OP_plus"),
            DwarfOp::Minus => write!(f, "DW_OP_minus"),
            DwarfOp::PlusUconst(n) => write!(f, "DW_OP_plus_uconst, {n}"),
            DwarfOp::Constu(n) => write!(f, "DW_OP_constu, {n}"),
            DwarfOp::StackValue => write!(f, "DW_OP_stack_value"),
            DwarfOp::Fragment { offset, size } => write!(f, "DW_OP_LLVM_fragment, {offset}, {size}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DICompileUnit {
    pub language: DwarfLang,
    pub file: Option<Metadata>,
    pub producer: Option<String>,
    pub is_optimized: bool,
    pub runtime_version: u32,
    pub emission_kind: EmissionKind,
    pub enums: Option<Metadata>,
    pub retained_types: Option<Metadata>,
    pub globals: Option<Metadata>,
    pub imports: Option<Metadata>,
    pub name_table_kind: NameTableKind,
}

impl DICompileUnit {
    pub fn new(language: DwarfLang) -> Self {
        Self {
            language,
            file: None,
            producer: None,
            is_optimized: false,
            runtime_version: 0,
            emission_kind: EmissionKind::FullDebug,
            enums: None,
            retained_types: None,
            globals: None,
            imports: None,
            name_table_kind: NameTableKind::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DIFile {
    pub filename: String,
    pub directory: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DISubprogram {
    pub name: String,
    pub linkage_name: Option<String>,
    pub scope: Option<Metadata>,
    pub file: Option<Metadata>,
    pub line: u32,
    pub ty: Option<Metadata>,
    pub scope_line: u32,
    pub flags: DIFlags,
    pub sp_flags: DISPFlags,
    pub unit: Option<Metadata>,
    pub retained_nodes: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DISubroutineType {
    pub flags: DIFlags,
    /// Tuple of return type followed by parameter types
    pub types: Option<Metadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DIBasicType {
    pub name: String,
    pub size: u64,
    pub align: u32,
    pub encoding: Option<DwarfEncoding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DIDerivedType {
    pub tag: DwarfTag,
    pub name: Option<String>,
    pub scope: Option<Metadata>,
    pub file: Option<Metadata>,
    pub line: u32,
    /// `None` prints `baseType: null` (e.g. `void*`)
    pub base_type: Option<Metadata>,
    pub size: u64,
    pub align: u32,
    pub offset: u64,
    pub flags: DIFlags,
}

impl DIDerivedType {
    pub fn new(tag: DwarfTag) -> Self {
        Self {
            tag,
            name: None,
            scope: None,
            file: None,
            line: 0,
            base_type: None,
            size: 0,
            align: 0,
            offset: 0,
            flags: DIFlags::empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DICompositeType {
    pub tag: DwarfTag,
    pub name: Option<String>,
    pub scope: Option<Metadata>,
    pub file: Option<Metadata>,
    pub line: u32,
    pub base_type: Option<Metadata>,
    pub size: u64,
    pub align: u32,
    pub flags: DIFlags,
    pub elements: Option<Metadata>,
    pub identifier: Option<String>,
}

impl DICompositeType {
    pub fn new(tag: DwarfTag) -> Self {
        Self {
            tag,
            name: None,
            scope: None,
            file: None,
            line: 0,
            base_type: None,
            size: 0,
            align: 0,
            flags: DIFlags::empty(),
            elements: None,
            identifier: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DILocalVariable {
    pub name: String,
    /// 1-based argument number; 0 for plain locals
    pub arg: u32,
    pub scope: Option<Metadata>,
    pub file: Option<Metadata>,
    pub line: u32,
    pub ty: Option<Metadata>,
    pub flags: DIFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DILexicalBlock {
    pub scope: Option<Metadata>,
    pub file: Option<Metadata>,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DILocation {
    pub line: u32,
    pub column: u32,
    pub scope: Option<Metadata>,
    pub inlined_at: Option<Metadata>,
}

impl DILocation {
    pub fn new(line: u32, column: u32, scope: impl Into<Metadata>) -> Self {
        Self {
            line,
            column,
            scope: Some(scope.into()),
            inlined_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DIExpression {
    pub ops: Vec<DwarfOp>,
}

/// A metadata node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataNode {
    /// Generic tuple, `!{...}`
    Tuple(Vec<Metadata>),
    CompileUnit(DICompileUnit),
    File(DIFile),
    Subprogram(DISubprogram),
    SubroutineType(DISubroutineType),
    BasicType(DIBasicType),
    DerivedType(DIDerivedType),
    CompositeType(DICompositeType),
    LocalVariable(DILocalVariable),
    LexicalBlock(DILexicalBlock),
    Location(DILocation),
    Expression(DIExpression),
}

impl MetadataNode {
    /// Empty tuple, `!{}`
    pub fn empty_tuple() -> Self {
        MetadataNode::Tuple(Vec::new())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            MetadataNode::Tuple(_) => "tuple",
            MetadataNode::CompileUnit(_) => "DICompileUnit",
            MetadataNode::File(_) => "DIFile",
            MetadataNode::Subprogram(_) => "DISubprogram",
            MetadataNode::SubroutineType(_) => "DISubroutineType",
            MetadataNode::BasicType(_) => "DIBasicType",
            MetadataNode::DerivedType(_) => "DIDerivedType",
            MetadataNode::CompositeType(_) => "DICompositeType",
            MetadataNode::LocalVariable(_) => "DILocalVariable",
            MetadataNode::LexicalBlock(_) => "DILexicalBlock",
            MetadataNode::Location(_) => "DILocation",
            MetadataNode::Expression(_) => "DIExpression",
        }
    }

    /// Every metadata operand of this node
    pub fn operands(&self) -> Vec<&Metadata> {
        fn some<'a>(fields: &[&'a Option<Metadata>]) -> Vec<&'a Metadata> {
            fields.iter().filter_map(|field| field.as_ref()).collect()
        }

        match self {
            MetadataNode::Tuple(elements) => elements.iter().collect(),
            MetadataNode::CompileUnit(cu) => some(&[
                &cu.file,
                &cu.enums,
                &cu.retained_types,
                &cu.globals,
                &cu.imports,
            ]),
            MetadataNode::File(_) | MetadataNode::BasicType(_) | MetadataNode::Expression(_) => {
                Vec::new()
            }
            MetadataNode::Subprogram(sp) => {
                some(&[&sp.scope, &sp.file, &sp.ty, &sp.unit, &sp.retained_nodes])
            }
            MetadataNode::SubroutineType(st) => some(&[&st.types]),
            MetadataNode::DerivedType(dt) => some(&[&dt.scope, &dt.file, &dt.base_type]),
            MetadataNode::CompositeType(ct) => {
                some(&[&ct.scope, &ct.file, &ct.base_type, &ct.elements])
            }
            MetadataNode::LocalVariable(var) => some(&[&var.scope, &var.file, &var.ty]),
            MetadataNode::LexicalBlock(block) => some(&[&block.scope, &block.file]),
            MetadataNode::Location(loc) => some(&[&loc.scope, &loc.inlined_at]),
        }
    }

    /// Name of the first required field that has not been populated
    pub fn missing_field(&self) -> Option<&'static str> {
        match self {
            MetadataNode::CompileUnit(cu) if cu.file.is_none() => Some("file"),
            MetadataNode::Subprogram(sp) if sp.sp_flags.contains(DISPFlags::DEFINITION) => {
                if sp.unit.is_none() {
                    Some("unit")
                } else if sp.ty.is_none() {
                    Some("type")
                } else {
                    None
                }
            }
            MetadataNode::SubroutineType(st) if st.types.is_none() => Some("types"),
            MetadataNode::LocalVariable(var) if var.scope.is_none() => Some("scope"),
            MetadataNode::LexicalBlock(block) if block.scope.is_none() => Some("scope"),
            MetadataNode::Location(loc) if loc.scope.is_none() => Some("scope"),
            _ => None,
        }
    }
}

impl From<Vec<Metadata>> for MetadataNode {
    fn from(elements: Vec<Metadata>) -> Self {
        MetadataNode::Tuple(elements)
    }
}

impl From<DICompileUnit> for MetadataNode {
    fn from(node: DICompileUnit) -> Self {
        MetadataNode::CompileUnit(node)
    }
}

impl From<DIFile> for MetadataNode {
    fn from(node: DIFile) -> Self {
        MetadataNode::File(node)
    }
}

impl From<DISubprogram> for MetadataNode {
    fn from(node: DISubprogram) -> Self {
        MetadataNode::Subprogram(node)
    }
}

impl From<DISubroutineType> for MetadataNode {
    fn from(node: DISubroutineType) -> Self {
        MetadataNode::SubroutineType(node)
    }
}

impl From<DIBasicType> for MetadataNode {
    fn from(node: DIBasicType) -> Self {
        MetadataNode::BasicType(node)
    }
}

impl From<DIDerivedType> for MetadataNode {
    fn from(node: DIDerivedType) -> Self {
        MetadataNode::DerivedType(node)
    }
}

impl From<DICompositeType> for MetadataNode {
    fn from(node: DICompositeType) -> Self {
        MetadataNode::CompositeType(node)
    }
}

impl From<DILocalVariable> for MetadataNode {
    fn from(node: DILocalVariable) -> Self {
        MetadataNode::LocalVariable(node)
    }
}

impl From<DILexicalBlock> for MetadataNode {
    fn from(node: DILexicalBlock) -> Self {
        MetadataNode::LexicalBlock(node)
    }
}

impl From<DILocation> for MetadataNode {
    fn from(node: DILocation) -> Self {
        MetadataNode::Location(node)
    }
}

impl From<DIExpression> for MetadataNode {
    fn from(node: DIExpression) -> Self {
        MetadataNode::Expression(node)
    }
}

/// A registered metadata slot; `node` is `None` while only reserved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDef {
    pub distinct: bool,
    pub node: Option<MetadataNode>,
}

/// `!name = !{!a, !b, ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedMetadata {
    pub name: String,
    pub nodes: Vec<MetadataId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_names() {
        assert_eq!(DIFlags::PROTOTYPED.to_string(), "DIFlagPrototyped");
        assert_eq!(
            (DIFlags::PROTOTYPED | DIFlags::ARTIFICIAL).to_string(),
            "DIFlagArtificial | DIFlagPrototyped"
        );
        assert_eq!(DIFlags::PUBLIC.to_string(), "DIFlagPublic");
        assert_eq!(DIFlags::empty().to_string(), "DIFlagZero");
        assert_eq!(
            (DISPFlags::DEFINITION | DISPFlags::OPTIMIZED).to_string(),
            "DISPFlagDefinition | DISPFlagOptimized"
        );
    }

    #[test]
    fn test_missing_fields() {
        let loc = MetadataNode::Location(DILocation::default());
        assert_eq!(loc.missing_field(), Some("scope"));

        let sp = MetadataNode::Subprogram(DISubprogram {
            name: "f".to_string(),
            sp_flags: DISPFlags::DEFINITION,
            unit: Some(Metadata::Null),
            ..Default::default()
        });
        assert_eq!(sp.missing_field(), Some("type"));

        let decl = MetadataNode::Subprogram(DISubprogram {
            name: "g".to_string(),
            ..Default::default()
        });
        assert_eq!(decl.missing_field(), None);
    }

    #[test]
    fn test_expression_ops() {
        assert_eq!(DwarfOp::PlusUconst(8).to_string(), "DW_OP_plus_uconst, 8");
        assert_eq!(
            DwarfOp::Fragment { offset: 0, size: 32 }.to_string(),
            "DW_OP_LLVM_fragment, 0, 32"
        );
    }
}
