//! Module and Global Variables
//!
//! The module owns every entity of the IR graph in arenas and hands out
//! tagged handles into them. All mutation goes through the module so operand
//! types, handle ownership and symbol uniqueness are checked at the moment an
//! entity is added.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use crate::error::{IrError, IrResult};
use crate::ir::{
    AttrGroupId, Attachment, BasicBlock, BlockId, CastOp, Constant, FuncAttr, Function,
    FunctionId, GlobalId, InstId, Instruction, InstructionData, IrType, Linkage, Metadata,
    MetadataDef, MetadataId, MetadataNode, ModuleTag, NamedMetadata, Param, Preemption,
    Terminator, TerminatorData, UnnamedAddr, Value,
};

/// Global variable definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub name: String,
    /// Type of the stored value; the global itself is a pointer to it
    pub value_type: IrType,
    pub is_constant: bool,
    /// `None` declares an external global
    pub initializer: Option<Constant>,
    pub linkage: Linkage,
    pub preemption: Preemption,
    pub unnamed_addr: UnnamedAddr,
    pub section: Option<String>,
    pub align: Option<u32>,
    pub metadata: Vec<Attachment>,
}

impl GlobalVariable {
    pub fn new(name: impl Into<String>, value_type: IrType) -> Self {
        Self {
            name: name.into(),
            value_type,
            is_constant: false,
            initializer: None,
            linkage: Linkage::External,
            preemption: Preemption::Default,
            unnamed_addr: UnnamedAddr::None,
            section: None,
            align: None,
            metadata: Vec::new(),
        }
    }
}

/// Entity a metadata attachment is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachTarget {
    Function(FunctionId),
    Global(GlobalId),
    Instruction(InstId),
    /// The terminator of the given block
    Terminator(BlockId),
}

impl From<FunctionId> for AttachTarget {
    fn from(id: FunctionId) -> Self {
        AttachTarget::Function(id)
    }
}

impl From<GlobalId> for AttachTarget {
    fn from(id: GlobalId) -> Self {
        AttachTarget::Global(id)
    }
}

impl From<InstId> for AttachTarget {
    fn from(id: InstId) -> Self {
        AttachTarget::Instruction(id)
    }
}

/// IR Module - a complete translation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub(crate) tag: ModuleTag,
    pub source_filename: Option<String>,
    pub data_layout: Option<String>,
    pub target_triple: Option<String>,
    pub(crate) globals: Vec<GlobalVariable>,
    pub(crate) functions: Vec<Function>,
    pub(crate) attribute_groups: Vec<Vec<FuncAttr>>,
    pub(crate) metadata: Vec<MetadataDef>,
    pub(crate) named_metadata: Vec<NamedMetadata>,
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl Module {
    pub fn new() -> Self {
        let tag = ModuleTag::fresh();
        debug!("created {tag}");
        Self {
            tag,
            source_filename: None,
            data_layout: None,
            target_triple: None,
            globals: Vec::new(),
            functions: Vec::new(),
            attribute_groups: Vec::new(),
            metadata: Vec::new(),
            named_metadata: Vec::new(),
        }
    }

    pub fn tag(&self) -> ModuleTag {
        self.tag
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn globals(&self) -> &[GlobalVariable] {
        &self.globals
    }

    pub fn attribute_groups(&self) -> &[Vec<FuncAttr>] {
        &self.attribute_groups
    }

    pub fn metadata_defs(&self) -> &[MetadataDef] {
        &self.metadata
    }

    pub fn named_metadata(&self) -> &[NamedMetadata] {
        &self.named_metadata
    }

    /// Register a function signature. Declaring the same name again with an
    /// identical signature returns the existing handle.
    pub fn declare_function(
        &mut self,
        name: &str,
        return_type: IrType,
        params: Vec<Param>,
    ) -> IrResult<FunctionId> {
        self.declare(name, return_type, params, false)
    }

    pub fn declare_vararg_function(
        &mut self,
        name: &str,
        return_type: IrType,
        params: Vec<Param>,
    ) -> IrResult<FunctionId> {
        self.declare(name, return_type, params, true)
    }

    fn declare(
        &mut self,
        name: &str,
        return_type: IrType,
        params: Vec<Param>,
        is_vararg: bool,
    ) -> IrResult<FunctionId> {
        if self.globals.iter().any(|g| g.name == name) {
            return Err(duplicate(name, "module"));
        }
        let signature = IrType::function(
            return_type.clone(),
            params.iter().map(|p| p.ty.clone()).collect(),
            is_vararg,
        );
        if let Some(existing) = self.functions.iter().find(|f| f.name == name) {
            if existing.function_type() == signature {
                return Ok(existing.id);
            }
            return Err(duplicate(name, "module"));
        }

        let mut seen: Vec<&str> = Vec::new();
        for param in &params {
            if param.ty.is_void() || matches!(param.ty, IrType::Label) {
                return Err(IrError::invalid_operand(format!(
                    "parameter of '@{name}' cannot have type {}",
                    param.ty
                )));
            }
            if let Some(param_name) = param.name.as_deref() {
                if seen.contains(&param_name) {
                    return Err(duplicate(param_name, &format!("function '@{name}'")));
                }
                seen.push(param_name);
            }
        }

        let id = FunctionId {
            module: self.tag,
            index: self.functions.len() as u32,
        };
        debug!("declare @{name}: {signature}");
        self.functions
            .push(Function::new(id, name.to_string(), return_type, params, is_vararg));
        Ok(id)
    }

    pub fn function(&self, id: FunctionId) -> IrResult<&Function> {
        self.check_function(id)?;
        Ok(&self.functions[id.index as usize])
    }

    pub fn function_mut(&mut self, id: FunctionId) -> IrResult<&mut Function> {
        self.check_function(id)?;
        Ok(&mut self.functions[id.index as usize])
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Value of the `index`-th parameter of `func`
    pub fn param(&self, func: FunctionId, index: u32) -> IrResult<Value> {
        let function = self.function(func)?;
        if index as usize >= function.params.len() {
            return Err(IrError::invalid_operand(format!(
                "'@{}' has no parameter {index}",
                function.name
            )));
        }
        Ok(Value::Param(func, index))
    }

    pub fn add_global(&mut self, global: GlobalVariable) -> IrResult<GlobalId> {
        if self.globals.iter().any(|g| g.name == global.name)
            || self.functions.iter().any(|f| f.name == global.name)
        {
            return Err(duplicate(&global.name, "module"));
        }
        if let Some(init) = &global.initializer {
            let init_type = self.constant_type(init)?;
            if init_type != global.value_type {
                return Err(IrError::invalid_operand(format!(
                    "initializer of '@{}' has type {init_type}, expected {}",
                    global.name, global.value_type
                )));
            }
        }
        for attachment in &global.metadata {
            self.check_metadata(None, &attachment.node)?;
        }

        let id = GlobalId {
            module: self.tag,
            index: self.globals.len() as u32,
        };
        debug!("global @{}: {}", global.name, global.value_type);
        self.globals.push(global);
        Ok(id)
    }

    pub fn global(&self, id: GlobalId) -> IrResult<&GlobalVariable> {
        self.check_global(id)?;
        Ok(&self.globals[id.index as usize])
    }

    /// Append a block to `func`; an empty label leaves it unnamed
    pub fn append_block(&mut self, func: FunctionId, label: &str) -> IrResult<BlockId> {
        self.check_function(func)?;
        let function = &mut self.functions[func.index as usize];
        let name = if label.is_empty() {
            None
        } else {
            if function.has_local_name(label) {
                return Err(duplicate(label, &format!("function '@{}'", function.name)));
            }
            Some(label.to_string())
        };
        let id = BlockId {
            func,
            index: function.blocks.len() as u32,
        };
        trace!("@{}: block {}", function.name, label);
        function.blocks.push(BasicBlock::new(name));
        Ok(id)
    }

    /// Append an instruction to the end of `block`, computing its result type
    pub fn append_instruction(
        &mut self,
        block: BlockId,
        instruction: Instruction,
    ) -> IrResult<InstId> {
        self.check_block(block)?;
        let func = block.func;
        {
            let function = &self.functions[func.index as usize];
            if function.blocks[block.index as usize].is_terminated() {
                return Err(IrError::BlockAlreadyTerminated {
                    function: function.name.clone(),
                    block: function.block_label(block),
                });
            }
        }
        let ty = self.result_type(func, &instruction)?;

        let function = &mut self.functions[func.index as usize];
        let id = InstId {
            func,
            index: function.instructions.len() as u32,
        };
        trace!("@{}: {:?} -> {ty}", function.name, instruction);
        function.instructions.push(InstructionData {
            instruction,
            ty,
            name: None,
            block,
            metadata: Vec::new(),
        });
        function.blocks[block.index as usize].instructions.push(id);
        Ok(id)
    }

    /// Give an instruction result a name, replacing its local number
    pub fn set_value_name(&mut self, inst: InstId, name: &str) -> IrResult<()> {
        self.check_inst(inst)?;
        let function = &mut self.functions[inst.func.index as usize];
        if !function.instructions[inst.index as usize].has_result() {
            return Err(IrError::invalid_operand(format!(
                "cannot name '{name}': instruction in '@{}' produces no value",
                function.name
            )));
        }
        if name.is_empty() {
            function.instructions[inst.index as usize].name = None;
            return Ok(());
        }
        if function.has_local_name(name) {
            return Err(duplicate(name, &format!("function '@{}'", function.name)));
        }
        function.instructions[inst.index as usize].name = Some(name.to_string());
        Ok(())
    }

    pub fn terminate_block(&mut self, block: BlockId, terminator: Terminator) -> IrResult<()> {
        self.check_block(block)?;
        let func = block.func;
        let function = &self.functions[func.index as usize];
        if function.blocks[block.index as usize].is_terminated() {
            return Err(IrError::BlockAlreadyTerminated {
                function: function.name.clone(),
                block: function.block_label(block),
            });
        }
        self.check_terminator(func, &terminator)?;

        let function = &mut self.functions[func.index as usize];
        trace!("@{}: terminate {} with {terminator:?}", function.name, function.block_label(block));
        function.blocks[block.index as usize].terminator = Some(TerminatorData {
            terminator,
            metadata: Vec::new(),
        });
        Ok(())
    }

    /// Add an incoming edge to a phi, e.g. a loop back-edge whose value is
    /// created after the phi itself
    pub fn add_phi_incoming(&mut self, phi: InstId, value: Value, block: BlockId) -> IrResult<()> {
        self.check_inst(phi)?;
        self.check_block(block)?;
        if block.func != phi.func {
            return Err(IrError::dangling("phi incoming block belongs to another function"));
        }
        let value_type = self.operand_type(Some(phi.func), &value)?;
        let data = &self.functions[phi.func.index as usize].instructions[phi.index as usize];
        if !data.instruction.is_phi() {
            return Err(IrError::invalid_operand("add_phi_incoming on a non-phi instruction"));
        }
        if value_type != data.ty {
            return Err(IrError::invalid_operand(format!(
                "phi of type {} cannot take a value of type {value_type}",
                data.ty
            )));
        }

        let data = &mut self.functions[phi.func.index as usize].instructions[phi.index as usize];
        if let Instruction::Phi { incoming, .. } = &mut data.instruction {
            incoming.push((value, block));
        }
        Ok(())
    }

    /// Attach `node` under `kind` (e.g. `"dbg"`), replacing an attachment of
    /// the same kind
    pub fn attach_metadata(
        &mut self,
        target: impl Into<AttachTarget>,
        kind: &str,
        node: impl Into<Metadata>,
    ) -> IrResult<()> {
        let node = node.into();
        let target = target.into();
        let attachments = match target {
            AttachTarget::Function(id) => {
                self.check_function(id)?;
                self.check_metadata(None, &node)?;
                &mut self.functions[id.index as usize].metadata
            }
            AttachTarget::Global(id) => {
                self.check_global(id)?;
                self.check_metadata(None, &node)?;
                &mut self.globals[id.index as usize].metadata
            }
            AttachTarget::Instruction(id) => {
                self.check_inst(id)?;
                self.check_metadata(Some(id.func), &node)?;
                &mut self.functions[id.func.index as usize].instructions[id.index as usize]
                    .metadata
            }
            AttachTarget::Terminator(block) => {
                self.check_block(block)?;
                self.check_metadata(Some(block.func), &node)?;
                let function = &mut self.functions[block.func.index as usize];
                let label = function.block_label(block);
                match function.blocks[block.index as usize].terminator.as_mut() {
                    Some(term) => &mut term.metadata,
                    None => {
                        return Err(IrError::invalid_operand(format!(
                            "block {label} has no terminator to attach !{kind} to"
                        )))
                    }
                }
            }
        };
        let existing = attachments.iter().position(|a| a.kind == kind);
        match existing {
            Some(index) => attachments[index].node = node,
            None => attachments.push(Attachment {
                kind: kind.to_string(),
                node,
            }),
        }
        Ok(())
    }

    pub fn add_attribute_group(&mut self, attrs: Vec<FuncAttr>) -> IrResult<AttrGroupId> {
        if attrs.iter().any(|a| matches!(a, FuncAttr::Group(_))) {
            return Err(IrError::invalid_operand(
                "attribute groups cannot reference other groups",
            ));
        }
        let id = AttrGroupId {
            module: self.tag,
            index: self.attribute_groups.len() as u32,
        };
        self.attribute_groups.push(attrs);
        Ok(id)
    }

    /// Register a node; its `!N` number is fixed now, whatever is filled later
    pub fn define_metadata_node(&mut self, node: impl Into<MetadataNode>) -> IrResult<MetadataId> {
        self.push_metadata(false, Some(node.into()))
    }

    pub fn define_distinct_metadata_node(
        &mut self,
        node: impl Into<MetadataNode>,
    ) -> IrResult<MetadataId> {
        self.push_metadata(true, Some(node.into()))
    }

    /// Reserve a numbered slot to be filled later with [`Module::fill_metadata_node`]
    pub fn reserve_metadata_node(&mut self, distinct: bool) -> MetadataId {
        let id = self.next_metadata_id();
        trace!("reserve !{}", id.index);
        self.metadata.push(MetadataDef {
            distinct,
            node: None,
        });
        id
    }

    pub fn fill_metadata_node(
        &mut self,
        id: MetadataId,
        node: impl Into<MetadataNode>,
    ) -> IrResult<()> {
        self.check_metadata_id(id)?;
        let node = node.into();
        self.check_node_operands(&node)?;
        let def = &mut self.metadata[id.index as usize];
        if def.node.is_some() {
            return Err(IrError::invalid_operand(format!(
                "metadata node !{} is already filled",
                id.index
            )));
        }
        def.node = Some(node);
        Ok(())
    }

    /// Mutable access to a registered node, for populating fields that refer
    /// to nodes registered after it
    pub fn metadata_node_mut(&mut self, id: MetadataId) -> IrResult<&mut MetadataNode> {
        self.check_metadata_id(id)?;
        self.metadata[id.index as usize]
            .node
            .as_mut()
            .ok_or_else(|| IrError::incomplete(id.index, "node has not been filled"))
    }

    pub fn metadata_def(&self, id: MetadataId) -> IrResult<&MetadataDef> {
        self.check_metadata_id(id)?;
        Ok(&self.metadata[id.index as usize])
    }

    /// Reuse a structurally equal non-distinct node, or register a new one
    pub fn unique_metadata_node(&mut self, node: impl Into<MetadataNode>) -> IrResult<MetadataId> {
        let node = node.into();
        let existing = self
            .metadata
            .iter()
            .position(|def| !def.distinct && def.node.as_ref() == Some(&node));
        match existing {
            Some(index) => Ok(MetadataId {
                module: self.tag,
                index: index as u32,
            }),
            None => self.push_metadata(false, Some(node)),
        }
    }

    pub fn add_named_metadata(&mut self, name: &str, nodes: Vec<MetadataId>) -> IrResult<()> {
        if self.named_metadata.iter().any(|n| n.name == name) {
            return Err(duplicate(name, "named metadata"));
        }
        for id in &nodes {
            self.check_metadata_id(*id)?;
        }
        self.named_metadata.push(NamedMetadata {
            name: name.to_string(),
            nodes,
        });
        Ok(())
    }

    fn next_metadata_id(&self) -> MetadataId {
        MetadataId {
            module: self.tag,
            index: self.metadata.len() as u32,
        }
    }

    fn push_metadata(&mut self, distinct: bool, node: Option<MetadataNode>) -> IrResult<MetadataId> {
        if let Some(node) = &node {
            self.check_node_operands(node)?;
        }
        let id = self.next_metadata_id();
        trace!(
            "define !{} = {}{}",
            id.index,
            if distinct { "distinct " } else { "" },
            node.as_ref().map_or("<reserved>", |n| n.kind_name())
        );
        self.metadata.push(MetadataDef { distinct, node });
        Ok(id)
    }

    /// Type of `value` when used inside `func`
    pub fn value_type(&self, func: FunctionId, value: &Value) -> IrResult<IrType> {
        self.check_function(func)?;
        self.operand_type(Some(func), value)
    }

    /// Type of an operand. Parameters and instruction results are only valid
    /// inside their own function, so `func` is `None` at module level.
    pub(crate) fn operand_type(&self, func: Option<FunctionId>, value: &Value) -> IrResult<IrType> {
        match value {
            Value::Param(owner, index) => {
                let function = self.function(*owner)?;
                if func != Some(*owner) {
                    return Err(IrError::dangling(format!(
                        "parameter {index} of '@{}' used outside its function",
                        function.name
                    )));
                }
                function
                    .params
                    .get(*index as usize)
                    .map(|p| p.ty.clone())
                    .ok_or_else(|| {
                        IrError::dangling(format!("'@{}' has no parameter {index}", function.name))
                    })
            }
            Value::Inst(id) => {
                self.check_inst(*id)?;
                let function = &self.functions[id.func.index as usize];
                if func != Some(id.func) {
                    return Err(IrError::dangling(format!(
                        "instruction of '@{}' used outside its function",
                        function.name
                    )));
                }
                let ty = function.instructions[id.index as usize].ty.clone();
                if ty.is_void() {
                    return Err(IrError::invalid_operand(format!(
                        "void instruction in '@{}' used as an operand",
                        function.name
                    )));
                }
                Ok(ty)
            }
            Value::Constant(constant) => self.constant_type(constant),
            Value::Global(id) => Ok(self.global(*id)?.value_type.clone().ptr()),
            Value::Function(id) => Ok(self.function(*id)?.function_type().ptr()),
            Value::Metadata(md) => {
                self.check_metadata(func, md)?;
                Ok(IrType::Metadata)
            }
        }
    }

    pub fn constant_type(&self, constant: &Constant) -> IrResult<IrType> {
        match constant {
            Constant::Int { ty, .. } => {
                if !ty.is_integer() {
                    return Err(IrError::invalid_operand(format!(
                        "integer constant of non-integer type {ty}"
                    )));
                }
                Ok(ty.clone())
            }
            Constant::Null(ty) => {
                if !ty.is_pointer() {
                    return Err(IrError::invalid_operand(format!("null of non-pointer type {ty}")));
                }
                Ok(ty.clone())
            }
            Constant::Undef(ty) | Constant::ZeroInitializer(ty) => Ok(ty.clone()),
            Constant::Bytes(bytes) => Ok(IrType::array(bytes.len() as u64, IrType::I8)),
            Constant::Array { element_type, elements } => {
                for element in elements {
                    let ty = self.constant_type(element)?;
                    if &ty != element_type {
                        return Err(IrError::invalid_operand(format!(
                            "array element of type {ty} in [{} x {element_type}]",
                            elements.len()
                        )));
                    }
                }
                Ok(IrType::array(elements.len() as u64, element_type.clone()))
            }
            Constant::Struct { fields, packed } => {
                let fields = fields
                    .iter()
                    .map(|field| self.constant_type(field))
                    .collect::<IrResult<Vec<_>>>()?;
                Ok(IrType::Struct {
                    fields,
                    packed: *packed,
                })
            }
            Constant::Global(id) => Ok(self.global(*id)?.value_type.clone().ptr()),
            Constant::GetElementPtr { base, indices, .. } => {
                let pointee = self.global(*base)?.value_type.clone();
                let indices = indices
                    .iter()
                    .map(|index| -> IrResult<(IrType, Option<i64>)> {
                        Ok((self.constant_type(index)?, index.as_int()))
                    })
                    .collect::<IrResult<Vec<_>>>()?;
                Ok(gep_indexed_type(&pointee, &indices)?.ptr())
            }
            Constant::BitCast { value, to } => {
                let from = self.constant_type(value)?;
                check_cast(CastOp::BitCast, &from, to)?;
                Ok(to.clone())
            }
        }
    }

    pub(crate) fn result_type(&self, func: FunctionId, instruction: &Instruction) -> IrResult<IrType> {
        let ty = |value: &Value| self.operand_type(Some(func), value);
        match instruction {
            Instruction::Binary { op, lhs, rhs, flags } => {
                let lhs_type = ty(lhs)?;
                let rhs_type = ty(rhs)?;
                if !lhs_type.is_integer() || lhs_type != rhs_type {
                    return Err(IrError::invalid_operand(format!(
                        "{op} on {lhs_type} and {rhs_type}"
                    )));
                }
                if (flags.nuw || flags.nsw) && !op.allows_wrap_flags() {
                    return Err(IrError::invalid_operand(format!("{op} does not take nuw/nsw")));
                }
                if flags.exact && !op.allows_exact() {
                    return Err(IrError::invalid_operand(format!("{op} does not take exact")));
                }
                Ok(lhs_type)
            }
            Instruction::ICmp { predicate, lhs, rhs } => {
                let lhs_type = ty(lhs)?;
                let rhs_type = ty(rhs)?;
                if !(lhs_type.is_integer() || lhs_type.is_pointer()) || lhs_type != rhs_type {
                    return Err(IrError::invalid_operand(format!(
                        "icmp {predicate} on {lhs_type} and {rhs_type}"
                    )));
                }
                Ok(IrType::I1)
            }
            Instruction::Cast { op, value, target_type } => {
                check_cast(*op, &ty(value)?, target_type)?;
                Ok(target_type.clone())
            }
            Instruction::Alloca { alloc_type, count, .. } => {
                if !is_sized(alloc_type) {
                    return Err(IrError::invalid_operand(format!("alloca of {alloc_type}")));
                }
                if let Some(count) = count {
                    let count_type = ty(count)?;
                    if !count_type.is_integer() {
                        return Err(IrError::invalid_operand(format!(
                            "alloca count of type {count_type}"
                        )));
                    }
                }
                Ok(alloc_type.clone().ptr())
            }
            Instruction::Load { ptr, .. } => {
                let ptr_type = ty(ptr)?;
                match ptr_type.pointee() {
                    Some(pointee) if is_sized(pointee) => Ok(pointee.clone()),
                    _ => Err(IrError::invalid_operand(format!("load from {ptr_type}"))),
                }
            }
            Instruction::Store { value, ptr, .. } => {
                let value_type = ty(value)?;
                let ptr_type = ty(ptr)?;
                if ptr_type.pointee() != Some(&value_type) {
                    return Err(IrError::invalid_operand(format!(
                        "store of {value_type} through {ptr_type}"
                    )));
                }
                Ok(IrType::Void)
            }
            Instruction::GetElementPtr { ptr, indices, .. } => {
                let ptr_type = ty(ptr)?;
                let pointee = ptr_type.pointee().ok_or_else(|| {
                    IrError::invalid_operand(format!("getelementptr on {ptr_type}"))
                })?;
                let indices = indices
                    .iter()
                    .map(|index| -> IrResult<(IrType, Option<i64>)> {
                        let constant = match index {
                            Value::Constant(c) => c.as_int(),
                            _ => None,
                        };
                        Ok((ty(index)?, constant))
                    })
                    .collect::<IrResult<Vec<_>>>()?;
                Ok(gep_indexed_type(pointee, &indices)?.ptr())
            }
            Instruction::Call { callee, args, .. } => {
                let callee_type = ty(callee)?;
                let Some((return_type, params, is_vararg)) =
                    callee_type.pointee().and_then(|t| t.signature())
                else {
                    return Err(IrError::invalid_operand(format!("call through {callee_type}")));
                };
                if args.len() < params.len() || (!is_vararg && args.len() > params.len()) {
                    return Err(IrError::invalid_operand(format!(
                        "call expects {} arguments, got {}",
                        params.len(),
                        args.len()
                    )));
                }
                for (i, arg) in args.iter().enumerate() {
                    let arg_type = ty(arg)?;
                    if let Some(param_type) = params.get(i) {
                        if &arg_type != param_type {
                            return Err(IrError::invalid_operand(format!(
                                "argument {i} has type {arg_type}, expected {param_type}"
                            )));
                        }
                    }
                }
                Ok(return_type.clone())
            }
            Instruction::Phi { ty: phi_type, incoming } => {
                if !is_sized(phi_type) {
                    return Err(IrError::invalid_operand(format!("phi of type {phi_type}")));
                }
                for (value, block) in incoming {
                    self.check_block(*block)?;
                    if block.func != func {
                        return Err(IrError::dangling(
                            "phi incoming block belongs to another function",
                        ));
                    }
                    let value_type = ty(value)?;
                    if &value_type != phi_type {
                        return Err(IrError::invalid_operand(format!(
                            "phi of type {phi_type} cannot take a value of type {value_type}"
                        )));
                    }
                }
                Ok(phi_type.clone())
            }
            Instruction::Select { condition, true_value, false_value } => {
                let cond_type = ty(condition)?;
                if cond_type != IrType::I1 {
                    return Err(IrError::invalid_operand(format!(
                        "select condition of type {cond_type}"
                    )));
                }
                let true_type = ty(true_value)?;
                let false_type = ty(false_value)?;
                if true_type != false_type {
                    return Err(IrError::invalid_operand(format!(
                        "select arms of type {true_type} and {false_type}"
                    )));
                }
                Ok(true_type)
            }
        }
    }

    pub(crate) fn check_terminator(&self, func: FunctionId, terminator: &Terminator) -> IrResult<()> {
        let function = &self.functions[func.index as usize];
        match terminator {
            Terminator::Ret(value) => {
                let value_type = match value {
                    Some(value) => self.operand_type(Some(func), value)?,
                    None => IrType::Void,
                };
                if value_type != function.return_type {
                    return Err(IrError::invalid_operand(format!(
                        "'@{}' returns {}, not {value_type}",
                        function.name, function.return_type
                    )));
                }
            }
            Terminator::CondBr { condition, .. } => {
                let cond_type = self.operand_type(Some(func), condition)?;
                if cond_type != IrType::I1 {
                    return Err(IrError::invalid_operand(format!(
                        "branch condition of type {cond_type}"
                    )));
                }
            }
            Terminator::Br(_) | Terminator::Unreachable => {}
        }
        for target in terminator.successors() {
            self.check_block(target)?;
            if target.func != func {
                return Err(IrError::dangling("branch target belongs to another function"));
            }
        }
        Ok(())
    }

    pub(crate) fn check_function(&self, id: FunctionId) -> IrResult<()> {
        if id.module != self.tag || id.index as usize >= self.functions.len() {
            return Err(IrError::dangling(format!(
                "function #{} of {} is not in {}",
                id.index, id.module, self.tag
            )));
        }
        Ok(())
    }

    pub(crate) fn check_block(&self, id: BlockId) -> IrResult<()> {
        self.check_function(id.func)?;
        if id.index as usize >= self.functions[id.func.index as usize].blocks.len() {
            return Err(IrError::dangling(format!("block #{} does not exist", id.index)));
        }
        Ok(())
    }

    pub(crate) fn check_inst(&self, id: InstId) -> IrResult<()> {
        self.check_function(id.func)?;
        if id.index as usize >= self.functions[id.func.index as usize].instructions.len() {
            return Err(IrError::dangling(format!("instruction #{} does not exist", id.index)));
        }
        Ok(())
    }

    pub(crate) fn check_global(&self, id: GlobalId) -> IrResult<()> {
        if id.module != self.tag || id.index as usize >= self.globals.len() {
            return Err(IrError::dangling(format!(
                "global #{} of {} is not in {}",
                id.index, id.module, self.tag
            )));
        }
        Ok(())
    }

    pub(crate) fn check_attr_group(&self, id: AttrGroupId) -> IrResult<()> {
        if id.module != self.tag || id.index as usize >= self.attribute_groups.len() {
            return Err(IrError::dangling(format!(
                "attribute group #{} of {} is not in {}",
                id.index, id.module, self.tag
            )));
        }
        Ok(())
    }

    pub(crate) fn check_metadata_id(&self, id: MetadataId) -> IrResult<()> {
        if id.module != self.tag || id.index as usize >= self.metadata.len() {
            return Err(IrError::dangling(format!(
                "metadata !{} of {} is not in {}",
                id.index, id.module, self.tag
            )));
        }
        Ok(())
    }

    /// Check every handle reachable from a metadata operand
    pub(crate) fn check_metadata(&self, func: Option<FunctionId>, md: &Metadata) -> IrResult<()> {
        match md {
            Metadata::Node(id) => self.check_metadata_id(*id),
            Metadata::Inline(node) => node
                .operands()
                .into_iter()
                .try_for_each(|operand| self.check_metadata(func, operand)),
            Metadata::Value(value) => self.operand_type(func, value).map(|_| ()),
            Metadata::String(_) | Metadata::Null => Ok(()),
        }
    }

    pub(crate) fn check_node_operands(&self, node: &MetadataNode) -> IrResult<()> {
        node.operands()
            .into_iter()
            .try_for_each(|operand| self.check_metadata(None, operand))
    }
}

fn duplicate(name: &str, scope: &str) -> IrError {
    IrError::DuplicateSymbol {
        name: name.to_string(),
        scope: scope.to_string(),
    }
}

/// Types that can be stored in memory or held in a register
fn is_sized(ty: &IrType) -> bool {
    !matches!(
        ty,
        IrType::Void | IrType::Label | IrType::Metadata | IrType::Function { .. }
    )
}

fn check_cast(op: CastOp, from: &IrType, to: &IrType) -> IrResult<()> {
    let ok = match op {
        CastOp::Trunc => matches!(
            (from.int_width(), to.int_width()),
            (Some(a), Some(b)) if a > b
        ),
        CastOp::ZExt | CastOp::SExt => matches!(
            (from.int_width(), to.int_width()),
            (Some(a), Some(b)) if a < b
        ),
        CastOp::PtrToInt => from.is_pointer() && to.is_integer(),
        CastOp::IntToPtr => from.is_integer() && to.is_pointer(),
        CastOp::BitCast => {
            (from.is_pointer() && to.is_pointer())
                || (from.is_integer() && from.int_width() == to.int_width())
        }
    };
    if ok {
        Ok(())
    } else {
        Err(IrError::invalid_operand(format!("{op} {from} to {to}")))
    }
}

/// Walk `getelementptr` indices starting from the pointee of the base. The
/// first index steps over the pointer; the rest index into aggregates, and
/// struct fields must be selected by constant.
fn gep_indexed_type(pointee: &IrType, indices: &[(IrType, Option<i64>)]) -> IrResult<IrType> {
    let Some(((first_type, _), rest)) = indices.split_first() else {
        return Err(IrError::invalid_operand("getelementptr without indices"));
    };
    if !first_type.is_integer() {
        return Err(IrError::invalid_operand(format!("getelementptr index of type {first_type}")));
    }
    let mut current = pointee.clone();
    for (index_type, constant) in rest {
        if !index_type.is_integer() {
            return Err(IrError::invalid_operand(format!(
                "getelementptr index of type {index_type}"
            )));
        }
        current = match &current {
            IrType::Array { element_type, .. } => (**element_type).clone(),
            IrType::Struct { fields, .. } => {
                let field = (*constant)
                    .and_then(|c| usize::try_from(c).ok())
                    .and_then(|c| fields.get(c))
                    .ok_or_else(|| {
                        IrError::invalid_operand(format!(
                            "struct {current} must be indexed by an in-range constant"
                        ))
                    })?;
                field.clone()
            }
            other => {
                return Err(IrError::invalid_operand(format!("cannot index into {other}")));
            }
        };
    }
    Ok(current)
}
