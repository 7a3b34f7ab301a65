//! Textual IR emission
//!
//! Rendering is a pure function of the finished module. Local numbers are
//! assigned per function in emission order (unnamed parameters, then block
//! by block the unnamed label and every unnamed value-producing
//! instruction); metadata numbers are registration indices.

use log::debug;
use std::fmt::{Display, Write};
use crate::error::{IrError, IrResult};
use crate::ir::{
    Attachment, BlockId, Constant, Function, GlobalVariable, Instruction, InstructionData,
    IrType, Metadata, MetadataNode, Module, NameTableKind, Preemption, TailKind, Terminator,
    Value,
};

impl Module {
    /// Verify the module and print it as LLVM assembly
    pub fn render(&self) -> IrResult<String> {
        self.verify()?;
        let text = ModuleWriter { module: self }.write()?;
        debug!("rendered {}: {} bytes", self.tag, text.len());
        Ok(text)
    }
}

/// Local numbers of one function; `None` for named entities
struct FunctionSlots {
    params: Vec<Option<u32>>,
    blocks: Vec<Option<u32>>,
    insts: Vec<Option<u32>>,
}

impl FunctionSlots {
    fn new(function: &Function) -> Self {
        let mut next = 0u32;
        let mut take = |named: bool| {
            if named {
                None
            } else {
                next += 1;
                Some(next - 1)
            }
        };

        let params = function
            .params
            .iter()
            .map(|p| take(p.name.is_some()))
            .collect();
        let mut blocks = vec![None; function.blocks.len()];
        let mut insts = vec![None; function.instructions.len()];
        for (index, block) in function.blocks.iter().enumerate() {
            blocks[index] = take(block.name.is_some());
            for id in &block.instructions {
                let data = &function.instructions[id.index as usize];
                if data.has_result() {
                    insts[id.index as usize] = take(data.name.is_some());
                }
            }
        }
        Self { params, blocks, insts }
    }
}

/// The function whose body is being printed
#[derive(Clone, Copy)]
struct Local<'a> {
    function: &'a Function,
    slots: &'a FunctionSlots,
}

impl Local<'_> {
    fn reference(&self, name: Option<&str>, slot: Option<u32>) -> IrResult<String> {
        match (name, slot) {
            (Some(name), _) => Ok(format!("%{}", ident(name))),
            (None, Some(slot)) => Ok(format!("%{slot}")),
            (None, None) => Err(IrError::dangling(format!(
                "unnumbered value in '@{}'",
                self.function.name
            ))),
        }
    }

    fn block(&self, id: BlockId) -> IrResult<String> {
        let index = id.index as usize;
        let name = self.function.blocks.get(index).and_then(|b| b.name.as_deref());
        self.reference(name, self.slots.blocks.get(index).copied().flatten())
    }
}

struct ModuleWriter<'a> {
    module: &'a Module,
}

impl<'a> ModuleWriter<'a> {
    fn write(&self) -> IrResult<String> {
        let module = self.module;
        let mut sections = Vec::new();

        let mut header = String::new();
        if let Some(name) = &module.source_filename {
            writeln!(header, "source_filename = \"{}\"", escape(name.as_bytes()))?;
        }
        if let Some(layout) = &module.data_layout {
            writeln!(header, "target datalayout = \"{}\"", escape(layout.as_bytes()))?;
        }
        if let Some(triple) = &module.target_triple {
            writeln!(header, "target triple = \"{}\"", escape(triple.as_bytes()))?;
        }
        sections.push(header);

        let mut globals = String::new();
        for global in &module.globals {
            writeln!(globals, "{}", self.global(global)?)?;
        }
        sections.push(globals);

        let functions = module
            .functions
            .iter()
            .map(|f| self.function(f))
            .collect::<IrResult<Vec<_>>>()?;
        sections.push(functions.join("\n"));

        let mut attributes = String::new();
        for (index, attrs) in module.attribute_groups.iter().enumerate() {
            writeln!(attributes, "attributes #{index} = {{ {} }}", join(attrs, " "))?;
        }
        sections.push(attributes);

        let mut metadata = String::new();
        for (index, def) in module.metadata.iter().enumerate() {
            let node = def
                .node
                .as_ref()
                .ok_or_else(|| IrError::incomplete(index as u32, "reserved but never filled"))?;
            let distinct = if def.distinct { "distinct " } else { "" };
            writeln!(metadata, "!{index} = {distinct}{}", self.node(None, node)?)?;
        }
        for named in &module.named_metadata {
            let nodes: Vec<String> = named.nodes.iter().map(|id| format!("!{}", id.index)).collect();
            writeln!(metadata, "!{} = !{{{}}}", ident_body(&named.name), nodes.join(", "))?;
        }
        sections.push(metadata);

        sections.retain(|section| !section.is_empty());
        Ok(sections.join("\n"))
    }

    fn global(&self, global: &GlobalVariable) -> IrResult<String> {
        let mut line = format!("@{} = ", ident(&global.name));
        if let Some(linkage) = global.linkage.keyword() {
            write!(line, "{linkage} ")?;
        } else if global.initializer.is_none() {
            line.push_str("external ");
        }
        if global.preemption == Preemption::DsoLocal {
            line.push_str("dso_local ");
        }
        if let Some(unnamed) = global.unnamed_addr.keyword() {
            write!(line, "{unnamed} ")?;
        }
        let kind = if global.is_constant { "constant" } else { "global" };
        write!(line, "{kind} {}", global.value_type)?;
        if let Some(init) = &global.initializer {
            write!(line, " {}", self.constant(init)?)?;
        }
        if let Some(section) = &global.section {
            write!(line, ", section \"{}\"", escape(section.as_bytes()))?;
        }
        if let Some(align) = global.align {
            write!(line, ", align {align}")?;
        }
        for attachment in &global.metadata {
            write!(line, ", !{} {}", attachment.kind, self.metadata(None, &attachment.node)?)?;
        }
        Ok(line)
    }

    fn function(&self, function: &Function) -> IrResult<String> {
        let slots = FunctionSlots::new(function);
        let local = Local {
            function,
            slots: &slots,
        };
        let mut out = String::new();

        out.push_str(if function.is_declaration() { "declare " } else { "define " });
        if let Some(linkage) = function.linkage.keyword() {
            write!(out, "{linkage} ")?;
        }
        if function.preemption == Preemption::DsoLocal {
            out.push_str("dso_local ");
        }
        if let Some(visibility) = function.visibility.keyword() {
            write!(out, "{visibility} ")?;
        }
        if let Some(cc) = function.calling_conv {
            write!(out, "{cc} ")?;
        }
        write!(out, "{} @{}(", function.return_type, ident(&function.name))?;

        let mut params = Vec::new();
        for (index, param) in function.params.iter().enumerate() {
            if function.is_declaration() && param.name.is_none() {
                params.push(param.ty.to_string());
            } else {
                let reference = local.reference(param.name.as_deref(), slots.params[index])?;
                params.push(format!("{} {reference}", param.ty));
            }
        }
        if function.is_vararg {
            params.push("...".to_string());
        }
        write!(out, "{})", params.join(", "))?;

        if let Some(unnamed) = function.unnamed_addr.keyword() {
            write!(out, " {unnamed}")?;
        }
        if !function.attrs.is_empty() {
            write!(out, " {}", join(&function.attrs, " "))?;
        }
        if let Some(section) = &function.section {
            write!(out, " section \"{}\"", escape(section.as_bytes()))?;
        }
        for attachment in &function.metadata {
            write!(out, " !{} {}", attachment.kind, self.metadata(None, &attachment.node)?)?;
        }

        if function.is_declaration() {
            out.push('\n');
            return Ok(out);
        }

        out.push_str(" {\n");
        for (index, block) in function.blocks.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            match (&block.name, slots.blocks[index]) {
                (Some(name), _) => writeln!(out, "{}:", ident(name))?,
                (None, Some(slot)) if index > 0 => writeln!(out, "{slot}:")?,
                _ => {}
            }
            for id in &block.instructions {
                let data = &function.instructions[id.index as usize];
                writeln!(out, "  {}", self.instruction(local, data, slots.insts[id.index as usize])?)?;
            }
            if let Some(term) = &block.terminator {
                let mut line = self.terminator(local, &term.terminator)?;
                line.push_str(&self.attachments(Some(local), &term.metadata)?);
                writeln!(out, "  {line}")?;
            }
        }
        out.push_str("}\n");
        Ok(out)
    }

    fn instruction(&self, local: Local<'_>, data: &InstructionData, slot: Option<u32>) -> IrResult<String> {
        let mut line = String::new();
        if data.has_result() {
            write!(line, "{} = ", local.reference(data.name.as_deref(), slot)?)?;
        }
        let typed = |value: &Value| self.typed_value(Some(local), value);
        let plain = |value: &Value| self.value(Some(local), value);
        let align = |align: &Option<u32>| align.map(|a| format!(", align {a}")).unwrap_or_default();

        match &data.instruction {
            Instruction::Binary { op, lhs, rhs, flags } => {
                write!(line, "{op}{flags} {} {}, {}", data.ty, plain(lhs)?, plain(rhs)?)?;
            }
            Instruction::ICmp { predicate, lhs, rhs } => {
                write!(line, "icmp {predicate} {}, {}", typed(lhs)?, plain(rhs)?)?;
            }
            Instruction::Cast { op, value, target_type } => {
                write!(line, "{op} {} to {target_type}", typed(value)?)?;
            }
            Instruction::Alloca { alloc_type, count, align: alignment } => {
                write!(line, "alloca {alloc_type}")?;
                if let Some(count) = count {
                    write!(line, ", {}", typed(count)?)?;
                }
                line.push_str(&align(alignment));
            }
            Instruction::Load { ptr, align: alignment, volatile } => {
                let volatile = if *volatile { "volatile " } else { "" };
                write!(line, "load {volatile}{}, {}{}", data.ty, typed(ptr)?, align(alignment))?;
            }
            Instruction::Store { value, ptr, align: alignment, volatile } => {
                let volatile = if *volatile { "volatile " } else { "" };
                write!(line, "store {volatile}{}, {}{}", typed(value)?, typed(ptr)?, align(alignment))?;
            }
            Instruction::GetElementPtr { ptr, indices, inbounds } => {
                let ptr_type = self.module.operand_type(Some(local.function.id), ptr)?;
                let pointee = ptr_type
                    .pointee()
                    .ok_or_else(|| IrError::invalid_operand(format!("getelementptr on {ptr_type}")))?;
                let inbounds = if *inbounds { "inbounds " } else { "" };
                write!(line, "getelementptr {inbounds}{pointee}, {}", typed(ptr)?)?;
                for index in indices {
                    write!(line, ", {}", typed(index)?)?;
                }
            }
            Instruction::Call { callee, args, tail, calling_conv } => {
                match tail {
                    TailKind::None => {}
                    TailKind::Tail => line.push_str("tail "),
                    TailKind::MustTail => line.push_str("musttail "),
                    TailKind::NoTail => line.push_str("notail "),
                }
                line.push_str("call ");
                if let Some(cc) = calling_conv {
                    write!(line, "{cc} ")?;
                }
                let callee_type = self.module.operand_type(Some(local.function.id), callee)?;
                let signature = callee_type.pointee().filter(|t| t.signature().is_some());
                match signature {
                    Some(fn_type @ IrType::Function { is_vararg: true, .. }) => {
                        write!(line, "{fn_type} ")?
                    }
                    _ => write!(line, "{} ", data.ty)?,
                }
                let args = args.iter().map(typed).collect::<IrResult<Vec<_>>>()?;
                write!(line, "{}({})", plain(callee)?, args.join(", "))?;
            }
            Instruction::Phi { ty, incoming } => {
                let edges = incoming
                    .iter()
                    .map(|(value, block)| -> IrResult<String> {
                        Ok(format!("[ {}, {} ]", plain(value)?, local.block(*block)?))
                    })
                    .collect::<IrResult<Vec<_>>>()?;
                write!(line, "phi {ty} {}", edges.join(", "))?;
            }
            Instruction::Select { condition, true_value, false_value } => {
                write!(
                    line,
                    "select {}, {}, {}",
                    typed(condition)?,
                    typed(true_value)?,
                    typed(false_value)?
                )?;
            }
        }
        line.push_str(&self.attachments(Some(local), &data.metadata)?);
        Ok(line)
    }

    fn terminator(&self, local: Local<'_>, terminator: &Terminator) -> IrResult<String> {
        Ok(match terminator {
            Terminator::Ret(None) => "ret void".to_string(),
            Terminator::Ret(Some(value)) => format!("ret {}", self.typed_value(Some(local), value)?),
            Terminator::Br(target) => format!("br label {}", local.block(*target)?),
            Terminator::CondBr { condition, then_block, else_block } => format!(
                "br {}, label {}, label {}",
                self.typed_value(Some(local), condition)?,
                local.block(*then_block)?,
                local.block(*else_block)?
            ),
            Terminator::Unreachable => "unreachable".to_string(),
        })
    }

    fn attachments(&self, local: Option<Local<'_>>, attachments: &[Attachment]) -> IrResult<String> {
        let mut out = String::new();
        for attachment in attachments {
            write!(out, ", !{} {}", attachment.kind, self.metadata(local, &attachment.node)?)?;
        }
        Ok(out)
    }

    fn value(&self, local: Option<Local<'_>>, value: &Value) -> IrResult<String> {
        match value {
            Value::Param(_, index) => {
                let local = local.ok_or_else(|| IrError::dangling("parameter outside a function"))?;
                let index = *index as usize;
                let name = local.function.params.get(index).and_then(|p| p.name.as_deref());
                local.reference(name, local.slots.params.get(index).copied().flatten())
            }
            Value::Inst(id) => {
                let local = local.ok_or_else(|| IrError::dangling("instruction outside a function"))?;
                let index = id.index as usize;
                let name = local.function.instructions.get(index).and_then(|i| i.name.as_deref());
                local.reference(name, local.slots.insts.get(index).copied().flatten())
            }
            Value::Constant(constant) => self.constant(constant),
            Value::Global(id) => Ok(format!("@{}", ident(&self.module.global(*id)?.name))),
            Value::Function(id) => Ok(format!("@{}", ident(&self.module.function(*id)?.name))),
            Value::Metadata(md) => self.metadata(local, md),
        }
    }

    fn typed_value(&self, local: Option<Local<'_>>, value: &Value) -> IrResult<String> {
        let ty = self.module.operand_type(local.map(|l| l.function.id), value)?;
        Ok(format!("{ty} {}", self.value(local, value)?))
    }

    fn constant(&self, constant: &Constant) -> IrResult<String> {
        Ok(match constant {
            Constant::Int { ty: IrType::I1, value } => {
                (if *value != 0 { "true" } else { "false" }).to_string()
            }
            Constant::Int { value, .. } => value.to_string(),
            Constant::Null(_) => "null".to_string(),
            Constant::Undef(_) => "undef".to_string(),
            Constant::ZeroInitializer(_) => "zeroinitializer".to_string(),
            Constant::Bytes(bytes) => format!("c\"{}\"", escape(bytes)),
            Constant::Array { elements, .. } => {
                let elements = elements
                    .iter()
                    .map(|e| self.typed_constant(e))
                    .collect::<IrResult<Vec<_>>>()?;
                format!("[{}]", elements.join(", "))
            }
            Constant::Struct { fields, packed } => {
                let fields = fields
                    .iter()
                    .map(|f| self.typed_constant(f))
                    .collect::<IrResult<Vec<_>>>()?;
                let body = if fields.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", fields.join(", "))
                };
                if *packed { format!("<{body}>") } else { body }
            }
            Constant::Global(id) => format!("@{}", ident(&self.module.global(*id)?.name)),
            Constant::GetElementPtr { inbounds, base, indices } => {
                let global = self.module.global(*base)?;
                let mut parts = vec![
                    global.value_type.to_string(),
                    format!("{} @{}", global.value_type.clone().ptr(), ident(&global.name)),
                ];
                for index in indices {
                    parts.push(self.typed_constant(index)?);
                }
                let inbounds = if *inbounds { "inbounds " } else { "" };
                format!("getelementptr {inbounds}({})", parts.join(", "))
            }
            Constant::BitCast { value, to } => {
                format!("bitcast ({} to {to})", self.typed_constant(value)?)
            }
        })
    }

    fn typed_constant(&self, constant: &Constant) -> IrResult<String> {
        let ty = self.module.constant_type(constant)?;
        Ok(format!("{ty} {}", self.constant(constant)?))
    }

    fn metadata(&self, local: Option<Local<'_>>, md: &Metadata) -> IrResult<String> {
        match md {
            Metadata::Node(id) => Ok(format!("!{}", id.index)),
            Metadata::Inline(node) => self.node(local, node),
            Metadata::String(text) => Ok(format!("!\"{}\"", escape(text.as_bytes()))),
            Metadata::Value(value) => self.typed_value(local, value),
            Metadata::Null => Ok("null".to_string()),
        }
    }

    fn node(&self, local: Option<Local<'_>>, node: &MetadataNode) -> IrResult<String> {
        let mut f = Fields::default();
        let md = |value: &Option<Metadata>| -> IrResult<Option<String>> {
            value.as_ref().map(|m| self.metadata(local, m)).transpose()
        };

        let kind = match node {
            MetadataNode::Tuple(elements) => {
                let elements = elements
                    .iter()
                    .map(|e| self.metadata(local, e))
                    .collect::<IrResult<Vec<_>>>()?;
                return Ok(format!("!{{{}}}", elements.join(", ")));
            }
            MetadataNode::CompileUnit(cu) => {
                f.push("language", cu.language);
                f.opt("file", md(&cu.file)?);
                f.opt_str("producer", cu.producer.as_deref());
                f.push("isOptimized", cu.is_optimized);
                f.push("runtimeVersion", cu.runtime_version);
                f.push("emissionKind", cu.emission_kind);
                f.opt("enums", md(&cu.enums)?);
                f.opt("retainedTypes", md(&cu.retained_types)?);
                f.opt("globals", md(&cu.globals)?);
                f.opt("imports", md(&cu.imports)?);
                if cu.name_table_kind != NameTableKind::Default {
                    f.push("nameTableKind", cu.name_table_kind);
                }
                "DICompileUnit"
            }
            MetadataNode::File(file) => {
                f.string("filename", &file.filename);
                f.string("directory", &file.directory);
                "DIFile"
            }
            MetadataNode::Subprogram(sp) => {
                f.string("name", &sp.name);
                f.opt_str("linkageName", sp.linkage_name.as_deref());
                f.opt("scope", md(&sp.scope)?);
                f.opt("file", md(&sp.file)?);
                f.nonzero("line", sp.line.into());
                f.opt("type", md(&sp.ty)?);
                f.nonzero("scopeLine", sp.scope_line.into());
                if !sp.flags.is_empty() {
                    f.push("flags", sp.flags);
                }
                if !sp.sp_flags.is_empty() {
                    f.push("spFlags", sp.sp_flags);
                }
                f.opt("unit", md(&sp.unit)?);
                f.opt("retainedNodes", md(&sp.retained_nodes)?);
                "DISubprogram"
            }
            MetadataNode::SubroutineType(st) => {
                if !st.flags.is_empty() {
                    f.push("flags", st.flags);
                }
                f.opt("types", md(&st.types)?);
                "DISubroutineType"
            }
            MetadataNode::BasicType(bt) => {
                f.string("name", &bt.name);
                f.nonzero("size", bt.size);
                f.nonzero("align", bt.align.into());
                if let Some(encoding) = bt.encoding {
                    f.push("encoding", encoding);
                }
                "DIBasicType"
            }
            MetadataNode::DerivedType(dt) => {
                f.push("tag", dt.tag);
                f.opt_str("name", dt.name.as_deref());
                f.opt("scope", md(&dt.scope)?);
                f.opt("file", md(&dt.file)?);
                f.nonzero("line", dt.line.into());
                f.push("baseType", md(&dt.base_type)?.unwrap_or_else(|| "null".to_string()));
                f.nonzero("size", dt.size);
                f.nonzero("align", dt.align.into());
                f.nonzero("offset", dt.offset);
                if !dt.flags.is_empty() {
                    f.push("flags", dt.flags);
                }
                "DIDerivedType"
            }
            MetadataNode::CompositeType(ct) => {
                f.push("tag", ct.tag);
                f.opt_str("name", ct.name.as_deref());
                f.opt("scope", md(&ct.scope)?);
                f.opt("file", md(&ct.file)?);
                f.nonzero("line", ct.line.into());
                f.opt("baseType", md(&ct.base_type)?);
                f.nonzero("size", ct.size);
                f.nonzero("align", ct.align.into());
                if !ct.flags.is_empty() {
                    f.push("flags", ct.flags);
                }
                f.opt("elements", md(&ct.elements)?);
                f.opt_str("identifier", ct.identifier.as_deref());
                "DICompositeType"
            }
            MetadataNode::LocalVariable(var) => {
                f.string("name", &var.name);
                f.nonzero("arg", var.arg.into());
                f.opt("scope", md(&var.scope)?);
                f.opt("file", md(&var.file)?);
                f.nonzero("line", var.line.into());
                f.opt("type", md(&var.ty)?);
                if !var.flags.is_empty() {
                    f.push("flags", var.flags);
                }
                "DILocalVariable"
            }
            MetadataNode::LexicalBlock(block) => {
                f.opt("scope", md(&block.scope)?);
                f.opt("file", md(&block.file)?);
                f.nonzero("line", block.line.into());
                f.nonzero("column", block.column.into());
                "DILexicalBlock"
            }
            MetadataNode::Location(loc) => {
                f.push("line", loc.line);
                f.nonzero("column", loc.column.into());
                f.opt("scope", md(&loc.scope)?);
                f.opt("inlinedAt", md(&loc.inlined_at)?);
                "DILocation"
            }
            MetadataNode::Expression(expr) => {
                return Ok(format!("!DIExpression({})", join(&expr.ops, ", ")));
            }
        };
        Ok(format!("!{kind}({})", f.parts.join(", ")))
    }
}

/// `name: value` pairs of a specialized metadata node
#[derive(Default)]
struct Fields {
    parts: Vec<String>,
}

impl Fields {
    fn push(&mut self, name: &str, value: impl Display) {
        self.parts.push(format!("{name}: {value}"));
    }

    fn string(&mut self, name: &str, value: &str) {
        self.push(name, format!("\"{}\"", escape(value.as_bytes())));
    }

    fn opt(&mut self, name: &str, value: Option<String>) {
        if let Some(value) = value {
            self.push(name, value);
        }
    }

    fn opt_str(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.string(name, value);
        }
    }

    fn nonzero(&mut self, name: &str, value: u64) {
        if value != 0 {
            self.push(name, value);
        }
    }
}

fn join<T: Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Printable ASCII stays as is; quotes, backslashes and everything else
/// become `\XX`
fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        if byte == b'"' || byte == b'\\' || !(0x20..=0x7e).contains(&byte) {
            out.push_str(&format!("\\{byte:02X}"));
        } else {
            out.push(byte as char);
        }
    }
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '$' | '.' | '_')
}

/// Symbol name as printed after `@` or `%`, quoted when needed
fn ident(name: &str) -> String {
    let valid = match name.chars().next() {
        Some(first) => !first.is_ascii_digit() && name.chars().all(is_ident_char),
        None => false,
    };
    if valid {
        name.to_string()
    } else {
        format!("\"{}\"", escape(name.as_bytes()))
    }
}

/// Named metadata names are never quoted; unprintable characters are escaped
fn ident_body(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if is_ident_char(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("\\{byte:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_quoting() {
        assert_eq!(ident("main$string"), "main$string");
        assert_eq!(ident("runtime.runqueue"), "runtime.runqueue");
        assert_eq!(ident("has space"), "\"has space\"");
        assert_eq!(ident("0abc"), "\"0abc\"");
        assert_eq!(ident(""), "\"\"");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(b"Hello world\n"), "Hello world\\0A");
        assert_eq!(escape(b"a\"b\\c"), "a\\22b\\5Cc");
        assert_eq!(ident_body("llvm.dbg.cu"), "llvm.dbg.cu");
    }
}
