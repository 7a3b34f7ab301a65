//! C translation unit with DWARF debug info
//!
//! ```c
//! int foo(int a, int b) {
//!     int sum = a + b;
//!     return sum;
//! }
//!
//! int main() {
//!     return foo(12, 30);
//! }
//! ```
//!
//! Debug nodes are registered in the order clang numbers them, then looked
//! up by name through [`DebugSymbols`] while the function bodies are built.

use irw_core::ir::{
    AttrGroupId, BinaryFlags, DIBasicType, DICompileUnit, DIExpression, DIFile, DIFlags,
    DILocalVariable, DILocation, DISPFlags, DISubprogram, DISubroutineType, DwarfEncoding,
    DwarfLang, FuncAttr, FunctionId, IrBinaryOp, Metadata, MetadataId, MetadataNode,
    NameTableKind, Param, Preemption,
};
use irw_core::{DebugSymbols, IrBuilder, IrError, IrResult, IrType, Module, Value};

const PRODUCER: &str = "clang version 8.0.1";
const SOURCE_FILE: &str = "target.c";
const SOURCE_DIR: &str = "/home/user/src";

pub fn build() -> IrResult<Module> {
    let mut module = Module::new();
    module.source_filename = Some(SOURCE_FILE.to_string());
    module.data_layout = Some("e-m:e-i64:64-f80:128-n8:16:32:64-S128".to_string());
    module.target_triple = Some("x86_64-pc-linux-gnu".to_string());

    let symbols = add_debug_info(&mut module)?;

    let function_attrs = module.add_attribute_group(vec![
        FuncAttr::NoInline,
        FuncAttr::NoUnwind,
        FuncAttr::OptNone,
        FuncAttr::UwTable,
    ])?;
    let intrinsic_attrs = module.add_attribute_group(vec![
        FuncAttr::NoUnwind,
        FuncAttr::ReadNone,
        FuncAttr::Speculatable,
    ])?;

    let dbg_declare = module.declare_function(
        "llvm.dbg.declare",
        IrType::Void,
        vec![Param::new(IrType::Metadata); 3],
    )?;
    module
        .function_mut(dbg_declare)?
        .attrs
        .push(FuncAttr::Group(intrinsic_attrs));

    let foo = define_foo(&mut module, &symbols, dbg_declare, function_attrs)?;
    define_main(&mut module, &symbols, foo, function_attrs)?;
    Ok(module)
}

fn add_debug_info(module: &mut Module) -> IrResult<DebugSymbols> {
    let mut symbols = DebugSymbols::new();

    let mut cu = DICompileUnit::new(DwarfLang::C99);
    cu.producer = Some(PRODUCER.to_string());
    cu.name_table_kind = NameTableKind::None;
    let cu = module.define_distinct_metadata_node(cu)?;
    let file = module.define_metadata_node(DIFile {
        filename: SOURCE_FILE.to_string(),
        directory: SOURCE_DIR.to_string(),
    })?;
    let empty = module.define_metadata_node(MetadataNode::empty_tuple())?;
    let MetadataNode::CompileUnit(unit) = module.metadata_node_mut(cu)? else {
        return Err(IrError::invalid_operand(format!(
            "!{} is not a compile unit",
            cu.index()
        )));
    };
    unit.file = Some(file.into());
    unit.enums = Some(empty.into());

    let dwarf_version = module_flag(module, 2, "Dwarf Version", 4)?;
    let debug_info_version = module_flag(module, 2, "Debug Info Version", 3)?;
    let wchar_size = module_flag(module, 1, "wchar_size", 4)?;
    let ident = module.define_metadata_node(vec![Metadata::string(PRODUCER)])?;

    let foo = module.define_distinct_metadata_node(DISubprogram {
        name: "foo".to_string(),
        scope: Some(file.into()),
        file: Some(file.into()),
        line: 1,
        scope_line: 1,
        flags: DIFlags::PROTOTYPED,
        sp_flags: DISPFlags::DEFINITION,
        unit: Some(cu.into()),
        retained_nodes: Some(empty.into()),
        ..Default::default()
    })?;
    let foo_type = module.define_metadata_node(DISubroutineType::default())?;
    let foo_types = module.reserve_metadata_node(false);
    let int = module.define_metadata_node(DIBasicType {
        name: "int".to_string(),
        size: 32,
        align: 0,
        encoding: Some(DwarfEncoding::Signed),
    })?;
    module.fill_metadata_node(foo_types, vec![Metadata::from(int); 3])?;
    set_subroutine_types(module, foo_type, foo_types)?;
    set_subprogram_type(module, foo, foo_type)?;
    symbols.register(module, "foo", foo)?;

    let variables = [("a", 1, 1, (1, 13)), ("b", 2, 1, (1, 20)), ("sum", 0, 2, (2, 9))];
    for (name, arg, line, (loc_line, loc_col)) in variables {
        let var = module.define_metadata_node(DILocalVariable {
            name: name.to_string(),
            arg,
            scope: Some(foo.into()),
            file: Some(file.into()),
            line,
            ty: Some(int.into()),
            ..Default::default()
        })?;
        symbols.register(module, &format!("foo.var.{name}"), var)?;
        let loc = module.define_metadata_node(DILocation::new(loc_line, loc_col, foo))?;
        symbols.register(module, &format!("foo.loc.{name}"), loc)?;
    }

    let foo_locations = [
        ("load_a", 3, 11),
        ("load_b", 3, 15),
        ("add", 3, 13),
        ("store_sum", 3, 9),
        ("load_sum", 4, 12),
        ("ret", 4, 5),
    ];
    for (name, line, col) in foo_locations {
        let loc = module.define_metadata_node(DILocation::new(line, col, foo))?;
        symbols.register(module, &format!("foo.loc.{name}"), loc)?;
    }

    let main = module.define_distinct_metadata_node(DISubprogram {
        name: "main".to_string(),
        scope: Some(file.into()),
        file: Some(file.into()),
        line: 7,
        scope_line: 7,
        sp_flags: DISPFlags::DEFINITION,
        unit: Some(cu.into()),
        retained_nodes: Some(empty.into()),
        ..Default::default()
    })?;
    let main_type = module.define_metadata_node(DISubroutineType::default())?;
    let main_types = module.define_metadata_node(vec![Metadata::from(int)])?;
    set_subroutine_types(module, main_type, main_types)?;
    set_subprogram_type(module, main, main_type)?;
    symbols.register(module, "main", main)?;

    for (name, line, col) in [("call", 8, 12), ("ret", 8, 5)] {
        let loc = module.define_metadata_node(DILocation::new(line, col, main))?;
        symbols.register(module, &format!("main.loc.{name}"), loc)?;
    }

    module.add_named_metadata("llvm.dbg.cu", vec![cu])?;
    module.add_named_metadata(
        "llvm.module.flags",
        vec![dwarf_version, debug_info_version, wchar_size],
    )?;
    module.add_named_metadata("llvm.ident", vec![ident])?;
    Ok(symbols)
}

/// `!{i32 behavior, !"key", i32 value}`
fn module_flag(module: &mut Module, behavior: i64, key: &str, value: i64) -> IrResult<MetadataId> {
    module.define_metadata_node(vec![
        Value::i32(behavior).into(),
        Metadata::string(key),
        Value::i32(value).into(),
    ])
}

fn set_subroutine_types(module: &mut Module, ty: MetadataId, types: MetadataId) -> IrResult<()> {
    let MetadataNode::SubroutineType(subroutine) = module.metadata_node_mut(ty)? else {
        return Err(IrError::invalid_operand(format!(
            "!{} is not a subroutine type",
            ty.index()
        )));
    };
    subroutine.types = Some(types.into());
    Ok(())
}

fn set_subprogram_type(module: &mut Module, subprogram: MetadataId, ty: MetadataId) -> IrResult<()> {
    let MetadataNode::Subprogram(sp) = module.metadata_node_mut(subprogram)? else {
        return Err(IrError::invalid_operand(format!(
            "!{} is not a subprogram",
            subprogram.index()
        )));
    };
    sp.ty = Some(ty.into());
    Ok(())
}

/// `call void @llvm.dbg.declare(metadata <storage>, metadata <var>, metadata !DIExpression())`
fn declare_variable(
    builder: &mut IrBuilder<'_>,
    symbols: &DebugSymbols,
    intrinsic: FunctionId,
    storage: Value,
    name: &str,
) -> IrResult<()> {
    let variable = symbols.variable(builder.module(), &format!("foo.var.{name}"))?;
    set_location(builder, symbols, &format!("foo.loc.{name}"))?;
    let args = vec![
        Value::metadata(storage),
        Value::metadata(variable),
        Value::metadata(Metadata::inline(DIExpression::default())),
    ];
    builder.build_call(intrinsic, args, "")?;
    builder.clear_debug_location();
    Ok(())
}

fn set_location(builder: &mut IrBuilder<'_>, symbols: &DebugSymbols, name: &str) -> IrResult<()> {
    let location = symbols.location(builder.module(), name)?;
    builder.set_debug_location(location);
    Ok(())
}

fn define_foo(
    module: &mut Module,
    symbols: &DebugSymbols,
    dbg_declare: FunctionId,
    attrs: AttrGroupId,
) -> IrResult<FunctionId> {
    let foo = module.declare_function(
        "foo",
        IrType::I32,
        vec![Param::new(IrType::I32), Param::new(IrType::I32)],
    )?;
    {
        let function = module.function_mut(foo)?;
        function.preemption = Preemption::DsoLocal;
        function.attrs.push(FuncAttr::Group(attrs));
    }
    let subprogram = symbols.subprogram(module, "foo")?;
    module.attach_metadata(foo, "dbg", subprogram)?;
    let a = module.param(foo, 0)?;
    let b = module.param(foo, 1)?;
    let entry = module.append_block(foo, "")?;

    let mut builder = IrBuilder::new(module);
    builder.position_at_end(entry);
    let a_addr = builder.build_alloca(IrType::I32, Some(4), "")?;
    let b_addr = builder.build_alloca(IrType::I32, Some(4), "")?;
    let sum_addr = builder.build_alloca(IrType::I32, Some(4), "")?;

    builder.build_store(a, a_addr.clone(), Some(4))?;
    declare_variable(&mut builder, symbols, dbg_declare, a_addr.clone(), "a")?;
    builder.build_store(b, b_addr.clone(), Some(4))?;
    declare_variable(&mut builder, symbols, dbg_declare, b_addr.clone(), "b")?;
    declare_variable(&mut builder, symbols, dbg_declare, sum_addr.clone(), "sum")?;

    set_location(&mut builder, symbols, "foo.loc.load_a")?;
    let lhs = builder.build_load(a_addr, Some(4), "")?;
    set_location(&mut builder, symbols, "foo.loc.load_b")?;
    let rhs = builder.build_load(b_addr, Some(4), "")?;
    set_location(&mut builder, symbols, "foo.loc.add")?;
    let sum = builder.build_binary_with_flags(IrBinaryOp::Add, BinaryFlags::NSW, lhs, rhs, "")?;
    set_location(&mut builder, symbols, "foo.loc.store_sum")?;
    builder.build_store(sum, sum_addr.clone(), Some(4))?;
    set_location(&mut builder, symbols, "foo.loc.load_sum")?;
    let result = builder.build_load(sum_addr, Some(4), "")?;
    set_location(&mut builder, symbols, "foo.loc.ret")?;
    builder.build_ret(Some(result))?;
    Ok(foo)
}

fn define_main(
    module: &mut Module,
    symbols: &DebugSymbols,
    foo: FunctionId,
    attrs: AttrGroupId,
) -> IrResult<FunctionId> {
    let main = module.declare_function("main", IrType::I32, Vec::new())?;
    {
        let function = module.function_mut(main)?;
        function.preemption = Preemption::DsoLocal;
        function.attrs.push(FuncAttr::Group(attrs));
    }
    let subprogram = symbols.subprogram(module, "main")?;
    module.attach_metadata(main, "dbg", subprogram)?;
    let entry = module.append_block(main, "")?;

    let mut builder = IrBuilder::new(module);
    builder.position_at_end(entry);
    let retval = builder.build_alloca(IrType::I32, Some(4), "")?;
    builder.build_store(Value::i32(0), retval, Some(4))?;
    set_location(&mut builder, symbols, "main.loc.call")?;
    let call = builder.build_call(foo, vec![Value::i32(12), Value::i32(30)], "")?;
    set_location(&mut builder, symbols, "main.loc.ret")?;
    builder.build_ret(Some(call.into()))?;
    Ok(main)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_setters_reject_other_node_kinds() {
        let mut module = Module::new();
        let file = module
            .define_metadata_node(DIFile {
                filename: SOURCE_FILE.to_string(),
                directory: SOURCE_DIR.to_string(),
            })
            .unwrap();
        let ty = module.define_metadata_node(DISubroutineType::default()).unwrap();

        assert!(matches!(
            set_subprogram_type(&mut module, file, ty).unwrap_err(),
            IrError::InvalidOperand { .. }
        ));
        assert!(matches!(
            set_subroutine_types(&mut module, file, ty).unwrap_err(),
            IrError::InvalidOperand { .. }
        ));
    }
}
