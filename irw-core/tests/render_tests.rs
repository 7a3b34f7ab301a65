//! Rendering tests: numbering, section layout and structural errors

use irw_core::ir::*;
use irw_core::IrError;
use pretty_assertions::assert_eq;

fn int_params(count: usize) -> Vec<Param> {
    (0..count).map(|_| Param::new(IrType::I32)).collect()
}

#[test]
fn test_empty_module_renders_nothing() {
    let module = Module::new();
    assert_eq!(module.render().unwrap(), "");
}

#[test]
fn test_header_only() {
    let mut module = Module::new();
    module.source_filename = Some("a.c".to_string());
    module.target_triple = Some("x86_64-pc-linux-gnu".to_string());
    assert_eq!(
        module.render().unwrap(),
        "source_filename = \"a.c\"\ntarget triple = \"x86_64-pc-linux-gnu\"\n"
    );
}

#[test]
fn test_declarations_render_identically_twice() {
    let mut module = Module::new();
    module
        .declare_vararg_function("printf", IrType::I32, vec![Param::new(IrType::I8.ptr())])
        .unwrap();
    let exit = module
        .declare_function("exit", IrType::Void, int_params(1))
        .unwrap();
    let group = module
        .add_attribute_group(vec![FuncAttr::NoReturn, FuncAttr::NoUnwind])
        .unwrap();
    module.function_mut(exit).unwrap().attrs.push(FuncAttr::Group(group));

    let expected = "\
declare i32 @printf(i8*, ...)

declare void @exit(i32) #0

attributes #0 = { noreturn nounwind }
";
    let first = module.render().unwrap();
    assert_eq!(first, expected);
    assert_eq!(module.render().unwrap(), first);
}

#[test]
fn test_two_function_scenario() {
    let mut module = Module::new();
    let foo = module.declare_function("foo", IrType::I32, int_params(2)).unwrap();
    let main = module.declare_function("main", IrType::I32, vec![]).unwrap();

    let foo_entry = module.append_block(foo, "").unwrap();
    let main_entry = module.append_block(main, "").unwrap();
    let mut builder = IrBuilder::new(&mut module);

    builder.position_at_end(foo_entry);
    let sum = builder
        .build_binary_with_flags(
            IrBinaryOp::Add,
            BinaryFlags::NSW,
            Value::Param(foo, 0),
            Value::Param(foo, 1),
            "",
        )
        .unwrap();
    builder.build_ret(Some(sum)).unwrap();

    builder.position_at_end(main_entry);
    let call = builder
        .build_call(foo, vec![Value::i32(12), Value::i32(30)], "")
        .unwrap();
    builder.build_ret(Some(call.into())).unwrap();

    let expected = "\
define i32 @foo(i32 %0, i32 %1) {
  %3 = add nsw i32 %0, %1
  ret i32 %3
}

define i32 @main() {
  %1 = call i32 @foo(i32 12, i32 30)
  ret i32 %1
}
";
    assert_eq!(module.render().unwrap(), expected);
}

/// Blocks are filled out of order; numbers still follow emission order
fn diamond() -> (Module, InstId, BlockId) {
    let mut module = Module::new();
    let func = module
        .declare_function("f", IrType::I32, vec![Param::new(IrType::I1)])
        .unwrap();
    let entry = module.append_block(func, "").unwrap();
    let then = module.append_block(func, "").unwrap();
    let join = module.append_block(func, "").unwrap();

    let mut builder = IrBuilder::new(&mut module);
    builder.position_at_end(entry);
    let slot = builder.build_alloca(IrType::I32, Some(4), "").unwrap();

    builder.position_at_end(join);
    let phi = builder
        .build_phi(IrType::I32, vec![(Value::i32(0), entry)], "")
        .unwrap();
    builder.build_ret(Some(phi.into())).unwrap();

    builder.position_at_end(then);
    builder.build_load(slot, Some(4), "").unwrap();
    builder.build_br(join).unwrap();

    builder.position_at_end(entry);
    builder
        .build_cond_br(Value::Param(func, 0), then, join)
        .unwrap();
    (module, phi, then)
}

#[test]
fn test_numbering_follows_emission_order() {
    let (mut module, phi, then) = diamond();
    let loaded = Value::Inst(module.function(then.function()).unwrap().block(then).unwrap().instructions()[0]);
    module.add_phi_incoming(phi, loaded, then).unwrap();

    let expected = "\
define i32 @f(i1 %0) {
  %2 = alloca i32, align 4
  br i1 %0, label %3, label %5

3:
  %4 = load i32, i32* %2, align 4
  br label %5

5:
  %6 = phi i32 [ 0, %1 ], [ %4, %3 ]
  ret i32 %6
}
";
    assert_eq!(module.render().unwrap(), expected);
}

#[test]
fn test_phi_missing_predecessor_is_rejected() {
    let (module, _, _) = diamond();
    let err = module.render().unwrap_err();
    assert!(matches!(err, IrError::PhiMismatch { ref function, .. } if function == "f"));
}

#[test]
fn test_named_values_and_quoting() {
    let mut module = Module::new();
    let func = module
        .declare_function("count", IrType::Void, vec![Param::named("n", IrType::I32)])
        .unwrap();
    let entry = module.append_block(func, "entry").unwrap();
    let body = module.append_block(func, "loop body").unwrap();
    let done = module.append_block(func, "done").unwrap();

    let mut builder = IrBuilder::new(&mut module);
    builder.position_at_end(entry);
    builder.build_br(body).unwrap();

    builder.position_at_end(body);
    let i = builder.build_phi(IrType::I32, vec![(Value::i32(0), entry)], "i").unwrap();
    let next = builder
        .build_binary_with_flags(IrBinaryOp::Add, BinaryFlags::NUW, i.into(), Value::i32(1), "i.next")
        .unwrap();
    let more = builder
        .build_icmp(IntPredicate::Ult, next.clone(), Value::Param(func, 0), "")
        .unwrap();
    builder.build_cond_br(more, body, done).unwrap();
    builder.position_at_end(done);
    builder.build_ret(None).unwrap();
    module.add_phi_incoming(i, next, body).unwrap();

    let expected = "\
define void @count(i32 %n) {
entry:
  br label %\"loop body\"

\"loop body\":
  %i = phi i32 [ 0, %entry ], [ %i.next, %\"loop body\" ]
  %i.next = add nuw i32 %i, 1
  %0 = icmp ult i32 %i.next, %n
  br i1 %0, label %\"loop body\", label %done

done:
  ret void
}
";
    assert_eq!(module.render().unwrap(), expected);
}

#[test]
fn test_metadata_numbers_follow_registration() {
    let mut module = Module::new();
    let cu = module.reserve_metadata_node(true);
    let file = module
        .define_metadata_node(DIFile {
            filename: "a.c".to_string(),
            directory: "/tmp".to_string(),
        })
        .unwrap();
    let mut unit = DICompileUnit::new(DwarfLang::C99);
    unit.file = Some(file.into());
    unit.producer = Some("irw".to_string());
    module.fill_metadata_node(cu, unit).unwrap();

    let empty = module.define_metadata_node(MetadataNode::empty_tuple()).unwrap();
    if let MetadataNode::CompileUnit(unit) = module.metadata_node_mut(cu).unwrap() {
        unit.enums = Some(empty.into());
    }
    let version = module
        .define_metadata_node(MetadataNode::Tuple(vec![
            Value::i32(2).into(),
            Metadata::string("Dwarf Version"),
            Value::i32(4).into(),
        ]))
        .unwrap();
    module.add_named_metadata("llvm.dbg.cu", vec![cu]).unwrap();
    module.add_named_metadata("llvm.module.flags", vec![version]).unwrap();

    let expected = "\
!0 = distinct !DICompileUnit(language: DW_LANG_C99, file: !1, producer: \"irw\", isOptimized: false, runtimeVersion: 0, emissionKind: FullDebug, enums: !2)
!1 = !DIFile(filename: \"a.c\", directory: \"/tmp\")
!2 = !{}
!3 = !{i32 2, !\"Dwarf Version\", i32 4}
!llvm.dbg.cu = !{!0}
!llvm.module.flags = !{!3}
";
    assert_eq!(module.render().unwrap(), expected);
}

#[test]
fn test_unfilled_slot_is_incomplete() {
    let mut module = Module::new();
    module.define_metadata_node(MetadataNode::empty_tuple()).unwrap();
    module.reserve_metadata_node(false);
    assert!(matches!(
        module.render().unwrap_err(),
        IrError::IncompleteNode { index: 1, .. }
    ));
}

#[test]
fn test_missing_required_field_is_incomplete() {
    let mut module = Module::new();
    module
        .define_metadata_node(DILocation {
            line: 1,
            ..Default::default()
        })
        .unwrap();
    match module.render().unwrap_err() {
        IrError::IncompleteNode { index, reason } => {
            assert_eq!(index, 0);
            assert!(reason.contains("scope"), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_unterminated_block() {
    let mut module = Module::new();
    let func = module.declare_function("f", IrType::Void, vec![]).unwrap();
    module.append_block(func, "entry").unwrap();
    assert_eq!(
        module.render().unwrap_err(),
        IrError::UnterminatedBlock {
            function: "f".to_string(),
            block: "%entry".to_string()
        }
    );
}

#[test]
fn test_debug_location_on_instructions_and_terminators() {
    let mut module = Module::new();
    let file = module
        .define_metadata_node(DIFile {
            filename: "a.c".to_string(),
            directory: "/".to_string(),
        })
        .unwrap();
    let sp = module
        .define_distinct_metadata_node(DISubprogram {
            name: "f".to_string(),
            scope: Some(file.into()),
            file: Some(file.into()),
            line: 2,
            ..Default::default()
        })
        .unwrap();
    let loc = module.define_metadata_node(DILocation::new(3, 5, sp)).unwrap();
    let func = module.declare_function("f", IrType::Void, vec![]).unwrap();
    module.attach_metadata(func, "dbg", sp).unwrap();
    let entry = module.append_block(func, "").unwrap();

    let mut builder = IrBuilder::new(&mut module);
    builder.position_at_end(entry);
    builder.build_alloca(IrType::I8, None, "").unwrap();
    builder.set_debug_location(loc);
    builder.build_ret(None).unwrap();

    let expected = "\
define void @f() !dbg !1 {
  %1 = alloca i8
  ret void, !dbg !2
}

!0 = !DIFile(filename: \"a.c\", directory: \"/\")
!1 = distinct !DISubprogram(name: \"f\", scope: !0, file: !0, line: 2)
!2 = !DILocation(line: 3, column: 5, scope: !1)
";
    assert_eq!(module.render().unwrap(), expected);
}

#[test]
fn test_globals_and_constant_expressions() {
    let mut module = Module::new();
    let mut msg = GlobalVariable::new("msg", IrType::array(3, IrType::I8));
    msg.is_constant = true;
    msg.linkage = Linkage::Internal;
    msg.unnamed_addr = UnnamedAddr::Global;
    msg.initializer = Some(Constant::string("hi\n"));
    msg.align = Some(1);
    let msg = module.add_global(msg).unwrap();

    let mut flag = GlobalVariable::new("flag", IrType::I1);
    flag.initializer = Some(Constant::Int { ty: IrType::I1, value: 1 });
    module.add_global(flag).unwrap();
    module
        .add_global(GlobalVariable::new("environ", IrType::I8.ptr()))
        .unwrap();

    let printf = module
        .declare_vararg_function("printf", IrType::I32, vec![Param::new(IrType::I8.ptr())])
        .unwrap();
    let fast = module.declare_function("twice", IrType::I32, int_params(1)).unwrap();
    module.function_mut(fast).unwrap().calling_conv = Some(CallingConv::Fast);
    let main = module.declare_function("main", IrType::I32, vec![]).unwrap();
    let entry = module.append_block(main, "").unwrap();

    let text = Constant::GetElementPtr {
        inbounds: true,
        base: msg,
        indices: vec![Constant::i32(0), Constant::i32(0)],
    };
    let mut builder = IrBuilder::new(&mut module);
    builder.position_at_end(entry);
    builder.build_call(printf, vec![text.into()], "").unwrap();
    let doubled = builder.build_tail_call(fast, vec![Value::i32(21)], "r").unwrap();
    builder.build_ret(Some(doubled.into())).unwrap();

    let expected = "\
@msg = internal unnamed_addr constant [3 x i8] c\"hi\\0A\", align 1
@flag = global i1 true
@environ = external global i8*

declare i32 @printf(i8*, ...)

declare fastcc i32 @twice(i32)

define i32 @main() {
  %1 = call i32 (i8*, ...) @printf(i8* getelementptr inbounds ([3 x i8], [3 x i8]* @msg, i32 0, i32 0))
  %r = tail call fastcc i32 @twice(i32 21)
  ret i32 %r
}
";
    assert_eq!(module.render().unwrap(), expected);
}

#[test]
fn test_handle_from_other_module_fails_render() {
    let mut other = Module::new();
    let foreign = other.define_metadata_node(MetadataNode::empty_tuple()).unwrap();

    let mut module = Module::new();
    let func = module.declare_function("f", IrType::Void, vec![]).unwrap();
    module.function_mut(func).unwrap().metadata.push(Attachment {
        kind: "dbg".to_string(),
        node: foreign.into(),
    });
    assert!(matches!(
        module.render().unwrap_err(),
        IrError::DanglingHandle { .. }
    ));
}

#[test]
fn test_phi_without_incoming_is_rejected() {
    let mut module = Module::new();
    let func = module.declare_function("f", IrType::I32, vec![]).unwrap();
    let entry = module.append_block(func, "").unwrap();
    let mut builder = IrBuilder::new(&mut module);
    builder.position_at_end(entry);
    let phi = builder.build_phi(IrType::I32, vec![], "").unwrap();
    builder.build_ret(Some(phi.into())).unwrap();

    match module.render().unwrap_err() {
        IrError::PhiMismatch { message, .. } => assert_eq!(message, "phi without incoming values"),
        other => panic!("unexpected error: {other:?}"),
    }
}

/// `entry` branches to `join` on both arms; the phi lists that edge twice
fn double_edge(first: i64, second: i64) -> Module {
    let mut module = Module::new();
    let func = module
        .declare_function("f", IrType::I32, vec![Param::new(IrType::I1)])
        .unwrap();
    let entry = module.append_block(func, "entry").unwrap();
    let join = module.append_block(func, "join").unwrap();
    let mut builder = IrBuilder::new(&mut module);
    builder.position_at_end(entry);
    builder.build_cond_br(Value::Param(func, 0), join, join).unwrap();
    builder.position_at_end(join);
    let phi = builder
        .build_phi(
            IrType::I32,
            vec![(Value::i32(first), entry), (Value::i32(second), entry)],
            "v",
        )
        .unwrap();
    builder.build_ret(Some(phi.into())).unwrap();
    module
}

#[test]
fn test_repeated_phi_edge_carries_one_value() {
    let expected = "\
define i32 @f(i1 %0) {
entry:
  br i1 %0, label %join, label %join

join:
  %v = phi i32 [ 1, %entry ], [ 1, %entry ]
  ret i32 %v
}
";
    assert_eq!(double_edge(1, 1).render().unwrap(), expected);

    match double_edge(1, 2).render().unwrap_err() {
        IrError::PhiMismatch { message, .. } => {
            assert_eq!(message, "different values for the edge from %entry")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_return_type_edited_after_body() {
    let mut module = Module::new();
    let func = module.declare_function("f", IrType::I32, int_params(1)).unwrap();
    let entry = module.append_block(func, "").unwrap();
    let mut builder = IrBuilder::new(&mut module);
    builder.position_at_end(entry);
    builder.build_ret(Some(Value::Param(func, 0))).unwrap();

    module.function_mut(func).unwrap().return_type = IrType::I64;
    assert_eq!(
        module.render().unwrap_err(),
        IrError::InvalidOperand {
            message: "'@f' returns i64, not i32".to_string()
        }
    );
}

#[test]
fn test_callee_params_edited_after_call() {
    let mut module = Module::new();
    let callee = module.declare_function("g", IrType::Void, int_params(1)).unwrap();
    let func = module.declare_function("f", IrType::Void, vec![]).unwrap();
    let entry = module.append_block(func, "").unwrap();
    let mut builder = IrBuilder::new(&mut module);
    builder.position_at_end(entry);
    builder.build_call(callee, vec![Value::i32(7)], "").unwrap();
    builder.build_ret(None).unwrap();

    module.function_mut(callee).unwrap().params[0].ty = IrType::I8;
    assert_eq!(
        module.render().unwrap_err(),
        IrError::InvalidOperand {
            message: "argument 0 has type i32, expected i8".to_string()
        }
    );
}
