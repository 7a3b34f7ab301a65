use irw_fixtures::Fixture;
use pretty_assertions::assert_eq;

const FOO_DEBUG: &str = r#"source_filename = "target.c"
target datalayout = "e-m:e-i64:64-f80:128-n8:16:32:64-S128"
target triple = "x86_64-pc-linux-gnu"

declare void @llvm.dbg.declare(metadata, metadata, metadata) #1

define dso_local i32 @foo(i32 %0, i32 %1) #0 !dbg !7 {
  %3 = alloca i32, align 4
  %4 = alloca i32, align 4
  %5 = alloca i32, align 4
  store i32 %0, i32* %3, align 4
  call void @llvm.dbg.declare(metadata i32* %3, metadata !11, metadata !DIExpression()), !dbg !12
  store i32 %1, i32* %4, align 4
  call void @llvm.dbg.declare(metadata i32* %4, metadata !13, metadata !DIExpression()), !dbg !14
  call void @llvm.dbg.declare(metadata i32* %5, metadata !15, metadata !DIExpression()), !dbg !16
  %6 = load i32, i32* %3, align 4, !dbg !17
  %7 = load i32, i32* %4, align 4, !dbg !18
  %8 = add nsw i32 %6, %7, !dbg !19
  store i32 %8, i32* %5, align 4, !dbg !20
  %9 = load i32, i32* %5, align 4, !dbg !21
  ret i32 %9, !dbg !22
}

define dso_local i32 @main() #0 !dbg !23 {
  %1 = alloca i32, align 4
  store i32 0, i32* %1, align 4
  %2 = call i32 @foo(i32 12, i32 30), !dbg !26
  ret i32 %2, !dbg !27
}

attributes #0 = { noinline nounwind optnone uwtable }
attributes #1 = { nounwind readnone speculatable }

!0 = distinct !DICompileUnit(language: DW_LANG_C99, file: !1, producer: "clang version 8.0.1", isOptimized: false, runtimeVersion: 0, emissionKind: FullDebug, enums: !2, nameTableKind: None)
!1 = !DIFile(filename: "target.c", directory: "/home/user/src")
!2 = !{}
!3 = !{i32 2, !"Dwarf Version", i32 4}
!4 = !{i32 2, !"Debug Info Version", i32 3}
!5 = !{i32 1, !"wchar_size", i32 4}
!6 = !{!"clang version 8.0.1"}
!7 = distinct !DISubprogram(name: "foo", scope: !1, file: !1, line: 1, type: !8, scopeLine: 1, flags: DIFlagPrototyped, spFlags: DISPFlagDefinition, unit: !0, retainedNodes: !2)
!8 = !DISubroutineType(types: !9)
!9 = !{!10, !10, !10}
!10 = !DIBasicType(name: "int", size: 32, encoding: DW_ATE_signed)
!11 = !DILocalVariable(name: "a", arg: 1, scope: !7, file: !1, line: 1, type: !10)
!12 = !DILocation(line: 1, column: 13, scope: !7)
!13 = !DILocalVariable(name: "b", arg: 2, scope: !7, file: !1, line: 1, type: !10)
!14 = !DILocation(line: 1, column: 20, scope: !7)
!15 = !DILocalVariable(name: "sum", scope: !7, file: !1, line: 2, type: !10)
!16 = !DILocation(line: 2, column: 9, scope: !7)
!17 = !DILocation(line: 3, column: 11, scope: !7)
!18 = !DILocation(line: 3, column: 15, scope: !7)
!19 = !DILocation(line: 3, column: 13, scope: !7)
!20 = !DILocation(line: 3, column: 9, scope: !7)
!21 = !DILocation(line: 4, column: 12, scope: !7)
!22 = !DILocation(line: 4, column: 5, scope: !7)
!23 = distinct !DISubprogram(name: "main", scope: !1, file: !1, line: 7, type: !24, scopeLine: 7, spFlags: DISPFlagDefinition, unit: !0, retainedNodes: !2)
!24 = !DISubroutineType(types: !25)
!25 = !{!10}
!26 = !DILocation(line: 8, column: 12, scope: !23)
!27 = !DILocation(line: 8, column: 5, scope: !23)
!llvm.dbg.cu = !{!0}
!llvm.module.flags = !{!3, !4, !5}
!llvm.ident = !{!6}
"#;

const ARITH: &str = "define i32 @foo(i32 %a, i32 %b) {
entry:
  %sum = add nsw i32 %a, %b
  ret i32 %sum
}

define i32 @main() {
entry:
  %result = call i32 @foo(i32 12, i32 30)
  ret i32 %result
}
";

fn render(fixture: Fixture) -> String {
    fixture.build().unwrap().render().unwrap()
}

#[test]
fn test_foo_debug_golden() {
    assert_eq!(render(Fixture::FooDebug), FOO_DEBUG);
}

#[test]
fn test_arith_golden() {
    assert_eq!(render(Fixture::Arith), ARITH);
}

#[test]
fn test_render_is_deterministic() {
    for fixture in Fixture::ALL {
        let module = fixture.build().unwrap();
        assert_eq!(module.render().unwrap(), module.render().unwrap());
        assert_eq!(render(fixture), module.render().unwrap());
    }
}

#[test]
fn test_wasm_hello_globals_and_import() {
    let text = render(Fixture::WasmHello);
    assert!(text.starts_with(
        "source_filename = \"main\"\n\
         target datalayout = \"e-m:e-p:32:32-i64:64-n32:64-S128\"\n\
         target triple = \"wasm32-unknown-wasi\"\n\n"
    ));
    assert!(text.contains(
        "@main$string = internal unnamed_addr constant [12 x i8] c\"Hello world\\0A\", align 1\n"
    ));
    assert!(text.contains("@runtime.runqueue = internal global i8* null, align 4\n"));
    assert!(text.contains("declare i32 @fd_write(i32, { i8*, i32 }*, i32, i32*) #0\n"));
    assert!(text.contains(
        "attributes #0 = { \"wasm-import-module\"=\"wasi_snapshot_preview1\" \"wasm-import-name\"=\"fd_write\" }\n"
    ));
    assert!(text.contains("attributes #1 = { noreturn }\n"));
    assert!(text.ends_with("!0 = !{!\"irw wasm runtime\"}\n!llvm.ident = !{!0}\n"));
}

#[test]
fn test_wasm_hello_print_string() {
    let text = render(Fixture::WasmHello);
    let expected = "define internal void @runtime.printString(i8* %ptr, i32 %len) {
entry:
  %iov = alloca { i8*, i32 }, align 4
  %nwritten = alloca i32, align 4
  %iov.buf = getelementptr inbounds { i8*, i32 }, { i8*, i32 }* %iov, i32 0, i32 0
  store i8* %ptr, i8** %iov.buf, align 4
  %iov.len = getelementptr inbounds { i8*, i32 }, { i8*, i32 }* %iov, i32 0, i32 1
  store i32 %len, i32* %iov.len, align 4
  %0 = call i32 @fd_write(i32 1, { i8*, i32 }* %iov, i32 1, i32* %nwritten)
  ret void
}
";
    assert!(text.contains(expected), "{text}");
}

#[test]
fn test_wasm_hello_scheduler_loop() {
    let text = render(Fixture::WasmHello);
    let expected = "define internal void @runtime.scheduler() {
entry:
  br label %loop

loop:
  %i = phi i32 [ 0, %entry ], [ %i.next, %body ]
  %task = load i8*, i8** @runtime.runqueue, align 4
  %empty = icmp eq i8* %task, null
  br i1 %empty, label %done, label %body

body:
  store i8* null, i8** @runtime.runqueue, align 4
  %i.next = add nuw i32 %i, 1
  br label %loop

done:
  ret void
}
";
    assert!(text.contains(expected), "{text}");
}

#[test]
fn test_wasm_hello_entry_point() {
    let text = render(Fixture::WasmHello);
    assert!(text.contains("define internal void @runtime.abort() #1 {\nentry:\n  unreachable\n}\n"));
    assert!(text.contains(
        "define void @_start() {
entry:
  call void @runtime.printString(i8* getelementptr inbounds ([12 x i8], [12 x i8]* @main$string, i32 0, i32 0), i32 12)
  call void @runtime.scheduler()
  ret void
}
"
    ));
}
