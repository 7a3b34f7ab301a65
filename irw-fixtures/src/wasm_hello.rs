//! Freestanding wasm32-wasi program that prints a greeting
//!
//! The shape follows what a small language runtime emits: a string constant,
//! an import of WASI `fd_write`, a print helper, a scheduler loop draining a
//! run queue, and the `_start` entry point.

use irw_core::ir::{
    BinaryFlags, Constant, FuncAttr, GlobalVariable, IntPredicate, IrBinaryOp, Linkage,
    Metadata, Param, UnnamedAddr,
};
use irw_core::{IrBuilder, IrResult, IrType, Module, Value};

const GREETING: &str = "Hello world\n";

pub fn build() -> IrResult<Module> {
    let mut module = Module::new();
    module.source_filename = Some("main".to_string());
    module.data_layout = Some("e-m:e-p:32:32-i64:64-n32:64-S128".to_string());
    module.target_triple = Some("wasm32-unknown-wasi".to_string());

    let byte_ptr = IrType::I8.ptr();
    let iovec = IrType::structure(vec![byte_ptr.clone(), IrType::I32]);
    let greeting_type = IrType::array(GREETING.len() as u64, IrType::I8);

    let mut greeting = GlobalVariable::new("main$string", greeting_type);
    greeting.is_constant = true;
    greeting.initializer = Some(Constant::string(GREETING));
    greeting.linkage = Linkage::Internal;
    greeting.unnamed_addr = UnnamedAddr::Global;
    greeting.align = Some(1);
    let greeting = module.add_global(greeting)?;

    let mut runqueue = GlobalVariable::new("runtime.runqueue", byte_ptr.clone());
    runqueue.initializer = Some(Constant::Null(byte_ptr.clone()));
    runqueue.linkage = Linkage::Internal;
    runqueue.align = Some(4);
    let runqueue = module.add_global(runqueue)?;

    let wasi_import = module.add_attribute_group(vec![
        FuncAttr::string("wasm-import-module", "wasi_snapshot_preview1"),
        FuncAttr::string("wasm-import-name", "fd_write"),
    ])?;
    let no_return = module.add_attribute_group(vec![FuncAttr::NoReturn])?;

    let fd_write = module.declare_function(
        "fd_write",
        IrType::I32,
        vec![
            Param::new(IrType::I32),
            Param::new(iovec.clone().ptr()),
            Param::new(IrType::I32),
            Param::new(IrType::I32.ptr()),
        ],
    )?;
    module.function_mut(fd_write)?.attrs.push(FuncAttr::Group(wasi_import));

    let print_string = module.declare_function(
        "runtime.printString",
        IrType::Void,
        vec![Param::named("ptr", byte_ptr.clone()), Param::named("len", IrType::I32)],
    )?;
    let scheduler = module.declare_function("runtime.scheduler", IrType::Void, Vec::new())?;
    let abort = module.declare_function("runtime.abort", IrType::Void, Vec::new())?;
    let start = module.declare_function("_start", IrType::Void, Vec::new())?;
    for internal in [print_string, scheduler, abort] {
        module.function_mut(internal)?.linkage = Linkage::Internal;
    }
    module.function_mut(abort)?.attrs.push(FuncAttr::Group(no_return));

    // runtime.printString: one iovec on the stack, written to stdout
    let ptr = module.param(print_string, 0)?;
    let len = module.param(print_string, 1)?;
    let entry = module.append_block(print_string, "entry")?;
    {
        let mut builder = IrBuilder::new(&mut module);
        builder.position_at_end(entry);
        let iov = builder.build_alloca(iovec, Some(4), "iov")?;
        let nwritten = builder.build_alloca(IrType::I32, Some(4), "nwritten")?;
        let buf = builder.build_inbounds_gep(
            iov.clone(),
            vec![Value::i32(0), Value::i32(0)],
            "iov.buf",
        )?;
        builder.build_store(ptr, buf, Some(4))?;
        let buf_len = builder.build_inbounds_gep(
            iov.clone(),
            vec![Value::i32(0), Value::i32(1)],
            "iov.len",
        )?;
        builder.build_store(len, buf_len, Some(4))?;
        builder.build_call(
            fd_write,
            vec![Value::i32(1), iov, Value::i32(1), nwritten],
            "",
        )?;
        builder.build_ret(None)?;
    }

    // runtime.scheduler: pop until the run queue is empty, counting tasks
    let entry = module.append_block(scheduler, "entry")?;
    let looping = module.append_block(scheduler, "loop")?;
    let body = module.append_block(scheduler, "body")?;
    let done = module.append_block(scheduler, "done")?;
    let (counter, next) = {
        let mut builder = IrBuilder::new(&mut module);
        builder.position_at_end(entry);
        builder.build_br(looping)?;

        builder.position_at_end(looping);
        let counter = builder.build_phi(IrType::I32, vec![(Value::i32(0), entry)], "i")?;
        let task = builder.build_load(Value::Global(runqueue), Some(4), "task")?;
        let empty = builder.build_icmp(
            IntPredicate::Eq,
            task,
            Value::null(byte_ptr.clone()),
            "empty",
        )?;
        builder.build_cond_br(empty, done, body)?;

        builder.position_at_end(body);
        builder.build_store(Value::null(byte_ptr), Value::Global(runqueue), Some(4))?;
        let next = builder.build_binary_with_flags(
            IrBinaryOp::Add,
            BinaryFlags::NUW,
            counter.into(),
            Value::i32(1),
            "i.next",
        )?;
        builder.build_br(looping)?;

        builder.position_at_end(done);
        builder.build_ret(None)?;
        (counter, next)
    };
    module.add_phi_incoming(counter, next, body)?;

    let entry = module.append_block(abort, "entry")?;
    {
        let mut builder = IrBuilder::new(&mut module);
        builder.position_at_end(entry);
        builder.build_unreachable()?;
    }

    let entry = module.append_block(start, "entry")?;
    {
        let mut builder = IrBuilder::new(&mut module);
        builder.position_at_end(entry);
        let message = Constant::GetElementPtr {
            inbounds: true,
            base: greeting,
            indices: vec![Constant::i32(0), Constant::i32(0)],
        };
        builder.build_call(
            print_string,
            vec![message.into(), Value::i32(GREETING.len() as i64)],
            "",
        )?;
        builder.build_call(scheduler, Vec::new(), "")?;
        builder.build_ret(None)?;
    }

    let ident = module.define_metadata_node(vec![Metadata::string("irw wasm runtime")])?;
    module.add_named_metadata("llvm.ident", vec![ident])?;
    Ok(module)
}
