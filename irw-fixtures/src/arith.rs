//! `foo` adds its arguments, `main` calls it with constants

use irw_core::ir::{BinaryFlags, IrBinaryOp, Param};
use irw_core::{IrBuilder, IrResult, IrType, Module, Value};

pub fn build() -> IrResult<Module> {
    let mut module = Module::new();

    let foo = module.declare_function(
        "foo",
        IrType::I32,
        vec![Param::named("a", IrType::I32), Param::named("b", IrType::I32)],
    )?;
    let main = module.declare_function("main", IrType::I32, Vec::new())?;

    let foo_entry = module.append_block(foo, "entry")?;
    let main_entry = module.append_block(main, "entry")?;
    let a = module.param(foo, 0)?;
    let b = module.param(foo, 1)?;

    let mut builder = IrBuilder::new(&mut module);
    builder.position_at_end(foo_entry);
    let sum = builder.build_binary_with_flags(IrBinaryOp::Add, BinaryFlags::NSW, a, b, "sum")?;
    builder.build_ret(Some(sum))?;

    builder.position_at_end(main_entry);
    let result = builder.build_call(foo, vec![Value::i32(12), Value::i32(30)], "result")?;
    builder.build_ret(Some(result.into()))?;

    Ok(module)
}
