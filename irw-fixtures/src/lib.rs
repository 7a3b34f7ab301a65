//! Hardcoded example modules
//!
//! Each fixture builds a complete [`Module`] through the public builder API.
//! The binaries and the driver render them; the golden tests pin the text.

use irw_core::{IrResult, Module};
use std::fmt;

pub mod arith;
pub mod foo_debug;
pub mod wasm_hello;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    /// Two C functions with full DWARF debug info
    FooDebug,
    /// Minimal WASI runtime printing a greeting
    WasmHello,
    /// `foo`/`main` without metadata
    Arith,
}

impl Fixture {
    pub const ALL: [Fixture; 3] = [Fixture::FooDebug, Fixture::WasmHello, Fixture::Arith];

    pub fn name(&self) -> &'static str {
        match self {
            Fixture::FooDebug => "foo_debug",
            Fixture::WasmHello => "wasm_hello",
            Fixture::Arith => "arith",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Fixture::FooDebug => "int foo(int a, int b) and main() with DWARF debug metadata",
            Fixture::WasmHello => "wasm32-wasi module writing \"Hello world\" through fd_write",
            Fixture::Arith => "int foo(int a, int b) and main() without metadata",
        }
    }

    pub fn from_name(name: &str) -> Option<Fixture> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn build(&self) -> IrResult<Module> {
        log::debug!("building fixture {}", self.name());
        match self {
            Fixture::FooDebug => foo_debug::build(),
            Fixture::WasmHello => wasm_hello::build(),
            Fixture::Arith => arith::build(),
        }
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_by_name() {
        for fixture in Fixture::ALL {
            assert_eq!(Fixture::from_name(fixture.name()), Some(fixture));
        }
        assert_eq!(Fixture::from_name("nope"), None);
    }

    #[test]
    fn test_every_fixture_verifies() {
        for fixture in Fixture::ALL {
            let module = fixture.build().unwrap();
            module.verify().unwrap();
        }
    }
}
