//! Stub functions for measuring the overhead of calling native code through
//! `ctypes`. Every export does nothing (or next to nothing) so that a timing
//! loop on the caller side measures dispatch and argument conversion only.
//!
//! The exports must never log, allocate or panic. The shared object is
//! loaded into a foreign process and called millions of times.

use std::ffi::{c_char, c_int, c_void};

#[no_mangle]
pub extern "C" fn void_foo_void() {}

#[no_mangle]
pub extern "C" fn int_foo_int(a: c_int) -> c_int {
    // Wrapping so INT_MAX cannot abort the host process.
    a.wrapping_add(1)
}

#[no_mangle]
pub extern "C" fn void_foo_int(_a: c_int) {}

#[no_mangle]
pub extern "C" fn void_foo_int_int(_a: c_int, _b: c_int) {}

#[no_mangle]
pub extern "C" fn void_foo_int_int_int(_a: c_int, _b: c_int, _c: c_int) {}

#[no_mangle]
pub extern "C" fn void_foo_int_int_int_int(_a: c_int, _b: c_int, _c: c_int, _d: c_int) {}

/// The pointer is never read, so any value (including null) is accepted.
#[no_mangle]
pub extern "C" fn void_foo_constchar(_str: *const c_char) {}

/// Windows builds driven by setuptools pass `/EXPORT:PyInit_cmodule` to the
/// linker, so the symbol has to exist. This is not a Python extension module
/// and the entry point is never called; it always reports failure.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn PyInit_cmodule() -> *mut c_void {
    std::ptr::null_mut()
}

/// C types appearing in the exported signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CType {
    Int,
    ConstCharPtr,
    ObjectPtr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Called by the benchmark loop.
    Stub,
    /// Present for the linker only.
    InitShim,
}

/// Describes one exported symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Export {
    pub name: &'static str,
    pub params: &'static [CType],
    pub ret: Option<CType>,
    pub kind: ExportKind,
}

impl Export {
    const fn stub(name: &'static str, params: &'static [CType], ret: Option<CType>) -> Self {
        Self {
            name,
            params,
            ret,
            kind: ExportKind::Stub,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Symbol name as a NUL-terminated byte string, the form `dlsym` expects.
    pub fn symbol(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.name.len() + 1);
        bytes.extend_from_slice(self.name.as_bytes());
        bytes.push(0);
        bytes
    }
}

/// Every symbol the shared object exports, in benchmark call order.
pub const EXPORTS: &[Export] = &[
    Export::stub("void_foo_void", &[], None),
    Export::stub("int_foo_int", &[CType::Int], Some(CType::Int)),
    Export::stub("void_foo_int", &[CType::Int], None),
    Export::stub("void_foo_int_int", &[CType::Int, CType::Int], None),
    Export::stub(
        "void_foo_int_int_int",
        &[CType::Int, CType::Int, CType::Int],
        None,
    ),
    Export::stub(
        "void_foo_int_int_int_int",
        &[CType::Int, CType::Int, CType::Int, CType::Int],
        None,
    ),
    Export::stub("void_foo_constchar", &[CType::ConstCharPtr], None),
    Export {
        name: "PyInit_cmodule",
        params: &[],
        ret: Some(CType::ObjectPtr),
        kind: ExportKind::InitShim,
    },
];

/// The exports the benchmark actually calls.
pub fn stubs() -> impl Iterator<Item = &'static Export> {
    EXPORTS.iter().filter(|e| e.kind == ExportKind::Stub)
}

pub fn find(name: &str) -> Option<&'static Export> {
    EXPORTS.iter().find(|e| e.name == name)
}
