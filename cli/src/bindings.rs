use anyhow::{anyhow, Context, Result};
use cmodule::ExportKind;
use libloading::Library;
use std::ffi::{c_char, c_int, c_void};
use std::ops::Deref;
use std::path::Path;

pub type VoidFn = unsafe extern "C" fn();
pub type IntToIntFn = unsafe extern "C" fn(c_int) -> c_int;
pub type IntFn = unsafe extern "C" fn(c_int);
pub type Int2Fn = unsafe extern "C" fn(c_int, c_int);
pub type Int3Fn = unsafe extern "C" fn(c_int, c_int, c_int);
pub type Int4Fn = unsafe extern "C" fn(c_int, c_int, c_int, c_int);
pub type ConstCharFn = unsafe extern "C" fn(*const c_char);
pub type InitFn = unsafe extern "C" fn() -> *mut c_void;

/// Typed entry points of the fixture, one per export.
#[derive(Clone, Copy)]
pub struct Bindings {
    pub void_foo_void: VoidFn,
    pub int_foo_int: IntToIntFn,
    pub void_foo_int: IntFn,
    pub void_foo_int_int: Int2Fn,
    pub void_foo_int_int_int: Int3Fn,
    pub void_foo_int_int_int_int: Int4Fn,
    pub void_foo_constchar: ConstCharFn,
    pub init_shim: InitFn,
}

/// Bindings resolved from a shared object. The function pointers are only
/// valid while `_library` stays loaded, so the two live and die together.
pub struct LoadedBindings {
    bindings: Bindings,
    _library: Library,
}

impl Deref for LoadedBindings {
    type Target = Bindings;

    fn deref(&self) -> &Bindings {
        &self.bindings
    }
}

impl Bindings {
    pub fn load(path: &Path) -> Result<LoadedBindings> {
        // SAFETY: the fixture has no library constructors; loading it runs no code.
        let library = unsafe { Library::new(path) }
            .with_context(|| format!("loading {}", path.display()))?;

        // SAFETY: each type alias matches the signature declared in `cmodule::EXPORTS`.
        let bindings = unsafe {
            Bindings {
                void_foo_void: resolve(&library, "void_foo_void")?,
                int_foo_int: resolve(&library, "int_foo_int")?,
                void_foo_int: resolve(&library, "void_foo_int")?,
                void_foo_int_int: resolve(&library, "void_foo_int_int")?,
                void_foo_int_int_int: resolve(&library, "void_foo_int_int_int")?,
                void_foo_int_int_int_int: resolve(&library, "void_foo_int_int_int_int")?,
                void_foo_constchar: resolve(&library, "void_foo_constchar")?,
                init_shim: resolve(&library, init_shim_name()?)?,
            }
        };

        Ok(LoadedBindings {
            bindings,
            _library: library,
        })
    }

    /// Every symbol `load` resolves, in declaration order.
    pub fn symbol_names() -> Vec<&'static str> {
        cmodule::EXPORTS.iter().map(|e| e.name).collect()
    }
}

fn init_shim_name() -> Result<&'static str> {
    cmodule::EXPORTS
        .iter()
        .find(|e| e.kind == ExportKind::InitShim)
        .map(|e| e.name)
        .ok_or_else(|| anyhow!("no init shim declared"))
}

unsafe fn resolve<T: Copy>(library: &Library, name: &str) -> Result<T> {
    let export = cmodule::find(name).ok_or_else(|| anyhow!("{name} is not a cmodule export"))?;
    let symbol = library
        .get::<T>(&export.symbol())
        .with_context(|| format!("resolving symbol {name}"))?;
    Ok(*symbol)
}
