//! System driver backend.
//!
//! Binds to an installed OpenGL ES 2.0 implementation by dynamic symbol
//! resolution. Construction fails with a driver-load error when no library
//! can be opened or a required entry point is missing; after that, calls go
//! straight through the resolved function pointers.
//!
//! Note that querying context state through a bare library binding requires
//! the embedder to have made a context current on this thread; without one,
//! drivers answer with errors that surface as `Fail` outcomes, never as
//! crashes.

use std::ffi::{c_char, c_void, CStr};
use std::path::Path;

use super::{
    DriverCallError, EntryPoint, FunctionLibrary, GlDriver, Library, LibraryType, LimitQuery,
    Platform, ShaderCompilation, ShaderStage, StringQuery,
};
use crate::errors::HarnessError;

// GLES2 constants used by the query surface.
const GL_NO_ERROR: u32 = 0;
const GL_INVALID_ENUM: u32 = 0x0500;
const GL_VENDOR: u32 = 0x1F00;
const GL_RENDERER: u32 = 0x1F01;
const GL_VERSION: u32 = 0x1F02;
const GL_EXTENSIONS: u32 = 0x1F03;
const GL_SHADING_LANGUAGE_VERSION: u32 = 0x8B8C;
const GL_MAX_TEXTURE_SIZE: u32 = 0x0D33;
const GL_MAX_CUBE_MAP_TEXTURE_SIZE: u32 = 0x851C;
const GL_MAX_RENDERBUFFER_SIZE: u32 = 0x84E8;
const GL_MAX_VERTEX_ATTRIBS: u32 = 0x8869;
const GL_MAX_TEXTURE_IMAGE_UNITS: u32 = 0x8872;
const GL_VERTEX_SHADER: u32 = 0x8B31;
const GL_FRAGMENT_SHADER: u32 = 0x8B30;
const GL_COMPILE_STATUS: u32 = 0x8B81;
const GL_INFO_LOG_LENGTH: u32 = 0x8B84;

type PfnGetError = unsafe extern "C" fn() -> u32;
type PfnGetString = unsafe extern "C" fn(u32) -> *const u8;
type PfnGetIntegerv = unsafe extern "C" fn(u32, *mut i32);
type PfnCreateShader = unsafe extern "C" fn(u32) -> u32;
type PfnShaderSource = unsafe extern "C" fn(u32, i32, *const *const c_char, *const i32);
type PfnCompileShader = unsafe extern "C" fn(u32);
type PfnGetShaderiv = unsafe extern "C" fn(u32, u32, *mut i32);
type PfnGetShaderInfoLog = unsafe extern "C" fn(u32, i32, *mut i32, *mut c_char);
type PfnDeleteShader = unsafe extern "C" fn(u32);

/// Library names probed when no explicit path is configured.
const DEFAULT_LIBRARY_NAMES: &[&str] = &[
    "libGLESv2.so.2",
    "libGLESv2.so",
    "libGLESv2.dylib",
    "libGLESv2.dll",
];

pub struct SystemPlatform;

impl Platform for SystemPlatform {
    fn create_library(
        &self,
        kind: LibraryType,
        path: Option<&Path>,
    ) -> Result<Box<dyn Library>, HarnessError> {
        match kind {
            LibraryType::OpenGlEs2 => Ok(Box::new(SystemLibrary::load(path)?)),
        }
    }
}

/// Symbol lookup over a dynamically opened driver library.
#[derive(Debug)]
pub struct DynamicFunctionLibrary {
    library: libloading::Library,
    name: String,
}

impl DynamicFunctionLibrary {
    pub fn open(explicit: Option<&Path>) -> Result<Self, HarnessError> {
        if let Some(path) = explicit {
            // SAFETY: loading a shared library runs its initializers; the
            // caller asked for exactly this library.
            return unsafe { libloading::Library::new(path) }
                .map(|library| Self {
                    library,
                    name: path.display().to_string(),
                })
                .map_err(|e| HarnessError::DriverLoad {
                    reason: format!("cannot open '{}': {}", path.display(), e),
                });
        }
        for candidate in DEFAULT_LIBRARY_NAMES {
            // SAFETY: as above, for the platform's conventional library name.
            if let Ok(library) = unsafe { libloading::Library::new(candidate) } {
                return Ok(Self {
                    library,
                    name: (*candidate).to_string(),
                });
            }
        }
        // None of the conventional names opened; the family cannot be bound
        // on this machine at all.
        Err(HarnessError::DriverUnavailable {
            family: LibraryType::OpenGlEs2.family_name().to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FunctionLibrary for DynamicFunctionLibrary {
    fn get(&self, name: &str) -> Option<EntryPoint> {
        // SAFETY: the symbol is only handed out as an opaque address; the
        // caller chooses a concrete signature before invoking it.
        let symbol = unsafe { self.library.get::<unsafe extern "C" fn()>(name.as_bytes()) }.ok()?;
        Some(*symbol as *const c_void)
    }
}

/// Entry points the harness resolves eagerly at load time.
#[derive(Clone, Copy)]
struct GlEntryPoints {
    get_error: PfnGetError,
    get_string: PfnGetString,
    get_integerv: PfnGetIntegerv,
    create_shader: PfnCreateShader,
    shader_source: PfnShaderSource,
    compile_shader: PfnCompileShader,
    get_shaderiv: PfnGetShaderiv,
    get_shader_info_log: PfnGetShaderInfoLog,
    delete_shader: PfnDeleteShader,
}

fn required(functions: &dyn FunctionLibrary, name: &'static str) -> Result<EntryPoint, HarnessError> {
    functions.get(name).ok_or_else(|| HarnessError::DriverLoad {
        reason: format!("required entry point '{name}' is missing"),
    })
}

impl GlEntryPoints {
    fn resolve(functions: &dyn FunctionLibrary) -> Result<Self, HarnessError> {
        // SAFETY: each address was resolved under the exported GLES2 name,
        // whose signature is fixed by the API; transmuting to that signature
        // is the documented way to call it.
        unsafe {
            Ok(Self {
                get_error: std::mem::transmute::<EntryPoint, PfnGetError>(required(
                    functions,
                    "glGetError",
                )?),
                get_string: std::mem::transmute::<EntryPoint, PfnGetString>(required(
                    functions,
                    "glGetString",
                )?),
                get_integerv: std::mem::transmute::<EntryPoint, PfnGetIntegerv>(required(
                    functions,
                    "glGetIntegerv",
                )?),
                create_shader: std::mem::transmute::<EntryPoint, PfnCreateShader>(required(
                    functions,
                    "glCreateShader",
                )?),
                shader_source: std::mem::transmute::<EntryPoint, PfnShaderSource>(required(
                    functions,
                    "glShaderSource",
                )?),
                compile_shader: std::mem::transmute::<EntryPoint, PfnCompileShader>(required(
                    functions,
                    "glCompileShader",
                )?),
                get_shaderiv: std::mem::transmute::<EntryPoint, PfnGetShaderiv>(required(
                    functions,
                    "glGetShaderiv",
                )?),
                get_shader_info_log: std::mem::transmute::<EntryPoint, PfnGetShaderInfoLog>(
                    required(functions, "glGetShaderInfoLog")?,
                ),
                delete_shader: std::mem::transmute::<EntryPoint, PfnDeleteShader>(required(
                    functions,
                    "glDeleteShader",
                )?),
            })
        }
    }
}

pub struct SystemLibrary {
    functions: DynamicFunctionLibrary,
    driver: SystemDriver,
}

impl SystemLibrary {
    pub fn load(path: Option<&Path>) -> Result<Self, HarnessError> {
        let functions = DynamicFunctionLibrary::open(path)?;
        let driver = SystemDriver {
            entries: GlEntryPoints::resolve(&functions)?,
        };
        Ok(Self { functions, driver })
    }
}

impl Library for SystemLibrary {
    fn function_library(&self) -> &dyn FunctionLibrary {
        &self.functions
    }

    fn driver(&self) -> Option<&dyn GlDriver> {
        Some(&self.driver)
    }
}

pub struct SystemDriver {
    entries: GlEntryPoints,
}

impl SystemDriver {
    fn check_error(&self, function: &'static str) -> Result<(), DriverCallError> {
        // SAFETY: glGetError takes no arguments and is always legal to call.
        let error = unsafe { (self.entries.get_error)() };
        match error {
            GL_NO_ERROR => Ok(()),
            GL_INVALID_ENUM => Err(DriverCallError::Unsupported(function.to_string())),
            other => Err(DriverCallError::Call {
                function,
                reason: format!("GL error 0x{other:04X}"),
            }),
        }
    }
}

impl GlDriver for SystemDriver {
    fn get_string(&self, query: StringQuery) -> Result<String, DriverCallError> {
        let pname = match query {
            StringQuery::Vendor => GL_VENDOR,
            StringQuery::Renderer => GL_RENDERER,
            StringQuery::Version => GL_VERSION,
            StringQuery::ShadingLanguageVersion => GL_SHADING_LANGUAGE_VERSION,
            StringQuery::Extensions => GL_EXTENSIONS,
        };
        // SAFETY: pname is one of the enumerants glGetString accepts.
        let ptr = unsafe { (self.entries.get_string)(pname) };
        if ptr.is_null() {
            return Err(DriverCallError::Call {
                function: "glGetString",
                reason: format!("{} query returned NULL", query.name()),
            });
        }
        // SAFETY: a non-null glGetString result is a NUL-terminated string
        // owned by the driver, valid until the context changes.
        let text = unsafe { CStr::from_ptr(ptr as *const c_char) };
        Ok(text.to_string_lossy().into_owned())
    }

    fn get_limit(&self, query: LimitQuery) -> Result<i64, DriverCallError> {
        let pname = match query {
            LimitQuery::MaxTextureSize => GL_MAX_TEXTURE_SIZE,
            LimitQuery::MaxCubeMapTextureSize => GL_MAX_CUBE_MAP_TEXTURE_SIZE,
            LimitQuery::MaxRenderbufferSize => GL_MAX_RENDERBUFFER_SIZE,
            LimitQuery::MaxVertexAttribs => GL_MAX_VERTEX_ATTRIBS,
            LimitQuery::MaxTextureImageUnits => GL_MAX_TEXTURE_IMAGE_UNITS,
        };
        let mut value: i32 = 0;
        // SAFETY: glGetIntegerv writes one integer for these enumerants.
        unsafe { (self.entries.get_integerv)(pname, &mut value) };
        self.check_error("glGetIntegerv")?;
        Ok(i64::from(value))
    }

    fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderCompilation, DriverCallError> {
        let kind = match stage {
            ShaderStage::Vertex => GL_VERTEX_SHADER,
            ShaderStage::Fragment => GL_FRAGMENT_SHADER,
        };
        // SAFETY: source stays alive across the glShaderSource call and is
        // passed with an explicit length, so no NUL terminator is needed.
        unsafe {
            let shader = (self.entries.create_shader)(kind);
            if shader == 0 {
                return Err(DriverCallError::Call {
                    function: "glCreateShader",
                    reason: "returned object 0".to_string(),
                });
            }
            let ptr = source.as_ptr() as *const c_char;
            let len = source.len() as i32;
            (self.entries.shader_source)(shader, 1, &ptr, &len);
            (self.entries.compile_shader)(shader);

            let mut status: i32 = 0;
            (self.entries.get_shaderiv)(shader, GL_COMPILE_STATUS, &mut status);
            let mut log_len: i32 = 0;
            (self.entries.get_shaderiv)(shader, GL_INFO_LOG_LENGTH, &mut log_len);
            let info_log = if log_len > 1 {
                let mut buffer = vec![0u8; log_len as usize];
                let mut written: i32 = 0;
                (self.entries.get_shader_info_log)(
                    shader,
                    log_len,
                    &mut written,
                    buffer.as_mut_ptr() as *mut c_char,
                );
                buffer.truncate(written.max(0) as usize);
                String::from_utf8_lossy(&buffer).into_owned()
            } else {
                String::new()
            };
            (self.entries.delete_shader)(shader);

            Ok(ShaderCompilation {
                compiled: status != 0,
                info_log,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_with_bogus_path_is_a_driver_load_error() {
        let err = DynamicFunctionLibrary::open(Some(Path::new("/nonexistent/libGLESv2.so")))
            .unwrap_err();
        assert!(matches!(err, HarnessError::DriverLoad { .. }));
    }
}
