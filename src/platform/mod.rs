//! Driver abstraction: `Platform` → `Library` → `FunctionLibrary`/`GlDriver`.
//!
//! Test logic never knows which backend it is running against. Everything
//! downstream of the bootstrap depends only on these traits; the choice
//! between the dynamically loaded system driver and the self-contained null
//! stub is made exactly once, in [`create_platform`]. In particular,
//! [`Library::function_library`] returns a usable handle in *every* variant
//! so that no call site ever has to branch on the concrete backend.

use std::ffi::c_void;
use std::path::Path;

use thiserror::Error;

use crate::config::DriverKind;
use crate::errors::HarnessError;

pub mod null;
pub mod system;

/// API families a platform can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryType {
    OpenGlEs2,
}

impl LibraryType {
    pub fn family_name(&self) -> &'static str {
        match self {
            LibraryType::OpenGlEs2 => "OpenGL ES 2.0",
        }
    }
}

/// Raw address of a native API entry point.
pub type EntryPoint = *const c_void;

/// Factory for driver bindings of one API family.
///
/// A platform is stateless; the bootstrap owns the single instance for the
/// whole run and passes it down by reference.
pub trait Platform {
    /// Instantiates a library for `kind`, optionally from an explicit path.
    fn create_library(
        &self,
        kind: LibraryType,
        path: Option<&Path>,
    ) -> Result<Box<dyn Library>, HarnessError>;
}

/// One bound driver library.
pub trait Library {
    /// Native symbol lookup. Usable in every variant, including the null one.
    fn function_library(&self) -> &dyn FunctionLibrary;

    /// The typed call surface test cases program against, when the variant
    /// provides one.
    fn driver(&self) -> Option<&dyn GlDriver>;
}

/// Name-to-address lookup over a native library.
pub trait FunctionLibrary {
    fn get(&self, name: &str) -> Option<EntryPoint>;
}

/// String-valued queries of the GL context state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringQuery {
    Vendor,
    Renderer,
    Version,
    ShadingLanguageVersion,
    Extensions,
}

impl StringQuery {
    pub fn name(&self) -> &'static str {
        match self {
            StringQuery::Vendor => "GL_VENDOR",
            StringQuery::Renderer => "GL_RENDERER",
            StringQuery::Version => "GL_VERSION",
            StringQuery::ShadingLanguageVersion => "GL_SHADING_LANGUAGE_VERSION",
            StringQuery::Extensions => "GL_EXTENSIONS",
        }
    }
}

/// Integer-valued implementation limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitQuery {
    MaxTextureSize,
    MaxCubeMapTextureSize,
    MaxRenderbufferSize,
    MaxVertexAttribs,
    MaxTextureImageUnits,
}

impl LimitQuery {
    pub fn name(&self) -> &'static str {
        match self {
            LimitQuery::MaxTextureSize => "GL_MAX_TEXTURE_SIZE",
            LimitQuery::MaxCubeMapTextureSize => "GL_MAX_CUBE_MAP_TEXTURE_SIZE",
            LimitQuery::MaxRenderbufferSize => "GL_MAX_RENDERBUFFER_SIZE",
            LimitQuery::MaxVertexAttribs => "GL_MAX_VERTEX_ATTRIBS",
            LimitQuery::MaxTextureImageUnits => "GL_MAX_TEXTURE_IMAGE_UNITS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Result of compiling one shader.
#[derive(Debug, Clone)]
pub struct ShaderCompilation {
    pub compiled: bool,
    pub info_log: String,
}

/// Failure of a single driver call.
///
/// These never abort the run; the case boundary converts them into outcome
/// records.
#[derive(Debug, Error)]
pub enum DriverCallError {
    #[error("{function} failed: {reason}")]
    Call {
        function: &'static str,
        reason: String,
    },
    #[error("{0} is not supported by the active driver")]
    Unsupported(String),
}

/// The typed driver interface exposed to test cases.
pub trait GlDriver {
    fn get_string(&self, query: StringQuery) -> Result<String, DriverCallError>;
    fn get_limit(&self, query: LimitQuery) -> Result<i64, DriverCallError>;
    fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderCompilation, DriverCallError>;
}

/// Entry points every conforming OpenGL ES 2.0 implementation exports.
///
/// Not the full API, but the subset the harness and its built-in cases rely
/// on for symbol-presence probes.
pub const CORE_ENTRY_POINTS: &[&str] = &[
    "glActiveTexture",
    "glAttachShader",
    "glBindBuffer",
    "glBindTexture",
    "glBlendFunc",
    "glBufferData",
    "glClear",
    "glClearColor",
    "glCompileShader",
    "glCreateProgram",
    "glCreateShader",
    "glDeleteProgram",
    "glDeleteShader",
    "glDeleteTextures",
    "glDrawArrays",
    "glDrawElements",
    "glEnable",
    "glGenBuffers",
    "glGenTextures",
    "glGetError",
    "glGetIntegerv",
    "glGetProgramiv",
    "glGetShaderInfoLog",
    "glGetShaderiv",
    "glGetString",
    "glLinkProgram",
    "glShaderSource",
    "glTexImage2D",
    "glUniform1i",
    "glUseProgram",
    "glVertexAttribPointer",
    "glViewport",
];

/// The process-wide platform factory.
///
/// Invoked exactly once at startup; the result is exclusively owned by the
/// bootstrap and handed down by reference. There is no hidden singleton.
pub fn create_platform(kind: DriverKind) -> Box<dyn Platform> {
    match kind {
        DriverKind::Null => Box::new(null::NullPlatform),
        DriverKind::System => Box::new(system::SystemPlatform),
    }
}
