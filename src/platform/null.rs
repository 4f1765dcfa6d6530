//! Null driver backend.
//!
//! Satisfies the whole driver contract without touching hardware: every
//! query answers a benign default that meets the ES 2.0 baseline, shader
//! compilation always succeeds, and core entry points resolve to inert
//! stubs. Used for headless environments and for caselist-generation runs
//! that never execute GPU work.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;

use super::{
    DriverCallError, EntryPoint, FunctionLibrary, GlDriver, Library, LibraryType, LimitQuery,
    Platform, ShaderCompilation, ShaderStage, StringQuery, CORE_ENTRY_POINTS,
};
use crate::errors::HarnessError;

pub struct NullPlatform;

impl Platform for NullPlatform {
    fn create_library(
        &self,
        kind: LibraryType,
        _path: Option<&Path>,
    ) -> Result<Box<dyn Library>, HarnessError> {
        match kind {
            LibraryType::OpenGlEs2 => Ok(Box::new(NullLibrary::new())),
        }
    }
}

pub struct NullLibrary {
    functions: NullFunctionLibrary,
    driver: NullDriver,
}

impl NullLibrary {
    pub fn new() -> Self {
        Self {
            functions: NullFunctionLibrary,
            driver: NullDriver,
        }
    }
}

impl Default for NullLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl Library for NullLibrary {
    fn function_library(&self) -> &dyn FunctionLibrary {
        &self.functions
    }

    fn driver(&self) -> Option<&dyn GlDriver> {
        Some(&self.driver)
    }
}

static CORE_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| CORE_ENTRY_POINTS.iter().copied().collect());

extern "C" fn null_entry() {}

pub struct NullFunctionLibrary;

impl FunctionLibrary for NullFunctionLibrary {
    fn get(&self, name: &str) -> Option<EntryPoint> {
        // Core entry points resolve to an inert stub; anything else behaves
        // like a missing symbol so capability probes stay meaningful.
        CORE_SET
            .contains(name)
            .then(|| (null_entry as extern "C" fn()) as EntryPoint)
    }
}

pub struct NullDriver;

impl GlDriver for NullDriver {
    fn get_string(&self, query: StringQuery) -> Result<String, DriverCallError> {
        let value = match query {
            StringQuery::Vendor => "Crucible",
            StringQuery::Renderer => "null",
            StringQuery::Version => "OpenGL ES 2.0 (null)",
            StringQuery::ShadingLanguageVersion => "OpenGL ES GLSL ES 1.00 (null)",
            StringQuery::Extensions => "",
        };
        Ok(value.to_string())
    }

    fn get_limit(&self, query: LimitQuery) -> Result<i64, DriverCallError> {
        let value = match query {
            LimitQuery::MaxTextureSize => 2048,
            LimitQuery::MaxCubeMapTextureSize => 2048,
            LimitQuery::MaxRenderbufferSize => 2048,
            LimitQuery::MaxVertexAttribs => 16,
            LimitQuery::MaxTextureImageUnits => 16,
        };
        Ok(value)
    }

    fn compile_shader(
        &self,
        _stage: ShaderStage,
        _source: &str,
    ) -> Result<ShaderCompilation, DriverCallError> {
        Ok(ShaderCompilation {
            compiled: true,
            info_log: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_creation_always_succeeds() {
        let platform = NullPlatform;
        let library = platform.create_library(LibraryType::OpenGlEs2, None).unwrap();
        assert!(library.driver().is_some());
    }

    #[test]
    fn core_entry_points_resolve_to_stubs() {
        let library = NullLibrary::new();
        let functions = library.function_library();
        for name in CORE_ENTRY_POINTS {
            assert!(functions.get(name).is_some(), "missing stub for {name}");
        }
        assert!(functions.get("glNotARealFunction").is_none());
    }

    #[test]
    fn queries_answer_es2_baseline_defaults() {
        let driver = NullDriver;
        let version = driver.get_string(StringQuery::Version).unwrap();
        assert!(version.starts_with("OpenGL ES 2.0"));
        assert!(driver.get_limit(LimitQuery::MaxTextureSize).unwrap() >= 64);
        assert!(driver.get_limit(LimitQuery::MaxVertexAttribs).unwrap() >= 8);
    }

    #[test]
    fn shader_compilation_reports_success() {
        let driver = NullDriver;
        let result = driver
            .compile_shader(ShaderStage::Vertex, "void main() {}")
            .unwrap();
        assert!(result.compiled);
        assert!(result.info_log.is_empty());
    }
}
