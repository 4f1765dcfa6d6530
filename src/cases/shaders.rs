//! `dEQP-GLES2.shaders.*` — shader build smoke tests over archive sources.
//!
//! Sources live in the resource archive, not in the binary, so the same
//! cases exercise the archive lookup path: a missing file surfaces as a
//! `ResourceError` record rather than a harness failure.

use super::{CaseContext, CaseError, CaseRegistry, CaseStatus, CASE_ROOT};
use crate::platform::ShaderStage;

pub fn register(registry: &mut CaseRegistry) {
    registry.register(
        format!("{CASE_ROOT}.shaders.compile.basic_vertex"),
        basic_vertex,
    );
    registry.register(
        format!("{CASE_ROOT}.shaders.compile.basic_fragment"),
        basic_fragment,
    );
}

fn compile_from_archive(
    ctx: &mut CaseContext<'_>,
    stage: ShaderStage,
    resource: &str,
) -> Result<CaseStatus, CaseError> {
    let source = ctx.read_text_resource(resource)?;
    let result = ctx.driver()?.compile_shader(stage, &source)?;
    if result.compiled {
        if result.info_log.is_empty() {
            Ok(CaseStatus::pass(format!("compiled {resource}")))
        } else {
            // Compiled, but the compiler had something to say about it.
            ctx.message(result.info_log);
            Ok(CaseStatus::quality_warning(format!(
                "compiled {resource} with diagnostics"
            )))
        }
    } else {
        if !result.info_log.is_empty() {
            ctx.message(result.info_log);
        }
        Ok(CaseStatus::fail(format!("failed to compile {resource}")))
    }
}

fn basic_vertex(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    compile_from_archive(ctx, ShaderStage::Vertex, "shaders/basic.vert")
}

fn basic_fragment(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    compile_from_archive(ctx, ShaderStage::Fragment, "shaders/basic.frag")
}
