//! `dEQP-GLES2.info.*` — context information queries.

use super::{CaseContext, CaseError, CaseRegistry, CaseStatus, CASE_ROOT};
use crate::platform::StringQuery;

pub fn register(registry: &mut CaseRegistry) {
    registry.register(format!("{CASE_ROOT}.info.vendor"), vendor);
    registry.register(format!("{CASE_ROOT}.info.renderer"), renderer);
    registry.register(format!("{CASE_ROOT}.info.version"), version);
    registry.register(
        format!("{CASE_ROOT}.info.shading_language_version"),
        shading_language_version,
    );
    registry.register(format!("{CASE_ROOT}.info.extensions"), extensions);
}

fn query_nonempty(
    ctx: &mut CaseContext<'_>,
    query: StringQuery,
) -> Result<CaseStatus, CaseError> {
    let value = ctx.driver()?.get_string(query)?;
    if value.is_empty() {
        return Ok(CaseStatus::fail(format!("{} is empty", query.name())));
    }
    Ok(CaseStatus::pass(value))
}

fn vendor(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    query_nonempty(ctx, StringQuery::Vendor)
}

fn renderer(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    query_nonempty(ctx, StringQuery::Renderer)
}

fn version(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    let value = ctx.driver()?.get_string(StringQuery::Version)?;
    if value.starts_with("OpenGL ES 2.") {
        Ok(CaseStatus::pass(value))
    } else if value.starts_with("OpenGL ES ") {
        // A newer ES context is a valid superset, but worth flagging.
        Ok(CaseStatus::compatibility_warning(value))
    } else {
        Ok(CaseStatus::fail(format!(
            "GL_VERSION '{value}' does not identify an OpenGL ES context"
        )))
    }
}

fn shading_language_version(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    let value = ctx
        .driver()?
        .get_string(StringQuery::ShadingLanguageVersion)?;
    if value.contains("OpenGL ES GLSL ES") {
        Ok(CaseStatus::pass(value))
    } else {
        Ok(CaseStatus::fail(format!(
            "GL_SHADING_LANGUAGE_VERSION '{value}' does not identify GLSL ES"
        )))
    }
}

fn extensions(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    let value = ctx.driver()?.get_string(StringQuery::Extensions)?;
    let names: Vec<&str> = value.split_whitespace().collect();
    for name in &names {
        ctx.message(*name);
    }
    Ok(CaseStatus::pass(format!(
        "{} extensions reported",
        names.len()
    )))
}
