//! `dEQP-GLES2.capability.*` — entry-point presence and implementation
//! limits, checked against the ES 2.0 baseline minima.

use super::{CaseContext, CaseError, CaseRegistry, CaseStatus, CASE_ROOT};
use crate::platform::{LimitQuery, StringQuery, CORE_ENTRY_POINTS};

pub fn register(registry: &mut CaseRegistry) {
    registry.register(format!("{CASE_ROOT}.capability.entry_points"), entry_points);
    registry.register(
        format!("{CASE_ROOT}.capability.max_texture_size"),
        max_texture_size,
    );
    registry.register(
        format!("{CASE_ROOT}.capability.max_cube_map_texture_size"),
        max_cube_map_texture_size,
    );
    registry.register(
        format!("{CASE_ROOT}.capability.max_renderbuffer_size"),
        max_renderbuffer_size,
    );
    registry.register(
        format!("{CASE_ROOT}.capability.max_vertex_attribs"),
        max_vertex_attribs,
    );
    registry.register(
        format!("{CASE_ROOT}.capability.max_texture_image_units"),
        max_texture_image_units,
    );
    registry.register(format!("{CASE_ROOT}.capability.npot_textures"), npot_textures);
    registry.register(
        format!("{CASE_ROOT}.capability.surface_dimensions"),
        surface_dimensions,
    );
}

fn entry_points(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    let functions = ctx.functions();
    let missing: Vec<&str> = CORE_ENTRY_POINTS
        .iter()
        .copied()
        .filter(|name| functions.get(name).is_none())
        .collect();
    if missing.is_empty() {
        Ok(CaseStatus::pass(format!(
            "all {} core entry points present",
            CORE_ENTRY_POINTS.len()
        )))
    } else {
        Ok(CaseStatus::fail(format!(
            "missing entry points: {}",
            missing.join(", ")
        )))
    }
}

fn check_limit(
    ctx: &mut CaseContext<'_>,
    query: LimitQuery,
    minimum: i64,
) -> Result<CaseStatus, CaseError> {
    let value = ctx.driver()?.get_limit(query)?;
    ctx.report_number(query.name(), value as f64);
    if value >= minimum {
        Ok(CaseStatus::pass(format!("{} = {value}", query.name())))
    } else {
        Ok(CaseStatus::fail(format!(
            "{} = {value}, below the required minimum {minimum}",
            query.name()
        )))
    }
}

fn max_texture_size(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    check_limit(ctx, LimitQuery::MaxTextureSize, 64)
}

fn max_cube_map_texture_size(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    check_limit(ctx, LimitQuery::MaxCubeMapTextureSize, 16)
}

fn max_renderbuffer_size(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    check_limit(ctx, LimitQuery::MaxRenderbufferSize, 1)
}

fn max_vertex_attribs(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    check_limit(ctx, LimitQuery::MaxVertexAttribs, 8)
}

fn max_texture_image_units(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    check_limit(ctx, LimitQuery::MaxTextureImageUnits, 8)
}

fn npot_textures(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    let extensions = ctx.driver()?.get_string(StringQuery::Extensions)?;
    if extensions
        .split_whitespace()
        .any(|name| name == "GL_OES_texture_npot")
    {
        Ok(CaseStatus::pass("GL_OES_texture_npot advertised"))
    } else {
        Err(CaseError::Unsupported("GL_OES_texture_npot".to_string()))
    }
}

/// Checks that the requested surface fits inside the driver's render limits.
fn surface_dimensions(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    let limit = ctx.driver()?.get_limit(LimitQuery::MaxRenderbufferSize)?;
    let surface = ctx.config().surface;
    ctx.report_number("SurfaceWidth", f64::from(surface.width));
    ctx.report_number("SurfaceHeight", f64::from(surface.height));
    if i64::from(surface.width) <= limit && i64::from(surface.height) <= limit {
        Ok(CaseStatus::pass(format!(
            "{}x{} fits within GL_MAX_RENDERBUFFER_SIZE {limit}",
            surface.width, surface.height
        )))
    } else {
        Err(CaseError::Unsupported(format!(
            "{}x{} surface exceeds GL_MAX_RENDERBUFFER_SIZE {limit}",
            surface.width, surface.height
        )))
    }
}
