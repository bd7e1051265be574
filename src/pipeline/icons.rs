//! The SetIcons stage: resolves sanitized-name-keyed icon resources at the
//! fixed resolutions and attaches them to the description.

use super::context::CompileContext;
use super::diagnostics::Diagnostic;
use crate::description::{IconResolution, IconSet};
use crate::resources::ResourceProvider;

/// The fixed resolutions icons are compiled at.
pub const ICON_RESOLUTIONS: [u32; 2] = [32, 64];

pub(super) fn run(ctx: &mut CompileContext<'_>, resources: &dyn ResourceProvider) {
    let Some(mut description) = ctx.description.take() else {
        return;
    };

    let mut diagnostics = Vec::new();
    let base = sanitize(&description.name);

    if let Some(icon) = compile_icon(resources, &mut diagnostics, &base) {
        description.metadata.icon = Some(icon);
    }

    let configurations: Vec<String> = description
        .metadata
        .configurations
        .iter()
        .map(|c| c.name.clone())
        .collect();
    for configuration in configurations {
        let key = format!("{base}_{}", sanitize(&configuration));
        if let Some(icon) = compile_icon(resources, &mut diagnostics, &key) {
            description.set_icon(Some(&configuration), icon);
        }
    }

    ctx.diagnostics.extend(diagnostics);
    ctx.description = Some(description);
}

/// Collects whichever resolutions the provider has. A missing resolution is
/// a warning; with none at all, no icon is attached.
fn compile_icon(
    resources: &dyn ResourceProvider,
    diagnostics: &mut Vec<Diagnostic>,
    base: &str,
) -> Option<IconSet> {
    let mut icon = IconSet::default();
    for size in ICON_RESOLUTIONS {
        let name = format!("{base}_{size}.png");
        if !resources.has_resource(&name) {
            diagnostics.push(Diagnostic::warning(format!(
                "Icon resource '{name}' not found"
            )));
            continue;
        }
        match resources.open_resource(&name) {
            Ok(Some(resource)) => {
                let mime_type = resource.mime_type.clone();
                match resource.read_all() {
                    Ok(data) => icon.resolutions.push(IconResolution {
                        size,
                        mime_type,
                        data,
                    }),
                    Err(e) => diagnostics.push(Diagnostic::error(format!(
                        "Failed to read icon resource '{name}': {e}"
                    ))),
                }
            }
            Ok(None) => diagnostics.push(Diagnostic::warning(format!(
                "Icon resource '{name}' not found"
            ))),
            Err(e) => diagnostics.push(Diagnostic::error(format!(
                "Failed to open icon resource '{name}': {e}"
            ))),
        }
    }

    if icon.resolutions.is_empty() {
        None
    } else {
        Some(icon)
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase()
}
