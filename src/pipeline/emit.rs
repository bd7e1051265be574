//! The Emit stage: binary-encodes the description, optionally signing it
//! with a certificate resolved by thumbprint from the key store.

use super::CompileOptions;
use super::context::CompileContext;
use super::diagnostics::Diagnostic;
use crate::codec::{ArtifactSigner, ArtifactWriter, KeyStore};

pub(super) fn run(
    ctx: &mut CompileContext<'_>,
    options: &CompileOptions,
    key_store: Option<&dyn KeyStore>,
) {
    let Some(description) = ctx.description.clone() else {
        return;
    };

    let mut description = description;
    if !options.write_extended_metadata {
        description.metadata.author.clear();
        description.metadata.version.clear();
    }

    let signer: Option<Box<dyn ArtifactSigner>> = match &options.certificate_thumbprint {
        None => None,
        Some(thumbprint) => {
            let Some(store) = key_store else {
                ctx.report(Diagnostic::error(format!(
                    "Signing with '{thumbprint}' requested but no key store is available"
                )));
                return;
            };
            match store.resolve_signer(thumbprint) {
                Ok(Some(signer)) => Some(signer),
                Ok(None) => {
                    ctx.report(Diagnostic::error(format!(
                        "No certificate matches thumbprint '{thumbprint}'"
                    )));
                    return;
                }
                Err(e) => {
                    ctx.report(Diagnostic::error(format!(
                        "Key store lookup for '{thumbprint}' failed: {e}"
                    )));
                    return;
                }
            }
        }
    };

    let mut writer = ArtifactWriter::new(&description);
    if let Some(signer) = signer.as_deref() {
        writer = writer.with_signer(signer);
    }
    if let Err(e) = writer.write(&mut *ctx.output) {
        ctx.report(Diagnostic::error(format!("Failed to encode artifact: {e}")));
    }
}
