use super::signing::{SignatureOutcome, SignatureVerifier};
use super::{
    ArtifactContents, ByteReader, ComponentPayload, FORMAT_VERSION, HEADER_LEN, ITEM_COMPONENT,
    ITEM_RESOURCE, IconReference, MAGIC, ResourceItem, ResourceType, SignatureReport,
};
use crate::description::{ComponentDescription, IconResolution, IconSet};
use crate::error::CodecError;
use bincode::config::standard;
use bincode::serde::decode_from_slice;
use md5::{Digest, Md5};
use sha1::Sha1;
use std::io::Read;

/// Decodes an artifact from a stream.
///
/// Any structural failure fails the whole read; no partial contents are
/// returned. Unknown item type tags are skipped for forward compatibility.
/// When a verifier is supplied, the signing block's outcome is reported as
/// data alongside the contents; it never fails the read.
pub fn read_artifact(
    input: &mut dyn Read,
    verifier: Option<&dyn SignatureVerifier>,
) -> Result<ArtifactContents, CodecError> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;

    let mut header = ByteReader::new(&buf);
    let magic = header.take(8)?;
    if magic != MAGIC {
        return Err(CodecError::BadMagic);
    }
    let version = header.u8()?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    let stored_md5 = header.take(16)?.to_vec();
    header.take(4)?; // reserved
    let file_length = header.u32()? as usize;
    let content_offset = header.u32()? as usize;
    let item_count = header.u32()?;

    if buf.len() < file_length {
        return Err(CodecError::Truncated {
            offset: buf.len(),
            needed: file_length - buf.len(),
        });
    }
    if content_offset < HEADER_LEN || content_offset > file_length {
        return Err(CodecError::MalformedItem {
            item: "header",
            message: format!("content offset {content_offset} outside the file"),
        });
    }

    let signature = read_signing_block(&buf[HEADER_LEN..content_offset])?;

    let content = &buf[content_offset..file_length];
    let md5: [u8; 16] = Md5::digest(content).into();
    if md5[..] != stored_md5[..] {
        return Err(CodecError::HashMismatch);
    }

    let (components, resources) = read_items(content, item_count)?;

    let signature = signature.map(|block| {
        let sha1: [u8; 20] = Sha1::digest(content).into();
        let outcome = verifier.map(|v| SignatureOutcome {
            signature_valid: block.digest == sha1
                && v.verify_signature(&sha1, &block.signature, &block.certificate),
            certificate_trusted: v.is_trusted(&block.certificate),
        });
        SignatureReport {
            signature: block.signature,
            certificate: block.certificate,
            outcome,
        }
    });

    Ok(ArtifactContents {
        components,
        resources,
        signature,
    })
}

struct SigningBlock {
    digest: [u8; 20],
    signature: Vec<u8>,
    certificate: Vec<u8>,
}

fn read_signing_block(bytes: &[u8]) -> Result<Option<SigningBlock>, CodecError> {
    let mut reader = ByteReader::new(bytes);
    match reader.u8()? {
        0 => Ok(None),
        _ => {
            let mut digest = [0u8; 20];
            digest.copy_from_slice(reader.take(20)?);
            let signature = reader.bytes()?.to_vec();
            let certificate = reader.bytes()?.to_vec();
            Ok(Some(SigningBlock {
                digest,
                signature,
                certificate,
            }))
        }
    }
}

fn read_items(
    content: &[u8],
    item_count: u32,
) -> Result<(Vec<ComponentDescription>, Vec<ResourceItem>), CodecError> {
    let mut reader = ByteReader::new(content);
    let mut resources = Vec::new();
    let mut payloads: Vec<ComponentPayload> = Vec::new();

    for _ in 0..item_count {
        let tag = reader.u16()?;
        let payload = reader.bytes()?;
        match tag {
            ITEM_RESOURCE => resources.push(read_resource(payload)?),
            ITEM_COMPONENT => payloads.push(read_component(payload)?),
            unknown => {
                tracing::debug!(tag = unknown, "skipping unknown item type");
            }
        }
    }

    let components = payloads
        .into_iter()
        .map(|payload| attach_icons(payload, &resources))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((components, resources))
}

fn read_resource(payload: &[u8]) -> Result<ResourceItem, CodecError> {
    let mut reader = ByteReader::new(payload);
    let id = reader.u32()?;
    let resource_type = ResourceType::from_tag(reader.u8()?);
    let data = reader.bytes()?.to_vec();
    if reader.remaining() != 0 {
        return Err(CodecError::MalformedItem {
            item: "resource",
            message: format!("{} unexpected trailing byte(s)", reader.remaining()),
        });
    }
    Ok(ResourceItem {
        id,
        resource_type,
        data,
    })
}

fn read_component(payload: &[u8]) -> Result<ComponentPayload, CodecError> {
    let (component, consumed): (ComponentPayload, usize) =
        decode_from_slice(payload, standard()).map_err(|e| CodecError::Payload(e.to_string()))?;
    // Unknown fields inside a known item are not tolerated.
    if consumed != payload.len() {
        return Err(CodecError::MalformedItem {
            item: "component",
            message: format!("{} unexpected trailing byte(s)", payload.len() - consumed),
        });
    }
    Ok(component)
}

fn attach_icons(
    payload: ComponentPayload,
    resources: &[ResourceItem],
) -> Result<ComponentDescription, CodecError> {
    let mut description = payload.description;
    for reference in payload.icons {
        let icon = resolve_icon(&reference, resources)?;
        description.set_icon(reference.configuration.as_deref(), icon);
    }
    Ok(description)
}

fn resolve_icon(
    reference: &IconReference,
    resources: &[ResourceItem],
) -> Result<IconSet, CodecError> {
    let mut icon = IconSet::default();
    for entry in &reference.resources {
        let resource = resources
            .iter()
            .find(|r| r.id == entry.resource_id)
            .ok_or_else(|| CodecError::MalformedItem {
                item: "component",
                message: format!("icon references missing resource {}", entry.resource_id),
            })?;
        icon.resolutions.push(IconResolution {
            size: entry.size,
            mime_type: resource.resource_type.mime_type().to_string(),
            data: resource.data.clone(),
        });
    }
    Ok(icon)
}
