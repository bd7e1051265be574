use super::signing::ArtifactSigner;
use super::{
    ComponentPayload, FORMAT_VERSION, HEADER_LEN, ITEM_COMPONENT, ITEM_RESOURCE, IconReference,
    IconResourceRef, MAGIC, ResourceItem, ResourceType, put_bytes, put_u16, put_u32,
};
use crate::description::{ComponentDescription, IconSet};
use crate::error::CodecError;
use bincode::config::standard;
use bincode::serde::encode_to_vec;
use md5::{Digest, Md5};
use sha1::Sha1;
use std::io::Write;

/// Encodes one component description (and its icon resources) into the
/// binary artifact format, optionally signing the content section.
pub struct ArtifactWriter<'a> {
    description: &'a ComponentDescription,
    signer: Option<&'a dyn ArtifactSigner>,
}

impl<'a> ArtifactWriter<'a> {
    pub fn new(description: &'a ComponentDescription) -> Self {
        Self {
            description,
            signer: None,
        }
    }

    pub fn with_signer(mut self, signer: &'a dyn ArtifactSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Writes the artifact. The output stream stays open; closing it is the
    /// caller's job.
    pub fn write(&self, out: &mut dyn Write) -> Result<(), CodecError> {
        let content = self.build_content()?;

        let md5: [u8; 16] = Md5::digest(&content).into();

        let mut signing_block = Vec::new();
        match self.signer {
            None => signing_block.push(0u8),
            Some(signer) => {
                let sha1: [u8; 20] = Sha1::digest(&content).into();
                let signed = signer.sign(&sha1)?;
                signing_block.push(1u8);
                signing_block.extend_from_slice(&sha1);
                put_bytes(&mut signing_block, &signed.signature);
                put_bytes(&mut signing_block, &signed.certificate);
            }
        }

        let content_offset = HEADER_LEN + signing_block.len();
        let file_length = content_offset + content.len();
        let item_count = self.item_count();

        let mut header = Vec::with_capacity(HEADER_LEN);
        header.extend_from_slice(&MAGIC);
        header.push(FORMAT_VERSION);
        header.extend_from_slice(&md5);
        header.extend_from_slice(&[0u8; 4]);
        put_u32(&mut header, file_length as u32);
        put_u32(&mut header, content_offset as u32);
        put_u32(&mut header, item_count as u32);

        out.write_all(&header)?;
        out.write_all(&signing_block)?;
        out.write_all(&content)?;

        tracing::debug!(
            component = %self.description.name,
            bytes = file_length,
            items = item_count,
            signed = self.signer.is_some(),
            "artifact encoded"
        );
        Ok(())
    }

    fn item_count(&self) -> usize {
        let resolutions = |icon: &Option<IconSet>| {
            icon.as_ref().map(|i| i.resolutions.len()).unwrap_or(0)
        };
        let mut count = 1; // the component item
        count += resolutions(&self.description.metadata.icon);
        for config in &self.description.metadata.configurations {
            count += resolutions(&config.icon);
        }
        count
    }

    fn build_content(&self) -> Result<Vec<u8>, CodecError> {
        // Icon bytes move into resource items; the serialized description
        // keeps only references.
        let mut stripped = self.description.clone();
        let mut resources = Vec::new();
        let mut icons = Vec::new();
        let mut next_id = 0u32;

        if let Some(icon) = stripped.metadata.icon.take() {
            icons.push(extract_icon(None, icon, &mut resources, &mut next_id));
        }
        for config in &mut stripped.metadata.configurations {
            if let Some(icon) = config.icon.take() {
                icons.push(extract_icon(
                    Some(config.name.clone()),
                    icon,
                    &mut resources,
                    &mut next_id,
                ));
            }
        }

        let mut content = Vec::new();
        for resource in &resources {
            let mut payload = Vec::new();
            put_u32(&mut payload, resource.id);
            payload.push(resource.resource_type.tag());
            put_bytes(&mut payload, &resource.data);
            put_item(&mut content, ITEM_RESOURCE, &payload);
        }

        let payload = encode_to_vec(
            ComponentPayload {
                description: stripped,
                icons,
            },
            standard(),
        )
        .map_err(|e| CodecError::Payload(e.to_string()))?;
        put_item(&mut content, ITEM_COMPONENT, &payload);

        Ok(content)
    }
}

fn put_item(content: &mut Vec<u8>, tag: u16, payload: &[u8]) {
    put_u16(content, tag);
    put_bytes(content, payload);
}

fn extract_icon(
    configuration: Option<String>,
    icon: IconSet,
    resources: &mut Vec<ResourceItem>,
    next_id: &mut u32,
) -> IconReference {
    let mut refs = Vec::with_capacity(icon.resolutions.len());
    for resolution in icon.resolutions {
        let id = *next_id;
        *next_id += 1;
        refs.push(IconResourceRef {
            resource_id: id,
            size: resolution.size,
        });
        resources.push(ResourceItem {
            id,
            resource_type: ResourceType::from_mime(&resolution.mime_type),
            data: resolution.data,
        });
    }
    IconReference {
        configuration,
        resources: refs,
    }
}
