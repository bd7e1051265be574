//! Tests for the binary artifact codec and signing.
mod common;
use common::*;
use kairo::codec::{ArtifactWriter, read_artifact};
use kairo::description::{IconResolution, IconSet};
use kairo::error::CodecError;
use md5::{Digest, Md5};

// Header field offsets.
const OFF_MD5: usize = 9;
const OFF_FILE_LENGTH: usize = 29;
const OFF_CONTENT_OFFSET: usize = 33;
const OFF_ITEM_COUNT: usize = 37;

fn encode(description: &kairo::description::ComponentDescription) -> Vec<u8> {
    let mut bytes = Vec::new();
    ArtifactWriter::new(description)
        .write(&mut bytes)
        .expect("encoding should succeed");
    bytes
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn iconed_description() -> kairo::description::ComponentDescription {
    let mut description = resistor_description();
    description.metadata.icon = Some(IconSet {
        resolutions: vec![
            IconResolution {
                size: 32,
                mime_type: "image/png".to_string(),
                data: vec![0x89, 0x50, 0x4e, 0x47, 1, 2, 3],
            },
            IconResolution {
                size: 64,
                mime_type: "image/png".to_string(),
                data: vec![0x89, 0x50, 0x4e, 0x47, 9, 8, 7],
            },
        ],
    });
    description
}

#[test]
fn test_roundtrip_reproduces_description() {
    let description = iconed_description();
    let bytes = encode(&description);

    let contents = read_artifact(&mut bytes.as_slice(), None).unwrap();
    assert_eq!(contents.components.len(), 1);
    assert_eq!(contents.components[0], description);
    assert_eq!(contents.resources.len(), 2);
    assert!(contents.signature.is_none());
}

#[test]
fn test_roundtrip_is_byte_identical() {
    let description = iconed_description();
    let first = encode(&description);

    let contents = read_artifact(&mut first.as_slice(), None).unwrap();
    let second = encode(&contents.components[0]);
    assert_eq!(first, second);
}

#[test]
fn test_wrong_magic_fails_without_panicking() {
    let mut bytes = encode(&resistor_description());
    bytes[0] ^= 0xff;
    assert!(matches!(
        read_artifact(&mut bytes.as_slice(), None),
        Err(CodecError::BadMagic)
    ));
}

#[test]
fn test_truncated_artifact_fails_whole_read() {
    let bytes = encode(&resistor_description());
    for len in [0, 10, 40, bytes.len() / 2] {
        let mut slice = &bytes[..len];
        assert!(
            read_artifact(&mut slice, None).is_err(),
            "a {len}-byte prefix must not decode"
        );
    }
}

#[test]
fn test_corrupted_content_fails_hash_check() {
    let mut bytes = encode(&resistor_description());
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    assert!(matches!(
        read_artifact(&mut bytes.as_slice(), None),
        Err(CodecError::HashMismatch)
    ));
}

#[test]
fn test_unsupported_version_is_rejected() {
    let mut bytes = encode(&resistor_description());
    bytes[8] = 0x7f;
    assert!(matches!(
        read_artifact(&mut bytes.as_slice(), None),
        Err(CodecError::UnsupportedVersion(0x7f))
    ));
}

#[test]
fn test_unknown_item_tags_are_skipped() {
    let description = resistor_description();
    let bytes = encode(&description);

    let content_offset = read_u32(&bytes, OFF_CONTENT_OFFSET) as usize;
    let item_count = read_u32(&bytes, OFF_ITEM_COUNT);

    // Splice an unknown item ahead of the real content and fix the header.
    let mut unknown = Vec::new();
    unknown.extend_from_slice(&0x7777u16.to_le_bytes());
    unknown.extend_from_slice(&3u32.to_le_bytes());
    unknown.extend_from_slice(&[9, 9, 9]);

    let mut content = unknown;
    content.extend_from_slice(&bytes[content_offset..]);

    let mut spliced = bytes[..content_offset].to_vec();
    spliced.extend_from_slice(&content);
    let md5: [u8; 16] = Md5::digest(&content).into();
    spliced[OFF_MD5..OFF_MD5 + 16].copy_from_slice(&md5);
    write_u32(
        &mut spliced,
        OFF_FILE_LENGTH,
        (content_offset + content.len()) as u32,
    );
    write_u32(&mut spliced, OFF_ITEM_COUNT, item_count + 1);

    let contents = read_artifact(&mut spliced.as_slice(), None).unwrap();
    assert_eq!(contents.components.len(), 1);
    assert_eq!(contents.components[0], description);
}

#[test]
fn test_signed_roundtrip_reports_valid_and_trusted() {
    let (signer, verifier) = test_signer();
    let description = resistor_description();

    let mut bytes = Vec::new();
    ArtifactWriter::new(&description)
        .with_signer(&signer)
        .write(&mut bytes)
        .unwrap();

    let trusting = verifier.clone().trust(b"unit-test-certificate".to_vec());
    let contents = read_artifact(&mut bytes.as_slice(), Some(&trusting)).unwrap();
    assert_eq!(contents.components[0], description);

    let report = contents.signature.expect("signing block present");
    let outcome = report.outcome.expect("verifier supplied");
    assert!(outcome.signature_valid);
    assert!(outcome.certificate_trusted);
    assert_eq!(report.certificate, b"unit-test-certificate");
}

#[test]
fn test_signature_validity_and_trust_are_independent() {
    let (signer, verifier) = test_signer();
    let description = resistor_description();

    let mut bytes = Vec::new();
    ArtifactWriter::new(&description)
        .with_signer(&signer)
        .write(&mut bytes)
        .unwrap();

    // Valid signature, certificate not in the trusted set.
    let untrusting = verifier.clone();
    let contents = read_artifact(&mut bytes.as_slice(), Some(&untrusting)).unwrap();
    let outcome = contents.signature.unwrap().outcome.unwrap();
    assert!(outcome.signature_valid);
    assert!(!outcome.certificate_trusted);

    // Tampered signature, certificate trusted. The signature bytes sit after
    // the gate byte and the 20-byte digest; flipping one invalidates the
    // signature without touching the content.
    let mut tampered = bytes.clone();
    let sig_start = 41 + 1 + 20 + 4;
    tampered[sig_start] ^= 0xff;
    let trusting = verifier.trust(b"unit-test-certificate".to_vec());
    let contents = read_artifact(&mut tampered.as_slice(), Some(&trusting)).unwrap();
    let outcome = contents.signature.unwrap().outcome.unwrap();
    assert!(!outcome.signature_valid);
    assert!(outcome.certificate_trusted);
}

#[test]
fn test_unverified_signature_is_reported_as_data() {
    let (signer, _) = test_signer();
    let mut bytes = Vec::new();
    ArtifactWriter::new(&resistor_description())
        .with_signer(&signer)
        .write(&mut bytes)
        .unwrap();

    // No verifier: the block is surfaced, no judgement is made.
    let contents = read_artifact(&mut bytes.as_slice(), None).unwrap();
    let report = contents.signature.unwrap();
    assert!(report.outcome.is_none());
    assert!(!report.signature.is_empty());
}
