//! End-to-end tests for the compiler pipeline.
mod common;
use common::*;
use kairo::codec::{KeyStore, MemoryKeyStore, read_artifact};
use kairo::description::DescriptionRegistry;
use kairo::pipeline::{CompileOptions, CompileResult, Severity, compile};
use kairo::resources::MemoryResourceProvider;

fn compile_source(
    source: &str,
    provider: &MemoryResourceProvider,
    options: &CompileOptions,
    key_store: Option<&dyn KeyStore>,
) -> (CompileResult, Vec<u8>) {
    let mut input = source.as_bytes();
    let mut output = Vec::new();
    let mut registry = DescriptionRegistry::new();
    let result = compile(
        &mut input,
        &mut output,
        provider,
        options,
        &mut registry,
        key_store,
    );
    (result, output)
}

#[test]
fn test_compile_minimal_wire() {
    let provider = MemoryResourceProvider::new();
    let (result, output) = compile_source(
        WIRE_SOURCE,
        &provider,
        &CompileOptions::default(),
        None,
    );

    assert!(result.success, "diagnostics: {:?}", result.diagnostics);
    assert_eq!(result.component_name.as_deref(), Some("Wire"));
    assert_eq!(
        result.guid.as_deref(),
        Some("6353882b-5208-4f88-983c-18730c6efc4e")
    );
    assert_eq!(result.author.as_deref(), Some("Component Tests"));

    let contents = read_artifact(&mut output.as_slice(), None).unwrap();
    assert_eq!(contents.components.len(), 1);
    let wire = &contents.components[0];
    assert_eq!(wire.name, "Wire");
    assert_eq!(wire.min_size, 20.0);
    assert_eq!(wire.connections.len(), 1);
    assert_eq!(wire.render.len(), 1);
}

#[test]
fn test_missing_icons_warn_but_do_not_fail() {
    let provider = MemoryResourceProvider::new();
    let (result, _) = compile_source(
        WIRE_SOURCE,
        &provider,
        &CompileOptions::default(),
        None,
    );

    assert!(result.success);
    let warnings: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].message.contains("wire_32.png"));
    assert!(warnings[1].message.contains("wire_64.png"));
}

#[test]
fn test_icons_are_compiled_into_the_artifact() {
    let mut provider = MemoryResourceProvider::new();
    provider.insert("wire_32.png", "image/png", vec![1, 2, 3]);
    provider.insert("wire_64.png", "image/png", vec![4, 5, 6]);

    let (result, output) = compile_source(
        WIRE_SOURCE,
        &provider,
        &CompileOptions::default(),
        None,
    );
    assert!(result.success);
    assert!(result.diagnostics.is_empty());

    let contents = read_artifact(&mut output.as_slice(), None).unwrap();
    let icon = contents.components[0]
        .metadata
        .icon
        .as_ref()
        .expect("icon attached");
    assert_eq!(icon.resolutions.len(), 2);
    assert_eq!(icon.resolutions[0].size, 32);
    assert_eq!(icon.resolutions[0].data, vec![1, 2, 3]);
    assert_eq!(icon.resolutions[1].size, 64);
}

#[test]
fn test_malformed_xml_fails_with_no_output() {
    let provider = MemoryResourceProvider::new();
    let (result, output) = compile_source(
        "<component xmlns='http://schemas.kairo.dev/component'>",
        &provider,
        &CompileOptions::default(),
        None,
    );
    assert!(!result.success);
    assert!(result.component_name.is_none());
    assert!(output.is_empty());
}

#[test]
fn test_bad_condition_reports_position_and_continues() {
    let source = WIRE_SOURCE.replace(
        r#"<group autorotate="hv">
      <line"#,
        r#"<group conditions="$2bad==1">
      <line"#,
    );
    let provider = MemoryResourceProvider::new();
    let (result, _) = compile_source(&source, &provider, &CompileOptions::default(), None);

    assert!(!result.success);
    let error = result
        .diagnostics
        .iter()
        .find(|d| d.severity == Severity::Error)
        .expect("condition error reported");
    let range = error.position.expect("error carries a source position");
    assert!(range.start.line > 1);

    // Sibling sections still parsed: the component name survived.
    assert_eq!(result.component_name.as_deref(), Some("Wire"));
}

#[test]
fn test_missing_required_meta_fails() {
    let source = WIRE_SOURCE.replace(r#"<meta name="guid" value="6353882b-5208-4f88-983c-18730c6efc4e"/>"#, "");
    let provider = MemoryResourceProvider::new();
    let (result, _) = compile_source(&source, &provider, &CompileOptions::default(), None);
    assert!(!result.success);
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| d.is_error() && d.message.contains("guid"))
    );
}

#[test]
fn test_unrecognised_root_elements_are_ignored() {
    let source = WIRE_SOURCE.replace(
        "</component>",
        "<toolbox><entry/></toolbox></component>",
    );
    let provider = MemoryResourceProvider::new();
    let (result, _) = compile_source(&source, &provider, &CompileOptions::default(), None);
    assert!(result.success, "diagnostics: {:?}", result.diagnostics);
}

#[test]
fn test_signed_compilation_through_key_store() {
    let (signer, verifier) = test_signer();
    let mut key_store = MemoryKeyStore::new();
    key_store.insert("3f2a", signer);

    let options = CompileOptions {
        write_extended_metadata: true,
        certificate_thumbprint: Some("3f2a".to_string()),
    };
    let provider = MemoryResourceProvider::new();
    let (result, output) = compile_source(WIRE_SOURCE, &provider, &options, Some(&key_store));
    assert!(result.success, "diagnostics: {:?}", result.diagnostics);

    let trusting = verifier.trust(b"unit-test-certificate".to_vec());
    let contents = read_artifact(&mut output.as_slice(), Some(&trusting)).unwrap();
    let outcome = contents.signature.unwrap().outcome.unwrap();
    assert!(outcome.signature_valid);
    assert!(outcome.certificate_trusted);
}

#[test]
fn test_unknown_thumbprint_fails_compilation() {
    let key_store = MemoryKeyStore::new();
    let options = CompileOptions {
        write_extended_metadata: true,
        certificate_thumbprint: Some("0000".to_string()),
    };
    let provider = MemoryResourceProvider::new();
    let (result, output) = compile_source(WIRE_SOURCE, &provider, &options, Some(&key_store));
    assert!(!result.success);
    assert!(output.is_empty());
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| d.is_error() && d.message.contains("0000"))
    );
}

#[test]
fn test_extended_metadata_can_be_withheld() {
    let provider = MemoryResourceProvider::new();
    let options = CompileOptions {
        write_extended_metadata: false,
        certificate_thumbprint: None,
    };
    let (result, output) = compile_source(WIRE_SOURCE, &provider, &options, None);
    assert!(result.success);
    // The result still reports the author; only the artifact omits it.
    assert_eq!(result.author.as_deref(), Some("Component Tests"));

    let contents = read_artifact(&mut output.as_slice(), None).unwrap();
    assert!(contents.components[0].metadata.author.is_empty());
    assert!(contents.components[0].metadata.version.is_empty());
}

#[test]
fn test_registry_assigns_sequential_local_ids() {
    let provider = MemoryResourceProvider::new();
    let mut registry = DescriptionRegistry::new();

    for expected in 0..2u32 {
        let mut input = WIRE_SOURCE.as_bytes();
        let mut output = Vec::new();
        let result = compile(
            &mut input,
            &mut output,
            &provider,
            &CompileOptions::default(),
            &mut registry,
            None,
        );
        assert!(result.success);
        let contents = read_artifact(&mut output.as_slice(), None).unwrap();
        assert_eq!(contents.components[0].local_id, expected);
    }
    assert_eq!(registry.name(0), Some("Wire"));
}
