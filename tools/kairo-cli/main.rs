use clap::Parser;
use kairo::codec::{ARTIFACT_EXTENSION, FileKeyStore, KeyStore};
use kairo::prelude::*;
use kairo::resources::DirectoryResourceProvider;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

/// Compile a declarative component description into a binary artifact.
#[derive(Parser)]
#[command(name = "kairo-cli", version)]
struct Args {
    /// Declarative component source (XML)
    input: PathBuf,

    /// Output artifact path; defaults to the input path with the artifact
    /// extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory holding icon resources
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Do not embed author/version metadata in the artifact
    #[arg(long)]
    no_extended_metadata: bool,

    /// Thumbprint of the signing certificate
    #[arg(long)]
    thumbprint: Option<String>,

    /// Directory holding signing keys and certificates
    #[arg(long)]
    key_store: Option<PathBuf>,

    /// Print the result summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension(ARTIFACT_EXTENSION));

    let mut input = match File::open(&args.input) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("error: could not open '{}': {}", args.input.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let mut output = match File::create(&output_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("error: could not create '{}': {}", output_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let provider: Box<dyn ResourceProvider> = match &args.resources {
        Some(dir) => Box::new(DirectoryResourceProvider::new(dir)),
        None => Box::new(MemoryResourceProvider::new()),
    };
    let key_store = args.key_store.as_ref().map(FileKeyStore::new);
    let key_store_ref = key_store.as_ref().map(|s| s as &dyn KeyStore);

    let options = CompileOptions {
        write_extended_metadata: !args.no_extended_metadata,
        certificate_thumbprint: args.thumbprint.clone(),
    };

    let mut registry = DescriptionRegistry::new();
    let result = compile(
        &mut input,
        &mut output,
        provider.as_ref(),
        &options,
        &mut registry,
        key_store_ref,
    );

    for diagnostic in &result.diagnostics {
        eprintln!("{diagnostic}");
    }

    if args.json {
        let summary = serde_json::json!({
            "success": result.success,
            "componentName": result.component_name,
            "guid": result.guid,
            "author": result.author,
            "output": output_path,
            "warnings": result
                .diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Warning)
                .count(),
            "errors": result
                .diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .count(),
        });
        println!("{summary}");
    } else if result.success {
        println!(
            "Compiled '{}' -> {}",
            result.component_name.unwrap_or_default(),
            output_path.display()
        );
    }

    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
