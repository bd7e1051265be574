//! The resource-provider contract used by icon compilation.

use ahash::AHashMap;
use std::io::{self, Read};
use std::path::PathBuf;

/// A resource handed out by a provider: its MIME type and an open stream.
pub struct OpenedResource {
    pub mime_type: String,
    pub reader: Box<dyn Read>,
}

impl OpenedResource {
    /// Drains the stream into memory.
    pub fn read_all(mut self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// Supplies named resource files (icon renderings) to the compiler.
pub trait ResourceProvider {
    fn has_resource(&self, name: &str) -> bool;
    fn open_resource(&self, name: &str) -> io::Result<Option<OpenedResource>>;
}

/// An in-memory provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceProvider {
    entries: AHashMap<String, (String, Vec<u8>)>,
}

impl MemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, mime_type: &str, data: Vec<u8>) {
        self.entries
            .insert(name.to_string(), (mime_type.to_string(), data));
    }
}

impl ResourceProvider for MemoryResourceProvider {
    fn has_resource(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn open_resource(&self, name: &str) -> io::Result<Option<OpenedResource>> {
        Ok(self.entries.get(name).map(|(mime, data)| OpenedResource {
            mime_type: mime.clone(),
            reader: Box::new(io::Cursor::new(data.clone())),
        }))
    }
}

/// A provider backed by files under one directory, with the MIME type
/// guessed from the extension.
#[derive(Debug, Clone)]
pub struct DirectoryResourceProvider {
    root: PathBuf,
}

impl DirectoryResourceProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn mime_for(name: &str) -> &'static str {
        match name.rsplit('.').next() {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("bmp") => "image/bmp",
            _ => "application/octet-stream",
        }
    }
}

impl ResourceProvider for DirectoryResourceProvider {
    fn has_resource(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }

    fn open_resource(&self, name: &str) -> io::Result<Option<OpenedResource>> {
        let path = self.root.join(name);
        if !path.is_file() {
            return Ok(None);
        }
        let file = std::fs::File::open(path)?;
        Ok(Some(OpenedResource {
            mime_type: Self::mime_for(name).to_string(),
            reader: Box::new(file),
        }))
    }
}
