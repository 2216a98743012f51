//! @acp:module "OOXML Package"
//! @acp:summary "Read and rewrite the parts of an xlsx/docx zip package"
//! @acp:domain documents
//! @acp:layer storage

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Result, SubsidyError};

struct Entry {
    name: String,
    compression: CompressionMethod,
    data: Vec<u8>,
}

/// @acp:summary "In-memory package; entry order is preserved on save"
pub struct Package {
    path: PathBuf,
    entries: Vec<Entry>,
}

impl Package {
    /// @acp:summary "Read every entry of the package at `path`"
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let mut archive = ZipArchive::new(file)?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(Entry {
                name: file.name().to_string(),
                compression: file.compression(),
                data,
            });
        }

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Part content as UTF-8 text
    pub fn part(&self, name: &str) -> Result<String> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| SubsidyError::MissingPart {
                path: self.path.clone(),
                part: name.to_string(),
            })?;
        String::from_utf8(entry.data.clone())
            .map_err(|e| SubsidyError::Other(format!("{} in {} is not UTF-8: {}", name, self.path.display(), e)))
    }

    /// Replace a part, or append it when absent
    pub fn set_part(&mut self, name: &str, content: String) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = content.into_bytes(),
            None => self.entries.push(Entry {
                name: name.to_string(),
                compression: CompressionMethod::Deflated,
                data: content.into_bytes(),
            }),
        }
    }

    /// Drop a part; returns whether it existed
    pub fn remove_part(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }

    /// @acp:summary "Write the package back to its own path"
    pub fn save(&self) -> Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = ZipWriter::new(file);

        for entry in &self.entries {
            let options = SimpleFileOptions::default().compression_method(entry.compression);
            if entry.name.ends_with('/') {
                writer.add_directory(entry.name.as_str(), options)?;
            } else {
                writer.start_file(entry.name.as_str(), options)?;
                writer.write_all(&entry.data)?;
            }
        }

        writer.finish()?;
        Ok(())
    }
}

/// Write a package from `(name, content)` pairs; used to build fixtures and fresh parts
pub fn write_package<P: AsRef<Path>>(path: P, parts: &[(&str, &str)]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in parts {
        writer.start_file(*name, options)?;
        writer.write_all(content.as_bytes())?;
    }
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rewrite_preserves_order_and_untouched_parts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.xlsx");
        write_package(&path, &[("a.xml", "<a/>"), ("b.xml", "<b/>"), ("c.xml", "<c/>")]).unwrap();

        let mut package = Package::open(&path).unwrap();
        package.set_part("b.xml", "<b>changed</b>".to_string());
        assert!(package.remove_part("c.xml"));
        assert!(!package.remove_part("missing.xml"));
        package.save().unwrap();

        let reopened = Package::open(&path).unwrap();
        let names: Vec<&str> = reopened.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.xml", "b.xml"]);
        assert_eq!(reopened.part("a.xml").unwrap(), "<a/>");
        assert_eq!(reopened.part("b.xml").unwrap(), "<b>changed</b>");
    }

    #[test]
    fn test_missing_part_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.docx");
        write_package(&path, &[("a.xml", "<a/>")]).unwrap();
        let package = Package::open(&path).unwrap();
        assert!(matches!(
            package.part("word/document.xml"),
            Err(SubsidyError::MissingPart { .. })
        ));
    }

    #[test]
    fn test_not_a_zip_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"plain text").unwrap();
        assert!(Package::open(&path).is_err());
    }
}
