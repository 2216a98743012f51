//! @acp:module "Output Bundle"
//! @acp:summary "Zip the generated documents for hand-off"
//! @acp:domain documents
//! @acp:layer output

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// `香川県補助金_{company}_申請書類.zip`, with `output` for a blank name
pub fn default_archive_name(company_name: &str) -> String {
    let name = company_name.trim();
    let name = if name.is_empty() { "output" } else { name };
    format!("香川県補助金_{}_申請書類.zip", name)
}

/// @acp:summary "Zip every file under `dir` with names relative to it"
pub fn bundle_directory(dir: &Path, archive: &Path) -> Result<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() || entry.path() == archive {
            continue;
        }
        files.push(entry.into_path());
    }

    let mut writer = ZipWriter::new(File::create(archive)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for path in &files {
        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        writer.start_file(name.as_str(), options)?;
        io::copy(&mut File::open(path)?, &mut writer)?;
    }
    writer.finish()?;

    tracing::info!("Bundled {} files into {}", files.len(), archive.display());
    Ok(archive.to_path_buf())
}
