//! Async wrappers around import and export.
//!
//! Conversion is CPU-bound, so it runs on Tokio's blocking pool; only file
//! I/O is awaited directly.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::Project;
use crate::options::PageSelection;
use crate::report::ExportReport;
use crate::{page_name_for, ImportedPage, Psdport};

/// Result of [`export_to_file`].
#[derive(Debug)]
pub struct ExportedFile {
    /// Where the artifact was written
    pub path: PathBuf,
    pub report: ExportReport,
}

/// Read and import a document file without blocking the runtime.
pub async fn import_file<P: AsRef<Path>>(psdport: &Psdport, path: P) -> Result<ImportedPage> {
    let path = path.as_ref();
    let data = tokio::fs::read(path).await?;
    let name = page_name_for(path);
    let psdport = psdport.clone();

    tokio::task::spawn_blocking(move || psdport.import_bytes_named(&data, &name))
        .await
        .map_err(|e| Error::Other(format!("import task failed: {}", e)))?
}

/// Export the selected pages and write the artifact into `dir`.
///
/// The export runs on a copy of `project`; the copy replaces it once the
/// export finishes, whether or not it succeeded.
pub async fn export_to_file<P: AsRef<Path>>(
    psdport: &Psdport,
    project: &mut Project,
    selection: PageSelection,
    dir: P,
) -> Result<ExportedFile> {
    let psdport = psdport.clone();
    let mut working = project.clone();
    let (working, output) = tokio::task::spawn_blocking(move || {
        let output = psdport.export_document(&mut working, &selection);
        (working, output)
    })
    .await
    .map_err(|e| Error::Other(format!("export task failed: {}", e)))?;
    *project = working;
    let output = output?;

    let path = dir.as_ref().join(output.artifact.file_name());
    tokio::fs::write(&path, output.artifact.bytes()).await?;

    Ok(ExportedFile {
        path,
        report: output.report,
    })
}
