//! @acp:module "Template Working Copies"
//! @acp:summary "Copy a blank template into the output directory and fill it"
//! @acp:domain documents
//! @acp:layer storage
//!
//! A [`WorkingCopy`] deletes its file on drop unless the stage commits it,
//! so a failed stage never leaves a half-written document behind.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// @acp:summary "The four documents of an application, in pipeline order"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    ApplicationForm,
    BusinessPlan,
    Pledge,
    Checklist,
}

impl DocumentKind {
    pub fn pipeline() -> &'static [DocumentKind] {
        &[
            DocumentKind::ApplicationForm,
            DocumentKind::BusinessPlan,
            DocumentKind::Pledge,
            DocumentKind::Checklist,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::ApplicationForm => "交付申請書",
            DocumentKind::BusinessPlan => "事業計画書",
            DocumentKind::Pledge => "誓約書",
            DocumentKind::Checklist => "チェックリスト",
        }
    }

    /// File name of the blank template inside the template directory
    pub fn template_name(&self) -> &'static str {
        match self {
            DocumentKind::ApplicationForm => "02_kofushinseisho.xlsx",
            DocumentKind::BusinessPlan => "03_keikakusho.docx",
            DocumentKind::Pledge => "04_seiyakusho.pdf",
            DocumentKind::Checklist => "05_checklist.xlsx",
        }
    }

    /// File name written into the output directory
    pub fn output_name(&self) -> &'static str {
        match self {
            DocumentKind::ApplicationForm => "交付申請書_完成版.xlsx",
            DocumentKind::BusinessPlan => "事業計画書_完成版.docx",
            DocumentKind::Pledge => "誓約書.pdf",
            DocumentKind::Checklist => "チェックリスト_完成版.xlsx",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// @acp:summary "A template copy that is removed unless committed"
#[derive(Debug)]
pub struct WorkingCopy {
    path: PathBuf,
    committed: bool,
}

impl WorkingCopy {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file and hand back its path
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for WorkingCopy {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("Failed to remove partial {}: {}", self.path.display(), e);
        } else {
            tracing::debug!("Removed partial {}", self.path.display());
        }
    }
}

/// @acp:summary "Copy the kind's template into `output_dir`; `None` when the template is absent"
pub fn acquire(kind: DocumentKind, template_dir: &Path, output_dir: &Path) -> Result<Option<WorkingCopy>> {
    let source = template_dir.join(kind.template_name());
    if !source.is_file() {
        tracing::warn!("Template not found for {}: {}", kind, source.display());
        return Ok(None);
    }

    let path = output_dir.join(kind.output_name());
    std::fs::copy(&source, &path)?;
    Ok(Some(WorkingCopy {
        path,
        committed: false,
    }))
}

/// @acp:summary "A set of edits that can be applied to a document on disk"
pub trait FieldMap {
    fn apply(&self, path: &Path) -> Result<()>;
}

/// @acp:summary "Apply `fields` to the copy and commit it"
pub fn apply_fields(copy: WorkingCopy, fields: &dyn FieldMap) -> Result<PathBuf> {
    fields.apply(copy.path())?;
    Ok(copy.commit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubsidyError;
    use tempfile::TempDir;

    struct Failing;

    impl FieldMap for Failing {
        fn apply(&self, _path: &Path) -> Result<()> {
            Err(SubsidyError::Other("corrupt".to_string()))
        }
    }

    struct Appending;

    impl FieldMap for Appending {
        fn apply(&self, path: &Path) -> Result<()> {
            let mut content = std::fs::read_to_string(path)?;
            content.push_str(" filled");
            std::fs::write(path, content)?;
            Ok(())
        }
    }

    fn dirs() -> (TempDir, TempDir) {
        let templates = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(templates.path().join("04_seiyakusho.pdf"), "pledge").unwrap();
        (templates, output)
    }

    #[test]
    fn test_pipeline_order() {
        let labels: Vec<&str> = DocumentKind::pipeline().iter().map(|k| k.label()).collect();
        assert_eq!(labels, vec!["交付申請書", "事業計画書", "誓約書", "チェックリスト"]);
    }

    #[test]
    fn test_missing_template_is_none() {
        let (templates, output) = dirs();
        let copy = acquire(DocumentKind::Checklist, templates.path(), output.path()).unwrap();
        assert!(copy.is_none());
        assert!(!output.path().join("チェックリスト_完成版.xlsx").exists());
    }

    #[test]
    fn test_commit_keeps_file() {
        let (templates, output) = dirs();
        let copy = acquire(DocumentKind::Pledge, templates.path(), output.path())
            .unwrap()
            .unwrap();
        let path = apply_fields(copy, &Appending).unwrap();
        assert_eq!(path, output.path().join("誓約書.pdf"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "pledge filled");
    }

    #[test]
    fn test_failed_stage_removes_copy() {
        let (templates, output) = dirs();
        let copy = acquire(DocumentKind::Pledge, templates.path(), output.path())
            .unwrap()
            .unwrap();
        let path = copy.path().to_path_buf();
        assert!(path.exists());
        assert!(apply_fields(copy, &Failing).is_err());
        assert!(!path.exists());
        assert!(templates.path().join("04_seiyakusho.pdf").exists());
    }
}
