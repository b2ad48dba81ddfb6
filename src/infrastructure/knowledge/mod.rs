use std::path::Path;
use tracing::{debug, info};

use crate::domain::{Document, DomainError};

/// Reads the bundled reference documents: every `*.txt` file in `dir`
/// becomes one [`Document`] whose topic is the file stem. Files are visited
/// in name order so document order (and with it the retrieval tie-break) is
/// deterministic across starts.
///
/// An existing-but-empty directory yields an empty knowledge base, which is
/// valid; a missing or unreadable directory is an error the caller turns
/// into the unavailable state.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>, DomainError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        DomainError::kb_unavailable(format!("reading {}: {e}", dir.display()))
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            DomainError::kb_unavailable(format!("reading {}: {e}", path.display()))
        })?;
        let topic = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        debug!(topic = %topic, bytes = content.len(), "loaded reference document");
        documents.push(Document::new(topic, content));
    }

    info!(documents = documents.len(), dir = %dir.display(), "knowledge base documents loaded");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_is_error() {
        let err = load_documents(Path::new("/nonexistent/kb")).unwrap_err();
        assert!(matches!(err, DomainError::KnowledgeBaseUnavailable(_)));
    }

    #[test]
    fn test_loads_txt_files_in_name_order() {
        let dir = std::env::temp_dir().join(format!("finadvisor-kb-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b_debt.txt"), "debt text").unwrap();
        std::fs::write(dir.join("a_budget.txt"), "budget text").unwrap();
        std::fs::write(dir.join("notes.md"), "ignored").unwrap();

        let documents = load_documents(&dir).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].topic, "a_budget");
        assert_eq!(documents[1].topic, "b_debt");
    }

    #[test]
    fn test_empty_directory_is_valid() {
        let dir = std::env::temp_dir().join(format!("finadvisor-kb-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let documents = load_documents(&dir).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert!(documents.is_empty());
    }
}
