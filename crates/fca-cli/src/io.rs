//! JSON interchange for contexts.
//!
//! A context file is `{"attributes": [...], "objects": [{"name", "intent"}]}`.
//! Loaded contexts are validated before they reach a session.

use std::fs;
use std::path::Path;

use fca_model::FormalContext;
use fca_session::{ContextSource, SessionError};
use tracing::debug;

/// Reads context files for session startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonContextSource;

impl ContextSource for JsonContextSource {
    fn load(&self, path: &Path) -> fca_session::Result<FormalContext> {
        read_context(path)
    }
}

pub fn read_context(path: &Path) -> fca_session::Result<FormalContext> {
    let text = fs::read_to_string(path)
        .map_err(|e| SessionError::external("Read context", format!("{}: {e}", path.display())))?;
    let context: FormalContext = serde_json::from_str(&text)
        .map_err(|e| SessionError::external("Parse context", format!("{}: {e}", path.display())))?;
    context.validate()?;
    debug!(
        path = %path.display(),
        objects = context.object_count(),
        attributes = context.attribute_count(),
        "context read"
    );
    Ok(context)
}

pub fn write_context(context: &FormalContext, path: &Path) -> fca_session::Result<()> {
    let text = serde_json::to_string_pretty(context)
        .map_err(|e| SessionError::external("Serialize context", e))?;
    fs::write(path, text)
        .map_err(|e| SessionError::external("Write context", format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use fca_model::example_context;

    use super::*;

    #[test]
    fn written_context_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("example.json");
        let mut context = example_context();
        context.set_object_considered("boy", false).unwrap();
        write_context(&context, &path).unwrap();
        let loaded = read_context(&path).unwrap();
        assert!(loaded.same_incidence(&context));
        assert!(!loaded.has_unconsidered());
    }

    #[test]
    fn dangling_incidence_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"{"attributes":["a"],"objects":[{"name":"g","intent":["b"]}]}"#,
        )
        .unwrap();
        assert!(matches!(read_context(&path), Err(SessionError::Model(_))));
    }

    #[test]
    fn missing_file_is_external() {
        let err = read_context(Path::new("/nonexistent/context.json")).unwrap_err();
        assert!(matches!(err, SessionError::External { .. }));
    }
}
