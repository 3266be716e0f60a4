use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// `""` and `"-"` both mean standard output.
pub fn is_stdout(destination: &str) -> bool {
    destination.is_empty() || destination == "-"
}

/// Write a rendered document to stdout or to a file.
///
/// Files are written through a temporary sibling and renamed into place, so
/// a failed write never leaves a truncated document behind.
pub fn write_document(destination: &str, document: &str) -> Result<()> {
    if is_stdout(destination) {
        let mut stdout = std::io::stdout().lock();
        return stdout
            .write_all(document.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|source| Error::OutputFailed {
                path: "<stdout>".into(),
                source,
            });
    }

    write_file_atomic(Path::new(destination), document.as_bytes())
}

fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let failed = |source| Error::OutputFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(failed)?;
    file.write_all(contents).map_err(failed)?;
    file.as_file().sync_all().map_err(failed)?;
    file.persist(path).map_err(|e| failed(e.error))?;

    Ok(())
}
