use std::io;
use std::path::{Path, PathBuf};

use driverlog_core::ReceiptType;

/// Store the original receipt bytes under the type-specific subdirectory,
/// creating it on demand. Returns the path the file was written to.
pub fn save_receipt(
    upload_dir: &Path,
    receipt_type: ReceiptType,
    filename: &str,
    bytes: &[u8],
) -> io::Result<PathBuf> {
    let dir = upload_dir.join(receipt_type.subdir());
    std::fs::create_dir_all(&dir)?;

    let path = dir.join(filename);
    std::fs::write(&path, bytes)?;
    tracing::debug!(path = %path.display(), "stored receipt file");
    Ok(path)
}
