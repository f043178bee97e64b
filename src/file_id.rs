//! File identity used to tell a recreated file apart from the one being read.
//!
//! On Unix this is the device ID + inode number, which survives renames but
//! changes when a path is deleted and created again while the old file is still
//! open. Once the old file is closed its inode can be reused, so the creation time
//! is part of the identity wherever the file system records one.

use std::fs::Metadata;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FileId {
    dev: u64,
    ino: u64,
    created: Option<SystemTime>,
}

impl FileId {
    /// Identity of the file described by `metadata`, if the platform exposes one.
    #[cfg(unix)]
    pub(crate) fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;

        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
            created: metadata.created().ok(),
        })
    }

    /// Only the creation time is available here; without one, rotation falls back
    /// to size checks and the content fingerprint.
    #[cfg(not(unix))]
    pub(crate) fn from_metadata(metadata: &Metadata) -> Option<Self> {
        let created = metadata.created().ok()?;
        Some(Self {
            dev: 0,
            ino: 0,
            created: Some(created),
        })
    }
}

/// Whether two observations are known to be different files.
///
/// Unknown identities never count as a change.
pub(crate) fn is_replaced(current: Option<FileId>, observed: Option<FileId>) -> bool {
    matches!((current, observed), (Some(a), Some(b)) if a != b)
}
