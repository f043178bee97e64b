//! Content fingerprint: the first bytes of a file.
//!
//! Appending never changes a file's head, so a reopened file whose head no
//! longer starts with the recorded fingerprint was replaced, even if it reuses the
//! old file's identity.

use std::io::{self, SeekFrom};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Number of leading bytes kept per file.
pub(crate) const FINGERPRINT_SIZE: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Fingerprint {
    first_bytes: Vec<u8>,
}

impl Fingerprint {
    /// Reads up to `size` bytes from the start of `file`.
    ///
    /// Leaves the cursor anywhere; callers seek before reading lines.
    pub(crate) async fn read(file: &mut File, size: usize) -> io::Result<Self> {
        file.seek(SeekFrom::Start(0)).await?;

        let mut first_bytes = vec![0u8; size];
        let mut filled = 0;
        while filled < size {
            let n = file.read(&mut first_bytes[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        first_bytes.truncate(filled);

        Ok(Self { first_bytes })
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            first_bytes: bytes.to_vec(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.first_bytes.len()
    }

    /// Whether `self` can be the same file as `earlier`, grown or not.
    ///
    /// An empty earlier fingerprint carries no evidence and always matches.
    pub(crate) fn continues(&self, earlier: &Fingerprint) -> bool {
        self.first_bytes.starts_with(&earlier.first_bytes)
    }
}
