//! Double-SHA256 hashing, as used for transaction and block ids.

use sha2::{Digest, Sha256};
use std::io;

/// Compute the sha256d digest of `data` in one shot.
pub fn double(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(&first);
    let mut output = [0u8; 32];
    output.copy_from_slice(&second);
    output
}

/// An `io::Write` sink that computes a sha256d digest of everything
/// written to it, so that structures can be hashed directly from their
/// serialization code without an intermediate buffer.
#[derive(Default)]
pub struct Writer {
    hash: Sha256,
}

impl Writer {
    /// Consume the writer, returning the double-SHA256 of the bytes
    /// written so far.
    pub fn finish(self) -> [u8; 32] {
        let first = self.hash.finalize();
        let second = Sha256::digest(&first);
        let mut output = [0u8; 32];
        output.copy_from_slice(&second);
        output
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hash.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
