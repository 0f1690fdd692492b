//! File hashing utilities

use anyhow::Result;
use blake3::Hasher;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

use crate::utils::config::HashingConsts;

/// Hash a file with blake3. Uses memory-mapped I/O for files above threshold, chunked reading otherwise.
pub fn hash_file(path: &Path) -> Result<[u8; 32]> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let mut hasher = Hasher::new();

    if size > HashingConsts::HASH_MMAP_THRESHOLD {
        // Memory-mapped I/O for large files (Blake3 already uses SIMD internally)
        let mmap = unsafe { Mmap::map(&file)? };
        hasher.update(&mmap);
    } else {
        use std::io::Read;
        let mut reader =
            std::io::BufReader::with_capacity(HashingConsts::HASH_READ_CHUNK_SIZE, file);
        let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
    }

    Ok(*hasher.finalize().as_bytes())
}

/// Lowercase hex of a digest, as stored in stamp records.
pub fn digest_to_hex(digest: &[u8; 32]) -> String {
    blake3::Hash::from_bytes(*digest).to_hex().to_string()
}

/// Parse a stored hex digest; None when malformed.
pub fn digest_from_hex(s: &str) -> Option<[u8; 32]> {
    blake3::Hash::from_hex(s.trim()).ok().map(|h| *h.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hash_matches_blake3_of_contents() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"int main() {}\n").unwrap();
        let got = hash_file(f.path()).unwrap();
        assert_eq!(got, *blake3::hash(b"int main() {}\n").as_bytes());
    }

    #[test]
    fn hex_round_trip_and_garbage() {
        let d = *blake3::hash(b"x").as_bytes();
        let hex = digest_to_hex(&d);
        assert_eq!(hex.len(), 64);
        assert_eq!(digest_from_hex(&format!("{hex}\n")), Some(d));
        assert_eq!(digest_from_hex("not-a-digest"), None);
    }

    #[test]
    fn missing_file_is_error() {
        assert!(hash_file(Path::new("/no/such/file.cpp")).is_err());
    }
}
