//! Hash calculation utilities.

use crate::core::error::{Error, Result};
use crate::core::types::ChecksumAlgorithm;
use md5::{Digest, Md5};
use sha1::Sha1;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Buffer size for reading files (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Running state for every requested algorithm.
#[derive(Default)]
struct DigestSet {
    crc32: Option<crc32fast::Hasher>,
    md5: Option<Md5>,
    sha1: Option<Sha1>,
}

impl DigestSet {
    fn new(algorithms: &[ChecksumAlgorithm]) -> Self {
        let mut set = Self::default();
        for algorithm in algorithms {
            match algorithm {
                ChecksumAlgorithm::Crc32 => set.crc32 = Some(crc32fast::Hasher::new()),
                ChecksumAlgorithm::Md5 => set.md5 = Some(Md5::new()),
                ChecksumAlgorithm::Sha1 => set.sha1 = Some(Sha1::new()),
            }
        }
        set
    }

    fn update(&mut self, chunk: &[u8]) {
        if let Some(h) = self.crc32.as_mut() {
            h.update(chunk);
        }
        if let Some(h) = self.md5.as_mut() {
            h.update(chunk);
        }
        if let Some(h) = self.sha1.as_mut() {
            h.update(chunk);
        }
    }

    /// Finish in the order the algorithms were requested.
    fn finalize(self, algorithms: &[ChecksumAlgorithm]) -> Vec<(ChecksumAlgorithm, String)> {
        let crc32 = self.crc32.map(|h| format!("{:08x}", h.finalize()));
        let md5 = self.md5.map(|h| hex::encode(h.finalize()));
        let sha1 = self.sha1.map(|h| hex::encode(h.finalize()));

        algorithms
            .iter()
            .filter_map(|algorithm| {
                let value = match algorithm {
                    ChecksumAlgorithm::Crc32 => crc32.clone(),
                    ChecksumAlgorithm::Md5 => md5.clone(),
                    ChecksumAlgorithm::Sha1 => sha1.clone(),
                }?;
                Some((*algorithm, value))
            })
            .collect()
    }
}

/// Hash calculator for files.
pub struct HashCalculator;

impl HashCalculator {
    /// Digest `path` from `offset` to end-of-file with every algorithm in one pass.
    ///
    /// Offset 0 covers the whole file. An offset past the end digests the
    /// empty byte sequence.
    pub fn hash_file(
        path: &Path,
        offset: u64,
        algorithms: &[ChecksumAlgorithm],
    ) -> Result<Vec<(ChecksumAlgorithm, String)>> {
        let checksum_err = |source| Error::Checksum {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(checksum_err)?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).map_err(checksum_err)?;
        }

        let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
        let mut digests = DigestSet::new(algorithms);
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            let bytes_read = reader.read(&mut buffer).map_err(checksum_err)?;
            if bytes_read == 0 {
                break;
            }
            digests.update(&buffer[..bytes_read]);
        }

        Ok(digests.finalize(algorithms))
    }

    /// Digest a byte slice.
    pub fn hash_bytes(data: &[u8], algorithm: ChecksumAlgorithm) -> String {
        let mut digests = DigestSet::new(&[algorithm]);
        digests.update(data);
        digests
            .finalize(&[algorithm])
            .pop()
            .map(|(_, value)| value)
            .unwrap_or_default()
    }
}

/// Seam between the dispatcher and the digest implementation.
pub trait Hasher {
    /// Digest `path` from `offset` to end-of-file, lowercase hex.
    fn digest(&self, path: &Path, offset: u64, algorithm: ChecksumAlgorithm) -> Result<String>;

    /// Digest with several algorithms, results in request order.
    fn digest_all(
        &self,
        path: &Path,
        offset: u64,
        algorithms: &[ChecksumAlgorithm],
    ) -> Result<Vec<(ChecksumAlgorithm, String)>> {
        algorithms
            .iter()
            .map(|&algorithm| Ok((algorithm, self.digest(path, offset, algorithm)?)))
            .collect()
    }
}

/// Streaming file hasher backed by crc32fast and the RustCrypto digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileHasher;

impl Hasher for FileHasher {
    fn digest(&self, path: &Path, offset: u64, algorithm: ChecksumAlgorithm) -> Result<String> {
        HashCalculator::hash_file(path, offset, &[algorithm])?
            .pop()
            .map(|(_, value)| value)
            .ok_or_else(|| Error::Io(format!("no {} digest produced", algorithm.name())))
    }

    fn digest_all(
        &self,
        path: &Path,
        offset: u64,
        algorithms: &[ChecksumAlgorithm],
    ) -> Result<Vec<(ChecksumAlgorithm, String)>> {
        HashCalculator::hash_file(path, offset, algorithms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ALL: [ChecksumAlgorithm; 3] = [
        ChecksumAlgorithm::Crc32,
        ChecksumAlgorithm::Md5,
        ChecksumAlgorithm::Sha1,
    ];

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            HashCalculator::hash_bytes(b"hello", ChecksumAlgorithm::Md5),
            "5d41402abc4b2a76b9719d911017c592"
        );
        assert_eq!(
            HashCalculator::hash_bytes(b"hello", ChecksumAlgorithm::Sha1),
            "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
        assert_eq!(
            HashCalculator::hash_bytes(b"123456789", ChecksumAlgorithm::Crc32),
            "cbf43926"
        );
    }

    #[test]
    fn test_hash_file_whole() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        file.flush().unwrap();

        let digests = HashCalculator::hash_file(file.path(), 0, &ALL).unwrap();
        let algorithms: Vec<_> = digests.iter().map(|(a, _)| *a).collect();
        assert_eq!(algorithms, ALL.to_vec());
        assert_eq!(digests[1].1, "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_offset_matches_stripped_bytes() {
        let mut content = b"NES\x1a".to_vec();
        content.extend_from_slice(&[0u8; 12]);
        content.extend((0..2048u32).map(|i| (i % 251) as u8));

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&content).unwrap();
        file.flush().unwrap();

        for offset in [0usize, 16] {
            let from_file = HashCalculator::hash_file(file.path(), offset as u64, &ALL).unwrap();
            for (algorithm, value) in from_file {
                assert_eq!(value, HashCalculator::hash_bytes(&content[offset..], algorithm));
            }
        }
    }

    #[test]
    fn test_digest_is_idempotent() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"some rom data").unwrap();
        file.flush().unwrap();

        let hasher = FileHasher;
        let first = hasher.digest(file.path(), 4, ChecksumAlgorithm::Sha1).unwrap();
        let second = hasher.digest(file.path(), 4, ChecksumAlgorithm::Sha1).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_offset_past_end_is_empty_digest() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"tiny").unwrap();
        file.flush().unwrap();

        let value = FileHasher.digest(file.path(), 16, ChecksumAlgorithm::Md5).unwrap();
        assert_eq!(value, HashCalculator::hash_bytes(b"", ChecksumAlgorithm::Md5));
    }

    #[test]
    fn test_missing_file_is_checksum_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileHasher
            .digest(&dir.path().join("gone.nes"), 0, ChecksumAlgorithm::Md5)
            .unwrap_err();
        assert!(matches!(err, Error::Checksum { .. }));
    }
}
