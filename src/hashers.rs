use crate::models::Algorithm;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::io::{self, Read};

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Stream `reader` through the digest for `algorithm`, `chunk_size` bytes at a time,
/// and return the lowercase hex digest.
pub fn compute_hash_for_reader<R: Read>(mut reader: R, algorithm: Algorithm, chunk_size: usize) -> io::Result<String> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    match algorithm {
        Algorithm::Md5 => {
            let mut ctx = md5::Context::new();
            stream(&mut reader, &mut buf, |chunk| ctx.consume(chunk))?;
            Ok(format!("{:x}", ctx.finalize()))
        }
        Algorithm::Sha1 => {
            let mut hasher = Sha1::new();
            stream(&mut reader, &mut buf, |chunk| hasher.update(chunk))?;
            Ok(hex::encode(hasher.finalize()))
        }
        Algorithm::Sha256 => {
            let mut hasher = Sha256::new();
            stream(&mut reader, &mut buf, |chunk| hasher.update(chunk))?;
            Ok(hex::encode(hasher.finalize()))
        }
    }
}

fn stream<R: Read>(reader: &mut R, buf: &mut [u8], mut update: impl FnMut(&[u8])) -> io::Result<()> {
    loop {
        let n = match reader.read(buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        update(&buf[..n]);
    }
}
