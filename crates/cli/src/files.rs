//! File digests, digest sidecar files and file encryption.
//!
//! A sidecar sits next to the file it covers, named `<path>.<mode>` (for
//! example `report.pdf.sha256`), and holds the lowercase hex digest of the
//! file's contents with no trailing newline.
//!
//! Files are read in fixed-size chunks, so neither hashing nor encryption
//! holds a whole file in memory.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cipherkit::{CipherStream, DigestContext};
use common::DigestMode;
use tracing::{debug, info};

const CHUNK_SIZE: usize = 4096;

/// Outcome of [`verify_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Mismatch,
    MissingSidecar,
}

/// Feed the contents of `path` to `sink` one chunk at a time and return the
/// number of bytes read.
fn for_each_chunk(path: &Path, mut sink: impl FnMut(&[u8]) -> Result<()>) -> Result<u64> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
        };
        sink(&buf[..n])?;
        total += n as u64;
    }
    Ok(total)
}

/// Hash a file in fixed-size chunks and return its lowercase hex digest.
pub fn digest_file(mode: DigestMode, path: &Path) -> Result<String> {
    let mut ctx = DigestContext::new(mode);
    let total = for_each_chunk(path, |chunk| {
        ctx.update(chunk);
        Ok(())
    })?;

    debug!(path = %path.display(), %mode, bytes = total, "file hashed");
    Ok(ctx.finalize_hex())
}

/// Run `stream` over the contents of `path` and write everything it produces
/// to `out`. Returns the number of bytes written.
pub fn transform_file(
    mut stream: CipherStream<'_>,
    path: &Path,
    out: &mut impl Write,
) -> Result<u64> {
    let mut written = 0u64;
    let read = for_each_chunk(path, |chunk| {
        let piece = stream.update(chunk)?;
        out.write_all(&piece)?;
        written += piece.len() as u64;
        Ok(())
    })?;

    let tail = stream
        .finalize()
        .with_context(|| format!("failed to finish {}", path.display()))?;
    out.write_all(&tail)?;
    written += tail.len() as u64;

    debug!(path = %path.display(), bytes_in = read, bytes_out = written, "file transformed");
    Ok(written)
}

/// As [`transform_file`], creating or truncating `target` for the output.
pub fn transform_into_file(stream: CipherStream<'_>, source: &Path, target: &Path) -> Result<u64> {
    let file =
        File::create(target).with_context(|| format!("failed to create {}", target.display()))?;
    let mut writer = BufWriter::new(file);
    let written = transform_file(stream, source, &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", target.display()))?;
    info!(source = %source.display(), target = %target.display(), "file transformed");
    Ok(written)
}

/// Path of the sidecar for `path` under `mode`.
pub fn sidecar_path(mode: DigestMode, path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(mode.name());
    PathBuf::from(name)
}

/// Write (or overwrite) the sidecar for `path` and return its location.
pub fn sign_file(mode: DigestMode, path: &Path) -> Result<PathBuf> {
    let digest = digest_file(mode, path)?;
    let sidecar = sidecar_path(mode, path);
    fs::write(&sidecar, digest)
        .with_context(|| format!("failed to write {}", sidecar.display()))?;
    info!(path = %path.display(), sidecar = %sidecar.display(), "sidecar written");
    Ok(sidecar)
}

/// Compare `path` against its sidecar, ignoring hex case and surrounding
/// whitespace.
pub fn verify_file(mode: DigestMode, path: &Path) -> Result<Verification> {
    let sidecar = sidecar_path(mode, path);
    let expected = match fs::read_to_string(&sidecar) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Verification::MissingSidecar),
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", sidecar.display())),
    };

    let actual = digest_file(mode, path)?;
    if expected.trim().eq_ignore_ascii_case(&actual) {
        Ok(Verification::Valid)
    } else {
        Ok(Verification::Mismatch)
    }
}
