//! Command line surface and dispatch.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderWriter;
use cipherkit::codec;
use cipherkit::symmetric::{self, Decryptor, Encryptor};
use clap::{Args, Parser, Subcommand, ValueEnum};
use common::{CipherPaddingMode, DigestMode};

use crate::config::Config;
use crate::files::{self, Verification};

/// Byte codecs, digests, HMAC and symmetric encryption from the command line.
#[derive(Parser, Debug)]
#[command(name = "cipherkit", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode text as hex or base64
    Encode(CodecArgs),

    /// Decode hex or base64 back to UTF-8 text
    Decode(CodecArgs),

    /// Print the hex digest of text or of a file
    Digest {
        #[arg(short, long)]
        mode: Option<DigestMode>,

        /// Hash this file instead of a text argument
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        #[arg(required_unless_present = "file")]
        text: Option<String>,
    },

    /// Print the hex HMAC of text under a key
    Hmac {
        #[arg(short, long)]
        mode: Option<DigestMode>,

        #[arg(long)]
        key: String,

        text: String,
    },

    /// Encrypt text or a file and print base64 ciphertext
    Encrypt {
        #[command(flatten)]
        cipher: CipherArgs,

        /// Encrypt this file instead of a text argument
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Write raw ciphertext of `--file` here instead of printing base64
        #[arg(short, long, requires = "file")]
        output: Option<PathBuf>,

        #[arg(required_unless_present = "file")]
        text: Option<String>,
    },

    /// Decrypt base64 ciphertext, or a file of raw ciphertext, and print the plaintext
    Decrypt {
        #[command(flatten)]
        cipher: CipherArgs,

        /// Decrypt this file of raw ciphertext instead of a base64 argument
        #[arg(long, conflicts_with = "ciphertext")]
        file: Option<PathBuf>,

        /// Write the plaintext of `--file` here instead of printing it
        #[arg(short, long, requires = "file")]
        output: Option<PathBuf>,

        #[arg(required_unless_present = "file")]
        ciphertext: Option<String>,
    },

    /// List supported cipher specs
    Ciphers {
        /// Print full spec details as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write `<path>.<mode>` holding the file's hex digest
    SignFile {
        #[arg(short, long)]
        mode: Option<DigestMode>,

        path: PathBuf,
    },

    /// Check a file against its `<path>.<mode>` sidecar; exits 1 on mismatch
    VerifyFile {
        #[arg(short, long)]
        mode: Option<DigestMode>,

        path: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct CodecArgs {
    #[arg(short, long, value_enum, default_value_t = Encoding::Hex)]
    pub format: Encoding,

    /// Hex only: character placed between byte pairs
    #[arg(short, long)]
    pub delimiter: Option<char>,

    pub input: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Hex,
    Base64,
}

#[derive(Args, Debug)]
pub struct CipherArgs {
    /// Cipher spec such as `sm4-cbc` or `aes-256-ctr`
    #[arg(short, long)]
    pub cipher: Option<String>,

    #[arg(short, long)]
    pub padding: Option<CipherPaddingMode>,

    /// Key, used verbatim as UTF-8 bytes
    #[arg(long)]
    pub key: String,

    /// IV, used verbatim as UTF-8 bytes; omit for ECB
    #[arg(long, default_value = "")]
    pub iv: String,
}

/// Execute `command`, writing its output to `out`.
///
/// Returns `false` when the command ran but its check failed (`verify-file`).
pub fn run(command: Command, cfg: &Config, out: &mut impl Write) -> Result<bool> {
    match command {
        Command::Encode(args) => {
            let encoded = match args.format {
                Encoding::Hex => codec::hex_encode(&args.input, args.delimiter),
                Encoding::Base64 => codec::base64_encode(&args.input),
            };
            writeln!(out, "{encoded}")?;
        }

        Command::Decode(args) => {
            let decoded = match args.format {
                Encoding::Hex => codec::hex_decode_to_string(&args.input, args.delimiter),
                Encoding::Base64 => codec::base64_decode_to_string(&args.input),
            }
            .context("failed to decode input")?;
            writeln!(out, "{decoded}")?;
        }

        Command::Digest { mode, file, text } => {
            let mode = mode.unwrap_or(cfg.digest_mode);
            let digest = match (file, text) {
                (Some(path), _) => files::digest_file(mode, &path)?,
                (None, Some(text)) => cipherkit::make_digest(mode, text),
                (None, None) => anyhow::bail!("either a text argument or --file is required"),
            };
            writeln!(out, "{digest}")?;
        }

        Command::Hmac { mode, key, text } => {
            let mode = mode.unwrap_or(cfg.digest_mode);
            writeln!(out, "{}", cipherkit::hmac_hash(mode, key, text))?;
        }

        Command::Encrypt {
            cipher,
            file,
            output,
            text,
        } => {
            let (spec, padding) = cipher.resolve(cfg);
            let mut encryptor = Encryptor::new(spec, padding, &cipher.key, &cipher.iv)
                .with_context(|| format!("failed to set up {spec} encryptor"))?;
            let result = match file {
                Some(path) => encrypt_file(&encryptor, &path, output.as_deref(), out),
                None => encrypt_text(&encryptor, text.unwrap_or_default(), out),
            };
            encryptor.release();
            result?;
        }

        Command::Decrypt {
            cipher,
            file,
            output,
            ciphertext,
        } => {
            let (spec, padding) = cipher.resolve(cfg);
            let mut decryptor = Decryptor::new(spec, padding, &cipher.key, &cipher.iv)
                .with_context(|| format!("failed to set up {spec} decryptor"))?;
            let result = match file {
                Some(path) => decrypt_file(&decryptor, &path, output.as_deref(), out),
                None => decrypt_text(&decryptor, &ciphertext.unwrap_or_default(), out),
            };
            decryptor.release();
            result?;
        }

        Command::Ciphers { json } => {
            if json {
                let specs = symmetric::cipher_specs();
                writeln!(out, "{}", serde_json::to_string_pretty(&specs)?)?;
            } else {
                for name in symmetric::cipher_names() {
                    writeln!(out, "{name}")?;
                }
            }
        }

        Command::SignFile { mode, path } => {
            let sidecar = files::sign_file(mode.unwrap_or(cfg.digest_mode), &path)?;
            writeln!(out, "{}", sidecar.display())?;
        }

        Command::VerifyFile { mode, path } => {
            let verification = files::verify_file(mode.unwrap_or(cfg.digest_mode), &path)?;
            let label = match verification {
                Verification::Valid => "OK",
                Verification::Mismatch => "MISMATCH",
                Verification::MissingSidecar => "MISSING",
            };
            writeln!(out, "{}: {label}", path.display())?;
            return Ok(verification == Verification::Valid);
        }
    }

    Ok(true)
}

fn encrypt_text(encryptor: &Encryptor, text: String, out: &mut impl Write) -> Result<()> {
    let ciphertext = encryptor.to_base64(text).context("encryption failed")?;
    writeln!(out, "{ciphertext}")?;
    Ok(())
}

fn decrypt_text(decryptor: &Decryptor, ciphertext: &str, out: &mut impl Write) -> Result<()> {
    let plaintext = decryptor
        .string_from_base64(ciphertext)
        .context("decryption failed")?;
    writeln!(out, "{plaintext}")?;
    Ok(())
}

/// With `target`, raw ciphertext goes to that file and its path is printed;
/// otherwise the ciphertext is printed as one line of base64.
fn encrypt_file(
    encryptor: &Encryptor,
    path: &Path,
    target: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let stream = encryptor.stream()?;
    if let Some(target) = target {
        files::transform_into_file(stream, path, target).context("encryption failed")?;
        writeln!(out, "{}", target.display())?;
        return Ok(());
    }

    {
        let mut encoder = EncoderWriter::new(&mut *out, &STANDARD);
        files::transform_file(stream, path, &mut encoder).context("encryption failed")?;
        encoder.finish()?;
    }
    writeln!(out)?;
    Ok(())
}

/// With `target`, plaintext goes to that file and its path is printed;
/// otherwise the raw plaintext is written to `out` unchanged.
fn decrypt_file(
    decryptor: &Decryptor,
    path: &Path,
    target: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let stream = decryptor.stream()?;
    match target {
        Some(target) => {
            files::transform_into_file(stream, path, target).context("decryption failed")?;
            writeln!(out, "{}", target.display())?;
        }
        None => {
            files::transform_file(stream, path, out).context("decryption failed")?;
        }
    }
    Ok(())
}

impl CipherArgs {
    fn resolve<'a>(&'a self, cfg: &'a Config) -> (&'a str, CipherPaddingMode) {
        let spec = self.cipher.as_deref().unwrap_or(&cfg.cipher);
        (spec, self.padding.unwrap_or(cfg.padding))
    }
}
