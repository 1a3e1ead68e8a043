//! On-disk encodings of the gazetteer.
//!
//! The set of formats is closed, so each one is a variant of
//! [`GazetteerFormat`] exposing `serialize`/`deserialize` directly rather
//! than an importer/exporter trait object. Any format may additionally be
//! wrapped in zstd compression, signalled by a trailing `.zst` extension.

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Gazetteer, GazetteerError};

/// Serialization strategy for a gazetteer snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazetteerFormat {
    /// Human-readable JSON (`.json`).
    Json,
    /// Compact binary `MessagePack` (`.msgpack`, `.mp`).
    MessagePack,
}

impl GazetteerFormat {
    /// Canonical file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::MessagePack => "msgpack",
        }
    }

    /// Parses a file extension (without the leading dot).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "msgpack" | "mp" => Some(Self::MessagePack),
            _ => None,
        }
    }

    /// Encodes `gazetteer` into `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn serialize(self, gazetteer: &Gazetteer, mut writer: impl Write) -> Result<(), GazetteerError> {
        match self {
            Self::Json => serde_json::to_writer(writer, gazetteer)?,
            Self::MessagePack => rmp_serde::encode::write_named(&mut writer, gazetteer)?,
        }
        Ok(())
    }

    /// Decodes a gazetteer from `reader`.
    ///
    /// The result is not validated; see [`crate::validate::validate`].
    ///
    /// # Errors
    ///
    /// Returns an error if reading or decoding fails.
    pub fn deserialize(self, reader: impl Read) -> Result<Gazetteer, GazetteerError> {
        Ok(match self {
            Self::Json => serde_json::from_reader(reader)?,
            Self::MessagePack => rmp_serde::from_read(reader)?,
        })
    }
}

/// Format and compression of a gazetteer file, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSpec {
    /// Encoding of the (decompressed) payload.
    pub format: GazetteerFormat,
    /// Whether the payload is zstd-compressed.
    pub compressed: bool,
}

impl FileSpec {
    /// Derives the file spec from a path such as `bremen.json` or
    /// `bremen.msgpack.zst`.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::UnknownFormat`] if the extension does not
    /// name a known format.
    pub fn from_path(path: &Path) -> Result<Self, GazetteerError> {
        let unknown = || GazetteerError::UnknownFormat(path.display().to_string());

        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(unknown)?;

        if ext.eq_ignore_ascii_case("zst") {
            let inner = path
                .file_stem()
                .map(Path::new)
                .and_then(Path::extension)
                .and_then(|e| e.to_str())
                .and_then(GazetteerFormat::from_extension)
                .ok_or_else(unknown)?;
            return Ok(Self {
                format: inner,
                compressed: true,
            });
        }

        GazetteerFormat::from_extension(ext)
            .map(|format| Self {
                format,
                compressed: false,
            })
            .ok_or_else(unknown)
    }
}

impl fmt::Display for FileSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format.extension())?;
        if self.compressed {
            f.write_str("+zstd")?;
        }
        Ok(())
    }
}
