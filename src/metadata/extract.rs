//! Leading-block metadata extraction

use crate::error::BuildError;
use crate::metadata::{MetaValue, Metadata};
use regex::Regex;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::trace;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<!--(.+)-->$").expect("valid regex"));

// Key is word characters only, so the first colon always separates key from value.
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_]+)\s*:\s*(.+)$").expect("valid regex"));

/// Parse one candidate line.
///
/// Returns `None` when the line is not metadata, which ends the block.
pub fn parse_line(line: &str, comment_wrapped: bool) -> Option<(String, MetaValue)> {
    let mut line = line.trim();
    if comment_wrapped {
        line = COMMENT_RE.captures(line)?.get(1)?.as_str().trim();
    }
    let captures = ENTRY_RE.captures(line)?;
    let key = captures.get(1)?.as_str().trim();
    let value = captures.get(2)?.as_str();
    Some((key.to_string(), MetaValue::from_raw(value)))
}

/// Parse the leading metadata block of already-loaded text.
pub fn parse_lines<'a, I>(lines: I, comment_wrapped: bool) -> Metadata
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map_while(|line| parse_line(line, comment_wrapped))
        .collect()
}

/// Reads metadata from sidecar files and document headers.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    document_extensions: Vec<String>,
}

impl MetadataExtractor {
    /// `document_extensions` carry their leading dot, e.g. `.md`.
    pub fn new(document_extensions: Vec<String>) -> Self {
        Self {
            document_extensions,
        }
    }

    /// Whether metadata in this file lives inside `<!-- -->` comments.
    pub fn is_document(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext = format!(".{}", ext.to_string_lossy());
                self.document_extensions.iter().any(|known| *known == ext)
            }
            None => false,
        }
    }

    /// Extract metadata from `path`. A missing file yields empty metadata.
    pub async fn extract(&self, path: &Path) -> Result<Metadata, BuildError> {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Metadata::new()),
            Err(e) => return Err(BuildError::io(path, e)),
        };

        let comment_wrapped = self.is_document(path);
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut metadata = Metadata::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|e| BuildError::io(path, e))?;
            if read == 0 {
                break;
            }
            // Undecodable bytes never match, so they end the block like any other line.
            let line = String::from_utf8_lossy(&buf);
            match parse_line(line.trim_end_matches(['\n', '\r']), comment_wrapped) {
                Some((key, value)) => {
                    metadata.insert(key, value);
                }
                None => break,
            }
        }

        trace!(path = %path.display(), keys = metadata.len(), "Extracted metadata");
        Ok(metadata)
    }
}
