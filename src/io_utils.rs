//! File loading for host documents.
//!
//! Table configurations arrive as JSON or YAML; the file extension picks the
//! parser (`.yaml`/`.yml` → YAML, everything else → JSON). The `-` path
//! convention reads JSON from standard input.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Json,
    Yaml,
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn document_kind(path: &Path) -> DocumentKind {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            DocumentKind::Yaml
        }
        _ => DocumentKind::Json,
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    let mut buf = String::new();
    if is_dash(path) {
        std::io::stdin()
            .lock()
            .read_to_string(&mut buf)
            .context("Reading document from stdin")?;
    } else {
        let file = File::open(path).with_context(|| format!("Opening document {path:?}"))?;
        BufReader::new(file)
            .read_to_string(&mut buf)
            .with_context(|| format!("Reading document {path:?}"))?;
    }
    Ok(buf)
}

pub fn parse_document<T: DeserializeOwned>(input: &str, kind: DocumentKind) -> Result<T> {
    match kind {
        DocumentKind::Json => Ok(serde_json::from_str(input)?),
        DocumentKind::Yaml => Ok(serde_yaml::from_str(input)?),
    }
}

pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = read_to_string(path)?;
    let kind = document_kind(path);
    parse_document(&raw, kind).with_context(|| format!("Parsing {kind:?} document {path:?}"))
}
