use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Opaque entity identifier. Comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityName(String);

impl EntityName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog is not a JSON array of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// How catalog text is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CatalogFormat {
    /// Pick `json` for `.json` paths or text starting with `[`, else `lines`
    #[default]
    Auto,
    /// One entity name per line
    Lines,
    /// JSON array of strings
    Json,
}

/// Ordered, immutable list of entity names handed to the picker.
/// Duplicates are kept in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCatalog {
    entries: Vec<EntityName>,
}

impl EntityCatalog {
    pub fn new(entries: Vec<EntityName>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EntityName> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityName> {
        self.entries.iter()
    }

    /// Parse catalog text. `hint` is the source path, used for `Auto` detection.
    pub fn parse(content: &str, format: CatalogFormat, hint: Option<&Path>) -> Result<Self, CatalogError> {
        let format = match format {
            CatalogFormat::Auto => detect_format(content, hint),
            other => other,
        };

        match format {
            CatalogFormat::Json => {
                let names: Vec<String> = serde_json::from_str(content)?;
                Ok(names.into_iter().collect())
            }
            _ => Ok(content
                .lines()
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .filter(|line| !line.trim().is_empty())
                .map(EntityName::from)
                .collect()),
        }
    }

    /// Load a catalog from a file, or from stdin when `path` is `-`
    pub fn load(path: &Path, format: CatalogFormat) -> Result<Self, CatalogError> {
        if path == Path::new("-") {
            return Self::from_reader(std::io::stdin().lock(), format);
        }

        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&content, format, Some(path))?;
        tracing::debug!("Loaded {} entities from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn from_reader(mut reader: impl Read, format: CatalogFormat) -> Result<Self, CatalogError> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|source| CatalogError::Io {
                path: PathBuf::from("<stdin>"),
                source,
            })?;
        Self::parse(&content, format, None)
    }
}

impl<N: Into<EntityName>> FromIterator<N> for EntityCatalog {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

fn detect_format(content: &str, hint: Option<&Path>) -> CatalogFormat {
    let json_ext = hint
        .and_then(|p| p.extension())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if json_ext || content.trim_start().starts_with('[') {
        CatalogFormat::Json
    } else {
        CatalogFormat::Lines
    }
}
