use include_dir::{include_dir, Dir};
use std::path::{Path, PathBuf};
use thiserror::Error;

static SAMPLES_DIR: Dir = include_dir!("src/samples");

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid UTF-8 text")]
    NotUtf8 { path: PathBuf },
}

/// A named, language-tagged block of text to practice on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSource {
    pub id: String,
    pub name: String,
    pub language: String,
    pub content: String,
}

impl TextSource {
    /// One-line description: name, language tag and content size.
    /// The size is the UTF-8 byte length, not the char count used for typing.
    pub fn info(&self) -> String {
        format!(
            "{} | {} | {}",
            self.name,
            self.language,
            format_bytes(self.content.len())
        )
    }
}

pub fn normalize_text(value: &str) -> String {
    value.replace("\r\n", "\n")
}

pub fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.2} MB", b / MB)
    }
}

fn language_tag(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "txt".to_string())
}

/// Owns every text source offered to the user, samples first until files get imported
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<TextSource>,
}

impl SourceRegistry {
    pub fn with_samples() -> Self {
        let mut sources: Vec<TextSource> = SAMPLES_DIR
            .files()
            .filter_map(|file| {
                let path = file.path();
                let name = path.file_name()?.to_str()?.to_string();
                let content = file.contents_utf8()?.to_string();
                Some(TextSource {
                    id: format!("samples/{name}"),
                    language: language_tag(path),
                    name,
                    content,
                })
            })
            .collect();
        sources.sort_by(|a, b| a.name.cmp(&b.name));

        Self { sources }
    }

    pub fn sources(&self) -> &[TextSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TextSource> {
        self.sources.get(index)
    }

    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.sources.iter().position(|s| s.name == name)
    }

    pub fn next_index(&self, current: usize) -> usize {
        if self.sources.is_empty() {
            0
        } else {
            (current + 1) % self.sources.len()
        }
    }

    pub fn previous_index(&self, current: usize) -> usize {
        match self.sources.len() {
            0 => 0,
            len => (current + len - 1) % len,
        }
    }

    /// Inserts at the front so the latest import is listed first.
    pub fn insert_front(&mut self, source: TextSource) -> &TextSource {
        self.sources.insert(0, source);
        &self.sources[0]
    }

    pub fn import_path<P: AsRef<Path>>(&mut self, path: P) -> Result<&TextSource, SourceError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|_| SourceError::NotUtf8 {
            path: path.to_path_buf(),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let source = TextSource {
            id: format!("uploaded-{}", chrono::Local::now().timestamp_millis()),
            language: language_tag(path),
            name,
            content,
        };
        tracing::info!(name = %source.name, bytes = source.content.len(), "imported text source");

        Ok(self.insert_front(source))
    }
}
