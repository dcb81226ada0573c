use crate::error::{AssemblerError, Result};
use async_trait::async_trait;
use ignore::WalkBuilder;
use nextedit_code_chunker::Language;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A buffer the editor has open, with its live content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDocument {
    pub path: String,
    pub content: String,
}

impl OpenDocument {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// The host's view of the project.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Open documents, most recently active first
    async fn open_documents(&self) -> Vec<OpenDocument>;

    async fn read_file(&self, path: &str) -> Result<String>;

    /// Project files of `language`, in a stable order
    async fn project_files(&self, language: Language) -> Result<Vec<String>>;
}

/// Workspace held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkspace {
    open: Vec<OpenDocument>,
    files: HashMap<String, String>,
    order: Vec<String>,
}

impl InMemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an open document; later calls are treated as more recently active.
    #[must_use]
    pub fn with_open(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        let doc = OpenDocument::new(path, content);
        self.open.retain(|d| d.path != doc.path);
        self.add_file(&doc.path, &doc.content);
        self.open.insert(0, doc);
        self
    }

    /// Add a project file that is not open
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let content = content.into();
        self.add_file(&path, &content);
        self
    }

    fn add_file(&mut self, path: &str, content: &str) {
        if self.files.insert(path.to_string(), content.to_string()).is_none() {
            self.order.push(path.to_string());
        }
    }
}

#[async_trait]
impl Workspace for InMemoryWorkspace {
    async fn open_documents(&self) -> Vec<OpenDocument> {
        self.open.clone()
    }

    async fn read_file(&self, path: &str) -> Result<String> {
        if let Some(doc) = self.open.iter().find(|d| d.path == path) {
            return Ok(doc.content.clone());
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| AssemblerError::FileNotFound(path.to_string()))
    }

    async fn project_files(&self, language: Language) -> Result<Vec<String>> {
        Ok(self
            .order
            .iter()
            .filter(|path| Language::from_path(path.as_str()) == language)
            .cloned()
            .collect())
    }
}

const MAX_FILE_SIZE_BYTES: u64 = 1024 * 1024;

/// Workspace backed by a directory on disk.
///
/// Paths are relative to the root with `/` separators. "Open" documents are an
/// explicit list, read from disk on demand.
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
    open: Vec<String>,
}

impl FsWorkspace {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            open: Vec::new(),
        }
    }

    /// Open documents, most recently active first
    #[must_use]
    pub fn with_open_documents(mut self, paths: Vec<String>) -> Self {
        self.open = paths;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Source files under the root (.gitignore aware), sorted
    fn scan(&self, language: Language) -> Vec<String> {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true);

        let mut files = Vec::new();
        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|t| t.is_file()) {
                        continue;
                    }
                    let path = entry.path();
                    if Language::from_path(path) != language {
                        continue;
                    }
                    if entry
                        .metadata()
                        .is_ok_and(|meta| meta.len() > MAX_FILE_SIZE_BYTES)
                    {
                        log::debug!("Skipping large file {}", path.display());
                        continue;
                    }
                    files.push(self.relative(path));
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }
        files.sort();
        files
    }
}

#[async_trait]
impl Workspace for FsWorkspace {
    async fn open_documents(&self) -> Vec<OpenDocument> {
        let mut docs = Vec::with_capacity(self.open.len());
        for path in &self.open {
            match tokio::fs::read_to_string(self.resolve(path)).await {
                Ok(content) => docs.push(OpenDocument::new(path.clone(), content)),
                Err(err) => log::warn!("Skipping unreadable open document {path}: {err}"),
            }
        }
        docs
    }

    async fn read_file(&self, path: &str) -> Result<String> {
        match tokio::fs::read_to_string(self.resolve(path)).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(AssemblerError::FileNotFound(path.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn project_files(&self, language: Language) -> Result<Vec<String>> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.scan(language))
            .await
            .map_err(|err| AssemblerError::IoError(std::io::Error::other(err)))
    }
}
