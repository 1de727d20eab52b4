//! Project loading: file discovery, reading and parsing.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::syntax::{Dialect, SourceFile, SyntaxError};

/// Errors that can occur while loading a project.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// The project root does not exist.
    #[error("project root not found: {0}")]
    RootNotFound(PathBuf),

    /// A source file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("failed to walk project: {0}")]
    Walk(#[from] ignore::Error),

    /// Glob pattern error.
    #[error("invalid exclude pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// A file could not be parsed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A file has an extension no grammar handles.
    #[error("unsupported source file: {0}")]
    Unsupported(PathBuf),
}

/// How project files are discovered and parsed.
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    /// Glob patterns to exclude, matched against relative and absolute paths.
    pub exclude: Vec<String>,
    /// Whether `.gitignore` rules are honoured.
    pub respect_gitignore: bool,
    /// Skip files that fail to parse instead of aborting.
    pub skip_invalid_files: bool,
}

/// A fully parsed snapshot of a project's source files.
#[derive(Debug, Default)]
pub struct Project {
    root: PathBuf,
    files: Vec<SourceFile>,
}

impl Project {
    /// Discovers, reads and parses every supported file under `root`.
    ///
    /// Files are enumerated in sorted path order.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing, a file cannot be read, or a
    /// file fails to parse while `skip_invalid_files` is off.
    pub fn load(root: &Path, options: &ProjectOptions) -> Result<Self, ProjectError> {
        if !root.exists() {
            return Err(ProjectError::RootNotFound(root.to_path_buf()));
        }

        let paths = discover_files(root, options)?;
        debug!("Discovered {} source files", paths.len());

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(dialect) = Dialect::for_path(&path) else {
                continue;
            };
            let source = std::fs::read_to_string(&path).map_err(|e| ProjectError::Io {
                path: path.clone(),
                source: e,
            })?;
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();

            match SourceFile::parse(&path, relative, source, dialect) {
                Ok(file) => files.push(file),
                Err(e @ SyntaxError::Invalid { .. }) if options.skip_invalid_files => {
                    warn!("Skipping unparsable file: {e}");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Builds a project from in-memory sources, kept in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if a path has an unsupported extension or a source
    /// fails to parse.
    pub fn from_sources<I, P, S>(sources: I) -> Result<Self, ProjectError>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        let mut files = Vec::new();
        for (path, source) in sources {
            let path = path.into();
            let dialect =
                Dialect::for_path(&path).ok_or_else(|| ProjectError::Unsupported(path.clone()))?;
            files.push(SourceFile::parse(
                path.clone(),
                path,
                source.into(),
                dialect,
            )?);
        }
        Ok(Self {
            root: PathBuf::new(),
            files,
        })
    }

    /// Root directory the project was loaded from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parsed files in enumeration order.
    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Number of parsed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the project has no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn discover_files(root: &Path, options: &ProjectOptions) -> Result<Vec<PathBuf>, ProjectError> {
    let patterns = options
        .exclude
        .iter()
        .map(|p| glob::Pattern::new(p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .filter_entry(|entry| entry.file_name() != ".git");

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || Dialect::for_path(path).is_none() {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path);
        if should_exclude(rel, path, &options.exclude, &patterns) {
            debug!("Excluding: {}", path.display());
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Checks a path against exclude globs.
fn should_exclude(rel: &Path, abs: &Path, raw: &[String], patterns: &[glob::Pattern]) -> bool {
    let rel_str = rel.to_string_lossy();
    let abs_str = abs.to_string_lossy();

    if patterns
        .iter()
        .any(|p| p.matches(&rel_str) || p.matches(&abs_str))
    {
        return true;
    }

    // Directory-style patterns like "**/node_modules/**" also match a path component.
    raw.iter().any(|pattern| {
        let clean = pattern.replace("**/", "").replace("/**", "");
        if clean.is_empty() || clean.contains('*') {
            return false;
        }
        if clean.contains('/') {
            rel_str.contains(&clean)
        } else {
            rel.components().any(|c| c.as_os_str() == clean.as_str())
        }
    })
}
