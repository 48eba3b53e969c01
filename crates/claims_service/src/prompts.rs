//! Prompt template lookup.
//!
//! Templates are plain UTF-8 files read from disk on every request. A name is
//! resolved against an ordered list of `prompts` directories and the first
//! existing file wins.

use std::path::{Path, PathBuf};

use crate::error::RelayError;

pub const PROMPTS_DIR_NAME: &str = "prompts";

#[derive(Debug, Clone)]
pub struct PromptLoader {
    roots: Vec<PathBuf>,
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptLoader {
    /// Loader over the default search locations, see [`PromptLoader::default_roots`].
    pub fn new() -> Self {
        Self {
            roots: Self::default_roots(),
        }
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Search `dir` before every other location.
    pub fn with_override(mut self, dir: impl Into<PathBuf>) -> Self {
        self.roots.insert(0, dir.into());
        self
    }

    /// `<cwd>/../prompts`, then `<install dir>/../../../prompts`.
    pub fn default_roots() -> Vec<PathBuf> {
        let mut roots = Vec::with_capacity(2);
        if let Ok(cwd) = std::env::current_dir() {
            roots.push(cwd.join("..").join(PROMPTS_DIR_NAME));
        }
        if let Some(install_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            roots.push(
                install_dir
                    .join("..")
                    .join("..")
                    .join("..")
                    .join(PROMPTS_DIR_NAME),
            );
        }
        roots
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        self.roots.iter().map(|root| root.join(name)).collect()
    }

    /// First candidate path for `name` that exists on disk. Does not open it.
    pub fn resolve_prompt_path(&self, name: &str) -> Option<PathBuf> {
        self.candidates(name).into_iter().find(|path| path.exists())
    }

    pub async fn load_prompt_text(path: &Path) -> Result<String, RelayError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RelayError::PromptRead {
                path: path.to_path_buf(),
                source,
            })
    }

    pub async fn load(&self, name: &str) -> Result<String, RelayError> {
        let path = self
            .resolve_prompt_path(name)
            .ok_or_else(|| RelayError::PromptNotFound {
                name: name.to_string(),
                searched: self.candidates(name),
            })?;
        tracing::debug!("Loading prompt '{}' from {}", name, path.display());
        Self::load_prompt_text(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_prompt(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn default_roots_search_cwd_parent_first() {
        let roots = PromptLoader::default_roots();
        let cwd = std::env::current_dir().unwrap();

        assert_eq!(roots[0], cwd.join("..").join("prompts"));
        assert!(roots
            .last()
            .unwrap()
            .ends_with(Path::new("..").join("..").join("..").join("prompts")));
    }

    #[test]
    fn resolve_prefers_primary_location() {
        let primary = TempDir::new().unwrap();
        let fallback = TempDir::new().unwrap();
        write_prompt(&primary, "parse-prompt.txt", "primary");
        write_prompt(&fallback, "parse-prompt.txt", "fallback");

        let loader = PromptLoader::with_roots(vec![
            primary.path().to_path_buf(),
            fallback.path().to_path_buf(),
        ]);

        assert_eq!(
            loader.resolve_prompt_path("parse-prompt.txt"),
            Some(primary.path().join("parse-prompt.txt"))
        );
    }

    #[test]
    fn resolve_falls_back_to_secondary_location() {
        let primary = TempDir::new().unwrap();
        let fallback = TempDir::new().unwrap();
        write_prompt(&fallback, "process-prompt.txt", "fallback");

        let loader = PromptLoader::with_roots(vec![
            primary.path().to_path_buf(),
            fallback.path().to_path_buf(),
        ]);

        assert_eq!(
            loader.resolve_prompt_path("process-prompt.txt"),
            Some(fallback.path().join("process-prompt.txt"))
        );
        assert_eq!(loader.resolve_prompt_path("missing.txt"), None);
    }

    #[test]
    fn override_is_searched_first() {
        let base = TempDir::new().unwrap();
        let custom = TempDir::new().unwrap();
        write_prompt(&base, "parse-prompt.txt", "base");
        write_prompt(&custom, "parse-prompt.txt", "custom");

        let loader = PromptLoader::with_roots(vec![base.path().to_path_buf()])
            .with_override(custom.path());

        assert_eq!(loader.roots()[0], custom.path());
        assert_eq!(
            loader.resolve_prompt_path("parse-prompt.txt"),
            Some(custom.path().join("parse-prompt.txt"))
        );
    }

    #[tokio::test]
    async fn load_rereads_file_on_every_call() {
        let dir = TempDir::new().unwrap();
        write_prompt(&dir, "parse-prompt.txt", "first version");
        let loader = PromptLoader::with_roots(vec![dir.path().to_path_buf()]);

        assert_eq!(loader.load("parse-prompt.txt").await.unwrap(), "first version");

        write_prompt(&dir, "parse-prompt.txt", "second version");
        assert_eq!(loader.load("parse-prompt.txt").await.unwrap(), "second version");
    }

    #[tokio::test]
    async fn load_reports_every_searched_path() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let loader = PromptLoader::with_roots(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);

        match loader.load("parse-prompt.txt").await {
            Err(RelayError::PromptNotFound { name, searched }) => {
                assert_eq!(name, "parse-prompt.txt");
                assert_eq!(
                    searched,
                    vec![
                        first.path().join("parse-prompt.txt"),
                        second.path().join("parse-prompt.txt"),
                    ]
                );
            }
            other => panic!("Expected PromptNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreadable_prompt_is_read_error() {
        let dir = TempDir::new().unwrap();
        // A directory exists under the prompt name but cannot be read as text.
        std::fs::create_dir(dir.path().join("parse-prompt.txt")).unwrap();
        let loader = PromptLoader::with_roots(vec![dir.path().to_path_buf()]);

        let result = loader.load("parse-prompt.txt").await;

        assert!(matches!(result, Err(RelayError::PromptRead { .. })));
    }
}
