use async_trait::async_trait;
use context_code_window::Position;
use context_retrieval::{
    ClipboardContent, EditorSources, FileHost, Location, RecentlyEditedRange, Result,
    RetrievalError, SymbolNavigator,
};
use ignore::WalkBuilder;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Files above this size are never read as candidates
const MAX_FILE_SIZE_BYTES: u64 = 1024 * 1024;

/// Workspace rooted at one directory on disk
#[derive(Debug, Clone)]
pub struct LocalHost {
    root: PathBuf,
}

impl LocalHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files under the root, honoring `.gitignore` and skipping hidden paths
    fn scan(root: &Path) -> Vec<String> {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .require_git(false);

        let mut files = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if entry.metadata().is_ok_and(|meta| meta.len() > MAX_FILE_SIZE_BYTES) {
                log::debug!("Skipping large file {}", entry.path().display());
                continue;
            }
            files.push(entry.path().to_string_lossy().into_owned());
        }
        files.sort();
        files
    }
}

#[async_trait]
impl FileHost for LocalHost {
    async fn read_file(&self, path: &str) -> Result<String> {
        tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => RetrievalError::not_found(path),
            _ => RetrievalError::Io(e),
        })
    }

    async fn workspace_dirs(&self) -> Result<Vec<String>> {
        Ok(vec![self.root.to_string_lossy().into_owned()])
    }

    async fn list_files(&self) -> Result<Vec<String>> {
        let root = self.root.clone();
        let files = tokio::task::spawn_blocking(move || Self::scan(&root))
            .await
            .map_err(|e| RetrievalError::host(format!("workspace scan panicked: {e}")))?;
        log::debug!("Found {} files under {}", files.len(), self.root.display());
        Ok(files)
    }
}

/// Navigator for hosts without a language server
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNavigator;

#[async_trait]
impl SymbolNavigator for NullNavigator {
    async fn definition(&self, _path: &str, _position: Position) -> Result<Option<Location>> {
        Ok(None)
    }

    async fn references(&self, _path: &str, _position: Position) -> Result<Vec<Location>> {
        Ok(Vec::new())
    }
}

/// Split `git diff` output into one entry per file
pub fn split_diff(output: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    for line in output.lines() {
        if line.starts_with("diff --git ") || entries.is_empty() {
            entries.push(String::new());
        }
        if let Some(entry) = entries.last_mut() {
            if !entry.is_empty() {
                entry.push('\n');
            }
            entry.push_str(line);
        }
    }
    entries.retain(|entry| !entry.trim().is_empty());
    entries
}

/// Editor state a terminal can offer: the repository diff and nothing else
#[derive(Debug, Clone)]
pub struct GitEditor {
    repo: PathBuf,
}

impl GitEditor {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }
}

#[async_trait]
impl EditorSources for GitEditor {
    async fn clipboard(&self) -> Result<Option<ClipboardContent>> {
        Ok(None)
    }

    async fn diff(&self, staged: bool) -> Result<Vec<String>> {
        let mut command = Command::new("git");
        command.arg("-C").arg(&self.repo).arg("diff");
        if staged {
            command.arg("--cached");
        }
        let output = command
            .output()
            .await
            .map_err(|e| RetrievalError::host(format!("failed to run git: {e}")))?;
        if !output.status.success() {
            return Err(RetrievalError::host(format!(
                "git diff failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(split_diff(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn recently_edited_ranges(&self) -> Result<Vec<RecentlyEditedRange>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_split_diff_per_file() {
        let output = "diff --git a/a.py b/a.py\n+x = 1\ndiff --git a/b.py b/b.py\n-y = 2\n";
        assert_eq!(
            split_diff(output),
            vec![
                "diff --git a/a.py b/a.py\n+x = 1".to_string(),
                "diff --git a/b.py b/b.py\n-y = 2".to_string(),
            ]
        );
        assert!(split_diff("").is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let host = LocalHost::new(dir.path());
        let missing = dir.path().join("gone.py");
        let err = host.read_file(&missing.to_string_lossy()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_files_honors_gitignore() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("build/out.py"), "x = 1").unwrap();
        fs::write(dir.path().join("src/app.py"), "x = 1").unwrap();

        let host = LocalHost::new(dir.path());
        let files = host.list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app.py"));
    }

    #[tokio::test]
    async fn test_null_navigator_finds_nothing() {
        let nav = NullNavigator;
        assert!(nav.definition("a.py", Position::new(0, 0)).await.unwrap().is_none());
        assert!(nav.references("a.py", Position::new(0, 0)).await.unwrap().is_empty());
    }
}
