//! Recursive enumeration of dropped files and directories.
//!
//! The browser-style "dropped entry" handle is abstracted behind the
//! `DropEntry`/`EntryReader` traits: an entry knows whether it is a leaf and
//! can materialize its native file handle, and a directory hands out its
//! children in batches that must be re-read until an empty batch signals
//! exhaustion. `DiskEntry` supplies the real-filesystem implementation used
//! by the upload flow.

use std::collections::VecDeque;
use std::future::Future;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;

use crate::error::{AppError, Result};

/// Children returned per batch by the disk reader.
const DISK_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Unrecognized handle; walked as an empty subtree.
    Other,
}

/// A native file handle paired with its path relative to the drop root
/// (the root folder name is the first segment).
#[derive(Debug, Clone)]
pub struct CollectedFile<F> {
    pub file: F,
    pub path: String,
}

pub trait DropEntry: Send + Sized + 'static {
    type File: Send + 'static;
    type Reader: EntryReader<Entry = Self> + Send;

    fn name(&self) -> String;
    fn kind(&self) -> EntryKind;

    /// Materialize the native file handle for a leaf entry.
    fn file(&self) -> impl Future<Output = Result<Self::File>> + Send;

    /// Create a batched reader over a directory's children.
    fn reader(&self) -> Result<Self::Reader>;
}

pub trait EntryReader: Send {
    type Entry: DropEntry;

    /// Next batch of children. An empty batch means enumeration is complete;
    /// a single call may not return all children and must be re-invoked.
    fn read_batch(&mut self) -> impl Future<Output = Result<Vec<Self::Entry>>> + Send;
}

/// Recursively collect every file under `entry`.
///
/// Sibling children are spawned without waiting for each other; batches for
/// a single directory are requested sequentially, and all spawned subtrees
/// are joined before the directory resolves. A failure anywhere rejects the
/// whole subtree; no partial results are recovered. Result order follows
/// enumeration order and is not guaranteed sorted.
pub fn read_all_files_from_entry<E: DropEntry>(
    entry: E,
    path_prefix: String,
) -> BoxFuture<'static, Result<Vec<CollectedFile<E::File>>>> {
    Box::pin(async move {
        match entry.kind() {
            EntryKind::File => {
                let path = format!("{path_prefix}{}", entry.name());
                let file = entry.file().await?;
                Ok(vec![CollectedFile { file, path }])
            }
            EntryKind::Directory => {
                let child_prefix = format!("{path_prefix}{}/", entry.name());
                let mut reader = entry.reader()?;
                let mut handles = Vec::new();

                loop {
                    let batch = reader.read_batch().await?;
                    if batch.is_empty() {
                        break;
                    }
                    for child in batch {
                        handles.push(tokio::spawn(read_all_files_from_entry(
                            child,
                            child_prefix.clone(),
                        )));
                    }
                }

                let mut collected = Vec::new();
                for handle in handles {
                    let files = handle
                        .await
                        .map_err(|e| AppError::Internal(format!("walk task join error: {e}")))??;
                    collected.extend(files);
                }
                Ok(collected)
            }
            EntryKind::Other => Ok(Vec::new()),
        }
    })
}

/// Real-filesystem entry backing local file/directory uploads.
#[derive(Debug, Clone)]
pub struct DiskEntry {
    path: PathBuf,
    kind: EntryKind,
}

impl DiskEntry {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path)
            .map_err(|e| AppError::Io(format!("{}: {e}", path.display())))?;
        let kind = if metadata.is_file() {
            EntryKind::File
        } else if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };
        Ok(Self { path, kind })
    }
}

impl DropEntry for DiskEntry {
    type File = PathBuf;
    type Reader = DiskReader;

    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn kind(&self) -> EntryKind {
        self.kind
    }

    async fn file(&self) -> Result<PathBuf> {
        Ok(self.path.clone())
    }

    fn reader(&self) -> Result<DiskReader> {
        Ok(DiskReader {
            dir: self.path.clone(),
            pending: None,
        })
    }
}

/// Batched directory reader over `std::fs::read_dir`.
///
/// The listing is loaded once on first read (off the async runtime via
/// `spawn_blocking`) and then handed out `DISK_BATCH_SIZE` children at a
/// time until exhausted.
pub struct DiskReader {
    dir: PathBuf,
    pending: Option<VecDeque<DiskEntry>>,
}

impl EntryReader for DiskReader {
    type Entry = DiskEntry;

    async fn read_batch(&mut self) -> Result<Vec<DiskEntry>> {
        if self.pending.is_none() {
            let dir = self.dir.clone();
            let entries = tokio::task::spawn_blocking(move || -> Result<VecDeque<DiskEntry>> {
                let mut out = VecDeque::new();
                for entry in std::fs::read_dir(&dir)? {
                    let entry = entry?;
                    out.push_back(DiskEntry::from_path(entry.path())?);
                }
                Ok(out)
            })
            .await
            .map_err(|e| AppError::Internal(format!("spawn_blocking join error: {e}")))??;
            self.pending = Some(entries);
        }

        let Some(pending) = self.pending.as_mut() else {
            return Ok(Vec::new());
        };
        let take = pending.len().min(DISK_BATCH_SIZE);
        Ok(pending.drain(..take).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// In-memory entry with a scripted batch schedule, for exercising the
    /// walk logic without a filesystem.
    struct ScriptedEntry {
        name: String,
        kind: EntryKind,
        batches: VecDeque<Vec<ScriptedEntry>>,
        fail_read: bool,
    }

    impl ScriptedEntry {
        fn file(name: &str) -> Self {
            Self {
                name: name.to_string(),
                kind: EntryKind::File,
                batches: VecDeque::new(),
                fail_read: false,
            }
        }

        fn dir(name: &str, batches: Vec<Vec<ScriptedEntry>>) -> Self {
            Self {
                name: name.to_string(),
                kind: EntryKind::Directory,
                batches: batches.into(),
                fail_read: false,
            }
        }

        fn other(name: &str) -> Self {
            Self {
                name: name.to_string(),
                kind: EntryKind::Other,
                batches: VecDeque::new(),
                fail_read: false,
            }
        }
    }

    impl Clone for ScriptedEntry {
        fn clone(&self) -> Self {
            Self {
                name: self.name.clone(),
                kind: self.kind,
                batches: self.batches.clone(),
                fail_read: self.fail_read,
            }
        }
    }

    struct ScriptedReader {
        batches: VecDeque<Vec<ScriptedEntry>>,
        fail: bool,
    }

    impl DropEntry for ScriptedEntry {
        type File = String;
        type Reader = ScriptedReader;

        fn name(&self) -> String {
            self.name.clone()
        }

        fn kind(&self) -> EntryKind {
            self.kind
        }

        async fn file(&self) -> Result<String> {
            Ok(self.name.clone())
        }

        fn reader(&self) -> Result<ScriptedReader> {
            Ok(ScriptedReader {
                batches: self.batches.clone(),
                fail: self.fail_read,
            })
        }
    }

    impl EntryReader for ScriptedReader {
        type Entry = ScriptedEntry;

        async fn read_batch(&mut self) -> Result<Vec<ScriptedEntry>> {
            if self.fail {
                return Err(AppError::Io("scripted read failure".into()));
            }
            Ok(self.batches.pop_front().unwrap_or_default())
        }
    }

    fn sorted_paths<F>(files: &[CollectedFile<F>]) -> Vec<String> {
        let mut paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
        paths.sort();
        paths
    }

    #[tokio::test]
    async fn test_file_entry_yields_single_collected_file() {
        let entry = ScriptedEntry::file("a.txt");
        let files = read_all_files_from_entry(entry, String::new())
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "a.txt");
        assert_eq!(files[0].file, "a.txt");
    }

    #[tokio::test]
    async fn test_flat_directory_prefixes_children() {
        let entry = ScriptedEntry::dir(
            "docs",
            vec![vec![
                ScriptedEntry::file("a.txt"),
                ScriptedEntry::file("b.txt"),
                ScriptedEntry::file("c.txt"),
            ]],
        );
        let files = read_all_files_from_entry(entry, String::new())
            .await
            .unwrap();
        assert_eq!(
            sorted_paths(&files),
            vec!["docs/a.txt", "docs/b.txt", "docs/c.txt"]
        );
    }

    #[tokio::test]
    async fn test_batched_enumeration_terminates_without_loss() {
        // 2 files, then 1 file, then the empty batch that ends enumeration.
        let entry = ScriptedEntry::dir(
            "d",
            vec![
                vec![ScriptedEntry::file("one"), ScriptedEntry::file("two")],
                vec![ScriptedEntry::file("three")],
            ],
        );
        let files = read_all_files_from_entry(entry, String::new())
            .await
            .unwrap();
        assert_eq!(sorted_paths(&files), vec!["d/one", "d/three", "d/two"]);
    }

    #[tokio::test]
    async fn test_nested_directories_accumulate_prefix() {
        let entry = ScriptedEntry::dir(
            "root",
            vec![vec![ScriptedEntry::dir(
                "sub",
                vec![vec![ScriptedEntry::file("leaf.txt")]],
            )]],
        );
        let files = read_all_files_from_entry(entry, String::new())
            .await
            .unwrap();
        assert_eq!(sorted_paths(&files), vec!["root/sub/leaf.txt"]);
    }

    #[tokio::test]
    async fn test_unrecognized_entry_resolves_empty() {
        let entry = ScriptedEntry::other("mystery");
        let files = read_all_files_from_entry(entry, String::new())
            .await
            .unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_rejects_whole_subtree() {
        let mut entry = ScriptedEntry::dir("d", vec![vec![ScriptedEntry::file("a")]]);
        entry.fail_read = true;
        let result = read_all_files_from_entry(entry, String::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_path_prefix_is_prepended() {
        let entry = ScriptedEntry::file("a.txt");
        let files = read_all_files_from_entry(entry, "pre/".to_string())
            .await
            .unwrap();
        assert_eq!(files[0].path, "pre/a.txt");
    }

    #[tokio::test]
    async fn test_disk_entry_walks_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "aaa").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("b.txt"), "bb").unwrap();

        let root_name = DiskEntry::from_path(dir.path()).unwrap().name();
        let entry = DiskEntry::from_path(dir.path()).unwrap();
        let files = read_all_files_from_entry(entry, String::new())
            .await
            .unwrap();

        assert_eq!(
            sorted_paths(&files),
            vec![format!("{root_name}/a.txt"), format!("{root_name}/sub/b.txt")]
        );
    }

    #[tokio::test]
    async fn test_disk_entry_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solo.txt");
        fs::write(&path, "hello").unwrap();

        let entry = DiskEntry::from_path(&path).unwrap();
        assert_eq!(entry.kind(), EntryKind::File);

        let files = read_all_files_from_entry(entry, String::new())
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "solo.txt");
        assert_eq!(files[0].file, path);
    }

    #[test]
    fn test_disk_entry_missing_path_is_io_error() {
        let result = DiskEntry::from_path("/nonexistent/path/xyz");
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
