//! Upload pipeline: expand dropped items into a flat file list, guard the
//! target paths against concurrent uploads, and run the multipart request
//! as an independent task.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{QualAiApi, UploadParams};
use crate::api::v1::QualAiApiV1;
use crate::config::QualAiConfig;
use crate::error::{AppError, Result};
use crate::files::walker::{self, CollectedFile, DiskEntry, DropEntry, EntryKind};

/// A file picked for upload, with the directory entry kept alongside when
/// the pick was a folder. Built per interaction and discarded once the
/// request resolves.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub file: PathBuf,
    pub entry: Option<DiskEntry>,
}

impl UploadItem {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entry = DiskEntry::from_path(&path)?;
        let entry = match entry.kind() {
            EntryKind::Directory => Some(entry),
            _ => None,
        };
        Ok(Self { file: path, entry })
    }
}

/// Expand upload items into the flat list sent as `files[]` parts.
///
/// Plain files keep their bare name; directories are walked recursively and
/// contribute paths rooted at the directory name.
pub async fn collect_upload_files(items: Vec<UploadItem>) -> Result<Vec<CollectedFile<PathBuf>>> {
    let mut collected = Vec::new();
    for item in items {
        match item.entry {
            Some(entry) => {
                let files = walker::read_all_files_from_entry(entry, String::new()).await?;
                collected.extend(files);
            }
            None => {
                let name = item
                    .file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| {
                        AppError::Io(format!("not a file path: {}", item.file.display()))
                    })?;
                collected.push(CollectedFile {
                    file: item.file,
                    path: name,
                });
            }
        }
    }
    Ok(collected)
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Pending,
    Uploading,
    Completed,
    Error(String),
}

/// Status of one upload interaction, shared with the UI and updated by the
/// spawned task.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub label: String,
    pub file_count: usize,
    pub state: UploadState,
}

pub type SharedUploadTask = Arc<Mutex<UploadTask>>;

/// Registry of target paths with an upload in flight. A second upload
/// touching any registered path is rejected up front instead of racing the
/// first one.
#[derive(Debug, Clone, Default)]
pub struct UploadRegistry {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl UploadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim all target paths, or fail if any of them is already in flight.
    pub fn try_begin(&self, paths: &[String]) -> Result<InFlightGuard> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| AppError::Internal("upload registry lock poisoned".into()))?;
        for path in paths {
            if in_flight.contains(path) {
                return Err(AppError::Internal(format!(
                    "upload already in flight for '{path}'"
                )));
            }
        }
        for path in paths {
            in_flight.insert(path.clone());
        }
        Ok(InFlightGuard {
            registry: self.in_flight.clone(),
            paths: paths.to_vec(),
        })
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().map(|set| set.len()).unwrap_or(0)
    }
}

/// Releases the claimed paths when the upload resolves or rejects.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: Arc<Mutex<HashSet<String>>>,
    paths: Vec<String>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.registry.lock() {
            for path in &self.paths {
                in_flight.remove(path);
            }
        }
    }
}

/// Kick off one upload as an independent tokio task and return its shared
/// status immediately. The caller polls the status on tick; failures are
/// terminal for this interaction (logged, no retry).
pub fn start(
    files: Vec<CollectedFile<PathBuf>>,
    project: Option<String>,
    config: QualAiConfig,
    registry: &UploadRegistry,
) -> Result<SharedUploadTask> {
    let paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
    let guard = registry.try_begin(&paths)?;

    let label = match files.as_slice() {
        [] => "empty upload".to_string(),
        [only] => only.path.clone(),
        [first, ..] => format!("{} (+{} more)", first.path, files.len() - 1),
    };

    let task = Arc::new(Mutex::new(UploadTask {
        label: label.clone(),
        file_count: files.len(),
        state: UploadState::Pending,
    }));

    let shared = task.clone();
    tokio::spawn(async move {
        // Guard lives for the whole task so the paths stay claimed until
        // the request resolves or rejects.
        let _guard = guard;

        set_state(&shared, UploadState::Uploading);
        let result = run_upload(files, project, &config).await;
        match result {
            Ok(()) => {
                log::info!("upload: '{label}' completed");
                set_state(&shared, UploadState::Completed);
            }
            Err(e) => {
                log::error!("upload: '{label}' failed: {e}");
                set_state(&shared, UploadState::Error(e.to_string()));
            }
        }
    });

    Ok(task)
}

async fn run_upload(
    files: Vec<CollectedFile<PathBuf>>,
    project: Option<String>,
    config: &QualAiConfig,
) -> Result<()> {
    let api = QualAiApiV1::new(config)?;
    api.upload(UploadParams { files, project }).await
}

fn set_state(task: &SharedUploadTask, state: UploadState) {
    if let Ok(mut task) = task.lock() {
        task.state = state;
    }
}
