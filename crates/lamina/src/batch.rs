//! Concurrent multi-file processing.
//!
//! The batch processor walks an input directory, hands each supported file
//! to its provider's extractor, and mirrors the directory structure in the
//! output. One file failing never aborts the batch; the failure is logged
//! and recorded in the returned summary.

use crate::config::ExtractionConfig;
use crate::error::{LaminaError, Result};
use crate::fsutil::resolve_unique_path;
use crate::layout::LayoutDetector;
use crate::providers::ProviderRegistry;
use crate::storage::LocalAssetStorage;
use crate::writer::ResultWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Aggregated outcome of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub files_processed: u64,
    pub files_failed: u64,
    pub total_pages: u64,
}

/// Orchestrates extraction of every supported file under a directory.
pub struct BatchProcessor {
    registry: Arc<ProviderRegistry>,
    detector: Arc<dyn LayoutDetector>,
    writer: Arc<dyn ResultWriter>,
    config: ExtractionConfig,
}

impl BatchProcessor {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        detector: Arc<dyn LayoutDetector>,
        writer: Arc<dyn ResultWriter>,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            registry,
            detector,
            writer,
            config,
        }
    }

    /// Process every supported file under `input`, writing artifacts under
    /// `output` with the input's directory structure mirrored. `recursive`
    /// false limits the walk to the top level.
    pub async fn process(
        &self,
        input: &Path,
        output: &Path,
        recursive: bool,
    ) -> Result<BatchSummary> {
        if !input.is_dir() {
            return Err(LaminaError::validation(format!(
                "Input directory does not exist or is not a directory: {}",
                input.display()
            )));
        }
        std::fs::create_dir_all(output)?;

        let files = collect_supported_files(input, &self.registry, recursive)?;
        info!(files = files.len(), input = %input.display(), "Batch started");

        let max_concurrent = self
            .config
            .max_concurrent_extractions
            .unwrap_or_else(|| num_cpus::get() * 2);
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let total_pages = Arc::new(AtomicU64::new(0));

        let mut tasks = JoinSet::new();
        for file in files {
            let registry = Arc::clone(&self.registry);
            let detector = Arc::clone(&self.detector);
            let writer = Arc::clone(&self.writer);
            let semaphore = Arc::clone(&semaphore);
            let total_pages = Arc::clone(&total_pages);
            let input = input.to_path_buf();
            let output = output.to_path_buf();

            tasks.spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore never closed");
                let result =
                    process_file(&file, &input, &output, &registry, &detector, &writer).await;
                match result {
                    Ok(pages) => {
                        total_pages.fetch_add(u64::from(pages), Ordering::Relaxed);
                        true
                    }
                    Err(e) => {
                        error!(file = %file.display(), error = %e, "File failed, continuing batch");
                        false
                    }
                }
            });
        }

        let mut summary = BatchSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => summary.files_processed += 1,
                Ok(false) => summary.files_failed += 1,
                Err(e) => {
                    error!(error = %e, "Extraction task panicked");
                    summary.files_failed += 1;
                }
            }
        }
        summary.total_pages = total_pages.load(Ordering::Relaxed);

        info!(
            processed = summary.files_processed,
            failed = summary.files_failed,
            pages = summary.total_pages,
            "Batch completed"
        );
        Ok(summary)
    }
}

/// Extract one file and write its artifact; returns the page count.
async fn process_file(
    file: &Path,
    input_root: &Path,
    output_root: &Path,
    registry: &ProviderRegistry,
    detector: &Arc<dyn LayoutDetector>,
    writer: &Arc<dyn ResultWriter>,
) -> Result<u32> {
    let provider = registry.require_provider_for(file)?;

    let relative = file.strip_prefix(input_root).unwrap_or(file);
    let target_dir = match relative.parent() {
        Some(parent) if parent.as_os_str().is_empty() => output_root.to_path_buf(),
        Some(parent) => output_root.join(parent),
        None => output_root.to_path_buf(),
    };
    std::fs::create_dir_all(&target_dir)?;

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let storage = Arc::new(LocalAssetStorage::new(
        target_dir.join(format!("{stem}_assets")),
    ));
    let extractor = provider.create(storage, Arc::clone(detector));
    let document = extractor.extract(file).await?;

    let desired = target_dir.join(format!("{stem}{}", writer.extension()));
    let artifact = resolve_unique_path(&desired)?;
    writer.write(&document, &artifact)?;

    Ok(document.metadata.total_pages)
}

/// Supported files under `root`, in a stable order. Unsupported files are
/// logged at warn level and skipped. An unreadable `root` fails the batch;
/// an unreadable nested directory is logged and skipped so the rest of the
/// walk survives.
fn collect_supported_files(
    root: &Path,
    registry: &ProviderRegistry,
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut directories: Vec<PathBuf> = Vec::new();
    collect_directory(root, registry, recursive, &mut files, &mut directories)?;

    while let Some(directory) = directories.pop() {
        if let Err(e) =
            collect_directory(&directory, registry, recursive, &mut files, &mut directories)
        {
            warn!(directory = %directory.display(), error = %e, "Directory unreadable, skipping");
        }
    }

    files.sort();
    Ok(files)
}

fn collect_directory(
    directory: &Path,
    registry: &ProviderRegistry,
    recursive: bool,
    files: &mut Vec<PathBuf>,
    directories: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                directories.push(path);
            }
        } else if registry.provider_for(&path).is_some() {
            files.push(path);
        } else {
            warn!(file = %path.display(), "No provider for file, skipping");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{DocumentExtractor, ExtractorProvider};
    use crate::storage::AssetStorage;

    struct TxtProvider;
    impl ExtractorProvider for TxtProvider {
        fn supports(&self, path: &Path) -> bool {
            path.extension().is_some_and(|e| e == "txt")
        }
        fn create(
            &self,
            _storage: Arc<dyn AssetStorage>,
            _detector: Arc<dyn LayoutDetector>,
        ) -> Arc<dyn DocumentExtractor> {
            unimplemented!("not exercised")
        }
    }

    fn txt_registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(TxtProvider));
        registry
    }

    #[test]
    fn test_collect_respects_recursion_flag() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("top.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("skip.bin"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("deep.txt"), b"x").unwrap();

        let registry = txt_registry();

        let flat = collect_supported_files(dir.path(), &registry, false).unwrap();
        assert_eq!(flat.len(), 1);
        assert!(flat[0].ends_with("top.txt"));

        let deep = collect_supported_files(dir.path(), &registry, true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_collect_fails_on_missing_root() {
        let registry = txt_registry();
        assert!(collect_supported_files(Path::new("/nonexistent/input"), &registry, true).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("top.txt"), b"x").unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::write(locked.join("deep.txt"), b"x").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let result = collect_supported_files(dir.path(), &txt_registry(), true);

        // restore so the tempdir can be cleaned up
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        // readable siblings survive the unreadable subdirectory (when the
        // test runs as root the subdirectory stays readable, which only adds
        // deep.txt to the result)
        let files = result.unwrap();
        assert!(files.iter().any(|f| f.ends_with("top.txt")));
    }
}
