//! Batch processor tests with a stub provider, exercising directory
//! mirroring, fault isolation, and artifact naming without any real
//! document backend.

use async_trait::async_trait;
use lamina::layout::{LayoutDetector, StructuralLayoutDetector};
use lamina::types::{DocumentMetadata, IngestedDocument};
use lamina::{
    AssetStorage, BatchProcessor, DocumentExtractor, ExtractionConfig, ExtractorProvider,
    JsonResultWriter, LaminaError, ProviderRegistry, Result,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Claims `.txt` files. The file's content is its page count; a stem
/// containing "bad" fails extraction.
struct StubProvider;

struct StubExtractor;

impl ExtractorProvider for StubProvider {
    fn supports(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "txt")
    }

    fn create(
        &self,
        _storage: Arc<dyn AssetStorage>,
        _detector: Arc<dyn LayoutDetector>,
    ) -> Arc<dyn DocumentExtractor> {
        Arc::new(StubExtractor)
    }
}

#[async_trait]
impl DocumentExtractor for StubExtractor {
    async fn extract(&self, path: &Path) -> Result<IngestedDocument> {
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        if stem.contains("bad") {
            return Err(LaminaError::parse(format!("Unreadable document: {stem}")));
        }

        let pages: u32 = std::fs::read_to_string(path)?
            .trim()
            .parse()
            .map_err(|_| LaminaError::parse("Page count fixture is not a number"))?;

        Ok(IngestedDocument::new(
            DocumentMetadata {
                filename: stem.to_lowercase(),
                file_hash: "00".repeat(32),
                total_pages: pages,
                processing_time_ms: 1,
            },
            Vec::new(),
        ))
    }
}

fn processor() -> BatchProcessor {
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(StubProvider));
    BatchProcessor::new(
        Arc::new(registry),
        Arc::new(StructuralLayoutDetector::new()),
        Arc::new(JsonResultWriter::new()),
        ExtractionConfig::default(),
    )
}

fn populate(root: &Path) -> PathBuf {
    let input = root.join("in");
    std::fs::create_dir_all(input.join("nested")).unwrap();
    std::fs::write(input.join("first.txt"), "2").unwrap();
    std::fs::write(input.join("nested").join("second.txt"), "3").unwrap();
    std::fs::write(input.join("bad.txt"), "1").unwrap();
    std::fs::write(input.join("other.bin"), "ignored").unwrap();
    input
}

#[tokio::test]
async fn test_batch_summary_and_fault_isolation() {
    let dir = tempfile::tempdir().unwrap();
    let input = populate(dir.path());
    let output = dir.path().join("out");

    let summary = processor().process(&input, &output, true).await.unwrap();

    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.total_pages, 5);
}

#[tokio::test]
async fn test_output_mirrors_input_structure() {
    let dir = tempfile::tempdir().unwrap();
    let input = populate(dir.path());
    let output = dir.path().join("out");

    processor().process(&input, &output, true).await.unwrap();

    assert!(output.join("first.json").exists());
    assert!(output.join("nested").join("second.json").exists());
    // the failing file leaves no artifact
    assert!(!output.join("bad.json").exists());
    // unsupported files are skipped entirely
    assert!(!output.join("other.json").exists());

    let artifact = std::fs::read_to_string(output.join("first.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&artifact).unwrap();
    assert_eq!(parsed["metadata"]["totalPages"], 2);
}

#[tokio::test]
async fn test_flat_directory_with_unsupported_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("a.txt"), "2").unwrap();
    std::fs::write(input.join("b.txt"), "3").unwrap();
    std::fs::write(input.join("c.bin"), "not ours").unwrap();

    let output = dir.path().join("out");
    let summary = processor().process(&input, &output, false).await.unwrap();

    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.files_failed, 0);
    assert_eq!(summary.total_pages, 5);
    assert_eq!(
        std::fs::read_dir(&output)
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().extension().is_some_and(|x| x == "json"))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_non_recursive_stays_at_top_level() {
    let dir = tempfile::tempdir().unwrap();
    let input = populate(dir.path());
    let output = dir.path().join("out");

    let summary = processor().process(&input, &output, false).await.unwrap();

    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.total_pages, 2);
    assert!(!output.join("nested").join("second.json").exists());
}

#[tokio::test]
async fn test_existing_artifact_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("first.txt"), "1").unwrap();

    let output = dir.path().join("out");
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("first.json"), "pre-existing").unwrap();

    processor().process(&input, &output, false).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(output.join("first.json")).unwrap(),
        "pre-existing"
    );
    assert!(output.join("first_1.json").exists());
}

#[tokio::test]
async fn test_missing_input_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = processor()
        .process(&dir.path().join("absent"), &dir.path().join("out"), false)
        .await;
    assert!(matches!(result, Err(LaminaError::Validation { .. })));
}
