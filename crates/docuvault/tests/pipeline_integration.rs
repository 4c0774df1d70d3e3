//! End-to-end tests over the manager façade: rule matching, the store
//! pipeline, retrieval, tagging, revisions and deletes against the local
//! storage backend.

use async_trait::async_trait;
use docuvault::core::config::DmsConfig;
use docuvault::core::manager::DocumentManager;
use docuvault::plugins::registry::WorkerRegistry;
use docuvault::plugins::{DocumentWorker, PipelineContext, Plugin, Stage};
use docuvault::storage::LocalStorage;
use docuvault::types::{Document, TagAction};
use docuvault::{DocuvaultError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<<>>\n%%EOF\n";
const JPEG_BYTES: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00, 0x01,
];

const CONFIG: &str = r#"
[[rule]]
id = 2
name = "Adlibre Invoices"
pattern = 'ADL-\d+'
canonical_code = "ADL-1234"

[[rule.binding]]
stage = "before_store"
plugin = "filetype-validator"
ordinal = 1
options = { allowed_mimetypes = ["application/pdf", "text/plain"] }

[[rule.binding]]
stage = "before_store"
plugin = "content-hash"
ordinal = 2

[[rule.binding]]
stage = "store"
plugin = "local-storage"
ordinal = 1

[[rule.binding]]
stage = "after_store"
plugin = "tagger"
ordinal = 1
"#;

fn build_manager(dir: &tempfile::TempDir) -> DocumentManager {
    let config = DmsConfig::from_toml_str(CONFIG).unwrap();
    let registry = WorkerRegistry::with_builtin_workers().unwrap();
    let backend = Arc::new(LocalStorage::new(dir.path()));
    DocumentManager::from_config(&config, &registry, backend).unwrap()
}

#[tokio::test]
async fn store_then_retrieve_pdf_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let manager = build_manager(&dir);

    let stored = manager.handle_store("ADL-1234", PDF_BYTES.to_vec(), &[]).await.unwrap();
    assert_eq!(stored.revision, Some(1));
    assert_eq!(stored.mimetype.as_deref(), Some("application/pdf"));
    assert_eq!(stored.suggested_extension.as_deref(), Some("pdf"));

    let retrieved = manager.handle_retrieve("ADL-1234", Some(1)).await.unwrap();
    assert_eq!(retrieved.content.as_deref(), Some(PDF_BYTES));
    assert_eq!(retrieved.mimetype.as_deref(), Some("application/pdf"));
    assert_eq!(retrieved.content_hash, stored.content_hash);
}

#[tokio::test]
async fn retrieve_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let manager = build_manager(&dir);
    manager.handle_store("ADL-1234", PDF_BYTES.to_vec(), &[]).await.unwrap();

    let first = manager.handle_retrieve("ADL-1234", Some(1)).await.unwrap();
    let second = manager.handle_retrieve("ADL-1234", Some(1)).await.unwrap();
    assert_eq!(first.content, second.content);
    assert_eq!(first.tags, second.tags);
    assert_eq!(first.content_hash, second.content_hash);
}

#[tokio::test]
async fn unmatched_code_is_rejected_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let manager = build_manager(&dir);

    let err = manager
        .handle_store("Z50141104", JPEG_BYTES.to_vec(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, DocuvaultError::NoMatchingRule { ref code } if code == "Z50141104"));

    // No file landed in the backend.
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn disallowed_file_type_is_rejected_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let manager = build_manager(&dir);

    let err = manager
        .handle_store("ADL-1234", JPEG_BYTES.to_vec(), &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DocuvaultError::Plugin { ref plugin_name, .. } if plugin_name == "filetype-validator"
    ));
    assert!(err.to_string().contains("image/jpeg"));
    assert!(!dir.path().join("ADL-1234").exists());
}

#[tokio::test]
async fn revisions_are_strictly_increasing() {
    let dir = tempfile::tempdir().unwrap();
    let manager = build_manager(&dir);

    for expected in 1..=3u32 {
        let doc = manager.handle_store("ADL-1985", PDF_BYTES.to_vec(), &[]).await.unwrap();
        assert_eq!(doc.revision, Some(expected));
    }
    assert_eq!(manager.revision_count("ADL-1985").await.unwrap(), 3);

    // Latest-revision retrieval resolves to the highest ordinal.
    let latest = manager.handle_retrieve("ADL-1985", None).await.unwrap();
    assert_eq!(latest.revision, Some(3));
}

#[tokio::test]
async fn tags_set_and_removed_via_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let manager = build_manager(&dir);

    // Tag applied by the after_store tagging worker.
    let actions = vec![TagAction::Add("test_tag".to_string())];
    let doc = manager
        .handle_store("ADL-1234", PDF_BYTES.to_vec(), &actions)
        .await
        .unwrap();
    assert!(doc.tags.contains("test_tag"));

    let info = manager.document_info("ADL-1234").await.unwrap();
    assert!(info.tags.contains("test_tag"));

    // Remove, then verify it is gone from document info.
    manager.remove_tag("ADL-1234", "test_tag").await.unwrap();
    let info = manager.document_info("ADL-1234").await.unwrap();
    assert!(!info.tags.contains("test_tag"));

    // And add again through the direct façade method.
    manager.add_tag("ADL-1234", "test_tag").await.unwrap();
    let info = manager.document_info("ADL-1234").await.unwrap();
    assert!(info.tags.contains("test_tag"));
}

#[tokio::test]
async fn revision_count_unknown_code_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let manager = build_manager(&dir);

    let err = manager.revision_count("ADL-4242").await.unwrap_err();
    assert!(matches!(err, DocuvaultError::NotFound(_)));
}

#[tokio::test]
async fn delete_revision_then_document() {
    let dir = tempfile::tempdir().unwrap();
    let manager = build_manager(&dir);

    manager.handle_store("ADL-7777", PDF_BYTES.to_vec(), &[]).await.unwrap();
    manager.handle_store("ADL-7777", PDF_BYTES.to_vec(), &[]).await.unwrap();

    manager.handle_delete("ADL-7777", Some(1)).await.unwrap();
    assert_eq!(manager.revision_count("ADL-7777").await.unwrap(), 1);
    assert!(manager.handle_retrieve("ADL-7777", Some(1)).await.is_err());
    assert!(manager.handle_retrieve("ADL-7777", Some(2)).await.is_ok());

    manager.handle_delete("ADL-7777", None).await.unwrap();
    let err = manager.handle_retrieve("ADL-7777", None).await.unwrap_err();
    assert!(matches!(err, DocuvaultError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Custom workers: fail-fast ordering across a three-step chain.

#[derive(Debug)]
struct CountingWorker {
    name: String,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl Plugin for CountingWorker {
    fn name(&self) -> &str {
        &self.name
    }
    fn version(&self) -> String {
        "1.0.0".to_string()
    }
    fn initialize(&self) -> Result<()> {
        Ok(())
    }
    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl DocumentWorker for CountingWorker {
    async fn work(&self, _document: &mut Document, _ctx: &PipelineContext<'_>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DocuvaultError::plugin(self.name(), "rejected by test worker"));
        }
        Ok(())
    }

    fn supported_stages(&self) -> &[Stage] {
        &[Stage::BeforeStore]
    }
}

#[tokio::test]
async fn failing_middle_worker_stops_the_chain() {
    let config = DmsConfig::from_toml_str(
        r#"
[[rule]]
id = 1
name = "Chained"
pattern = 'CHN-\d+'

[[rule.binding]]
stage = "before_store"
plugin = "step-one"
ordinal = 1

[[rule.binding]]
stage = "before_store"
plugin = "step-two"
ordinal = 2

[[rule.binding]]
stage = "before_store"
plugin = "step-three"
ordinal = 3

[[rule.binding]]
stage = "store"
plugin = "local-storage"
ordinal = 1
"#,
    )
    .unwrap();

    let calls_one = Arc::new(AtomicUsize::new(0));
    let calls_two = Arc::new(AtomicUsize::new(0));
    let calls_three = Arc::new(AtomicUsize::new(0));

    let mut registry = WorkerRegistry::with_builtin_workers().unwrap();
    for (name, calls, fail) in [
        ("step-one", &calls_one, false),
        ("step-two", &calls_two, true),
        ("step-three", &calls_three, false),
    ] {
        registry
            .register(Arc::new(CountingWorker {
                name: name.to_string(),
                calls: Arc::clone(calls),
                fail,
            }))
            .unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(LocalStorage::new(dir.path()));
    let manager = DocumentManager::from_config(&config, &registry, backend).unwrap();

    let err = manager.handle_store("CHN-1", PDF_BYTES.to_vec(), &[]).await.unwrap_err();

    assert!(matches!(
        err,
        DocuvaultError::Plugin { ref plugin_name, .. } if plugin_name == "step-two"
    ));
    assert_eq!(calls_one.load(Ordering::SeqCst), 1);
    assert_eq!(calls_two.load(Ordering::SeqCst), 1);
    // Fail-fast: the third step never executed, and nothing was stored.
    assert_eq!(calls_three.load(Ordering::SeqCst), 0);
    assert!(!dir.path().join("CHN-1").exists());
}

#[tokio::test]
async fn binding_order_follows_ordinals_not_configuration_order() {
    // step-two is configured first but carries the higher ordinal.
    let config = DmsConfig::from_toml_str(
        r#"
[[rule]]
id = 1
name = "Ordered"
pattern = 'ORD-\d+'

[[rule.binding]]
stage = "before_store"
plugin = "late-step"
ordinal = 2

[[rule.binding]]
stage = "before_store"
plugin = "early-step"
ordinal = 1

[[rule.binding]]
stage = "store"
plugin = "local-storage"
ordinal = 1
"#,
    )
    .unwrap();

    #[derive(Debug)]
    struct OrderWorker {
        name: String,
        log: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl Plugin for OrderWorker {
        fn name(&self) -> &str {
            &self.name
        }
        fn version(&self) -> String {
            "1.0.0".to_string()
        }
        fn initialize(&self) -> Result<()> {
            Ok(())
        }
        fn shutdown(&self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl DocumentWorker for OrderWorker {
        async fn work(&self, _document: &mut Document, _ctx: &PipelineContext<'_>) -> Result<()> {
            self.log.lock().unwrap().push(self.name.clone());
            Ok(())
        }

        fn supported_stages(&self) -> &[Stage] {
            &[Stage::BeforeStore]
        }
    }

    let log = Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut registry = WorkerRegistry::with_builtin_workers().unwrap();
    for name in ["late-step", "early-step"] {
        registry
            .register(Arc::new(OrderWorker {
                name: name.to_string(),
                log: Arc::clone(&log),
            }))
            .unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(LocalStorage::new(dir.path()));
    let manager = DocumentManager::from_config(&config, &registry, backend).unwrap();

    manager.handle_store("ORD-1", PDF_BYTES.to_vec(), &[]).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["early-step".to_string(), "late-step".to_string()]);
}
