//! End-to-end adapter tests against a mock bee node.

use std::io::{Cursor, Read};
use std::sync::Arc;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use swarmfs_storage::{
    ConfigStore, InMemoryMetadataStore, InMemoryMimeRegistry, MetadataStore, MountCache,
    MountPoint, Storage, StorageBackends, StorageError, StorageParams, SwarmStorage,
};

struct FixedMounts(Vec<MountPoint>);

impl MountCache for FixedMounts {
    fn mounts_for_storage(&self, _storage_id: i64) -> Vec<MountPoint> {
        self.0.clone()
    }
}

struct FixedConfig(Option<String>);

impl ConfigStore for FixedConfig {
    fn app_value(&self, _key: &str) -> Option<String> {
        self.0.clone()
    }
}

/// Adapter wired to the mock node, sharing one metadata store.
fn storage(uri: &str, config: Option<&str>) -> (SwarmStorage, Arc<InMemoryMetadataStore>) {
    let metadata = Arc::new(InMemoryMetadataStore::new());
    let backends = StorageBackends {
        metadata: metadata.clone(),
        mime_types: Arc::new(InMemoryMimeRegistry::new()),
        mount_cache: Arc::new(FixedMounts(vec![MountPoint { mount_id: 7 }])),
        config: Arc::new(FixedConfig(config.map(String::from))),
    };
    // The adapter joins ip and port itself, so split the mock server's URI.
    let (ip, port) = uri.rsplit_once(':').expect("mock uri carries a port");
    let params = StorageParams {
        ip: Some(ip.to_string()),
        port: Some(port.parse().expect("mock uri port is numeric")),
        ..Default::default()
    };
    (SwarmStorage::new(params, 1, backends).unwrap(), metadata)
}

const CONFIGURED: &str = r#"[{"mount_id": 7, "encrypt": "0", "batchid": "abc123"}]"#;

#[tokio::test]
async fn write_then_stat_then_open_round_trips() {
    let server = MockServer::start().await;
    let content = vec![b'x'; 42];

    Mock::given(method("POST"))
        .and(path("/bzz"))
        .and(query_param("name", "todo.txt"))
        .and(header("swarm-postage-batch-id", "abc123"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "reference": "ref789"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bzz/ref789/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .mount(&server)
        .await;

    let uri = server.uri();
    let expected = content.clone();

    tokio::task::spawn_blocking(move || {
        let (storage, metadata) = storage(&uri, Some(CONFIGURED));

        let written = storage
            .write_stream(
                "notes/todo.txt",
                Box::new(Cursor::new(content)),
                Some(42),
            )
            .unwrap();
        assert_eq!(written, 42);

        let record = metadata.find("notes/todo.txt", 1).unwrap();
        assert_eq!(record.reference, "ref789");
        assert_eq!(record.size, 42);

        let meta = storage.metadata("notes/todo.txt").unwrap();
        assert_eq!(meta.size, 42);
        assert_eq!(meta.mime_type, "application/octet-stream");

        let mut stream = storage.open("notes/todo.txt", "r").unwrap();
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, expected);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn backend_rejection_leaves_no_metadata() {
    let server = MockServer::start().await;

    // Transport success, logical failure: 2xx body with no reference.
    Mock::given(method("POST"))
        .and(path("/bzz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "batch is overdrafted"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();

    tokio::task::spawn_blocking(move || {
        let (storage, metadata) = storage(&uri, Some(CONFIGURED));

        let result =
            storage.write_stream("a.txt", Box::new(Cursor::new(b"hello".to_vec())), None);
        match result {
            Err(StorageError::Transport(swarmfs_bee::Error::Rejected { message })) => {
                assert_eq!(message, "batch is overdrafted")
            }
            other => panic!("expected rejection, got {:?}", other),
        }

        assert!(metadata.find("a.txt", 1).is_err());
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn unconfigured_mount_makes_no_transport_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();

    tokio::task::spawn_blocking(move || {
        let (storage, metadata) = storage(&uri, None);

        let result = storage.write_stream("a.txt", Box::new(Cursor::new(b"hi".to_vec())), None);
        assert!(matches!(result, Err(StorageError::MissingBatch)));
        assert!(metadata.find("a.txt", 1).is_err());
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn mkdir_makes_no_record_and_no_transport_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();

    tokio::task::spawn_blocking(move || {
        let (storage, metadata) = storage(&uri, Some(CONFIGURED));

        storage.mkdir("photos").unwrap();
        assert!(metadata.list(1).unwrap().is_empty());
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn rewrite_replaces_the_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bzz"))
        .and(query_param("name", "a.txt"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "reference": "ref-new"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();

    tokio::task::spawn_blocking(move || {
        let (storage, metadata) = storage(&uri, Some(CONFIGURED));

        storage
            .write_stream("a.txt", Box::new(Cursor::new(b"one".to_vec())), None)
            .unwrap();
        storage
            .write_stream("a.txt", Box::new(Cursor::new(b"three!".to_vec())), None)
            .unwrap();

        let records = metadata.list(1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reference, "ref-new");
        assert_eq!(records[0].size, 6);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn unlink_drops_the_mapping_but_not_the_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bzz"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "reference": "ref1"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();

    tokio::task::spawn_blocking(move || {
        let (storage, metadata) = storage(&uri, Some(CONFIGURED));

        storage
            .write_stream("a.txt", Box::new(Cursor::new(b"bye".to_vec())), None)
            .unwrap();
        storage.unlink("a.txt").unwrap();

        assert!(metadata.find("a.txt", 1).is_err());
        assert!(matches!(
            storage.metadata("a.txt"),
            Err(StorageError::NotFound { .. })
        ));
        // No delete call ever goes to the node; only the mapping is gone.
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn opendir_lists_written_paths() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bzz"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "reference": "ref1"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();

    tokio::task::spawn_blocking(move || {
        let (storage, _metadata) = storage(&uri, Some(CONFIGURED));

        storage
            .write_stream("b.txt", Box::new(Cursor::new(b"b".to_vec())), None)
            .unwrap();
        storage
            .write_stream("a.txt", Box::new(Cursor::new(b"a".to_vec())), None)
            .unwrap();

        assert_eq!(storage.opendir("").unwrap(), vec!["a.txt", "b.txt"]);
    })
    .await
    .unwrap();
}
