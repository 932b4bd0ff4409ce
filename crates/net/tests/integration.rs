//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose, Engine as _};
    use flate2::write::{GzEncoder, ZlibEncoder};
    use flate2::Compression;
    use httpmock::prelude::*;
    use lwdump_config::Config;
    use lwdump_errors::{DownloadError, Error, ProtocolError};
    use lwdump_events::{channel, AppEvent, DownloadEvent, GeneralEvent, ProtocolEvent};
    use lwdump_net::*;
    use lwdump_types::protocol::{DEFAULT_ENCRYPTION_KEY, USER_AGENT};
    use lwdump_types::{ClientState, FailurePolicy, GenericRequest, Manifest};
    use serde_json::json;
    use std::io::Write;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::watch;

    const ROTATED_KEY: &str = "0123456789abcdef";

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    /// Response envelope with a plain (init) body
    fn plain_envelope(body: &serde_json::Value, key: &str) -> serde_json::Value {
        let cipher = lwdump_crypto::encrypt(body.to_string().as_bytes(), key).unwrap();
        json!({ "status": 0, "now": "2024-01-01 00:00:00", "body": cipher })
    }

    /// Response envelope with a zlib-compressed body
    fn compressed_envelope(body: &serde_json::Value, key: &str) -> serde_json::Value {
        let cipher = lwdump_crypto::encrypt(&zlib(body.to_string().as_bytes()), key).unwrap();
        json!({ "status": 0, "now": "2024-01-01 00:00:00", "body": cipher })
    }

    fn config_for(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.protocol.api_base = server.url("/app/");
        config
    }

    /// Mount a handshake that retargets the client to `/app2/`
    fn mock_handshake(server: &MockServer) -> httpmock::Mock<'_> {
        let real_base = general_purpose::STANDARD.encode(server.url("/app2/"));
        let body = json!({
            "session_id": "sess-1",
            "response_time": 1,
            "api_server": real_base,
            "resource_server": "https://res.example.test/",
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/app/game_init")
                .header("x-unity-version", "2021.3.11f1")
                .header("user-agent", USER_AGENT)
                .json_body_partial(r#"{"session_id": null, "app_version": 43, "resource_version": 0}"#);
            then.status(200)
                .json_body(plain_envelope(&body, DEFAULT_ENCRYPTION_KEY));
        })
    }

    async fn ready_client(server: &MockServer) -> ProtocolClient {
        let handshake = mock_handshake(server);
        let client = ProtocolClient::connect(&config_for(server), None)
            .await
            .unwrap();
        handshake.assert();
        client
    }

    fn manifest_with(names: &[&str]) -> Manifest {
        let assets: Vec<_> = names
            .iter()
            .map(|name| {
                json!({
                    "Key": 1, "Type": 0, "Name": name, "Hash": "", "Crc": 0,
                    "Size": 5, "AssetPaths": [], "DownloadBundle": []
                })
            })
            .collect();
        serde_json::from_value(json!({ "AssetInfos": assets })).unwrap()
    }

    #[tokio::test]
    async fn test_bootstrap_retargets_and_version_get() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();
        let handshake = mock_handshake(&server);

        let version_body = json!({
            "session_id": "sess-2",
            "encryption_key": "ffffffffffffffff",
            "response_time": 2,
            "version": 120,
            "resource_path": "https://cdn.example.test/resource/",
            "master_path": "https://cdn.example.test/master/",
            "assetbundle_path": "https://cdn.example.test/ab/",
            "resource_version": 5,
        });
        let version = server.mock(|when, then| {
            // {"platform_type":1} under the default key
            when.method(POST).path("/app2/version_get").json_body_partial(
                r#"{"session_id": "sess-1", "body": "xHNPIf7uHtu+2QoJPTGfJaXJ42bafEWnLkHJ+JIktaU="}"#,
            );
            then.status(200)
                .json_body(compressed_envelope(&version_body, DEFAULT_ENCRYPTION_KEY));
        });

        let mut client = ProtocolClient::new(&config_for(&server), Some(tx)).unwrap();
        assert_eq!(client.state(), ClientState::Uninitialized);

        let init = client.bootstrap().await.unwrap();
        assert_eq!(init.resource_server.as_deref(), Some("https://res.example.test/"));
        assert!(client.is_ready());
        assert_eq!(client.session().api_base().as_str(), server.url("/app2/"));
        assert_eq!(client.session().session_id(), Some("sess-1"));

        let response = client.version_get().await.unwrap().unwrap();
        assert_eq!(response.version, 120);
        assert_eq!(response.content_paths()[1].1, "https://cdn.example.test/master/");

        // session id follows the response, the key does not rotate on version_get
        assert_eq!(client.session().session_id(), Some("sess-2"));
        assert_eq!(client.session().encryption_key(), DEFAULT_ENCRYPTION_KEY);

        handshake.assert();
        version.assert();

        let mut saw_handshake = false;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Protocol(ProtocolEvent::HandshakeCompleted { api_base, .. }) = event {
                assert_eq!(api_base, server.url("/app2/"));
                saw_handshake = true;
            }
        }
        assert!(saw_handshake);
    }

    #[tokio::test]
    async fn test_generic_response_rotates_key() {
        let server = MockServer::start();
        let mut client = ready_client(&server).await;

        let rotate = server.mock(|when, then| {
            when.method(POST).path("/app2/user_get");
            then.status(200).json_body(compressed_envelope(
                &json!({
                    "session_id": "sess-3",
                    "encryption_key": ROTATED_KEY,
                    "response_time": 3,
                    "user": { "name": "reimu" },
                }),
                DEFAULT_ENCRYPTION_KEY,
            ));
        });

        let response = client
            .send(GenericRequest::new("user_get").into())
            .await
            .unwrap()
            .unwrap();
        let generic = response.into_generic().unwrap();
        assert_eq!(generic.fields["user"]["name"], "reimu");
        assert_eq!(client.session().encryption_key(), ROTATED_KEY);
        assert_eq!(client.session().session_id(), Some("sess-3"));
        rotate.assert();

        // the next request is encrypted and decrypted with the rotated key
        let expected_body = lwdump_crypto::encrypt(b"{}", ROTATED_KEY).unwrap();
        let follow_up = server.mock(|when, then| {
            when.method(POST)
                .path("/app2/item_get")
                .json_body_partial(json!({ "session_id": "sess-3", "body": expected_body }).to_string());
            then.status(200).json_body(compressed_envelope(
                &json!({ "session_id": "sess-4", "response_time": 4 }),
                ROTATED_KEY,
            ));
        });

        let response = client
            .send(GenericRequest::new("item_get").into())
            .await
            .unwrap();
        assert!(response.is_some());
        // no key in the response: the rotated key stays
        assert_eq!(client.session().encryption_key(), ROTATED_KEY);
        follow_up.assert();
    }

    #[tokio::test]
    async fn test_rotation_to_unusable_key_keeps_current_key() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();
        let handshake = mock_handshake(&server);
        let mut client = ProtocolClient::new(&config_for(&server), Some(tx)).unwrap();
        client.bootstrap().await.unwrap();
        handshake.assert();

        server.mock(|when, then| {
            when.method(POST).path("/app2/login");
            then.status(200).json_body(compressed_envelope(
                &json!({
                    "session_id": "sess-5",
                    "encryption_key": "twenty-byte-key-xxxx",
                    "response_time": 5,
                }),
                DEFAULT_ENCRYPTION_KEY,
            ));
        });

        let response = client.send(GenericRequest::new("login").into()).await.unwrap();
        assert!(response.is_some());
        assert_eq!(client.session().session_id(), Some("sess-5"));
        assert_eq!(client.session().encryption_key(), DEFAULT_ENCRYPTION_KEY);

        // later requests still reach the server under the current key
        let expected_body = lwdump_crypto::encrypt(b"{}", DEFAULT_ENCRYPTION_KEY).unwrap();
        let next = server.mock(|when, then| {
            when.method(POST)
                .path("/app2/next")
                .json_body_partial(json!({ "session_id": "sess-5", "body": expected_body }).to_string());
            then.status(200).json_body(compressed_envelope(
                &json!({ "session_id": "sess-6", "response_time": 6 }),
                DEFAULT_ENCRYPTION_KEY,
            ));
        });
        let response = client.send(GenericRequest::new("next").into()).await.unwrap();
        assert!(response.is_some());
        next.assert_hits(1);

        let mut rejected = 0;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::General(GeneralEvent::Warning { message, .. }) = event {
                assert!(message.contains("login"));
                assert!(message.contains("invalid key length: 20 bytes"));
                rejected += 1;
            }
        }
        assert_eq!(rejected, 1);
    }

    #[tokio::test]
    async fn test_unusable_bodies_return_none_and_keep_session() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();
        let handshake = mock_handshake(&server);
        let mut client = ProtocolClient::new(&config_for(&server), Some(tx)).unwrap();
        client.bootstrap().await.unwrap();
        handshake.assert();

        server.mock(|when, then| {
            when.method(POST).path("/app2/empty_get");
            then.status(200)
                .json_body(json!({ "status": 1, "now": "x", "error_message": "maintenance" }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/app2/wrong_key_get");
            then.status(200).json_body(compressed_envelope(
                &json!({ "session_id": "never" }),
                "0123456789abcdef0123456789abcdef",
            ));
        });
        server.mock(|when, then| {
            // uncompressed body where a compressed one is expected
            when.method(POST).path("/app2/plain_get");
            then.status(200).json_body(plain_envelope(
                &json!({ "session_id": "never" }),
                DEFAULT_ENCRYPTION_KEY,
            ));
        });

        for route in ["empty_get", "wrong_key_get", "plain_get"] {
            let before = client.session().clone();
            let response = client.send(GenericRequest::new(route).into()).await.unwrap();
            assert!(response.is_none(), "{route} should yield no response");
            assert_eq!(client.session(), &before);
        }

        let checked = client
            .send_checked(GenericRequest::new("plain_get").into())
            .await
            .unwrap_err();
        assert!(matches!(checked, Error::Protocol(ProtocolError::Decompress { .. })));

        let mut server_messages = 0;
        let mut dropped = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Protocol(ProtocolEvent::ServerMessage { message, status, .. }) => {
                    assert_eq!(message, "maintenance");
                    assert_eq!(status, 1);
                    server_messages += 1;
                }
                AppEvent::Protocol(ProtocolEvent::ResponseDropped { .. }) => dropped += 1,
                _ => {}
            }
        }
        assert_eq!(server_messages, 1);
        assert_eq!(dropped, 3);
    }

    #[tokio::test]
    async fn test_bootstrap_failure_is_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/app/game_init");
            then.status(500).body("oops");
        });

        let err = ProtocolClient::connect(&config_for(&server), None)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Protocol(ProtocolError::HandshakeFailed { .. })));
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_bad_api_server() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/app/game_init");
            then.status(200).json_body(plain_envelope(
                &json!({ "session_id": "s", "response_time": 0, "api_server": "%%%" }),
                DEFAULT_ENCRYPTION_KEY,
            ));
        });

        let mut client = ProtocolClient::new(&config_for(&server), None).unwrap();
        let err = client.bootstrap().await.unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::HandshakeFailed { .. })));
        assert_eq!(client.state(), ClientState::Uninitialized);
    }

    #[tokio::test]
    async fn test_manifest_fetch_and_persist() {
        let server = MockServer::start();
        let (tx, _rx) = channel();
        let document = json!({
            "AssetInfos": [
                { "Key": 2, "Type": 1, "Name": "m1.bin", "Hash": "abc", "Crc": 42, "Size": 10,
                  "AssetPaths": ["Master/m1"], "DownloadBundle": [], "DevelopParam": null }
            ],
            "ResourceInfos": [{ "EndAt": 0, "Name": "r1" }],
            "Unit": [{ "EndAt": 0, "Id": 1 }],
            "Picture": null,
        });
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/master/7f5cb74af5d7f4b82200738fdbdc5a45");
            then.status(200).body(gzip(document.to_string().as_bytes()));
        });

        let fetcher = ManifestFetcher::new(NetClient::with_defaults().unwrap(), Some(tx));
        let dump = tempdir().unwrap();
        let manifest = fetcher
            .fetch_and_persist("master", &server.url("/master/"), dump.path())
            .await
            .unwrap();
        mock.assert();

        assert_eq!(manifest.asset_entries[0].name, "m1.bin");
        assert_eq!(manifest.asset_entries[0].checksum, 42);
        assert_eq!(manifest.master_entries().count(), 1);

        let copy = tokio::fs::read_to_string(dump.path().join("master.json"))
            .await
            .unwrap();
        assert!(copy.contains('\n'));
        let reread: Manifest = serde_json::from_str(&copy).unwrap();
        assert_eq!(reread, manifest);
    }

    #[tokio::test]
    async fn test_manifest_persist_failure_does_not_fail_fetch() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/r/7f5cb74af5d7f4b82200738fdbdc5a45");
            then.status(200).body(gzip(b"{}"));
        });

        let dump = tempdir().unwrap();
        // a file where the dump directory should be
        let blocked = dump.path().join("blocked");
        tokio::fs::write(&blocked, b"x").await.unwrap();

        let fetcher = ManifestFetcher::new(NetClient::with_defaults().unwrap(), None);
        let manifest = fetcher
            .fetch_and_persist("resource", &server.url("/r/"), &blocked.join("dump"))
            .await
            .unwrap();
        assert!(manifest.asset_entries.is_empty());
    }

    /// Entries left directly under a dump root after a batch
    fn root_entries(root: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(root)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_download_all_writes_every_asset() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();
        for (name, content) in [("a.bin", "aaaaa"), ("b.bin", "bbbbb"), ("sub/c.bin", "ccccc")] {
            server.mock(|when, then| {
                when.method(GET).path(format!("/ab/{name}"));
                then.status(200).body(content);
            });
        }

        let dump = tempdir().unwrap();
        let downloader = AssetDownloader::new(NetClient::with_defaults().unwrap(), Some(tx));
        let manifest = manifest_with(&["a.bin", "b.bin", "sub/c.bin"]);
        let report = downloader
            .download_all("assetbundle", &server.url("/ab/"), &manifest, dump.path())
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.successful, 3);
        assert_eq!(report.total_bytes, 15);

        let root = dump.path().join("assetbundle");
        assert_eq!(tokio::fs::read(root.join("a.bin")).await.unwrap(), b"aaaaa");
        assert_eq!(tokio::fs::read(root.join("sub/c.bin")).await.unwrap(), b"ccccc");
        assert_eq!(root_entries(dump.path()), vec!["assetbundle".to_string()]);

        let mut counts = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Download(DownloadEvent::AssetCompleted { completed, total, .. }) = event
            {
                assert_eq!(total, 3);
                counts.push(completed);
            }
        }
        assert_eq!(counts, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_isolate_keeps_going_after_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/m/good.bin");
            then.status(200).body("fine!");
        });
        server.mock(|when, then| {
            when.method(GET).path("/m/missing.bin");
            then.status(404);
        });

        let dump = tempdir().unwrap();
        let downloader = AssetDownloader::new(NetClient::with_defaults().unwrap(), None)
            .with_policy(FailurePolicy::Isolate);
        let manifest = manifest_with(&["missing.bin", "../escape.bin", "good.bin"]);
        let report = downloader
            .download_all("master", &server.url("/m/"), &manifest, dump.path())
            .await
            .unwrap();

        assert_eq!(report.successful, 1);
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .any(|f| matches!(f.error, Error::Download(DownloadError::InvalidAssetName { .. }))));
        assert!(dump.path().join("master/good.bin").exists());
        assert!(!dump.path().join("master/missing.bin").exists());
        assert!(!dump.path().join("escape.bin").exists());
        assert_eq!(root_entries(dump.path()), vec!["master".to_string()]);
        assert_eq!(root_entries(&dump.path().join("master")), vec!["good.bin".to_string()]);
    }

    #[tokio::test]
    async fn test_names_resembling_partial_files_do_not_collide() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();
        let large = vec![b'a'; 4_000_000];
        server.mock(|when, then| {
            when.method(GET).path("/m/a.bin");
            then.status(200).body(large.clone());
        });
        server.mock(|when, then| {
            when.method(GET).path("/m/a.bin.download");
            then.status(200).body("second-asset");
        });
        let repeated = server.mock(|when, then| {
            when.method(GET).path("/m/b.bin");
            then.status(200).body("bbbbb");
        });

        let dump = tempdir().unwrap();
        let downloader = AssetDownloader::new(NetClient::with_defaults().unwrap(), Some(tx));
        let manifest = manifest_with(&["a.bin", "a.bin.download", "b.bin", "b.bin"]);
        let report = downloader
            .download_all("master", &server.url("/m/"), &manifest, dump.path())
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.total, 3);
        assert_eq!(report.successful, 3);
        repeated.assert_hits(1);

        let root = dump.path().join("master");
        assert_eq!(tokio::fs::read(root.join("a.bin")).await.unwrap(), large);
        assert_eq!(
            tokio::fs::read(root.join("a.bin.download")).await.unwrap(),
            b"second-asset"
        );
        assert_eq!(tokio::fs::read(root.join("b.bin")).await.unwrap(), b"bbbbb");
        assert_eq!(root_entries(dump.path()), vec!["master".to_string()]);

        let mut duplicate_warnings = 0;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::General(GeneralEvent::Warning { message, .. }) = event {
                assert!(message.contains("b.bin"));
                duplicate_warnings += 1;
            }
        }
        assert_eq!(duplicate_warnings, 1);
    }

    #[tokio::test]
    async fn test_abort_cancels_remaining_assets() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/m/bad.bin");
            then.status(500);
        });
        let later = server.mock(|when, then| {
            when.method(GET).path_contains("/m/later");
            then.status(200).body("later");
        });

        let dump = tempdir().unwrap();
        let downloader = AssetDownloader::new(NetClient::with_defaults().unwrap(), None)
            .with_policy(FailurePolicy::Abort)
            .with_max_concurrent(1);
        let manifest = manifest_with(&["bad.bin", "later1.bin", "later2.bin"]);
        let err = downloader
            .download_all("master", &server.url("/m/"), &manifest, dump.path())
            .await
            .unwrap_err();

        match err {
            Error::Download(DownloadError::AssetFailed { asset, .. }) => {
                assert_eq!(asset, "bad.bin");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(later.hits(), 0);
    }

    #[tokio::test]
    async fn test_external_cancellation() {
        let token = CancellationToken::new();
        token.cancel();

        let dump = tempdir().unwrap();
        let downloader = AssetDownloader::new(NetClient::with_defaults().unwrap(), None)
            .with_cancellation(token);
        let err = downloader
            .download_all(
                "master",
                "http://127.0.0.1:9/",
                &manifest_with(&["a.bin", "b.bin"]),
                dump.path(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Download(DownloadError::Cancelled { completed: 0, total: 2, .. })
        ));
    }

    #[derive(Default)]
    struct StubStats {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        served: AtomicUsize,
    }

    /// HTTP stub that holds every request open until `release` turns true
    async fn holding_server(release: watch::Receiver<bool>) -> (SocketAddr, Arc<StubStats>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stats = Arc::new(StubStats::default());

        let shared = stats.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let stats = shared.clone();
                let mut release = release.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        let n = socket.read(&mut buf).await.unwrap();
                        if n == 0 {
                            return;
                        }
                        request.extend_from_slice(&buf[..n]);
                    }

                    let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    stats.peak.fetch_max(now, Ordering::SeqCst);
                    let _ = release.wait_for(|released| *released).await;
                    stats.in_flight.fetch_sub(1, Ordering::SeqCst);
                    stats.served.fetch_add(1, Ordering::SeqCst);

                    let response =
                        "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nasset";
                    socket.write_all(response.as_bytes()).await.unwrap();
                    let _ = socket.shutdown().await;
                });
            }
        });

        (addr, stats)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_never_exceeds_limit() {
        let (release_tx, release_rx) = watch::channel(false);
        let (addr, stats) = holding_server(release_rx).await;

        let names: Vec<String> = (0..100).map(|i| format!("asset{i:03}.bin")).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let manifest = manifest_with(&name_refs);

        let dump = tempdir().unwrap();
        let downloader = AssetDownloader::new(NetClient::with_defaults().unwrap(), None);
        assert_eq!(downloader.max_concurrent(), 16);
        let remote = format!("http://{addr}/ab/");

        let controller = async {
            tokio::time::timeout(Duration::from_secs(10), async {
                while stats.in_flight.load(Ordering::SeqCst) < 16 {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .unwrap();
            // give any request past the limit a chance to show up
            tokio::time::sleep(Duration::from_millis(200)).await;
            assert_eq!(stats.peak.load(Ordering::SeqCst), 16);
            release_tx.send(true).unwrap();
        };

        let (report, ()) = tokio::join!(
            downloader.download_all("assetbundle", &remote, &manifest, dump.path()),
            controller
        );
        let report = report.unwrap();

        assert_eq!(report.successful, 100);
        assert_eq!(stats.served.load(Ordering::SeqCst), 100);
        assert_eq!(stats.peak.load(Ordering::SeqCst), 16);
        assert!(dump.path().join("assetbundle/asset099.bin").exists());
    }
}
