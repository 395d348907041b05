//! End-to-end cache manager tests against a mock forge.

use std::fs;
use std::io::{Cursor, Write};

use mockito::{Mock, Server, ServerGuard};
use tempfile::TempDir;
use url::Url;

use forge_modules::{CacheError, ForgeSource, ModuleManager, Ref, SemVer};

/// Builds a zip archive the way forges do: everything under a single
/// wrapper folder named after the repository and ref.
fn forge_zip(wrapper: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(&mut buf);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    writer
        .add_directory(format!("{wrapper}/"), options)
        .unwrap();
    for (name, content) in files {
        writer
            .start_file(format!("{wrapper}/{name}"), options)
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    buf.into_inner()
}

async fn archive_mock(server: &mut ServerGuard, tag: &str, hits: usize) -> Mock {
    let body = forge_zip(
        &format!("widgets-{tag}"),
        &[("module.js", "export default {}"), ("src/index.js", "hi")],
    );
    server
        .mock("GET", format!("/org/widgets/archive/{tag}.zip").as_str())
        .with_status(200)
        .with_header("content-type", "application/zip")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

/// A manager for a Gitea-style repository served by the mock server.
fn manager_for(server: &Server, cache_root: &TempDir) -> ModuleManager<ForgeSource> {
    let repository = Url::parse(&format!("{}/org/widgets.git", server.url())).unwrap();
    ModuleManager::new(
        ForgeSource::new(repository),
        Some(SemVer::parse("1.0.0").unwrap()),
        None,
        cache_root.path().join("cache"),
    )
}

#[tokio::test]
async fn download_and_extract_materializes_the_ref() {
    let mut server = Server::new_async().await;
    let mock = archive_mock(&mut server, "1.0.0", 1).await;
    let temp = TempDir::new().unwrap();
    let mut manager = manager_for(&server, &temp);

    let tag = Ref::tag("1.0.0").unwrap();
    let path = manager.download_and_extract(&tag, false).await.unwrap();

    assert_eq!(path, manager.local_path_for(&tag));
    // the wrapper folder is stripped: the root holds the files directly
    assert!(path.join("module.js").is_file());
    assert!(path.join("src/index.js").is_file());
    assert!(!path.join("widgets-1.0.0").exists());
    assert_eq!(manager.local_versions()[&tag], path);

    // a second call is a cache hit with no network activity
    let again = manager.download_and_extract(&tag, false).await.unwrap();
    assert_eq!(again, path);
    mock.assert_async().await;
}

#[tokio::test]
async fn overwrite_deletes_and_refetches() {
    let mut server = Server::new_async().await;
    let mock = archive_mock(&mut server, "1.0.0", 2).await;
    let temp = TempDir::new().unwrap();
    let mut manager = manager_for(&server, &temp);

    let tag = Ref::tag("1.0.0").unwrap();
    let path = manager.download_and_extract(&tag, false).await.unwrap();
    fs::write(path.join("stale.txt"), "leftover from a previous run").unwrap();

    let path = manager.download_and_extract(&tag, true).await.unwrap();

    assert!(!path.join("stale.txt").exists());
    assert!(path.join("module.js").is_file());
    mock.assert_async().await;
}

#[tokio::test]
async fn failed_download_leaves_no_index_entry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/org/widgets/archive/9.9.9.zip")
        .with_status(404)
        .create_async()
        .await;
    let temp = TempDir::new().unwrap();
    let mut manager = manager_for(&server, &temp);

    let tag = Ref::tag("9.9.9").unwrap();
    let result = manager.download_and_extract(&tag, false).await;

    mock.assert_async().await;
    assert!(matches!(
        result,
        Err(CacheError::Source(forge_modules::SourceError::Http {
            status: 404,
            ..
        }))
    ));
    assert!(!manager.has_local(&tag));
    assert!(!manager.local_path_for(&tag).exists());
}

#[tokio::test]
async fn a_corrupt_archive_fails_after_the_rescan() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/org/widgets/archive/1.0.0.zip")
        .with_status(200)
        .with_header("content-type", "application/zip")
        .with_body("these are not the bytes you are looking for")
        .create_async()
        .await;
    let temp = TempDir::new().unwrap();
    let mut manager = manager_for(&server, &temp);

    let tag = Ref::tag("1.0.0").unwrap();
    let result = manager.download_and_extract(&tag, false).await;

    mock.assert_async().await;
    assert!(matches!(result, Err(CacheError::Extract(_))));
    assert!(!manager.has_local(&tag));
    assert!(!manager.local_path_for(&tag).exists());
}

#[tokio::test]
async fn removed_refs_can_be_downloaded_again() {
    let mut server = Server::new_async().await;
    let mock = archive_mock(&mut server, "1.0.0", 2).await;
    let temp = TempDir::new().unwrap();
    let mut manager = manager_for(&server, &temp);

    let tag = Ref::tag("1.0.0").unwrap();
    let path = manager.download_and_extract(&tag, false).await.unwrap();

    manager.remove_local(&tag).unwrap();
    assert!(!manager.has_local(&tag));
    assert!(!path.exists());

    // overwrite=false re-creates it from the network
    let path = manager.download_and_extract(&tag, false).await.unwrap();
    assert!(path.join("module.js").is_file());
    assert!(manager.has_local(&tag));
    mock.assert_async().await;
}

#[tokio::test]
async fn a_fresh_manager_rediscovers_the_cache_by_scanning() {
    let mut server = Server::new_async().await;
    let _mock = archive_mock(&mut server, "1.0.0", 1).await;
    let temp = TempDir::new().unwrap();

    let tag = Ref::tag("1.0.0").unwrap();
    {
        let mut manager = manager_for(&server, &temp);
        manager.download_and_extract(&tag, false).await.unwrap();
    }

    // the on-disk cache outlives the manager
    let mut manager = manager_for(&server, &temp);
    assert!(!manager.has_local(&tag));
    manager.scan_local_cache().unwrap();
    assert!(manager.has_local(&tag));
}

#[tokio::test]
async fn refresh_then_pick_then_download_round_trip() {
    let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
    <feed xmlns="http://www.w3.org/2005/Atom">
        <id>tag:example,2008:feed</id>
        <title>tags</title>
        <updated>2023-03-01T00:00:00Z</updated>
        <link rel="alternate" href="https://example.com/releases"/>
        <entry>
            <id>tag:example,2008:Repository/1/2.0.0</id>
            <title>2.0.0</title>
            <updated>2023-03-01T00:00:00Z</updated>
            <link rel="alternate" href="https://example.com/releases/tag/2.0.0"/>
        </entry>
        <entry>
            <id>tag:example,2008:Repository/1/1.2.0</id>
            <title>1.2.0</title>
            <updated>2023-02-01T00:00:00Z</updated>
            <link rel="alternate" href="https://example.com/releases/tag/1.2.0"/>
        </entry>
        <entry>
            <id>tag:example,2008:Repository/1/1.0.0</id>
            <title>1.0.0</title>
            <updated>2023-01-01T00:00:00Z</updated>
            <link rel="alternate" href="https://example.com/releases/tag/1.0.0"/>
        </entry>
    </feed>"#;

    let mut server = Server::new_async().await;
    let feed_mock = server
        .mock("GET", "/org/widgets/tags.atom")
        .with_status(200)
        .with_header("content-type", "application/atom+xml")
        .with_body(feed)
        .create_async()
        .await;
    let archive = archive_mock(&mut server, "1.2.0", 1).await;

    let temp = TempDir::new().unwrap();
    let mut manager = manager_for(&server, &temp);

    manager.refresh().await.unwrap();
    feed_mock.assert_async().await;
    assert_eq!(manager.remote_refs().len(), 3);

    // installed 1.0.0: 2.0.0 fails the major gate, 1.2.0 wins
    let latest = manager.latest_compatible_ref().unwrap();
    assert_eq!(latest.reference, Ref::tag("1.2.0").unwrap());

    let path = manager
        .download_and_extract(&latest.reference, false)
        .await
        .unwrap();
    archive.assert_async().await;
    assert!(path.join("module.js").is_file());
}
