use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use handout_core::Registry;
use handout_server::{routes, state::AppState};

async fn spawn_server(registry: Arc<Registry>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::router(AppState::new(registry));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn fixture(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn listing_links_registered_files() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir, "report.pdf", b"%PDF-1.4 stub");

    let registry = Arc::new(Registry::new());
    let id = registry.register(&file).unwrap();
    let addr = spawn_server(registry).await;

    let resp = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let body = resp.text().await.unwrap();
    assert!(body.contains(&format!("/download/{id}")));
    assert!(body.contains("report.pdf"));
}

#[tokio::test]
async fn listing_is_empty_on_fresh_registry() {
    let addr = spawn_server(Arc::new(Registry::new())).await;

    let resp = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert!(!resp.text().await.unwrap().contains("/download/"));
}

#[tokio::test]
async fn download_returns_bytes_and_filename_hint() {
    let dir = tempfile::tempdir().unwrap();
    let contents = b"hello from handout".to_vec();
    let file = fixture(&dir, "notes.txt", &contents);

    let registry = Arc::new(Registry::new());
    let id = registry.register(&file).unwrap();
    let addr = spawn_server(registry).await;

    let resp = reqwest::get(format!("http://{addr}/download/{id}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let headers = resp.headers().clone();
    assert_eq!(
        headers.get("content-disposition").unwrap(),
        "attachment; filename=\"notes.txt\""
    );
    assert_eq!(headers.get("content-type").unwrap(), "text/plain");
    assert_eq!(resp.content_length(), Some(contents.len() as u64));

    let body = resp.bytes().await.unwrap();
    assert_eq!(&body[..], &contents[..]);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let addr = spawn_server(Arc::new(Registry::new())).await;

    let resp = reqwest::get(format!("http://{addr}/download/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vanished_file_is_gone() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir, "ephemeral.bin", b"soon deleted");

    let registry = Arc::new(Registry::new());
    let id = registry.register(&file).unwrap();
    let addr = spawn_server(registry).await;
    let url = format!("http://{addr}/download/{id}");

    // Downloadable while the file exists.
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(&resp.bytes().await.unwrap()[..], b"soon deleted");

    std::fs::remove_file(&file).unwrap();

    // Vanished files are distinguishable from unknown ids: 410, not 404.
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::GONE);
}

#[tokio::test]
async fn registration_is_visible_to_running_server() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(Registry::new());
    let addr = spawn_server(registry.clone()).await;

    let body = reqwest::get(format!("http://{addr}/"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!body.contains("late.txt"));

    let file = fixture(&dir, "late.txt", b"registered after startup");
    let id = registry.register(&file).unwrap();

    let body = reqwest::get(format!("http://{addr}/"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(&format!("/download/{id}")));
    assert!(body.contains("late.txt"));

    let resp = reqwest::get(format!("http://{addr}/download/{id}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(&resp.bytes().await.unwrap()[..], b"registered after startup");
}

#[tokio::test]
async fn names_with_markup_are_escaped_in_listing() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir, "<b>bold</b>.txt", b"markup name");

    let registry = Arc::new(Registry::new());
    registry.register(&file).unwrap();
    let addr = spawn_server(registry).await;

    let body = reqwest::get(format!("http://{addr}/"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("&lt;b&gt;bold&lt;/b&gt;.txt"));
    assert!(!body.contains("<b>bold</b>"));
}
