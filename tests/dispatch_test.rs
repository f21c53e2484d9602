// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 分发器级别的端到端测试：在临时目录上构造文件系统场景，
//! 直接驱动 `dispatch`，校验响应的状态码、头部和响应体。

use tinyserve::dispatch;
use tinyserve::Request;
use tinyserve::Response;

use std::fs::{self, File};
use std::io::Write;
use std::net::SocketAddr;
use tempfile::TempDir;

fn addr() -> SocketAddr {
    "127.0.0.1:50000".parse().unwrap()
}

fn get(path: &str) -> Request {
    let raw = format!("GET {} HTTP/1.1\r\nHost: localhost:8000\r\n\r\n", path);
    Request::try_from(raw.as_bytes(), addr(), 0).unwrap()
}

fn serve(root: &TempDir, path: &str) -> Response {
    dispatch(&get(path), root.path().to_str().unwrap(), "python3", 0)
}

/// 从完整报文中切出头部与响应体
fn split_response(bytes: &[u8]) -> (String, Vec<u8>) {
    let split_at = bytes
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    let headers = String::from_utf8_lossy(&bytes[..split_at]).into_owned();
    let body = bytes[split_at + 4..].to_vec();
    (headers, body)
}

/// 场景：根目录含 a.html（字节 "hi"）→ GET /a.html → 200，响应体 hi
#[test]
fn test_serves_file_bytes() {
    let root = TempDir::new().unwrap();
    File::create(root.path().join("a.html"))
        .unwrap()
        .write_all(b"hi")
        .unwrap();

    let response = serve(&root, "/a.html");
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body(), b"hi");

    let (headers, body) = split_response(&response.as_bytes());
    assert!(headers.starts_with("HTTP/1.1 200 OK"));
    assert!(headers.contains("Content-Type: text/html"));
    assert!(headers.contains("Content-Length: 2"));
    assert_eq!(body, b"hi");
}

/// 二进制文件同样按字节原样返回
#[test]
fn test_serves_binary_file_exactly() {
    let root = TempDir::new().unwrap();
    let payload: Vec<u8> = (0u8..=255).collect();
    File::create(root.path().join("blob.bin"))
        .unwrap()
        .write_all(&payload)
        .unwrap();

    let response = serve(&root, "/blob.bin");
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body(), &payload[..]);
    assert_eq!(response.content_length(), payload.len() as u64);
}

/// 场景：GET /missing.txt（文件不存在）→ 404，响应体包含路径与 not found
#[test]
fn test_missing_file_renders_404() {
    let root = TempDir::new().unwrap();

    let response = serve(&root, "/missing.txt");
    assert_eq!(response.status_code(), 404);

    let body = String::from_utf8_lossy(response.body()).into_owned();
    assert!(body.contains("missing.txt"));
    assert!(body.contains("not found"));
    assert!(body.contains("Error accessing /missing.txt"));
}

/// 场景：docs/index.html 含 "welcome" → GET /docs/ → 200，响应体 welcome
#[test]
fn test_directory_with_index_serves_index() {
    let root = TempDir::new().unwrap();
    fs::create_dir(root.path().join("docs")).unwrap();
    File::create(root.path().join("docs").join("index.html"))
        .unwrap()
        .write_all(b"welcome")
        .unwrap();

    let response = serve(&root, "/docs/");
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body(), b"welcome");
}

/// 场景：空目录 empty/ → GET /empty/ → 200，空列表模板
#[test]
fn test_empty_directory_listing() {
    let root = TempDir::new().unwrap();
    fs::create_dir(root.path().join("empty")).unwrap();

    let response = serve(&root, "/empty/");
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body(), b"<html><body><ul></ul></body></html>");
}

/// 目录列表恰好包含全部非隐藏条目，且不含任何以 . 开头的条目
#[test]
fn test_directory_listing_visible_entries_only() {
    let root = TempDir::new().unwrap();
    let sub = root.path().join("share");
    fs::create_dir(&sub).unwrap();
    for name in ["notes.txt", "img.png", ".hidden", ".config"] {
        File::create(sub.join(name)).unwrap();
    }
    fs::create_dir(sub.join("nested")).unwrap();

    let response = serve(&root, "/share");
    assert_eq!(response.status_code(), 200);

    let body = String::from_utf8_lossy(response.body()).into_owned();
    let expected = concat!(
        "<html><body><ul>",
        "<li>img.png</li><br/><li>nested</li><br/><li>notes.txt</li>",
        "</ul></body></html>"
    );
    assert_eq!(body, expected);
}

/// 同一请求重复发出，响应体字节级一致（无文件系统变化时）
#[test]
fn test_repeat_requests_identical_bodies() {
    let root = TempDir::new().unwrap();
    let sub = root.path().join("dir");
    fs::create_dir(&sub).unwrap();
    File::create(sub.join("one.txt")).unwrap();

    for path in ["/dir", "/gone.html"] {
        let first = serve(&root, path);
        let second = serve(&root, path);
        assert_eq!(first.body(), second.body(), "path: {}", path);
        assert_eq!(first.status_code(), second.status_code());
    }
}

/// Content-Length 头与其后响应体的字节数严格一致
#[test]
fn test_content_length_always_exact() {
    let root = TempDir::new().unwrap();
    File::create(root.path().join("a.html"))
        .unwrap()
        .write_all("多字节 body".as_bytes())
        .unwrap();
    fs::create_dir(root.path().join("d")).unwrap();

    for path in ["/a.html", "/d", "/nothing-here"] {
        let response = serve(&root, path);
        let (headers, body) = split_response(&response.as_bytes());
        let declared: usize = headers
            .lines()
            .find_map(|l| l.trim_end().strip_prefix("Content-Length: "))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(declared, body.len(), "path: {}", path);
    }
}

/// 根路径 "/" 分类为目录：有 index.html 返回首页，没有则返回列表
#[test]
fn test_root_path_as_directory() {
    let root = TempDir::new().unwrap();
    File::create(root.path().join("index.html"))
        .unwrap()
        .write_all(b"home")
        .unwrap();

    let response = serve(&root, "/");
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body(), b"home");
}
