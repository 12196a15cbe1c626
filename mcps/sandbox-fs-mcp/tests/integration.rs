//! Integration tests for the sandbox-fs MCP server
//!
//! Drives the server through its in-process tool surface against real
//! temporary directories.
//!
//! # Running tests
//!
//! ```bash
//! cargo test -p sandbox-fs-mcp --test integration
//! ```

use mcp_common::{CallToolResult, DispatchError, EmbeddableMcp};
use rmcp::model::RawContent;
use sandbox_fs_mcp::{Config, FilesystemMcpServer};
use serde_json::{json, Value};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    server: FilesystemMcpServer,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("root")).unwrap();
        std::fs::create_dir(dir.path().join("rootx")).unwrap();

        let root = dir.path().join("root").display().to_string();
        let server = FilesystemMcpServer::new(&Config::default(), &[root]).unwrap();
        Self { dir, server }
    }

    fn path(&self, rel: &str) -> String {
        self.dir.path().join("root").join(rel).display().to_string()
    }

    async fn call(&self, name: &str, args: Value) -> Result<String, DispatchError> {
        let result = self.server.call_tool(name, args).await?;
        Ok(text_of(&result))
    }

    async fn call_json(&self, name: &str, args: Value) -> Value {
        let text = self.call(name, args).await.unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect()
}

// ============================================================================
// SANDBOX BOUNDARY
// ============================================================================

#[tokio::test]
async fn escape_attempts_are_rejected() {
    let fx = Fixture::new();
    let attempts = [
        format!("{}/../escape.txt", fx.path("")),
        fx.dir.path().join("rootx/f.txt").display().to_string(),
        "/etc/passwd".to_string(),
    ];

    for path in attempts {
        let err = fx
            .call("write_file", json!({ "path": path, "content": "x" }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "PathNotAllowed", "{} should be rejected", path);
    }

    assert!(!fx.dir.path().join("escape.txt").exists());
    assert!(!fx.dir.path().join("rootx/f.txt").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn symlink_out_of_root_is_rejected() {
    let fx = Fixture::new();
    std::fs::write(fx.dir.path().join("rootx/secret.txt"), "secret").unwrap();
    std::os::unix::fs::symlink(fx.dir.path().join("rootx"), fx.dir.path().join("root/link"))
        .unwrap();

    let err = fx
        .call("read_text_file", json!({ "path": fx.path("link/secret.txt") }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "PathNotAllowed");
}

#[cfg(unix)]
#[tokio::test]
async fn dangling_symlink_cannot_create_outside_file() {
    let fx = Fixture::new();
    let target = fx.dir.path().join("rootx/created.txt");
    std::os::unix::fs::symlink(&target, fx.dir.path().join("root/trap")).unwrap();

    let err = fx
        .call("write_file", json!({ "path": fx.path("trap"), "content": "x" }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "PathNotAllowed");
    assert!(!target.exists());

    fx.call("delete_file", json!({ "path": fx.path("trap") }))
        .await
        .unwrap();
    assert!(std::fs::symlink_metadata(fx.dir.path().join("root/trap")).is_err());
}

#[tokio::test]
async fn allowed_directories_reported() {
    let fx = Fixture::new();
    let listed = fx.call_json("list_allowed_directories", json!({})).await;
    let expected = fx.dir.path().join("root").canonicalize().unwrap();
    assert_eq!(listed["allowed_directories"], json!([expected.display().to_string()]));
}

// ============================================================================
// FILE CONTENT
// ============================================================================

#[tokio::test]
async fn write_read_and_partial_reads() {
    let fx = Fixture::new();
    let path = fx.path("docs/notes.txt");
    let content = "alpha\nbeta\ngamma\n";

    fx.call("write_file", json!({ "path": path, "content": content }))
        .await
        .unwrap();

    assert_eq!(fx.call("read_text_file", json!({ "path": path })).await.unwrap(), content);
    assert_eq!(
        fx.call("read_text_file", json!({ "path": path, "head": 1 }))
            .await
            .unwrap(),
        "alpha\n"
    );
    assert_eq!(
        fx.call("read_text_file", json!({ "path": path, "tail": 2 }))
            .await
            .unwrap(),
        "beta\ngamma\n"
    );
}

#[tokio::test]
async fn read_multiple_keeps_going() {
    let fx = Fixture::new();
    std::fs::write(fx.dir.path().join("root/a.txt"), "A").unwrap();

    let result = fx
        .call_json(
            "read_multiple_files",
            json!({ "paths": [fx.path("a.txt"), fx.path("nope.txt")] }),
        )
        .await;

    assert_eq!(result["files"][fx.path("a.txt")], "A");
    assert_eq!(result["errors"][fx.path("nope.txt")]["kind"], "NotFound");
}

#[tokio::test]
async fn edit_batch_and_dry_run() {
    let fx = Fixture::new();
    let path = fx.path("e.txt");
    std::fs::write(fx.dir.path().join("root/e.txt"), "A").unwrap();

    let preview = fx
        .call(
            "edit_file",
            json!({ "path": path, "edits": [{ "old_text": "A", "new_text": "Z" }], "dry_run": true }),
        )
        .await
        .unwrap();
    assert!(preview.starts_with("Preview of changes:"));
    assert_eq!(std::fs::read(fx.dir.path().join("root/e.txt")).unwrap(), b"A");

    fx.call(
        "edit_file",
        json!({
            "path": path,
            "edits": [
                { "old_text": "A", "new_text": "B" },
                { "old_text": "B", "new_text": "C" }
            ]
        }),
    )
    .await
    .unwrap();
    assert_eq!(std::fs::read_to_string(fx.dir.path().join("root/e.txt")).unwrap(), "C");
}

// ============================================================================
// DIRECTORIES
// ============================================================================

#[tokio::test]
async fn listing_puts_directories_first() {
    let fx = Fixture::new();
    std::fs::write(fx.dir.path().join("root/b.txt"), "").unwrap();
    std::fs::create_dir(fx.dir.path().join("root/A_dir")).unwrap();
    std::fs::write(fx.dir.path().join("root/a.txt"), "").unwrap();

    let entries = fx.call_json("list_directory", json!({ "path": fx.path("") })).await;
    let names: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A_dir", "a.txt", "b.txt"]);
}

#[tokio::test]
async fn delete_guards_non_empty_directories() {
    let fx = Fixture::new();
    fx.call("create_directory", json!({ "path": fx.path("d/inner") }))
        .await
        .unwrap();
    std::fs::write(fx.dir.path().join("root/d/inner/f.txt"), "keep").unwrap();

    let err = fx
        .call("delete_file", json!({ "path": fx.path("d") }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "DirectoryNotEmpty");
    assert!(fx.dir.path().join("root/d/inner/f.txt").exists());

    fx.call("delete_file", json!({ "path": fx.path("d"), "recursive": true }))
        .await
        .unwrap();
    assert!(!fx.dir.path().join("root/d").exists());
}

#[tokio::test]
async fn search_recursive_versus_flat() {
    let fx = Fixture::new();
    std::fs::create_dir_all(fx.dir.path().join("root/src/nested")).unwrap();
    std::fs::write(fx.dir.path().join("root/main.rs"), "").unwrap();
    std::fs::write(fx.dir.path().join("root/src/lib.rs"), "").unwrap();
    std::fs::write(fx.dir.path().join("root/src/nested/mod.rs"), "").unwrap();
    std::fs::write(fx.dir.path().join("root/README.md"), "").unwrap();

    let deep = fx
        .call_json("search_files", json!({ "path": fx.path(""), "pattern": "*.rs" }))
        .await;
    assert_eq!(deep["total_matches"], 3);

    let flat = fx
        .call_json(
            "search_files",
            json!({ "path": fx.path(""), "pattern": "*.rs", "recursive": false }),
        )
        .await;
    assert_eq!(flat["total_matches"], 1);
    assert_eq!(flat["matches"][0]["name"], "main.rs");
}

#[tokio::test]
async fn move_within_root() {
    let fx = Fixture::new();
    std::fs::write(fx.dir.path().join("root/from.txt"), "moving").unwrap();

    let message = fx
        .call(
            "move_file",
            json!({ "source": fx.path("from.txt"), "destination": fx.path("to/here.txt") }),
        )
        .await
        .unwrap();
    assert!(message.starts_with("Successfully moved"));

    let info = fx
        .call_json("get_file_info", json!({ "path": fx.path("to/here.txt") }))
        .await;
    assert_eq!(info["size"], 6);
    assert_eq!(info["is_directory"], false);
}

// ============================================================================
// DISPATCH
// ============================================================================

#[tokio::test]
async fn bad_arguments_report_violations() {
    let fx = Fixture::new();
    let err = fx
        .call("move_file", json!({ "source": 1 }))
        .await
        .unwrap_err();

    let payload = err.payload();
    assert_eq!(payload.error, "ValidationError");
    assert_eq!(payload.operation, "move_file");
    assert!(payload.violations.iter().any(|v| v.contains("`destination`")));
    assert!(payload.violations.iter().any(|v| v.contains("`source`")));
}
