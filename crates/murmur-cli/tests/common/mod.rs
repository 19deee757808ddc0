use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI with an isolated HOME so session files land in `home`.
pub fn run_cli(args: &[&str], home: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_murmur"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env_remove("MURMUR_API_URL");
    cmd.env_remove("MURMUR_PASSWORD");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI off the async runtime so the mock server keeps serving.
pub async fn run_cli_async(args: &[&str], home: &Path) -> Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let home = home.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_cli(&args, &home)
    })
    .await
    .expect("CLI task panicked")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], home: &Path) -> String {
    let output = run_cli_async(args, home).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub async fn run_cli_failure(args: &[&str], home: &Path) -> String {
    let output = run_cli_async(args, home).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Path of the persisted credential file under `home`.
pub fn credentials_file(home: &Path) -> std::path::PathBuf {
    home.join("data").join("murmur").join("credentials.json")
}

pub fn post_json(id: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "body": format!("{} body", title),
        "likeCount": 1,
        "images": [],
        "tags": ["test"],
        "creator": { "id": "u1", "name": "Ada" },
        "createdAt": "2024-03-01T10:00:00.000Z",
        "updatedAt": "2024-03-01T10:00:00.000Z"
    })
}

pub fn page_json(docs: Vec<serde_json::Value>, page: u32, total_pages: u32) -> serde_json::Value {
    let limit = docs.len() as u32;
    serde_json::json!({
        "message": "Posts fetched",
        "data": {
            "meta": {
                "total": limit * total_pages,
                "page": page,
                "limit": limit,
                "totalPages": total_pages,
                "hasNextPage": page < total_pages,
                "hasPreviousPage": page > 1
            },
            "docs": docs
        }
    })
}
