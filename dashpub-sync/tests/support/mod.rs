//! Shared harness for the publish scenario tests: a stub catalog endpoint
//! and real git fixtures.
//!
//! The stub is a single-threaded `TcpListener` loop answering canned JSON
//! per request target. The GitLab last-commit route is served from the same
//! listener, so one server plays both upstream roles.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{json, Value};

use dashpub_core::Config;

// ---------------------------------------------------------------------------
// Stub catalog
// ---------------------------------------------------------------------------

/// One stubbed dashboard: its catalog entry, version history and content.
pub struct StubDashboard {
    id: i64,
    uid: String,
    title: String,
    folder_title: String,
    versions: Vec<(i64, String, String)>,
    extra: Value,
}

impl StubDashboard {
    pub fn new(id: i64, uid: &str, title: &str, folder_title: &str) -> Self {
        Self {
            id,
            uid: uid.to_string(),
            title: title.to_string(),
            folder_title: folder_title.to_string(),
            versions: Vec::new(),
            extra: json!({}),
        }
    }

    /// Append a history entry (the feed is served in insertion order, so
    /// push newest first like the real API).
    pub fn version(mut self, version: i64, message: &str, created: &str) -> Self {
        self.versions
            .push((version, message.to_string(), created.to_string()));
        self
    }

    /// Extra keys merged into the dashboard model of every version.
    pub fn extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }

    fn summary(&self) -> Value {
        let mut summary = json!({
            "id": self.id,
            "uid": self.uid,
            "title": self.title,
            "type": "dash-db"
        });
        if !self.folder_title.is_empty() {
            summary["folderTitle"] = json!(self.folder_title);
        }
        summary
    }

    /// The dashboard model as the catalog would return it for `version`.
    pub fn model(&self, version: i64) -> Value {
        let mut data = self.extra.clone();
        data["uid"] = json!(self.uid);
        data["title"] = json!(self.title);
        data["version"] = json!(version);
        data
    }
}

/// Route builder for the stub endpoint.
pub struct StubCatalog {
    dashboards: Vec<StubDashboard>,
    last_commit: Option<String>,
    errors: Vec<(String, u16)>,
}

impl StubCatalog {
    pub fn new() -> Self {
        Self {
            dashboards: Vec::new(),
            last_commit: None,
            errors: Vec::new(),
        }
    }

    pub fn dashboard(mut self, dashboard: StubDashboard) -> Self {
        self.dashboards.push(dashboard);
        self
    }

    /// Serve the GitLab last-commit route (project 42, branch master) with
    /// this `created_at`.
    pub fn last_commit(mut self, created_at: &str) -> Self {
        self.last_commit = Some(created_at.to_string());
        self
    }

    /// Force `target` to answer `status` with an empty JSON object,
    /// overriding any generated route.
    pub fn error(mut self, target: &str, status: u16) -> Self {
        self.errors.push((target.to_string(), status));
        self
    }

    pub fn start(self) -> StubServer {
        let mut routes: HashMap<String, (u16, String)> = HashMap::new();

        let summaries: Vec<Value> = self.dashboards.iter().map(StubDashboard::summary).collect();
        routes.insert(
            "/api/search?tag=publish".to_string(),
            (200, Value::Array(summaries).to_string()),
        );

        for dashboard in &self.dashboards {
            let feed: Vec<Value> = dashboard
                .versions
                .iter()
                .map(|(version, message, created)| {
                    json!({ "version": version, "message": message, "created": created })
                })
                .collect();
            routes.insert(
                format!("/api/dashboards/id/{}/versions", dashboard.id),
                (200, Value::Array(feed).to_string()),
            );
            for (version, message, _) in &dashboard.versions {
                routes.insert(
                    format!("/api/dashboards/id/{}/versions/{}", dashboard.id, version),
                    (
                        200,
                        json!({
                            "version": version,
                            "message": message,
                            "data": dashboard.model(*version)
                        })
                        .to_string(),
                    ),
                );
            }
        }

        if let Some(created_at) = &self.last_commit {
            routes.insert(
                "/api/v4/projects/42/repository/commits/master".to_string(),
                (200, json!({ "id": "head", "created_at": created_at }).to_string()),
            );
        }

        for (target, status) in self.errors {
            routes.insert(target, (status, "{}".to_string()));
        }

        StubServer::start(routes)
    }
}

pub struct StubServer {
    base_url: String,
}

impl StubServer {
    fn start(routes: HashMap<String, (u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        let _ = serve(stream, &routes);
                    }
                    Err(_) => break,
                }
            }
        });

        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn serve(mut stream: TcpStream, routes: &HashMap<String, (u16, String)>) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let target = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();

    loop {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        if line.trim_end().is_empty() {
            break;
        }
    }

    let not_found = (404, json!({ "message": "Dashboard not found" }).to_string());
    let (status, body) = routes.get(&target).cloned().unwrap_or(not_found);
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes())?;
    stream.flush()
}

// ---------------------------------------------------------------------------
// Git fixtures
// ---------------------------------------------------------------------------

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Commit identity for every git child process, including the ones the
/// engine spawns inside its own working copy. Tests touching git run
/// `#[serial]`, so the process environment is not mutated concurrently.
fn export_git_identity() {
    std::env::set_var("GIT_AUTHOR_NAME", "Tester");
    std::env::set_var("GIT_AUTHOR_EMAIL", "tester@example.com");
    std::env::set_var("GIT_COMMITTER_NAME", "Tester");
    std::env::set_var("GIT_COMMITTER_EMAIL", "tester@example.com");
}

/// A bare origin plus a seed working copy with one commit pushed to master.
pub fn seeded_origin(root: &Path) -> (PathBuf, PathBuf) {
    export_git_identity();

    let origin = root.join("origin.git");
    let seed = root.join("seed");

    git(root, &["init", "--bare", "--initial-branch=master", "origin.git"]);
    std::fs::create_dir_all(&seed).expect("create seed dir");
    git(&seed, &["init", "--initial-branch=master"]);
    std::fs::write(seed.join("README.md"), "dashboards\n").expect("write README");
    git(&seed, &["add", "-A"]);
    git(&seed, &["commit", "-m", "initial"]);
    git(&seed, &["remote", "add", "origin", origin.to_str().expect("utf8 path")]);
    git(&seed, &["push", "origin", "master"]);

    (origin, seed)
}

/// Commit everything in the seed working copy and push it to the origin.
pub fn commit_and_push(seed: &Path, message: &str) {
    git(seed, &["add", "-A"]);
    git(seed, &["commit", "-m", message]);
    git(seed, &["push", "origin", "master"]);
}

pub fn commit_count(repo: &Path) -> usize {
    git(repo, &["rev-list", "--count", "HEAD"])
        .parse()
        .expect("commit count")
}

pub fn last_message(repo: &Path) -> String {
    git(repo, &["log", "-1", "--format=%B"])
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub fn config(grafana_url: &str, repo_url: &str, clone_path: &Path) -> Config {
    let mut config = Config::default();
    config.grafana.url = grafana_url.to_string();
    config.target.repo_url = repo_url.to_string();
    config.target.clone_path = clone_path.to_path_buf();
    config
}
