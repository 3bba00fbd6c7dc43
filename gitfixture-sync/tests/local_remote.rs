//! End-to-end sync against a local bare repository.
//!
//! `git@github.com:` is rewritten to a temp directory through git's
//! `url.<base>.insteadOf`, injected with `GIT_CONFIG_*` environment variables,
//! so the real clone / add / diff / commit / push sequence runs offline.
//! Skipped when no `git` binary is available.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use gitfixture_core::SyncRequest;
use gitfixture_sync::{
    Cancellation, ProcessRunner, RecordingSink, SyncError, SyncOutcome, Synchronizer,
};
use tempfile::TempDir;

const IDENTITY: [(&str, &str); 4] = [
    ("GIT_AUTHOR_NAME", "Fixture Bot"),
    ("GIT_AUTHOR_EMAIL", "fixture@example.com"),
    ("GIT_COMMITTER_NAME", "Fixture Bot"),
    ("GIT_COMMITTER_EMAIL", "fixture@example.com"),
];

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(IDENTITY)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Temp root holding `remotes/acme/widgets.git` with one commit on `main`.
struct Remote {
    root: TempDir,
}

impl Remote {
    fn new() -> Self {
        let root = TempDir::new().expect("tempdir");
        let bare = root.path().join("remotes").join("acme").join("widgets.git");
        fs::create_dir_all(&bare).expect("mkdir bare");
        git(&bare, &["init", "--bare", "."]);
        git(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let seed = root.path().join("seed");
        git(root.path(), &["clone", bare.to_str().unwrap(), "seed"]);
        fs::write(seed.join("config.yaml"), "key: old\n").expect("seed file");
        git(&seed, &["add", "config.yaml"]);
        git(&seed, &["commit", "-m", "seed"]);
        git(&seed, &["push", "origin", "HEAD:main"]);

        Self { root }
    }

    fn bare(&self) -> PathBuf {
        self.root.path().join("remotes").join("acme").join("widgets.git")
    }

    fn workdir(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    fn main_rev(&self) -> String {
        git(&self.bare(), &["rev-parse", "main"])
    }

    fn show(&self, path: &str) -> String {
        git(&self.bare(), &["show", &format!("main:{path}")])
    }

    fn runner(&self) -> ProcessRunner {
        let base = format!("{}/", self.root.path().join("remotes").display());
        let mut runner = ProcessRunner::new()
            .env("GIT_CONFIG_COUNT", "1")
            .env("GIT_CONFIG_KEY_0", format!("url.{base}.insteadOf"))
            .env("GIT_CONFIG_VALUE_0", "git@github.com:");
        for (k, v) in IDENTITY {
            runner = runner.env(k, v);
        }
        runner
    }

    fn synchronizer(&self) -> Synchronizer<ProcessRunner, RecordingSink> {
        Synchronizer::with_parts(self.runner(), RecordingSink::new())
    }
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[tokio::test]
async fn changed_content_is_committed_and_pushed() {
    if !git_available() {
        return;
    }
    init_logs();
    let remote = Remote::new();
    let before = remote.main_rev();

    let req = SyncRequest::new(remote.workdir("x"), "acme/widgets", "update config")
        .with_file("config.yaml", b"key: value".to_vec());
    let outcome = remote
        .synchronizer()
        .sync(&req, &Cancellation::new())
        .await
        .expect("sync");

    assert_eq!(outcome, SyncOutcome::Pushed);
    assert_ne!(remote.main_rev(), before);
    assert_eq!(remote.show("config.yaml"), "key: value");
    assert_eq!(
        git(&remote.bare(), &["log", "-1", "--format=%s", "main"]),
        "update config"
    );
}

#[tokio::test]
async fn identical_content_is_a_no_op() {
    if !git_available() {
        return;
    }
    init_logs();
    let remote = Remote::new();
    let before = remote.main_rev();

    let req = SyncRequest::new(remote.workdir("x"), "acme/widgets", "nothing new")
        .with_file("config.yaml", b"key: old\n".to_vec());
    let sync = remote.synchronizer();
    let outcome = sync.sync(&req, &Cancellation::new()).await.expect("sync");

    assert_eq!(outcome, SyncOutcome::Unchanged);
    assert_eq!(remote.main_rev(), before);
    assert!(sync.sink().messages().is_empty());
}

#[tokio::test]
async fn rerun_with_same_content_does_not_push_again() {
    if !git_available() {
        return;
    }
    init_logs();
    let remote = Remote::new();
    let sync = remote.synchronizer();

    let first = SyncRequest::new(remote.workdir("a"), "acme/widgets", "add notes")
        .with_file("notes.txt", b"hello\n".to_vec());
    assert_eq!(
        sync.sync(&first, &Cancellation::new()).await.expect("first"),
        SyncOutcome::Pushed
    );
    let after_first = remote.main_rev();

    let mut second = first.clone();
    second.working_directory = remote.workdir("b");
    assert_eq!(
        sync.sync(&second, &Cancellation::new()).await.expect("second"),
        SyncOutcome::Unchanged
    );
    assert_eq!(remote.main_rev(), after_first);
}

#[tokio::test]
async fn rejected_push_keeps_local_commit() {
    if !git_available() {
        return;
    }
    use std::os::unix::fs::PermissionsExt;

    init_logs();
    let remote = Remote::new();
    let before = remote.main_rev();
    let hook = remote.bare().join("hooks").join("pre-receive");
    fs::create_dir_all(hook.parent().unwrap()).unwrap();
    fs::write(&hook, "#!/bin/sh\necho 'pushes are frozen' >&2\nexit 1\n").unwrap();
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();

    let dir = remote.workdir("x");
    let req = SyncRequest::new(&dir, "acme/widgets", "update config")
        .with_file("config.yaml", b"key: value".to_vec());
    let sync = remote.synchronizer();
    let err = sync.sync(&req, &Cancellation::new()).await.unwrap_err();

    assert!(matches!(err, SyncError::Push { .. }), "got: {err}");
    assert!(err.output().unwrap_or_default().contains("pushes are frozen"));
    assert_eq!(remote.main_rev(), before);
    assert_eq!(git(&dir, &["log", "-1", "--format=%s"]), "update config");

    let messages = sync.sink().messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("git push origin main failed with output:"));
}

#[tokio::test]
async fn unknown_repository_fails_at_clone() {
    if !git_available() {
        return;
    }
    init_logs();
    let remote = Remote::new();
    let dir = remote.workdir("x");
    let req = SyncRequest::new(&dir, "acme/missing", "msg").with_file("a.txt", b"a".to_vec());
    let sync = remote.synchronizer();
    let err = sync.sync(&req, &Cancellation::new()).await.unwrap_err();

    assert!(matches!(err, SyncError::Clone { .. }), "got: {err}");
    assert!(!err.output().unwrap_or_default().is_empty());
    assert!(!dir.join("a.txt").exists());
    assert_eq!(sync.sink().messages().len(), 1);
}
