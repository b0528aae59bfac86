//! Build script for allprs: stamps a human-readable version string.
//!
//! `BUILD_INFO_HUMAN` is `<crate version> (<git version>) <rustc version>`.
//! The git version is `git describe --tags --dirty` when a tag is reachable,
//! otherwise `v<crate version>-<yyyymmddhhmmss>-<short sha>[+dirty]`. Clean
//! trees use the commit time so the same commit always stamps the same
//! string; dirty trees and builds outside git use the build time.

use std::{env, process::Command};

use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

fn main() {
    for path in ["src", "build.rs", "Cargo.toml", "Cargo.lock"] {
        println!("cargo:rerun-if-changed={path}");
    }

    let version = env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let parts = [
        Some(version.clone()),
        Some(format!("({})", git_version(&version))),
        command_output("rustc", &["--version"]),
    ];
    let build_info = parts.into_iter().flatten().collect::<Vec<_>>().join(" ");

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={build_info}");
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn git(args: &[&str]) -> Option<String> {
    command_output("git", args)
}

/// `Some(true)` when tracked files have changes. `.cargo-ok`, written by
/// `cargo install --git`, does not count.
fn worktree_dirty() -> Option<bool> {
    git(&["status", "--porcelain"])
        .map(|status| status.lines().any(|line| line.get(3..) != Some(".cargo-ok")))
        .or_else(|| git(&["rev-parse", "--git-dir"]).map(|_| false))
}

fn git_version(version: &str) -> String {
    match git(&["describe", "--tags", "--always", "--dirty"]) {
        Some(described) if described.contains('v') || described.contains("-g") => described,
        _ => pseudo_version(version),
    }
}

fn pseudo_version(version: &str) -> String {
    let sha = git(&["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let dirty = worktree_dirty();

    let committed_at = match dirty {
        Some(false) => git(&["log", "-1", "--format=%ct"])
            .and_then(|secs| secs.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    };
    let timestamp = committed_at.unwrap_or_else(Utc::now).format(TIMESTAMP_FORMAT);
    let suffix = if dirty == Some(true) { "+dirty" } else { "" };

    format!("v{version}-{timestamp}-{sha}{suffix}")
}
