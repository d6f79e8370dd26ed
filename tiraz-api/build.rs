//! Build id for the startup log line
//!
//! Emits `TIRAZ_BUILD_ID` as `{version}+{commit}.{profile}` and
//! `TIRAZ_BUILT_AT` (UTC). Container builds usually ship without `.git`, so
//! `SOURCE_COMMIT` from the build environment takes precedence over asking git.

use std::process::Command;

fn git_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string()).filter(|h| !h.is_empty())
}

fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_COMMIT");
    println!("cargo:rerun-if-changed=../.git/HEAD");

    let commit = std::env::var("SOURCE_COMMIT")
        .ok()
        .map(|c| c.chars().take(8).collect::<String>())
        .filter(|c| !c.is_empty())
        .or_else(git_commit)
        .unwrap_or_else(|| "nogit".to_string());

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let built_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    println!(
        "cargo:rustc-env=TIRAZ_BUILD_ID={}+{}.{}",
        version, commit, profile
    );
    println!("cargo:rustc-env=TIRAZ_BUILT_AT={}", built_at);
}
