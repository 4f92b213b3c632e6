//! Build script for Persona Panel
//!
//! Embeds build provenance into the binary so `persona-panel version`
//! can report exactly what is running behind the endpoint.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = command_output("git", &["rev-parse", "--short=8", "HEAD"]);
    let git_branch = command_output("git", &["rev-parse", "--abbrev-ref", "HEAD"]);
    let git_dirty = git_dirty_flag();

    let build_timestamp = chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string();
    let target = env_or_unknown("TARGET");
    let profile = env_or_unknown("PROFILE");
    let host = env_or_unknown("HOST");
    let rustc_version = command_output("rustc", &["--version"]);

    println!("cargo:rustc-env=PANEL_BUILD_COMMIT={}", git_hash);
    println!("cargo:rustc-env=PANEL_BUILD_BRANCH={}", git_branch);
    println!("cargo:rustc-env=PANEL_BUILD_DIRTY={}", git_dirty);
    println!("cargo:rustc-env=PANEL_BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=PANEL_BUILD_TARGET={}", target);
    println!("cargo:rustc-env=PANEL_BUILD_PROFILE={}", profile);
    println!("cargo:rustc-env=PANEL_BUILD_RUSTC={}", rustc_version);
    println!("cargo:rustc-env=PANEL_BUILD_HOST={}", host);
}

fn env_or_unknown(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| "unknown".to_string())
}

/// Run a command and return its trimmed stdout, or "unknown" on any failure
fn command_output(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn git_dirty_flag() -> &'static str {
    match Command::new("git").args(["status", "--porcelain"]).output() {
        Ok(output) if output.status.success() => {
            if output.stdout.is_empty() {
                "false"
            } else {
                "true"
            }
        }
        _ => "unknown",
    }
}
