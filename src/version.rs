//! Build provenance reported by `persona-panel version` and sent to the
//! generation backend as the client user agent.
//!
//! The `PANEL_BUILD_*` values come from `build.rs`.

use std::fmt;

/// Where and how this binary was built
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Short commit hash, or "unknown" outside a git checkout
    pub commit: &'static str,
    pub branch: &'static str,
    dirty: &'static str,
    pub built_at: &'static str,
    pub target: &'static str,
    pub host: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            commit: env!("PANEL_BUILD_COMMIT"),
            branch: env!("PANEL_BUILD_BRANCH"),
            dirty: env!("PANEL_BUILD_DIRTY"),
            built_at: env!("PANEL_BUILD_TIMESTAMP"),
            target: env!("PANEL_BUILD_TARGET"),
            host: env!("PANEL_BUILD_HOST"),
            profile: env!("PANEL_BUILD_PROFILE"),
            rustc: env!("PANEL_BUILD_RUSTC"),
        }
    }

    /// Built from a tree with uncommitted changes
    pub fn is_dirty(&self) -> bool {
        self.dirty == "true"
    }

    /// "0.1.0-abc12345", with "-dirty" appended for uncommitted builds
    pub fn full_version(&self) -> String {
        let mut full = format!("{}-{}", self.version, self.commit);
        if self.is_dirty() {
            full.push_str("-dirty");
        }
        full
    }

    /// `User-Agent` for outbound generation requests
    pub fn user_agent(&self) -> String {
        format!("{}/{} ({})", self.name, self.version, self.commit)
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.name, self.version)?;
        writeln!(
            f,
            "  commit   {} on {}{}",
            self.commit,
            self.branch,
            if self.is_dirty() { " (dirty)" } else { "" }
        )?;
        writeln!(f, "  built    {} ({})", self.built_at, self.profile)?;
        writeln!(f, "  target   {} (host {})", self.target, self.host)?;
        writeln!(f, "  rustc    {}", self.rustc)
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::current()
}

pub fn print_version() {
    print!("{}", build_info());
}
