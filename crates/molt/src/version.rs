//! Build and capability report for `molt version`

use molt_update::{ApplierKind, RepositoryKind};
use serde::Serialize;

/// What this build of molt is and what it can update from
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: String,

    /// Short commit hash, when built inside a git checkout
    pub commit: Option<String>,

    pub build_date: Option<String>,

    pub target: Option<String>,

    /// Repository type tags accepted in config
    pub repositories: Vec<String>,

    /// Applier type tags accepted in config
    pub appliers: Vec<String>,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: molt_update::VERSION.to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
            build_date: option_env!("BUILD_DATE").map(String::from),
            target: option_env!("TARGET").map(String::from),
            repositories: [RepositoryKind::GitHub, RepositoryKind::Http]
                .iter()
                .map(ToString::to_string)
                .collect(),
            appliers: [ApplierKind::Binary, ApplierKind::Archive]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// One-line form: `molt 0.3.0 (abc1234, 2026-01-02) x86_64-unknown-linux-gnu`
    pub fn summary(&self) -> String {
        let mut line = format!("molt {}", self.version);

        let build: Vec<&str> = [self.commit.as_deref(), self.build_date.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !build.is_empty() {
            line.push_str(&format!(" ({})", build.join(", ")));
        }

        if let Some(target) = &self.target {
            line.push(' ');
            line.push_str(target);
        }

        line
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}
