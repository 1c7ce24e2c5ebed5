//! Version command

use crate::cli::VersionArgs;
use crate::output;
use crate::version::VersionInfo;
use anyhow::Result;

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", info);
    output::kv("Repositories", &info.repositories.join(", "));
    output::kv("Appliers", &info.appliers.join(", "));

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::version::VersionInfo;

    fn info(commit: Option<&str>, build_date: Option<&str>, target: Option<&str>) -> VersionInfo {
        VersionInfo {
            version: "1.2.3".to_string(),
            commit: commit.map(String::from),
            build_date: build_date.map(String::from),
            target: target.map(String::from),
            repositories: vec![],
            appliers: vec![],
        }
    }

    #[test]
    fn test_current_reports_build_metadata() {
        let info = VersionInfo::current();
        assert_eq!(info.version, molt_update::VERSION);
        // Both are always emitted by build.rs
        assert!(info.build_date.is_some());
        assert!(info.target.is_some());
        assert_eq!(info.repositories, ["github", "http"]);
        assert_eq!(info.appliers, ["binary", "archive"]);
    }

    #[test]
    fn test_summary_formats() {
        assert_eq!(info(None, None, None).summary(), "molt 1.2.3");
        assert_eq!(
            info(Some("abc1234"), Some("2026-01-02"), Some("x86_64-unknown-linux-gnu")).summary(),
            "molt 1.2.3 (abc1234, 2026-01-02) x86_64-unknown-linux-gnu"
        );
        assert_eq!(
            info(None, Some("2026-01-02"), None).summary(),
            "molt 1.2.3 (2026-01-02)"
        );
    }

    #[test]
    fn test_json_includes_capabilities() {
        let json = serde_json::to_value(VersionInfo::current()).unwrap();
        assert_eq!(json["repositories"][0], "github");
        assert_eq!(json["appliers"][1], "archive");
        assert!(json["target"].is_string());
    }
}
