//! Reader for the base-plugins manifest: one `name:version` pair per line.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Parses manifest text into a name → version map.
///
/// Splits each line on the first colon, so versions containing colons
/// survive. Blank lines are skipped; a line with no colon is an error naming
/// the line number. On duplicate names the last occurrence wins.
pub fn parse_manifest(text: &str) -> Result<BTreeMap<String, String>> {
    let mut plugins = BTreeMap::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, version) = line
            .split_once(':')
            .with_context(|| format!("line {}: missing ':' in {:?}", index + 1, line))?;
        let name = name.trim().to_string();
        let version = version.trim().to_string();
        if let Some(previous) = plugins.insert(name.clone(), version) {
            debug!(plugin = %name, previous = %previous, "duplicate plugin entry, last wins");
        }
    }
    Ok(plugins)
}

pub async fn load_manifest(path: &Path) -> Result<BTreeMap<String, String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading plugin manifest {}", path.display()))?;
    parse_manifest(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_manifest() {
        let plugins = parse_manifest("credentials:2.3.0\nworkflow-job:2.40\n").unwrap();
        assert_eq!(plugins.get("credentials").map(String::as_str), Some("2.3.0"));
        assert_eq!(plugins.get("workflow-job").map(String::as_str), Some("2.40"));
    }

    #[test]
    fn last_duplicate_wins() {
        let plugins = parse_manifest("credentials:1.0\ncredentials:2.0\n").unwrap();
        assert_eq!(plugins.get("credentials").map(String::as_str), Some("2.0"));
        assert_eq!(plugins.len(), 1);
    }

    #[test]
    fn splits_on_first_colon_only() {
        let plugins = parse_manifest("odd-plugin:1.0:beta\n").unwrap();
        assert_eq!(plugins.get("odd-plugin").map(String::as_str), Some("1.0:beta"));
    }

    #[test]
    fn rejects_line_without_colon() {
        let err = parse_manifest("credentials 2.3.0\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn skips_blank_lines() {
        let plugins = parse_manifest("\ncredentials:2.3.0\n\n").unwrap();
        assert_eq!(plugins.len(), 1);
    }
}
