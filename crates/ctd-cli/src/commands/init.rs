//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# ctd configuration

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/*.d.ts",
]

# Respect .gitignore files
respect_gitignore = true

# Skip files that fail to parse instead of stopping the scan
skip_invalid_files = false

[output]
path = "analysisResults.md"
# format = "markdown"  # markdown | json | text

[rules.findCrashAnalyticService]
enabled = true
# receiver = "CrashAnalyticsService"
# methods = ["sendError", "sendWarning", "sendInfo", "debug", "sendUnhandledError"]

# Additional rules report calls on other receivers.
#
# [[plugins]]
# [plugins.meta]
# key = "findLoggerCalls"
# headers = ["Message", "Severity", "Location"]
# header_keys = ["title", "severity", "location"]
# result_path = "findLoggerCalls.md"
# [plugins.execute]
# receiver = "Logger"
# methods = ["sendError"]
# tag_enum = "ErrorTag"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("ctd.toml"), force)?;

    println!("Created ctd.toml");
    println!("\nNext steps:");
    println!("  1. Edit ctd.toml to configure rules");
    println!("  2. Run: ctd scan");

    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    Ok(())
}
