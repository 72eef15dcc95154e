// ABOUTME: Check command implementation.
// ABOUTME: Reports which of the external tools kubeship drives are installed.

use kubeship::error::{Error, Result};
use kubeship::output::Output;
use kubeship::tools::preflight::{REQUIRED_TOOLS, check_tools};
use serde::Serialize;

#[derive(Serialize)]
struct ToolEvent<'a> {
    event: &'a str,
    tool: &'a str,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

pub fn check(output: &Output) -> Result<()> {
    let statuses = check_tools(REQUIRED_TOOLS);

    for status in &statuses {
        match status.path {
            Some(ref path) => output.progress(&format!(
                "  ✓ {:<8} {}",
                status.tool.program,
                path.display()
            )),
            None => output.progress(&format!(
                "  ✗ {:<8} not found (needed to {})",
                status.tool.program, status.tool.purpose
            )),
        }
        output.json(&ToolEvent {
            event: "tool",
            tool: status.tool.program,
            found: status.found(),
            path: status.path.as_ref().map(|p| p.display().to_string()),
        });
    }

    let missing: Vec<&str> = statuses
        .iter()
        .filter(|s| !s.found())
        .map(|s| s.tool.program)
        .collect();

    if missing.is_empty() {
        output.success("All required tools are installed");
        Ok(())
    } else {
        Err(Error::MissingTools(missing.join(", ")))
    }
}
