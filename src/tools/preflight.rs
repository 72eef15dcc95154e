// ABOUTME: Checks that the external tools kubeship drives are installed.
// ABOUTME: Searches PATH the way a shell would, without running anything.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// An external tool and what kubeship needs it for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    pub program: &'static str,
    pub purpose: &'static str,
}

/// Every tool used by `deploy`.
pub const REQUIRED_TOOLS: &[Tool] = &[
    Tool {
        program: "docker",
        purpose: "build and push images",
    },
    Tool {
        program: "aws",
        purpose: "ECR login and kubeconfig updates",
    },
    Tool {
        program: "kubectl",
        purpose: "update and observe deployments",
    },
    Tool {
        program: "git",
        purpose: "derive image tags from the current revision",
    },
];

/// Result of looking a tool up.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub tool: Tool,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

/// Look up each tool on the current `PATH`.
pub fn check_tools(tools: &[Tool]) -> Vec<ToolStatus> {
    let path = env::var_os("PATH");
    check_tools_in(tools, path.as_deref())
}

/// Look up each tool on an explicit search path.
pub fn check_tools_in(tools: &[Tool], search_path: Option<&OsStr>) -> Vec<ToolStatus> {
    tools
        .iter()
        .map(|tool| ToolStatus {
            tool: *tool,
            path: search_path.and_then(|p| find_executable(tool.program, p)),
        })
        .collect()
}

fn find_executable(program: &str, search_path: &OsStr) -> Option<PathBuf> {
    env::split_paths(search_path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
