use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dlpro_core::{ProvisionError, ToolKind, is_ready};
use serde::Serialize;

/// Outcome of one provisioning pass.
///
/// Binaries are provisioned independently, so a report can hold both ready
/// tools and failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub ready: BTreeMap<ToolKind, PathBuf>,
    pub failures: BTreeMap<ToolKind, ProvisionError>,
}

impl ProvisionReport {
    /// Installed path for a tool, if provisioning succeeded for it.
    pub fn path(&self, tool: ToolKind) -> Option<&Path> {
        self.ready.get(&tool).map(PathBuf::as_path)
    }

    /// Path for a tool that is ready right now.
    ///
    /// Re-checks the filesystem so a binary deleted after provisioning is
    /// reported as missing.
    pub fn ready_path(&self, tool: ToolKind) -> Option<&Path> {
        self.path(tool).filter(|path| is_ready(path))
    }

    pub fn failure(&self, tool: ToolKind) -> Option<&ProvisionError> {
        self.failures.get(&tool)
    }

    pub fn all_ready(&self) -> bool {
        self.failures.is_empty()
    }
}
