use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCRIPT_NAME: &str = "dry-run.sh";

/// Private scratch directory for one dry run. Removed when dropped, whatever
/// way the run ended.
pub(crate) struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub(crate) fn create(command: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("kortar-")
            .tempdir()
            .context("failed to create validation workspace")?;
        let script = dir.path().join(SCRIPT_NAME);
        fs::write(&script, format!("{command}\n")).with_context(|| {
            format!("failed to write dry-run script: {}", script.display())
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&script)?.permissions();
            perms.set_mode(0o700);
            fs::set_permissions(&script, perms)?;
        }

        Ok(Self { dir })
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn script_path(&self) -> PathBuf {
        self.path().join(SCRIPT_NAME)
    }
}
