use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Runs the binary inside a scratch directory with a clean environment
pub struct CliTestHelper {
    pub temp_dir: TempDir,
    pub project_root: PathBuf,
}

impl CliTestHelper {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let project_root = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            project_root,
        }
    }

    /// Command with no ambient connection settings, so only what the test
    /// passes explicitly is used
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("pgrebuild").unwrap();
        cmd.current_dir(&self.project_root)
            .env_remove("DATABASE_URL")
            .env_remove("RUST_LOG");
        for var in ["PGHOST", "PGPORT", "PGUSER", "PGDATABASE", "PGPASSWORD"] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Write `pgrebuild.yaml` in the project root
    pub fn write_config(&self, content: &str) -> Result<()> {
        fs::write(self.project_root.join("pgrebuild.yaml"), content)?;
        Ok(())
    }

    pub fn read_file(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.project_root.join(name))?)
    }
}

impl Default for CliTestHelper {
    fn default() -> Self {
        Self::new()
    }
}
