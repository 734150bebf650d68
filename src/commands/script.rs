use crate::catalog::Catalog;
use crate::catalog::definition::PgDefinitionProvider;
use crate::catalog::id::QualifiedName;
use crate::config::Config;
use crate::db::{begin_snapshot, connect_to_database};
use crate::plan::{build_plan, collect_definitions};
use crate::render::{ScriptOptions, render_script};
use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::Confirm;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the generated script goes
#[derive(Debug, Clone, Default)]
pub struct ScriptOutput {
    /// Write to this file instead of stdout
    pub path: Option<PathBuf>,
    /// Overwrite an existing file without asking
    pub force: bool,
}

/// Generate the rebuild script for `target` and write it out.
///
/// The script is rendered completely before anything is written, so a
/// failure at any stage leaves no output behind.
pub async fn cmd_script(config: &Config, target: &str, output: &ScriptOutput) -> Result<()> {
    let target: QualifiedName = target.parse()?;

    if let Some(path) = &output.path {
        ensure_writable(path, output.force, std::io::stdin().is_terminal())?;
    }

    let script = generate_script(config, &target).await?;

    match &output.path {
        Some(path) => {
            std::fs::write(path, &script)
                .with_context(|| format!("Failed to write script to {}", path.display()))?;
            eprintln!(
                "{} Wrote rebuild script for {} to {}",
                style("✓").green(),
                style(&target).bold(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(script.as_bytes())
                .context("Failed to write script to stdout")?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Read the catalog, plan the rebuild and render the script, all against a
/// single read-only snapshot.
pub async fn generate_script(config: &Config, target: &QualifiedName) -> Result<String> {
    let options = config.database.connect_options()?;
    let pool = connect_to_database(options, "database").await?;
    let mut tx = begin_snapshot(&pool).await?;

    let catalog = Catalog::load(&mut *tx, target).await?;
    let object = catalog.resolve_target(target)?;
    info!("Resolved {} to {}", target, object.describe());

    let plan = build_plan(&catalog, &object)?;
    let definitions = {
        let mut provider = PgDefinitionProvider::new(&mut *tx, config.script.include_comments);
        collect_definitions(&plan, &mut provider).await?
    };
    debug!("Collected {} definitions", definitions.len());

    tx.rollback().await.context("Failed to end catalog transaction")?;
    pool.close().await;

    let script = render_script(
        &plan,
        &definitions,
        &ScriptOptions {
            wrap_in_transaction: config.script.wrap_in_transaction,
        },
    )?;
    Ok(script)
}

/// Refuse to clobber an existing file unless forced or confirmed interactively.
fn ensure_writable(path: &Path, force: bool, interactive: bool) -> Result<()> {
    if force || !path.exists() {
        return Ok(());
    }

    if !interactive {
        bail!(
            "{} already exists; use --force to overwrite it",
            path.display()
        );
    }

    let overwrite = Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", path.display()))
        .default(false)
        .interact()?;

    if !overwrite {
        bail!("Not overwriting {}", path.display());
    }
    Ok(())
}
