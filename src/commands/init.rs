//! Implementation of the `acmco init` command.
//!
//! Creates the store layout under the resolved root and a `config.yaml`
//! template. Idempotent: existing records, audit files and config are left
//! untouched.

use crate::config::Config;
use crate::context::StoreContext;
use crate::error::Result;
use crate::exit_codes;
use crate::fs::atomic_write;
use tracing::info;

pub(super) fn cmd_init(ctx: &StoreContext) -> Result<i32> {
    let existed = ctx.store_exists();
    ctx.create_layout()?;

    let config_path = ctx.config_path();
    let wrote_config = !config_path.exists();
    if wrote_config {
        let yaml = Config::default().to_yaml()?;
        atomic_write(&config_path, yaml.as_bytes())?;
    }

    info!(root = %ctx.root.display(), existed, "store initialized");

    if existed {
        println!("Checkout store already initialized at {}", ctx.root.display());
    } else {
        println!("Initialized checkout store at {}", ctx.root.display());
    }
    println!("  Records: {}", ctx.records_dir.display());
    println!("  Locks:   {}", ctx.locks_dir.display());
    println!("  Audit:   {}", ctx.audit_dir.display());
    if wrote_config {
        println!("  Config:  {} (created)", config_path.display());
    } else {
        println!("  Config:  {}", config_path.display());
    }

    Ok(exit_codes::SUCCESS)
}
