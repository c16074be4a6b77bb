//! `acmco lock list` and `acmco lock clear`.

use crate::cli::LockClearArgs;
use crate::context::StoreContext;
use crate::error::{CheckoutError, Result};
use crate::exit_codes;
use crate::locks::{self, LockInfo};
use crate::request::is_valid_resource_name;
use tracing::warn;

fn print_details(info: &LockInfo, indent: &str) {
    let lock = &info.lock;
    println!("{}Owner:      {}", indent, lock.owner);
    println!("{}PID:        {}", indent, lock.pid);
    println!("{}Operation:  {}", indent, lock.operation);
    println!(
        "{}Acquired:   {}",
        indent,
        lock.acquired_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("{}Held for:   {}", indent, lock.held_for_label());
}

pub(super) fn cmd_lock_list(ctx: &StoreContext) -> Result<i32> {
    ctx.ensure_initialized()?;
    let config = ctx.load_config()?;

    let locks = locks::list_locks(&ctx.locks_dir, config.lock_stale_minutes)?;

    if locks.is_empty() {
        println!("No active locks.");
        return Ok(exit_codes::SUCCESS);
    }

    println!("Active locks ({}):", locks.len());
    println!();

    for info in &locks {
        println!("  {}:", info.lock.resource);
        print_details(info, "    ");
        if info.is_stale {
            println!(
                "    Status:     STALE (exceeds {} min threshold)",
                config.lock_stale_minutes
            );
        }
        println!("    Path:       {}", info.path.display());
        println!();
    }

    let stale_count = locks.iter().filter(|l| l.is_stale).count();
    if stale_count > 0 {
        println!(
            "Note: {} lock(s) are stale. Use `acmco lock clear <name>` to clear.",
            stale_count
        );
    }

    Ok(exit_codes::SUCCESS)
}

pub(super) fn cmd_lock_clear(ctx: &StoreContext, args: LockClearArgs) -> Result<i32> {
    // The name becomes a file path under locks/.
    if !is_valid_resource_name(&args.name) {
        return Err(CheckoutError::UserError(format!(
            "invalid resource name '{}': use letters, digits, '.', '_' or '-' (max 128)",
            args.name
        )));
    }

    ctx.ensure_initialized()?;
    let config = ctx.load_config()?;

    let cleared = locks::clear_lock(
        &ctx.locks_dir,
        &args.name,
        config.lock_stale_minutes,
        args.force,
    )?;

    if !cleared.is_stale {
        warn!(
            resource = %cleared.lock.resource,
            owner = %cleared.lock.owner,
            "force-cleared a live lock"
        );
    }

    println!("Cleared lock: {}", cleared.lock.resource);
    println!();
    println!("Lock details:");
    print_details(&cleared, "  ");
    if cleared.is_stale {
        println!("  Status:     was STALE");
    }
    println!("  Path:       {}", cleared.path.display());

    Ok(exit_codes::SUCCESS)
}
