//! Command implementations for acmco.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command resolves the store root first; all but
//! `init` then require an initialized store.
//!
//! Commands return the process exit code on success so that a denied
//! transaction (a normal, well-formed outcome) can still exit non-zero.

mod init;
mod lock;
mod log;
mod transact;


use crate::cli::{Command, LockAction, LockCommand};
use crate::context::StoreContext;
use crate::error::Result;
use std::path::Path;
use tracing::debug;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command, root: Option<&Path>) -> Result<i32> {
    let ctx = StoreContext::resolve(root)?;
    debug!(root = %ctx.root.display(), "resolved store root");

    match command {
        Command::Init => init::cmd_init(&ctx),
        Command::CheckOut(args) => transact::cmd_check_out(&ctx, args),
        Command::CheckIn(args) => transact::cmd_check_in(&ctx, args),
        Command::Discard(args) => transact::cmd_discard(&ctx, args),
        Command::Revoke(args) => transact::cmd_revoke(&ctx, args),
        Command::Status(args) => transact::cmd_status(&ctx, args),
        Command::Handle(args) => transact::cmd_handle(&ctx, args),
        Command::Lock(lock_cmd) => dispatch_lock(&ctx, lock_cmd),
        Command::Log(args) => log::cmd_log(&ctx, args),
    }
}

/// Dispatch lock subcommands.
fn dispatch_lock(ctx: &StoreContext, lock_cmd: LockCommand) -> Result<i32> {
    match lock_cmd.action {
        LockAction::List => lock::cmd_lock_list(ctx),
        LockAction::Clear(args) => lock::cmd_lock_clear(ctx, args),
    }
}
