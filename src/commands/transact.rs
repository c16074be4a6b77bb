//! Checkout-protocol commands: `check-out`, `check-in`, `discard`, `revoke`,
//! `status` and the raw JSON `handle`.
//!
//! Each builds a wire request, runs it through the executor against the
//! file-backed store and prints the response.

use crate::audit::AuditSink;
use crate::cli::{CheckInArgs, CheckOutArgs, DiscardArgs, HandleArgs, RevokeArgs, StatusArgs};
use crate::context::StoreContext;
use crate::error::{CheckoutError, Result};
use crate::executor::Executor;
use crate::identity;
use crate::request::{Operation, RawRequest};
use crate::response::Response;
use crate::store::FileStore;
use std::io::Read;

pub(super) fn cmd_check_out(ctx: &StoreContext, args: CheckOutArgs) -> Result<i32> {
    let raw = RawRequest {
        name: Some(args.name.unwrap_or_else(identity::actor_string)),
        contact: args.contact,
        version: args.version,
        comment: args.comment,
        computername: Some(args.computername.unwrap_or_else(identity::host_name)),
        ..RawRequest::for_action(Operation::CheckOut, &args.db)
    };
    finish(&run(ctx, &raw)?, args.json)
}

pub(super) fn cmd_check_in(ctx: &StoreContext, args: CheckInArgs) -> Result<i32> {
    let raw = RawRequest {
        key: Some(args.key),
        filename: args.filename,
        name: Some(args.name.unwrap_or_else(identity::actor_string)),
        contact: args.contact,
        comment: args.comment,
        ..RawRequest::for_action(Operation::CheckIn, &args.db)
    };
    finish(&run(ctx, &raw)?, args.json)
}

pub(super) fn cmd_discard(ctx: &StoreContext, args: DiscardArgs) -> Result<i32> {
    let raw = RawRequest {
        key: Some(args.key),
        name: Some(args.name.unwrap_or_else(identity::actor_string)),
        ..RawRequest::for_action(Operation::Discard, &args.db)
    };
    finish(&run(ctx, &raw)?, args.json)
}

pub(super) fn cmd_revoke(ctx: &StoreContext, args: RevokeArgs) -> Result<i32> {
    let raw = RawRequest::for_action(Operation::RevokeCheckOut, &args.db);
    finish(&run(ctx, &raw)?, args.json)
}

pub(super) fn cmd_status(ctx: &StoreContext, args: StatusArgs) -> Result<i32> {
    let raw = RawRequest {
        db: args.db,
        action: Some(Operation::StatusCheck.as_str().to_string()),
        ..RawRequest::default()
    };
    finish(&run(ctx, &raw)?, args.json)
}

/// Handle a raw JSON request from `--request` or stdin. Always answers in JSON.
pub(super) fn cmd_handle(ctx: &StoreContext, args: HandleArgs) -> Result<i32> {
    let body = match args.request {
        Some(body) => body,
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body).map_err(|e| {
                CheckoutError::UserError(format!("failed to read request from stdin: {}", e))
            })?;
            body
        }
    };

    let response = handle_body(ctx, &body)?;
    finish(&response, true)
}

/// Run a JSON request body. A body that is not a JSON object is answered with
/// the generic failure denial.
pub(super) fn handle_body(ctx: &StoreContext, body: &str) -> Result<Response> {
    let executor = executor(ctx)?;
    Ok(match serde_json::from_str::<RawRequest>(body) {
        Ok(raw) => executor.handle(&raw),
        Err(e) => executor.reject_unreadable(format!("request is not a JSON object: {}", e)),
    })
}

pub(super) fn run(ctx: &StoreContext, raw: &RawRequest) -> Result<Response> {
    Ok(executor(ctx)?.handle(raw))
}

fn executor(ctx: &StoreContext) -> Result<Executor<FileStore, Box<dyn AuditSink>>> {
    ctx.ensure_initialized()?;
    let config = ctx.load_config()?;
    Ok(Executor::new(ctx.record_store(&config), ctx.audit_sink(&config)))
}

fn finish(response: &Response, json: bool) -> Result<i32> {
    if json {
        let body = serde_json::to_string_pretty(response).map_err(|e| {
            CheckoutError::UserError(format!("failed to serialize response: {}", e))
        })?;
        println!("{}", body);
    } else {
        print!("{}", render_text(response));
    }
    Ok(response.exit_code())
}

/// Human-readable rendering of a response.
pub(super) fn render_text(response: &Response) -> String {
    let mut out = format!("{}\n", response.response);

    let labeled = [
        ("Key", &response.key),
        ("Filename", &response.filename),
        ("Held by", &response.openby),
        ("Since", &response.opendate),
        ("Saved by", &response.saveby),
        ("Saved", &response.savedate),
        ("Contact", &response.contact),
        ("Error", &response.error),
    ];
    for (label, value) in labeled {
        if let Some(value) = value {
            out.push_str(&format!("  {:<9} {}\n", format!("{}:", label), value));
        }
    }

    out
}
