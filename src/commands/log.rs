//! `acmco log`: print audit entries for a range of days.

use crate::audit::{DayLog, LogSelection, read_selection};
use crate::cli::LogArgs;
use crate::context::StoreContext;
use crate::error::Result;
use crate::exit_codes;
use chrono::Utc;

pub(super) fn cmd_log(ctx: &StoreContext, args: LogArgs) -> Result<i32> {
    ctx.ensure_initialized()?;

    let selection = LogSelection::from_args(
        args.days,
        args.date.as_deref(),
        args.month.as_deref(),
        args.year.as_deref(),
    )?;

    // Audit files are keyed by UTC date.
    let days = read_selection(&ctx.audit_dir, &selection, Utc::now().date_naive())?;
    print!("{}", render_days(&days));

    Ok(exit_codes::SUCCESS)
}

pub(super) fn render_days(days: &[DayLog]) -> String {
    if days.is_empty() {
        return "No logs found\n".to_string();
    }

    let mut out = String::new();
    for day in days {
        if day.lines.is_empty() {
            out.push_str(&format!("\"{}\": No logs found\n", day.date));
            continue;
        }
        for line in &day.lines {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
