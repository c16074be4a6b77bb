//! CLI argument parsing for acmco.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// acmco: exclusive checkout and check-in of shared ACM databases.
///
/// One holder at a time may check out an ACM. Check-in and discard require the
/// token handed out at checkout; revoke clears any checkout unconditionally.
#[derive(Parser, Debug)]
#[command(name = "acmco")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Store root (default: $ACM_CHECKOUT_ROOT, else ./.acm-checkout).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Increase diagnostic output on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for acmco.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a checkout store.
    ///
    /// Creates the records, locks and audit directories and a config template.
    /// Safe to re-run.
    Init,

    /// Check out an ACM.
    ///
    /// Prints the token needed to check it back in.
    CheckOut(CheckOutArgs),

    /// Check in an ACM, or register a new one with `--key new`.
    CheckIn(CheckInArgs),

    /// Give up your checkout without recording a check-in.
    Discard(DiscardArgs),

    /// Clear whatever checkout an ACM has (administrative override).
    Revoke(RevokeArgs),

    /// Show who holds an ACM, or who last checked it in.
    Status(StatusArgs),

    /// Handle one raw JSON request and print the JSON response.
    ///
    /// The request uses the client wire fields (`db`, `action`, `key`,
    /// `filename`, `name`, `contact`, `version`, `comment`, `computername`).
    Handle(HandleArgs),

    /// Lock management commands.
    ///
    /// List or clear per-record store locks.
    Lock(LockCommand),

    /// Print audit entries.
    ///
    /// Without a selector, prints the last 7 days.
    Log(LogArgs),
}

/// Arguments for the `check-out` command.
#[derive(Parser, Debug)]
pub struct CheckOutArgs {
    /// ACM name (e.g., ACM-FB-2013-01).
    pub db: String,

    /// Holder name (default: user@HOST).
    #[arg(long)]
    pub name: Option<String>,

    /// Contact for the holder (e.g., a phone number).
    #[arg(long)]
    pub contact: Option<String>,

    /// Version label of the local copy.
    #[arg(id = "version_label", long = "version-label", value_name = "LABEL")]
    pub version: Option<String>,

    #[arg(long)]
    pub comment: Option<String>,

    /// Machine the checkout happens on (default: this host).
    #[arg(long)]
    pub computername: Option<String>,

    /// Print the raw JSON response.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `check-in` command.
#[derive(Parser, Debug)]
pub struct CheckInArgs {
    /// ACM name.
    pub db: String,

    /// Token from check-out, or `new` to register the ACM.
    #[arg(long)]
    pub key: String,

    /// Artifact label being checked in (e.g., db13.zip).
    #[arg(long)]
    pub filename: Option<String>,

    /// Holder name (default: user@HOST).
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub contact: Option<String>,

    /// Comment recorded when registering a new ACM.
    #[arg(long)]
    pub comment: Option<String>,

    /// Print the raw JSON response.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `discard` command.
#[derive(Parser, Debug)]
pub struct DiscardArgs {
    /// ACM name.
    pub db: String,

    /// Token from check-out.
    #[arg(long)]
    pub key: String,

    /// Holder name (default: user@HOST).
    #[arg(long)]
    pub name: Option<String>,

    /// Print the raw JSON response.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `revoke` command.
#[derive(Parser, Debug)]
pub struct RevokeArgs {
    /// ACM name.
    pub db: String,

    /// Print the raw JSON response.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// ACM name.
    pub db: Option<String>,

    /// Print the raw JSON response.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `handle` command.
#[derive(Parser, Debug)]
pub struct HandleArgs {
    /// Request JSON. Read from stdin when omitted.
    #[arg(long)]
    pub request: Option<String>,
}

/// Lock subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// List all record locks.
    ///
    /// Shows each lock's owner, age and whether it is stale.
    List,

    /// Clear the lock on one record.
    ///
    /// Only stale locks are cleared unless --force is given.
    Clear(LockClearArgs),
}

/// Arguments for the `lock clear` command.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// ACM name whose lock should be cleared.
    pub name: String,

    /// Clear the lock even if it is not stale.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `log` command.
#[derive(Parser, Debug)]
pub struct LogArgs {
    /// Positive N: the last N days. Negative N: the single day N days ago.
    #[arg(allow_negative_numbers = true, value_name = "N")]
    pub days: Option<i32>,

    /// A single day (YYYY-M-D).
    #[arg(short, long, conflicts_with_all = ["days", "month", "year"])]
    pub date: Option<String>,

    /// A whole month (YYYY-M).
    #[arg(short, long, conflicts_with_all = ["days", "year"])]
    pub month: Option<String>,

    /// A whole year (YYYY).
    #[arg(short, long, conflicts_with = "days")]
    pub year: Option<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init_with_global_flags() {
        let cli = Cli::try_parse_from(["acmco", "init", "--root", "/srv/acm", "-vv"]).unwrap();
        assert!(matches!(cli.command, Command::Init));
        assert_eq!(cli.root, Some(PathBuf::from("/srv/acm")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn parse_check_out_full() {
        let cli = Cli::try_parse_from([
            "acmco",
            "check-out",
            "ACM-FB-2013-01",
            "--name",
            "alice",
            "--contact",
            "555-0100",
            "--version-label",
            "r1606221",
            "--json",
        ])
        .unwrap();
        if let Command::CheckOut(args) = cli.command {
            assert_eq!(args.db, "ACM-FB-2013-01");
            assert_eq!(args.name, Some("alice".to_string()));
            assert_eq!(args.version, Some("r1606221".to_string()));
            assert!(args.computername.is_none());
            assert!(args.json);
        } else {
            panic!("Expected CheckOut command");
        }
    }

    #[test]
    fn parse_check_in_requires_key() {
        assert!(Cli::try_parse_from(["acmco", "check-in", "ACM-X"]).is_err());

        let cli = Cli::try_parse_from([
            "acmco",
            "check-in",
            "ACM-X",
            "--key",
            "new",
            "--filename",
            "db1.zip",
        ])
        .unwrap();
        if let Command::CheckIn(args) = cli.command {
            assert_eq!(args.key, "new");
            assert_eq!(args.filename, Some("db1.zip".to_string()));
        } else {
            panic!("Expected CheckIn command");
        }
    }

    #[test]
    fn parse_status_without_name() {
        let cli = Cli::try_parse_from(["acmco", "status"]).unwrap();
        assert!(matches!(cli.command, Command::Status(StatusArgs { db: None, .. })));
    }

    #[test]
    fn parse_handle() {
        let cli = Cli::try_parse_from(["acmco", "handle", "--request", "{}"]).unwrap();
        if let Command::Handle(args) = cli.command {
            assert_eq!(args.request, Some("{}".to_string()));
        } else {
            panic!("Expected Handle command");
        }
    }

    #[test]
    fn parse_lock_clear() {
        let cli = Cli::try_parse_from(["acmco", "lock", "clear", "ACM-X", "--force"]).unwrap();
        if let Command::Lock(LockCommand {
            action: LockAction::Clear(args),
        }) = cli.command
        {
            assert_eq!(args.name, "ACM-X");
            assert!(args.force);
        } else {
            panic!("Expected Lock Clear command");
        }
    }

    #[test]
    fn parse_log_negative_days() {
        let cli = Cli::try_parse_from(["acmco", "log", "-4"]).unwrap();
        if let Command::Log(args) = cli.command {
            assert_eq!(args.days, Some(-4));
        } else {
            panic!("Expected Log command");
        }
    }

    #[test]
    fn parse_log_selectors_conflict() {
        assert!(Cli::try_parse_from(["acmco", "log", "3", "--year", "2016"]).is_err());
        assert!(Cli::try_parse_from(["acmco", "log", "-d", "2016-6-13", "-m", "2016-6"]).is_err());
    }
}
