//! order-gate: checkout hook and entry admin CLI.
//!
//! With no subcommand (or `scan`), reads a checkout event as JSON from
//! stdin and writes the scan outcome as JSON to stdout. Exit status is 0
//! for accepted orders, 2 for blocked orders, 1 for errors.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use order_gate::checkout::{self, CheckoutInput, ScanSettings};
use order_gate::config::{Config, LookupFailurePolicy};
use order_gate::entry::{Entry, Kind};
use order_gate::error::{ScanError, StoreError};
use order_gate::eval::Flag;
use order_gate::logging;
use order_gate::store::{EntryStore, FileStore, MemoryStore};

#[derive(Parser, Debug)]
#[command(
    name = "order-gate",
    version,
    about = "Flag checkout orders from email and app user id denylists"
)]
struct Cli {
    /// Config overlay (default: ~/.config/order-gate/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Entry file (overrides [store] path)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a checkout event read from stdin
    Scan {
        /// Scan even if scan_enabled is false in config
        #[arg(long)]
        force: bool,
    },

    /// Manage denylist/allowlist entries
    Entry {
        #[command(subcommand)]
        action: EntryAction,
    },
}

#[derive(Subcommand, Debug)]
enum EntryAction {
    /// Add an entry, or update it if it exists
    Add {
        /// email or app_user_id
        #[arg(long = "type")]
        kind: Kind,
        /// Email address or app user id
        identifier: String,
        /// blocked, review, or verified
        #[arg(long)]
        flag: Flag,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Remove an entry
    Remove {
        #[arg(long = "type")]
        kind: Kind,
        identifier: String,
    },

    /// Show one entry
    Show {
        #[arg(long = "type")]
        kind: Kind,
        identifier: String,
    },

    /// List entries, optionally of one type
    List {
        #[arg(long = "type")]
        kind: Option<Kind>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());
    logging::init(&config.log_path(), &config.logging.level);

    let code = run(
        cli,
        &config,
        &mut std::io::stdin().lock(),
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    );
    ExitCode::from(code)
}

/// Dispatch one command line. Returns the process exit status.
fn run(
    cli: Cli,
    config: &Config,
    input: &mut impl Read,
    out: &mut impl Write,
    err: &mut impl Write,
) -> u8 {
    let store_path = cli.store.unwrap_or_else(|| config.store_path());

    match cli.command {
        None => run_scan(&store_path, config, false, input, out, err),
        Some(Command::Scan { force }) => run_scan(&store_path, config, force, input, out, err),
        Some(Command::Entry { action }) => {
            let result =
                FileStore::open(&store_path).and_then(|mut store| run_entry(&mut store, action));
            match result {
                Ok(text) => {
                    let _ = out.write_all(text.as_bytes());
                    0
                }
                Err(e) => {
                    let _ = writeln!(err, "order-gate: {e}");
                    1
                }
            }
        }
    }
}

fn run_scan(
    store_path: &Path,
    config: &Config,
    force: bool,
    input: &mut impl Read,
    out: &mut impl Write,
    err: &mut impl Write,
) -> u8 {
    let mut raw = String::new();
    if input.read_to_string(&mut raw).is_err() {
        let _ = writeln!(err, "failed to read stdin");
        return 1;
    }

    let event: CheckoutInput = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            let _ = writeln!(err, "JSON parse error: {e}");
            return 1;
        }
    };

    let enabled = force || config.settings.scan_enabled;
    let settings = ScanSettings::from_settings(&config.settings);
    let result = scan_store(store_path, enabled, settings.on_lookup_error)
        .and_then(|store| checkout::run_checkout(event, &*store, enabled, &settings));

    match result {
        Ok(output) => match serde_json::to_string(&output) {
            Ok(json) => {
                let _ = writeln!(out, "{json}");
                output.exit_code()
            }
            Err(e) => {
                let _ = writeln!(err, "order-gate: {e}");
                1
            }
        },
        Err(e) => {
            log::error!("{e}");
            let _ = writeln!(err, "order-gate: {e}");
            e.exit_code()
        }
    }
}

/// A disabled scan never reads the entry file.
fn scan_store(
    path: &Path,
    enabled: bool,
    policy: LookupFailurePolicy,
) -> Result<Box<dyn EntryStore>, ScanError> {
    if !enabled {
        return Ok(Box::new(MemoryStore::new()));
    }
    checkout::open_scan_store(path, policy)
}

/// Apply one entry action. Returns the text to print.
fn run_entry<S: EntryStore>(store: &mut S, action: EntryAction) -> Result<String, StoreError> {
    match action {
        EntryAction::Add {
            kind,
            identifier,
            flag,
            notes,
        } => {
            let entry = Entry::new(kind, &identifier, flag, notes)?;
            let shown = format_entry(&entry);
            let verb = match store.upsert(entry)? {
                Some(_) => "updated",
                None => "added",
            };
            Ok(format!("{verb}: {shown}\n"))
        }
        EntryAction::Remove { kind, identifier } => {
            let key = kind.normalize(&identifier)?;
            Ok(match store.remove(kind, &key)? {
                Some(entry) => format!("removed: {}\n", format_entry(&entry)),
                None => format!("no {kind} entry for {identifier}\n"),
            })
        }
        EntryAction::Show { kind, identifier } => Ok(match store.lookup(kind, &identifier)? {
            Some(entry) => format!("{}\n", format_entry(&entry)),
            None => format!("no {kind} entry for {identifier}\n"),
        }),
        EntryAction::List { kind } => {
            let kinds = match kind {
                Some(k) => vec![k],
                None => Kind::ALL.to_vec(),
            };
            let mut text = String::new();
            for k in kinds {
                for entry in store.list(k)? {
                    text.push_str(&format_entry(&entry));
                    text.push('\n');
                }
            }
            Ok(text)
        }
    }
}

fn format_entry(entry: &Entry) -> String {
    if entry.notes.is_empty() {
        format!("{}\t{}\t{}", entry.kind, entry.identifier, entry.flag)
    } else {
        format!(
            "{}\t{}\t{}\t{}",
            entry.kind, entry.identifier, entry.flag, entry.notes
        )
    }
}
