//! # Wallet CLI
//!
//! Process boundary for the wallet allocator. The request gateway runs
//! `assign-wallet assign <USER_ID>`; operators use the remaining subcommands.
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success, result on stdout |
//! | 1 | Usage error (missing or invalid arguments) |
//! | 2 | Operational error, `ERROR: <message>` on stderr |

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use wallet_allocator::domain::codec;
use wallet_allocator::{
    AllocatorConfig, LockWait, WalletAllocatorApi, WalletAllocatorService, WalletFilter,
    WalletRecord,
};

/// Exit status for argument errors.
pub const EXIT_USAGE: u8 = 1;

/// Exit status for allocation and store failures.
pub const EXIT_FAILURE: u8 = 2;

/// Assign pre-generated wallets to users from a file-backed pool.
#[derive(Parser, Debug)]
#[command(name = "assign-wallet", version)]
#[command(about = "Assign pre-generated wallets to users from a file-backed pool")]
pub struct Cli {
    /// Directory holding both stores [env: WALLET_DATA_DIR]
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Pool store file name [env: WALLET_POOL_FILE]
    #[arg(long, global = true)]
    pub pool_file: Option<PathBuf>,

    /// Assignment store file name [env: WALLET_USERS_FILE]
    #[arg(long, global = true)]
    pub users_file: Option<PathBuf>,

    /// Lock wait in milliseconds, 0 to fail fast, "block" to wait forever
    /// [env: WALLET_LOCK_TIMEOUT_MS]
    #[arg(long, global = true, value_parser = parse_lock_wait)]
    pub lock_timeout: Option<LockWait>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assign a wallet to a user and print its address
    Assign {
        #[arg(value_parser = parse_user_id)]
        user_id: String,
    },

    /// Print a user's assignment as JSON, or null
    Lookup {
        #[arg(value_parser = parse_user_id)]
        user_id: String,
    },

    /// List every assignment as JSON
    Users,

    /// List wallets as JSON, free ones first (seeds are never listed)
    Wallets {
        /// Case-insensitive address substring
        #[arg(short, long)]
        query: Option<String>,

        /// Only wallets still in the pool
        #[arg(long)]
        only_free: bool,
    },

    /// Append `address|seed` lines to the pool tail
    Replenish {
        /// Input file, or "-" for stdin
        #[arg(default_value = "-")]
        input: String,
    },

    /// Drop pool wallets that are already assigned
    Reconcile,

    /// Print pool counters as JSON
    Stats,
}

/// Surrounding whitespace is dropped; a blank id counts as a missing one.
fn parse_user_id(value: &str) -> Result<String, String> {
    match value.trim() {
        "" => Err("a user id is required".to_string()),
        id => Ok(id.to_string()),
    }
}

fn parse_lock_wait(value: &str) -> Result<LockWait, String> {
    LockWait::parse(value).ok_or_else(|| format!("expected milliseconds or \"block\", got {value:?}"))
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> AllocatorConfig {
        let mut config = AllocatorConfig::from_env();
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(file) = &self.pool_file {
            config.pool_file = file.clone();
        }
        if let Some(file) = &self.users_file {
            config.users_file = file.clone();
        }
        if let Some(wait) = self.lock_timeout {
            config.lock_wait = wait;
        }
        config
    }
}

/// Execute `cli`, writing the result to `out`.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let service = WalletAllocatorService::from_config(&cli.config())?;

    match &cli.command {
        Command::Assign { user_id } => {
            let assignment = service.assign(user_id)?;
            writeln!(out, "{}", assignment.address)?;
        }
        Command::Lookup { user_id } => print_json(out, &service.lookup(user_id)?)?,
        Command::Users => print_json(out, &service.list_assignments()?)?,
        Command::Wallets { query, only_free } => {
            let filter = WalletFilter {
                query: query.clone(),
                only_free: *only_free,
            };
            print_json(out, &service.list_wallets(&filter)?)?;
        }
        Command::Replenish { input } => {
            let wallets = parse_wallet_lines(&read_input(input)?)?;
            let added = service.replenish(wallets)?;
            print_json(out, &serde_json::json!({ "added": added }))?;
        }
        Command::Reconcile => print_json(out, &service.reconcile()?)?,
        Command::Stats => print_json(out, &service.stats()?)?,
    }
    Ok(())
}

fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| anyhow!("cannot read wallet list from stdin: {e}"))?;
        Ok(buf)
    } else {
        fs::read_to_string(input).map_err(|e| anyhow!("cannot read wallet list: {e}"))
    }
}

/// Parse `address|seed` lines, skipping blank ones.
///
/// Errors carry the 1-based line number but not the line, which holds a seed.
pub fn parse_wallet_lines(text: &str) -> Result<Vec<WalletRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            codec::parse_wallet(line).map_err(|e| anyhow!("wallet list line {}: {e}", index + 1))
        })
        .collect()
}
