//! # Record Codec
//!
//! Line format shared by both stores:
//!
//! ```text
//! pool:         address|seed phrase
//! assignments:  user_id|address|seed phrase
//! ```
//!
//! Fields are trimmed. The field count is exact: a seed phrase may contain
//! spaces but never the delimiter.

use super::entities::{AssignmentRecord, WalletRecord};
use super::errors::MalformedRecord;

/// Field delimiter.
pub const DELIMITER: char = '|';

/// Field count of a pool line.
pub const WALLET_FIELDS: usize = 2;

/// Field count of an assignment line.
pub const ASSIGNMENT_FIELDS: usize = 3;

/// Split `line` into exactly `expected` trimmed, non-empty fields.
pub fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>, MalformedRecord> {
    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    if fields.len() != expected || fields.iter().any(|f| f.is_empty()) {
        return Err(MalformedRecord {
            line: line.to_string(),
            expected,
            found: fields.iter().filter(|f| !f.is_empty()).count(),
        });
    }
    Ok(fields)
}

pub fn parse_wallet(line: &str) -> Result<WalletRecord, MalformedRecord> {
    let fields = split_fields(line, WALLET_FIELDS)?;
    Ok(WalletRecord::new(fields[0], fields[1]))
}

pub fn parse_assignment(line: &str) -> Result<AssignmentRecord, MalformedRecord> {
    let fields = split_fields(line, ASSIGNMENT_FIELDS)?;
    Ok(AssignmentRecord {
        user_id: fields[0].to_string(),
        address: fields[1].to_string(),
        seed: fields[2].to_string(),
    })
}

pub fn encode_wallet(wallet: &WalletRecord) -> String {
    format!("{}{DELIMITER}{}", wallet.address, wallet.seed)
}

pub fn encode_assignment(record: &AssignmentRecord) -> String {
    format!(
        "{}{DELIMITER}{}{DELIMITER}{}",
        record.user_id, record.address, record.seed
    )
}

/// Check that `value` survives an encode/parse cycle unchanged.
///
/// Returns the reason it would not.
pub fn validate_field(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("empty value");
    }
    if value.trim() != value {
        return Err("surrounding whitespace");
    }
    if value.contains(DELIMITER) {
        return Err("contains the '|' delimiter");
    }
    if value.contains(['\n', '\r']) {
        return Err("contains a line break");
    }
    Ok(())
}
