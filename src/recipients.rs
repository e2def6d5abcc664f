//! Recipient list loading
//!
//! Reads the mint-to-destination list for send-to-many-wallets from
//! headered CSV or TSV, or from a JSON array of objects. Addresses are
//! validated here so the engine only ever sees well-formed pairs.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;

use crate::types::TransferPair;

/// One raw list entry before address validation.
#[derive(Debug, Deserialize)]
struct RawRecord {
    mint: String,
    destination: String,
}

/// Load and validate a transfer list, dispatching on file extension
/// (`.csv`, `.tsv` or `.json`).
pub fn load_transfer_list(path: &Path) -> Result<Vec<TransferPair>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let records = match extension {
        "csv" => read_delimited(path, b',')?,
        "tsv" => read_delimited(path, b'\t')?,
        "json" => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read list file: {}", path.display()))?;
            serde_json::from_str::<Vec<RawRecord>>(&content)
                .context("JSON list must be an array of {mint, destination} objects")?
        }
        other => anyhow::bail!(
            "unrecognized list format '{}', expected .csv, .tsv or .json",
            other
        ),
    };

    if records.is_empty() {
        anyhow::bail!("transfer list is empty: {}", path.display());
    }

    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let mint = Pubkey::from_str(&record.mint)
                .with_context(|| format!("entry {}: invalid mint '{}'", i + 1, record.mint))?;
            let destination = Pubkey::from_str(&record.destination).with_context(|| {
                format!(
                    "entry {}: invalid destination '{}'",
                    i + 1,
                    record.destination
                )
            })?;
            Ok(TransferPair::new(mint, destination))
        })
        .collect()
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to read list file: {}", path.display()))?;

    reader
        .deserialize()
        .enumerate()
        .map(|(i, record)| record.with_context(|| format!("entry {}: malformed row", i + 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_list(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_csv_list() {
        let mint = Pubkey::new_unique();
        let destination = Pubkey::new_unique();
        let file = write_list(".csv", &format!("mint,destination\n{},{}\n", mint, destination));

        let pairs = load_transfer_list(file.path()).unwrap();
        assert_eq!(pairs, vec![TransferPair::new(mint, destination)]);
    }

    #[test]
    fn test_tsv_list() {
        let mint = Pubkey::new_unique();
        let destination = Pubkey::new_unique();
        let file = write_list(".tsv", &format!("mint\tdestination\n{}\t{}\n", mint, destination));

        let pairs = load_transfer_list(file.path()).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].destination, destination);
    }

    #[test]
    fn test_json_list_preserves_order() {
        let a = (Pubkey::new_unique(), Pubkey::new_unique());
        let b = (Pubkey::new_unique(), Pubkey::new_unique());
        let file = write_list(
            ".json",
            &format!(
                r#"[{{"mint":"{}","destination":"{}"}},{{"mint":"{}","destination":"{}"}}]"#,
                a.0, a.1, b.0, b.1
            ),
        );

        let pairs = load_transfer_list(file.path()).unwrap();
        assert_eq!(pairs[0].mint, a.0);
        assert_eq!(pairs[1].mint, b.0);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = write_list(".yaml", "mint: x\n");
        assert!(load_transfer_list(file.path()).is_err());
    }

    #[test]
    fn test_invalid_address_names_the_entry() {
        let file = write_list(".csv", "mint,destination\nnot-a-mint,also-bad\n");
        let err = load_transfer_list(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("entry 1"));
    }

    #[test]
    fn test_empty_list_rejected() {
        let file = write_list(".csv", "mint,destination\n");
        assert!(load_transfer_list(file.path()).is_err());
    }
}
