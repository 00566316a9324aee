//! Weight-table loading from JSON files.

use camino::Utf8Path;
use log::debug;
use swipe_core::{WeightEntry, WeightTable};

use crate::WeightTableLoadError;

/// Load and validate the weight table stored at `path`.
///
/// The file holds a JSON array of `{category, name, points}` rows; their
/// order is preserved.
///
/// # Errors
/// Returns [`WeightTableLoadError`] when the file cannot be read, is not a
/// JSON array of weight rows, or contains a row with a blank category or
/// name.
pub fn load_weight_table(path: &Utf8Path) -> Result<WeightTable, WeightTableLoadError> {
    let raw = swipe_fs::read_to_string(path).map_err(|source| WeightTableLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<WeightEntry> =
        serde_json::from_str(&raw).map_err(|source| WeightTableLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let table = WeightTable::new(entries).map_err(|source| WeightTableLoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("loaded {} weight entries from {path}", table.len());
    Ok(table)
}
