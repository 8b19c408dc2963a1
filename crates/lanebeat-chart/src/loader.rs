use std::path::Path;

use log::warn;

use crate::chart::Chart;

/// Chart loading collaborator.
///
/// Implementations must be tolerant: a missing or corrupt file yields `None`
/// and the caller skips the entry.
pub trait ChartLoader {
    fn load_chart(&self, path: &Path) -> Option<Chart>;
}

/// Loads JSON charts from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonChartLoader;

impl ChartLoader for JsonChartLoader {
    fn load_chart(&self, path: &Path) -> Option<Chart> {
        match Chart::load(path) {
            Ok(chart) => Some(chart),
            Err(e) => {
                warn!("Skipping chart {}: {}", path.display(), e);
                None
            }
        }
    }
}
