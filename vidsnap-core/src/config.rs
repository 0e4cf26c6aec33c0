/// Tuning knobs for import sessions. Defaults keep every bulk batch small
/// enough for a single SQLite statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Maximum records per bulk insert for every kind except regions.
    pub batch_size: usize,
    /// Maximum regions per bulk insert.
    pub region_batch_size: usize,
    /// File name of the snapshot document inside a project directory.
    pub document_file_name: String,
}

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_DOCUMENT_FILE_NAME: &str = "table_data.json";

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            region_batch_size: DEFAULT_BATCH_SIZE,
            document_file_name: DEFAULT_DOCUMENT_FILE_NAME.to_string(),
        }
    }
}

impl SnapshotConfig {
    /// Defaults overridden by `VIDSNAP_BATCH_SIZE`, `VIDSNAP_REGION_BATCH_SIZE`
    /// and `VIDSNAP_DOCUMENT_FILE`. Unparsable or zero sizes are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(size) = parse_batch_size(lookup("VIDSNAP_BATCH_SIZE")) {
            config.batch_size = size;
        }
        if let Some(size) = parse_batch_size(lookup("VIDSNAP_REGION_BATCH_SIZE")) {
            config.region_batch_size = size;
        }
        if let Some(name) = lookup("VIDSNAP_DOCUMENT_FILE").filter(|n| !n.trim().is_empty()) {
            config.document_file_name = name;
        }
        config
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_region_batch_size(mut self, size: usize) -> Self {
        self.region_batch_size = size.max(1);
        self
    }
}

fn parse_batch_size(raw: Option<String>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|size| *size > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = SnapshotConfig::default();
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.region_batch_size, 1000);
        assert_eq!(config.document_file_name, "table_data.json");
    }

    #[test]
    fn lookup_overrides_and_ignores_bad_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("VIDSNAP_BATCH_SIZE", "0"),
            ("VIDSNAP_REGION_BATCH_SIZE", "250"),
            ("VIDSNAP_DOCUMENT_FILE", "snapshot.json"),
        ]);
        let config = SnapshotConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.region_batch_size, 250);
        assert_eq!(config.document_file_name, "snapshot.json");
    }

    #[test]
    fn builder_clamps_to_one() {
        let config = SnapshotConfig::default().with_region_batch_size(0);
        assert_eq!(config.region_batch_size, 1);
    }
}
