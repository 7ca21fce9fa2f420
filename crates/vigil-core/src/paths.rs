use crate::record::TimeOfDay;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const VIGIL_DIR: &str = ".vigil";
pub const CONFIG_FILE: &str = ".vigil/config.yaml";

// ---------------------------------------------------------------------------
// Store keys (relative to the data directory)
// ---------------------------------------------------------------------------

pub const CACHE_PREFIX: &str = "cache";
pub const PRAYER_SLOT: &str = "latest_prayer.json";

pub fn metadata_slot(time_of_day: TimeOfDay) -> String {
    format!("metadata_{time_of_day}.json")
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn data_dir(root: &Path) -> PathBuf {
    root.join(VIGIL_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.vigil/config.yaml")
        );
        assert_eq!(data_dir(root), PathBuf::from("/tmp/proj/.vigil"));
    }

    #[test]
    fn metadata_slots_are_per_time_of_day() {
        assert_eq!(metadata_slot(TimeOfDay::Morning), "metadata_morning.json");
        assert_eq!(metadata_slot(TimeOfDay::Evening), "metadata_evening.json");
    }
}
