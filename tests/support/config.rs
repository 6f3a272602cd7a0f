use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Write `contents` to `name` inside `dir` and return the path.
pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read file")
}

pub const VALID_CONFIG: &str = r#"
[logging]
level = "warn"
format = "pretty"

[engine]
total_stake = 500
min_profit_pct = 0.5
max_outcomes = 3

[confidence]
critical_above = 15
moderate_above = 5
verify_above = 2

[sanity]
enabled = true
min_price = 1.01
max_price = 15.0
min_implied_probability = 0.80

[sources]
allowed = ["DraftKings", "FanDuel", "BetMGM"]

[schedule]
include_live = false
grace_minutes = 0
"#;

pub const UPLOAD_JSON: &str = r#"{
  "games": [
    {
      "match": "Lakers vs Celtics",
      "sport": "NBA",
      "date": "2025-10-15",
      "bookmakers": [
        {"name": "DraftKings", "home": 2.10, "away": 1.80},
        {"name": "FanDuel", "home": 1.95, "away": 2.20}
      ]
    },
    {
      "match": "Heat vs Knicks",
      "sport": "NBA",
      "date": "2025-10-15",
      "bookmakers": [
        {"name": "DraftKings", "home": 1.80, "away": 1.90},
        {"name": "FanDuel", "home": 1.85, "away": 1.85}
      ]
    }
  ]
}"#;
