//! On-disk catalog root fixtures

use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use tempfile::TempDir;

use idb_manager::config::{HISTORY_FILE, PRIMARY_ARTIFACT};

/// Validity history used by [`create_test_root`]
///
/// 2.26.34 covers 2020 onwards; 2018 and 2019 fall into gaps.
pub const TEST_HISTORY: &str = r#"[
    {"version": "2.26.1", "validFrom": "2016-01-01T00:00:00Z", "validUntil": "2017-01-01T00:00:00Z"},
    {"version": "2.26.3", "validFrom": "2017-01-01T00:00:00Z", "validUntil": "2018-01-01T00:00:00Z"},
    {"version": "2.26.33", "validFrom": "2019-01-01T00:00:00Z", "validUntil": "2019-03-01T00:00:00Z"},
    {"version": "2.26.34", "validFrom": "2020-01-01T00:00:00Z"}
]"#;

pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Write a small IDB-like SQLite database to `path`
pub fn write_idb(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE PCF (PCF_NAME TEXT PRIMARY KEY, PCF_DESCR TEXT);
         CREATE TABLE PID (PID_TYPE INTEGER, PID_STYPE INTEGER, PID_SPID INTEGER);
         INSERT INTO PCF VALUES ('NIX00001', 'test parameter');",
    )
    .unwrap();
}

/// Bytes of a valid IDB database, as a remote repository would serve them
pub fn sqlite_bytes() -> Vec<u8> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(PRIMARY_ARTIFACT);
    write_idb(&path);
    fs::read(path).unwrap()
}

/// Root with complete 2.26.1, 2.26.3, 2.26.34, incomplete 2.26.2 and [`TEST_HISTORY`]
pub fn create_test_root() -> TempDir {
    let temp_dir = TempDir::new().unwrap();

    for (dir, complete) in [
        ("v2.26.1", true),
        ("v2.26.2", false),
        ("v2.26.3", true),
        ("v2.26.34", true),
    ] {
        let path = temp_dir.path().join(dir);
        fs::create_dir_all(&path).unwrap();
        if complete {
            write_idb(&path.join(PRIMARY_ARTIFACT));
        }
    }

    fs::write(temp_dir.path().join(HISTORY_FILE), TEST_HISTORY).unwrap();
    temp_dir
}
