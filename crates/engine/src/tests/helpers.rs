use crate::FileStore;
use config::{DecodePolicy, OutputFormat, StoreConfig};
use record::{LogRecord, LogType};
use std::path::Path;

pub fn store(dir: &Path, format: OutputFormat, field_separator: Option<&str>) -> FileStore {
    let mut cfg = StoreConfig::new(dir);
    cfg.format = format;
    cfg.field_separator = field_separator.map(str::to_string);
    FileStore::new(cfg).unwrap()
}

pub fn skipping_store(dir: &Path, format: OutputFormat, field_separator: Option<&str>) -> FileStore {
    let mut cfg = StoreConfig::new(dir);
    cfg.format = format;
    cfg.field_separator = field_separator.map(str::to_string);
    cfg.decode_policy = DecodePolicy::Skip;
    FileStore::new(cfg).unwrap()
}

pub fn crew_member(id: &str, user: &str, kind: LogType, second: u32) -> LogRecord {
    LogRecord {
        log: format!("{user} log"),
        comment: String::new(),
        system: String::new(),
        user: user.to_string(),
        posted: format!("2024-05-01T10:00:{second:02}.000Z").parse().unwrap(),
        kind,
        code: String::new(),
        id: id.to_string(),
    }
}

/// The four-record fixture: rick, morty, finn, jake appended in that
/// order with types info, debug, other, other.
pub fn crew() -> Vec<LogRecord> {
    vec![
        crew_member("rick-id", "rick", LogType::Info, 1),
        crew_member("morty-id", "morty", LogType::Debug, 2),
        crew_member("finn-id", "finn", LogType::Other, 3),
        crew_member("jake-id", "jake", LogType::Other, 4),
    ]
}

pub fn seed_crew(store: &FileStore) -> Vec<LogRecord> {
    let records = crew();
    for record in &records {
        store.add(record).unwrap();
    }
    records
}

pub fn ids(records: &[LogRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}
