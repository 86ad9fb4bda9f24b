use super::helpers::*;
use config::OutputFormat;
use query::Query;
use record::LogType;
use std::fs;
use tempfile::tempdir;

// -------------------- Append framing --------------------

#[test]
fn flat_with_separator_appends_one_line_per_record() {
    let dir = tempdir().unwrap();
    let store = store(dir.path(), OutputFormat::Flat, Some("@"));
    let rec = crew_member("rick-id", "rick", LogType::Info, 1);
    store.add(&rec).unwrap();

    let content = fs::read_to_string(store.file_path()).unwrap();
    assert_eq!(
        content,
        "rick log@@@rick@2024-05-01T10:00:01.000Z@info@@rick-id\r\n"
    );
}

#[test]
fn flat_without_separator_appends_json_lines() {
    let dir = tempdir().unwrap();
    let store = store(dir.path(), OutputFormat::Flat, None);
    seed_crew(&store);

    let content = fs::read_to_string(store.file_path()).unwrap();
    let lines: Vec<&str> = content.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 4);
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value["id"].as_str().unwrap().ends_with("-id"));
    }
}

#[test]
fn json_format_records_share_braces_with_the_separator() {
    let dir = tempdir().unwrap();
    let store = store(dir.path(), OutputFormat::Json, None);
    seed_crew(&store);

    let content = fs::read_to_string(store.file_path()).unwrap();
    // Three boundaries between four records, file ends with CRLF.
    assert_eq!(content.matches("}\r\n{").count(), 3);
    assert!(content.ends_with("}\r\n"));
}

#[test]
fn opaque_format_stores_display_lines() {
    let dir = tempdir().unwrap();
    let store = store(dir.path(), OutputFormat::Opaque, None);
    let rec = crew_member("rick-id", "rick", LogType::Info, 1);
    store.add(&rec).unwrap();

    let content = fs::read_to_string(store.file_path()).unwrap();
    assert_eq!(content, format!("{rec}\r\n"));
}

// -------------------- Lazy file creation --------------------

#[test]
fn file_is_created_on_first_add() {
    let dir = tempdir().unwrap();
    let store = store(dir.path(), OutputFormat::Flat, None);
    assert!(!store.file_path().exists());

    store.add(&crew_member("a", "rick", LogType::Info, 1)).unwrap();
    assert!(store.file_path().exists());
}

#[test]
fn freshly_created_record_reads_back_equal() {
    // Records stamped by `LogRecord::new` carry millisecond-precision
    // timestamps, so reading through the flat encoding loses nothing.
    let dir = tempdir().unwrap();
    let store = store(dir.path(), OutputFormat::Flat, Some("|"));

    let rec = record::LogRecord::new("precision check", LogType::Info);
    store.add(&rec).unwrap();

    assert_eq!(store.get(&Query::all()).unwrap(), vec![rec]);
}

#[test]
fn add_message_normalizes_and_returns_the_record() {
    let dir = tempdir().unwrap();
    let store = store(dir.path(), OutputFormat::Flat, None);

    let rec = store.add_message("portal misfire", LogType::Error).unwrap();
    assert_eq!(rec.log, "portal misfire");
    assert_eq!(rec.kind, LogType::Error);
    assert!(!rec.id.is_empty());

    let got = store.get(&Query::by_id(&rec.id)).unwrap();
    assert_eq!(got, vec![rec]);
}

// -------------------- Delete --------------------

#[test]
fn del_is_a_documented_no_op() {
    let dir = tempdir().unwrap();
    let store = store(dir.path(), OutputFormat::Flat, None);
    seed_crew(&store);

    assert_eq!(store.del(&Query::by_id("rick-id")).unwrap(), 0);
    // Nothing was removed.
    assert_eq!(store.get(&Query::all()).unwrap().len(), 4);
}
