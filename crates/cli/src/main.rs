///! # CLI - Driftlog Interactive Shell
///!
///! A REPL-style command-line interface for the Driftlog file store.
///! Reads commands from stdin, executes them against the store, and prints
///! results to stdout. Designed for both interactive use and scripted
///! testing (pipe commands via stdin).
///!
///! ## Commands
///!
///! ```text
///! ADD [type] message    Append a log record (type: info|warning|error|debug|other)
///! FIRST n [offset]      First n records, optionally past an offset
///! LAST n [offset]       Last n records, optionally shifted back
///! FIND text             Substring search over serialized records
///! WHERE field op value  Single field filter (op: = <= >= <> < > in nin contain)
///! ID id[,id...]         Look up records by id
///! COUNT                 Total number of records
///! DEL                   Always 0 (the file store cannot delete)
///! STATS                 Print store debug info
///! EXIT / QUIT           Shut down
///! ```
///!
///! ## Configuration
///!
///! All settings are controlled via environment variables:
///!
///! ```text
///! DRIFTLOG_DIR            Log directory              (default: "data/logs")
///! DRIFTLOG_FILE           Log file name              (default: "driftlogs.txt")
///! DRIFTLOG_FORMAT         flat | json | string       (default: "flat")
///! DRIFTLOG_SEPARATOR      Flat field separator       (default: unset -> JSON lines)
///! DRIFTLOG_ON_BAD_RECORD  fail | skip                (default: "fail")
///! DRIFTLOG_CHUNK_KB       Read chunk size in KiB     (default: 64)
///! ```
///!
///! ## Example
///!
///! ```text
///! $ cargo run -p cli
///! driftlog started (file=data/logs/driftlogs.txt, format=flat, chunk=64KiB)
///! > ADD info portal opened
///! OK k3Rx9-1735689600000
///! > LAST 1
///! [2024-12-31T23:59:59.000Z] info k3Rx9-1735689600000: portal opened
///! (1 records)
///! > EXIT
///! bye
///! ```

use anyhow::Result;
use config::StoreConfig;
use engine::FileStore;
use query::{CompareOp, Query};
use record::LogType;
use std::io::{self, BufRead, Write};

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let dir = env_or("DRIFTLOG_DIR", "data/logs");
    let name = env_or("DRIFTLOG_FILE", config::DEFAULT_FILE_NAME);
    let format = env_or("DRIFTLOG_FORMAT", "flat").parse()?;
    let separator = std::env::var("DRIFTLOG_SEPARATOR").ok().filter(|s| !s.is_empty());
    let policy = env_or("DRIFTLOG_ON_BAD_RECORD", "fail").parse()?;
    let chunk_kb: usize = env_or("DRIFTLOG_CHUNK_KB", "64").parse().unwrap_or(64);

    let mut cfg = StoreConfig::new(&dir);
    cfg.name = name;
    cfg.format = format;
    cfg.field_separator = separator;
    cfg.decode_policy = policy;
    cfg.chunk_size = chunk_kb.max(1) * 1024;

    let store = FileStore::new(cfg)?;

    println!(
        "driftlog started (file={}, format={}, chunk={}KiB)",
        store.file_path().display(),
        store.config().format,
        chunk_kb.max(1)
    );
    println!("Commands: ADD [type] message | FIRST n [offset] | LAST n [offset]");
    println!("          FIND text | WHERE field op value | ID id[,id...]");
    println!("          COUNT | DEL | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "ADD" => {
                    let rest: Vec<&str> = parts.collect();
                    match build_record(&rest) {
                        Some((message, kind)) => match store.add_message(message, kind) {
                            Ok(rec) => println!("OK {}", rec.id),
                            Err(e) => println!("ERR {e:#}"),
                        },
                        None => println!("ERR usage: ADD [type] message"),
                    }
                }
                "FIRST" | "LAST" => {
                    let n = parts.next().and_then(|s| s.parse::<u64>().ok());
                    let offset = parts.next().and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);
                    match n {
                        Some(n) => {
                            let mut q = Query::all();
                            if cmd.eq_ignore_ascii_case("first") {
                                q.first = Some(n);
                            } else {
                                q.last = Some(n);
                            }
                            q.offset = offset;
                            print_records(&store, &q);
                        }
                        None => println!("ERR usage: {} n [offset]", cmd.to_uppercase()),
                    }
                }
                "FIND" => {
                    let text: String = parts.collect::<Vec<&str>>().join(" ");
                    if text.is_empty() {
                        println!("ERR usage: FIND text");
                    } else {
                        print_records(&store, &Query::by_search(text));
                    }
                }
                "WHERE" => match parse_where(&mut parts) {
                    Some(q) => print_records(&store, &q),
                    None => println!("ERR usage: WHERE field op value"),
                },
                "ID" => {
                    if let Some(ids) = parts.next() {
                        let ids: Vec<&str> = ids.split(',').filter(|s| !s.is_empty()).collect();
                        let q = if ids.len() == 1 {
                            Query::by_id(ids[0])
                        } else {
                            Query::by_ids(ids)
                        };
                        print_records(&store, &q);
                    } else {
                        println!("ERR usage: ID id[,id...]");
                    }
                }
                "COUNT" => match store.count(&Query::all()) {
                    Ok(n) => println!("{n}"),
                    Err(e) => println!("ERR {e:#}"),
                },
                "DEL" => match store.del(&Query::all()) {
                    Ok(n) => println!("{n} (the file store does not delete)"),
                    Err(e) => println!("ERR {e:#}"),
                },
                "STATS" => println!("{store:#?}"),
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => println!("ERR unknown command: {other}"),
            }
        }
        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}

/// `ADD [type] message...` — a leading known type name sets the severity,
/// otherwise the whole rest is the message with type `other`.
fn build_record(rest: &[&str]) -> Option<(String, LogType)> {
    match rest {
        [] => None,
        [first, message @ ..] => match first.parse::<LogType>() {
            Ok(kind) if !message.is_empty() => Some((message.join(" "), kind)),
            _ => Some((rest.join(" "), LogType::Other)),
        },
    }
}

/// `WHERE field op value` — the value parses as JSON when it can (so
/// `["a","b"]` works for `in`/`nin`), and falls back to a plain string.
fn parse_where<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<Query> {
    let field = parts.next()?;
    let op: CompareOp = parts.next()?.parse().ok()?;
    let raw = parts.collect::<Vec<&str>>().join(" ");
    if raw.is_empty() {
        return None;
    }
    let value = serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw));
    Some(Query::by_filter(field, op, value))
}

fn print_records(store: &FileStore, q: &Query) {
    match store.get(q) {
        Ok(records) => {
            for record in &records {
                println!("{record}");
            }
            println!("({} records)", records.len());
        }
        Err(e) => println!("ERR {e:#}"),
    }
}
