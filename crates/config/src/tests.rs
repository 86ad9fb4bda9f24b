use super::*;

// -------------------- Format parsing --------------------

#[test]
fn format_from_str_round_trip() {
    for fmt in [OutputFormat::Flat, OutputFormat::Json, OutputFormat::Opaque] {
        let parsed: OutputFormat = fmt.to_string().parse().unwrap();
        assert_eq!(parsed, fmt);
    }
}

#[test]
fn unknown_format_is_rejected() {
    let err = "xml".parse::<OutputFormat>().unwrap_err();
    assert_eq!(err, ConfigError::UnknownFormat("xml".to_string()));
}

// -------------------- Record separators --------------------

#[test]
fn record_separators_per_format() {
    assert_eq!(OutputFormat::Flat.record_separator(), b"\r\n");
    assert_eq!(OutputFormat::Json.record_separator(), b"}\r\n{");
    assert_eq!(OutputFormat::Opaque.record_separator(), b"\r\n");
}

// -------------------- Defaults --------------------

#[test]
fn config_defaults() {
    let cfg = StoreConfig::new("logs");
    assert_eq!(cfg.name, DEFAULT_FILE_NAME);
    assert_eq!(cfg.format, OutputFormat::Flat);
    assert!(cfg.field_separator.is_none());
    assert_eq!(cfg.decode_policy, DecodePolicy::Fail);
    assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
    assert_eq!(cfg.file_path(), std::path::Path::new("logs").join(DEFAULT_FILE_NAME));
}

#[test]
fn decode_policy_from_str() {
    assert_eq!("fail".parse::<DecodePolicy>().unwrap(), DecodePolicy::Fail);
    assert_eq!("skip".parse::<DecodePolicy>().unwrap(), DecodePolicy::Skip);
    assert!("ignore".parse::<DecodePolicy>().is_err());
}
