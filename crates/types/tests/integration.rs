//! Integration tests for types

#[cfg(test)]
mod tests {
    use bubz2_types::*;
    use std::path::PathBuf;
    use std::str::FromStr;

    #[test]
    fn test_level_names_round_trip_through_strings() {
        for text in ["none", "fast", "best", "0", "5", "9"] {
            let level = CompressionLevel::from_str(text).unwrap();
            assert_eq!(level.to_string(), text);
        }
        assert_eq!(
            CompressionLevel::from_str("BEST").unwrap(),
            CompressionLevel::Best
        );
        assert!(CompressionLevel::from_str("10").is_err());
        assert!(CompressionLevel::from_str("-1").is_err());
        assert!(CompressionLevel::from_str("").is_err());
    }

    #[test]
    fn test_level_in_json() {
        let level: CompressionLevel = serde_json::from_str("\"fast\"").unwrap();
        assert_eq!(level, CompressionLevel::Fast);
        assert_eq!(
            serde_json::to_string(&CompressionLevel::Custom(4)).unwrap(),
            "\"4\""
        );
        assert!(serde_json::from_str::<CompressionLevel>("\"max\"").is_err());
    }

    #[test]
    fn test_color_choice_parsing() {
        assert_eq!(ColorChoice::from_str("never").unwrap(), ColorChoice::Never);
        assert_eq!(ColorChoice::default(), ColorChoice::Auto);
        assert!(ColorChoice::from_str("sometimes").is_err());

        let choice: ColorChoice = serde_json::from_str("\"always\"").unwrap();
        assert_eq!(choice, ColorChoice::Always);
    }

    #[test]
    fn test_report_serializes_paths() {
        let report = SyncReport {
            scanned: 1,
            compressed: vec![CompressedFile {
                source: PathBuf::from("cstrike/maps/a.bsp"),
                destination: PathBuf::from("fastdl/maps/a.bsp.bz2"),
                bytes_in: 10,
                bytes_out: 4,
            }],
            ..SyncReport::default()
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["compressed"][0]["bytes_out"], 4);
        assert_eq!(json["failed"].as_array().unwrap().len(), 0);
        assert_eq!(json["dry_run"], false);
    }
}
