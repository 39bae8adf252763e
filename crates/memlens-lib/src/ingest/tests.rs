//! Integration tests for log ingestion
//!
//! These tests write mock node logs to a temporary directory and scan them
//! the same way the CLI does.

#[cfg(test)]
mod log_file_tests {
    use crate::error::AnalysisError;
    use crate::ingest::{RecordExtractor, SampleStore};
    use std::io::{Cursor, Write};
    use tempfile::TempDir;

    /// Mixed zap output: unrelated records, memory samples, and a broken line
    const NODE_LOG: &str = r#"{"level":"info","ts":1764924000.1,"msg":"node started","version":"v1.4.2"}
{"level":"info","ts":1764924010.2,"msg":"memory_sample","time":"2025-12-05T16:40:10+08:00","rss_mb":100,"rss_bytes":104857600,"heap_mb":60,"heap_alloc_bytes":62914560,"heap_inuse_bytes":70000000,"gc":3,"goroutines":120,"modules":["mempool","p2p"]}
{"level":"debug","ts":1764924011.0,"msg":"peer connected","peer":"12D3KooW"}
{"level":"info","ts":1764924020.2,"msg":"memory_sample","time":"2025-12-05T16:40:20+08:00","rss_mb":101,"gc":4
{"level":"info","ts":1764924030.2,"msg":"memory_sample","time":"2025-12-05T16:40:30+08:00","rss_mb":102,"rss_bytes":106954752,"heap_mb":61,"heap_alloc_bytes":63963136,"heap_inuse_bytes":71000000,"gc":5,"goroutines":121,"modules":["mempool","p2p","consensus"]}
plain text from a panic handler
"#;

    fn write_log(temp_dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = temp_dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_load_mixed_log() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_log(&temp_dir, "node-system.log", NODE_LOG.as_bytes());

        let store = SampleStore::load(&path, &RecordExtractor::default()).unwrap();

        assert_eq!(store.len(), 2);
        let samples = store.samples();
        assert_eq!(samples[0].rss_mb, 100.0);
        assert_eq!(samples[0].module_count(), 2);
        assert_eq!(samples[1].rss_mb, 102.0);
        assert_eq!(samples[1].module_count(), 3);
        assert!(samples[0].timestamp < samples[1].timestamp);

        let stats = store.stats();
        assert_eq!(stats.lines_read, 6);
        assert_eq!(stats.candidate_lines, 3);
        assert_eq!(stats.samples_extracted, 2);
        assert_eq!(stats.lines_rejected, 1);
        assert_eq!(stats.out_of_order, 0);
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("does-not-exist.log");

        let err = SampleStore::load(&path, &RecordExtractor::default()).unwrap_err();
        match err {
            AnalysisError::SourceUnavailable { path: reported, source } => {
                assert_eq!(reported, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let temp_dir = TempDir::new().unwrap();
        let mut contents = Vec::new();
        contents.extend_from_slice(b"\xff\xfe garbage bytes \xc3\x28\n");
        contents.extend_from_slice(
            br#"{"msg":"memory_sample","time":"2025-12-05T08:00:00Z","rss_mb":50,"note":""#,
        );
        contents.extend_from_slice(b"\xff");
        contents.extend_from_slice(b"\"}\n");
        let path = write_log(&temp_dir, "binary.log", &contents);

        let store = SampleStore::load(&path, &RecordExtractor::default()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.samples()[0].rss_mb, 50.0);
    }

    #[test]
    fn test_empty_source_requires_samples() {
        let store =
            SampleStore::from_reader(Cursor::new("nothing to see\n"), &RecordExtractor::default())
                .unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.require_samples(),
            Err(AnalysisError::NoSamples)
        ));
    }

    #[test]
    fn test_file_order_preserved_and_regressions_counted() {
        let log = concat!(
            r#"{"msg":"memory_sample","time":"2025-12-05T10:00:00Z","rss_mb":1}"#,
            "\n",
            r#"{"msg":"memory_sample","time":"2025-12-05T09:00:00Z","rss_mb":2}"#,
            "\n",
            r#"{"msg":"memory_sample","time":"2025-12-05T11:00:00Z","rss_mb":3}"#,
        );
        let store =
            SampleStore::from_reader(Cursor::new(log), &RecordExtractor::default()).unwrap();

        let rss: Vec<f64> = store.samples().iter().map(|s| s.rss_mb).collect();
        assert_eq!(rss, vec![1.0, 2.0, 3.0]);
        assert_eq!(store.stats().out_of_order, 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let log = "{\"msg\":\"memory_sample\",\"time\":\"2025-12-05T10:00:00Z\",\"rss_mb\":7}\r\n";
        let store =
            SampleStore::from_reader(Cursor::new(log), &RecordExtractor::default()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.samples()[0].rss_mb, 7.0);
    }
}
