use hashstream::statistics::{EdgeCount, MeanDegree, StatisticsEngine};
use hashstream::{read_events_from_path, GraphStream, WindowConfig};
use std::fs;
use std::io::Write;

const TWEETS: &str = r#"{"created_at":"Thu Oct 29 17:51:01 +0000 2015","entities":{"hashtags":[{"text":"Spark"},{"text":"Apache"}]}}
{"created_at":"Thu Oct 29 17:51:30 +0000 2015","entities":{"hashtags":[{"text":"Apache"},{"text":"Hadoop"},{"text":"Storm"}]}}
{"delete":{"status":{"id":1}}}
{"created_at":"Thu Oct 29 17:51:55 +0000 2015","entities":{"hashtags":[{"text":"Flink"},{"text":"Spark"}]}}
"#;

#[test]
fn file_to_file_pass() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tweets.txt");
    let output = dir.path().join("degrees.txt");
    fs::File::create(&input)
        .unwrap()
        .write_all(TWEETS.as_bytes())
        .unwrap();

    let report = read_events_from_path(&input).unwrap();
    assert_eq!(report.log.len(), 3);
    assert_eq!(report.dropped, 1);

    let stream = GraphStream::new(&report.log, WindowConfig::default());
    let matrix = StatisticsEngine::new()
        .with(MeanDegree)
        .with(EdgeCount)
        .compute_and_save(stream, Some(output.as_path()))
        .unwrap();
    assert_eq!(matrix.len(), 3);

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written, "1.00 1.00\n2.00 4.00\n2.00 5.00\n");
}

#[test]
fn no_output_path_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tweets.txt");
    fs::write(&input, TWEETS).unwrap();

    let report = read_events_from_path(&input).unwrap();
    let stream = GraphStream::new(&report.log, WindowConfig::default());
    StatisticsEngine::new()
        .with(MeanDegree)
        .compute_and_save(stream, None)
        .unwrap();

    let entries = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}
