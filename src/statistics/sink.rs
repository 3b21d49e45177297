//! Persistence sinks for computed statistics.
//!
//! `TextSink` writes the plain numeric layout (one row per graph, values
//! separated by a space, two decimals). `SqliteSink` keeps every cell along
//! with its graph time and statistic name.

use crate::statistics::StatMatrix;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Error types for sink writes
#[derive(Debug)]
pub enum SinkError {
    /// File could not be created, written or flushed
    Io(std::io::Error),
    /// Record encoding failed
    Csv(csv::Error),
    /// Database statement failed
    Sqlite(rusqlite::Error),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(err) => write!(f, "I/O error: {}", err),
            SinkError::Csv(err) => write!(f, "Write error: {}", err),
            SinkError::Sqlite(err) => write!(f, "SQLite error: {}", err),
        }
    }
}

impl std::error::Error for SinkError {}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err)
    }
}

impl From<csv::Error> for SinkError {
    fn from(err: csv::Error) -> Self {
        SinkError::Csv(err)
    }
}

impl From<rusqlite::Error> for SinkError {
    fn from(err: rusqlite::Error) -> Self {
        SinkError::Sqlite(err)
    }
}

/// Destination for a computed statistics matrix.
pub trait StatsSink {
    /// Writes every row of `matrix`.
    ///
    /// # Errors
    /// Returns the underlying I/O, encoding or database error; nothing is
    /// retried.
    fn write_matrix(&mut self, matrix: &StatMatrix) -> Result<(), SinkError>;
}

/// Whitespace-delimited text output with two decimal places.
pub struct TextSink<W: Write> {
    writer: csv::Writer<W>,
}

impl TextSink<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let file = File::create(path.as_ref())?;
        log::debug!("Opened statistics file {}", path.as_ref().display());
        Ok(Self::from_writer(BufWriter::new(file)))
    }
}

impl<W: Write> TextSink<W> {
    /// Wraps any writer, e.g. a `Vec<u8>` in tests.
    pub fn from_writer(writer: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        TextSink { writer }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|err| SinkError::Io(err.into_error()))
    }
}

impl<W: Write> StatsSink for TextSink<W> {
    fn write_matrix(&mut self, matrix: &StatMatrix) -> Result<(), SinkError> {
        for row in matrix.rows() {
            self.writer
                .write_record(row.iter().map(|value| format!("{:.2}", value)))?;
        }
        self.writer.flush()?;
        log::info!("Wrote {} statistic rows", matrix.len());
        Ok(())
    }
}

/// SQLite-backed sink.
///
/// Each call to `write_matrix` is stored as a new run, so several passes can
/// share one database.
#[derive(Debug)]
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens (or creates) a database file and ensures the schema exists.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, SinkError> {
        let conn = Connection::open(db_path)?;
        let sink = SqliteSink { conn };
        sink.ensure_schema()?;
        Ok(sink)
    }

    /// Creates an in-memory database. Useful for testing.
    pub fn new_in_memory() -> Result<Self, SinkError> {
        let conn = Connection::open_in_memory()?;
        let sink = SqliteSink { conn };
        sink.ensure_schema()?;
        Ok(sink)
    }

    fn ensure_schema(&self) -> Result<(), SinkError> {
        // value is nullable: SQLite stores NaN as NULL
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS graph_statistics (
                run_id INTEGER NOT NULL,
                row_index INTEGER NOT NULL,
                graph_time TEXT NOT NULL,
                statistic TEXT NOT NULL,
                value REAL,
                PRIMARY KEY (run_id, row_index, statistic)
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_graph_statistics_name
                ON graph_statistics(run_id, statistic)",
            [],
        )?;
        Ok(())
    }

    /// Identifier of the most recent run, if any.
    pub fn latest_run(&self) -> Result<Option<i64>, SinkError> {
        let run = self
            .conn
            .query_row("SELECT MAX(run_id) FROM graph_statistics", [], |row| {
                row.get::<_, Option<i64>>(0)
            })?;
        Ok(run)
    }

    /// Loads one statistic of one run, ordered by row.
    pub fn load_column(
        &self,
        run_id: i64,
        statistic: &str,
    ) -> Result<Vec<(DateTime<Utc>, f64)>, SinkError> {
        let mut stmt = self.conn.prepare(
            "SELECT graph_time, value FROM graph_statistics
             WHERE run_id = ?1 AND statistic = ?2
             ORDER BY row_index",
        )?;
        let rows = stmt.query_map(params![run_id, statistic], |row| {
            let time: DateTime<Utc> = row.get(0)?;
            let value: Option<f64> = row.get(1)?;
            Ok((time, value.unwrap_or(f64::NAN)))
        })?;

        let mut column = Vec::new();
        for row in rows {
            column.push(row?);
        }
        Ok(column)
    }
}

impl StatsSink for SqliteSink {
    fn write_matrix(&mut self, matrix: &StatMatrix) -> Result<(), SinkError> {
        let run_id = self.latest_run()?.map_or(1, |run| run + 1);

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO graph_statistics (run_id, row_index, graph_time, statistic, value)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (row_index, (time, row)) in matrix.times().iter().zip(matrix.rows()).enumerate() {
                for (statistic, value) in matrix.columns().iter().zip(row) {
                    stmt.execute(params![run_id, row_index as i64, time, statistic, value])?;
                }
            }
        }
        tx.commit()?;

        log::info!(
            "Stored run {} ({} rows x {} statistics)",
            run_id,
            matrix.len(),
            matrix.columns().len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::graph::{clique, compose, TagGraph};
    use crate::statistics::{EdgeCount, MeanDegree, StatisticsEngine};
    use chrono::TimeZone;

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 10, 29, 17, 0, 0).unwrap() + chrono::Duration::seconds(seconds)
    }

    fn sample_matrix() -> StatMatrix {
        let triangle = clique(&Event::new(0, t(0), vec!["A", "B", "C"]));
        let mut pair = compose(
            &clique(&Event::new(0, t(0), vec!["A", "B"])),
            &clique(&Event::new(1, t(10), vec!["C", "D"])),
        );
        pair.set_graph_time(t(10));
        let graphs: Vec<TagGraph> = vec![triangle, pair];

        StatisticsEngine::new()
            .with(MeanDegree)
            .with(EdgeCount)
            .compute(graphs)
            .unwrap()
    }

    #[test]
    fn test_text_sink_formats_two_decimals() {
        let mut sink = TextSink::from_writer(Vec::new());
        sink.write_matrix(&sample_matrix()).unwrap();
        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(text, "2.00 3.00\n1.00 2.00\n");
    }

    #[test]
    fn test_text_sink_empty_matrix_writes_nothing() {
        let mut sink = TextSink::from_writer(Vec::new());
        sink.write_matrix(&StatMatrix::new(vec!["mean_degree".to_string()]))
            .unwrap();
        assert!(sink.into_inner().unwrap().is_empty());
    }

    #[test]
    fn test_sqlite_sink_round_trip() {
        let mut sink = SqliteSink::new_in_memory().unwrap();
        assert_eq!(sink.latest_run().unwrap(), None);

        sink.write_matrix(&sample_matrix()).unwrap();
        assert_eq!(sink.latest_run().unwrap(), Some(1));

        let column = sink.load_column(1, "mean_degree").unwrap();
        assert_eq!(column, vec![(t(0), 2.0), (t(10), 1.0)]);
    }

    #[test]
    fn test_sqlite_sink_numbers_runs() {
        let mut sink = SqliteSink::new_in_memory().unwrap();
        sink.write_matrix(&sample_matrix()).unwrap();
        sink.write_matrix(&sample_matrix()).unwrap();
        assert_eq!(sink.latest_run().unwrap(), Some(2));
        assert_eq!(sink.load_column(2, "edge_count").unwrap().len(), 2);
        assert!(sink.load_column(3, "edge_count").unwrap().is_empty());
    }
}
