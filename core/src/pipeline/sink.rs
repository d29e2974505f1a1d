// ## 📂 File: `src/pipeline/sink.rs`
// ## Error sink: collect, never halt

use crossbeam::channel::Receiver;
use tracing::warn;

use crate::pipeline::types::FileFailure;
use crate::telemetry::FailureRecord;

/// Drain diagnostics until every stage has dropped its sender.
pub fn run_error_sink(rx: Receiver<FileFailure>) -> Vec<FailureRecord> {
    let mut records = Vec::new();
    for failure in rx.iter() {
        warn!(
            file = %failure.rel_path,
            source = %failure.source.display(),
            stage = %failure.stage,
            error = %failure.error,
            "file failed"
        );
        records.push(failure.record());
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::report;
    use crate::telemetry::Stage;
    use crate::types::StreamError;
    use crossbeam::channel::bounded;

    #[test]
    fn collects_in_arrival_order_until_closed() {
        let (tx, rx) = bounded(4);
        let handle = std::thread::spawn(move || run_error_sink(rx));

        report(&tx, FileFailure::new(Stage::Discover, "a", "/src/a", StreamError::Envelope("magic".into())));
        report(&tx, FileFailure::new(Stage::Decrypt, "b", "/src/b", StreamError::Padding { value: 0 }));
        drop(tx);

        let records = handle.join().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].rel_path, "a");
        assert_eq!(records[1].stage, Stage::Decrypt);
    }
}
