//! Concurrency stress helpers.
//!
//! Writers submit change sets of a fixed size into an initially empty
//! store while readers sample it. Since every change set adds exactly
//! `batch_size` records, any reader that sees a count that is not a
//! multiple of `batch_size` has observed a partially applied change set.

use crate::fixtures::User;
use mobiledb_core::{ChangeSet, JsonStore};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress run.
#[derive(Debug, Clone)]
pub struct StressReport {
    /// Read operations performed.
    pub reads: usize,
    /// Change sets saved.
    pub writes: usize,
    /// Operations that returned an error.
    pub failed: usize,
    /// Reads that observed part of a change set.
    pub torn_reads: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressReport {
    /// Returns `true` if nothing failed and no read was torn.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.torn_reads == 0
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {name} ===");
        println!("Reads: {}", self.reads);
        println!("Writes: {}", self.writes);
        println!("Failed: {}", self.failed);
        println!("Torn reads: {}", self.torn_reads);
        println!("Duration: {:?}", self.duration);
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of reader threads.
    pub readers: usize,
    /// Number of writer threads.
    pub writers: usize,
    /// Change sets submitted per writer.
    pub writes_per_writer: usize,
    /// Records added per change set.
    pub batch_size: usize,
    /// Whether a separate thread keeps releasing the store.
    pub release_concurrently: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            readers: 4,
            writers: 2,
            writes_per_writer: 50,
            batch_size: 3,
            release_concurrently: false,
        }
    }
}

impl StressConfig {
    /// Records expected in the store once the run completes.
    #[must_use]
    pub fn expected_records(&self) -> usize {
        self.writers * self.writes_per_writer * self.batch_size
    }
}

/// Runs readers and writers against `store`, which must start empty.
pub fn stress_readers_and_writers(store: Arc<JsonStore<User>>, config: &StressConfig) -> StressReport {
    let batch = config.batch_size.max(1);
    let done = Arc::new(AtomicBool::new(false));
    let reads = Arc::new(AtomicUsize::new(0));
    let writes = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let torn = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();

    let readers: Vec<_> = (0..config.readers)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            let reads = Arc::clone(&reads);
            let failed = Arc::clone(&failed);
            let torn = Arc::clone(&torn);
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    match store.as_queryable::<User>() {
                        Ok(view) => {
                            if view.len() % batch != 0 {
                                torn.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    reads.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    let releaser = config.release_concurrently.then(|| {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                store.release();
                thread::yield_now();
            }
        })
    });

    let writers: Vec<_> = (0..config.writers)
        .map(|w| {
            let store = Arc::clone(&store);
            let writes = Arc::clone(&writes);
            let failed = Arc::clone(&failed);
            let per_writer = config.writes_per_writer;
            thread::spawn(move || {
                for i in 0..per_writer {
                    let changes = (0..batch).fold(ChangeSet::new(), |set, b| {
                        set.add(User::new(format!("w{w}-{i:04}-{b}"), "stress"))
                    });
                    match store.save_changes(changes) {
                        Ok(_) => writes.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().expect("Writer thread panicked");
    }
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().expect("Reader thread panicked");
    }
    if let Some(releaser) = releaser {
        releaser.join().expect("Releaser thread panicked");
    }

    StressReport {
        reads: reads.load(Ordering::Relaxed),
        writes: writes.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        torn_reads: torn.load(Ordering::Relaxed),
        duration: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestStore;

    #[test]
    fn small_run_is_clean() {
        let fixture: TestStore<User> = TestStore::memory();
        let config = StressConfig {
            readers: 2,
            writers: 2,
            writes_per_writer: 10,
            batch_size: 2,
            release_concurrently: false,
        };

        let report = stress_readers_and_writers(Arc::clone(&fixture.store), &config);

        assert!(report.is_clean(), "{report:?}");
        assert_eq!(report.writes, 20);
        assert_eq!(fixture.count().unwrap(), config.expected_records());
    }
}
