//! Running the pipeline over many files at once.
//!
//! Files are independent: each worker builds its own [`Pipeline`] from the
//! shared configuration and takes the next unclaimed file until none are left.
//! A file that fails only affects its own [`FileOutcome`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use log::debug;

use crate::config::Transforms;
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::{Compiler, Printed};

/// One input of a batch.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_id: String,
    pub source: String,
}

impl SourceFile {
    pub fn new(file_id: impl Into<String>, source: impl Into<String>) -> Self {
        SourceFile {
            file_id: file_id.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file_id: String,
    pub result: Result<Printed>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

fn process(file: &SourceFile, pipeline: &mut Pipeline) -> Result<Printed> {
    Ok(Compiler::parse(&file.source, &file.file_id)?.transform(pipeline)?.print())
}

/// Transform `files` on up to `jobs` worker threads.
///
/// Outcomes are returned in input order. Fails only if the configuration
/// itself cannot produce a pipeline, before any file is touched.
pub fn run_batch(files: &[SourceFile], transforms: &Transforms, jobs: usize) -> Result<Vec<FileOutcome>> {
    // Surface configuration errors once instead of once per file
    Pipeline::from_transforms(transforms)?;

    let workers = jobs.clamp(1, files.len().max(1));
    let next = AtomicUsize::new(0);
    debug!("transforming {} file(s) on {} worker(s)", files.len(), workers);

    let mut indexed: Vec<(usize, FileOutcome)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(|| -> Result<Vec<(usize, FileOutcome)>> {
                    let mut pipeline = Pipeline::from_transforms(transforms)?;
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(file) = files.get(index) else {
                            break;
                        };
                        debug!("processing {}", file.file_id);
                        let outcome = FileOutcome {
                            file_id: file.file_id.clone(),
                            result: process(file, &mut pipeline),
                        };
                        done.push((index, outcome));
                    }
                    Ok(done)
                })
            })
            .collect();

        let mut indexed = Vec::with_capacity(files.len());
        for handle in handles {
            match handle.join() {
                Ok(done) => indexed.extend(done?),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        Ok::<_, crate::error::CompilerError>(indexed)
    })?;

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, outcome)| outcome).collect())
}
