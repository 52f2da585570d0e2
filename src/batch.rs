//! Batch resizing.
//!
//! Resizes many files with the same [`Options`], in parallel on the global
//! rayon pool. Directory inputs are walked recursively for files with a
//! supported image extension; explicit file inputs are always taken as-is.
//!
//! ## Output Naming
//!
//! ```text
//! photos/2021/beach.png   →  out/beach.jpg
//! photos/cat.webp         →  out/cat.jpg
//! ```
//!
//! The stem is kept and the extension follows the output [`Format`]. Output
//! paths are fixed before any work starts ([`plan_outputs`]): an output that
//! would replace one of the inputs is refused, and when several inputs share
//! a stem only the first one in input order is written.
//!
//! ## Failure Handling
//!
//! A file that fails to read, decode or encode does not stop the batch. It is
//! reported as [`BatchEvent::Failed`] and counted in the [`BatchSummary`].
//! Only problems that affect the whole run (unreadable input directory,
//! uncreatable output directory) abort with an error.

use crate::imaging::{ProcessResult, RasterBackend, ResizeError, RustBackend};
use crate::imaging::{resize_with_backend, supported_input_extensions};
use crate::options::{Format, Options};
use rayon::prelude::*;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{}: {}", .path.display(), .source)]
    Resize {
        path: PathBuf,
        #[source]
        source: ResizeError,
    },
    #[error("output {} would overwrite input {}", .output.display(), .input.display())]
    OverwritesInput { output: PathBuf, input: PathBuf },
    #[error("output {} is already written for {}", .output.display(), .input.display())]
    DuplicateOutput { output: PathBuf, input: PathBuf },
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// Sent once before any work starts.
    Started { total: usize },
    /// One file written. `index` is the 1-based position in the input list.
    Resized {
        index: usize,
        source: PathBuf,
        output: PathBuf,
        width: u32,
        height: u32,
        bytes: usize,
    },
    Failed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

/// Outcome of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub resized: usize,
    /// Failed inputs with their error message, in input order.
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.resized + self.failed.len()
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| supported_input_extensions().contains(&e.as_str()))
}

/// Expand the command-line inputs into the list of files to process.
///
/// Directories are walked recursively in file-name order. A path that does
/// not exist is an error.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.map_err(std::io::Error::from)?;
                if entry.file_type().is_file() && has_supported_extension(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if input.exists() {
            files.push(input.clone());
        } else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input not found: {}", input.display()),
            )
            .into());
        }
    }
    Ok(files)
}

/// `<dir>/<input stem>.<format extension>`.
pub fn output_path_for(input: &Path, dir: &Path, format: Format) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    dir.join(format!("{}.{}", stem, format.extension()))
}

/// `path` with `.`, `..` and symlinks resolved.
///
/// A path that does not exist yet is resolved through its parent directory.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            fs::canonicalize(parent)
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Whether `a` and `b` name the same file, however they are spelled.
pub fn same_file(a: &Path, b: &Path) -> bool {
    a == b || resolve(a) == resolve(b)
}

/// Output path for every input, in input order.
///
/// An output that resolves to any input file is refused with
/// [`BatchError::OverwritesInput`]. When several inputs map to the same
/// output the first keeps it and the rest get [`BatchError::DuplicateOutput`].
/// `dir` should already exist so outputs resolve like the inputs do.
pub fn plan_outputs(
    inputs: &[PathBuf],
    dir: &Path,
    format: Format,
) -> Vec<Result<PathBuf, BatchError>> {
    let sources: HashMap<PathBuf, usize> = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| (resolve(input), i))
        .collect();
    let mut claimed: HashMap<PathBuf, usize> = HashMap::new();

    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let output = output_path_for(input, dir, format);
            let key = resolve(&output);
            if let Some(&j) = sources.get(&key) {
                return Err(BatchError::OverwritesInput {
                    output,
                    input: inputs[j].clone(),
                });
            }
            match claimed.entry(key) {
                Entry::Occupied(first) => Err(BatchError::DuplicateOutput {
                    output,
                    input: inputs[*first.get()].clone(),
                }),
                Entry::Vacant(slot) => {
                    slot.insert(i);
                    Ok(output)
                }
            }
        })
        .collect()
}

/// Read `input`, resize it, and write the encoded result to `output`.
pub fn resize_file(
    backend: &impl RasterBackend,
    input: &Path,
    output: &Path,
    options: &Options,
) -> Result<ProcessResult, BatchError> {
    let data = fs::read(input)?;
    let result = resize_with_backend(backend, &data, options).map_err(|source| {
        BatchError::Resize {
            path: input.to_path_buf(),
            source,
        }
    })?;
    fs::write(output, &result.data)?;
    Ok(result)
}

/// Resize every file in `inputs` into `out_dir` with the `image` backend.
pub fn run_batch(
    inputs: &[PathBuf],
    out_dir: &Path,
    options: &Options,
    progress: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    let backend = RustBackend::new();
    run_batch_with_backend(&backend, inputs, out_dir, options, progress)
}

/// Resize every file in `inputs` using a specific backend (allows testing with mock).
///
/// `inputs` are files, already expanded by [`collect_inputs`].
pub fn run_batch_with_backend(
    backend: &impl RasterBackend,
    inputs: &[PathBuf],
    out_dir: &Path,
    options: &Options,
    progress: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    fs::create_dir_all(out_dir)?;

    let send = |event: BatchEvent| {
        if let Some(tx) = &progress {
            // Receiver gone means nobody is listening; keep working
            let _ = tx.send(event);
        }
    };
    send(BatchEvent::Started {
        total: inputs.len(),
    });

    let outputs = plan_outputs(inputs, out_dir, options.format);

    let outcomes: Vec<Result<(), String>> = inputs
        .par_iter()
        .zip(outputs.into_par_iter())
        .enumerate()
        .map(|(i, (input, planned))| {
            let resized = planned.and_then(|output| {
                resize_file(backend, input, &output, options).map(|result| (output, result))
            });
            match resized {
                Ok((output, result)) => {
                    log::debug!("{} -> {}", input.display(), output.display());
                    send(BatchEvent::Resized {
                        index: i + 1,
                        source: input.clone(),
                        output,
                        width: result.width,
                        height: result.height,
                        bytes: result.data.len(),
                    });
                    Ok(())
                }
                Err(e) => {
                    log::warn!("{}: {}", input.display(), e);
                    let error = e.to_string();
                    send(BatchEvent::Failed {
                        index: i + 1,
                        source: input.clone(),
                        error: error.clone(),
                    });
                    Err(error)
                }
            }
        })
        .collect();

    let mut summary = BatchSummary::default();
    for (input, outcome) in inputs.iter().zip(outcomes) {
        match outcome {
            Ok(()) => summary.resized += 1,
            Err(error) => summary.failed.push((input.clone(), error)),
        }
    }
    Ok(summary)
}
