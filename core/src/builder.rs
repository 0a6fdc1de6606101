use crate::index::InvertedIndex;
use crate::scheduler::WorkQueue;
use crate::shared::SharedIndex;
use crate::tokenizer::tokenize;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

const TEXT_EXTENSIONS: &[&str] = &["txt", "text"];

pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Every text file under `root` (or `root` itself when it is one), in file-name order.
/// Unreadable directory entries are logged and skipped.
pub fn text_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("input path {} does not exist", root.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_text_file(entry.path()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "skipping unreadable entry"),
        }
    }
    Ok(files)
}

/// Add every term of a text stream to `index` under `location`. Positions start at 1 and
/// keep counting across lines. Returns the number of terms read.
pub fn index_lines<R: BufRead>(reader: R, location: &str, index: &mut InvertedIndex) -> Result<usize> {
    let mut position = 0;
    for line in reader.lines() {
        let line = line?;
        for term in tokenize(&line) {
            position += 1;
            index.add(&term, location, position);
        }
    }
    Ok(position)
}

pub fn index_text(text: &str, location: &str, index: &mut InvertedIndex) -> usize {
    let mut position = 0;
    for term in tokenize(text) {
        position += 1;
        index.add(&term, location, position);
    }
    position
}

pub fn index_file(path: &Path, index: &mut InvertedIndex) -> Result<usize> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let location = path.display().to_string();
    index_lines(BufReader::new(f), &location, index).with_context(|| format!("reading {}", path.display()))
}

/// A private index holding just this file, ready to merge.
pub fn local_index(path: &Path) -> Result<InvertedIndex> {
    let mut local = InvertedIndex::new();
    index_file(path, &mut local)?;
    Ok(local)
}

/// Index every text file under `root` on the calling thread. Each file is read into its
/// own index and merged only once fully read, so a file that fails to open or read
/// leaves nothing behind; it is logged and skipped. Returns the number of files indexed.
pub fn build(root: &Path, index: &mut InvertedIndex) -> Result<usize> {
    let mut indexed = 0;
    for file in text_files(root)? {
        let merged = local_index(&file)
            .and_then(|local| index.merge(local).with_context(|| format!("merging {}", file.display())));
        match merged {
            Ok(()) => indexed += 1,
            Err(err) => tracing::warn!(path = %file.display(), error = %format!("{err:#}"), "skipping file"),
        }
    }
    tracing::info!(files = indexed, terms = index.len(), "index build complete");
    Ok(indexed)
}

/// Walk `root` on the calling thread and hand each file to the queue. Each task builds a
/// local index and merges it, so the write lock is held only for merges.
pub fn build_concurrent(root: &Path, index: &Arc<SharedIndex>, queue: &WorkQueue) -> Result<usize> {
    let files = text_files(root)?;
    let submitted = files.len();
    for file in files {
        let index = Arc::clone(index);
        queue.submit(move || {
            let local = local_index(&file)?;
            index.merge(local).with_context(|| format!("merging {}", file.display()))?;
            tracing::debug!(path = %file.display(), "indexed");
            Ok(())
        });
    }
    queue.finish();
    tracing::info!(files = submitted, terms = index.len(), "concurrent index build complete");
    Ok(submitted)
}
