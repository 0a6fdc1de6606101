use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// Both indexes carry a word count for the same document and the counts disagree,
    /// meaning the document was indexed by more than one producer.
    #[error("document {path} already indexed with {existing} words, merge carries {incoming}")]
    DocumentConflict { path: String, existing: usize, incoming: usize },
}
