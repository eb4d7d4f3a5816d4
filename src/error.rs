use std::path::PathBuf;

use thiserror::Error;

use crate::layout::LayoutError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("syntax error on line {line}: unexpected `{context}`")]
    Syntax { line: usize, context: String },

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("graph too wide for {0} columns")]
    TooWide(usize),

    #[error("failed to serialize figure: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
