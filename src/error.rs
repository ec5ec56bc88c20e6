use thiserror::Error;

/// Failures while reading or validating a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("column id '{id}' is defined more than once")]
    DuplicateColumn { id: String },

    #[error("select column '{column}' has no options")]
    MissingOptions { column: String },

    #[error("row id '{row_id}' collides with a column id")]
    RowIdCollision { row_id: String },

    #[error("row id '{id}' appears more than once")]
    DuplicateRow { id: String },
}

/// A page size outside the fixed set of choices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid page size {0}: expected one of 10, 25, 50, 100, 500")]
pub struct InvalidPageSize(pub usize);
