use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record")]
    Duplicate,
}

impl DatabaseError {
    /// Maps unique-constraint violations onto `Duplicate` so the HTTP layer
    /// can answer 409 instead of 500.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DatabaseError::Duplicate;
            }
        }
        DatabaseError::Sqlx(err)
    }
}
