use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Comment text is required")]
    EmptyText,

    #[error("Comment is too short: {length} characters, needs more than {min}")]
    TooShort { length: usize, min: usize },

    #[error("Comment is too long: {length} characters, needs fewer than {max}")]
    TooLong { length: usize, max: usize },
}

pub type ValidationResult<T> = Result<T, ValidationError>;
