use thiserror::Error;

pub type ParseResult<T> = core::result::Result<T, ParseError>;

/// Failures that make a single page unusable.
///
/// Missing rows and unparseable numbers never end up here; they degrade to
/// empty or zero values inside the record instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Page is missing a required element: {0}")]
    MissingElement(&'static str),

    #[error("Invalid selector: {0}")]
    Selector(String),
}
