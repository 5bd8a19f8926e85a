use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid version date {input:?}: {source}")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}
