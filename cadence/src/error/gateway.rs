use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("executing command {name:?} failed: {source}")]
    CommandExecute {
        name: Box<str>,
        source: super::command::Error,
    },
    #[error("executing autocomplete for {name:?} failed: {source}")]
    AutocompleteExecute {
        name: Box<str>,
        source: super::command::AutocompleteError,
    },
    #[error(transparent)]
    TwilightHttp(#[from] twilight_http::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Command(#[from] super::command::Error),
}

pub type ProcessResult = Result<(), ProcessError>;
