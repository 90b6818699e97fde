use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PianoError {
    #[error("unknown melody: {0}")]
    UnknownMelody(String),

    #[error("no key region for note: {0}")]
    UnknownNote(String),

    #[error("hand needs {expected} landmarks, got {found}")]
    LandmarkCount { expected: usize, found: usize },
}

pub type PianoResult<T> = Result<T, PianoError>;
