/// Errors surfaced while reading or writing a persisted template catalog (`SPEC_FULL.md` §4.5).
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("corrupt template stream: {0}")]
    CorruptStream(String),
}
