use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrieError {
    #[error("key not found {0}")]
    KeyNotFound(String),
}
