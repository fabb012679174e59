use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Track not found: {0}")]
    NotFound(u64),

    /// Every id up to `u64::MAX` has been handed out.
    #[error("No track ids left to assign")]
    IdsExhausted,
}
