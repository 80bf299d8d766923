use thiserror::Error;

#[derive(Error, Debug)]
pub enum MappingError {
    /// `update_map` addressed a frame that was never installed with
    /// `set_map_root`.
    #[error("Unknown frame: {0}")]
    UnknownFrame(String),
}
