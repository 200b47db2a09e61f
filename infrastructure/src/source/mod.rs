//! Configuration artifact sources

mod file_source;
mod locations;
mod parse;

pub use file_source::FileConfigSource;
pub use locations::LocationCandidates;
pub use parse::{ArtifactFormat, SourceError, parse_artifact, parse_properties, read_artifact};
pub(crate) use parse::split_key;
