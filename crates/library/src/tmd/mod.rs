//! Title metadata (TMD) descriptors for DSiWare homebrew.
//!
//! A descriptor is a fixed 0x208 byte record. Most of it stays zeroed; the
//! title id, maker code and content record are lifted from the application
//! image it describes.

pub mod create;
pub mod fields;
pub mod types;

pub use create::{CreateError, DIGEST_CHUNK_SIZE, TmdBuilder, create, create_with};
pub use types::{ContentChunk, TMD_SIZE, TitleMetadata};
