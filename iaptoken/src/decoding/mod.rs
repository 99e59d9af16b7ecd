//! Compact serialization parsing
mod decode;
mod split;

pub use decode::SignedToken;
pub use split::SplitToken;
