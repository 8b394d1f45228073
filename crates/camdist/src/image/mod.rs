//! Binary image matching and patching.

mod matcher;
mod patcher;

pub use matcher::WildcardMatcher;
pub use patcher::*;
