//! Infrastructure layer for cxxmate
//!
//! Language server plumbing and workspace file discovery.

pub mod file_filter;
pub mod lsp;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash content for change detection when syncing documents
#[inline]
pub fn hash_content(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}
