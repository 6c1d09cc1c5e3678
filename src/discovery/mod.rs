//! Compliance link discovery: link types, keyword classifier, and the
//! main page / footer / menu cascade built on them.

pub mod cascade;
pub mod classifier;
pub mod link;

pub use cascade::{CascadeOutcome, CascadeStage, LinkCascade};
pub use classifier::{classify, is_secondary_page_link, keywords_for, matches_kind};
pub use link::{ComplianceLinkSet, DocumentKind, Link};
