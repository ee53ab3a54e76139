//! # Scribe Staleness
//!
//! The three-hash fingerprinting scheme and the change classifier built on
//! it. Everything here is pure: bytes in, digests and decisions out.
//!
//! - **Content hash** — SHA-256 over raw source bytes, always computable.
//! - **Interface hash** — SHA-256 over the canonical interface encoding;
//!   absent for languages without an analyzer.
//! - **Design-body hash** — SHA-256 over a document's body with the footer
//!   stripped, so footer-only rewrites never change it.
//!
//! The classifier maps (stored footer, fresh hashes) to one of six change
//! levels with hand-edit detection taking precedence over every
//! source-side comparison.

mod classify;
mod footer;
mod hash;

pub use classify::{classify, ChangeLevel, DocSnapshot, SourceFingerprint};
pub use footer::{split_footer, DocFooter, FOOTER_BEGIN, FOOTER_END};
pub use hash::{content_digest, design_body_digest, interface_digest, Digest};
