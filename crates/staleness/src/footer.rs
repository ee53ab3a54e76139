use crate::hash::Digest;
use serde::{Deserialize, Serialize};

/// Opening line of the footer block
pub const FOOTER_BEGIN: &str = "<!-- scribe:footer";

/// Closing line of the footer block
pub const FOOTER_END: &str = "-->";

/// Trailing metadata block of a generated design document
///
/// Field order is fixed; `interface_hash` is omitted entirely for files
/// whose language has no analyzer. The generation collaborator never
/// writes this block — only the pipeline does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocFooter {
    /// Project-relative source path
    pub source: String,

    /// Content hash of the source file at generation time
    pub source_hash: Digest,

    /// Interface hash of the source file, when the language has an analyzer
    pub interface_hash: Option<Digest>,

    /// Hash of the document body this footer was written against
    pub design_hash: Digest,

    /// Generation timestamp, local time, no timezone suffix
    pub generated: String,

    /// Identifier of the producing version
    pub generator: String,
}

impl DocFooter {
    /// Render the footer block, fixed field order
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(FOOTER_BEGIN);
        out.push('\n');
        out.push_str(&format!("source: {}\n", self.source));
        out.push_str(&format!("source_hash: {}\n", self.source_hash));
        if let Some(interface_hash) = &self.interface_hash {
            out.push_str(&format!("interface_hash: {interface_hash}\n"));
        }
        out.push_str(&format!("design_hash: {}\n", self.design_hash));
        out.push_str(&format!("generated: {}\n", self.generated));
        out.push_str(&format!("generator: {}\n", self.generator));
        out.push_str(FOOTER_END);
        out.push('\n');
        out
    }
}

/// Split a document into body text and parsed footer
///
/// The body is everything before the last footer marker (present or not,
/// parsable or not). A structurally malformed block parses as "no footer";
/// the distinction never matters to classification, which treats both as a
/// hand-edited document.
pub fn split_footer(document: &str) -> (&str, Option<DocFooter>) {
    let Some(marker) = document.rfind(FOOTER_BEGIN) else {
        return (document, None);
    };

    let body = &document[..marker];
    let block = &document[marker..];
    (body, parse_block(block))
}

fn parse_block(block: &str) -> Option<DocFooter> {
    let mut lines = block.lines();
    if lines.next()?.trim() != FOOTER_BEGIN {
        return None;
    }

    let mut fields = Vec::new();
    let mut closed = false;
    for line in lines {
        let line = line.trim();
        if line == FOOTER_END {
            closed = true;
            break;
        }
        let (key, value) = line.split_once(':')?;
        fields.push((key.trim().to_string(), value.trim().to_string()));
    }
    if !closed {
        return None;
    }

    // Fixed field order, interface_hash optional.
    let mut fields = fields.into_iter();
    let mut next = fields.next()?;
    if next.0 != "source" {
        return None;
    }
    let source = next.1;

    next = fields.next()?;
    if next.0 != "source_hash" {
        return None;
    }
    let source_hash = Digest::from_hex(next.1);

    next = fields.next()?;
    let interface_hash = if next.0 == "interface_hash" {
        let digest = Digest::from_hex(next.1);
        next = fields.next()?;
        Some(digest)
    } else {
        None
    };

    if next.0 != "design_hash" {
        return None;
    }
    let design_hash = Digest::from_hex(next.1);

    next = fields.next()?;
    if next.0 != "generated" {
        return None;
    }
    let generated = next.1;

    next = fields.next()?;
    if next.0 != "generator" {
        return None;
    }
    let generator = next.1;

    if fields.next().is_some() {
        return None;
    }

    Some(DocFooter {
        source,
        source_hash,
        interface_hash,
        design_hash,
        generated,
        generator,
    })
}
