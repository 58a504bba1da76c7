//! Document code generation seam.
//!
//! The numbering scheme belongs to the host application; the core only asks
//! for the next code when a document is created or changes kind.

use crate::model::document::DocumentKind;

/// Produces document codes such as `INV-0042`.
pub trait DocumentCodeGenerator {
    fn next_code(&mut self, kind: DocumentKind) -> String;
}

/// Per-kind counter producing `<PREFIX>-<NNNN>` codes.
#[derive(Debug, Clone)]
pub struct SequentialCodeGenerator {
    next_invoice: u32,
    next_quote: u32,
}

impl SequentialCodeGenerator {
    pub fn new() -> Self {
        Self::starting_at(1, 1)
    }

    /// Resumes numbering after previously issued codes.
    pub fn starting_at(next_invoice: u32, next_quote: u32) -> Self {
        Self {
            next_invoice,
            next_quote,
        }
    }
}

impl Default for SequentialCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCodeGenerator for SequentialCodeGenerator {
    fn next_code(&mut self, kind: DocumentKind) -> String {
        let counter = match kind {
            DocumentKind::Invoice => &mut self.next_invoice,
            DocumentKind::Quote => &mut self.next_quote,
        };
        let value = *counter;
        *counter = counter.saturating_add(1);
        format!("{}-{value:04}", kind.code_prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentCodeGenerator, SequentialCodeGenerator};
    use crate::model::document::DocumentKind;

    #[test]
    fn counters_are_independent_per_kind() {
        let mut codes = SequentialCodeGenerator::new();
        assert_eq!(codes.next_code(DocumentKind::Invoice), "INV-0001");
        assert_eq!(codes.next_code(DocumentKind::Invoice), "INV-0002");
        assert_eq!(codes.next_code(DocumentKind::Quote), "QUO-0001");
    }

    #[test]
    fn starting_at_resumes_numbering() {
        let mut codes = SequentialCodeGenerator::starting_at(120, 7);
        assert_eq!(codes.next_code(DocumentKind::Invoice), "INV-0120");
        assert_eq!(codes.next_code(DocumentKind::Quote), "QUO-0007");
    }
}
