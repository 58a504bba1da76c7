//! Footer visibility resolver.

use crate::model::document::DocumentKind;
use crate::model::footer::FooterBlock;

/// Returns the blocks that render on a document of `kind`, in input order.
///
/// `blocks` may be a slice, a `Vec`, `Some(&block)` or
/// `std::iter::once(&block)`; one block and many are handled the same way.
/// Disabled blocks are always dropped.
pub fn select_visible_footer<'a, I>(kind: DocumentKind, blocks: I) -> Vec<&'a FooterBlock>
where
    I: IntoIterator<Item = &'a FooterBlock>,
{
    blocks
        .into_iter()
        .filter(|block| block.is_visible_for(kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::select_visible_footer;
    use crate::model::document::DocumentKind;
    use crate::model::footer::FooterBlock;

    #[test]
    fn accepts_a_single_block() {
        let block = FooterBlock::new("terms", "Terms", "Net 30").with_visibility(true, false);

        assert_eq!(
            select_visible_footer(DocumentKind::Invoice, Some(&block)),
            vec![&block]
        );
        assert!(select_visible_footer(DocumentKind::Quote, std::iter::once(&block)).is_empty());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let blocks: Vec<FooterBlock> = Vec::new();
        assert!(select_visible_footer(DocumentKind::Invoice, &blocks).is_empty());
    }
}
