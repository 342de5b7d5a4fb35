use tracing::debug;

use crate::TaxError;
use crate::models::{SectionCode, WithholdingSection};

/// Read-only lookup over the withholding sections of a rule set.
#[derive(Debug, Clone, Copy)]
pub struct SectionRegistry<'a> {
    sections: &'a [WithholdingSection],
}

impl<'a> SectionRegistry<'a> {
    pub fn new(sections: &'a [WithholdingSection]) -> Self {
        Self { sections }
    }

    /// Resolves a section code as entered by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidSection`] if the code is not recognised or
    /// the rule set has no entry for it.
    pub fn lookup(
        &self,
        code: &str,
    ) -> Result<&'a WithholdingSection, TaxError> {
        let parsed: SectionCode = code.parse()?;
        self.get(parsed).ok_or_else(|| {
            debug!(section = %parsed, "section missing from rule set");
            TaxError::InvalidSection(code.to_string())
        })
    }

    pub fn get(
        &self,
        code: SectionCode,
    ) -> Option<&'a WithholdingSection> {
        self.sections.iter().find(|section| section.code == code)
    }

    /// Sections in table order.
    pub fn sections(&self) -> impl Iterator<Item = &'a WithholdingSection> + 'a {
        self.sections.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::rules::RuleBook;

    #[test]
    fn lookup_finds_known_section() {
        let book = RuleBook::builtin();
        let registry = SectionRegistry::new(book.latest().sections());

        let section = registry.lookup("194J").unwrap();

        assert_eq!(section.code, SectionCode::S194J);
    }

    #[test]
    fn lookup_accepts_lowercase_code() {
        let book = RuleBook::builtin();
        let registry = SectionRegistry::new(book.latest().sections());

        let section = registry.lookup("194c").unwrap();

        assert_eq!(section.code, SectionCode::S194C);
    }

    #[test]
    fn lookup_rejects_unknown_code() {
        let book = RuleBook::builtin();
        let registry = SectionRegistry::new(book.latest().sections());

        let result = registry.lookup("195");

        assert_eq!(result, Err(TaxError::InvalidSection("195".to_string())));
    }

    #[test]
    fn lookup_rejects_code_missing_from_table() {
        let book = RuleBook::builtin();
        let sections: Vec<_> = book
            .latest()
            .sections()
            .iter()
            .filter(|s| s.code != SectionCode::S194Q)
            .cloned()
            .collect();
        let registry = SectionRegistry::new(&sections);

        let result = registry.lookup("194Q");

        assert_eq!(result, Err(TaxError::InvalidSection("194Q".to_string())));
    }

    #[test]
    fn sections_preserve_table_order() {
        let book = RuleBook::builtin();
        let registry = SectionRegistry::new(book.latest().sections());

        let codes: Vec<_> = registry.sections().map(|s| s.code).collect();

        assert_eq!(codes, SectionCode::ALL.to_vec());
    }
}
