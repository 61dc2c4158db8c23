//! Translator registry and vendor rotation
//!
//! An insertion-ordered collection of [`Translator`]s keyed by vendor name.
//! Registration order is meaningful: it is the rotation sequence
//! [`next_translator`](TranslatorRegistry::next_translator) walks when the
//! user asks for "the next vendor" for a language pair. The registry is a
//! plain value owned by the consumer; there is no global vendor table.

use crate::storage::StorageAdapter;
use crate::vendors::bing::Bing;
use crate::vendors::google::Google;
use crate::vendors::translator::Translator;

/// Insertion-ordered collection of vendors behind the common interface
#[derive(Default)]
pub struct TranslatorRegistry {
    entries: Vec<Translator>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in web vendors, in default rotation order.
    ///
    /// `auth_storage` backs the vendors' cached auth parameters (Bing's
    /// scraped token set).
    pub fn with_default_vendors(auth_storage: impl StorageAdapter + 'static) -> Self {
        let mut registry = Self::new();
        registry.register(Translator::new(Google::new()));
        registry.register(Translator::new(Bing::new(auth_storage)));
        registry
    }

    /// Add a translator; a vendor with the same name is replaced in place,
    /// keeping its rotation position
    pub fn register(&mut self, translator: Translator) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.name() == translator.name())
        {
            Some(slot) => *slot = translator,
            None => self.entries.push(translator),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Translator> {
        self.entries.iter().find(|t| t.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Translator> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First vendor after `current` (wrapping around) that can translate the
    /// pair, or `None` when no vendor qualifies.
    ///
    /// With `reverse`, the scan runs backwards: the vendors before `current`
    /// in reverse order, then the ones after it in reverse order. An unknown
    /// `current` scans the whole registry in registration order.
    pub fn next_translator(
        &self,
        current: &str,
        from: &str,
        to: &str,
        reverse: bool,
    ) -> Option<&Translator> {
        let index = self.entries.iter().position(|t| t.name() == current);

        let candidates: Vec<&Translator> = match index {
            Some(index) => {
                let before = &self.entries[..index];
                let after = &self.entries[index + 1..];
                if reverse {
                    before.iter().rev().chain(after.iter().rev()).collect()
                } else {
                    after.iter().chain(before.iter()).collect()
                }
            }
            None => self.entries.iter().collect(),
        };

        candidates
            .into_iter()
            .find(|t| t.can_translate(from, to))
    }
}
