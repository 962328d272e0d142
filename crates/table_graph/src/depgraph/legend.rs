//! Legend built from the dependency summary's `#dependencies` section.
use std::collections::HashMap;

use tracing::debug;

use crate::depgraph::DependencyKind;
use crate::error::{Error, Result};

/// Mapping from a single display character to the dependency kinds it stands
/// for, scoped to one parsed summary. Built fresh per parse; legends never
/// leak between files.
#[derive(Clone, Debug, Default)]
pub struct DependencyLegend {
    entries: HashMap<char, Vec<DependencyKind>>,
}

impl DependencyLegend {
    /// Records one legend line (`key : space-separated-kind-tokens`).
    ///
    /// A token outside the fixed vocabulary is a fatal error; the summary is
    /// from an unsupported compiler version and must not be half-parsed.
    /// Keys that are not a single character are ignored.
    pub fn insert(&mut self, key: &str, tokens: &str) -> Result<()> {
        let mut chars = key.chars();
        let label = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                debug!("ignoring legend key '{key}': not a single character");
                return Ok(());
            }
        };

        let mut kinds = Vec::new();
        for token in tokens.split_whitespace() {
            let kind = DependencyKind::from_token(token).ok_or_else(|| Error::UnknownDependency {
                token: token.to_owned(),
            })?;
            kinds.push(kind);
        }
        self.entries.insert(label, kinds);
        Ok(())
    }

    /// Looks up the kinds a matrix label stands for.
    pub fn resolve(&self, label: char) -> Option<&[DependencyKind]> {
        self.entries.get(&label).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_resolves_tokens_to_kinds() {
        let mut legend = DependencyLegend::default();
        legend
            .insert("A", "IXBAR_READ OUTPUT")
            .expect("known tokens");

        assert_eq!(
            legend.resolve('A'),
            Some([DependencyKind::IxbarRead, DependencyKind::Output].as_slice())
        );
        assert_eq!(legend.resolve('B'), None);
    }

    #[test]
    fn unknown_token_is_fatal() {
        let mut legend = DependencyLegend::default();
        let err = legend
            .insert("A", "IXBAR_READ NOT_A_KIND")
            .expect_err("unknown token must fail");
        assert!(matches!(err, Error::UnknownDependency { token } if token == "NOT_A_KIND"));
    }

    #[test]
    fn multi_character_keys_are_ignored() {
        let mut legend = DependencyLegend::default();
        legend.insert("AB", "OUTPUT").expect("ignored, not an error");
        assert!(legend.is_empty());
    }

    #[test]
    fn reinserting_a_key_overwrites_it() {
        let mut legend = DependencyLegend::default();
        legend.insert("A", "OUTPUT").unwrap();
        legend.insert("A", "ANTI_EXIT").unwrap();
        assert_eq!(
            legend.resolve('A'),
            Some([DependencyKind::AntiExit].as_slice())
        );
    }
}
