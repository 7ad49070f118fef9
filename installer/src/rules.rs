//! Rule table mapping sub-package names to destination directories.
//!
//! A rule routes every nested archive whose base name equals the rule name
//! (exact, case-sensitive comparison) into the rule's destination directory.
//! The table keeps the order in which rules were added so listings and the
//! saved configuration match what the user wrote.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

/// A single routing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// Sub-package base name, without the archive extension.
    pub name: String,
    /// Directory the sub-package contents are merged into.
    pub destination: Utf8PathBuf,
}

/// Ordered mapping from sub-package name to destination directory.
///
/// # Examples
///
/// ```
/// use navdrop_installer::rules::RuleTable;
///
/// let mut rules = RuleTable::new();
/// rules.insert("NavDataXP12", "/games/xp12/Custom Data");
/// assert!(rules.contains("NavDataXP12"));
/// assert!(!rules.contains("navdataxp12"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Create an empty rule table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, or replace the destination of an existing one in place.
    ///
    /// Returns the previous destination when the name was already present.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        destination: impl Into<Utf8PathBuf>,
    ) -> Option<Utf8PathBuf> {
        let name = name.into();
        let destination = destination.into();
        if let Some(existing) = self.rules.iter_mut().find(|rule| rule.name == name) {
            return Some(std::mem::replace(&mut existing.destination, destination));
        }
        self.rules.push(Rule { name, destination });
        None
    }

    /// Remove a rule by name, returning its destination.
    pub fn remove(&mut self, name: &str) -> Option<Utf8PathBuf> {
        let index = self.rules.iter().position(|rule| rule.name == name)?;
        Some(self.rules.remove(index).destination)
    }

    /// Destination configured for `name`, if any.
    #[must_use]
    pub fn destination(&self, name: &str) -> Option<&Utf8Path> {
        self.rules
            .iter()
            .find(|rule| rule.name == name)
            .map(|rule| rule.destination.as_path())
    }

    /// Returns true when a rule named exactly `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.destination(name).is_some()
    }

    /// Iterate rules in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<N, D> FromIterator<(N, D)> for RuleTable
where
    N: Into<String>,
    D: Into<Utf8PathBuf>,
{
    fn from_iter<I: IntoIterator<Item = (N, D)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, destination) in iter {
            table.insert(name, destination);
        }
        table
    }
}
