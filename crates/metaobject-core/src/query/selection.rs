// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Selection tree and its GraphQL rendering.
//!
//! Pushing a selection whose response key (alias or name) already exists, or
//! an inline fragment on a type that already has one, merges the children
//! instead of appending a duplicate. Rendering is deterministic: insertion
//! order, single spaces.

use std::fmt::{self, Write};

/// One entry of a selection set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// `alias: name(arg: value) { children }`
    Field {
        /// Response key override.
        alias:    Option<String>,
        /// Schema field name.
        name:     String,
        /// Arguments as `(name, rendered literal)`.
        args:     Vec<(String, String)>,
        /// Sub-selection; empty for leaves.
        children: SelectionSet
    },
    /// `... on Type { children }`
    InlineFragment {
        /// Type condition.
        on:       String,
        /// Sub-selection.
        children: SelectionSet
    }
}

impl Selection {
    /// Leaf field.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field {
            alias:    None,
            name:     name.into(),
            args:     Vec::new(),
            children: SelectionSet::new()
        }
    }

    /// Inline fragment on `on`.
    pub fn fragment(on: impl Into<String>, children: SelectionSet) -> Self {
        Self::InlineFragment {
            on: on.into(),
            children
        }
    }

    /// Set the alias of a field.
    #[must_use]
    pub fn alias(mut self, value: impl Into<String>) -> Self {
        if let Self::Field {
            alias, ..
        } = &mut self
        {
            *alias = Some(value.into());
        }
        self
    }

    /// Add an argument with an already rendered literal.
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, literal: impl Into<String>) -> Self {
        if let Self::Field {
            args, ..
        } = &mut self
        {
            args.push((name.into(), literal.into()));
        }
        self
    }

    /// Add a string argument, quoting it.
    #[must_use]
    pub fn string_arg(self, name: impl Into<String>, value: &str) -> Self {
        let literal = serde_json::Value::String(value.to_string()).to_string();
        self.arg(name, literal)
    }

    /// Set the sub-selection.
    #[must_use]
    pub fn with_children(mut self, set: SelectionSet) -> Self {
        match &mut self {
            Self::Field {
                children, ..
            }
            | Self::InlineFragment {
                children, ..
            } => *children = set
        }
        self
    }

    /// Key used for merging: response key for fields, `...Type` for fragments.
    pub fn merge_key(&self) -> String {
        match self {
            Self::Field {
                alias,
                name,
                ..
            } => alias.clone().unwrap_or_else(|| name.clone()),
            Self::InlineFragment {
                on, ..
            } => format!("...{on}")
        }
    }

    /// Sub-selection.
    pub fn children(&self) -> &SelectionSet {
        match self {
            Self::Field {
                children, ..
            }
            | Self::InlineFragment {
                children, ..
            } => children
        }
    }

    fn children_mut(&mut self) -> &mut SelectionSet {
        match self {
            Self::Field {
                children, ..
            }
            | Self::InlineFragment {
                children, ..
            } => children
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field {
                alias,
                name,
                args,
                children
            } => {
                if let Some(alias) = alias {
                    write!(f, "{alias}: ")?;
                }
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_char('(')?;
                    for (i, (arg, value)) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}: {value}")?;
                    }
                    f.write_char(')')?;
                }
                if !children.is_empty() {
                    write!(f, " {children}")?;
                }
                Ok(())
            }
            Self::InlineFragment {
                on,
                children
            } => write!(f, "... on {on} {children}")
        }
    }
}

/// Ordered, merge-on-insert set of selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    items: Vec<Selection>
}

impl SelectionSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set of leaf fields.
    pub fn leaves<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names.into_iter().map(Selection::field).collect()
    }

    /// Insert `selection`, merging with an entry of the same merge key.
    pub fn push(&mut self, selection: Selection) {
        let key = selection.merge_key();
        match self.items.iter_mut().find(|s| s.merge_key() == key) {
            Some(existing) => {
                let incoming = selection.children().clone();
                existing.children_mut().merge(incoming);
            }
            None => self.items.push(selection)
        }
    }

    /// Builder-style [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, selection: Selection) -> Self {
        self.push(selection);
        self
    }

    /// Merge every selection of `other` into `self`.
    pub fn merge(&mut self, other: SelectionSet) {
        for selection in other.items {
            self.push(selection);
        }
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of top-level selections.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Find a selection by merge key (`"genericObj"`, `"...File"`).
    pub fn get(&self, key: &str) -> Option<&Selection> {
        self.items.iter().find(|s| s.merge_key() == key)
    }

    /// Top-level selections.
    pub fn iter(&self) -> impl Iterator<Item = &Selection> {
        self.items.iter()
    }
}

impl FromIterator<Selection> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = Selection>>(iter: I) -> Self {
        let mut set = Self::new();
        for selection in iter {
            set.push(selection);
        }
        set
    }
}

impl fmt::Display for SelectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        for selection in &self.items {
            write!(f, " {selection}")?;
        }
        f.write_str(" }")
    }
}
