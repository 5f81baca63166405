// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.


//! Typed identifiers.
//!
//! Every aggregate gets its own id type (`IssueId`, `PhotoId`, ...) so a photo id can never be
//! passed where an issue id is expected. Values are opaque strings, cheap to clone, and must be
//! usable as one segment of a blob key such as `projects/<project>/issues/<issue>/...`.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use smol_str::SmolStr;

/// Marker for the kind of entity an [`Id`] names.
pub trait IdKind {
    /// Human label used in validation messages, e.g. `"issue id"`.
    const LABEL: &'static str;
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<K> {
    value: SmolStr,
    _kind: PhantomData<fn() -> K>,
}

impl<K: IdKind> Id<K> {
    /// Accepts any non-blank value without `/`.
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdError> {
        let value = value.as_ref();
        if value.trim().is_empty() {
            return Err(IdError::Empty { kind: K::LABEL });
        }
        if value.contains('/') {
            return Err(IdError::ContainsSlash { kind: K::LABEL });
        }
        Ok(Self::from_valid(SmolStr::new(value)))
    }

    /// Mints a fresh UUIDv4 id.
    pub fn generate() -> Self {
        Self::from_valid(SmolStr::new(uuid::Uuid::new_v4().to_string()))
    }
}

impl<K> Id<K> {
    fn from_valid(value: SmolStr) -> Self {
        Self {
            value,
            _kind: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<K: IdKind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", K::LABEL, self.value.as_str())
    }
}

impl<K> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K> AsRef<str> for Id<K> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<K> Borrow<str> for Id<K> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<K: IdKind> FromStr for Id<K> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<K: IdKind> TryFrom<String> for Id<K> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
    #[error("{kind} must not contain '/'")]
    ContainsSlash { kind: &'static str },
}

macro_rules! id_kinds {
    ($($kind:ident => $alias:ident, $label:literal;)+) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub enum $kind {}

            impl IdKind for $kind {
                const LABEL: &'static str = $label;
            }

            pub type $alias = Id<$kind>;
        )+
    };
}

id_kinds! {
    ProjectKind => ProjectId, "project id";
    BuildingKind => BuildingId, "building id";
    FloorKind => FloorId, "floor id";
    IssueKind => IssueId, "issue id";
    PhotoKind => PhotoId, "photo id";
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{FloorId, IdError, IssueId, PhotoId};

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_ids_are_rejected_with_their_kind(#[case] raw: &str) {
        assert_eq!(IssueId::new(raw), Err(IdError::Empty { kind: "issue id" }));
        assert_eq!(
            FloorId::new(raw).map_err(|err| err.to_string()),
            Err("floor id must not be empty".to_owned())
        );
    }

    #[test]
    fn ids_cannot_contain_path_separators() {
        assert_eq!(
            PhotoId::new("a/b"),
            Err(IdError::ContainsSlash { kind: "photo id" })
        );
        assert!(PhotoId::new("ph-1.jpg").is_ok());
    }

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = IssueId::generate();
        let b = IssueId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().parse::<IssueId>().expect("reparse"), a);
        assert_eq!(format!("{a:?}"), format!("issue id({:?})", a.as_str()));
    }
}
