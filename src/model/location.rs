// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::ModelError;

/// A free-floating point in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPosition {
    x: f64,
    y: f64,
    z: f64,
}

impl WorldPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, ModelError> {
        for (axis, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() {
                return Err(ModelError::NonFiniteCoordinate { axis });
            }
        }
        Ok(Self { x, y, z })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }
}

/// Where an issue is anchored. Fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// A concrete model element, referenced by the viewer's element id.
    Element { db_id: String },
    WorldPosition(WorldPosition),
}

impl Location {
    pub fn element(db_id: impl Into<String>) -> Result<Self, ModelError> {
        let db_id = db_id.into();
        if db_id.trim().is_empty() {
            return Err(ModelError::EmptyField { field: "dbId" });
        }
        Ok(Self::Element { db_id })
    }

    pub fn world_position(x: f64, y: f64, z: f64) -> Result<Self, ModelError> {
        WorldPosition::new(x, y, z).map(Self::WorldPosition)
    }

    pub fn kind(&self) -> LocationKind {
        match self {
            Self::Element { .. } => LocationKind::DbId,
            Self::WorldPosition(_) => LocationKind::WorldPosition,
        }
    }

    pub fn db_id(&self) -> Option<&str> {
        match self {
            Self::Element { db_id } => Some(db_id),
            Self::WorldPosition(_) => None,
        }
    }

    pub fn position(&self) -> Option<WorldPosition> {
        match self {
            Self::Element { .. } => None,
            Self::WorldPosition(position) => Some(*position),
        }
    }
}

/// The location discriminator as it appears on the wire (`locationType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    DbId,
    WorldPosition,
}

impl LocationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DbId => "dbId",
            Self::WorldPosition => "worldPosition",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown location type '{value}' (expected dbId or worldPosition)")]
pub struct ParseLocationKindError {
    value: String,
}

impl FromStr for LocationKind {
    type Err = ParseLocationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dbId" => Ok(Self::DbId),
            "worldPosition" => Ok(Self::WorldPosition),
            other => Err(ParseLocationKindError {
                value: other.to_owned(),
            }),
        }
    }
}
