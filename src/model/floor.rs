// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use super::{BuildingId, FloorId, ModelError};

/// A storey of a building. Read-only from the tracker's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Floor {
    floor_id: FloorId,
    building_id: BuildingId,
    name: SmolStr,
    floor_number: i32,
}

impl Floor {
    pub fn new(
        floor_id: FloorId,
        building_id: BuildingId,
        name: impl AsRef<str>,
        floor_number: i32,
    ) -> Result<Self, ModelError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ModelError::EmptyField { field: "name" });
        }
        Ok(Self {
            floor_id,
            building_id,
            name: SmolStr::new(name),
            floor_number,
        })
    }

    pub fn floor_id(&self) -> &FloorId {
        &self.floor_id
    }

    pub fn building_id(&self) -> &BuildingId {
        &self.building_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn floor_number(&self) -> i32 {
        self.floor_number
    }
}
