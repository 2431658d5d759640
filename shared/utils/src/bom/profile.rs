//! Manufacturer Profiles
//!
//! Column mapping and header-ignore terms for each vendor's BOM tables.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{ExviewError, ExviewResult};

/// Where the REF, part number and description live in a vendor's tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManufacturerProfile {
    pub ref_column: usize,
    pub part_number_column: usize,
    pub description_column: usize,
    /// Tables with fewer columns are not BOM tables.
    pub min_columns: usize,
    /// Lower-case terms marking a header row.
    pub header_ignore_terms: Vec<String>,
}

impl ManufacturerProfile {
    pub fn liebherr() -> Self {
        Self {
            ref_column: 1,
            part_number_column: 2,
            description_column: 4,
            min_columns: 5,
            header_ignore_terms: ["remark", "item", "part no.", "quantity", "description", "price"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn viking() -> Self {
        Self {
            ref_column: 0,
            part_number_column: 1,
            description_column: 2,
            min_columns: 3,
            header_ignore_terms: ["item", "part no.", "name", "qty", "uom", "note"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn validate(&self, id: &str) -> ExviewResult<()> {
        let columns = [self.ref_column, self.part_number_column, self.description_column];

        if columns.iter().any(|&c| c >= self.min_columns) {
            return Err(ExviewError::configuration(format!(
                "manufacturer '{}': column indices {:?} must be below min_columns {}",
                id, columns, self.min_columns
            )));
        }
        if columns[0] == columns[1] || columns[0] == columns[2] || columns[1] == columns[2] {
            return Err(ExviewError::configuration(format!(
                "manufacturer '{}': column indices {:?} must be distinct",
                id, columns
            )));
        }
        Ok(())
    }

    /// A row is a header when its joined text contains any ignore term.
    pub fn is_header_row(&self, reference: &str, part_number: &str, description: &str) -> bool {
        let row_text = format!("{} {} {}", reference, part_number, description).to_lowercase();
        self.header_ignore_terms
            .iter()
            .any(|term| row_text.contains(term.to_lowercase().as_str()))
    }
}

/// Validated lookup from manufacturer id (case-insensitive) to profile.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, ManufacturerProfile>,
}

impl ProfileRegistry {
    pub fn new(profiles: &HashMap<String, ManufacturerProfile>) -> ExviewResult<Self> {
        let mut registry = BTreeMap::new();
        for (id, profile) in profiles {
            profile.validate(id)?;
            if registry.insert(id.to_lowercase(), profile.clone()).is_some() {
                return Err(ExviewError::configuration(format!(
                    "manufacturer '{}' is configured more than once",
                    id
                )));
            }
        }
        Ok(Self { profiles: registry })
    }

    pub fn get(&self, manufacturer: &str) -> ExviewResult<&ManufacturerProfile> {
        self.profiles
            .get(&manufacturer.trim().to_lowercase())
            .ok_or_else(|| ExviewError::unsupported_manufacturer(manufacturer))
    }

    pub fn ids(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert("liebherr".to_string(), ManufacturerProfile::liebherr());
        profiles.insert("viking".to_string(), ManufacturerProfile::viking());
        Self { profiles }
    }
}
