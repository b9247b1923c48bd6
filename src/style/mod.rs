//! Data-driven visual styling for building categories.
//!
//! Styling is a lookup table rather than branching code: each usage
//! category maps to a [`CategoryStyle`], unknown categories fall back to
//! a default row, and new categories are added by inserting a row.

use std::collections::HashMap;

/// Visual treatment of one feature category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryStyle {
    /// Fill colour as RGB
    pub color: [u8; 3],
    /// Extrusion multiplier applied to the feature's floor count
    pub height_multiplier: f64,
}

impl CategoryStyle {
    pub const fn new(color: [u8; 3], height_multiplier: f64) -> Self {
        Self {
            color,
            height_multiplier,
        }
    }
}

/// Category-keyed style lookup with a default row.
#[derive(Debug, Clone)]
pub struct StyleTable {
    entries: HashMap<String, CategoryStyle>,
    default: CategoryStyle,
}

impl StyleTable {
    /// Creates an empty table with the given fallback style.
    pub fn new(default: CategoryStyle) -> Self {
        Self {
            entries: HashMap::new(),
            default,
        }
    }

    /// Inserts (or replaces) the style row for a category.
    pub fn insert(&mut self, category: impl Into<String>, style: CategoryStyle) {
        self.entries.insert(category.into(), style);
    }

    /// Looks up the style for a category, falling back to the default.
    pub fn style_for(&self, category: &str) -> CategoryStyle {
        self.entries.get(category).copied().unwrap_or(self.default)
    }

    /// The fallback style for unknown categories.
    pub fn default_style(&self) -> CategoryStyle {
        self.default
    }

    /// Number of explicit category rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no explicit rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The standard table for building usage categories.
    ///
    /// Categories follow the municipal building registry's usage
    /// classification; anything unlisted renders as a neutral grey block.
    pub fn building_usage() -> Self {
        let mut table = Self::new(CategoryStyle::new([158, 158, 158], 1.0));
        table.insert("residential", CategoryStyle::new([69, 117, 180], 1.0));
        table.insert("office", CategoryStyle::new([116, 173, 209], 1.0));
        table.insert("commercial", CategoryStyle::new([253, 174, 97], 1.0));
        table.insert("industrial", CategoryStyle::new([215, 48, 39], 1.2));
        table.insert("public", CategoryStyle::new([171, 217, 233], 1.0));
        table.insert("education", CategoryStyle::new([224, 243, 248], 1.0));
        table
    }
}
