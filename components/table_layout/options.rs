/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Configuration options for table layout.

use app_units::Au;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Knobs for the table layout engine. Every field has a default, so a partial JSON object is a
/// valid configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct TableLayoutOptions {
    /// True to turn off incremental layout: the grid and both requirement arrays are rebuilt
    /// on every layout request.
    pub nonincremental_layout: bool,

    /// How many times a layout pass is attempted when the document keeps changing under it.
    pub max_layout_attempts: u32,

    /// Cell spacing in CSS pixels used when the table does not specify one.
    pub default_cell_spacing_px: i32,

    /// Grid border width in CSS pixels used when the table does not specify one.
    pub default_border_width_px: i32,

    /// Whether percentage width requests on cells are honoured. When false they are treated
    /// like `auto`.
    pub percentage_widths: bool,
}

impl Default for TableLayoutOptions {
    fn default() -> Self {
        Self {
            nonincremental_layout: false,
            max_layout_attempts: 3,
            default_cell_spacing_px: 0,
            default_border_width_px: 0,
            percentage_widths: true,
        }
    }
}

impl TableLayoutOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn default_cell_spacing(&self) -> Au {
        Au::from_px(self.default_cell_spacing_px.max(0))
    }

    pub fn default_border_width(&self) -> Au {
        Au::from_px(self.default_border_width_px.max(0))
    }

    /// The number of attempts, never less than one.
    pub(crate) fn layout_attempts(&self) -> u32 {
        self.max_layout_attempts.max(1)
    }
}
