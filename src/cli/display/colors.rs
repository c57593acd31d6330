// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Color theme for table output

use comfy_table::Color as TableColor;

/// Color theme for CLI output
#[derive(Debug, Clone, Copy)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color based on PersistentVolume phase
    pub fn get_phase_color(&self, phase: &str) -> TableColor {
        match phase {
            "Bound" => self.success,
            "Available" | "Pending" => self.info,
            "Released" => self.warning,
            "Failed" => self.error,
            _ => self.muted,
        }
    }

    /// Retained volumes outlive their claims, so they are highlighted.
    pub fn get_reclaim_color(&self, reclaim_policy: &str) -> TableColor {
        if reclaim_policy == "Retain" {
            self.warning
        } else {
            self.muted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.success, TableColor::Green);
        assert_eq!(theme.warning, TableColor::Yellow);
        assert_eq!(theme.error, TableColor::Red);
    }

    #[test]
    fn test_get_phase_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.get_phase_color("Bound"), TableColor::Green);
        assert_eq!(theme.get_phase_color("Available"), TableColor::Cyan);
        assert_eq!(theme.get_phase_color("Released"), TableColor::Yellow);
        assert_eq!(theme.get_phase_color("Failed"), TableColor::Red);
        assert_eq!(theme.get_phase_color("Unknown"), TableColor::DarkGrey);
    }

    #[test]
    fn test_get_reclaim_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.get_reclaim_color("Retain"), TableColor::Yellow);
        assert_eq!(theme.get_reclaim_color("Delete"), TableColor::DarkGrey);
    }
}
