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

//! Status icons for volume output

pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (checkmark)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon
    pub const WARNING: &'static str = "⚠";

    /// Error icon (cross)
    pub const ERROR: &'static str = "✗";

    /// Pending icon (waiting)
    pub const PENDING: &'static str = "⏳";

    /// Unknown icon
    pub const UNKNOWN: &'static str = "?";

    /// Get status icon for a PersistentVolume phase
    pub fn get_phase_icon(phase: &str) -> &'static str {
        match phase {
            "Bound" => Self::SUCCESS,
            "Available" | "Pending" => Self::PENDING,
            "Released" => Self::WARNING,
            "Failed" => Self::ERROR,
            _ => Self::UNKNOWN,
        }
    }
}
