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

//! Table rendering for volume output

use super::{ColorTheme, StatusIcon};
use crate::domain::volume::decode_placement;
use crate::infrastructure::constants::RESOURCE_STORAGE;
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use k8s_openapi::api::core::v1::PersistentVolume;
use serde::Serialize;

/// Volume information for display
#[derive(Debug, Clone, Serialize)]
pub struct VolumeInfo {
    pub name: String,
    pub path: String,
    pub node: String,
    pub capacity: String,
    pub reclaim_policy: String,
    pub phase: String,
    pub claim: Option<String>,
    pub age: String,
}

impl VolumeInfo {
    /// Summarizes a volume; placement problems are shown in place of path and node.
    pub fn from_volume(volume: &PersistentVolume, now: DateTime<Utc>) -> Self {
        let spec = volume.spec.as_ref();
        let (path, node) = match decode_placement(volume) {
            Ok(placement) => (placement.path, placement.node),
            Err(e) => (format!("<{}>", e), "-".to_string()),
        };

        let claim = spec.and_then(|s| s.claim_ref.as_ref()).map(|c| {
            format!(
                "{}/{}",
                c.namespace.as_deref().unwrap_or_default(),
                c.name.as_deref().unwrap_or_default()
            )
        });

        Self {
            name: volume.metadata.name.clone().unwrap_or_default(),
            path,
            node,
            capacity: spec
                .and_then(|s| s.capacity.as_ref())
                .and_then(|c| c.get(RESOURCE_STORAGE))
                .map(|q| q.0.clone())
                .unwrap_or_else(|| "-".to_string()),
            reclaim_policy: spec
                .and_then(|s| s.persistent_volume_reclaim_policy.clone())
                .unwrap_or_else(|| "-".to_string()),
            phase: volume
                .status
                .as_ref()
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            claim,
            age: volume
                .metadata
                .creation_timestamp
                .as_ref()
                .map(|t| format_age(now.signed_duration_since(t.0)))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Compact kubectl-style age, e.g. `42s`, `7m`, `3h`, `12d`.
pub fn format_age(age: chrono::Duration) -> String {
    let seconds = age.num_seconds().max(0);
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m", seconds / 60)
    } else if seconds < 86400 {
        format!("{}h", seconds / 3600)
    } else {
        format!("{}d", seconds / 86400)
    }
}

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render volumes list as a formatted table
    pub fn render_volumes_list(&self, volumes: &[VolumeInfo]) -> String {
        if volumes.is_empty() {
            return "No provisioned volumes found".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("VOLUME").set_alignment(CellAlignment::Left),
                Cell::new("NODE").set_alignment(CellAlignment::Left),
                Cell::new("PATH").set_alignment(CellAlignment::Left),
                Cell::new("CAPACITY").set_alignment(CellAlignment::Center),
                Cell::new("RECLAIM").set_alignment(CellAlignment::Center),
                Cell::new("STATUS").set_alignment(CellAlignment::Center),
                Cell::new("AGE").set_alignment(CellAlignment::Right),
            ]);

        for volume in volumes {
            table.add_row(vec![
                Cell::new(&volume.name),
                Cell::new(&volume.node),
                Cell::new(&volume.path),
                Cell::new(&volume.capacity),
                Cell::new(&volume.reclaim_policy)
                    .fg(self.theme.get_reclaim_color(&volume.reclaim_policy)),
                Cell::new(format!(
                    "{} {}",
                    StatusIcon::get_phase_icon(&volume.phase),
                    volume.phase
                ))
                .fg(self.theme.get_phase_color(&volume.phase)),
                Cell::new(&volume.age).set_alignment(CellAlignment::Right),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ NodePath Volumes {} ─╮\n",
            format!("[{} volumes]", volumes.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Bound  {} Available  {} Released  {} Failed\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::PENDING.cyan(),
            StatusIcon::WARNING.yellow(),
            StatusIcon::ERROR.red()
        ));

        output
    }

    /// Render a single volume as a two-column detail table
    pub fn render_volume_detail(&self, volume: &VolumeInfo) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.add_row(vec![
            Cell::new("Volume"),
            Cell::new(&volume.name).fg(Color::Cyan),
        ]);
        table.add_row(vec![Cell::new("Node"), Cell::new(&volume.node)]);
        table.add_row(vec![Cell::new("Path"), Cell::new(&volume.path)]);
        table.add_row(vec![Cell::new("Capacity"), Cell::new(&volume.capacity)]);
        table.add_row(vec![
            Cell::new("Reclaim Policy"),
            Cell::new(&volume.reclaim_policy)
                .fg(self.theme.get_reclaim_color(&volume.reclaim_policy)),
        ]);
        table.add_row(vec![
            Cell::new("Status"),
            Cell::new(format!(
                "{} {}",
                StatusIcon::get_phase_icon(&volume.phase),
                volume.phase
            ))
            .fg(self.theme.get_phase_color(&volume.phase)),
        ]);
        table.add_row(vec![
            Cell::new("Claim"),
            Cell::new(volume.claim.as_deref().unwrap_or("-")),
        ]);
        table.add_row(vec![Cell::new("Age"), Cell::new(&volume.age)]);

        table.to_string()
    }
}
