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

//! Node placement of a provisioned volume.
//!
//! A volume is pinned to the node that holds its directory through a single
//! required node selector term: `kubernetes.io/hostname In [node]`.

use crate::infrastructure::constants::{LABEL_HOSTNAME, NODE_SELECTOR_OP_IN};
use crate::shared::error::DecodeError;
use k8s_openapi::api::core::v1::{
    NodeSelector, NodeSelectorRequirement, NodeSelectorTerm, PersistentVolume, VolumeNodeAffinity,
};

/// Where a provisioned volume lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumePlacement {
    pub path: String,
    pub node: String,
}

pub fn encode_node_affinity(node: &str) -> VolumeNodeAffinity {
    VolumeNodeAffinity {
        required: Some(NodeSelector {
            node_selector_terms: vec![NodeSelectorTerm {
                match_expressions: Some(vec![NodeSelectorRequirement {
                    key: LABEL_HOSTNAME.to_string(),
                    operator: NODE_SELECTOR_OP_IN.to_string(),
                    values: Some(vec![node.to_string()]),
                }]),
                match_fields: None,
            }],
        }),
    }
}

/// Recovers the hostPath and pinned node of a volume built by this provisioner.
pub fn decode_placement(volume: &PersistentVolume) -> Result<VolumePlacement, DecodeError> {
    let spec = volume.spec.as_ref();

    let path = spec
        .and_then(|s| s.host_path.as_ref())
        .map(|hp| hp.path.clone())
        .filter(|p| !p.is_empty())
        .ok_or(DecodeError::MissingPath)?;

    let node_affinity = spec
        .and_then(|s| s.node_affinity.as_ref())
        .ok_or(DecodeError::MissingNodeAffinity)?;
    let required = node_affinity
        .required
        .as_ref()
        .ok_or(DecodeError::MissingRequiredTerms)?;

    let expression = required
        .node_selector_terms
        .iter()
        .flat_map(|term| term.match_expressions.iter().flatten())
        .find(|expr| expr.key == LABEL_HOSTNAME && expr.operator == NODE_SELECTOR_OP_IN)
        .ok_or(DecodeError::NodeNotFound)?;

    let node = match expression.values.as_deref() {
        Some([node]) => node.clone(),
        values => {
            return Err(DecodeError::AmbiguousNode {
                count: values.map_or(0, |v| v.len()),
            })
        }
    };
    if node.is_empty() {
        return Err(DecodeError::NodeNotFound);
    }

    Ok(VolumePlacement { path, node })
}
