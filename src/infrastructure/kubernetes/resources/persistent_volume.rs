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

use crate::domain::volume::placement::encode_node_affinity;
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::resources::LabeledResourceBuilder;
use k8s_openapi::api::core::v1::{HostPathVolumeSource, PersistentVolume, PersistentVolumeSpec};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

pub struct PersistentVolumeBuilder {
    name: String,
    path: String,
    node: String,
    capacity: Quantity,
    access_modes: Vec<String>,
    reclaim_policy: String,
    provisioner_name: String,
}

impl LabeledResourceBuilder for PersistentVolumeBuilder {
    fn component_name(&self) -> &'static str {
        COMPONENT_VOLUME
    }
}

impl PersistentVolumeBuilder {
    pub fn new(
        name: String,
        path: String,
        node: String,
        capacity: Quantity,
        provisioner_name: String,
    ) -> Self {
        Self {
            name,
            path,
            node,
            capacity,
            access_modes: vec![DEFAULT_ACCESS_MODE.to_string()],
            reclaim_policy: RECLAIM_POLICY_DELETE.to_string(),
            provisioner_name,
        }
    }

    pub fn access_modes(mut self, access_modes: Vec<String>) -> Self {
        if !access_modes.is_empty() {
            self.access_modes = access_modes;
        }
        self
    }

    pub fn reclaim_policy(mut self, reclaim_policy: impl Into<String>) -> Self {
        self.reclaim_policy = reclaim_policy.into();
        self
    }

    pub fn build(&self) -> PersistentVolume {
        let mut annotations = BTreeMap::new();
        annotations.insert(
            ANNOTATION_PROVISIONED_BY.to_string(),
            self.provisioner_name.clone(),
        );

        let mut capacity = BTreeMap::new();
        capacity.insert(RESOURCE_STORAGE.to_string(), self.capacity.clone());

        PersistentVolume {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                labels: Some(self.get_labels()),
                annotations: Some(annotations),
                ..Default::default()
            },
            spec: Some(PersistentVolumeSpec {
                persistent_volume_reclaim_policy: Some(self.reclaim_policy.clone()),
                access_modes: Some(self.access_modes.clone()),
                volume_mode: Some(VOLUME_MODE_FILESYSTEM.to_string()),
                capacity: Some(capacity),
                host_path: Some(HostPathVolumeSource {
                    path: self.path.clone(),
                    type_: Some(VOLUME_TYPE_DIRECTORY_OR_CREATE.to_string()),
                }),
                node_affinity: Some(encode_node_affinity(&self.node)),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
