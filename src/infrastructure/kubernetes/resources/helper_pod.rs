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

use crate::domain::config::ProvisionerConfig;
use crate::domain::volume::Action;
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::resources::LabeledResourceBuilder;
use k8s_openapi::api::core::v1::{
    Container, HostPathVolumeSource, Pod, PodSpec, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Builds the one-shot pod that runs a single filesystem command on a node.
pub struct HelperPodBuilder<'a> {
    config: &'a ProvisionerConfig,
    action: Action,
    volume_name: &'a str,
    path: &'a str,
    node_name: Option<&'a str>,
}

impl LabeledResourceBuilder for HelperPodBuilder<'_> {
    fn component_name(&self) -> &'static str {
        COMPONENT_HELPER
    }
}

impl<'a> HelperPodBuilder<'a> {
    pub fn new(
        config: &'a ProvisionerConfig,
        action: Action,
        volume_name: &'a str,
        path: &'a str,
    ) -> Self {
        Self {
            config,
            action,
            volume_name,
            path,
            node_name: None,
        }
    }

    /// Pins the pod to `node`. An empty name leaves placement to the scheduler.
    pub fn with_node(mut self, node: Option<&'a str>) -> Self {
        self.node_name = node.filter(|n| !n.is_empty());
        self
    }

    pub fn pod_name(&self) -> String {
        helper_pod_name(&self.config.helper.name_prefix, self.action, self.volume_name)
    }

    pub fn build(&self) -> Pod {
        let base_dir = self.config.base_dir.clone();

        let mut labels = self.get_labels();
        labels.insert(LABEL_ACTION.to_string(), self.action.as_str().to_string());

        let container = Container {
            name: HELPER_CONTAINER_NAME.to_string(),
            image: Some(self.config.helper.image.clone()),
            image_pull_policy: Some(self.config.helper.image_pull_policy.clone()),
            command: Some(vec![
                "sh".to_string(),
                "-c".to_string(),
                self.action.command_for(self.path),
            ]),
            volume_mounts: Some(vec![VolumeMount {
                name: HELPER_VOLUME_NAME.to_string(),
                mount_path: base_dir.clone(),
                ..Default::default()
            }]),
            ..Default::default()
        };

        Pod {
            metadata: ObjectMeta {
                name: Some(self.pod_name()),
                namespace: Some(self.config.namespace.clone()),
                labels: Some(labels),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![container],
                volumes: Some(vec![Volume {
                    name: HELPER_VOLUME_NAME.to_string(),
                    host_path: Some(HostPathVolumeSource {
                        path: base_dir,
                        type_: None,
                    }),
                    ..Default::default()
                }]),
                node_name: self.node_name.map(str::to_string),
                restart_policy: Some(RESTART_POLICY_NEVER.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Deterministic helper pod name, cut to the platform's name length limit.
///
/// A cut that ends on separators has them replaced by `0` so the name keeps
/// its length and still ends alphanumeric, as DNS-1123 names must.
pub fn helper_pod_name(prefix: &str, action: Action, volume_name: &str) -> String {
    let mut name = format!("{}-{}-{}", prefix, action, volume_name);
    if name.len() > MAX_HELPER_NAME_LENGTH {
        let mut end = MAX_HELPER_NAME_LENGTH;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);

        let kept = name
            .trim_end_matches(|c: char| !c.is_ascii_alphanumeric())
            .len();
        let replaced = name.len() - kept;
        if replaced > 0 {
            name.truncate(kept);
            name.push_str(&"0".repeat(replaced));
        }
    }
    name
}
