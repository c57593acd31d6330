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

//! Drives one helper pod from submission to deletion.

use crate::domain::config::{FailurePolicy, ProvisionerConfig};
use crate::domain::helper::guard::HelperPodGuard;
use crate::domain::volume::path::validate_volume_path;
use crate::domain::volume::Action;
use crate::infrastructure::constants::{POD_PHASE_FAILED, POD_PHASE_SUCCEEDED};
use crate::infrastructure::kubernetes::resources::{helper_pod_name, HelperPodBuilder};
use crate::infrastructure::kubernetes::NodePathKubeClient;
use crate::shared::error::{ProvisionerError, Result};
use k8s_openapi::api::core::v1::Pod;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs filesystem actions on nodes through short-lived helper pods.
///
/// Holds no per-call state, so one instance can serve concurrent calls for
/// different volumes.
#[derive(Clone)]
pub struct HelperPodOrchestrator {
    client: Arc<dyn NodePathKubeClient>,
    config: Arc<ProvisionerConfig>,
}

impl HelperPodOrchestrator {
    /// Fails when `config` does not pass [`ProvisionerConfig::validate`].
    pub fn new(client: Arc<dyn NodePathKubeClient>, config: ProvisionerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    /// Runs `action` on `path` and returns the node the helper pod actually ran on.
    ///
    /// With `node` set (and non-empty) the pod is pinned to that node, otherwise
    /// the scheduler picks one. The helper pod is deleted before this returns.
    pub async fn run(
        &self,
        action: Action,
        volume_name: &str,
        path: &str,
        node: Option<&str>,
    ) -> Result<String> {
        self.run_with_cancellation(action, volume_name, path, node, &CancellationToken::new())
            .await
    }

    /// Same as [`run`](Self::run), but stops waiting and deletes the helper pod
    /// as soon as `cancel` fires. Nothing is submitted if it already has.
    pub async fn run_with_cancellation(
        &self,
        action: Action,
        volume_name: &str,
        path: &str,
        node: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        validate_volume_path(&self.config.base_dir, path)?;
        if cancel.is_cancelled() {
            return Err(ProvisionerError::Cancelled {
                name: helper_pod_name(&self.config.helper.name_prefix, action, volume_name),
            });
        }

        let builder = HelperPodBuilder::new(&self.config, action, volume_name, path).with_node(node);
        let pod = builder.build();
        let name = builder.pod_name();

        match self.client.create_pod(&pod).await {
            Ok(()) => info!(
                pod = %name,
                namespace = %self.client.namespace(),
                action = %action,
                node = ?node,
                "helper pod submitted"
            ),
            Err(e) if e.is_already_exists() => {
                info!(pod = %name, action = %action, "helper pod already exists, resuming observation")
            }
            Err(e) => {
                return Err(ProvisionerError::Submission {
                    name,
                    message: e.to_string(),
                })
            }
        }

        let guard = HelperPodGuard::new(Arc::clone(&self.client), name);
        let result = self.wait_for_completion(action, guard.name(), cancel).await;
        guard.release().await;

        result
    }

    async fn wait_for_completion(
        &self,
        action: Action,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let helper = &self.config.helper;

        for attempt in 0..helper.poll_attempts {
            let pod = self
                .client
                .get_pod(name)
                .await
                .map_err(|e| ProvisionerError::Observation {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;

            match pod_phase(&pod) {
                Some(POD_PHASE_SUCCEEDED) => return scheduled_node(&pod, name),
                Some(POD_PHASE_FAILED) if helper.failure_policy == FailurePolicy::FailFast => {
                    warn!(pod = %name, action = %action, "helper pod failed");
                    return Err(ProvisionerError::HelperFailed {
                        name: name.to_string(),
                        message: failure_message(&pod),
                    });
                }
                phase => debug!(pod = %name, attempt, phase = ?phase, "waiting for helper pod"),
            }

            tokio::select! {
                _ = tokio::time::sleep(helper.poll_interval()) => {}
                _ = cancel.cancelled() => {
                    warn!(pod = %name, action = %action, "helper pod wait cancelled");
                    return Err(ProvisionerError::Cancelled { name: name.to_string() });
                }
            }
        }

        warn!(pod = %name, action = %action, attempts = helper.poll_attempts, "helper pod timed out");
        Err(ProvisionerError::Timeout {
            action: action.to_string(),
            name: name.to_string(),
            seconds: helper.timeout_seconds(),
        })
    }
}

fn pod_phase(pod: &Pod) -> Option<&str> {
    pod.status.as_ref().and_then(|s| s.phase.as_deref())
}

fn scheduled_node(pod: &Pod, name: &str) -> Result<String> {
    let node = pod
        .spec
        .as_ref()
        .and_then(|s| s.node_name.clone())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ProvisionerError::Observation {
            name: name.to_string(),
            message: "helper pod succeeded without a node assignment".to_string(),
        })?;

    info!(pod = %name, node = %node, "helper pod succeeded");
    Ok(node)
}

fn failure_message(pod: &Pod) -> String {
    let status = pod.status.as_ref();
    let reason = status.and_then(|s| s.reason.as_deref());
    let message = status.and_then(|s| s.message.as_deref());

    match (reason, message) {
        (Some(r), Some(m)) => format!("{}: {}", r, m),
        (Some(r), None) => r.to_string(),
        (None, Some(m)) => m.to_string(),
        (None, None) => "pod phase is Failed".to_string(),
    }
}
