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
use crate::domain::helper::HelperPodOrchestrator;
use crate::domain::volume::path::volume_path;
use crate::domain::volume::placement::decode_placement;
use crate::domain::volume::Action;
use crate::infrastructure::constants::{
    DEFAULT_ACCESS_MODE, DEFAULT_STORAGE_SIZE, RECLAIM_POLICY_DELETE, RECLAIM_POLICY_RETAIN,
};
use crate::infrastructure::kubernetes::resources::PersistentVolumeBuilder;
use crate::infrastructure::kubernetes::NodePathKubeClient;
use crate::shared::error::Result;
use k8s_openapi::api::core::v1::PersistentVolume;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Entry points invoked by a provisioning controller.
#[async_trait::async_trait]
pub trait Provisioner: Send + Sync {
    /// Prepares backing storage for a claim and returns the volume to create.
    async fn provision(
        &self,
        options: &ProvisionOptions,
    ) -> Result<(PersistentVolume, ProvisioningState)>;

    /// Releases the backing storage of `volume` according to its reclaim policy.
    async fn delete(&self, volume: &PersistentVolume) -> Result<()>;
}

/// Outcome reported back to the controller together with a provisioned volume.
///
/// Mirrors the controller's state set. [`NodePathProvisioner`] finishes every
/// provision synchronously and only ever reports `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    Finished,
    InBackground,
    NoChange,
}

/// A claim that needs a volume.
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    pub pv_name: String,
    pub pvc_namespace: String,
    pub pvc_name: String,
    pub capacity: Quantity,
    pub access_modes: Vec<String>,
    pub reclaim_policy: String,
    /// Node already chosen by the scheduler for the consuming pod, if any.
    pub selected_node: Option<String>,
}

impl ProvisionOptions {
    pub fn new(
        pv_name: impl Into<String>,
        pvc_namespace: impl Into<String>,
        pvc_name: impl Into<String>,
    ) -> Self {
        Self {
            pv_name: pv_name.into(),
            pvc_namespace: pvc_namespace.into(),
            pvc_name: pvc_name.into(),
            capacity: Quantity(DEFAULT_STORAGE_SIZE.to_string()),
            access_modes: vec![DEFAULT_ACCESS_MODE.to_string()],
            reclaim_policy: RECLAIM_POLICY_DELETE.to_string(),
            selected_node: None,
        }
    }
}

/// Provisions hostPath volumes under a base directory on the cluster nodes.
pub struct NodePathProvisioner {
    orchestrator: HelperPodOrchestrator,
    cancel: CancellationToken,
}

impl NodePathProvisioner {
    pub fn new(client: Arc<dyn NodePathKubeClient>, config: ProvisionerConfig) -> Result<Self> {
        Ok(Self::with_orchestrator(HelperPodOrchestrator::new(client, config)?))
    }

    pub fn with_orchestrator(orchestrator: HelperPodOrchestrator) -> Self {
        Self {
            orchestrator,
            cancel: CancellationToken::new(),
        }
    }

    /// Helper pods started by this provisioner are abandoned and deleted once
    /// `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ProvisionerConfig {
        self.orchestrator.config()
    }
}

#[async_trait::async_trait]
impl Provisioner for NodePathProvisioner {
    async fn provision(
        &self,
        options: &ProvisionOptions,
    ) -> Result<(PersistentVolume, ProvisioningState)> {
        let config = self.config();
        let path = volume_path(
            &config.base_dir,
            &options.pv_name,
            &options.pvc_namespace,
            &options.pvc_name,
        );

        let node = self
            .orchestrator
            .run_with_cancellation(
                Action::Create,
                &options.pv_name,
                &path,
                options.selected_node.as_deref(),
                &self.cancel,
            )
            .await?;

        info!(volume = %options.pv_name, path = %path, node = %node, "volume directory created");

        let volume = PersistentVolumeBuilder::new(
            options.pv_name.clone(),
            path,
            node,
            options.capacity.clone(),
            config.provisioner_name.clone(),
        )
        .access_modes(options.access_modes.clone())
        .reclaim_policy(options.reclaim_policy.clone())
        .build();

        Ok((volume, ProvisioningState::Finished))
    }

    async fn delete(&self, volume: &PersistentVolume) -> Result<()> {
        let placement = decode_placement(volume)?;
        let name = volume.metadata.name.as_deref().unwrap_or_default();

        let reclaim_policy = volume
            .spec
            .as_ref()
            .and_then(|s| s.persistent_volume_reclaim_policy.as_deref());
        if reclaim_policy == Some(RECLAIM_POLICY_RETAIN) {
            info!(volume = %name, path = %placement.path, "reclaim policy is Retain, keeping data");
            return Ok(());
        }

        self.orchestrator
            .run_with_cancellation(
                Action::Delete,
                name,
                &placement.path,
                Some(placement.node.as_str()),
                &self.cancel,
            )
            .await?;

        info!(volume = %name, path = %placement.path, node = %placement.node, "volume directory removed");
        Ok(())
    }
}
