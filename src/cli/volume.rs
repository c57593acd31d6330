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

//! Volume provisioning commands

use crate::cli::display::{TableRenderer, VolumeInfo};
use crate::domain::config::{apply_to_provisioner_config, parse_dynamic_configs};
use crate::infrastructure::constants::{
    ANNOTATION_PROVISIONED_BY, CONFIG_FILE_ENV, DEFAULT_ACCESS_MODE, DEFAULT_STORAGE_SIZE,
    RECLAIM_POLICY_DELETE, RECLAIM_POLICY_RETAIN,
};
use crate::{
    NodePathKubeClient, NodePathKubeClientImpl, NodePathProvisioner, ProvisionOptions,
    Provisioner, ProvisionerConfig,
};
use chrono::Utc;
use clap::{Args, Parser, ValueEnum};
use k8s_openapi::api::core::v1::PersistentVolume;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Connection and configuration flags shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ClusterArgs {
    /// Namespace for helper pods (overrides config file and POD_NAMESPACE)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Path to kubeconfig file
    /// If not specified, uses in-cluster configuration or the default kubeconfig
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// Kubernetes context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Path to provisioner configuration file (TOML)
    /// Falls back to NODEPATH_PROVISIONER_CONFIG when not given
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<String>,

    /// Dynamic configuration properties to override any settings (-D key=value)
    ///
    /// Keys: provisioner.name, provisioner.base-dir, provisioner.namespace,
    /// provisioner.helper.image, provisioner.helper.image-pull-policy,
    /// provisioner.helper.name-prefix, provisioner.helper.poll-interval-ms,
    /// provisioner.helper.poll-attempts, provisioner.helper.failure-policy (wait|fail-fast)
    ///
    /// Example: -Dprovisioner.helper.poll-attempts=60 -Dprovisioner.helper.failure-policy=fail-fast
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

impl ClusterArgs {
    /// Resolve configuration: defaults > config file > POD_NAMESPACE > flags > -D
    pub fn resolve_config(&self) -> anyhow::Result<ProvisionerConfig> {
        let config_path = self
            .config_file
            .clone()
            .or_else(|| std::env::var(CONFIG_FILE_ENV).ok());

        let mut config = match config_path {
            Some(path) => ProvisionerConfig::from_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load configuration from {}: {}", path, e)
            })?,
            None => ProvisionerConfig::default(),
        }
        .with_env_overrides();

        config.apply_namespace_override(self.namespace.clone());

        if !self.properties.is_empty() {
            let dynamic_configs = parse_dynamic_configs(&self.properties)
                .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
            apply_to_provisioner_config(&dynamic_configs, &mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub async fn connect(&self, namespace: &str) -> anyhow::Result<Arc<dyn NodePathKubeClient>> {
        let client = NodePathKubeClientImpl::new_with_config(
            namespace.to_string(),
            self.kubeconfig.clone(),
            self.context.clone(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Kubernetes client: {}", e))?;

        Ok(Arc::new(client))
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Yaml,
    Json,
}

#[derive(Parser, Debug, Clone)]
pub struct ProvisionCommand {
    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Name of the PersistentVolume to create
    #[arg(long)]
    pub pv_name: String,

    /// Namespace of the claim the volume is for
    #[arg(long, default_value = "default")]
    pub pvc_namespace: String,

    /// Name of the claim the volume is for
    #[arg(long)]
    pub pvc_name: String,

    /// Requested capacity (e.g., "10Gi")
    #[arg(long, default_value = DEFAULT_STORAGE_SIZE)]
    pub capacity: String,

    /// Access modes (repeatable)
    #[arg(long = "access-mode", default_value = DEFAULT_ACCESS_MODE)]
    pub access_modes: Vec<String>,

    /// Reclaim policy (Delete or Retain)
    #[arg(long, default_value = RECLAIM_POLICY_DELETE)]
    pub reclaim_policy: String,

    /// Node to create the directory on; the scheduler picks one when omitted
    #[arg(long)]
    pub node: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Name of the PersistentVolume to delete
    #[arg(long)]
    pub pv_name: String,

    /// Only clean up the directory, keep the PersistentVolume object
    #[arg(long)]
    pub keep_volume_object: bool,

    /// Proceed even if the volume was provisioned by another provisioner
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct InspectCommand {
    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Name of the PersistentVolume to inspect
    #[arg(long)]
    pub pv_name: String,

    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    #[command(flatten)]
    pub cluster: ClusterArgs,

    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

impl ProvisionCommand {
    pub async fn execute(&self, cancel: &CancellationToken) -> anyhow::Result<()> {
        let config = self.cluster.resolve_config()?;

        if self.reclaim_policy != RECLAIM_POLICY_DELETE
            && self.reclaim_policy != RECLAIM_POLICY_RETAIN
        {
            anyhow::bail!(
                "Invalid reclaim policy: {} (expected {} or {})",
                self.reclaim_policy,
                RECLAIM_POLICY_DELETE,
                RECLAIM_POLICY_RETAIN
            );
        }

        let client = self.cluster.connect(&config.namespace).await?;
        let provisioner = NodePathProvisioner::new(Arc::clone(&client), config)?
            .with_cancellation(cancel.clone());

        let options = ProvisionOptions {
            capacity: Quantity(self.capacity.clone()),
            access_modes: self.access_modes.clone(),
            reclaim_policy: self.reclaim_policy.clone(),
            selected_node: self.node.clone(),
            ..ProvisionOptions::new(&self.pv_name, &self.pvc_namespace, &self.pvc_name)
        };

        let (volume, _state) = provisioner
            .provision(&options)
            .await
            .map_err(|e| anyhow::anyhow!("Provisioning failed: {}", e))?;

        client.create_persistent_volume(&volume).await.map_err(|e| {
            anyhow::anyhow!(
                "Directory was created but PersistentVolume {} could not be stored: {}",
                self.pv_name,
                e
            )
        })?;

        let info = VolumeInfo::from_volume(&volume, Utc::now());
        println!(
            "Volume {} provisioned on node {} at {}",
            info.name, info.node, info.path
        );
        Ok(())
    }
}

impl DeleteCommand {
    pub async fn execute(&self, cancel: &CancellationToken) -> anyhow::Result<()> {
        let config = self.cluster.resolve_config()?;
        let client = self.cluster.connect(&config.namespace).await?;

        let volume = client
            .get_persistent_volume(&self.pv_name)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get volume {}: {}", self.pv_name, e))?;

        let owner = provisioned_by(&volume);
        if owner != Some(config.provisioner_name.as_str()) && !self.force {
            anyhow::bail!(
                "Volume {} was provisioned by '{}', not '{}' (use --force to delete anyway)",
                self.pv_name,
                owner.unwrap_or("<unknown>"),
                config.provisioner_name
            );
        }

        let provisioner = NodePathProvisioner::new(Arc::clone(&client), config)?
            .with_cancellation(cancel.clone());
        provisioner
            .delete(&volume)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete volume {}: {}", self.pv_name, e))?;

        if !self.keep_volume_object {
            client
                .delete_persistent_volume(&self.pv_name)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to delete volume object: {}", e))?;
        }

        println!("Volume {} deleted successfully!", self.pv_name);
        Ok(())
    }
}

impl InspectCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = self.cluster.resolve_config()?;
        let client = self.cluster.connect(&config.namespace).await?;

        let volume = client
            .get_persistent_volume(&self.pv_name)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get volume {}: {}", self.pv_name, e))?;

        let info = VolumeInfo::from_volume(&volume, Utc::now());
        match self.output {
            OutputFormat::Table => println!("{}", TableRenderer::new().render_volume_detail(&info)),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&info)?),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        }

        Ok(())
    }
}

impl ListCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = self.cluster.resolve_config()?;
        let client = self.cluster.connect(&config.namespace).await?;

        let volumes = client
            .list_persistent_volumes()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list volumes: {}", e))?;

        let now = Utc::now();
        let infos: Vec<VolumeInfo> = volumes
            .iter()
            .filter(|v| provisioned_by(v) == Some(config.provisioner_name.as_str()))
            .map(|v| VolumeInfo::from_volume(v, now))
            .collect();

        match self.output {
            OutputFormat::Table => println!("{}", TableRenderer::new().render_volumes_list(&infos)),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&infos)?),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&infos)?),
        }

        Ok(())
    }
}

fn provisioned_by(volume: &PersistentVolume) -> Option<&str> {
    volume
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(ANNOTATION_PROVISIONED_BY))
        .map(String::as_str)
}
