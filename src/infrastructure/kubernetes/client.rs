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

use crate::infrastructure::constants::FIELD_MANAGER;
use crate::shared::error::ProvisionerError;
use k8s_openapi::api::core::v1::{PersistentVolume, Pod};
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Client};

/// Cluster operations the provisioner needs.
///
/// Pods live in the client's namespace; PersistentVolumes are cluster scoped.
#[async_trait::async_trait]
pub trait NodePathKubeClient: Send + Sync {
    fn namespace(&self) -> &str;

    /// Returns [`ProvisionerError::AlreadyExists`] when a pod with the same name exists.
    async fn create_pod(&self, pod: &Pod) -> Result<(), ProvisionerError>;

    async fn get_pod(&self, name: &str) -> Result<Pod, ProvisionerError>;

    async fn delete_pod(&self, name: &str) -> Result<(), ProvisionerError>;

    async fn create_persistent_volume(
        &self,
        volume: &PersistentVolume,
    ) -> Result<PersistentVolume, ProvisionerError>;

    async fn get_persistent_volume(&self, name: &str) -> Result<PersistentVolume, ProvisionerError>;

    async fn list_persistent_volumes(&self) -> Result<Vec<PersistentVolume>, ProvisionerError>;

    async fn delete_persistent_volume(&self, name: &str) -> Result<(), ProvisionerError>;
}

pub struct NodePathKubeClientImpl {
    client: Client,
    namespace: String,
}

impl NodePathKubeClientImpl {
    pub async fn new(namespace: String) -> Result<Self, ProvisionerError> {
        let client = Client::try_default().await.map_err(|e| {
            ProvisionerError::KubeError(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self { client, namespace })
    }

    /// Uses an explicit kubeconfig when a path or context is given, otherwise
    /// falls back to the in-cluster / default configuration.
    pub async fn new_with_config(
        namespace: String,
        kubeconfig_path: Option<String>,
        context: Option<String>,
    ) -> Result<Self, ProvisionerError> {
        use kube::config::{KubeConfigOptions, Kubeconfig};

        if kubeconfig_path.is_none() && context.is_none() {
            return Self::new(namespace).await;
        }

        let kubeconfig = if let Some(path) = kubeconfig_path {
            Kubeconfig::read_from(path).map_err(|e| {
                ProvisionerError::KubeError(format!("Failed to load kubeconfig: {}", e))
            })?
        } else {
            Kubeconfig::read().map_err(|e| {
                ProvisionerError::KubeError(format!("Failed to load kubeconfig: {}", e))
            })?
        };

        let config_options = KubeConfigOptions {
            context,
            cluster: None,
            user: None,
        };

        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &config_options)
            .await
            .map_err(|e| {
                ProvisionerError::KubeError(format!("Failed to create Kubernetes config: {}", e))
            })?;

        let client = Client::try_from(config).map_err(|e| {
            ProvisionerError::KubeError(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self { client, namespace })
    }

    fn post_params() -> PostParams {
        PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        }
    }

    fn map_get_error(&self, err: kube::Error, resource_type: &str, name: &str) -> ProvisionerError {
        if let kube::Error::Api(ae) = err {
            if ae.code == 404 {
                ProvisionerError::not_found(resource_type, name, &self.namespace)
            } else {
                ProvisionerError::KubeError(ae.message)
            }
        } else {
            ProvisionerError::KubeError(err.to_string())
        }
    }

    fn map_create_error(
        &self,
        err: kube::Error,
        resource_type: &str,
        name: &str,
    ) -> ProvisionerError {
        match err {
            kube::Error::Api(ae) if ae.code == 409 => {
                ProvisionerError::already_exists(resource_type, name, &self.namespace)
            }
            e => ProvisionerError::KubeError(e.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl NodePathKubeClient for NodePathKubeClientImpl {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn create_pod(&self, pod: &Pod) -> Result<(), ProvisionerError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &self.namespace);
        let name = pod
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| ProvisionerError::ConfigError("Pod name is required".to_string()))?;

        api.create(&Self::post_params(), pod)
            .await
            .map_err(|e| self.map_create_error(e, "Pod", name))?;
        Ok(())
    }

    async fn get_pod(&self, name: &str) -> Result<Pod, ProvisionerError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &self.namespace);
        api.get(name)
            .await
            .map_err(|e| self.map_get_error(e, "Pod", name))
    }

    async fn delete_pod(&self, name: &str) -> Result<(), ProvisionerError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &self.namespace);
        let dp = DeleteParams::default();

        api.delete(name, &dp).await?;
        Ok(())
    }

    async fn create_persistent_volume(
        &self,
        volume: &PersistentVolume,
    ) -> Result<PersistentVolume, ProvisionerError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        let name = volume.metadata.name.as_deref().ok_or_else(|| {
            ProvisionerError::ConfigError("PersistentVolume name is required".to_string())
        })?;

        api.create(&Self::post_params(), volume)
            .await
            .map_err(|e| self.map_create_error(e, "PersistentVolume", name))
    }

    async fn get_persistent_volume(&self, name: &str) -> Result<PersistentVolume, ProvisionerError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        api.get(name)
            .await
            .map_err(|e| self.map_get_error(e, "PersistentVolume", name))
    }

    async fn list_persistent_volumes(&self) -> Result<Vec<PersistentVolume>, ProvisionerError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());

        api.list(&ListParams::default())
            .await
            .map(|list| list.items)
            .map_err(|e| ProvisionerError::KubeError(e.to_string()))
    }

    async fn delete_persistent_volume(&self, name: &str) -> Result<(), ProvisionerError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        let dp = DeleteParams::default();

        api.delete(name, &dp).await?;
        Ok(())
    }
}
