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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, ProvisionerError>;

#[derive(Error, Debug)]
pub enum ProvisionerError {
    #[error("Kubernetes API error: {0}")]
    KubeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {resource_type} '{name}' in namespace '{namespace}'")]
    NotFound {
        resource_type: String,
        name: String,
        namespace: String,
    },

    #[error("Resource already exists: {resource_type} '{name}' in namespace '{namespace}'")]
    AlreadyExists {
        resource_type: String,
        name: String,
        namespace: String,
    },

    #[error("Failed to create helper pod '{name}': {message}")]
    Submission { name: String, message: String },

    #[error("Failed to observe helper pod '{name}': {message}")]
    Observation { name: String, message: String },

    #[error("{action} process timeout after {seconds} seconds (helper pod '{name}')")]
    Timeout {
        action: String,
        name: String,
        seconds: u64,
    },

    #[error("Helper pod '{name}' failed: {message}")]
    HelperFailed { name: String, message: String },

    #[error("Helper pod '{name}' was cancelled before completion")]
    Cancelled { name: String },

    #[error("Invalid persistent volume: {0}")]
    Decode(#[from] DecodeError),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Reasons a PersistentVolume cannot be mapped back to its path and node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no hostPath set")]
    MissingPath,

    #[error("no NodeAffinity set")]
    MissingNodeAffinity,

    #[error("no NodeAffinity.Required set")]
    MissingRequiredTerms,

    #[error("cannot find affinited node")]
    NodeNotFound,

    #[error("expected exactly one value for the node affinity, found {count}")]
    AmbiguousNode { count: usize },
}

impl From<kube::Error> for ProvisionerError {
    fn from(err: kube::Error) -> Self {
        ProvisionerError::KubeError(err.to_string())
    }
}

impl ProvisionerError {
    pub fn not_found(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    pub fn already_exists(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self::AlreadyExists {
            resource_type: resource_type.into(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
