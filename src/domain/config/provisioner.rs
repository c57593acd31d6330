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

use crate::infrastructure::constants::*;
use crate::shared::error::{ProvisionerError, Result};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;

/// What the orchestrator does when a helper pod reaches phase `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep polling until the attempt ceiling; the pod may still be replaced or retried externally.
    #[default]
    Wait,
    /// Abort as soon as the pod is observed in phase `Failed`.
    FailFast,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Wait => "wait",
            FailurePolicy::FailFast => "fail-fast",
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = ProvisionerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "wait" => Ok(FailurePolicy::Wait),
            "fail-fast" => Ok(FailurePolicy::FailFast),
            _ => Err(ProvisionerError::ConfigError(format!(
                "Invalid failure policy: {}",
                s
            ))),
        }
    }
}

/// Provisioner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    pub provisioner_name: String,
    pub base_dir: String,
    pub namespace: String,
    pub helper: HelperConfig,
}

/// Helper pod configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperConfig {
    pub image: String,
    pub image_pull_policy: String,
    pub name_prefix: String,
    pub poll_interval_ms: u64,
    pub poll_attempts: u32,
    pub failure_policy: FailurePolicy,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            provisioner_name: DEFAULT_PROVISIONER_NAME.to_string(),
            base_dir: DEFAULT_BASE_DIR.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            helper: HelperConfig::default(),
        }
    }
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_HELPER_IMAGE.to_string(),
            image_pull_policy: DEFAULT_IMAGE_PULL_POLICY.to_string(),
            name_prefix: DEFAULT_HELPER_NAME_PREFIX.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl HelperConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Total time budget for one helper run, rounded to whole seconds.
    pub fn timeout_seconds(&self) -> u64 {
        self.poll_interval_ms.saturating_mul(self.poll_attempts as u64) / 1000
    }
}

impl ProvisionerConfig {
    /// Load configuration from TOML file
    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            ProvisionerError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let conf: Self = toml::from_str(&content)?;
        Ok(conf)
    }

    /// Applies `POD_NAMESPACE` when it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(ns) = std::env::var(POD_NAMESPACE_ENV) {
            self.apply_namespace_override(Some(ns));
        }
        self
    }

    pub(crate) fn apply_namespace_override(&mut self, namespace: Option<String>) {
        if let Some(ns) = namespace.filter(|ns| !ns.is_empty()) {
            self.namespace = ns;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.provisioner_name.trim().is_empty() {
            return Err(ProvisionerError::ConfigError(
                "provisioner_name must not be empty".to_string(),
            ));
        }

        let base_dir = Path::new(&self.base_dir);
        if !base_dir.is_absolute() {
            return Err(ProvisionerError::ConfigError(format!(
                "base_dir must be an absolute path: {}",
                self.base_dir
            )));
        }
        if base_dir.parent().is_none() {
            return Err(ProvisionerError::ConfigError(
                "base_dir must not be the filesystem root".to_string(),
            ));
        }

        if !is_valid_k8s_name(&self.namespace) || self.namespace.len() > 63 {
            return Err(ProvisionerError::ConfigError(format!(
                "Invalid namespace: {}",
                self.namespace
            )));
        }

        if self.helper.image.trim().is_empty() {
            return Err(ProvisionerError::ConfigError(
                "helper.image must not be empty".to_string(),
            ));
        }

        if !is_valid_k8s_name(&self.helper.name_prefix) {
            return Err(ProvisionerError::ConfigError(format!(
                "Invalid helper.name_prefix: {}",
                self.helper.name_prefix
            )));
        }

        let valid_policies = ["Always", "IfNotPresent", "Never"];
        if !valid_policies.contains(&self.helper.image_pull_policy.as_str()) {
            return Err(ProvisionerError::ConfigError(format!(
                "Invalid helper.image_pull_policy: {}",
                self.helper.image_pull_policy
            )));
        }

        if self.helper.poll_attempts == 0 {
            return Err(ProvisionerError::ConfigError(
                "helper.poll_attempts must be > 0".to_string(),
            ));
        }

        if self.helper.poll_interval_ms == 0 {
            return Err(ProvisionerError::ConfigError(
                "helper.poll_interval_ms must be > 0".to_string(),
            ));
        }

        let budget_ms = self
            .helper
            .poll_interval_ms
            .checked_mul(self.helper.poll_attempts as u64);
        if budget_ms.map_or(true, |ms| ms / 1000 > MAX_HELPER_TIMEOUT_SECONDS) {
            return Err(ProvisionerError::ConfigError(format!(
                "helper.poll_interval_ms * helper.poll_attempts must not exceed {} seconds",
                MAX_HELPER_TIMEOUT_SECONDS
            )));
        }

        Ok(())
    }
}

pub(crate) fn is_valid_k8s_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 253 {
        return false;
    }

    if !name.chars().next().unwrap_or(' ').is_ascii_alphanumeric() {
        return false;
    }
    if !name.chars().last().unwrap_or(' ').is_ascii_alphanumeric() {
        return false;
    }

    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
