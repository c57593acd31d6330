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

//! `-D key=value` overrides applied on top of the file and flag configuration.

use crate::domain::config::provisioner::{FailurePolicy, ProvisionerConfig};
use crate::shared::error::{ProvisionerError, Result};
use std::collections::HashMap;

/// Parse dynamic configuration properties from -D key=value format
pub fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();

    for config in configs {
        let (key, value) = config.split_once('=').ok_or_else(|| {
            ProvisionerError::ConfigError(format!(
                "Invalid config format: '{}'. Expected 'key=value'",
                config
            ))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(ProvisionerError::ConfigError(format!(
                "Empty key in config: '{}'",
                config
            )));
        }

        map.insert(key.to_string(), value.trim().to_string());
    }

    Ok(map)
}

pub fn apply_to_provisioner_config(
    configs: &HashMap<String, String>,
    config: &mut ProvisionerConfig,
) -> Result<()> {
    if let Some(name) = configs.get("provisioner.name") {
        config.provisioner_name = name.clone();
    }

    if let Some(base_dir) = configs.get("provisioner.base-dir") {
        config.base_dir = base_dir.clone();
    }

    if let Some(namespace) = configs.get("provisioner.namespace") {
        config.namespace = namespace.clone();
    }

    if let Some(image) = configs.get("provisioner.helper.image") {
        config.helper.image = image.clone();
    }

    if let Some(policy) = configs.get("provisioner.helper.image-pull-policy") {
        config.helper.image_pull_policy = policy.clone();
    }

    if let Some(prefix) = configs.get("provisioner.helper.name-prefix") {
        config.helper.name_prefix = prefix.clone();
    }

    if let Some(interval) = configs.get("provisioner.helper.poll-interval-ms") {
        config.helper.poll_interval_ms = interval.parse::<u64>().map_err(|e| {
            ProvisionerError::ConfigError(format!(
                "Invalid provisioner.helper.poll-interval-ms '{}': {}",
                interval, e
            ))
        })?;
    }

    if let Some(attempts) = configs.get("provisioner.helper.poll-attempts") {
        config.helper.poll_attempts = attempts.parse::<u32>().map_err(|e| {
            ProvisionerError::ConfigError(format!(
                "Invalid provisioner.helper.poll-attempts '{}': {}",
                attempts, e
            ))
        })?;
    }

    if let Some(policy) = configs.get("provisioner.helper.failure-policy") {
        config.helper.failure_policy = policy.parse::<FailurePolicy>()?;
    }

    Ok(())
}
