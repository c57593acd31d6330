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

/// Provisioner identity
pub const DEFAULT_PROVISIONER_NAME: &str = "example.io/nodepath-provisioner";
pub const APP_NAME: &str = "nodepath-provisioner";

/// Base directory on every node that holds provisioned volumes
pub const DEFAULT_BASE_DIR: &str = "/var/nodepath-provisioner";

/// Namespace resolution
pub const DEFAULT_NAMESPACE: &str = "default";
pub const POD_NAMESPACE_ENV: &str = "POD_NAMESPACE";
pub const CONFIG_FILE_ENV: &str = "NODEPATH_PROVISIONER_CONFIG";

/// Helper pod settings
pub const DEFAULT_HELPER_IMAGE: &str = "busybox:stable";
pub const DEFAULT_HELPER_NAME_PREFIX: &str = "nodepath-provisioner-helper";
pub const DEFAULT_IMAGE_PULL_POLICY: &str = "IfNotPresent";
pub const HELPER_CONTAINER_NAME: &str = "provisioner";
pub const HELPER_VOLUME_NAME: &str = "hostpath-volume";
pub const MAX_HELPER_NAME_LENGTH: usize = 128;

/// Helper pod polling
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_POLL_ATTEMPTS: u32 = 120;
pub const MAX_HELPER_TIMEOUT_SECONDS: u64 = 24 * 60 * 60;

/// Pod phases and policies
pub const POD_PHASE_SUCCEEDED: &str = "Succeeded";
pub const POD_PHASE_FAILED: &str = "Failed";
pub const RESTART_POLICY_NEVER: &str = "Never";

/// Persistent volume settings
pub const RECLAIM_POLICY_RETAIN: &str = "Retain";
pub const RECLAIM_POLICY_DELETE: &str = "Delete";
pub const VOLUME_MODE_FILESYSTEM: &str = "Filesystem";
pub const VOLUME_TYPE_DIRECTORY_OR_CREATE: &str = "DirectoryOrCreate";
pub const RESOURCE_STORAGE: &str = "storage";
pub const DEFAULT_ACCESS_MODE: &str = "ReadWriteOnce";
pub const DEFAULT_STORAGE_SIZE: &str = "1Gi";
pub const ANNOTATION_PROVISIONED_BY: &str = "pv.kubernetes.io/provisioned-by";

/// Node affinity
pub const LABEL_HOSTNAME: &str = "kubernetes.io/hostname";
pub const NODE_SELECTOR_OP_IN: &str = "In";

/// Resource labels
pub const LABEL_APP: &str = "app";
pub const LABEL_COMPONENT: &str = "component";
pub const LABEL_TYPE: &str = "type";
pub const LABEL_TYPE_VALUE: &str = "nodepath-provisioner";
pub const LABEL_ACTION: &str = "action";

/// Components
pub const COMPONENT_HELPER: &str = "helper";
pub const COMPONENT_VOLUME: &str = "volume";

/// Field manager used for server-side requests
pub const FIELD_MANAGER: &str = "nodepath-provisioner";
