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

use crate::infrastructure::kubernetes::NodePathKubeClient;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Owns a submitted helper pod until it is deleted.
///
/// Call [`HelperPodGuard::release`] on every normal exit path. If the guard is
/// dropped without being released (the owning future was dropped), the delete
/// is spawned onto the current Tokio runtime instead.
pub struct HelperPodGuard {
    client: Arc<dyn NodePathKubeClient>,
    name: String,
    released: bool,
}

impl HelperPodGuard {
    pub fn new(client: Arc<dyn NodePathKubeClient>, name: String) -> Self {
        Self {
            client,
            name,
            released: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deletes the pod. Failures are logged and never returned.
    ///
    /// If this future is dropped before the delete completes, `Drop` issues it again.
    pub async fn release(mut self) {
        delete_helper_pod(self.client.as_ref(), &self.name).await;
        self.released = true;
    }
}

impl Drop for HelperPodGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let client = Arc::clone(&self.client);
        let name = std::mem::take(&mut self.name);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    delete_helper_pod(client.as_ref(), &name).await;
                });
            }
            Err(_) => {
                warn!(pod = %name, "no async runtime available, helper pod left behind");
            }
        }
    }
}

async fn delete_helper_pod(client: &dyn NodePathKubeClient, name: &str) {
    match client.delete_pod(name).await {
        Ok(()) => debug!(pod = %name, "helper pod deleted"),
        Err(e) => error!(pod = %name, "unable to delete the helper pod: {}", e),
    }
}
