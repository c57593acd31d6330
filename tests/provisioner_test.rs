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

use k8s_openapi::api::core::v1::{PersistentVolume, Pod, PodSpec, PodStatus};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use nodepath_provisioner::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const BASE: &str = "/var/nodepath-provisioner";

/// What the fake API server answers to one `get_pod` call.
#[derive(Clone)]
enum Step {
    Pending,
    Succeeded(Option<&'static str>),
    Failed,
    Error,
}

#[derive(Clone, Copy, PartialEq)]
enum CreateBehavior {
    Accept,
    AlreadyExists,
    Reject,
}

struct MockState {
    create_behavior: CreateBehavior,
    script: VecDeque<Step>,
    created: Vec<Pod>,
    deleted: Vec<String>,
    gets: usize,
}

struct MockKubeClient {
    state: Mutex<MockState>,
}

impl MockKubeClient {
    fn new(create_behavior: CreateBehavior, script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState {
                create_behavior,
                script: script.into(),
                created: Vec::new(),
                deleted: Vec::new(),
                gets: 0,
            }),
        })
    }

    fn created(&self) -> Vec<Pod> {
        self.state.lock().unwrap().created.clone()
    }

    fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    fn gets(&self) -> usize {
        self.state.lock().unwrap().gets
    }
}

#[async_trait::async_trait]
impl NodePathKubeClient for MockKubeClient {
    fn namespace(&self) -> &str {
        "default"
    }

    async fn create_pod(&self, pod: &Pod) -> std::result::Result<(), ProvisionerError> {
        let mut state = self.state.lock().unwrap();
        let name = pod.metadata.name.clone().unwrap_or_default();
        match state.create_behavior {
            CreateBehavior::Accept => {
                state.created.push(pod.clone());
                Ok(())
            }
            CreateBehavior::AlreadyExists => {
                Err(ProvisionerError::already_exists("Pod", name, "default"))
            }
            CreateBehavior::Reject => Err(ProvisionerError::KubeError(
                "admission webhook denied the request".to_string(),
            )),
        }
    }

    async fn get_pod(&self, name: &str) -> std::result::Result<Pod, ProvisionerError> {
        let mut state = self.state.lock().unwrap();
        state.gets += 1;
        let step = state.script.pop_front().unwrap_or(Step::Pending);

        let mut pod = state
            .created
            .iter()
            .find(|p| p.metadata.name.as_deref() == Some(name))
            .cloned()
            .unwrap_or_default();

        let phase = match step {
            Step::Pending => "Pending",
            Step::Succeeded(node) => {
                let spec = pod.spec.get_or_insert_with(PodSpec::default);
                spec.node_name = node.map(str::to_string);
                "Succeeded"
            }
            Step::Failed => "Failed",
            Step::Error => {
                return Err(ProvisionerError::KubeError(
                    "connection refused".to_string(),
                ))
            }
        };
        pod.status = Some(PodStatus {
            phase: Some(phase.to_string()),
            reason: (phase == "Failed").then(|| "Error".to_string()),
            ..Default::default()
        });

        Ok(pod)
    }

    async fn delete_pod(&self, name: &str) -> std::result::Result<(), ProvisionerError> {
        self.state.lock().unwrap().deleted.push(name.to_string());
        Ok(())
    }

    async fn create_persistent_volume(
        &self,
        volume: &PersistentVolume,
    ) -> std::result::Result<PersistentVolume, ProvisionerError> {
        Ok(volume.clone())
    }

    async fn get_persistent_volume(
        &self,
        name: &str,
    ) -> std::result::Result<PersistentVolume, ProvisionerError> {
        Err(ProvisionerError::not_found("PersistentVolume", name, ""))
    }

    async fn list_persistent_volumes(
        &self,
    ) -> std::result::Result<Vec<PersistentVolume>, ProvisionerError> {
        Ok(Vec::new())
    }

    async fn delete_persistent_volume(&self, _name: &str) -> std::result::Result<(), ProvisionerError> {
        Ok(())
    }
}

fn test_config(failure_policy: FailurePolicy) -> ProvisionerConfig {
    let mut config = ProvisionerConfig::default();
    config.helper.poll_interval_ms = 10;
    config.helper.poll_attempts = 5;
    config.helper.failure_policy = failure_policy;
    config
}

fn orchestrator(mock: &Arc<MockKubeClient>, failure_policy: FailurePolicy) -> HelperPodOrchestrator {
    let client: Arc<dyn NodePathKubeClient> = mock.clone();
    HelperPodOrchestrator::new(client, test_config(failure_policy)).unwrap()
}

fn provisioner(mock: &Arc<MockKubeClient>) -> NodePathProvisioner {
    NodePathProvisioner::with_orchestrator(orchestrator(mock, FailurePolicy::Wait))
}

fn command_of(pod: &Pod) -> Vec<String> {
    pod.spec.as_ref().unwrap().containers[0]
        .command
        .clone()
        .unwrap()
}

fn provisioned_volume(reclaim_policy: &str) -> PersistentVolume {
    PersistentVolumeBuilder::new(
        "pvc-1".to_string(),
        format!("{}/pvc-1_default_data", BASE),
        "node-7".to_string(),
        Quantity("1Gi".to_string()),
        "example.io/nodepath-provisioner".to_string(),
    )
    .reclaim_policy(reclaim_policy.to_string())
    .build()
}

#[tokio::test]
async fn test_provision_records_node_the_helper_ran_on() {
    let mock = MockKubeClient::new(
        CreateBehavior::Accept,
        vec![Step::Pending, Step::Succeeded(Some("node-b"))],
    );
    let options = ProvisionOptions {
        selected_node: Some("node-a".to_string()),
        ..ProvisionOptions::new("pvc-1", "default", "data")
    };

    let (volume, state) = provisioner(&mock).provision(&options).await.unwrap();
    assert_eq!(state, ProvisioningState::Finished);

    let placement = decode_placement(&volume).unwrap();
    assert_eq!(placement.node, "node-b");
    assert_eq!(placement.path, format!("{}/pvc-1_default_data", BASE));

    let created = mock.created();
    assert_eq!(created.len(), 1);
    let pod = &created[0];
    assert_eq!(pod.spec.as_ref().unwrap().node_name.as_deref(), Some("node-a"));
    assert_eq!(
        command_of(pod),
        vec![
            "sh".to_string(),
            "-c".to_string(),
            format!("mkdir -m 0777 -p {}/pvc-1_default_data", BASE),
        ]
    );

    assert_eq!(
        mock.deleted(),
        vec!["nodepath-provisioner-helper-create-pvc-1".to_string()]
    );
    assert_eq!(mock.gets(), 2);
}

#[tokio::test]
async fn test_provision_without_selected_node_is_unpinned() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![Step::Succeeded(Some("node-c"))]);
    let options = ProvisionOptions::new("pvc-2", "apps", "cache");

    let (volume, _) = provisioner(&mock).provision(&options).await.unwrap();

    assert_eq!(mock.created()[0].spec.as_ref().unwrap().node_name, None);
    assert_eq!(decode_placement(&volume).unwrap().node, "node-c");
}

#[tokio::test]
async fn test_existing_helper_pod_is_observed() {
    let mock = MockKubeClient::new(
        CreateBehavior::AlreadyExists,
        vec![Step::Succeeded(Some("node-1"))],
    );

    let node = orchestrator(&mock, FailurePolicy::Wait)
        .run(Action::Create, "pvc-1", &format!("{}/pvc-1", BASE), Some("node-1"))
        .await
        .unwrap();

    assert_eq!(node, "node-1");
    assert_eq!(mock.gets(), 1);
    assert_eq!(mock.deleted().len(), 1);
}

#[tokio::test]
async fn test_submission_failure_skips_polling_and_cleanup() {
    let mock = MockKubeClient::new(CreateBehavior::Reject, vec![]);

    let err = orchestrator(&mock, FailurePolicy::Wait)
        .run(Action::Create, "pvc-1", &format!("{}/pvc-1", BASE), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionerError::Submission { .. }));
    assert!(err.to_string().contains("admission webhook"));
    assert_eq!(mock.gets(), 0);
    assert!(mock.deleted().is_empty());
}

#[tokio::test]
async fn test_timeout_after_attempt_ceiling_deletes_pod() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![]);

    let err = orchestrator(&mock, FailurePolicy::Wait)
        .run(Action::Delete, "pvc-1", &format!("{}/pvc-1", BASE), Some("node-1"))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(err.to_string().starts_with("delete process timeout after"));
    assert_eq!(mock.gets(), 5);
    assert_eq!(
        mock.deleted(),
        vec!["nodepath-provisioner-helper-delete-pvc-1".to_string()]
    );
}

#[tokio::test]
async fn test_observation_error_still_deletes_pod() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![Step::Pending, Step::Error]);

    let err = orchestrator(&mock, FailurePolicy::Wait)
        .run(Action::Create, "pvc-1", &format!("{}/pvc-1", BASE), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionerError::Observation { .. }));
    assert_eq!(mock.gets(), 2);
    assert_eq!(mock.deleted().len(), 1);
}

#[tokio::test]
async fn test_succeeded_without_node_is_an_error() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![Step::Succeeded(None)]);

    let err = orchestrator(&mock, FailurePolicy::Wait)
        .run(Action::Create, "pvc-1", &format!("{}/pvc-1", BASE), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionerError::Observation { .. }));
    assert_eq!(mock.deleted().len(), 1);
}

#[tokio::test]
async fn test_failed_pod_keeps_waiting_by_default() {
    let mock = MockKubeClient::new(
        CreateBehavior::Accept,
        vec![Step::Failed, Step::Succeeded(Some("node-2"))],
    );

    let node = orchestrator(&mock, FailurePolicy::Wait)
        .run(Action::Create, "pvc-1", &format!("{}/pvc-1", BASE), None)
        .await
        .unwrap();

    assert_eq!(node, "node-2");
    assert_eq!(mock.gets(), 2);
}

#[tokio::test]
async fn test_fail_fast_stops_on_failed_pod() {
    let mock = MockKubeClient::new(
        CreateBehavior::Accept,
        vec![Step::Failed, Step::Succeeded(Some("node-2"))],
    );

    let err = orchestrator(&mock, FailurePolicy::FailFast)
        .run(Action::Create, "pvc-1", &format!("{}/pvc-1", BASE), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionerError::HelperFailed { .. }));
    assert!(err.to_string().contains("Error"));
    assert_eq!(mock.gets(), 1);
    assert_eq!(mock.deleted().len(), 1);
}

#[tokio::test]
async fn test_cancelled_before_start_submits_nothing() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = orchestrator(&mock, FailurePolicy::Wait)
        .run_with_cancellation(
            Action::Create,
            "pvc-1",
            &format!("{}/pvc-1", BASE),
            None,
            &cancel,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionerError::Cancelled { .. }));
    assert!(mock.created().is_empty());
    assert_eq!(mock.gets(), 0);
    assert!(mock.deleted().is_empty());
}

#[tokio::test]
async fn test_cancelled_provision_deletes_pod() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![]);
    let client: Arc<dyn NodePathKubeClient> = mock.clone();
    let mut config = test_config(FailurePolicy::Wait);
    config.helper.poll_interval_ms = 60_000;

    let cancel = CancellationToken::new();
    let provisioner = NodePathProvisioner::new(client, config)
        .unwrap()
        .with_cancellation(cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = provisioner
        .provision(&ProvisionOptions::new("pvc-1", "default", "data"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionerError::Cancelled { .. }));
    assert_eq!(mock.created().len(), 1);
    assert_eq!(mock.gets(), 1);
    assert_eq!(
        mock.deleted(),
        vec!["nodepath-provisioner-helper-create-pvc-1".to_string()]
    );
}

#[tokio::test]
async fn test_orchestrator_rejects_invalid_config() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![]);
    let client: Arc<dyn NodePathKubeClient> = mock.clone();
    let mut config = test_config(FailurePolicy::Wait);
    config.base_dir = "/".to_string();

    let err = HelperPodOrchestrator::new(client, config).err().unwrap();
    assert!(matches!(err, ProvisionerError::ConfigError(_)));
    assert!(mock.created().is_empty());
}

#[tokio::test]
async fn test_dropped_run_still_deletes_pod() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![]);
    let client: Arc<dyn NodePathKubeClient> = mock.clone();
    let mut config = test_config(FailurePolicy::Wait);
    config.helper.poll_interval_ms = 60_000;
    let orchestrator = HelperPodOrchestrator::new(client, config).unwrap();
    let path = format!("{}/pvc-1", BASE);

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        orchestrator.run(Action::Create, "pvc-1", &path, None),
    )
    .await;
    assert!(outcome.is_err());

    // the delete runs on a spawned task
    for _ in 0..20 {
        if !mock.deleted().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(
        mock.deleted(),
        vec!["nodepath-provisioner-helper-create-pvc-1".to_string()]
    );
}

#[tokio::test]
async fn test_unsafe_path_is_never_submitted() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![]);
    let orchestrator = orchestrator(&mock, FailurePolicy::Wait);

    for path in [
        "/etc/passwd",
        "/var/nodepath-provisioner/../etc",
        "/var/nodepath-provisioner/a; rm -rf /",
        "",
    ] {
        let err = orchestrator
            .run(Action::Delete, "pvc-1", path, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionerError::ValidationError(_)), "{}", path);
    }

    assert!(mock.created().is_empty());
    assert!(mock.deleted().is_empty());
}

#[tokio::test]
async fn test_long_volume_name_gives_bounded_pod_name() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![Step::Succeeded(Some("node-1"))]);
    let volume_name = "v".repeat(200);

    orchestrator(&mock, FailurePolicy::Wait)
        .run(
            Action::Create,
            &volume_name,
            &format!("{}/{}", BASE, volume_name),
            None,
        )
        .await
        .unwrap();

    let name = mock.created()[0].metadata.name.clone().unwrap();
    assert_eq!(name.len(), 128);
    assert!(name.starts_with("nodepath-provisioner-helper-create-v"));
    assert_eq!(mock.deleted(), vec![name]);
}

#[tokio::test]
async fn test_delete_runs_on_recorded_node() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![Step::Succeeded(Some("node-7"))]);

    provisioner(&mock)
        .delete(&provisioned_volume("Delete"))
        .await
        .unwrap();

    let created = mock.created();
    assert_eq!(created.len(), 1);
    assert_eq!(
        created[0].spec.as_ref().unwrap().node_name.as_deref(),
        Some("node-7")
    );
    assert_eq!(
        command_of(&created[0])[2],
        format!("rm -rf {}/pvc-1_default_data", BASE)
    );
    assert_eq!(mock.deleted().len(), 1);
}

#[tokio::test]
async fn test_delete_with_retain_keeps_data() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![]);

    provisioner(&mock)
        .delete(&provisioned_volume("Retain"))
        .await
        .unwrap();

    assert!(mock.created().is_empty());
    assert_eq!(mock.gets(), 0);
}

#[tokio::test]
async fn test_delete_rejects_volume_without_placement() {
    let mock = MockKubeClient::new(CreateBehavior::Accept, vec![]);
    let mut volume = provisioned_volume("Retain");
    volume.spec.as_mut().unwrap().node_affinity = None;

    let err = provisioner(&mock).delete(&volume).await.unwrap_err();

    assert!(err.is_decode());
    assert!(matches!(
        err,
        ProvisionerError::Decode(DecodeError::MissingNodeAffinity)
    ));
    assert!(mock.created().is_empty());
}
