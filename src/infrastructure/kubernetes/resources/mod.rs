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

//! Kubernetes resource builders

pub mod helper_pod;
pub mod persistent_volume;
pub mod traits;

pub use self::helper_pod::{helper_pod_name, HelperPodBuilder};
pub use self::persistent_volume::PersistentVolumeBuilder;
pub use self::traits::LabeledResourceBuilder;
