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

use crate::infrastructure::constants::{
    APP_NAME, LABEL_APP, LABEL_COMPONENT, LABEL_TYPE, LABEL_TYPE_VALUE,
};
use std::collections::BTreeMap;

pub trait LabeledResourceBuilder {
    fn component_name(&self) -> &'static str;

    fn get_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_APP.to_string(), APP_NAME.to_string());
        labels.insert(LABEL_COMPONENT.to_string(), self.component_name().to_string());
        labels.insert(LABEL_TYPE.to_string(), LABEL_TYPE_VALUE.to_string());
        labels
    }
}
