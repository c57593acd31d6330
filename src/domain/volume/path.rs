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

use crate::shared::error::{ProvisionerError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn safe_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^/[A-Za-z0-9._/-]+$").expect("static regex is valid"))
}

/// Directory backing a claim: `<base_dir>/<pv>_<claim namespace>_<claim name>`.
pub fn volume_path(base_dir: &str, pv_name: &str, pvc_namespace: &str, pvc_name: &str) -> String {
    let folder_name = [pv_name, pvc_namespace, pvc_name].join("_");
    Path::new(base_dir)
        .join(folder_name)
        .to_string_lossy()
        .into_owned()
}

/// The path ends up inside `sh -c`, so it must stay strictly below `base_dir`
/// and only contain characters that need no quoting.
pub fn validate_volume_path(base_dir: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ProvisionerError::ValidationError(
            "volume path is empty".to_string(),
        ));
    }

    if !safe_path_pattern().is_match(path) {
        return Err(ProvisionerError::ValidationError(format!(
            "volume path '{}' must be absolute and contain only [A-Za-z0-9._/-]",
            path
        )));
    }

    // `Path::components` drops inner `.` segments, so check the raw string.
    if path.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(ProvisionerError::ValidationError(format!(
            "volume path '{}' must not contain '.' or '..' components",
            path
        )));
    }

    let candidate = Path::new(path);
    let base = Path::new(base_dir);
    if !candidate.starts_with(base) || candidate == base {
        return Err(ProvisionerError::ValidationError(format!(
            "volume path '{}' is not below base directory '{}'",
            path, base_dir
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "/var/nodepath-provisioner";

    #[test]
    fn test_volume_path() {
        assert_eq!(
            volume_path(BASE, "pvc-1234", "default", "data"),
            "/var/nodepath-provisioner/pvc-1234_default_data"
        );
    }

    #[test]
    fn test_accepts_paths_below_base() {
        assert!(validate_volume_path(BASE, "/var/nodepath-provisioner/pvc-1_ns_claim").is_ok());
        assert!(validate_volume_path(BASE, "/var/nodepath-provisioner/a/b.c").is_ok());
    }

    #[test]
    fn test_rejects_unsafe_paths() {
        for path in [
            "",
            "relative/path",
            "/var/nodepath-provisioner",
            "/var/nodepath-provisioner/",
            "/var/other/pvc-1",
            "/var/nodepath-provisioner-evil/pvc-1",
            "/var/nodepath-provisioner/../../etc",
            "/var/nodepath-provisioner/./pvc",
            "/var/nodepath-provisioner/pvc; rm -rf /",
            "/var/nodepath-provisioner/$(reboot)",
        ] {
            assert!(
                validate_volume_path(BASE, path).is_err(),
                "expected '{}' to be rejected",
                path
            );
        }
    }
}
