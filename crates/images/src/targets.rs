//! Build targets derived from the tag matrix

use crate::refs::GitRefs;
use serde::Serialize;
use shared::DockerConfig;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Module name that selects the shared base images
pub const BASE_MODULE: &str = "BASE";

/// One image to build, tag and push
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
    /// Repository without tag, e.g. `dunecommunity/dune-gdt-testing_debian_gcc_full`
    pub repo: String,
    pub commit: String,
    pub refname: String,
    /// Docker build context
    pub context_dir: PathBuf,
    /// `--build-arg` pairs in the order they are passed
    pub build_args: Vec<(String, String)>,
}

impl BuildTarget {
    /// `repo:commit`, the tag the build produces
    pub fn commit_tag(&self) -> String {
        format!("{}:{}", self.repo, self.commit)
    }

    /// `repo:refname`, the moving branch tag
    pub fn ref_tag(&self) -> String {
        format!("{}:{}", self.repo, self.refname)
    }
}

fn args(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// One shared base image per distinct (base, cc, cxx)
pub fn base_targets(config: &DockerConfig, refs: &GitRefs) -> Vec<BuildTarget> {
    let combos: BTreeSet<(&str, &str, &str)> = config
        .tag_matrix
        .values()
        .map(|s| (s.base.as_str(), s.cc.as_str(), s.cxx.as_str()))
        .collect();

    combos
        .into_iter()
        .map(|(base, cc, cxx)| BuildTarget {
            repo: format!("{}/dune-xt-docker_base_{}_{}", config.namespace, base, cc),
            commit: refs.commit.clone(),
            refname: refs.refname.clone(),
            context_dir: config.script_dir.join("shared_base"),
            build_args: args(&[
                ("COMMIT", refs.commit.as_str()),
                ("CC", cc),
                ("CXX", cxx),
                ("SUPERURL", refs.superurl.as_str()),
                ("BASE", base),
            ]),
        })
        .collect()
}

/// One testing image per tag-matrix entry for `module`
pub fn module_targets(config: &DockerConfig, module: &str, refs: &GitRefs) -> Vec<BuildTarget> {
    let modules_to_delete = config
        .modules
        .get(module)
        .map(|m| m.modules_to_delete.as_str())
        .unwrap_or_default();

    config
        .tag_matrix
        .iter()
        .map(|(tag, settings)| BuildTarget {
            repo: format!("{}/{}-testing_{}", config.namespace, module, tag),
            commit: refs.commit.clone(),
            refname: refs.refname.clone(),
            context_dir: config.script_dir.join("individual_base"),
            build_args: args(&[
                ("COMMIT", refs.commit.as_str()),
                ("CC", settings.cc.as_str()),
                ("project_name", module),
                ("modules_to_delete", modules_to_delete),
                ("BASE", settings.base.as_str()),
            ]),
        })
        .collect()
}

/// Targets for `module`, or the base images for `BASE`
pub fn targets_for(config: &DockerConfig, module: &str, refs: &GitRefs) -> Vec<BuildTarget> {
    if module == BASE_MODULE {
        base_targets(config, refs)
    } else {
        module_targets(config, module, refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ModuleSettings;

    fn refs() -> GitRefs {
        GitRefs {
            commit: "abc123".to_string(),
            refname: "master".to_string(),
            superurl: "https://example.org/super.git".to_string(),
        }
    }

    #[test]
    fn test_base_targets_deduplicate_compilers() {
        let config = DockerConfig::default();
        let targets = base_targets(&config, &refs());

        // debian-unstable/gcc, debian/clang, debian/gcc
        assert_eq!(targets.len(), 3);
        let repos: Vec<&str> = targets.iter().map(|t| t.repo.as_str()).collect();
        assert_eq!(
            repos,
            vec![
                "dunecommunity/dune-xt-docker_base_debian_clang",
                "dunecommunity/dune-xt-docker_base_debian_gcc",
                "dunecommunity/dune-xt-docker_base_debian-unstable_gcc",
            ]
        );

        let clang = &targets[0];
        assert_eq!(clang.context_dir, PathBuf::from(".ci/docker/shared_base"));
        assert_eq!(clang.build_args[2], ("CXX".to_string(), "clang++".to_string()));
        assert_eq!(clang.build_args[3].1, "https://example.org/super.git");
        assert_eq!(clang.commit_tag(), "dunecommunity/dune-xt-docker_base_debian_clang:abc123");
    }

    #[test]
    fn test_module_targets_per_tag() {
        let mut config = DockerConfig::default();
        config.modules.insert(
            "dune-gdt".to_string(),
            ModuleSettings {
                modules_to_delete: "dune-xt-data".to_string(),
            },
        );

        let targets = module_targets(&config, "dune-gdt", &refs());
        assert_eq!(targets.len(), 3);

        let target = targets
            .iter()
            .find(|t| t.repo == "dunecommunity/dune-gdt-testing_debian_clang_full")
            .unwrap();
        assert_eq!(target.context_dir, PathBuf::from(".ci/docker/individual_base"));
        assert_eq!(
            target.build_args,
            vec![
                ("COMMIT".to_string(), "abc123".to_string()),
                ("CC".to_string(), "clang".to_string()),
                ("project_name".to_string(), "dune-gdt".to_string()),
                ("modules_to_delete".to_string(), "dune-xt-data".to_string()),
                ("BASE".to_string(), "debian".to_string()),
            ]
        );
        assert_eq!(target.ref_tag(), "dunecommunity/dune-gdt-testing_debian_clang_full:master");
    }

    #[test]
    fn test_targets_for_dispatch() {
        let config = DockerConfig::default();
        let base = targets_for(&config, BASE_MODULE, &refs());
        assert!(base.iter().all(|t| t.repo.contains("docker_base_")));

        let module = targets_for(&config, "dune-xt", &refs());
        assert!(module.iter().all(|t| t.repo.starts_with("dunecommunity/dune-xt-testing_")));
        // unknown modules delete nothing
        assert!(module.iter().all(|t| t.build_args[3].1.is_empty()));
    }
}
