//! dune-ci ci-config command

use crate::context::{success, Context};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CiConfigCommand {
    /// Pipeline template (YAML)
    #[arg(short, long)]
    pub template: PathBuf,

    /// Generated pipeline file
    #[arg(short, long, default_value = ".gitlab-ci.yml")]
    pub output: PathBuf,

    /// Project name substituted for the project token
    #[arg(short, long)]
    pub project: Option<String>,
}

impl CiConfigCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let mut matrix = ctx.config.matrix.clone();
        if let Some(project) = &self.project {
            matrix.project = project.clone();
        }

        let summary = pipeline::generate(&ctx.path(&self.template), &ctx.path(&self.output), &matrix)?;

        if ctx.json {
            ctx.print_json(&summary)?;
        } else {
            success(format!(
                "{}: {} matrix jobs, {} wheel jobs",
                summary.output.display(),
                summary.matrix_jobs,
                summary.wheel_jobs
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ToolConfig;
    use std::collections::BTreeMap;

    #[test]
    fn test_generates_pipeline_for_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("template.yml"),
            "job:\n  name: \"{{ compiler.cc }} {{ subdir | slug }} {{ kind }}\"\n  body:\n    image: DUNE_XT_OR_DUNE_GDT:{{ compiler.cc }}\n",
        )
        .unwrap();

        let ctx = Context::new(ToolConfig::default(), BTreeMap::new(), dir.path(), false);
        let cmd = CiConfigCommand {
            template: PathBuf::from("template.yml"),
            output: PathBuf::from("out/.gitlab-ci.yml"),
            project: Some("dune-gdt".to_string()),
        };
        cmd.run(&ctx).unwrap();

        let text = std::fs::read_to_string(dir.path().join("out/.gitlab-ci.yml")).unwrap();
        assert!(text.contains("dune-gdt:gcc"));
        assert!(!text.contains("DUNE_XT_OR_DUNE_GDT"));
    }

    #[test]
    fn test_missing_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(ToolConfig::default(), BTreeMap::new(), dir.path(), true);
        let cmd = CiConfigCommand {
            template: PathBuf::from("nope.yml"),
            output: PathBuf::from("out.yml"),
            project: None,
        };
        assert!(cmd.run(&ctx).is_err());
    }
}
