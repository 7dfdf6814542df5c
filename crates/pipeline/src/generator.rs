//! Pipeline generator - template + matrix -> CI config YAML

use crate::matrix::BuildMatrix;
use crate::template::{render_str, render_value};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_yaml::Mapping;
use shared::{DuneCiError, MatrixConfig, Result};
use std::path::{Path, PathBuf};

/// Template for one family of jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTemplate {
    /// Job name; must render to a unique key
    pub name: String,

    /// Job definition, rendered once per matrix entry
    pub body: serde_yaml::Value,
}

/// Pipeline template file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineTemplate {
    /// Copied to the top of the pipeline (stages, variables, defaults)
    #[serde(default)]
    pub header: Mapping,

    /// One job per compiler x image x subdir x kind
    pub job: JobTemplate,

    /// One job per python x wheel step
    #[serde(default)]
    pub wheel: Option<JobTemplate>,

    /// Fixed jobs appended after the matrix jobs
    #[serde(default)]
    pub extra: Mapping,
}

impl PipelineTemplate {
    /// Parse a template, replacing the project token first
    pub fn from_yaml_str(text: &str, project_token: &str, project: &str) -> Result<Self> {
        let text = if project_token.is_empty() {
            text.to_string()
        } else {
            text.replace(project_token, project)
        };
        let template: Self = serde_yaml::from_str(&text)?;
        Ok(template)
    }

    /// Load a template file
    pub fn from_file(path: &Path, project_token: &str, project: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text, project_token, project)
    }
}

fn insert_unique(doc: &mut Mapping, key: serde_yaml::Value, value: serde_yaml::Value) -> Result<()> {
    if doc.contains_key(&key) {
        let name = key.as_str().map(str::to_string).unwrap_or_else(|| format!("{:?}", key));
        return Err(DuneCiError::Template(format!("duplicate job name '{}'", name)));
    }
    doc.insert(key, value);
    Ok(())
}

fn render_job(job: &JobTemplate, ctx: &Value) -> Result<(serde_yaml::Value, serde_yaml::Value)> {
    let name = render_str(&job.name, ctx)?;
    let body = render_value(&job.body, ctx)?;
    Ok((serde_yaml::Value::String(name), body))
}

/// Render the full pipeline document
///
/// Order: header, matrix jobs, wheel jobs, extra jobs.
pub fn render_pipeline(template: &PipelineTemplate, matrix: &BuildMatrix) -> Result<Mapping> {
    let global = matrix.global_context();
    let mut doc = Mapping::new();

    for (k, v) in &template.header {
        insert_unique(&mut doc, render_value(k, &global)?, render_value(v, &global)?)?;
    }

    for entry in &matrix.entries {
        let (name, body) = render_job(&template.job, &matrix.entry_context(entry))?;
        tracing::debug!("rendered job {:?}", name.as_str().unwrap_or_default());
        insert_unique(&mut doc, name, body)?;
    }

    if let Some(wheel) = &template.wheel {
        for entry in &matrix.wheels {
            let (name, body) = render_job(wheel, &matrix.wheel_context(entry))?;
            insert_unique(&mut doc, name, body)?;
        }
    }

    for (k, v) in &template.extra {
        insert_unique(&mut doc, render_value(k, &global)?, render_value(v, &global)?)?;
    }

    Ok(doc)
}

/// Result of a `generate` run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSummary {
    pub output: PathBuf,
    pub matrix_jobs: usize,
    pub wheel_jobs: usize,
    pub total_keys: usize,
}

/// Render `template_path` with the matrix from `config` into `output_path`
pub fn generate(template_path: &Path, output_path: &Path, config: &MatrixConfig) -> Result<GenerateSummary> {
    let template = PipelineTemplate::from_file(template_path, &config.project_token, &config.project)?;
    let matrix = BuildMatrix::from_config(config);
    let doc = render_pipeline(&template, &matrix)?;

    let mut yaml = format!(
        "# generated by dune-ci from {}, do not edit\n",
        template_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    yaml.push_str(&serde_yaml::to_string(&serde_yaml::Value::Mapping(doc.clone()))?);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, yaml)?;

    let wheel_jobs = if template.wheel.is_some() { matrix.wheels.len() } else { 0 };
    tracing::info!(
        "wrote {} ({} matrix jobs, {} wheel jobs)",
        output_path.display(),
        matrix.entries.len(),
        wheel_jobs
    );

    Ok(GenerateSummary {
        output: output_path.to_path_buf(),
        matrix_jobs: matrix.entries.len(),
        wheel_jobs,
        total_keys: doc.len(),
    })
}
