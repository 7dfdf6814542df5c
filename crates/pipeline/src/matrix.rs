//! BuildMatrix - cartesian product of CI build parameters

use serde::Serialize;
use serde_json::{json, Value};
use shared::{Compiler, MatrixConfig};

/// Name of the aggregate wheel step appended after the per-module steps
pub const ALL_WHEEL_STEP: &str = "all";

/// One test job: compiler x image x subdir x kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixEntry {
    pub compiler: Compiler,
    pub image: String,
    pub subdir: String,
    pub kind: String,
}

/// One wheel build job: python x step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WheelEntry {
    pub python: String,
    pub step: String,
}

/// Expanded build matrix
#[derive(Debug, Clone)]
pub struct BuildMatrix {
    pub project: String,
    pub project_token: String,
    pub compilers: Vec<Compiler>,
    pub images: Vec<String>,
    pub subdirs: Vec<String>,
    pub kinds: Vec<String>,
    pub pythons: Vec<String>,
    /// Wheel steps without the aggregate step
    pub wheel_steps_no_all: Vec<String>,
    /// Wheel steps followed by the aggregate step
    pub wheel_steps: Vec<String>,
    pub entries: Vec<MatrixEntry>,
    pub wheels: Vec<WheelEntry>,
}

impl BuildMatrix {
    /// Expand a matrix configuration
    ///
    /// Entries nest compiler, then image, then subdir, then kind, so jobs for
    /// the same compiler/image pair stay adjacent in the rendered output.
    pub fn from_config(config: &MatrixConfig) -> Self {
        let mut entries = Vec::with_capacity(
            config.compilers.len() * config.images.len() * config.subdirs.len() * config.kinds.len(),
        );
        for compiler in &config.compilers {
            for image in &config.images {
                for subdir in &config.subdirs {
                    for kind in &config.kinds {
                        entries.push(MatrixEntry {
                            compiler: compiler.clone(),
                            image: image.clone(),
                            subdir: subdir.clone(),
                            kind: kind.clone(),
                        });
                    }
                }
            }
        }

        let wheel_steps_no_all = config.wheel_steps.clone();
        let mut wheel_steps = wheel_steps_no_all.clone();
        if !wheel_steps.iter().any(|s| s == ALL_WHEEL_STEP) {
            wheel_steps.push(ALL_WHEEL_STEP.to_string());
        }

        let wheels = config
            .pythons
            .iter()
            .flat_map(|python| {
                wheel_steps.iter().map(move |step| WheelEntry {
                    python: python.clone(),
                    step: step.clone(),
                })
            })
            .collect();

        Self {
            project: config.project.clone(),
            project_token: config.project_token.clone(),
            compilers: config.compilers.clone(),
            images: config.images.clone(),
            subdirs: config.subdirs.clone(),
            kinds: config.kinds.clone(),
            pythons: config.pythons.clone(),
            wheel_steps_no_all,
            wheel_steps,
            entries,
            wheels,
        }
    }

    /// compiler x image pairs, used for per-toolchain setup jobs
    pub fn compiler_images(&self) -> Vec<(Compiler, String)> {
        self.compilers
            .iter()
            .flat_map(|c| self.images.iter().map(move |i| (c.clone(), i.clone())))
            .collect()
    }

    /// Context shared by every rendered job
    pub fn global_context(&self) -> Value {
        let compiler_images: Vec<Value> = self
            .compiler_images()
            .into_iter()
            .map(|(compiler, image)| json!({ "compiler": compiler, "image": image }))
            .collect();

        json!({
            "project": self.project,
            "compilers": self.compilers,
            "images": self.images,
            "subdirs": self.subdirs,
            "kinds": self.kinds,
            "pythons": self.pythons,
            "wheel_steps": self.wheel_steps,
            "wheel_steps_no_all": self.wheel_steps_no_all,
            "compiler_images": compiler_images,
        })
    }

    /// Context for one test job: the global context plus the entry's fields
    pub fn entry_context(&self, entry: &MatrixEntry) -> Value {
        let mut ctx = self.global_context();
        if let Value::Object(map) = &mut ctx {
            map.insert("compiler".to_string(), json!(entry.compiler));
            map.insert("image".to_string(), json!(entry.image));
            map.insert("subdir".to_string(), json!(entry.subdir));
            map.insert("kind".to_string(), json!(entry.kind));
        }
        ctx
    }

    /// Context for one wheel job
    pub fn wheel_context(&self, wheel: &WheelEntry) -> Value {
        let mut ctx = self.global_context();
        if let Value::Object(map) = &mut ctx {
            map.insert("python".to_string(), json!(wheel.python));
            map.insert("step".to_string(), json!(wheel.step));
        }
        ctx
    }
}
