//! Placeholder substitution for pipeline templates
//!
//! Placeholders look like `{{ compiler.cc }}` or `{{ subdir | slug }}`. The
//! path is a dotted lookup into a JSON context; numeric segments index into
//! arrays.

use regex::{Captures, Regex};
use serde_json::Value;
use shared::{DuneCiError, Result, UnresolvedPlaceholderError};
use std::sync::OnceLock;

const PLACEHOLDER: &str = r"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*([A-Za-z_]+)\s*)?\}\}";

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER).expect("placeholder pattern is valid"))
}

fn whole_placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^\s*{}\s*$", PLACEHOLDER)).expect("placeholder pattern is valid")
    })
}

/// Resolve a dotted path against the context
fn lookup<'a>(ctx: &'a Value, path: &str) -> Result<&'a Value> {
    let mut current = ctx;
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| unresolved(ctx, path))?;
    }
    Ok(current)
}

fn unresolved(ctx: &Value, path: &str) -> DuneCiError {
    let available_keys = match ctx {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    UnresolvedPlaceholderError {
        placeholder: path.to_string(),
        available_keys,
    }
    .into()
}

/// Text form of a context value
fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(display).collect::<Vec<_>>().join(" "),
        Value::Object(_) => value.to_string(),
    }
}

fn apply_filter(text: String, filter: Option<&str>) -> Result<String> {
    match filter {
        None => Ok(text),
        Some("slug") => Ok(text.replace(['/', ' '], "_")),
        Some("upper") => Ok(text.to_uppercase()),
        Some("lower") => Ok(text.to_lowercase()),
        Some(other) => Err(DuneCiError::Template(format!(
            "unknown filter '{}' (expected slug, upper or lower)",
            other
        ))),
    }
}

fn render_capture(caps: &Captures<'_>, ctx: &Value) -> Result<String> {
    let value = lookup(ctx, &caps[1])?;
    apply_filter(display(value), caps.get(2).map(|m| m.as_str()))
}

/// Substitute every placeholder in `template`
pub fn render_str(template: &str, ctx: &Value) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in placeholder_re().captures_iter(template) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..m.start()]);
        out.push_str(&render_capture(&caps, ctx)?);
        last = m.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Substitute placeholders throughout a YAML tree, keys included
///
/// A string that consists of exactly one unfiltered placeholder is replaced
/// by the context value itself, so `needs: "{{ wheel_steps_no_all }}"`
/// becomes a YAML sequence.
pub fn render_value(value: &serde_yaml::Value, ctx: &Value) -> Result<serde_yaml::Value> {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::String(s) => {
            if let Some(caps) = whole_placeholder_re().captures(s) {
                if caps.get(2).is_none() {
                    let resolved = lookup(ctx, &caps[1])?;
                    return Ok(serde_yaml::to_value(resolved)?);
                }
            }
            Ok(Yaml::String(render_str(s, ctx)?))
        }
        Yaml::Sequence(items) => items
            .iter()
            .map(|item| render_value(item, ctx))
            .collect::<Result<Vec<_>>>()
            .map(Yaml::Sequence),
        Yaml::Mapping(map) => {
            let mut rendered = serde_yaml::Mapping::with_capacity(map.len());
            for (k, v) in map {
                rendered.insert(render_value(k, ctx)?, render_value(v, ctx)?);
            }
            Ok(Yaml::Mapping(rendered))
        }
        Yaml::Tagged(tagged) => {
            let mut tagged = tagged.as_ref().clone();
            tagged.value = render_value(&tagged.value, ctx)?;
            Ok(Yaml::Tagged(Box::new(tagged)))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Value {
        json!({
            "compiler": { "cc": "gcc", "cxx": "g++" },
            "subdir": "xt/common",
            "kind": "cpp",
            "pythons": ["3.7", "3.8"],
            "jobs": 4,
            "debug": false,
        })
    }

    // ============== String Rendering Tests ==============

    #[test]
    fn test_render_str_paths_and_filters() {
        let out = render_str("{{compiler.cc}} {{ subdir | slug }} {{ kind|upper }}", &ctx()).unwrap();
        assert_eq!(out, "gcc xt_common CPP");
    }

    #[test]
    fn test_render_str_scalars_and_lists() {
        assert_eq!(render_str("-j{{ jobs }}", &ctx()).unwrap(), "-j4");
        assert_eq!(render_str("{{ debug }}", &ctx()).unwrap(), "false");
        assert_eq!(render_str("py {{ pythons }}", &ctx()).unwrap(), "py 3.7 3.8");
        assert_eq!(render_str("{{ pythons.1 }}", &ctx()).unwrap(), "3.8");
    }

    #[test]
    fn test_render_str_leaves_plain_text() {
        let text = "echo ${CI_JOB_ID} { not a placeholder }";
        assert_eq!(render_str(text, &ctx()).unwrap(), text);
    }

    #[test]
    fn test_unresolved_placeholder_lists_keys() {
        let err = render_str("{{ compiler.fc }}", &ctx()).unwrap_err();
        match err {
            DuneCiError::UnresolvedPlaceholder(e) => {
                assert_eq!(e.placeholder, "compiler.fc");
                assert!(e.available_keys.contains(&"subdir".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_filter() {
        let err = render_str("{{ kind | reverse }}", &ctx()).unwrap_err();
        assert!(matches!(err, DuneCiError::Template(_)));
    }

    // ============== YAML Rendering Tests ==============

    #[test]
    fn test_render_value_whole_placeholder_keeps_type() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            r#"
"{{ kind }} {{ compiler.cc }}":
  parallel: "{{ jobs }}"
  matrix: "{{ pythons }}"
  name: "{{ pythons | upper }}"
  retry:
    max: 2
    when: [runner_system_failure]
"#,
        )
        .unwrap();

        let rendered = render_value(&yaml, &ctx()).unwrap();
        let job = &rendered["cpp gcc"];
        assert_eq!(job["parallel"], serde_yaml::Value::from(4));
        assert_eq!(job["matrix"][1], serde_yaml::Value::from("3.8"));
        assert_eq!(job["name"], serde_yaml::Value::from("3.7 3.8"));
        assert_eq!(job["retry"]["max"], serde_yaml::Value::from(2));
    }
}
