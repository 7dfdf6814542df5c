//! IncludeTree - parser for the compiler's `-H` include trace
//!
//! Each traced header is printed as `<dots> <path>` where the number of dots
//! is the include depth. Everything else in the output is ignored.

use crate::graph::IncludeGraph;
use regex::Regex;
use std::sync::OnceLock;

/// Depth limit used for cycle detection
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Depth limit of the rendered `.dot` graph
pub const RENDER_MAX_DEPTH: usize = 3;

fn trace_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\.+) (.+)$").expect("valid trace line regex"))
}

/// Parser settings
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Prefix removed from every header path
    pub strip_base: String,
    pub max_depth: usize,
    /// Name of the translation unit
    pub root: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strip_base: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            root: "<root>".to_string(),
        }
    }
}

impl ParseOptions {
    pub fn with_max_depth(&self, max_depth: usize) -> Self {
        Self {
            max_depth,
            ..self.clone()
        }
    }

    /// Remove `strip_base` when it matches whole leading path components
    fn strip<'a>(&self, path: &'a str) -> &'a str {
        let path = path.trim();
        if self.strip_base.is_empty() {
            return path;
        }
        let base = self.strip_base.trim_end_matches('/');
        match path.strip_prefix(base) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
            _ => path,
        }
    }
}

/// Parsed include trace
#[derive(Debug, Clone)]
pub struct IncludeTree {
    pub graph: IncludeGraph,
    /// Index of the translation unit, always 0
    pub root: usize,
    /// Trace lines kept (within the depth limit)
    pub entries: usize,
}

impl IncludeTree {
    pub fn parse(text: &str, options: &ParseOptions) -> Self {
        let mut graph = IncludeGraph::new();
        let root = graph.add_node(&options.root);
        // stack[d] is the latest node seen at depth d
        let mut stack = vec![root];
        let mut entries = 0;

        for line in text.lines() {
            let Some(caps) = trace_line_re().captures(line) else {
                continue;
            };
            let depth = caps[1].len();
            if depth > options.max_depth {
                continue;
            }

            let node = graph.add_node(options.strip(&caps[2]));
            stack.truncate(depth);
            let parent = stack.last().copied().unwrap_or(root);
            graph.add_edge(parent, node);
            stack.push(node);
            entries += 1;
        }

        tracing::debug!(
            "parsed {} include entries into {} nodes / {} edges",
            entries,
            graph.node_count(),
            graph.edge_count()
        );

        Self {
            graph,
            root,
            entries,
        }
    }
}
