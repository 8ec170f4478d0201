use std::fmt;

/// Slash-separated location of a node inside a tree, e.g.
/// `root/base_pipeline/cat/one_hot_encoder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn root() -> Self {
        Self(vec!["root".to_string()])
    }

    /// Path of a stage name or route token below this node.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }
}

impl Default for NodePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_paths_render_with_slashes() {
        let path = NodePath::root().child("base_pipeline").child("num");
        assert_eq!(path.to_string(), "root/base_pipeline/num");
        assert_eq!(path.depth(), 2);
    }
}
