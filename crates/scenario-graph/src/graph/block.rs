use serde::{Deserialize, Serialize};

/// Canvas position of a block in the scenario editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A block in a scenario: one unit of browser-automation work.
///
/// The resolver only cares about `id`; type and position are carried so a
/// document can be read and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique identifier for this block.
    pub id: String,
    /// Block kind, e.g. `goto`, `click`, `condition`.
    pub node_type: String,
    #[serde(default)]
    pub position: Point2D,
}

impl Block {
    /// Create a block at the origin.
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            position: Point2D::default(),
        }
    }

    /// Set the canvas position.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Point2D::new(x, y);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_builder() {
        let block = Block::new("goto_login", "goto").at(100.0, 200.0);
        assert_eq!(block.id, "goto_login");
        assert_eq!(block.node_type, "goto");
        assert_eq!(block.position, Point2D::new(100.0, 200.0));
    }

    #[test]
    fn test_position_defaults_when_missing() {
        let block: Block =
            serde_json::from_str(r#"{"id": "start", "node_type": "start"}"#).unwrap();
        assert_eq!(block.position, Point2D::default());
    }
}
