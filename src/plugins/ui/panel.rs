//! Screen-anchored panel configuration applied to UI nodes.

use bevy::prelude::*;
use bevy::ui::{Node as UiNode, PositionType, UiRect, Val};

/// Corner anchor for a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub position: PanelPosition,
    pub margin: f32,
    pub background_color: Option<Color>,
    pub padding: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl PanelConfig {
    pub fn at(position: PanelPosition) -> Self {
        Self {
            position,
            margin: 14.0,
            background_color: None,
            padding: 0.0,
            width: None,
            height: None,
        }
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    #[allow(dead_code)]
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn apply_to_node(&self, node: &mut UiNode) {
        node.position_type = PositionType::Absolute;

        match self.position {
            PanelPosition::TopLeft => {
                node.left = Val::Px(self.margin);
                node.top = Val::Px(self.margin);
            }
            PanelPosition::TopRight => {
                node.right = Val::Px(self.margin);
                node.top = Val::Px(self.margin);
            }
            PanelPosition::BottomLeft => {
                node.left = Val::Px(self.margin);
                node.bottom = Val::Px(self.margin);
            }
            PanelPosition::BottomRight => {
                node.right = Val::Px(self.margin);
                node.bottom = Val::Px(self.margin);
            }
        }

        if self.padding > 0.0 {
            node.padding = UiRect::all(Val::Px(self.padding));
        }

        if let Some(width) = self.width {
            node.width = Val::Px(width);
        }

        if let Some(height) = self.height {
            node.height = Val::Px(height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_anchors_to_requested_corner() {
        let config = PanelConfig::at(PanelPosition::BottomRight).with_margin(10.0);
        let mut node = UiNode::default();
        config.apply_to_node(&mut node);

        assert_eq!(node.position_type, PositionType::Absolute);
        assert_eq!(node.right, Val::Px(10.0));
        assert_eq!(node.bottom, Val::Px(10.0));
    }

    #[test]
    fn panel_applies_size_and_padding() {
        let config = PanelConfig::at(PanelPosition::TopLeft)
            .with_width(320.0)
            .with_padding(8.0);
        let mut node = UiNode::default();
        config.apply_to_node(&mut node);

        assert_eq!(node.width, Val::Px(320.0));
        assert_eq!(node.padding, UiRect::all(Val::Px(8.0)));
    }

    #[test]
    fn panel_without_size_leaves_node_auto() {
        let config = PanelConfig::at(PanelPosition::TopLeft);
        let mut node = UiNode::default();
        let auto_width = node.width;
        config.apply_to_node(&mut node);
        assert_eq!(node.width, auto_width);
    }
}
