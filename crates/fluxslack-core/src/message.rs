//! Slack block-kit messages.

use serde::{Deserialize, Serialize};

/// Text object rendered as Slack markdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    Mrkdwn,
}

impl TextObject {
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::Mrkdwn,
            text: text.into(),
        }
    }
}

/// A layout block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: TextObject },
    Context { elements: Vec<TextObject> },
    Divider,
}

impl Block {
    /// Section block holding markdown text.
    pub fn text(text: impl Into<String>) -> Self {
        Block::Section {
            text: TextObject::markdown(text),
        }
    }

    /// Small heading: a context line followed by a divider.
    pub fn heading(text: impl Into<String>) -> [Block; 2] {
        [
            Block::Context {
                elements: vec![TextObject::markdown(text)],
            },
            Block::Divider,
        ]
    }

    /// Markdown text carried by the block, if any.
    pub fn markdown(&self) -> Option<&str> {
        match self {
            Block::Section { text } => Some(&text.text),
            Block::Context { elements } => elements.first().map(|e| e.text.as_str()),
            Block::Divider => None,
        }
    }
}

/// A message posted to an incoming webhook.
///
/// Empty `channel` / `username` mean "use the webhook's defaults" and are
/// left out of the payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub channel: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,

    pub blocks: Vec<Block>,
}

impl Message {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ..Self::default()
        }
    }

    /// Position of the heading block with the given text.
    pub fn heading_position(&self, heading: &str) -> Option<usize> {
        self.blocks.iter().position(|block| {
            matches!(block, Block::Context { .. }) && block.markdown() == Some(heading)
        })
    }

    pub fn has_heading(&self, heading: &str) -> bool {
        self.heading_position(heading).is_some()
    }

    /// Text of the section directly after a heading and its divider.
    pub fn section_after(&self, heading: &str) -> Option<&str> {
        let pos = self.heading_position(heading)?;
        self.blocks.get(pos + 2).and_then(Block::markdown)
    }
}
