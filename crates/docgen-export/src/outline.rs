use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Block {
    Heading(String),
    Paragraph(String),
}

/// Generated text broken into headings and paragraphs, ready for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutline {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl DocumentOutline {
    /// Sections are separated by blank lines. A section spanning more than one
    /// line becomes a heading (its first line) followed by a paragraph (the rest).
    pub fn parse(title: impl Into<String>, content: &str) -> Self {
        let mut blocks = Vec::new();

        for section in content.split("\n\n") {
            let section = section.trim();
            if section.is_empty() {
                continue;
            }

            match section.split_once('\n') {
                Some((heading, body)) => {
                    blocks.push(Block::Heading(heading.trim().to_string()));
                    blocks.push(Block::Paragraph(body.trim().to_string()));
                }
                None => blocks.push(Block::Paragraph(section.to_string())),
            }
        }

        Self {
            title: title.into(),
            blocks,
        }
    }

    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Heading(text) => Some(text.as_str()),
            Block::Paragraph(_) => None,
        })
    }
}
