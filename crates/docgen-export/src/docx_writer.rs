use docgen_core::{DocGenError, Result};
use docx_rs::{BreakType, Docx, Paragraph, Run, Style, StyleType};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

use crate::outline::{Block, DocumentOutline};

/// MIME type of an Office Open XML word-processing document.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Default download name.
pub const DEFAULT_FILE_NAME: &str = "Generated_Document.docx";

const TITLE_STYLE: &str = "Title";
const HEADING_STYLE: &str = "Heading1";

/// Renders a [`DocumentOutline`] as a `.docx` package.
#[derive(Debug, Clone, Default)]
pub struct DocxWriter;

impl DocxWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, outline: &DocumentOutline) -> Result<Vec<u8>> {
        let mut docx = Docx::new()
            .add_style(
                Style::new(TITLE_STYLE, StyleType::Paragraph)
                    .name("Title")
                    .size(56),
            )
            .add_style(
                Style::new(HEADING_STYLE, StyleType::Paragraph)
                    .name("Heading 1")
                    .size(32)
                    .bold(),
            )
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(&outline.title))
                    .style(TITLE_STYLE),
            );

        for block in &outline.blocks {
            docx = match block {
                Block::Heading(text) => docx.add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text(text))
                        .style(HEADING_STYLE),
                ),
                Block::Paragraph(text) => docx.add_paragraph(Paragraph::new().add_run(text_run(text))),
            };
        }

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|e| DocGenError::Export(format!("Failed to pack docx: {}", e)))?;

        let bytes = buffer.into_inner();
        debug!(
            "Rendered '{}' with {} blocks into {} bytes",
            outline.title,
            outline.blocks.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Line breaks inside a paragraph become Word text-wrapping breaks.
fn text_run(text: &str) -> Run {
    let mut run = Run::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line);
    }
    run
}

/// Parse `content` and write it as a Word document at `path`.
pub fn save_to_word(title: &str, content: &str, path: &Path) -> Result<()> {
    let outline = DocumentOutline::parse(title, content);
    let bytes = DocxWriter::new().render(&outline)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;

    info!("Saved '{}' to {}", title, path.display());
    Ok(())
}
