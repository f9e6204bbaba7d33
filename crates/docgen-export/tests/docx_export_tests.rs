use docgen_export::{save_to_word, DocumentOutline, DocxWriter, DEFAULT_FILE_NAME, DOCX_MIME};
use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};
use std::io::Read;

/// (style, text) of every body paragraph, with breaks read back as `\n`.
fn paragraphs(bytes: &[u8]) -> Vec<(Option<String>, String)> {
    let docx = read_docx(bytes).unwrap();
    docx.document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(p),
            _ => None,
        })
        .map(|p| {
            let style = p.property.style.as_ref().map(|s| s.val.clone());
            let mut text = String::new();
            for child in &p.children {
                if let ParagraphChild::Run(run) = child {
                    for part in &run.children {
                        match part {
                            RunChild::Text(t) => text.push_str(&t.text),
                            RunChild::Break(_) => text.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            (style, text)
        })
        .collect()
}

fn is_body(style: &Option<String>) -> bool {
    !matches!(style.as_deref(), Some("Title") | Some("Heading1"))
}

// a .docx is a zip archive; entry names are stored uncompressed
fn has_entry(bytes: &[u8], name: &str) -> bool {
    bytes.windows(name.len()).any(|w| w == name.as_bytes())
}

#[test]
fn render_produces_zip_package() {
    let outline = DocumentOutline::parse(
        "Design Document",
        "1. Overview\nA document generator.\n\n2. Architecture Description\nOne binary.",
    );
    let bytes = DocxWriter::new().render(&outline).unwrap();

    assert!(bytes.starts_with(b"PK"));
    assert!(has_entry(&bytes, "word/document.xml"));
    assert!(has_entry(&bytes, "word/styles.xml"));
}

#[test]
fn title_headings_and_paragraphs_keep_their_order() {
    let outline = DocumentOutline::parse(
        "Design Document",
        "1. Overview\nline one\nline two\n\n2. Architecture Description\nOne binary.\n\nClosing remark.",
    );
    let read = paragraphs(&DocxWriter::new().render(&outline).unwrap());
    assert_eq!(read.len(), 6);

    assert_eq!(read[0], (Some("Title".to_string()), "Design Document".to_string()));
    assert_eq!(read[1], (Some("Heading1".to_string()), "1. Overview".to_string()));

    assert!(is_body(&read[2].0));
    assert_eq!(read[2].1, "line one\nline two");

    assert_eq!(
        read[3],
        (Some("Heading1".to_string()), "2. Architecture Description".to_string())
    );
    assert!(is_body(&read[4].0));
    assert_eq!(read[4].1, "One binary.");

    // a single-line section has no heading
    assert!(is_body(&read[5].0));
    assert_eq!(read[5].1, "Closing remark.");
}

#[test]
fn save_to_word_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/nested").join(DEFAULT_FILE_NAME);

    save_to_word(
        "Functional Requirement Specification (FRS)",
        "1. Introduction\nPayroll.\n\nClosing line.",
        &path,
    )
    .unwrap();

    let mut bytes = Vec::new();
    std::fs::File::open(&path)
        .unwrap()
        .read_to_end(&mut bytes)
        .unwrap();
    assert!(bytes.starts_with(b"PK"));

    let read = paragraphs(&bytes);
    assert_eq!(read[0].1, "Functional Requirement Specification (FRS)");
    assert_eq!(read[1], (Some("Heading1".to_string()), "1. Introduction".to_string()));
    assert_eq!(read.last().unwrap().1, "Closing line.");
}

#[test]
fn empty_content_still_renders() {
    let outline = DocumentOutline::parse("Design Document", "");
    let bytes = DocxWriter::new().render(&outline).unwrap();
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(
        paragraphs(&bytes),
        vec![(Some("Title".to_string()), "Design Document".to_string())]
    );
}

#[test]
fn mime_type_is_wordprocessing() {
    assert!(DOCX_MIME.ends_with("wordprocessingml.document"));
    assert_eq!(DEFAULT_FILE_NAME, "Generated_Document.docx");
}
