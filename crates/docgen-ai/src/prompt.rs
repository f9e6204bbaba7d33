use docgen_core::{DocGenError, Result};
use std::collections::{BTreeSet, HashMap};

/// Senior-architect prompt used for every generated document.
pub const DOCUMENT_PROMPT: &str = r#"
You are a senior software architect.

Generate a complete and professionally structured {doc_type} document based on the following project description:

"{project_description}"

Refer to the following relevant context from similar documents:
"{context}"

Structure the output with clearly defined sections.

If the document type is:
- "Functional Requirement Specification (FRS)", use this structure:
  1. Introduction
  2. Purpose
  3. Scope
  4. Definitions, Acronyms, Abbreviations
  5. Functional Requirements
  6. Non-Functional Requirements
  7. Assumptions and Constraints

If the document type is:
- "Design Document", use this structure:
  1. Overview
  2. Architecture Description
  3. Module Design
  4. Database Design
  5. Interface Design
  6. Security Considerations
  7. Assumptions and Limitations

Write the document in a formal, technical tone with headings for each section.
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A text template with `{name}` placeholders.
///
/// `{{` and `}}` render as literal braces.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(template: &str, input_variables: &[&str]) -> Result<Self> {
        let segments = parse_template(template)?;

        let found: BTreeSet<&str> = segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Variable(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect();
        let declared: BTreeSet<&str> = input_variables.iter().copied().collect();

        if found != declared {
            return Err(DocGenError::Prompt(format!(
                "Template placeholders {:?} do not match input variables {:?}",
                found, declared
            )));
        }

        Ok(Self {
            segments,
            input_variables: input_variables.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Substitute every placeholder. Values are inserted verbatim.
    pub fn format(&self, values: &HashMap<&str, &str>) -> Result<String> {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Variable(name) => {
                    let value = values.get(name.as_str()).ok_or_else(|| {
                        DocGenError::Prompt(format!("Missing value for prompt variable '{}'", name))
                    })?;
                    output.push_str(value);
                }
            }
        }
        Ok(output)
    }
}

/// The document generation prompt over `doc_type`, `project_description` and `context`.
pub fn document_prompt() -> Result<PromptTemplate> {
    PromptTemplate::new(
        DOCUMENT_PROMPT,
        &["project_description", "context", "doc_type"],
    )
}

fn parse_template(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    if c == '{' {
                        break;
                    }
                    name.push(c);
                }

                let name = name.trim();
                if !closed || name.is_empty() {
                    return Err(DocGenError::Prompt(format!(
                        "Malformed placeholder at byte {}",
                        pos
                    )));
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name.to_string()));
            }
            '}' => {
                return Err(DocGenError::Prompt(format!(
                    "Unmatched '}}' at byte {}",
                    pos
                )));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}
