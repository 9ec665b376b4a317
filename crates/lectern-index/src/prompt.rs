//! Context prompt assembly for the chat collaborator.

use crate::store::DocumentChunk;

const INTRO: &str = "You are Lectern, a helpful study assistant. Use the following lecture \
excerpts when formulating your answer. If the information is not present, acknowledge that \
you do not know.";

const OUTRO: &str = "When answering, cite the relevant course material when possible and \
keep the focus on the ingested lecture content.";

/// Build the system prompt that injects retrieved lecture context.
///
/// Layout: instructional preamble, then per chunk a
/// `Source: <title> (section <index+1>)` header plus the chunk text, each
/// framed by `---` delimiter lines, then a closing instruction. Sections are
/// joined by blank lines.
pub fn build_system_prompt<'a>(chunks: impl IntoIterator<Item = &'a DocumentChunk>) -> String {
    let mut sections: Vec<String> = vec![INTRO.into(), "---".into()];
    for chunk in chunks {
        sections.push(format!(
            "Source: {} (section {})\n{}",
            chunk.document_title,
            chunk.index + 1,
            chunk.text
        ));
        sections.push("---".into());
    }
    sections.push(OUTRO.into());
    sections.join("\n\n")
}
