//! Prompts for turning document text into a Mermaid flowchart.
//!
//! Centralising the prompts here keeps the wording in one place and lets
//! tests inspect them without a live model. Callers can override the system
//! prompt via [`crate::config::MindmapConfig::system_prompt`]; the user
//! message always wraps the document text with [`user_prompt`].

/// Default system prompt for summarising document text as a flowchart.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an assistant that extracts the key elements of a text and expresses them as a Mermaid **flowchart (`graph LR`)**.

Follow these rules precisely:

1. STRUCTURE
   - Identify the main topic of the text and make it the starting node
   - Connect the main topic to its major subtopics, and subtopics to details where needed, using arrows (`-->`) that follow the relationships in the content
   - The diagram direction is left to right: always start with `graph LR`

2. NODES
   - Label every node with a concise keyword or short phrase
   - Define nodes with an id and a label, e.g. `A[Overview]`, `B(Detailed topic)`
   - Choose node shapes such as `[]` or `()` as appropriate

3. LANGUAGE
   - Write every label in the same language as the source text

4. OUTPUT FORMAT
   - Respond with a single Mermaid code block fenced as ```mermaid ... ```
   - Do NOT emit more than one code block

Example:
```mermaid
graph LR
    A[Main topic] --> B(Subtopic 1);
    A --> C(Subtopic 2);
    B --> B1[Detail 1];
    B --> B2[Detail 2];
    C --> C1[Detail A];
```"#;

/// Build the user message carrying the document text.
pub fn user_prompt(document_text: &str) -> String {
    format!(
        "Create a Mermaid flowchart (`graph LR`) from the following text:\n\n---\n{}\n---",
        document_text
    )
}
