// file: src/ollama/prompt.rs
// description: RAG prompt construction from retrieved context passages

use crate::models::SearchResult;

/// Build the grounded prompt: numbered context passages followed by the
/// question and answering instructions.
pub fn build_rag_prompt(query: &str, context_docs: &[SearchResult]) -> String {
    let context = context_docs
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("[Source {}]: {}", i + 1, doc.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a helpful AI assistant. Answer the question based ONLY on the provided context. \
         If the answer is not in the context, say \"I don't have enough information in the \
         provided documents to answer that question.\"\n\n\
         CONTEXT:\n{}\n\n\
         QUESTION: {}\n\n\
         ANSWER (be specific and cite which sources you used):",
        context, query
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(content: &str) -> SearchResult {
        SearchResult::new(
            "id".to_string(),
            "doc.txt".to_string(),
            0,
            content.to_string(),
            0.9,
            None,
            content.len(),
            0,
        )
    }

    #[test]
    fn test_prompt_numbers_sources() {
        let docs = vec![result("First passage."), result("Second passage.")];
        let prompt = build_rag_prompt("What is this?", &docs);

        assert!(prompt.contains("[Source 1]: First passage."));
        assert!(prompt.contains("[Source 2]: Second passage."));
        assert!(prompt.contains("QUESTION: What is this?"));
    }

    #[test]
    fn test_prompt_contains_grounding_instruction() {
        let prompt = build_rag_prompt("q", &[result("ctx")]);
        assert!(prompt.contains("ONLY on the provided context"));
        assert!(prompt.contains("I don't have enough information"));
    }
}
