// file: src/utils/validation.rs
// description: input validation for CLI arguments and user questions

use crate::error::{ChatError, Result};

const MAX_TOP_K: usize = 50;

pub struct Validator;

impl Validator {
    pub fn validate_question(question: &str) -> Result<()> {
        if question.trim().is_empty() {
            return Err(ChatError::Validation(
                "Question cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_top_k(k: usize) -> Result<()> {
        if k == 0 {
            return Err(ChatError::Validation(
                "Number of sources must be greater than 0".to_string(),
            ));
        }

        if k > MAX_TOP_K {
            return Err(ChatError::Validation(format!(
                "Number of sources too large (max {})",
                MAX_TOP_K
            )));
        }

        Ok(())
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let truncated: String = text.chars().take(max_chars).collect();
            format!("{}...", truncated)
        }
    }
}
