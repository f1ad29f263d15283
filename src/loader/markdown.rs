// file: src/loader/markdown.rs
// description: markdown to plain text conversion with frontmatter title extraction
// reference: https://docs.rs/pulldown-cmark

use crate::error::{ChatError, Result};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use std::fs;
use std::path::Path;
use yaml_rust::{Yaml, YamlLoader};

/// Markdown reduced to embedding-friendly plain text.
#[derive(Debug, Clone)]
pub struct ParsedMarkdown {
    pub plain_text: String,
    pub title: Option<String>,
}

pub struct MarkdownLoader;

impl MarkdownLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, path: &Path) -> Result<ParsedMarkdown> {
        let content = fs::read_to_string(path).map_err(|source| ChatError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = self.parse(&content)?;
        if parsed.plain_text.trim().is_empty() {
            return Err(ChatError::DocumentLoad {
                file: path.display().to_string(),
                message: "markdown contains no text content".to_string(),
            });
        }

        Ok(parsed)
    }

    pub fn parse(&self, content: &str) -> Result<ParsedMarkdown> {
        let (frontmatter_title, body) = Self::split_frontmatter(content)?;

        let parser = Parser::new(body);
        let mut plain_text = String::new();
        let mut first_heading: Option<String> = None;
        let mut current_heading: Option<String> = None;
        let mut in_code_block = false;

        for event in parser {
            match event {
                Event::Start(Tag::Heading { .. }) => {
                    current_heading = Some(String::new());
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(text) = current_heading.take() {
                        let text = text.trim().to_string();
                        if first_heading.is_none() && !text.is_empty() {
                            first_heading = Some(text.clone());
                        }
                        plain_text.push_str(&text);
                        plain_text.push('\n');
                    }
                }
                Event::Start(Tag::CodeBlock(_)) => {
                    in_code_block = true;
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    plain_text.push('\n');
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some(ref mut heading_text) = current_heading {
                        heading_text.push_str(&text);
                    } else {
                        plain_text.push_str(&text);
                        if !in_code_block {
                            plain_text.push(' ');
                        }
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    plain_text.push('\n');
                }
                Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Item) => {
                    plain_text.push('\n');
                }
                _ => {}
            }
        }

        // Frontmatter title wins over the first heading
        let title = frontmatter_title.or(first_heading);

        Ok(ParsedMarkdown {
            plain_text: plain_text.trim().to_string(),
            title,
        })
    }

    /// Split leading YAML frontmatter off, returning its title field (if any)
    /// and the remaining markdown body.
    fn split_frontmatter(content: &str) -> Result<(Option<String>, &str)> {
        if !content.starts_with("---") {
            return Ok((None, content));
        }

        let parts: Vec<&str> = content.splitn(3, "---").collect();
        if parts.len() < 3 {
            return Ok((None, content));
        }

        let yaml_content = parts[1].trim();
        let body = parts[2];

        let docs = YamlLoader::load_from_str(yaml_content).map_err(|e| ChatError::DocumentLoad {
            file: "frontmatter".to_string(),
            message: format!("YAML parse error: {}", e),
        })?;

        let title = docs.first().and_then(|doc| {
            if let Yaml::Hash(hash) = doc {
                hash.iter().find_map(|(key, value)| match (key, value) {
                    (Yaml::String(k), Yaml::String(v)) if k == "title" => Some(v.clone()),
                    _ => None,
                })
            } else {
                None
            }
        });

        Ok((title, body))
    }
}

impl Default for MarkdownLoader {
    fn default() -> Self {
        Self::new()
    }
}
