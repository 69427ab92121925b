//! Fluent builder for constructing multi-section prompts.

/// Prompt builder for constructing complex prompts
#[derive(Default)]
pub struct PromptBuilder {
    parts: Vec<String>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new() -> Self {
        PromptBuilder { parts: Vec::new() }
    }

    /// Add a section with a header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.parts.push(format!("## {}\n{}", header, content));
        self
    }

    /// Add raw text
    pub fn text(mut self, text: &str) -> Self {
        self.parts.push(text.to_string());
        self
    }

    /// Add a code block
    pub fn code(mut self, language: &str, code: &str) -> Self {
        self.parts.push(format!("```{}\n{}\n```", language, code));
        self
    }

    /// Add a list of items
    pub fn list(mut self, items: &[&str]) -> Self {
        let list = items
            .iter()
            .map(|item| format!("- {}", item))
            .collect::<Vec<_>>()
            .join("\n");
        self.parts.push(list);
        self
    }

    /// Add a numbered list
    pub fn numbered_list(mut self, items: &[&str]) -> Self {
        let list = items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item))
            .collect::<Vec<_>>()
            .join("\n");
        self.parts.push(list);
        self
    }

    /// Build the final prompt
    pub fn build(self) -> String {
        self.parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_builder() {
        let prompt = PromptBuilder::new()
            .section("Introduction", "This is a test")
            .code("python", "print('hello')")
            .build();
        assert!(prompt.contains("## Introduction"));
        assert!(prompt.contains("print('hello')"));
    }
}
