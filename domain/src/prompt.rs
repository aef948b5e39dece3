use std::fmt;

/// Separator placed between retrieved contexts in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Instruction text sent to the generation provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the grounded-answer prompt from the question and the contexts, in order.
///
/// An empty context list still produces the `Context:` section, just with nothing in it.
pub fn build_prompt(query: &str, contexts: &[String]) -> Prompt {
    let context_block = contexts.join(CONTEXT_SEPARATOR);
    Prompt(format!(
        "\nYou are an intelligent assistant. Use the following context to answer the user's question:\n\
         \nUser question:\n{query}\n\
         \nContext:\n{context_block}\n\
         \nAnswer:\n"
    ))
}
