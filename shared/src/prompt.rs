use crate::types::Result;
use dialoguer::Input;

/// Standardized free-text prompt used by the terminal front end.
pub fn ask_text(prompt: &str) -> Result<String> {
    let answer: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(answer)
}
