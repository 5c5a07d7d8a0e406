//! Help text shown by `?` and by an interactive start without arguments.

const README: &str = include_str!("../README.md");
const COMMANDS_HEADING: &str = "## Key commands";

/// The key command list from the README, or the whole README if it cannot be found.
pub fn help_text() -> String {
    extract_commands(README).unwrap_or_else(|| README.to_string())
}

fn extract_commands(doc: &str) -> Option<String> {
    let (_, section) = doc.split_once(COMMANDS_HEADING)?;
    let (_, fenced) = section.split_once("```text\n")?;
    let (body, _) = fenced.split_once("```")?;
    Some(body.trim_end().to_string())
}
