use crate::domain::diff::StagedDiff;

/// Instruction block sent ahead of the diff. Only the diff varies per call.
const INSTRUCTIONS: &str = "\
Write a git commit message for the staged changes shown below.

Rules:
- The first line is a short description of the change. Do not use the word \"summary\" anywhere in it.
- If the changes add functions, follow with a \"Functions Added:\" section listing one function name per line as a dash bullet.
- If the changes remove functions, add a \"Functions Removed:\" section in the same form.
- Leave a section out entirely when it has no entries. Never write \"None\".
- Reply with the commit message only, no surrounding commentary.";

pub fn build_prompt(diff: &StagedDiff) -> String {
    format!("{INSTRUCTIONS}\n\nStaged diff:\n\n{}", diff.as_str())
}
