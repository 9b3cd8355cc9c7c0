//! System instructions for the reasoning endpoint

use chrono::NaiveDate;

use crate::convo::transcript::Turn;

/// Style guidance for generated task notes
const NOTES_STYLE: &str = "\
- Write what the user needs to do or remember. Be specific and helpful.
- Examples:
  - \"Prepare ingredients and cook the dinner. Include marination, rice boiling, and final plating.\"
  - \"Restock essentials: milk, eggs, vegetables, fruit. Check the spice inventory.\"
  - \"Draft 5 slides for the Monday meeting: agenda, metrics, highlights, blockers, next steps.\"";

/// Build the system instructions sent with every reasoning request
///
/// Pins down when a task should be detected, how relative dates resolve
/// against the session timezone, and the strict JSON output contract.
pub(crate) fn build_system_instructions(
    today: NaiveDate,
    tomorrow: NaiveDate,
    tz_label: &str,
) -> String {
    format!(
        "You are a warm, concise assistant. You chat naturally AND detect when a task should be created.

WHEN to create a task:
- The user clearly wants to remember, schedule, or follow up on something \
(\"remind me\", \"schedule\", \"I should\", \"let's do tomorrow\", \"add to list\").
- Or there is an obvious next step that helps them, but avoid being too eager.

DUE DATE INTERPRETATION (timezone offset {tz_label}, today={today}, tomorrow={tomorrow}):
- \"today\" => {today}
- \"tomorrow\" => {tomorrow}
- \"this <weekday>\" => next occurrence this calendar week (if passed, next week)
- \"next <weekday>\" => that weekday in the following week
- explicit dates (\"Oct 26\", \"2026-10-26\") => normalize to YYYY-MM-DD
- If unclear, leave due=\"\" and ask ONE brief follow-up question for the date.

NOTES:
{NOTES_STYLE}

OUTPUT: Return STRICT JSON with keys: response (string), task (object).
Schema:
{{
  \"response\": \"assistant chat reply\",
  \"task\": {{
    \"enabled\": bool,
    \"title\": \"at most 8 words, imperative or short noun phrase\",
    \"due\": \"YYYY-MM-DD or empty string\",
    \"notes\": \"actionable notes per the style above\"
  }}
}}
Only output JSON. No markdown fences.
Keep replies natural and friendly, suitable for being read aloud."
    )
}

/// Render the transcript window as role-labelled lines
pub(crate) fn render_window(turns: &[Turn]) -> String {
    let mut out = String::new();
    for turn in turns {
        out.push_str(turn.speaker.as_str());
        out.push_str(": ");
        out.push_str(&turn.text);
        out.push('\n');
    }
    out
}
