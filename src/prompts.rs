//! Task text handed to the agent at each stage.

use crate::config::Target;

/// Rendering for an unset setting inside a prompt.
const UNSET: &str = "None";

fn show(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNSET)
}

fn login_section(target: &Target) -> String {
    format!(
        "## Login Information\n- id: {}\n- password: {}\n",
        show(&target.user_id),
        show(&target.password)
    )
}

pub fn site_structure(target: &Target) -> String {
    let url = show(&target.url);
    format!(
        r#"
Analyze the website starting from {url}. Identify and output:
1. All accessible pages and subpages within the domain ({url}). Include dynamically loaded content and hidden links.
2. For each page, provide the purpose or functionality in concise terms.
3. Ensure the analysis includes:
   - Static links
   - Dynamic or JavaScript-driven links
   - Form actions and submission endpoints
   - API endpoints if visible
4. For pages with similar structures but different parameters (e.g., query strings like ?id=), group them under one representative page.

## Output JSON Format:
[
  {{ "path": "<path or URL>", "purpose": "<brief description of the page's purpose or functionality>" }},
  ...
]
Output only the JSON array.

{login}"#,
        login = login_section(target)
    )
}

pub fn scenarios(target: &Target, path: &str, purpose: &str, language: &Option<String>) -> String {
    format!(
        r#"
Generate exhaustive test scenarios for the following page:
- Page: {path}
  Purpose: {purpose}

For this page, include all possible user actions, such as:
  - Form submissions
  - Button clicks
  - Dropdown selections
  - Interactions with modals or dynamic elements

Test both expected behaviors and edge cases for each action.
Output format:
path: {path},
actions:
  - test: <description of action>,
    expect: <expected result>,
  - test: <description of action>,
    expect: <expected result>,

The output must be written in {language}.

## Root URL
{url}

{login}"#,
        language = show(language),
        url = show(&target.url),
        login = login_section(target)
    )
}

pub fn test_code(target: &Target, scenario: &str) -> String {
    format!(
        r#"
Based on the provided URL and scenario, generate the necessary test code for end-to-end testing.
The code should be written using Jest and Playwright, including all necessary imports and configurations.
Ensure the output is in a fully executable state, ready to be copied and run immediately.
Do not include any markdown code formatting. Output only the code.

## URL
{url}

{login}
## Scenario
{scenario}
"#,
        url = show(&target.url),
        login = login_section(target)
    )
}
