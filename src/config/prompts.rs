//! Prompt templates for Delve.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory
//! (`react.toml`, `zeroshot.toml`). Templates use `{{name}}` placeholders.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub react: ReactPrompts,
    pub zeroshot: ZeroshotPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the ReAct strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactPrompts {
    /// Per-turn agent prompt. Variables: `question`, `scratchpad`.
    pub agent: String,
    /// System instruction for the final report.
    pub report_system: String,
    /// Report request. Variables: `question`, `research_summary`.
    pub report_user: String,
}

impl Default for ReactPrompts {
    fn default() -> Self {
        Self {
            agent: r#"You are an expert researcher. Your goal is to answer the user's question by breaking it down into a series of search queries.

You must follow this cycle:
1.  **Thought**: Reason about the problem and decide what information you need next.
2.  **Action**: Issue a search query to get that information.
3.  **Observation**: You will be given the result of the search.

Repeat this process until you have enough information to answer the question comprehensively.

TOOLS:
------
You have access to a single tool:
- `Search`: A search engine. The input should be a search query.

RESPONSE FORMAT:
----------------
You **MUST** use the following format for your response at each step.

Thought: The user wants to know X. I should search for Y to find out.
Action: Search
Action Input: Y

When you have gathered enough information, use the special `Finish` action. **The Action Input for `Finish` should be a brief summary of your findings.**

Thought: I have collected all the necessary information. I can now synthesize the final answer.
Action: Finish
Action Input: I found that X is caused by Y and results in Z. The key data points are A, B, and C.

---

Here is the user's question:
{{question}}

---

Here is the history of your work so far (Thought/Action/Observation):
{{scratchpad}}
"#
            .to_string(),

            report_system: "You are a professional report writer. Your task is to synthesize the provided \
research summary into a comprehensive, well-structured, and easy-to-read report. \
The report should directly answer the user's original question. Use markdown for formatting."
                .to_string(),

            report_user: r#"Original Question: {{question}}

Collected Research Summary (including thoughts, actions, and observations):
---------------------
{{research_summary}}
---------------------

Based on the research summary above, please generate a detailed final report."#
                .to_string(),
        }
    }
}

/// Prompts for the zero-shot strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZeroshotPrompts {
    /// Query generation request. Variables: `topic`, `format_instructions`.
    pub queries: String,
    /// System instruction for the final report.
    pub report_system: String,
    /// Report request. Variables: `topic`, `search_results`.
    pub report_user: String,
}

impl Default for ZeroshotPrompts {
    fn default() -> Self {
        Self {
            queries: r#"You are a research assistant planning a web investigation.

Write between 3 and 5 distinct web search queries that together cover the most important aspects of the research topic below. Prefer specific queries over broad ones.

Research topic: {{topic}}

{{format_instructions}}"#
                .to_string(),

            report_system: "You are a professional report writer. Using only the provided search results, \
write a comprehensive, well-structured report on the research topic. \
Cite sources by their result number and URL where relevant. Use markdown for formatting."
                .to_string(),

            report_user: r#"Research Topic: {{topic}}

Search Results:
---------------------
{{search_results}}
---------------------

Based on the search results above, please generate a detailed final report."#
                .to_string(),
        }
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern is valid")
    })
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let react_path = custom_path.join("react.toml");
            if react_path.exists() {
                let content = std::fs::read_to_string(&react_path)?;
                prompts.react = toml::from_str(&content)?;
            }

            let zeroshot_path = custom_path.join("zeroshot.toml");
            if zeroshot_path.exists() {
                let content = std::fs::read_to_string(&zeroshot_path)?;
                prompts.zeroshot = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single pass over the template, so values that
    /// themselves contain `{{...}}` are inserted verbatim. Unknown
    /// placeholders are left in place.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        placeholder_regex()
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.react.agent.contains("{{scratchpad}}"));
        assert!(prompts.react.report_user.contains("{{research_summary}}"));
        assert!(prompts.zeroshot.queries.contains("{{format_instructions}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_values() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "what is {{scratchpad}}?".to_string());
        vars.insert("scratchpad".to_string(), "history".to_string());

        let result = Prompts::render("Q: {{question}} / {{scratchpad}} / {{missing}}", &vars);
        assert_eq!(result, "Q: what is {{scratchpad}}? / history / {{missing}}");
    }

    #[test]
    fn test_custom_variables_overridden_by_call_vars() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("tone".to_string(), "formal".to_string());
        prompts.variables.insert("topic".to_string(), "config".to_string());

        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), "call".to_string());

        let result = prompts.render_with_custom("{{tone}} {{topic}}", &vars);
        assert_eq!(result, "formal call");
    }

    #[test]
    fn test_load_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("react.toml"),
            "report_system = \"Write tersely.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.react.report_system, "Write tersely.");
        // Fields missing from the override keep their defaults.
        assert!(prompts.react.agent.contains("{{question}}"));
        assert_eq!(prompts.zeroshot.queries, ZeroshotPrompts::default().queries);
    }
}
