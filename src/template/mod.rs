use once_cell::sync::Lazy;
use regex::Regex;

use crate::wire::PromptVariables;

static VARIABLE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("variable token pattern"));

/// Distinct `{{name}}` variables across `texts`, in first-seen order.
///
/// Texts are scanned in the order given, each left to right. Tokens with
/// nested or unbalanced braces do not match.
pub fn extract_variables<'a, I>(texts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<String> = Vec::new();
    for text in texts {
        for cap in VARIABLE_TOKEN.captures_iter(text) {
            let name = &cap[1];
            if !out.iter().any(|v| v == name) {
                out.push(name.to_string());
            }
        }
    }
    out
}

/// Bring `map` in line with `vars`: new names get an empty value list,
/// vanished names are dropped, surviving entries keep their values.
///
/// Returns true when the key set changed.
pub fn reconcile(vars: &[String], map: &mut PromptVariables) -> bool {
    let before = map.len();
    map.retain(|k, _| vars.contains(k));
    let mut changed = map.len() != before;
    for v in vars {
        if !map.contains_key(v) {
            map.insert(v.clone(), Vec::new());
            changed = true;
        }
    }
    changed
}

/// Replace every `{{name}}` in `text` with `value`.
pub fn render(text: &str, name: &str, value: &str) -> String {
    text.replace(&format!("{{{{{name}}}}}"), value)
}

/// One delivery's texts: the title and prompt with a single variable filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub variable: String,
    pub value: String,
    pub email_title: String,
    pub prompt: String,
}

/// Every (variable, value) pair rendered into title and prompt, one variable
/// at a time, in map order.
pub fn expand(email_title: &str, prompt: &str, vars: &PromptVariables) -> Vec<Rendered> {
    vars.iter()
        .flat_map(|(name, values)| {
            values.iter().map(move |value| Rendered {
                variable: name.clone(),
                value: value.clone(),
                email_title: render(email_title, name, value),
                prompt: render(prompt, name, value),
            })
        })
        .collect()
}
