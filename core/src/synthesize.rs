use vulntechx_common::template::{CommandTemplate, TemplateMode};

/// Builds the concrete shell command for one host.
///
/// `tags` comes out of [`crate::filter::filter_tech`] and is never empty.
pub fn synthesize(template: &CommandTemplate, tags: &[String]) -> String {
    let value = match template.mode() {
        TemplateMode::Tags => tag_list(tags),
        TemplateMode::Condition => condition(tags),
    };
    template.render(&value)
}

fn tag_list(tags: &[String]) -> String {
    tags.join(",").to_lowercase()
}

fn condition(tags: &[String]) -> String {
    let predicates: Vec<String> = tags
        .iter()
        .map(|tag| format!("contains(to_lower(name),'{}')", tag.to_lowercase()))
        .collect();
    format!("\"{}\"", predicates.join(" || "))
}
