//! String template rendering utilities.

pub struct TemplateVars;

impl TemplateVars {
    pub const PROJECT: &'static str = "project";
}

/// Replace every `{{key}}` placeholder with its value.
pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_all_occurrences() {
        let out = render(
            "{{project}}/{{project}}.git",
            &[(TemplateVars::PROJECT, "imos-toolbox")],
        );
        assert_eq!(out, "imos-toolbox/imos-toolbox.git");
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        assert_eq!(render("{{other}}", &[("project", "x")]), "{{other}}");
    }
}
