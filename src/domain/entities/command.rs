/// Identity and help text for a slash-command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub display_form: String,
    pub description: String,
    pub usage: Option<String>,
}

impl CommandInfo {
    pub fn new(
        name: impl Into<String>,
        display_form: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_form: display_form.into(),
            description: description.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn matches(&self, input: &str) -> bool {
        self.name.eq_ignore_ascii_case(input)
    }
}
