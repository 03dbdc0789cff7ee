use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    /// Identifier of another managed device.
    Device,
    String,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingChoice {
    pub title: String,
    pub value: String,
}

impl SettingChoice {
    pub fn plain(value: &str) -> Self {
        Self {
            title: value.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub key: String,
    pub title: String,
    pub description: String,
    pub kind: SettingKind,
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<SettingChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<(i64, i64)>,
    pub hidden: bool,
}

impl Setting {
    pub fn new(key: &str, title: &str, description: &str, kind: SettingKind) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            kind,
            value: String::new(),
            choices: vec![],
            range: None,
            hidden: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_choices(mut self, choices: Vec<SettingChoice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }
}
