use serde::{Deserialize, Serialize};

/// What the widget knows about the page it is mounted on. Derived once when
/// the widget is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPostContext {
    pub url: Option<String>,
    pub path: Option<String>,
    pub labels: Vec<String>,
}

impl CurrentPostContext {
    pub fn primary_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }
}
