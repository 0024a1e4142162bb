use serde::Deserialize;

/// Request body for creating or updating a to-do item.
#[derive(Debug, Deserialize)]
pub struct TodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_description_defaults_empty() {
        let req: TodoRequest = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(req.title, "t");
        assert!(req.description.is_empty());
    }
}
