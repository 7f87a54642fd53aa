use serde::Deserialize;

use crate::error::ApiError;

/// Body for both create and update.
#[derive(Debug, Default, Deserialize)]
pub struct PostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl PostRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::MissingField("title"));
        }
        if self.body.trim().is_empty() {
            return Err(ApiError::MissingField("body"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_body_are_required() {
        let ok = PostRequest { title: "t".into(), body: "b".into() };
        assert!(ok.validate().is_ok());

        let no_title = PostRequest { title: " ".into(), body: "b".into() };
        assert!(matches!(no_title.validate(), Err(ApiError::MissingField("title"))));

        let no_body: PostRequest = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert!(matches!(no_body.validate(), Err(ApiError::MissingField("body"))));
    }
}
