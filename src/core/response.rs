//! 核心响应处理模块

use serde::{ser::SerializeMap, Serialize, Serializer};
use utoipa::ToSchema;

/// 字段级错误集合，保持首次出现的顺序。
///
/// 序列化为 `{"字段或路径": ["消息", ...]}`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(key: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(key, message);
        errors
    }

    pub fn push(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.push((key.into(), message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, m)| (k.as_str(), m.as_str()))
    }

    /// 某个键下的全部消息
    pub fn messages_for(&self, key: &str) -> Vec<&str> {
        self.iter().filter(|(k, _)| *k == key).map(|(_, m)| m).collect()
    }

    fn grouped(&self) -> Vec<(&str, Vec<&str>)> {
        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        for (key, message) in self.iter() {
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, messages)) => messages.push(message),
                None => groups.push((key, vec![message])),
            }
        }
        groups
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let groups = self.grouped();
        let mut map = serializer.serialize_map(Some(groups.len()))?;
        for (key, messages) in groups {
            map.serialize_entry(key, &messages)?;
        }
        map.end()
    }
}

/// 错误响应结构
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub errors: Option<FieldErrors>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_errors_group_by_key_in_first_seen_order() {
        let mut errors = FieldErrors::new();
        errors.push("/Age", "bad age");
        errors.push("/Name", "bad name");
        errors.push("/Age", "still bad");

        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            value,
            json!({"/Age": ["bad age", "still bad"], "/Name": ["bad name"]})
        );
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.messages_for("/Age"), vec!["bad age", "still bad"]);
    }

    #[test]
    fn test_error_response_omits_empty_errors() {
        let body = ErrorResponse {
            error: "NOT_FOUND".to_string(),
            message: "missing".to_string(),
            code: 404,
            timestamp: "now".to_string(),
            errors: None,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("errors").is_none());
        assert_eq!(value["code"], 404);
    }
}
