//! JSON Patch (RFC 6902) 应用器
//!
//! 面向扁平记录：每个路径只有一段，指向记录的一个字段，大小写不敏感
//! (`/Age` 与 `/age` 等价)。
//!
//! 每个操作先作用在草稿副本上，再把整条记录反序列化回目标类型做类型检查。
//! 失败的操作会通过回调报告 `(操作, 消息)`，它的效果被丢弃，后续操作照常执行。

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::response::FieldErrors;

/// 可以被补丁修改的记录
pub trait Patchable: Serialize + DeserializeOwned + Default {
    /// 可读但不可写的字段（对外名称）
    fn read_only_fields() -> &'static [&'static str] {
        &[]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl OperationKind {
    fn name(self) -> &'static str {
        match self {
            OperationKind::Add => "add",
            OperationKind::Remove => "remove",
            OperationKind::Replace => "replace",
            OperationKind::Move => "move",
            OperationKind::Copy => "copy",
            OperationKind::Test => "test",
        }
    }
}

/// 单个补丁操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatchOperation {
    pub op: OperationKind,
    #[schema(example = "/Age")]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub value: Option<Value>,
}

impl PatchOperation {
    pub fn new(op: OperationKind, path: impl Into<String>) -> Self {
        Self {
            op,
            path: path.into(),
            from: None,
            value: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }
}

/// 有序的补丁操作列表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument(pub Vec<PatchOperation>);

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// 至少一个操作失败
    #[error("{} patch operation(s) failed", .0.len())]
    Rejected(FieldErrors),
    #[error("patch target does not serialize to a JSON object")]
    NotAnObject,
    #[error("patch target could not be converted: {0}")]
    Serde(#[from] serde_json::Error),
}

impl PatchDocument {
    /// 按顺序应用所有操作，失败的操作交给 `on_error`。
    ///
    /// 只有目标本身无法转换时才返回 `Err`。
    pub fn apply_to<T, F>(&self, target: &mut T, mut on_error: F) -> Result<(), PatchError>
    where
        T: Patchable,
        F: FnMut(&PatchOperation, String),
    {
        let mut record = into_object(&*target)?;
        let defaults = into_object(&T::default())?;

        for operation in &self.0 {
            let mut draft = record.clone();
            let outcome = apply_operation::<T>(&mut draft, &defaults, operation)
                .and_then(|()| type_check::<T>(&draft, operation));
            match outcome {
                Ok(()) => record = draft,
                Err(message) => on_error(operation, message),
            }
        }

        *target = serde_json::from_value(Value::Object(record))?;
        Ok(())
    }

    /// 结果形式：要么是修改后的记录，要么是按操作路径收集的错误
    pub fn apply<T: Patchable>(&self, mut target: T) -> Result<T, PatchError> {
        let mut errors = FieldErrors::new();
        self.apply_to(&mut target, |operation, message| {
            errors.push(operation.path.clone(), message)
        })?;

        if errors.is_empty() {
            Ok(target)
        } else {
            Err(PatchError::Rejected(errors))
        }
    }
}

fn into_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, PatchError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(PatchError::NotAnObject),
    }
}

fn apply_operation<T: Patchable>(
    record: &mut Map<String, Value>,
    defaults: &Map<String, Value>,
    operation: &PatchOperation,
) -> Result<(), String> {
    let path = operation.path.as_str();
    match operation.op {
        OperationKind::Add | OperationKind::Replace => {
            let key = writable_field::<T>(record, path)?;
            let value = required_value(operation)?;
            record.insert(key, value.clone());
        }
        OperationKind::Remove => {
            let key = writable_field::<T>(record, path)?;
            reset_to_default(record, defaults, &key);
        }
        OperationKind::Move => {
            let from = required_from(operation)?;
            let source = writable_field::<T>(record, from)?;
            let key = writable_field::<T>(record, path)?;
            let value = record[&source].clone();
            reset_to_default(record, defaults, &source);
            record.insert(key, value);
        }
        OperationKind::Copy => {
            let from = required_from(operation)?;
            let source = resolve_field(record, from)?;
            let key = writable_field::<T>(record, path)?;
            let value = record[&source].clone();
            record.insert(key, value);
        }
        OperationKind::Test => {
            let key = resolve_field(record, path)?;
            let expected = required_value(operation)?;
            let current = &record[&key];
            if coerce::<T>(record, &key, &integral(expected))? != *current {
                return Err(format!(
                    "The current value '{}' at path '{}' is not equal to the test value '{}'.",
                    display(current),
                    path,
                    display(expected)
                ));
            }
        }
    }
    Ok(())
}

/// 把 JSON Pointer 解析为记录中已有的字段名
fn resolve_field(record: &Map<String, Value>, pointer: &str) -> Result<String, String> {
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(format!("The path '{}' is not a valid JSON Pointer.", pointer));
    };

    let mut segments = rest.split('/').map(unescape);
    let segment = segments.next().unwrap_or_default();
    let key = record
        .keys()
        .find(|key| key.eq_ignore_ascii_case(&segment))
        .cloned()
        .ok_or_else(|| not_found(&segment))?;

    // 扁平记录没有嵌套字段
    if let Some(nested) = segments.next() {
        return Err(not_found(&nested));
    }

    Ok(key)
}

fn writable_field<T: Patchable>(record: &Map<String, Value>, pointer: &str) -> Result<String, String> {
    let key = resolve_field(record, pointer)?;
    if T::read_only_fields()
        .iter()
        .any(|field| field.eq_ignore_ascii_case(&key))
    {
        return Err(format!(
            "The property at path '{}' could not be updated.",
            pointer
        ));
    }
    Ok(key)
}

fn required_value(operation: &PatchOperation) -> Result<&Value, String> {
    operation.value.as_ref().ok_or_else(|| {
        format!(
            "The value field is required for the '{}' operation.",
            operation.op.name()
        )
    })
}

fn required_from(operation: &PatchOperation) -> Result<&str, String> {
    operation.from.as_deref().ok_or_else(|| {
        format!(
            "The 'from' field is required for the '{}' operation.",
            operation.op.name()
        )
    })
}

fn reset_to_default(record: &mut Map<String, Value>, defaults: &Map<String, Value>, key: &str) {
    let value = defaults.get(key).cloned().unwrap_or(Value::Null);
    record.insert(key.to_string(), value);
}

/// 按字段类型规范化待比较的值；类型不符时报告无效值而不是不相等
fn coerce<T: Patchable>(
    record: &Map<String, Value>,
    key: &str,
    value: &Value,
) -> Result<Value, String> {
    let mut candidate = record.clone();
    candidate.insert(key.to_string(), value.clone());
    let typed: T = serde_json::from_value(Value::Object(candidate))
        .map_err(|_| invalid_value(value))?;
    let normalized = into_object(&typed).map_err(|e| e.to_string())?;
    Ok(normalized.get(key).cloned().unwrap_or(Value::Null))
}

/// 数值按值比较：`30.0` 与 `30` 相等
fn integral(value: &Value) -> Value {
    match value.as_f64() {
        Some(f) if value.is_f64() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Value::from(f as i64)
        }
        _ => value.clone(),
    }
}

fn type_check<T: Patchable>(
    draft: &Map<String, Value>,
    operation: &PatchOperation,
) -> Result<(), String> {
    serde_json::from_value::<T>(Value::Object(draft.clone()))
        .map(|_| ())
        .map_err(|_| match &operation.value {
            Some(value) => invalid_value(value),
            None => format!(
                "The '{}' operation at path '{}' produced an invalid value.",
                operation.op.name(),
                operation.path
            ),
        })
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn not_found(segment: &str) -> String {
    format!(
        "The target location specified by path segment '{}' was not found.",
        segment
    )
}

fn invalid_value(value: &Value) -> String {
    format!("The value '{}' is invalid for target location.", display(value))
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
