//! 宽松字段读取：类型不符的字段只回退自身，不影响整个文档。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// 整数字段，同时接受整数值的浮点数（如 `1024.0`）。
pub(crate) fn value_to_i32(value: &Value) -> Option<i32> {
    if let Some(int) = value.as_i64() {
        return i32::try_from(int).ok();
    }
    let float = value.as_f64()?;
    let in_range = float.fract() == 0.0 && float >= i32::MIN as f64 && float <= i32::MAX as f64;
    in_range.then_some(float as i32)
}

pub(crate) fn i32_field<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let converted = value_to_i32(&value);
    if converted.is_none() {
        debug!(value = %value, "整数字段类型不符，使用默认值");
    }
    Ok(converted)
}

pub(crate) fn f32_field<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let converted = value.as_f64().map(|float| float as f32);
    if converted.is_none() {
        debug!(value = %value, "数值字段类型不符，使用默认值");
    }
    Ok(converted)
}

pub(crate) fn string_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        other => {
            debug!(value = %other, "字符串字段类型不符，使用默认值");
            Ok(None)
        }
    }
}

/// 对象字段：不是对象或无法识别时视为缺失。
pub(crate) fn object_field<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        debug!(value = %value, "对象字段类型不符，视为缺失");
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// 记录数组：不是数组时视为缺失，无法识别的单条记录被跳过。
pub(crate) fn records_field<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let records = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                debug!(error = %err, "跳过无法识别的记录");
                None
            }
        })
        .collect();
    Ok(Some(records))
}

/// 原样保留字段值，供调用方按需解释。
pub(crate) fn raw_field<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
