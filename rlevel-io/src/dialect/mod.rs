//! 三种 JSON 方言：编辑器（可往返）、服务端（权威玩法数据）与客户端（渲染引导）。

pub mod client;
pub mod editor;
mod lenient;
pub mod server;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::IoError;

/// 四空格缩进输出，字段顺序由结构体声明顺序决定，保证重复编码结果逐字节一致。
pub(crate) fn to_pretty_json<T: Serialize>(
    dialect: &'static str,
    value: &T,
) -> Result<String, IoError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| IoError::Encode { dialect, source })?;
    String::from_utf8(buffer).map_err(|err| IoError::InvalidDocument(err.to_string()))
}
