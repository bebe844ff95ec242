use std::time::Duration;

use serde::Deserialize;
use spark_iobuf::DEFAULT_CAPACITY;

use crate::TransportError;

/// 套接字传输的可调参数。
///
/// # 契约说明（What）
/// - `buffer_capacity`：明文连接收/发缓冲各自的容量，默认 1024，必须大于 0；
/// - `verbose_connect`：是否为每个候选地址输出建连诊断，默认开启；
/// - `connect_timeout_ms`：单个候选地址的建连超时，缺省表示不设上限（阻塞直至系统超时），
///   设置时必须大于 0。
///
/// 可由 TOML 片段加载，未出现的字段取默认值：
///
/// ```toml
/// buffer_capacity = 2048
/// connect_timeout_ms = 3000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SocketTransportConfig {
    pub buffer_capacity: usize,
    pub verbose_connect: bool,
    pub connect_timeout_ms: Option<u64>,
}

impl Default for SocketTransportConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_CAPACITY,
            verbose_connect: true,
            connect_timeout_ms: None,
        }
    }
}

impl SocketTransportConfig {
    /// 解析并校验 TOML 文本。
    pub fn from_toml_str(text: &str) -> Result<Self, TransportError> {
        let config: SocketTransportConfig =
            toml::from_str(text).map_err(|err| TransportError::InvalidConfig {
                reason: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        if self.buffer_capacity == 0 {
            return Err(TransportError::InvalidConfig {
                reason: "buffer_capacity 必须大于 0".to_string(),
            });
        }
        if self.connect_timeout_ms == Some(0) {
            return Err(TransportError::InvalidConfig {
                reason: "connect_timeout_ms 必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}
