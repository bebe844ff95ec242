use std::io;

use spark_iobuf::BufferError;
use spark_transport::{TransportKind, UriError};
use thiserror::Error;

/// 套接字传输在建连、检查就绪与构造阶段可能返回的错误。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 调度器需要区分“本节拍失败但连接已被关闭”（解析/建连/就绪检查）与
///   “构造阶段失败且已回滚”（URI、分配、登记），以便决定是否重建连接；
/// - 每个变体都带有稳定错误码，日志与告警系统以错误码而非文案做聚合。
///
/// ## 契约说明（What）
/// - 瞬时 I/O（被信号中断、暂不可用）永远不会以本类型出现，见 [`is_transient`]；
/// - 对端关闭与致命收发错误以 [`PumpOutcome::CloseRequested`](crate::PumpOutcome) 报告，
///   同样不使用本类型。
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("URI `{uri}` 解析失败：{source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: UriError,
    },

    #[error("解析 {host}:{port} 失败：{source}")]
    Resolution {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("{host}:{port} 未解析出任何候选地址")]
    NoCandidates { host: String, port: u16 },

    #[error("{host}:{port} 的 {attempts} 个候选地址均无法连接")]
    ConnectExhausted {
        host: String,
        port: u16,
        attempts: usize,
        #[source]
        last: Option<io::Error>,
    },

    #[error("配置套接字选项 {option} 失败：{source}")]
    Configure {
        option: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("就绪检查失败：{source}")]
    Poll {
        #[source]
        source: io::Error,
    },

    #[error("为 {capacity} 字节的收发缓冲分配内存失败")]
    Allocation { capacity: usize },

    #[error("缓冲游标越界：{source}")]
    BufferCursor {
        #[source]
        source: BufferError,
    },

    #[error("连接登记失败：{reason}")]
    Registration { reason: String },

    #[error("未注册 {kind} 传输的实现")]
    UnsupportedTransport { kind: TransportKind },

    #[error("传输配置非法：{reason}")]
    InvalidConfig { reason: String },
}

impl TransportError {
    /// 稳定错误码，格式为 `spark.transport.socket.<动作>`。
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::InvalidUri { .. } => "spark.transport.socket.invalid_uri",
            TransportError::Resolution { .. } => "spark.transport.socket.resolve_failed",
            TransportError::NoCandidates { .. } => "spark.transport.socket.no_candidates",
            TransportError::ConnectExhausted { .. } => "spark.transport.socket.connect_exhausted",
            TransportError::Configure { .. } => "spark.transport.socket.configure_failed",
            TransportError::Poll { .. } => "spark.transport.socket.poll_failed",
            TransportError::Allocation { .. } => "spark.transport.socket.allocation_failed",
            TransportError::BufferCursor { .. } => "spark.transport.socket.buffer_cursor",
            TransportError::Registration { .. } => "spark.transport.socket.registration_failed",
            TransportError::UnsupportedTransport { .. } => {
                "spark.transport.socket.unsupported_transport"
            }
            TransportError::InvalidConfig { .. } => "spark.transport.socket.invalid_config",
        }
    }
}

impl From<BufferError> for TransportError {
    fn from(error: BufferError) -> Self {
        match error {
            BufferError::Allocation { capacity } => TransportError::Allocation { capacity },
            other => TransportError::BufferCursor { source: other },
        }
    }
}

/// 判断一次收发失败是否为瞬时错误：被信号中断或暂不可用，下一节拍重试即可。
pub fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds_are_interrupt_and_would_block() {
        assert!(is_transient(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(is_transient(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(is_transient(&io::Error::from_raw_os_error(libc::EAGAIN)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::BrokenPipe)));
    }

    #[test]
    fn buffer_allocation_maps_to_allocation_code() {
        let err = TransportError::from(BufferError::Allocation { capacity: 64 });
        assert_eq!(err.code(), "spark.transport.socket.allocation_failed");

        let err = TransportError::from(BufferError::DrainOverrun {
            requested: 2,
            unread: 1,
        });
        assert_eq!(err.code(), "spark.transport.socket.buffer_cursor");
    }

    #[test]
    fn codes_share_the_crate_prefix() {
        let samples = [
            TransportError::NoCandidates {
                host: "h".into(),
                port: 1,
            },
            TransportError::Poll {
                source: io::Error::from(io::ErrorKind::Other),
            },
            TransportError::UnsupportedTransport {
                kind: TransportKind::TlsSocket,
            },
        ];
        for err in samples {
            assert!(err.code().starts_with("spark.transport.socket."));
        }
    }
}
