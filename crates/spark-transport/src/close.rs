use core::fmt;

/// I/O 泵请求关闭连接的原因。
///
/// 所有原因都映射到同一个动作（进入 `Closing`），区分它们只是为了日志与观测。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// 对端优雅关闭：可读就绪但接收到 0 字节。
    PeerClosed,
    /// 发送遇到非瞬时错误，或在非空数据上写出 0 字节。
    SendFailed,
    /// 接收遇到非瞬时错误。
    RecvFailed,
    /// 就绪检查报告了异常条件。
    ErrorCondition,
}

impl CloseReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            CloseReason::PeerClosed => "peer_closed",
            CloseReason::SendFailed => "send_failed",
            CloseReason::RecvFailed => "recv_failed",
            CloseReason::ErrorCondition => "error_condition",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
