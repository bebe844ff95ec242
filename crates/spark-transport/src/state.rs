use core::fmt;

/// 单条连接在本组件内的生命周期阶段。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 连接由外部调度器按节拍反复驱动；每个节拍依据当前阶段决定执行建连、收发泵还是拆除，
///   因此阶段必须是显式、可检查的值；
/// - 阶段只能前进：`New → Connected → Closing`，或建连失败时 `New → Closing`。
///
/// ## 契约说明（What）
/// - `New`：刚由工厂创建，尚未持有描述符；
/// - `Connected`：持有有效且非阻塞的描述符；
/// - `Closing`：终态；下一个节拍执行一次拆除，此后记录保持惰性；
/// - [`ConnectionState::can_transition_to`] 是所有状态写入前的唯一校验入口。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    New,
    Connected,
    Closing,
}

impl ConnectionState {
    /// 判断能否从当前阶段迁移到 `next`。
    ///
    /// 只允许向前迁移；`Closing → Closing` 视为幂等的重复请求，返回 `true`。
    pub const fn can_transition_to(self, next: ConnectionState) -> bool {
        matches!(
            (self, next),
            (ConnectionState::New, ConnectionState::Connected)
                | (ConnectionState::New, ConnectionState::Closing)
                | (ConnectionState::Connected, ConnectionState::Closing)
                | (ConnectionState::Closing, ConnectionState::Closing)
        )
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closing)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ConnectionState::New => "new",
            ConnectionState::Connected => "connected",
            ConnectionState::Closing => "closing",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 连接所使用的传输变体。
///
/// - `PlainSocket`：明文 TCP，本组件持有收/发两块缓冲；
/// - `TlsSocket`：TLS 之上的 TCP，缓冲由 TLS 实现自行管理，本组件不触碰。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportKind {
    PlainSocket,
    TlsSocket,
}

impl TransportKind {
    /// 本组件是否需要为该变体分配并持有收/发缓冲。
    #[inline]
    pub const fn owns_buffers(self) -> bool {
        matches!(self, TransportKind::PlainSocket)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TransportKind::PlainSocket => "plain",
            TransportKind::TlsSocket => "tls",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionState::*;
    use super::*;

    #[test]
    fn only_forward_transitions_are_allowed() {
        assert!(New.can_transition_to(Connected));
        assert!(New.can_transition_to(Closing));
        assert!(Connected.can_transition_to(Closing));
        assert!(Closing.can_transition_to(Closing));

        assert!(!Connected.can_transition_to(New));
        assert!(!Closing.can_transition_to(New));
        assert!(!Closing.can_transition_to(Connected));
        assert!(!New.can_transition_to(New));
        assert!(!Connected.can_transition_to(Connected));
    }

    #[test]
    fn only_plain_sockets_own_buffers() {
        assert!(TransportKind::PlainSocket.owns_buffers());
        assert!(!TransportKind::TlsSocket.owns_buffers());
    }
}
