use std::net::SocketAddr;

use socket2::Socket;
use spark_transport::{
    CloseReason, ConnectionId, ConnectionState, Endpoint, Readiness, RegistryId, TransportKind,
};
use tracing::{debug, error, warn};

use crate::TransportError;
use crate::connector::Connector;
use crate::context::IoContext;
use crate::pump::PumpOutcome;
use crate::transport::SocketTransport;

/// 单个节拍的结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// 本节拍完成建连，连接进入 `Connected`。
    Connected,
    /// 泵循环正常完成。
    Idle,
    /// 泵请求关闭，连接已进入 `Closing`；下一节拍执行拆除。
    CloseRequested(CloseReason),
    /// 本节拍执行了拆除，描述符与缓冲均已释放。
    Released,
    /// 连接已拆除，本节拍无事可做。
    Inert,
}

/// 由外部调度器逐节拍驱动的一条连接。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 把“建连 → 收发 → 拆除”的生命周期收敛为一个可以被反复调用、每次只做有限工作的
///   [`tick`](Self::tick)，让单线程调度器能够公平地轮转大量连接；
/// - 所有状态迁移都在本类型内部完成：泵只报告“应当关闭”，由 `tick` 负责迁移到 `Closing`，
///   调度器无需也无法遗漏这一步。
///
/// ## 状态与资源（How）
/// - `New`：无描述符；`tick` 执行阻塞建连，成功进入 `Connected`，失败进入 `Closing` 并返回错误；
/// - `Connected`：持有非阻塞描述符；`tick` 执行一次泵循环；
/// - `Closing`：首个 `tick` 拆除传输对象（消耗其所有权）并返回 [`TickOutcome::Released`]，
///   之后的 `tick` 返回 [`TickOutcome::Inert`]；
/// - 记录在未经拆除的情况下被丢弃时，`Drop` 执行同样的释放。
///
/// ## 契约说明（What）
/// - 同一连接的 `tick` 必须串行调用；
/// - [`close`](Self::close) 是唯一的取消手段：强制进入 `Closing`，下一节拍拆除；
/// - `user_data` 由调用方持有语义，本类型从不解读。
pub struct Connection<U> {
    id: ConnectionId,
    registry_id: RegistryId,
    state: ConnectionState,
    kind: TransportKind,
    endpoint: Endpoint,
    poll_flags: Readiness,
    connector: Connector,
    transport: Option<Box<dyn SocketTransport>>,
    socket: Option<Socket>,
    user_data: U,
}

impl<U> Connection<U> {
    pub(crate) fn new(
        id: ConnectionId,
        registry_id: RegistryId,
        endpoint: Endpoint,
        connector: Connector,
        transport: Box<dyn SocketTransport>,
        user_data: U,
    ) -> Self {
        Self {
            id,
            registry_id,
            state: ConnectionState::New,
            kind: transport.kind(),
            endpoint,
            poll_flags: Readiness::empty(),
            connector,
            transport: Some(transport),
            socket: None,
            user_data,
        }
    }

    /// 推进一个节拍。
    pub fn tick(&mut self) -> Result<TickOutcome, TransportError> {
        match self.state {
            ConnectionState::New => self.open(),
            ConnectionState::Connected => self.pump(),
            ConnectionState::Closing => {
                if self.is_released() {
                    return Ok(TickOutcome::Inert);
                }
                self.release();
                Ok(TickOutcome::Released)
            }
        }
    }

    /// 请求关闭；返回本次调用是否真正改变了状态。
    pub fn close(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.transition(ConnectionState::Closing);
        true
    }

    /// 对已连接的描述符执行一次就绪检查，结果覆盖写入 `poll_flags`。
    ///
    /// 未连接时不做系统调用，返回空集合。
    pub fn poll(&mut self) -> Result<Readiness, TransportError> {
        self.poll_flags = Readiness::empty();
        if self.state != ConnectionState::Connected {
            return Ok(self.poll_flags);
        }
        if let (Some(transport), Some(socket)) = (self.transport.as_mut(), self.socket.as_ref()) {
            self.poll_flags = transport.poll(socket)?;
        }
        Ok(self.poll_flags)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn registry_id(&self) -> RegistryId {
        self.registry_id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// 最近一次就绪检查的结果。
    pub fn poll_flags(&self) -> Readiness {
        self.poll_flags
    }

    pub fn user_data(&self) -> &U {
        &self.user_data
    }

    pub fn user_data_mut(&mut self) -> &mut U {
        &mut self.user_data
    }

    /// 明文连接的收发上下文；TLS 连接或已拆除时为 `None`。
    pub fn io_context(&self) -> Option<&IoContext> {
        self.transport.as_ref().and_then(|t| t.io_context())
    }

    pub fn io_context_mut(&mut self) -> Option<&mut IoContext> {
        self.transport.as_mut().and_then(|t| t.io_context_mut())
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref()?.local_addr().ok()?.as_socket()
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref()?.peer_addr().ok()?.as_socket()
    }

    /// 描述符与传输对象是否都已释放。
    pub fn is_released(&self) -> bool {
        self.transport.is_none() && self.socket.is_none()
    }

    fn open(&mut self) -> Result<TickOutcome, TransportError> {
        let attempt = match self.transport.as_mut() {
            Some(transport) => Some(transport.connect(&self.connector, &self.endpoint)),
            None => None,
        };
        let Some(attempt) = attempt else {
            self.transition(ConnectionState::Closing);
            return Ok(TickOutcome::Inert);
        };
        match attempt {
            Ok(socket) => {
                self.socket = Some(socket);
                self.transition(ConnectionState::Connected);
                Ok(TickOutcome::Connected)
            }
            Err(err) => {
                error!(
                    connection_id = %self.id,
                    host = self.endpoint.host(),
                    port = self.endpoint.port(),
                    code = err.code(),
                    error = %err,
                    "connect failed"
                );
                self.transition(ConnectionState::Closing);
                Err(err)
            }
        }
    }

    fn pump(&mut self) -> Result<TickOutcome, TransportError> {
        let cycle = match (self.transport.as_mut(), self.socket.as_ref()) {
            (Some(transport), Some(socket)) => Some(transport.pump(socket, &mut self.poll_flags)),
            _ => None,
        };
        let Some(cycle) = cycle else {
            self.transition(ConnectionState::Closing);
            return Ok(TickOutcome::CloseRequested(CloseReason::ErrorCondition));
        };
        match cycle {
            Ok(PumpOutcome::NoChange) => Ok(TickOutcome::Idle),
            Ok(PumpOutcome::CloseRequested(reason)) => {
                error!(
                    connection_id = %self.id,
                    host = self.endpoint.host(),
                    port = self.endpoint.port(),
                    reason = %reason,
                    "socket closed"
                );
                self.transition(ConnectionState::Closing);
                Ok(TickOutcome::CloseRequested(reason))
            }
            Err(err) => {
                error!(
                    connection_id = %self.id,
                    code = err.code(),
                    error = %err,
                    "pump cycle failed"
                );
                self.transition(ConnectionState::Closing);
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        if !self.state.can_transition_to(next) {
            warn!(
                connection_id = %self.id,
                state = %self.state,
                next = %next,
                "rejected backward state transition"
            );
            return;
        }
        if self.state != next {
            debug!(connection_id = %self.id, state = %next, from = %self.state, "state transition");
        }
        self.state = next;
    }

    fn release(&mut self) {
        let socket = self.socket.take();
        if let Some(transport) = self.transport.take() {
            if let Some(stats) = transport.io_context().map(IoContext::stats) {
                debug!(
                    connection_id = %self.id,
                    bytes_sent = stats.bytes_sent,
                    bytes_received = stats.bytes_received,
                    "teardown"
                );
            } else {
                debug!(connection_id = %self.id, kind = %self.kind, "teardown");
            }
            transport.teardown(socket);
        }
    }
}

impl<U> Drop for Connection<U> {
    fn drop(&mut self) {
        if !self.is_released() {
            self.release();
        }
    }
}

impl<U> std::fmt::Debug for Connection<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("registry_id", &self.registry_id)
            .field("state", &self.state)
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("poll_flags", &self.poll_flags)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}
