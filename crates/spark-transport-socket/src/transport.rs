use socket2::Socket;
use spark_transport::{Endpoint, Readiness, TransportKind};

use crate::connector::Connector;
use crate::context::IoContext;
use crate::pump::{PumpOutcome, pump};
use crate::{TransportError, poller};

/// 传输变体的能力接口：建连、就绪检查、泵循环、拆除。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 明文与 TLS 连接共享同一套状态机，只在“如何搬运字节、谁持有缓冲”上不同；
///   连接在构造时选定变体，此后通过本 trait 的对象分派。
///
/// ## 契约说明（What）
/// - `connect`：默认直接交给 [`Connector`]；TLS 变体可在此之后追加握手准备；
/// - `poll`：默认执行零超时就绪检查；
/// - `pump`：仅在连接处于 `Connected` 时调用，`flags` 每次被整体覆盖；
/// - `teardown`：消耗 `Box<Self>`，释放描述符与变体持有的全部资源；
///   所有权转移保证同一对象不可能被拆除两次；
/// - `io_context`：仅持有本组件缓冲的变体返回 `Some`。
pub trait SocketTransport: Send {
    fn kind(&self) -> TransportKind;

    fn connect(
        &mut self,
        connector: &Connector,
        endpoint: &Endpoint,
    ) -> Result<Socket, TransportError> {
        connector.connect(endpoint.host(), endpoint.port())
    }

    fn poll(&mut self, socket: &Socket) -> Result<Readiness, TransportError> {
        poller::poll_readiness(socket)
    }

    fn pump(
        &mut self,
        socket: &Socket,
        flags: &mut Readiness,
    ) -> Result<PumpOutcome, TransportError>;

    fn teardown(self: Box<Self>, socket: Option<Socket>);

    fn io_context(&self) -> Option<&IoContext> {
        None
    }

    fn io_context_mut(&mut self) -> Option<&mut IoContext> {
        None
    }
}

/// 明文 TCP 变体：独占一个 [`IoContext`]。
#[derive(Debug)]
pub struct PlainSocket {
    ctx: IoContext,
}

impl PlainSocket {
    /// 分配收发缓冲，失败时返回 [`TransportError::Allocation`]。
    pub fn try_new(buffer_capacity: usize) -> Result<Self, TransportError> {
        Ok(Self {
            ctx: IoContext::try_new(buffer_capacity)?,
        })
    }
}

impl SocketTransport for PlainSocket {
    fn kind(&self) -> TransportKind {
        TransportKind::PlainSocket
    }

    fn pump(
        &mut self,
        socket: &Socket,
        flags: &mut Readiness,
    ) -> Result<PumpOutcome, TransportError> {
        pump(socket, &mut self.ctx, flags)
    }

    fn teardown(self: Box<Self>, socket: Option<Socket>) {
        drop(socket);
        drop(self.ctx);
    }

    fn io_context(&self) -> Option<&IoContext> {
        Some(&self.ctx)
    }

    fn io_context_mut(&mut self) -> Option<&mut IoContext> {
        Some(&mut self.ctx)
    }
}

/// TLS 变体的构造入口，由调用方注册到连接工厂。
///
/// 返回的传输对象应报告 [`TransportKind::TlsSocket`]，并自行管理收发缓冲。
pub trait TlsTransportFactory: Send + Sync {
    fn create(&self, endpoint: &Endpoint) -> Result<Box<dyn SocketTransport>, TransportError>;
}
