use std::io::{self, Read};

use socket2::Socket;
use spark_transport::{CloseReason, Readiness};

use crate::context::IoContext;
use crate::{TransportError, is_transient, poller};

/// I/O 泵所需的最小套接字能力：就绪检查、一次发送、一次接收。
///
/// 真实连接使用 [`socket2::Socket`]；测试可以用脚本化的实现替换，
/// 从而精确构造“发送 40 字节”“对端关闭”等场景。
pub trait SocketIo {
    fn poll_readiness(&self) -> Result<Readiness, TransportError>;

    fn send(&self, buf: &[u8]) -> io::Result<usize>;

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
}

impl SocketIo for Socket {
    fn poll_readiness(&self) -> Result<Readiness, TransportError> {
        poller::poll_readiness(self)
    }

    fn send(&self, buf: &[u8]) -> io::Result<usize> {
        // Linux 上附带 MSG_NOSIGNAL，对端复位不会触发 SIGPIPE。
        Socket::send(self, buf)
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut reader: &Socket = self;
        reader.read(buf)
    }
}

/// 一次泵循环的结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PumpOutcome {
    /// 正常完成（可能搬运了字节，也可能什么都没做）。
    NoChange,
    /// 连接应当关闭；是否迁移状态由调用方决定。
    CloseRequested(CloseReason),
}

/// 对一条已连接的明文连接执行一次泵循环。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 每个节拍在不阻塞的前提下尽量推进收发：先确认就绪，再各做至多一次系统调用；
/// - 接收缓冲写满时暂停接收，把背压传递给对端，而不是无界缓存或丢弃数据。
///
/// ## 执行顺序（How）
/// 1. 就绪检查：结果覆盖写入 `flags`，失败时 `flags` 为空并返回 [`TransportError::Poll`]；
/// 2. 发送路径：仅当 `SEND` 置位且发送缓冲有未读字节时发送一次，
///    成功后按实际字节数推进读游标；
/// 3. 接收路径：仅当 `RECV` 置位时执行；无空闲容量但压缩可腾出空间时先压缩，
///    仍无空闲容量则跳过本节拍；否则接收一次并按实际字节数推进写游标；
/// 4. 异常路径：`ERROR` 置位时请求关闭，不做恢复。
///
/// ## 契约说明（What）
/// - 瞬时失败（中断、暂不可用）视为本节拍无操作；
/// - 发送非瞬时失败或在非空数据上写出 0 字节 → `CloseRequested(SendFailed)`；
/// - 接收到 0 字节 → `CloseRequested(PeerClosed)`；接收非瞬时失败 → `CloseRequested(RecvFailed)`；
/// - 泵从不改写连接状态。
pub fn pump<S: SocketIo + ?Sized>(
    io: &S,
    ctx: &mut IoContext,
    flags: &mut Readiness,
) -> Result<PumpOutcome, TransportError> {
    *flags = Readiness::empty();
    *flags = io.poll_readiness()?;

    if flags.is_send_ready() && !ctx.send_buf().is_empty() {
        match io.send(ctx.send_buf().readable()) {
            Ok(0) => return Ok(PumpOutcome::CloseRequested(CloseReason::SendFailed)),
            Ok(n) => {
                ctx.send_buf_mut().drain(n)?;
                ctx.record_sent(n);
            }
            Err(err) if is_transient(&err) => {}
            Err(_) => return Ok(PumpOutcome::CloseRequested(CloseReason::SendFailed)),
        }
    }

    if flags.is_recv_ready() {
        let recv_buf = ctx.recv_buf_mut();
        if recv_buf.free_capacity() == 0 && recv_buf.free_capacity_after_compaction() > 0 {
            recv_buf.compact();
        }
        if recv_buf.free_capacity() > 0 {
            match io.recv(recv_buf.writable_mut()) {
                Ok(0) => return Ok(PumpOutcome::CloseRequested(CloseReason::PeerClosed)),
                Ok(n) => {
                    recv_buf.fill(n)?;
                    ctx.record_received(n);
                }
                Err(err) if is_transient(&err) => {}
                Err(_) => return Ok(PumpOutcome::CloseRequested(CloseReason::RecvFailed)),
            }
        }
    }

    if flags.is_error() {
        return Ok(PumpOutcome::CloseRequested(CloseReason::ErrorCondition));
    }

    Ok(PumpOutcome::NoChange)
}
