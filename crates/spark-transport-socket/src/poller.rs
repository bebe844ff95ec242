use std::io;
use std::os::fd::AsRawFd;

use socket2::Socket;
use spark_transport::Readiness;

use crate::{TransportError, sys};

/// 对连接的描述符执行一次零超时就绪检查。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - I/O 泵在每个节拍开始时需要知道本节拍能做什么；检查本身绝不能睡眠，
///   否则一条慢连接会拖住调度器上的所有连接。
///
/// ## 契约说明（What）
/// - 返回值总是全新计算的就绪集合，不包含任何先前检查的位；
/// - 没有描述符就绪时返回空集合，调用方在后续节拍重新检查；
/// - 被信号中断视为“本节拍无事件”，返回 `Ok(Readiness::empty())`；
/// - 其他失败返回 [`TransportError::Poll`]，不在此处重试。
///
/// ## 实现要点（How）
/// - 映射规则见 [`readiness_from_revents`]。
pub fn poll_readiness(socket: &Socket) -> Result<Readiness, TransportError> {
    interpret(sys::poll_once(socket.as_raw_fd()))
}

/// 将 `poll(2)` 的 `revents` 映射为就绪位。
///
/// - `POLLOUT` → `SEND`；
/// - `POLLIN`、`POLLHUP` → `RECV`：挂断经由接收路径读到 0 字节，从而按优雅关闭处理；
/// - `POLLERR`、`POLLNVAL`、`POLLPRI` → `ERROR`。
///
/// 三类位互相独立，可同时出现。
pub fn readiness_from_revents(revents: libc::c_short) -> Readiness {
    let mut flags = Readiness::empty();
    if revents & libc::POLLOUT != 0 {
        flags |= Readiness::SEND;
    }
    if revents & (libc::POLLIN | libc::POLLHUP) != 0 {
        flags |= Readiness::RECV;
    }
    if revents & (libc::POLLERR | libc::POLLNVAL | libc::POLLPRI) != 0 {
        flags |= Readiness::ERROR;
    }
    flags
}

fn interpret(result: io::Result<libc::c_short>) -> Result<Readiness, TransportError> {
    match result {
        Ok(revents) => Ok(readiness_from_revents(revents)),
        Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(Readiness::empty()),
        Err(source) => Err(TransportError::Poll { source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{TcpListener, TcpStream};

    #[test]
    fn interrupted_check_is_empty_success() {
        let flags = interpret(Err(io::Error::from_raw_os_error(libc::EINTR)))
            .expect("信号中断不应视为错误");
        assert!(flags.is_empty());
    }

    #[test]
    fn other_failures_surface_as_poll_error() {
        let err = interpret(Err(io::Error::from_raw_os_error(libc::EBADF)))
            .expect_err("EBADF 应上报");
        assert_eq!(err.code(), "spark.transport.socket.poll_failed");
    }

    #[test]
    fn zero_ready_descriptors_yield_empty_flags() {
        assert!(interpret(Ok(0)).expect("无事件").is_empty());
    }

    #[test]
    fn revents_map_independently() {
        assert_eq!(readiness_from_revents(libc::POLLOUT), Readiness::SEND);
        assert_eq!(readiness_from_revents(libc::POLLIN), Readiness::RECV);
        assert_eq!(readiness_from_revents(libc::POLLHUP), Readiness::RECV);
        assert_eq!(readiness_from_revents(libc::POLLPRI), Readiness::ERROR);
        assert_eq!(readiness_from_revents(libc::POLLNVAL), Readiness::ERROR);
        assert_eq!(
            readiness_from_revents(libc::POLLIN | libc::POLLOUT | libc::POLLERR),
            Readiness::SEND | Readiness::RECV | Readiness::ERROR
        );
    }

    #[test]
    fn connected_loopback_socket_is_writable() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("绑定回环监听");
        let stream = TcpStream::connect(listener.local_addr().expect("监听地址"))
            .expect("连接回环监听");
        let socket = Socket::from(stream);
        let flags = poll_readiness(&socket).expect("就绪检查");
        assert!(flags.is_send_ready());
        assert!(!flags.is_recv_ready(), "对端未发送数据时不应可读");
    }
}
