//! 直接调用 libc 的系统调用封装：`socket2` 未提供单描述符的零超时 `poll(2)`。
#![allow(unsafe_code)]

use std::io;
use std::os::fd::RawFd;

/// 就绪检查关注的事件：可读、可写、带外数据。
/// `POLLERR`/`POLLHUP`/`POLLNVAL` 无需声明，内核总会报告。
const INTEREST: libc::c_short = libc::POLLIN | libc::POLLOUT | libc::POLLPRI;

/// 对单个描述符执行一次零超时 `poll(2)`，返回 `revents`；无事件时返回 0。
pub(crate) fn poll_once(fd: RawFd) -> io::Result<libc::c_short> {
    let mut entry = libc::pollfd {
        fd,
        events: INTEREST,
        revents: 0,
    };
    let rc = unsafe { libc::poll(&mut entry, 1, 0) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    if rc == 0 {
        return Ok(0);
    }
    Ok(entry.revents)
}
