//! `spark-iobuf` 提供轮询式套接字传输所需的定长游标缓冲。
//!
//! # 模块定位（Why）
//! - 套接字传输层在每个调度节拍内只做一次非阻塞收发，需要一块**容量固定**、
//!   读写游标相互独立的缓冲来承接“尚未发出”与“尚未消费”的字节；
//! - 受限设备上不允许缓冲无界增长：容量一旦确定即不再扩张，背压完全由剩余容量决定。
//!
//! # 设计概要（How）
//! - [`IoBuffer`] 内部持有一块 `Box<[u8]>`，以 `read_pos`/`write_pos` 两个游标划分
//!   “已消费 / 未读 / 空闲”三段区域；
//! - 对外只暴露有界切片（[`IoBuffer::readable`]、[`IoBuffer::writable_mut`]），
//!   游标推进必须经由 [`IoBuffer::drain`]、[`IoBuffer::fill`] 完成，越界请求返回
//!   [`BufferError`] 而不是静默截断；
//! - [`IoBuffer::compact`] 将未读字节搬移到头部以回收前缀空间，不触发重新分配。
//!
//! # 命名约定（Consistency）
//! - `drain` 对应发送路径“字节已交给内核”，`fill` 对应接收路径“内核已写入字节”，
//!   与传输层文档中的术语保持一致。

mod error;
mod io_buffer;

pub use error::BufferError;
pub use io_buffer::IoBuffer;

/// 参考配置下每个收/发缓冲的初始容量（字节）。
pub const DEFAULT_CAPACITY: usize = 1024;
