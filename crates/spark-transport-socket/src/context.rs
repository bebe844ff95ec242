use spark_iobuf::{BufferError, IoBuffer};

/// 明文连接独占的收发上下文：恰好一块接收缓冲与一块发送缓冲。
///
/// # 设计动机（Why）
/// - 应用向发送缓冲追加待发字节、从接收缓冲取走已收字节；I/O 泵负责两者与套接字之间的搬运；
/// - 两块缓冲各自独立寻址，容量固定，剩余空间即背压信号。
///
/// # 契约说明（What）
/// - 只有 `PlainSocket` 连接持有本类型；TLS 连接的缓冲由 TLS 实现管理；
/// - `stats` 记录累计收发字节数，在拆除时写入日志。
#[derive(Debug)]
pub struct IoContext {
    recv_buf: IoBuffer,
    send_buf: IoBuffer,
    stats: TransferStats,
}

impl IoContext {
    /// 分配两块容量均为 `capacity` 的缓冲；任一分配失败都会释放已分配的部分并返回错误。
    pub fn try_new(capacity: usize) -> Result<Self, BufferError> {
        let recv_buf = IoBuffer::try_with_capacity(capacity)?;
        let send_buf = IoBuffer::try_with_capacity(capacity)?;
        Ok(Self {
            recv_buf,
            send_buf,
            stats: TransferStats::default(),
        })
    }

    pub fn recv_buf(&self) -> &IoBuffer {
        &self.recv_buf
    }

    pub fn recv_buf_mut(&mut self) -> &mut IoBuffer {
        &mut self.recv_buf
    }

    pub fn send_buf(&self) -> &IoBuffer {
        &self.send_buf
    }

    pub fn send_buf_mut(&mut self) -> &mut IoBuffer {
        &mut self.send_buf
    }

    pub fn stats(&self) -> TransferStats {
        self.stats
    }

    pub(crate) fn record_sent(&mut self, n: usize) {
        self.stats.bytes_sent += n as u64;
    }

    pub(crate) fn record_received(&mut self, n: usize) {
        self.stats.bytes_received += n as u64;
    }
}

/// 连接生命周期内累计的收发字节数。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}
