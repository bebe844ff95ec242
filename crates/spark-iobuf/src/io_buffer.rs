use core::fmt;

use bytes::Bytes;

use crate::BufferError;

/// `IoBuffer` 是带独立读写游标的定长字节缓冲。
///
/// # 设计动机（Why）
/// - 传输层的发送路径需要“未发出字节”的只读视图，接收路径需要“写游标之后”的可写视图，
///   两者都必须严格受限于当前游标，防止系统调用越过边界读写；
/// - 容量固定，剩余空间即背压信号：接收缓冲写满且无法压缩时，传输层暂停接收，
///   直到上层消费者腾出空间。
///
/// # 结构解析（How）
/// - `data`：固定长度存储，构造后不再重新分配；
/// - `read_pos`：下一个待消费字节的位置；
/// - `write_pos`：下一个可写入字节的位置；
/// - 区间划分：`[0, read_pos)` 已消费、`[read_pos, write_pos)` 未读、`[write_pos, capacity)` 空闲。
///
/// # 契约说明（What）
/// - 恒成立：`read_pos <= write_pos <= capacity`；
/// - `drain`/`fill` 越界时返回 [`BufferError`]，游标不变；
/// - `compact` 逐字节保留未读数据，仅移动其位置。
///
/// # 风险与取舍（Trade-offs）
/// - 不在 `drain` 归零时自动复位游标，游标推进量与调用方传入的字节数严格一致，
///   便于上层核对“发出多少就推进多少”；空间回收统一交给 `compact`。
pub struct IoBuffer {
    data: Box<[u8]>,
    read_pos: usize,
    write_pos: usize,
}

impl IoBuffer {
    /// 以给定容量创建缓冲，内存不足时遵循标准库的中止语义。
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            read_pos: 0,
            write_pos: 0,
        }
    }

    /// 以给定容量创建缓冲，分配失败时返回 [`BufferError::Allocation`]。
    ///
    /// 受限设备上堆空间有限，连接工厂使用该入口，使分配失败可以回滚而不是中止进程。
    pub fn try_with_capacity(capacity: usize) -> Result<Self, BufferError> {
        let data = boxed_zeroed(capacity).ok_or(BufferError::Allocation { capacity })?;
        Ok(Self {
            data,
            read_pos: 0,
            write_pos: 0,
        })
    }

    /// 缓冲总容量。
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// 尚未消费的字节数。
    #[inline]
    pub fn unread_len(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// 写游标之后的空闲容量。
    #[inline]
    pub fn free_capacity(&self) -> usize {
        self.data.len() - self.write_pos
    }

    /// 压缩之后可获得的空闲容量，即 `capacity - unread_len`。
    #[inline]
    pub fn free_capacity_after_compaction(&self) -> usize {
        self.data.len() - self.unread_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read_pos == self.write_pos
    }

    /// 读游标位置（只读）。
    #[inline]
    pub fn read_cursor(&self) -> usize {
        self.read_pos
    }

    /// 写游标位置（只读）。
    #[inline]
    pub fn write_cursor(&self) -> usize {
        self.write_pos
    }

    /// 未读区域的只读视图，长度恰为 [`unread_len`](Self::unread_len)。
    #[inline]
    pub fn readable(&self) -> &[u8] {
        &self.data[self.read_pos..self.write_pos]
    }

    /// 写游标之后的可写视图，长度恰为 [`free_capacity`](Self::free_capacity)。
    ///
    /// 写入后需调用 [`fill`](Self::fill) 提交实际写入的字节数。
    #[inline]
    pub fn writable_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.write_pos..]
    }

    /// 推进读游标，表示 `n` 个未读字节已被消费。
    pub fn drain(&mut self, n: usize) -> Result<(), BufferError> {
        let unread = self.unread_len();
        if n > unread {
            return Err(BufferError::DrainOverrun {
                requested: n,
                unread,
            });
        }
        self.read_pos += n;
        Ok(())
    }

    /// 推进写游标，表示 `n` 个字节已写入可写视图。
    pub fn fill(&mut self, n: usize) -> Result<(), BufferError> {
        let free = self.free_capacity();
        if n > free {
            return Err(BufferError::FillOverrun { requested: n, free });
        }
        self.write_pos += n;
        Ok(())
    }

    /// 将未读字节搬移到缓冲头部，回收已消费的前缀空间。
    pub fn compact(&mut self) {
        if self.read_pos == 0 {
            return;
        }
        let unread = self.unread_len();
        if unread > 0 {
            self.data.copy_within(self.read_pos..self.write_pos, 0);
        }
        self.read_pos = 0;
        self.write_pos = unread;
    }

    /// 丢弃全部内容并复位游标。
    #[inline]
    pub fn clear(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
    }

    /// 追加尽可能多的字节，返回实际写入的数量。
    ///
    /// 当写游标之后的空间不足、而压缩可以腾出更多空间时先行压缩；
    /// 超出剩余容量的部分不会写入，由调用方决定稍后重试。
    pub fn push_slice(&mut self, src: &[u8]) -> usize {
        if src.len() > self.free_capacity()
            && self.free_capacity_after_compaction() > self.free_capacity()
        {
            self.compact();
        }
        let n = src.len().min(self.free_capacity());
        self.data[self.write_pos..self.write_pos + n].copy_from_slice(&src[..n]);
        self.write_pos += n;
        n
    }

    /// 将未读字节复制到 `dst` 并消费，返回复制的数量。
    pub fn read_into(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.unread_len());
        dst[..n].copy_from_slice(&self.data[self.read_pos..self.read_pos + n]);
        self.read_pos += n;
        n
    }

    /// 取出全部未读字节，返回独立的 [`Bytes`] 并消费之。
    pub fn take_unread(&mut self) -> Bytes {
        let out = Bytes::copy_from_slice(self.readable());
        self.read_pos = self.write_pos;
        out
    }
}

impl fmt::Debug for IoBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoBuffer")
            .field("capacity", &self.capacity())
            .field("read_pos", &self.read_pos)
            .field("write_pos", &self.write_pos)
            .finish()
    }
}

/// 尝试分配 `len` 字节的零初始化存储，失败时返回 `None`。
fn boxed_zeroed(len: usize) -> Option<Box<[u8]>> {
    let mut storage = Vec::new();
    storage.try_reserve_exact(len).ok()?;
    storage.resize(len, 0u8);
    Some(storage.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(capacity: usize, payload: &[u8]) -> IoBuffer {
        let mut buf = IoBuffer::with_capacity(capacity);
        assert_eq!(buf.push_slice(payload), payload.len());
        buf
    }

    #[test]
    fn fresh_buffer_is_empty_with_full_free_capacity() {
        let buf = IoBuffer::with_capacity(16);
        assert!(buf.is_empty());
        assert_eq!(buf.unread_len(), 0);
        assert_eq!(buf.free_capacity(), 16);
        assert_eq!(buf.free_capacity_after_compaction(), 16);
    }

    #[test]
    fn drain_and_fill_move_cursors_by_exact_amount() {
        let mut buf = IoBuffer::with_capacity(8);
        buf.writable_mut()[..3].copy_from_slice(b"abc");
        buf.fill(3).expect("fill 应在容量内成功");
        assert_eq!(buf.write_cursor(), 3);
        buf.drain(2).expect("drain 应在未读范围内成功");
        assert_eq!(buf.read_cursor(), 2);
        assert_eq!(buf.readable(), b"c");
    }

    #[test]
    fn overruns_leave_cursors_untouched() {
        let mut buf = buffer_with(4, b"ab");
        assert_eq!(
            buf.drain(3),
            Err(BufferError::DrainOverrun {
                requested: 3,
                unread: 2
            })
        );
        assert_eq!(
            buf.fill(3),
            Err(BufferError::FillOverrun {
                requested: 3,
                free: 2
            })
        );
        assert_eq!((buf.read_cursor(), buf.write_cursor()), (0, 2));
    }

    #[test]
    fn compact_moves_unread_bytes_to_front() {
        let mut buf = buffer_with(6, b"xyzabc");
        buf.drain(3).expect("drain 前缀");
        assert_eq!(buf.free_capacity(), 0);
        assert_eq!(buf.free_capacity_after_compaction(), 3);
        buf.compact();
        assert_eq!(buf.readable(), b"abc");
        assert_eq!((buf.read_cursor(), buf.write_cursor()), (0, 3));
        assert_eq!(buf.free_capacity(), 3);
    }

    #[test]
    fn push_slice_compacts_when_it_gains_space() {
        let mut buf = buffer_with(4, b"1234");
        buf.drain(2).expect("drain 前缀");
        assert_eq!(buf.push_slice(b"56"), 2);
        assert_eq!(buf.readable(), b"3456");
        assert_eq!(buf.push_slice(b"7"), 0, "满载时不应写入");
    }

    #[test]
    fn take_unread_returns_copy_and_consumes() {
        let mut buf = buffer_with(8, b"hello");
        buf.drain(1).expect("drain 一个字节");
        let out = buf.take_unread();
        assert_eq!(&out[..], b"ello");
        assert!(buf.is_empty());
    }

    #[test]
    fn try_with_capacity_allocates_requested_size() {
        let buf = IoBuffer::try_with_capacity(1024).expect("小容量分配不应失败");
        assert_eq!(buf.capacity(), 1024);
    }

    #[test]
    fn try_with_capacity_reports_impossible_allocation() {
        let err = IoBuffer::try_with_capacity(usize::MAX).expect_err("超大容量应分配失败");
        assert_eq!(
            err,
            BufferError::Allocation {
                capacity: usize::MAX
            }
        );
    }
}
