use thiserror::Error;

/// `IoBuffer` 的统一错误类型。
///
/// # 教案式说明
/// - **意图 (Why)**：游标越界在 C 语义下会直接踩坏内存，这里改为显式错误，
///   让调用方在“推进量与实际可用量不符”时立即感知，而不是留下潜伏的数据错乱；
/// - **契约 (What)**：返回错误时缓冲游标保持调用前的值，不做部分推进；
/// - **风险 (Trade-offs)**：`Allocation` 只在 `try_with_capacity` 路径出现，
///   普通构造在内存耗尽时仍遵循标准库的中止语义。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// 无法为指定容量分配底层存储。
    #[error("无法分配 {capacity} 字节的缓冲存储")]
    Allocation { capacity: usize },

    /// 请求消费的字节数超过未读字节数。
    #[error("drain({requested}) 超出未读字节数 ({unread})")]
    DrainOverrun { requested: usize, unread: usize },

    /// 请求提交的字节数超过写游标之后的空闲容量。
    #[error("fill({requested}) 超出剩余可写空间 ({free})")]
    FillOverrun { requested: usize, free: usize },
}
