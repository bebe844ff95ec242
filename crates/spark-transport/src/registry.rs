use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

/// 连接在进程内的唯一标识。
///
/// 由 [`ConnectionId::next`] 单调分配，不会复用；注册表以它为键持有连接记录。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

// 32 位 MCU 往往没有 64 位原子，计数器取平台字长，对外仍以 `u64` 呈现。
static NEXT_CONNECTION_ID: AtomicUsize = AtomicUsize::new(1);

impl ConnectionId {
    /// 分配一个新的标识。
    pub fn next() -> Self {
        ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed) as u64)
    }

    /// 由原始值构造，用于测试或跨边界还原。
    pub const fn from_raw(raw: u64) -> Self {
        ConnectionId(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// 注册表标识：连接对所属注册表的非拥有回指。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegistryId(u32);

impl RegistryId {
    pub const fn new(raw: u32) -> Self {
        RegistryId(raw)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registry-{}", self.0)
    }
}

/// 连接注册表契约。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 外部调度器按节拍遍历注册表中的连接并驱动其状态机；注册表是连接记录的唯一所有者；
/// - 工厂在创建连接后立刻登记，登记失败时必须能撤销，避免留下半初始化的记录。
///
/// ## 契约说明（What）
/// - `registry_id`：返回稳定的注册表标识，连接以它作为回指；
/// - `add_connection`：转移记录所有权；失败时返回 `Self::Error`，记录随错误被丢弃；
/// - `remove_connection`：撤销登记并交还记录；不存在时返回 `None`，重复调用无副作用。
///
/// ## 风险提示（Trade-offs）
/// - 契约不规定并发语义；调度器与注册表处于同一执行上下文。
pub trait ConnectionRegistry<C> {
    /// 登记失败的错误类型，仅要求可展示以便写入日志。
    type Error: fmt::Display;

    fn registry_id(&self) -> RegistryId;

    fn add_connection(&mut self, id: ConnectionId, connection: C) -> Result<(), Self::Error>;

    fn remove_connection(&mut self, id: ConnectionId) -> Option<C>;
}
