#![deny(unsafe_code)]
#![doc = r#"
# spark-transport-socket

## 设计动机（Why）
- **定位**：为受限设备提供由外部调度器驱动的 TCP 客户端连接：每个节拍推进一次，
  从不在本 crate 内部睡眠或派生线程。
- **架构角色**：位于 [`spark_transport`] 契约层之上，负责建连、就绪检查、收发泵与
  连接状态机；收发缓冲来自 [`spark_iobuf`]，连接记录的存储归外部注册表所有。
- **设计理念**：除一次性的解析与建连外，所有操作均为非阻塞；瞬时错误在本地吸收，
  致命错误以“请求关闭”或显式错误向上报告，绝不终止进程。

## 核心契约（What）
- **输入条件**：调用方通过 [`ConnectionFactory::create`] 创建连接并登记到实现了
  [`ConnectionRegistry`](spark_transport::ConnectionRegistry) 的注册表，随后每个节拍对
  每条连接调用一次 [`Connection::tick`]，同一连接的节拍严格串行；
- **输出保障**：`New` 节拍完成建连并交出非阻塞描述符；`Connected` 节拍执行一次 I/O 泵；
  `Closing` 节拍恰好执行一次拆除，此后连接保持惰性；
- **前置约束**：仅支持类 Unix 平台，就绪检查基于 `poll(2)`。

## 实现策略（How）
- **建连**：[`Connector`] 按解析器给出的顺序逐个尝试候选地址，协议为 TCP 时关闭 Nagle 算法，
  成功后切换为非阻塞模式；
- **就绪检查**：零超时 `poll(2)`，每次都重新计算就绪位，信号中断视为“无事件”；
- **I/O 泵**：[`pump`] 依次执行发送路径、接收路径（含压缩与背压）与异常路径；
- **状态机**：[`Connection`] 独占所有状态迁移，泵只返回结果，不改写状态；
- **拆除**：[`SocketTransport::teardown`] 消耗传输对象的所有权，第二次拆除在结构上不可达。

## 风险与考量（Trade-offs）
- **阻塞建连**：`New` 节拍中的解析与建连是整个生命周期中唯一的阻塞操作，
  可通过 [`SocketTransportConfig::connect_timeout_ms`] 限定每个候选地址的等待时间；
- **TLS**：本 crate 不实现 TLS，TLS 变体由调用方通过 [`TlsTransportFactory`] 注入，
  其缓冲由 TLS 实现自行管理。
"#]

mod config;
mod connection;
mod connector;
mod context;
mod error;
mod factory;
mod poller;
mod pump;
mod sys;
mod transport;

pub use config::SocketTransportConfig;
pub use connection::{Connection, TickOutcome};
pub use connector::{Candidate, Connector, Resolver, SystemResolver};
pub use context::{IoContext, TransferStats};
pub use error::{TransportError, is_transient};
pub use factory::ConnectionFactory;
pub use poller::{poll_readiness, readiness_from_revents};
pub use pump::{PumpOutcome, SocketIo, pump};
pub use transport::{PlainSocket, SocketTransport, TlsTransportFactory};
