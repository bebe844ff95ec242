#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![doc = "spark-transport: 轮询式套接字传输的协议无关契约层。"]
#![doc = ""]
#![doc = "== 使命概述 =="]
#![doc = "- **Why**：连接状态机、注册表与具体传输实现（明文套接字 / TLS）需要一套共同语言，互不依赖对方的实现细节。"]
#![doc = "- **What**：定义就绪位 [`Readiness`]、连接状态 [`ConnectionState`]、传输种类 [`TransportKind`]、目标端点 [`Endpoint`]、关闭原因 [`CloseReason`] 以及注册表契约 [`ConnectionRegistry`]。"]
#![doc = "- **How**：面向 `no_std + alloc` 环境设计，仅依赖同样支持 `no_std` 的 `bitflags`，受限设备上的调度器可以直接复用。"]

extern crate alloc;

pub mod close;
pub mod endpoint;
pub mod readiness;
pub mod registry;
pub mod state;

pub use close::CloseReason;
pub use endpoint::{Endpoint, UriError};
pub use readiness::Readiness;
pub use registry::{ConnectionId, ConnectionRegistry, RegistryId};
pub use state::{ConnectionState, TransportKind};
