use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::{error, info, warn};

use crate::TransportError;

/// 解析器给出的单个候选地址。
///
/// `protocol` 为 `Some(Protocol::TCP)` 时建连前会关闭 Nagle 算法；
/// 为 `None` 时按地址族的默认流协议创建套接字，不做额外配置。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub addr: SocketAddr,
    pub protocol: Option<Protocol>,
}

impl Candidate {
    pub fn tcp(addr: SocketAddr) -> Self {
        Self {
            addr,
            protocol: Some(Protocol::TCP),
        }
    }
}

/// 名称解析接口：把主机与端口解析为有序的候选地址列表。
///
/// 列表顺序由实现决定，连接器严格按此顺序尝试。
pub trait Resolver: Send + Sync {
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<Candidate>>;
}

/// 基于平台解析器的实现：不指定地址族偏好，按流式套接字语义查询。
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<Candidate>> {
        Ok((host, port)
            .to_socket_addrs()?
            .map(Candidate::tcp)
            .collect())
    }
}

/// 逐个尝试候选地址、交出非阻塞描述符的连接器。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 主机名可能解析出多个地址（IPv4/IPv6、多条 A 记录），任何一个可达即可；
/// - 建连阶段允许阻塞，但交出去的描述符必须已经是非阻塞的，否则后续的收发会卡住调度器。
///
/// ## 执行流程（How）
/// 1. 调用解析器得到候选列表；解析失败返回 [`TransportError::Resolution`]，
///    空列表返回 [`TransportError::NoCandidates`]；
/// 2. 对每个候选：按其地址族创建流式套接字 → 协议为 TCP 时设置 `TCP_NODELAY`
///    （失败视为该候选失败）→ 连接（配置了超时则限时）；失败时丢弃套接字并继续；
/// 3. 首个成功的候选切换为非阻塞模式后返回；切换失败同样关闭套接字并返回
///    [`TransportError::Configure`]；
/// 4. 全部失败返回 [`TransportError::ConnectExhausted`]，不保留任何描述符。
///
/// ## 风险提示（Trade-offs）
/// - 只遍历候选列表一次，不做重试与退避；
/// - 详细模式只影响诊断输出，从不改变控制流。
#[derive(Clone)]
pub struct Connector {
    resolver: Arc<dyn Resolver>,
    verbose: bool,
    timeout: Option<Duration>,
}

impl Connector {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            verbose: false,
            timeout: None,
        }
    }

    /// 使用平台解析器的连接器。
    pub fn system() -> Self {
        Self::new(Arc::new(SystemResolver))
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect(&self, host: &str, port: u16) -> Result<Socket, TransportError> {
        let candidates = self.resolver.resolve(host, port).map_err(|source| {
            error!(host, port, error = %source, "name resolution failed");
            TransportError::Resolution {
                host: host.to_string(),
                port,
                source,
            }
        })?;
        if candidates.is_empty() {
            error!(host, port, "name resolution returned no candidates");
            return Err(TransportError::NoCandidates {
                host: host.to_string(),
                port,
            });
        }

        let mut last = None;
        for candidate in &candidates {
            if self.verbose {
                info!(host, port, candidate = %candidate.addr, "connecting");
            }
            match self.try_candidate(candidate) {
                Ok(socket) => {
                    if self.verbose {
                        info!(host, port, candidate = %candidate.addr, "connected");
                    }
                    return finish(socket);
                }
                Err((stage, err)) => {
                    if self.verbose {
                        warn!(host, port, candidate = %candidate.addr, stage, error = %err, "candidate failed");
                    }
                    last = Some(err);
                }
            }
        }

        error!(host, port, attempts = candidates.len(), "failed to connect to any candidate");
        Err(TransportError::ConnectExhausted {
            host: host.to_string(),
            port,
            attempts: candidates.len(),
            last,
        })
    }

    /// 尝试单个候选；失败时返回失败阶段与原因，套接字随作用域结束而关闭。
    fn try_candidate(&self, candidate: &Candidate) -> Result<Socket, (&'static str, io::Error)> {
        let socket = Socket::new(
            Domain::for_address(candidate.addr),
            Type::STREAM,
            candidate.protocol,
        )
        .map_err(|err| ("socket", err))?;

        if candidate.protocol == Some(Protocol::TCP) {
            socket.set_tcp_nodelay(true).map_err(|err| ("tcp_nodelay", err))?;
        }

        let addr = SockAddr::from(candidate.addr);
        match self.timeout {
            Some(timeout) => socket.connect_timeout(&addr, timeout),
            None => socket.connect(&addr),
        }
        .map_err(|err| ("connect", err))?;

        Ok(socket)
    }
}

fn finish(socket: Socket) -> Result<Socket, TransportError> {
    socket
        .set_nonblocking(true)
        .map_err(|source| TransportError::Configure {
            option: "O_NONBLOCK",
            source,
        })?;
    Ok(socket)
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("verbose", &self.verbose)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
