use std::sync::Arc;

use spark_transport::{ConnectionId, ConnectionRegistry, Endpoint, TransportKind};
use tracing::{debug, error};

use crate::TransportError;
use crate::config::SocketTransportConfig;
use crate::connection::Connection;
use crate::connector::{Connector, Resolver};
use crate::transport::{PlainSocket, SocketTransport, TlsTransportFactory};

/// 创建连接并登记到外部注册表的工厂。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 构造阶段的每一步（URI 解析、缓冲分配、登记）都可能失败；工厂把它们串成一个事务，
///   任一步失败都不留下半初始化的记录。
///
/// ## 执行流程（How）
/// 1. 解析 URI 为 [`Endpoint`]，失败返回 [`TransportError::InvalidUri`]；
/// 2. 按传输种类构造传输对象：明文连接分配一个 [`IoContext`](crate::IoContext)，
///    内含两块容量为 `buffer_capacity` 的独立缓冲；TLS 连接交给注册的 [`TlsTransportFactory`]；
/// 3. 分配新的 [`ConnectionId`]，以状态 `New` 构造连接并转交注册表；
/// 4. 登记失败时调用 `remove_connection` 撤销，丢弃全部中间状态并返回
///    [`TransportError::Registration`]。
///
/// ## 契约说明（What）
/// - 注册表拥有连接记录，因此工厂只返回标识；
/// - 未注册 TLS 工厂时请求 TLS 连接返回 [`TransportError::UnsupportedTransport`]。
pub struct ConnectionFactory {
    config: SocketTransportConfig,
    connector: Connector,
    tls: Option<Arc<dyn TlsTransportFactory>>,
}

impl ConnectionFactory {
    /// 校验配置并使用平台解析器构造工厂。
    pub fn new(config: SocketTransportConfig) -> Result<Self, TransportError> {
        config.validate()?;
        let connector = Connector::system()
            .verbose(config.verbose_connect)
            .connect_timeout(config.connect_timeout());
        Ok(Self {
            config,
            connector,
            tls: None,
        })
    }

    /// 替换名称解析器，其余建连参数保持不变。
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.connector = Connector::new(resolver)
            .verbose(self.config.verbose_connect)
            .connect_timeout(self.config.connect_timeout());
        self
    }

    pub fn with_tls(mut self, tls: Arc<dyn TlsTransportFactory>) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn config(&self) -> &SocketTransportConfig {
        &self.config
    }

    pub fn create<U, R>(
        &self,
        kind: TransportKind,
        uri: &str,
        user_data: U,
        registry: &mut R,
    ) -> Result<ConnectionId, TransportError>
    where
        R: ConnectionRegistry<Connection<U>>,
    {
        let endpoint = Endpoint::parse(uri).map_err(|source| {
            error!(uri, error = %source, "invalid connection uri");
            TransportError::InvalidUri {
                uri: uri.to_string(),
                source,
            }
        })?;

        let transport = self.transport_for(kind, &endpoint)?;
        let id = ConnectionId::next();
        let connection = Connection::new(
            id,
            registry.registry_id(),
            endpoint,
            self.connector.clone(),
            transport,
            user_data,
        );

        if let Err(err) = registry.add_connection(id, connection) {
            drop(registry.remove_connection(id));
            error!(connection_id = %id, error = %err, "failed to register connection");
            return Err(TransportError::Registration {
                reason: err.to_string(),
            });
        }

        debug!(connection_id = %id, kind = %kind, uri, "connection created");
        Ok(id)
    }

    fn transport_for(
        &self,
        kind: TransportKind,
        endpoint: &Endpoint,
    ) -> Result<Box<dyn SocketTransport>, TransportError> {
        if kind.owns_buffers() {
            let plain = PlainSocket::try_new(self.config.buffer_capacity).inspect_err(|err| {
                error!(capacity = self.config.buffer_capacity, error = %err, "buffer allocation failed");
            })?;
            return Ok(Box::new(plain));
        }
        match &self.tls {
            Some(tls) => tls.create(endpoint),
            None => Err(TransportError::UnsupportedTransport { kind }),
        }
    }
}

impl std::fmt::Debug for ConnectionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionFactory")
            .field("config", &self.config)
            .field("connector", &self.connector)
            .field("tls", &self.tls.is_some())
            .finish()
    }
}
