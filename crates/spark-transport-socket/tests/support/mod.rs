//! 契约测试共用的注册表、解析器与节拍驱动工具。
#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use spark_transport::{ConnectionId, ConnectionRegistry, RegistryId};
use spark_transport_socket::{Candidate, Connection, Resolver, TickOutcome, TransportError};

/// 以哈希表存储连接的注册表；`rejecting` 构造的实例拒绝一切登记。
pub struct MapRegistry<C> {
    id: RegistryId,
    reject: bool,
    pub connections: HashMap<ConnectionId, C>,
    pub removed: Vec<ConnectionId>,
}

impl<C> MapRegistry<C> {
    pub fn new(id: u32) -> Self {
        Self {
            id: RegistryId::new(id),
            reject: false,
            connections: HashMap::new(),
            removed: Vec::new(),
        }
    }

    pub fn rejecting(id: u32) -> Self {
        Self {
            reject: true,
            ..Self::new(id)
        }
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> &mut C {
        self.connections.get_mut(&id).expect("连接应已登记")
    }
}

impl<C> ConnectionRegistry<C> for MapRegistry<C> {
    type Error = String;

    fn registry_id(&self) -> RegistryId {
        self.id
    }

    fn add_connection(&mut self, id: ConnectionId, connection: C) -> Result<(), Self::Error> {
        if self.reject {
            return Err("registry is full".to_string());
        }
        self.connections.insert(id, connection);
        Ok(())
    }

    fn remove_connection(&mut self, id: ConnectionId) -> Option<C> {
        self.removed.push(id);
        self.connections.remove(&id)
    }
}

/// 总是返回固定候选列表，并记录每次被查询的主机与端口。
pub struct StaticResolver {
    candidates: Vec<Candidate>,
    pub queries: Mutex<Vec<(String, u16)>>,
}

impl StaticResolver {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            queries: Mutex::new(Vec::new()),
        }
    }
}

impl Resolver for StaticResolver {
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<Candidate>> {
        self.queries
            .lock()
            .expect("查询记录锁")
            .push((host.to_string(), port));
        Ok(self.candidates.clone())
    }
}

pub fn loopback_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("绑定回环监听");
    let addr = listener.local_addr().expect("监听地址");
    (listener, addr)
}

/// 先绑定再释放，得到一个大概率无人监听的回环地址。
pub fn refused_addr() -> SocketAddr {
    loopback_listener().1
}

/// 反复推进节拍直到谓词成立，返回最后一次节拍结果；超过上限则测试失败。
pub fn tick_until<U>(
    connection: &mut Connection<U>,
    mut done: impl FnMut(&Connection<U>, &Result<TickOutcome, TransportError>) -> bool,
) -> Result<TickOutcome, TransportError> {
    for _ in 0..400 {
        let outcome = connection.tick();
        if done(connection, &outcome) {
            return outcome;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("节拍上限内条件未满足：{connection:?}");
}
