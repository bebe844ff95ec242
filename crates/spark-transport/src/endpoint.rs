use alloc::string::{String, ToString};
use core::fmt;

/// 连接的目标端点：主机与端口，外加解析时保留的方案与路径。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 工厂在创建连接时只拿到一个 URI 字符串，而连接器需要的是 `(host, port)`；
/// - 受限设备上的调用方习惯直接写 `mqtt://broker.local` 这类省略端口的形式，
///   因此解析阶段要按方案补全默认端口，连接器无需关心方案。
///
/// ## 契约说明（What）
/// - 接受 `scheme://host[:port][/path]`、裸 `host:port`、带方括号的 IPv6 字面量（`[::1]:8080`）；
/// - `user@host` 形式中的用户信息会被丢弃；
/// - 缺省端口：`http`/`ws` 80、`https`/`wss` 443、`mqtt`/`tcp` 1883、`mqtts`/`ssl` 8883；
/// - `host` 不含方括号；`Display` 输出 `host:port`，IPv6 主机会重新加上方括号。
///
/// ## 风险提示（Trade-offs）
/// - 只做连接所需的最小解析，不处理百分号编码与查询参数，路径原样保留。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    scheme: Option<String>,
    host: String,
    port: u16,
    path: String,
}

impl Endpoint {
    /// 直接由主机与端口构造端点。
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: None,
            host: host.into(),
            port,
            path: String::new(),
        }
    }

    /// 解析 URI 字符串。
    pub fn parse(uri: &str) -> Result<Self, UriError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(UriError::Empty);
        }

        let (scheme, rest) = match uri.split_once("://") {
            Some((scheme, rest)) => {
                if scheme.is_empty() {
                    return Err(UriError::EmptyScheme);
                }
                (Some(scheme.to_ascii_lowercase()), rest)
            }
            None => (None, uri),
        };

        let (authority, path) = match rest.find(['/', '?', '#']) {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let authority = match authority.rfind('@') {
            Some(idx) => &authority[idx + 1..],
            None => authority,
        };

        let (host, port_text) = split_host_port(authority)?;
        if host.is_empty() {
            return Err(UriError::EmptyHost);
        }

        let port = match port_text {
            Some(text) => parse_port(text)?,
            None => scheme
                .as_deref()
                .and_then(default_port)
                .ok_or(UriError::MissingPort)?,
        };

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }

    /// 小写形式的方案名；裸 `host:port` 输入时为 `None`。
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// 原样保留的授权段之后的部分（路径、查询与片段），未提供时为空串。
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// 按方案返回缺省端口。
pub fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        "mqtt" | "tcp" => Some(1883),
        "mqtts" | "ssl" => Some(8883),
        _ => None,
    }
}

fn split_host_port(authority: &str) -> Result<(&str, Option<&str>), UriError> {
    if let Some(inner) = authority.strip_prefix('[') {
        let close = inner.find(']').ok_or(UriError::UnterminatedBracket)?;
        let host = &inner[..close];
        let tail = &inner[close + 1..];
        return match tail {
            "" => Ok((host, None)),
            _ => match tail.strip_prefix(':') {
                Some(port) => Ok((host, Some(port))),
                None => Err(UriError::InvalidPort(tail.to_string())),
            },
        };
    }

    // 多个冒号且无方括号：视为不带端口的 IPv6 字面量。
    if authority.matches(':').count() > 1 {
        return Ok((authority, None));
    }

    match authority.split_once(':') {
        Some((host, port)) => Ok((host, Some(port))),
        None => Ok((authority, None)),
    }
}

fn parse_port(text: &str) -> Result<u16, UriError> {
    match text.parse::<u16>() {
        Ok(0) | Err(_) => Err(UriError::InvalidPort(text.to_string())),
        Ok(port) => Ok(port),
    }
}

/// URI 解析失败的原因。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UriError {
    /// 输入为空或仅含空白。
    Empty,
    /// `://` 之前没有方案名。
    EmptyScheme,
    /// 主机部分为空。
    EmptyHost,
    /// 未给出端口，且方案没有缺省端口。
    MissingPort,
    /// 端口不是 1..=65535 之间的十进制整数。
    InvalidPort(String),
    /// IPv6 字面量缺少右方括号。
    UnterminatedBracket,
}

impl fmt::Display for UriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriError::Empty => f.write_str("URI 为空"),
            UriError::EmptyScheme => f.write_str("URI 方案名为空"),
            UriError::EmptyHost => f.write_str("URI 主机为空"),
            UriError::MissingPort => f.write_str("URI 缺少端口且方案无缺省端口"),
            UriError::InvalidPort(text) => write!(f, "URI 端口非法：`{text}`"),
            UriError::UnterminatedBracket => f.write_str("IPv6 字面量缺少 `]`"),
        }
    }
}

impl core::error::Error for UriError {}
