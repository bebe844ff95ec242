bitflags::bitflags! {
    /// 单个描述符在某一时刻的就绪位集合。
    ///
    /// # 教案级注释
    ///
    /// ## 意图（Why）
    /// - 轮询器每个节拍对描述符做一次零超时的就绪检查，结果需要以紧凑、可组合的形式
    ///   交给 I/O 泵：能否发送、能否接收、是否出现异常条件；
    /// - 三个位彼此独立，可以同时置位（例如对端半关闭时既可写又可读）。
    ///
    /// ## 契约说明（What）
    /// - [`Readiness::SEND`]：描述符可写；
    /// - [`Readiness::RECV`]：描述符可读（含对端挂断，读取将得到 0 字节）；
    /// - [`Readiness::ERROR`]：描述符出现异常条件；
    /// - **后置条件**：每次轮询都产生全新的值，调用方不得把上一次的位与本次合并。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Readiness: u8 {
        /// 可发送。
        const SEND = 1;
        /// 可接收。
        const RECV = 1 << 1;
        /// 异常条件。
        const ERROR = 1 << 2;
    }
}

impl Readiness {
    #[inline]
    pub const fn is_send_ready(self) -> bool {
        self.contains(Self::SEND)
    }

    #[inline]
    pub const fn is_recv_ready(self) -> bool {
        self.contains(Self::RECV)
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.contains(Self::ERROR)
    }
}
