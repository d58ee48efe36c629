//! 账号时间线帖子采集
//!
//! 打开账号主页,滚动时间线,逐条提取帖子并去重,
//! 达到目标数量或时间线不再产出新帖子时停止,结果写为 JSON 或 CSV。

pub mod models;
pub mod services;
pub mod utils;
