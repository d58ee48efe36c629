//! 工具模块
//!
//! - logger: tracing 日志初始化
//! - time_utils: 时间戳归一化
//! - text_utils: 数字/话题/提及提取
//! - csv_utils: CSV 与列表字面量编解码

pub mod csv_utils;
pub mod logger;
pub mod text_utils;
pub mod time_utils;
