use thiserror::Error;

/// 渲染面(浏览器会话)相关错误
///
/// 处理与浏览器交互时的失败场景。
/// 会话级错误对一次采集是致命的: 会话仍会被关闭,随后错误上抛给调用方。
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// 浏览器启动失败
    ///
    /// 可能原因:
    /// - 未安装 Chromium 系浏览器
    /// - 可执行文件路径无效
    /// - 启动参数被拒绝
    #[error("浏览器启动失败: {0}")]
    LaunchFailed(String),

    /// 不支持的浏览器
    ///
    /// CDP 只能驱动 Chromium 系浏览器
    #[error("不支持的浏览器: {0}")]
    UnsupportedBrowser(String),

    /// 浏览器会话错误
    ///
    /// 浏览器崩溃、连接断开或协议调用失败
    #[error("浏览器错误: {0}")]
    BrowserError(String),

    /// 元素查询失败
    ///
    /// 单个字段查询失败,只影响该字段
    #[error("元素查询失败 ({selector}): {message}")]
    LookupFailed { selector: String, message: String },
}

/// 输出文件存储相关错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 文件读写失败
    #[error("文件读写失败 ({path}): {message}")]
    Io { path: String, message: String },

    /// 序列化/反序列化失败
    ///
    /// 将数据转换为JSON或从JSON解析失败
    #[error("数据序列化失败: {0}")]
    SerializationError(String),

    /// CSV格式无效
    ///
    /// 读取CSV时表头或列数与输出格式不符
    #[error("CSV格式无效 (第{line}行): {message}")]
    InvalidCsv { line: usize, message: String },
}

impl StorageError {
    pub fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        StorageError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// 实现从serde_json::Error到StorageError的转换
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

/// 配置相关错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值无效
    #[error("配置项 {key} 的值无效: {value}")]
    InvalidValue { key: String, value: String },

    /// 配置文件读取失败
    #[error("配置文件读取失败: {0}")]
    IoError(String),
}

/// 采集运行的顶层错误
///
/// 用户可见的失败: 携带原始错误信息
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// 输入参数无效
    #[error("参数无效: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
