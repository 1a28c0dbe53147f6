//! 本地化配置管理模块
//!
//! 支持默认值、配置文件和 `LOCALIZE_*` 环境变量三层覆盖

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, LocalizeConfig};

/// 配置常量
pub mod constants {
    /// 默认源语言
    pub const DEFAULT_SOURCE_LOCALE: &str = "en";

    /// 外键默认只向下递归一层
    pub const DEFAULT_MAX_RELATED_DEPTH: usize = 1;

    /// 完整性级联的最大深度
    pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 16;

    /// 环境变量前缀
    pub const ENV_PREFIX: &str = "LOCALIZE";

    /// 示例配置文件名
    pub const EXAMPLE_CONFIG_FILE: &str = "localize.toml";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "localize.toml",
        ".localize.toml",
        "~/.config/localize-segments/config.toml",
        "/etc/localize-segments/config.toml",
    ];

    // .env 文件，按顺序找到第一个即停止
    pub const ENV_FILES: &[&str] = &[".env.local", ".env"];
}
