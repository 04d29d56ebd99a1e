use thiserror::Error;

use crate::catalog::CatalogError;
use crate::locations::LocationError;
use crate::storage::StorageError;

/// 启动和运行期错误 (非请求级)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("目录加载失败: {0}")]
    Catalog(#[from] CatalogError),

    #[error("位置索引失败: {0}")]
    Location(#[from] LocationError),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
