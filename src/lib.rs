/// 内部导出的模块
mod internal;


/// 导出核心入口
pub use internal::downloader::download_engine::{DownloadEngine, DownloadHandle};

/// 下载引擎、配置、进度、结果与错误类型，以及分片规划、重试、续传等组成部分
pub mod downloader {
    use crate::internal;
    pub use internal::downloader::chunked_download::*;
    pub use internal::downloader::download_engine::*;
    pub use internal::downloader::structs::*;
    pub use internal::downloader::traits::download::*;
}

pub mod states {
    pub mod unlock_reactive {
        use crate::internal;
        pub use internal::states::unlock_reactive::*;
    }
}

/// 下载地址解析
pub mod resolver {
    use crate::internal;
    pub use internal::resolver::*;
}

pub mod filename {
    use crate::internal;
    pub use internal::filename::*;
}

/// 错误日志文件
pub mod logging {
    use crate::internal;
    pub use internal::logging::*;
}
