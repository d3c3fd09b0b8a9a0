use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),

    #[error("读取文件 {path} 失败: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP Error: {0}")]
    Http(String),

    #[error("OSS服务错误 [{code}]: {message} (RequestId: {request_id})")]
    Service {
        code: String,
        message: String,
        request_id: String,
    },

    #[error("XML Error: {0}")]
    Xml(String),

    #[error("指定的域名 {0} 不存在于CNAME列表中。")]
    DomainNotFound(String),

    #[error("没有配置CNAME。请先配置CNAME。")]
    NoCnameBindings,

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Http(err.to_string())
    }
}

impl From<quick_xml::DeError> for AppError {
    fn from(err: quick_xml::DeError) -> Self {
        AppError::Xml(err.to_string())
    }
}

impl From<quick_xml::SeError> for AppError {
    fn from(err: quick_xml::SeError) -> Self {
        AppError::Xml(err.to_string())
    }
}
