mod aliyun;

pub use aliyun::AliyunOss;

use crate::Result;
use crate::cert::CertificateMaterial;

/// 绑定在CNAME上的证书信息。
#[derive(Debug, Clone)]
pub struct CnameCertificate {
    pub cert_id: String,
    pub valid_end_date: Option<String>,
}

/// Bucket上的一条自定义域名绑定。
#[derive(Debug, Clone)]
pub struct CnameBinding {
    pub domain: String,
    pub status: String,
    pub certificate: Option<CnameCertificate>,
}

impl CnameBinding {
    pub fn cert_id(&self) -> Option<&str> {
        self.certificate.as_ref().map(|c| c.cert_id.as_str())
    }
}

/// 替换某条CNAME绑定的证书的请求。
#[derive(Debug)]
pub struct CnameUpdate<'a> {
    pub bucket: &'a str,
    pub domain: &'a str,
    /// 当前绑定的证书ID，配合force做覆盖替换；没有历史证书时为空。
    pub previous_cert_id: Option<&'a str>,
    pub material: &'a CertificateMaterial,
    pub force: bool,
}

#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// 列出bucket的CNAME绑定，顺序与服务端返回一致。
    async fn list_cnames(&self, bucket: &str) -> Result<Vec<CnameBinding>>;
    /// 替换一条CNAME绑定的SSL证书。
    async fn put_cname(&self, update: &CnameUpdate<'_>) -> Result<()>;
}
