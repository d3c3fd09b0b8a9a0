use std::borrow::Cow::{self, Borrowed};

use tabled::{Table, Tabled};

use crate::oss::CnameBinding;

const NO_CERTIFICATE: &str = "未配置";

struct CnameRow<'a> {
    index: usize,
    binding: &'a CnameBinding,
}

impl Tabled for CnameRow<'_> {
    const LENGTH: usize = 5;

    fn headers() -> Vec<Cow<'static, str>> {
        vec![
            Borrowed("索引"),
            Borrowed("HOST"),
            Borrowed("状态"),
            Borrowed("SSL CertId"),
            Borrowed("SSL 过期时间"),
        ]
    }

    fn fields(&self) -> Vec<Cow<'_, str>> {
        let (cert_id, expire_time) = match &self.binding.certificate {
            Some(certificate) => (
                certificate.cert_id.as_str(),
                certificate.valid_end_date.as_deref().unwrap_or(""),
            ),
            None => (NO_CERTIFICATE, ""),
        };
        vec![
            self.index.to_string().into(),
            self.binding.domain.as_str().into(),
            self.binding.status.as_str().into(),
            cert_id.into(),
            expire_time.into(),
        ]
    }
}

/// 打印bucket的CNAME列表。quiet模式下不输出任何内容。
pub fn print_cname_list(bucket: &str, bindings: &[CnameBinding], quiet: bool) {
    if quiet {
        return;
    }
    println!("{} 的CNAME列表", bucket);
    if bindings.is_empty() {
        println!("没有配置CNAME。请先配置CNAME。");
        return;
    }
    let rows: Vec<CnameRow<'_>> = bindings
        .iter()
        .enumerate()
        .map(|(i, binding)| CnameRow {
            index: i + 1,
            binding,
        })
        .collect();
    println!("{}", Table::new(&rows));
}

/// quiet模式下抑制的提示信息。
pub fn info(message: &str, quiet: bool) {
    if !quiet {
        println!("{}", message);
    }
}
