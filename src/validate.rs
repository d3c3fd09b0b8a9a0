use std::sync::OnceLock;

use regex::Regex;

use crate::error::AppError;

/// OSS支持的区域列表，必须与服务端保持一致。
pub const VALID_REGIONS: &[&str] = &[
    "cn-shanghai",
    "cn-beijing",
    "cn-hangzhou",
    "cn-qingdao",
    "cn-zhangjiakou",
    "cn-huhehaote",
    "cn-chengdu",
    "cn-hongkong",
    "us-west-1",
    "us-east-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-5",
    "ap-northeast-1",
    "eu-central-1",
    "me-east-1",
];

const BUCKET_NAME_PATTERN: &str = "^[a-z0-9][a-z0-9-]{1,61}[a-z0-9]$";

fn bucket_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BUCKET_NAME_PATTERN).expect("pattern is valid"))
}

pub fn validate_region(region: &str) -> crate::Result<()> {
    if VALID_REGIONS.contains(&region) {
        return Ok(());
    }
    let mut message = format!("无效的OSS区域: {}\n请使用以下有效的区域之一:", region);
    for valid_region in VALID_REGIONS {
        message.push('\n');
        message.push_str(valid_region);
    }
    Err(AppError::Usage(message))
}

pub fn validate_bucket_name(bucket: &str) -> crate::Result<()> {
    if !bucket.is_empty() && bucket_name_regex().is_match(bucket) {
        return Ok(());
    }
    Err(AppError::Usage(format!(
        "无效的Bucket名称: {}\nBucket名称必须满足以下规则：\n\
         - 长度为3到63个字符\n\
         - 只能包含小写字母、数字和连字符（-）\n\
         - 必须以字母或数字开头和结尾",
        bucket
    )))
}
