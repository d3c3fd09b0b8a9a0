use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "oss-utils")]
#[command(version, disable_version_flag = true)]
#[command(about = "阿里云OSS工具集", long_about = "阿里云OSS工具集\n管理自定义域名、配置SSL证书等功能。")]
pub struct Cli {
    /// 显示版本信息
    #[arg(short = 'v', long = "version", action = ArgAction::Version, global = true)]
    version: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// 检索或者更新自定义域名的SSL证书
    Ssl(SslArgs),
}

#[derive(Debug, Args)]
#[command(version)]
pub struct SslArgs {
    /// OSS region
    #[arg(short = 'R', long, default_value = "cn-shanghai")]
    pub region: String,

    /// Bucket name
    #[arg(short = 'B', long, default_value = "")]
    pub bucket: String,

    /// 指定要更新的CNAME域名，如果不指定，则默认使用第一个CNAME域名
    #[arg(short = 'D', long)]
    pub domain: Option<String>,

    /// OSS Access Key ID (可选，如果未提供则从环境变量读取)
    #[arg(long, default_value = "")]
    pub oss_access_id: String,

    /// OSS Access Key Secret (可选，如果未提供则从环境变量读取)
    #[arg(long, default_value = "")]
    pub oss_access_secret: String,

    /// 新的SSL证书的证书文件路径
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// 新的SSL证书的密钥文件路径
    #[arg(long)]
    pub key: Option<PathBuf>,

    /// 启用安静模式，仅输出错误信息
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
