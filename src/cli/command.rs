use std::path::Path;

use tracing::info;

use crate::cert::CertificateMaterial;
use crate::cli::args::SslArgs;
use crate::credentials::Credentials;
use crate::error::AppError;
use crate::oss::{AliyunOss, CnameBinding, CnameUpdate, ObjectStorage};
use crate::{render, validate};

/// ssl子命令入口：校验 → 凭证 → （可选）读证书 → 列表 → 渲染 → （可选）更新。
/// 任何一步失败立即终止。
pub async fn run_ssl(args: &SslArgs) -> crate::Result<()> {
    validate::validate_region(&args.region)?;
    validate::validate_bucket_name(&args.bucket)?;

    let credentials = Credentials::resolve(&args.oss_access_id, &args.oss_access_secret)?;

    render::info(&format!("当前操作的区域: {}", args.region), args.quiet);
    render::info(&format!("当前操作的Bucket名称: {}", args.bucket), args.quiet);

    // 在任何远程调用之前读取证书文件，单独提供其一是用法错误
    let material = read_material(args.cert.as_deref(), args.key.as_deref())?;

    let client = AliyunOss::new(credentials, &args.region)?;
    execute(args, &client, material.as_ref()).await
}

fn read_material(
    cert_path: Option<&Path>,
    key_path: Option<&Path>,
) -> crate::Result<Option<CertificateMaterial>> {
    match (cert_path, key_path) {
        (None, None) => Ok(None),
        (Some(cert_path), Some(key_path)) => {
            Ok(Some(CertificateMaterial::read(cert_path, key_path)?))
        }
        _ => Err(AppError::Usage(
            "如果需要更新SSL证书，请同时提供 --cert 和 --key 参数。".to_string(),
        )),
    }
}

async fn execute<C: ObjectStorage>(
    args: &SslArgs,
    client: &C,
    material: Option<&CertificateMaterial>,
) -> crate::Result<()> {
    let bindings = client.list_cnames(&args.bucket).await?;
    render::print_cname_list(&args.bucket, &bindings, args.quiet);
    if bindings.is_empty() {
        return Err(AppError::NoCnameBindings);
    }

    let Some(material) = material else {
        return Ok(());
    };

    let target = select_target(&bindings, args.domain.as_deref())?;
    render::info("正在更新CNAME的SSL证书...", args.quiet);

    client
        .put_cname(&CnameUpdate {
            bucket: &args.bucket,
            domain: &target.domain,
            previous_cert_id: target.cert_id(),
            material,
            force: true,
        })
        .await?;

    info!("Updated SSL certificate for domain: {}", target.domain);
    render::info("SSL证书已成功更新。", args.quiet);
    Ok(())
}

/// 指定域名时要求精确匹配，否则取列表第一项。
fn select_target<'a>(
    bindings: &'a [CnameBinding],
    domain: Option<&str>,
) -> crate::Result<&'a CnameBinding> {
    match domain {
        None | Some("") => bindings.first().ok_or(AppError::NoCnameBindings),
        Some(domain) => bindings
            .iter()
            .find(|binding| binding.domain == domain)
            .ok_or_else(|| AppError::DomainNotFound(domain.to_string())),
    }
}
