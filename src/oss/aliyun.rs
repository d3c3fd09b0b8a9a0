use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{CnameBinding, CnameCertificate, CnameUpdate, ObjectStorage};
use crate::credentials::Credentials;
use crate::error::AppError;

const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
const SIGNING_ALGORITHM: &str = "OSS4-HMAC-SHA256";

/// 阿里云OSS客户端，只实现CNAME相关的两个接口。
pub struct AliyunOss {
    http: Client,
    credentials: Credentials,
    region: String,
    scheme: String,
    host: String,
    // 自定义endpoint（IP或测试服务器）走path-style寻址，与官方SDK行为一致
    path_style: bool,
}

impl AliyunOss {
    pub fn new(credentials: Credentials, region: &str) -> crate::Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(AliyunOss {
            http,
            credentials,
            region: region.to_string(),
            scheme: "https".to_string(),
            host: format!("oss-{}.aliyuncs.com", region),
            path_style: false,
        })
    }

    /// 覆盖默认endpoint，形如 "http://127.0.0.1:8080"。
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        let (scheme, host) = match endpoint.split_once("://") {
            Some((scheme, host)) => (scheme.to_string(), host.to_string()),
            None => ("https".to_string(), endpoint.to_string()),
        };
        self.scheme = scheme;
        self.host = host;
        self.path_style = true;
        self
    }

    async fn send(
        &self,
        method: Method,
        bucket: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> crate::Result<reqwest::Response> {
        let now = Utc::now();
        let datetime = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let canonical_uri = format!("/{}/", bucket);
        let query_string = canonical_query_string(query);

        let mut signed_headers = vec![
            ("x-oss-content-sha256".to_string(), UNSIGNED_PAYLOAD.to_string()),
            ("x-oss-date".to_string(), datetime.clone()),
        ];
        if body.is_some() {
            signed_headers.push(("content-type".to_string(), "application/xml".to_string()));
        }

        let canonical = canonical_request(
            method.as_str(),
            &canonical_uri,
            &query_string,
            &signed_headers,
        );
        let scope = format!("{}/{}/oss/aliyun_v4_request", date, self.region);
        let to_sign = string_to_sign(&datetime, &scope, &canonical);
        let signature = sign(
            &self.credentials.access_key_secret,
            &date,
            &self.region,
            &to_sign,
        );
        let authorization = format!(
            "{} Credential={}/{},Signature={}",
            SIGNING_ALGORITHM, self.credentials.access_key_id, scope, signature
        );

        let url = if self.path_style {
            format!("{}://{}/{}/?{}", self.scheme, self.host, bucket, query_string)
        } else {
            format!("{}://{}.{}/?{}", self.scheme, bucket, self.host, query_string)
        };
        debug!("OSS request: {} {}", method, url);

        let mut request = self
            .http
            .request(method, url)
            .header("Authorization", authorization)
            .header("x-oss-content-sha256", UNSIGNED_PAYLOAD)
            .header("x-oss-date", datetime);
        if let Some(body) = body {
            request = request.header("Content-Type", "application/xml").body(body);
        }
        Ok(request.send().await?)
    }
}

#[async_trait::async_trait]
impl ObjectStorage for AliyunOss {
    async fn list_cnames(&self, bucket: &str) -> crate::Result<Vec<CnameBinding>> {
        let response = self
            .send(Method::GET, bucket, &[("cname", "")], None)
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(service_error(status.as_u16(), &text));
        }

        let result: ListCnameResult = quick_xml::de::from_str(&text)?;
        Ok(result
            .cnames
            .into_iter()
            .map(|entry| CnameBinding {
                domain: entry.domain,
                status: entry.status.unwrap_or_default(),
                certificate: entry.certificate.map(|cert| CnameCertificate {
                    cert_id: cert.cert_id,
                    valid_end_date: cert.valid_end_date,
                }),
            })
            .collect())
    }

    async fn put_cname(&self, update: &CnameUpdate<'_>) -> crate::Result<()> {
        let configuration = BucketCnameConfiguration {
            cname: CnameConfiguration {
                domain: update.domain,
                certificate_configuration: CertificateConfiguration {
                    certificate: &update.material.certificate,
                    private_key: &update.material.private_key,
                    previous_cert_id: update.previous_cert_id,
                    force: update.force,
                },
            },
        };
        let body = quick_xml::se::to_string(&configuration)?;

        let response = self
            .send(
                Method::POST,
                update.bucket,
                &[("cname", ""), ("comp", "add")],
                Some(body),
            )
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(service_error(status.as_u16(), &text));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListCnameResult {
    #[serde(default, rename = "Cname")]
    cnames: Vec<CnameEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CnameEntry {
    domain: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    certificate: Option<CertificateEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CertificateEntry {
    cert_id: String,
    #[serde(default)]
    valid_end_date: Option<String>,
}

#[derive(Serialize)]
#[serde(rename = "BucketCnameConfiguration", rename_all = "PascalCase")]
struct BucketCnameConfiguration<'a> {
    cname: CnameConfiguration<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CnameConfiguration<'a> {
    domain: &'a str,
    certificate_configuration: CertificateConfiguration<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CertificateConfiguration<'a> {
    certificate: &'a str,
    private_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_cert_id: Option<&'a str>,
    force: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: String,
}

fn service_error(status: u16, body: &str) -> AppError {
    match quick_xml::de::from_str::<ErrorResponse>(body) {
        Ok(error) if !error.code.is_empty() => AppError::Service {
            code: error.code,
            message: error.message,
            request_id: error.request_id,
        },
        _ => AppError::Http(format!("HTTP {}: {}", status, body.trim())),
    }
}

fn uri_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// 参数按key排序；无值参数只保留key，与签名文档一致。
fn canonical_query_string(params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<String> = params
        .iter()
        .map(|(key, value)| {
            if value.is_empty() {
                uri_encode(key)
            } else {
                format!("{}={}", uri_encode(key), uri_encode(value))
            }
        })
        .collect();
    encoded.sort();
    encoded.join("&")
}

fn canonical_request(
    method: &str,
    canonical_uri: &str,
    canonical_query: &str,
    signed_headers: &[(String, String)],
) -> String {
    let mut headers: Vec<&(String, String)> = signed_headers.iter().collect();
    headers.sort();
    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
        .collect();
    // 最后两段为AdditionalHeaders（此处恒为空）和payload哈希
    format!(
        "{}\n{}\n{}\n{}\n\n{}",
        method, canonical_uri, canonical_query, canonical_headers, UNSIGNED_PAYLOAD
    )
}

fn string_to_sign(datetime: &str, scope: &str, canonical_request: &str) -> String {
    let hashed = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    format!("{}\n{}\n{}\n{}", SIGNING_ALGORITHM, datetime, scope, hashed)
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sign(secret: &str, date: &str, region: &str, string_to_sign: &str) -> String {
    let key = hmac_sha256(format!("aliyun_v4{}", secret).as_bytes(), date.as_bytes());
    let key = hmac_sha256(&key, region.as_bytes());
    let key = hmac_sha256(&key, b"oss");
    let key = hmac_sha256(&key, b"aliyun_v4_request");
    hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::CertificateMaterial;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Credentials {
        Credentials {
            access_key_id: "testid".to_string(),
            access_key_secret: "testsecret".to_string(),
        }
    }

    const LIST_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListCnameResult>
  <Bucket>my-bucket</Bucket>
  <Cname>
    <Domain>example.com</Domain>
    <LastModified>2021-09-15T02:35:07.000Z</LastModified>
    <Status>Enabled</Status>
    <Certificate>
      <Type>CAS</Type>
      <CertId>493****-cn-hangzhou</CertId>
      <Status>Enabled</Status>
      <ValidStartDate>Wed, 12 Apr 2023 10:14:51 GMT</ValidStartDate>
      <ValidEndDate>Mon, 4 May 2048 10:14:51 GMT</ValidEndDate>
    </Certificate>
  </Cname>
  <Cname>
    <Domain>bare.example.com</Domain>
    <Status>Enabled</Status>
  </Cname>
</ListCnameResult>"#;

    #[test]
    fn test_canonical_query_string_sorts_and_drops_empty_values() {
        assert_eq!(canonical_query_string(&[("cname", "")]), "cname");
        assert_eq!(
            canonical_query_string(&[("comp", "add"), ("cname", "")]),
            "cname&comp=add"
        );
    }

    #[test]
    fn test_uri_encode() {
        assert_eq!(uri_encode("abc-123_.~"), "abc-123_.~");
        assert_eq!(uri_encode("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_canonical_request_layout() {
        let headers = vec![
            ("x-oss-content-sha256".to_string(), UNSIGNED_PAYLOAD.to_string()),
            ("x-oss-date".to_string(), "20250102T030405Z".to_string()),
        ];
        let canonical = canonical_request("GET", "/my-bucket/", "cname", &headers);
        assert_eq!(
            canonical,
            "GET\n/my-bucket/\ncname\n\
             x-oss-content-sha256:UNSIGNED-PAYLOAD\nx-oss-date:20250102T030405Z\n\
             \n\nUNSIGNED-PAYLOAD"
        );
    }

    #[test]
    fn test_signature_matches_reference_vector() {
        let headers = vec![
            ("x-oss-content-sha256".to_string(), UNSIGNED_PAYLOAD.to_string()),
            ("x-oss-date".to_string(), "20250102T030405Z".to_string()),
        ];
        let canonical = canonical_request("GET", "/my-bucket/", "cname", &headers);
        let to_sign = string_to_sign(
            "20250102T030405Z",
            "20250102/cn-shanghai/oss/aliyun_v4_request",
            &canonical,
        );
        let signature = sign("testsecret", "20250102", "cn-shanghai", &to_sign);
        assert_eq!(
            signature,
            "48aab19d927faec0fc99b73b76ed8a7d8823dcbef6e52ea029f72ab905b24acb"
        );
    }

    #[test]
    fn test_put_cname_body_serialization() {
        let configuration = BucketCnameConfiguration {
            cname: CnameConfiguration {
                domain: "example.com",
                certificate_configuration: CertificateConfiguration {
                    certificate: "CERT",
                    private_key: "KEY",
                    previous_cert_id: Some("old-id"),
                    force: true,
                },
            },
        };
        let body = quick_xml::se::to_string(&configuration).unwrap();
        assert!(body.starts_with("<BucketCnameConfiguration>"));
        assert!(body.contains("<Domain>example.com</Domain>"));
        assert!(body.contains("<Certificate>CERT</Certificate>"));
        assert!(body.contains("<PrivateKey>KEY</PrivateKey>"));
        assert!(body.contains("<PreviousCertId>old-id</PreviousCertId>"));
        assert!(body.contains("<Force>true</Force>"));
    }

    #[test]
    fn test_put_cname_body_omits_missing_previous_cert_id() {
        let configuration = BucketCnameConfiguration {
            cname: CnameConfiguration {
                domain: "example.com",
                certificate_configuration: CertificateConfiguration {
                    certificate: "CERT",
                    private_key: "KEY",
                    previous_cert_id: None,
                    force: true,
                },
            },
        };
        let body = quick_xml::se::to_string(&configuration).unwrap();
        assert!(!body.contains("PreviousCertId"));
    }

    #[tokio::test]
    async fn test_list_cnames_parses_bindings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/my-bucket/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LIST_XML))
            .mount(&server)
            .await;

        let client = AliyunOss::new(credentials(), "cn-shanghai")
            .unwrap()
            .with_endpoint(&server.uri());
        let bindings = client.list_cnames("my-bucket").await.unwrap();

        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].domain, "example.com");
        assert_eq!(bindings[0].status, "Enabled");
        assert_eq!(bindings[0].cert_id(), Some("493****-cn-hangzhou"));
        assert_eq!(
            bindings[0]
                .certificate
                .as_ref()
                .unwrap()
                .valid_end_date
                .as_deref(),
            Some("Mon, 4 May 2048 10:14:51 GMT")
        );
        assert_eq!(bindings[1].domain, "bare.example.com");
        assert!(bindings[1].certificate.is_none());
    }

    #[tokio::test]
    async fn test_list_cnames_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/my-bucket/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<ListCnameResult><Bucket>my-bucket</Bucket></ListCnameResult>",
            ))
            .mount(&server)
            .await;

        let client = AliyunOss::new(credentials(), "cn-shanghai")
            .unwrap()
            .with_endpoint(&server.uri());
        let bindings = client.list_cnames("my-bucket").await.unwrap();
        assert!(bindings.is_empty());
    }

    #[tokio::test]
    async fn test_list_cnames_surfaces_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/my-bucket/"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"<Error>
  <Code>NoSuchBucket</Code>
  <Message>The specified bucket does not exist.</Message>
  <RequestId>5C3D9175B6FC201293AD****</RequestId>
</Error>"#,
            ))
            .mount(&server)
            .await;

        let client = AliyunOss::new(credentials(), "cn-shanghai")
            .unwrap()
            .with_endpoint(&server.uri());
        let err = client.list_cnames("my-bucket").await.unwrap_err();
        match err {
            AppError::Service { code, message, .. } => {
                assert_eq!(code, "NoSuchBucket");
                assert!(message.contains("does not exist"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_put_cname_sends_configuration() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/my-bucket/"))
            .and(body_string_contains("<Domain>example.com</Domain>"))
            .and(body_string_contains("<Force>true</Force>"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let material = CertificateMaterial {
            certificate: "CERT".to_string(),
            private_key: "KEY".to_string(),
        };
        let client = AliyunOss::new(credentials(), "cn-shanghai")
            .unwrap()
            .with_endpoint(&server.uri());
        client
            .put_cname(&CnameUpdate {
                bucket: "my-bucket",
                domain: "example.com",
                previous_cert_id: Some("old-id"),
                material: &material,
                force: true,
            })
            .await
            .unwrap();
    }
}
