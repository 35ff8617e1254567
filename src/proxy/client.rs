use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{self, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tokio_rustls::rustls::{
    self,
    client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
    crypto::{self, CryptoProvider},
    pki_types::{CertificateDer, ServerName, UnixTime},
    ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
};
use tracing::{debug, info};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 프록시가 주고받는 요청/응답 바디 타입
pub type ProxyBody = BoxBody<Bytes, BoxError>;

pub type UpstreamClient = legacy::Client<HttpsConnector<HttpConnector>, ProxyBody>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("TLS 설정 오류: {0}")]
    Tls(#[from] rustls::Error),

    #[error("CA 파일 {path} 읽기 실패: {source}")]
    CaFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CA 파일 {path}에 인증서가 없음")]
    NoCertificates {
        path: PathBuf,
    },
}

/// 업스트림 클라이언트 생성 옵션
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub connect_timeout: Option<Duration>,
    /// webpki 루트에 더해 신뢰할 CA 인증서
    pub extra_roots: Vec<CertificateDer<'static>>,
}

/// 인증서 검증 정책별로 하나씩 만든 커넥션 풀 클라이언트입니다.
///
/// 두 클라이언트 모두 http/https 타겟을 처리하며, 같은 (스킴, 호스트, 포트)에
/// 대한 연결은 풀에서 재사용됩니다.
#[derive(Clone)]
pub struct UpstreamClients {
    verified: UpstreamClient,
    unverified: UpstreamClient,
}

impl UpstreamClients {
    pub fn new(options: &ClientOptions) -> Result<Self, ClientError> {
        let provider = Arc::new(crypto::ring::default_provider());

        let mut roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        for cert in &options.extra_roots {
            roots.add(cert.clone())?;
        }

        let verified_tls = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()?
            .with_root_certificates(roots)
            .with_no_client_auth();

        let unverified_tls = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert(provider)))
            .with_no_client_auth();

        info!(
            extra_roots = options.extra_roots.len(),
            connect_timeout = ?options.connect_timeout,
            "업스트림 클라이언트 생성"
        );

        Ok(Self {
            verified: build_client(verified_tls, options.connect_timeout),
            unverified: build_client(unverified_tls, options.connect_timeout),
        })
    }

    /// 라우트의 `secure` 값에 맞는 클라이언트를 돌려줍니다.
    pub fn for_rule(&self, secure: bool) -> &UpstreamClient {
        if secure {
            &self.verified
        } else {
            &self.unverified
        }
    }
}

fn build_client(tls: ClientConfig, connect_timeout: Option<Duration>) -> UpstreamClient {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(connect_timeout);

    let connector = HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .wrap_connector(http);

    legacy::Client::builder(TokioExecutor::new()).build(connector)
}

/// PEM 파일에서 CA 인증서를 읽습니다.
pub fn load_ca_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, ClientError> {
    let file = File::open(path).map_err(|e| ClientError::CaFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut reader = BufReader::new(file);
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ClientError::CaFile {
            path: path.to_path_buf(),
            source: e,
        })?;

    if certs.is_empty() {
        return Err(ClientError::NoCertificates { path: path.to_path_buf() });
    }
    debug!(path = %path.display(), count = certs.len(), "CA 인증서 로드");
    Ok(certs)
}

/// `secure: false` 라우트용 검증기. 인증서 체인은 보지 않고 핸드셰이크 서명만 확인합니다.
#[derive(Debug)]
struct AcceptAnyServerCert(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        crypto::verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        crypto::verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_any_cert_verifier_accepts_garbage() {
        let verifier = AcceptAnyServerCert(Arc::new(crypto::ring::default_provider()));
        let cert = CertificateDer::from(vec![0u8; 16]);
        let name = ServerName::try_from("self-signed.local").unwrap();
        assert!(verifier
            .verify_server_cert(&cert, &[], &name, &[], UnixTime::now())
            .is_ok());
        assert!(!verifier.supported_verify_schemes().is_empty());
    }

    #[test]
    fn test_load_ca_missing_file() {
        let err = load_ca_certificates(Path::new("/nonexistent/ca.pem")).unwrap_err();
        assert!(matches!(err, ClientError::CaFile { .. }));
    }

    #[test]
    fn test_load_ca_without_certificates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a pem file").unwrap();
        let err = load_ca_certificates(file.path()).unwrap_err();
        assert!(matches!(err, ClientError::NoCertificates { .. }));
    }
}
