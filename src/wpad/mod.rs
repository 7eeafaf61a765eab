pub mod fetch;
pub mod pac;

pub use fetch::{HttpResponse, HttpTarget, HttpTransport, ReqwestHttpTransport, WpadFetcher};
pub use pac::{parse, ProxyEntry};

/// DNS 发现时默认的配置文件名
pub const DEFAULT_WPAD_FILE: &str = "wpad.dat";

/// 由 DNS 找到的主机名拼出配置文件 URL
pub fn url_for_host(host: &str, file: &str) -> String {
    format!("http://{}/{}", host, file.trim_start_matches('/'))
}
