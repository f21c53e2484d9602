use crate::{exception::Exception, handler::Content, param::*, util};

use bytes::Bytes;
use chrono::prelude::*;
use log::error;

#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    content_length: u64,
    date: DateTime<Utc>,
    server_name: String,
    allow: Option<Vec<HttpRequestMethod>>,
    content: Option<Bytes>,
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            content_length: 0,
            date: Utc::now(),
            server_name: SERVER_NAME.to_string(),
            allow: None,
            content: None,
        }
    }

    /// 用分类成功的内容构建响应。
    /// Content-Length 始终等于响应体的实际字节数。
    pub fn from_content(content: Content) -> Self {
        let mut response = Self::new();
        response.content_length = content.bytes.len() as u64;
        response.content_type = Some(CONTENT_TYPE_HTML.to_string());
        response
            .set_code(content.status)
            .set_date()
            .set_version()
            .set_server_name();
        response.content = Some(content.bytes);
        response
    }

    /// 用分发失败的异常构建错误响应。
    ///
    /// 所有失败一律渲染为 404 页面：客户端看不出"不存在"与"内部错误"的区别，
    /// 差异只体现在页面中的消息文本上。
    pub fn from_exception(request_path: &str, exception: &Exception) -> Self {
        let page = util::error_page(request_path, &exception.to_string());
        let bytes = Bytes::from(page);

        let mut response = Self::new();
        response.content_length = bytes.len() as u64;
        response.content_type = Some(CONTENT_TYPE_HTML.to_string());
        response
            .set_code(404)
            .set_date()
            .set_version()
            .set_server_name();
        response.content = Some(bytes);
        response
    }

    /// GET 以外的方法统一用该响应拒绝，附带 Allow 头
    pub fn method_not_allowed() -> Self {
        let mut response = Self::new();
        response.allow = Some(ALLOWED_METHODS.to_vec());
        response
            .set_code(405)
            .set_date()
            .set_version()
            .set_server_name();
        response
    }

    /// 无法解析为 HTTP 请求的字节流用该响应拒绝
    pub fn bad_request() -> Self {
        let mut response = Self::new();
        response
            .set_code(400)
            .set_date()
            .set_version()
            .set_server_name();
        response
    }

    fn set_date(&mut self) -> &mut Self {
        self.date = Utc::now();
        self
    }

    fn set_version(&mut self) -> &mut Self {
        self.version = HttpVersion::V1_1;
        self
    }

    fn set_server_name(&mut self) -> &mut Self {
        self.server_name = SERVER_NAME.to_string();
        self
    }

    fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&information) => information.to_string(),
            None => {
                error!("非法的状态码：{}。这条错误说明代码编写出现了错误。", code);
                "Unknown".to_string()
            }
        };
        self
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let version: &str = match self.version {
            HttpVersion::V1_0 => "HTTP/1.0",
            HttpVersion::V1_1 => "HTTP/1.1",
        };
        let status_code: &str = &self.status_code.to_string();
        let information: &str = &self.information;
        let content_length: &str = &self.content_length.to_string();
        let date: &str = &format_date(&self.date);
        let server: &str = &self.server_name;

        let header = [
            version,
            " ",
            status_code,
            " ",
            information,
            CRLF,
            match &self.content_type {
                Some(t) => ["Content-Type: ", t, CRLF].concat(),
                None => "".to_string(),
            }
            .as_str(),
            "Content-Length: ",
            content_length,
            CRLF,
            "Date: ",
            date,
            CRLF,
            "Server: ",
            server,
            CRLF,
            match &self.allow {
                Some(a) => {
                    let mut allow_str = String::new();
                    for (index, method) in a.iter().enumerate() {
                        allow_str.push_str(&format!("{}", method));
                        if index < a.len() - 1 {
                            allow_str.push_str(", ");
                        }
                    }
                    ["Allow: ", &allow_str, CRLF].concat()
                }
                None => "".to_string(),
            }
            .as_str(),
            CRLF,
        ]
        .concat();
        [
            header.as_bytes(),
            match &self.content {
                Some(c) => c.as_ref(),
                None => b"",
            },
        ]
        .concat()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    /// 响应体字节（不含头部），测试和日志使用
    pub fn body(&self) -> &[u8] {
        match &self.content {
            Some(c) => c.as_ref(),
            None => b"",
        }
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc2822()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let date = Utc::now();
        let formatted = format_date(&date);

        assert!(formatted.contains("+0000") || formatted.contains("GMT"));
    }

    #[test]
    fn test_response_new() {
        let response = Response::new();

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.information(), "OK");
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_response_as_bytes_basic() {
        let response = Response::new();
        let bytes = response.as_bytes();
        let response_str = String::from_utf8_lossy(&bytes);

        assert!(response_str.starts_with("HTTP/1.1 200 OK"));
        assert!(response_str.contains("Content-Length: 0"));
        assert!(response_str.contains("Server: tinyserve"));
        assert!(response_str.contains("Date: "));
        assert!(response_str.contains("\r\n\r\n"));
    }

    #[test]
    fn test_from_content_headers_and_body() {
        let content = Content::ok(Bytes::from("hi"));
        let response = Response::from_content(content);

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.content_length(), 2);

        let bytes = response.as_bytes();
        let response_str = String::from_utf8_lossy(&bytes);
        assert!(response_str.contains("Content-Type: text/html"));
        assert!(response_str.contains("Content-Length: 2"));
        assert!(response_str.ends_with("hi"));
    }

    /// Content-Length 必须与响应体的实际字节数一致
    #[test]
    fn test_content_length_matches_body() {
        for body in ["", "x", "hello world", "多字节内容"] {
            let response = Response::from_content(Content::ok(Bytes::from(body.to_string())));
            assert_eq!(response.content_length(), body.as_bytes().len() as u64);
            assert_eq!(response.body().len() as u64, response.content_length());
        }
    }

    #[test]
    fn test_from_exception_renders_404_page() {
        let e = Exception::NotFound {
            path: "/missing.txt".to_string(),
        };
        let response = Response::from_exception("/missing.txt", &e);

        assert_eq!(response.status_code(), 404);
        assert_eq!(response.information(), "Not Found");

        let body = String::from_utf8_lossy(response.body()).into_owned();
        assert!(body.contains("Error accessing /missing.txt"));
        assert!(body.contains("'/missing.txt' not found"));
        assert_eq!(response.content_length() as usize, body.as_bytes().len());
    }

    /// 读失败和列举失败同样渲染为 404，消息不同
    #[test]
    fn test_from_exception_other_variants() {
        let e = Exception::ReadFailed {
            path: "/f".to_string(),
            cause: "permission denied".to_string(),
        };
        let response = Response::from_exception("/f", &e);
        assert_eq!(response.status_code(), 404);
        assert!(String::from_utf8_lossy(response.body()).contains("cannot be read"));

        let e = Exception::UnknownObject {
            path: "/f".to_string(),
        };
        let response = Response::from_exception("/f", &e);
        assert_eq!(response.status_code(), 404);
        assert!(String::from_utf8_lossy(response.body()).contains("Unknown object"));
    }

    #[test]
    fn test_method_not_allowed() {
        let response = Response::method_not_allowed();
        assert_eq!(response.status_code(), 405);

        let bytes = response.as_bytes();
        let response_str = String::from_utf8_lossy(&bytes);
        assert!(response_str.starts_with("HTTP/1.1 405 Method Not Allowed"));
        assert!(response_str.contains("Allow: GET"));
    }

    #[test]
    fn test_bad_request() {
        let response = Response::bad_request();
        assert_eq!(response.status_code(), 400);
        assert_eq!(response.information(), "Bad Request");
    }
}
