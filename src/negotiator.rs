use crate::error::{MirrorError, Result};
use crate::html;
use crate::session::PhenocamClient;
use crate::types::ArchiveUnit;
use log::{debug, info};

impl PhenocamClient {
    /// Asks the service to package `unit` and returns the absolute archive URL.
    ///
    /// `Ok(None)` means the response carried no archive link, which is what
    /// happens for a range without images. The caller moves on to the next unit.
    pub async fn request_archive(
        &self,
        unit: &ArchiveUnit,
        start_time: &str,
        end_time: &str,
    ) -> Result<Option<String>> {
        let (start, end) = unit
            .date_range()
            .ok_or_else(|| MirrorError::Config(format!("{unit} is not a valid date")))?;
        let start_date = start.format("%Y-%m-%d").to_string();
        let end_date = end.format("%Y-%m-%d").to_string();

        let body = self
            .submit_form(
                &self.settings.request_url(),
                &[
                    ("submit", ""),
                    ("site", unit.site_id.as_str()),
                    ("start_date", start_date.as_str()),
                    ("end_date", end_date.as_str()),
                    ("start_time", start_time),
                    ("end_time", end_time),
                    ("ir_flag", ""),
                ],
            )
            .await?;

        let path = match html::redirect_path(&body) {
            Ok(path) => path,
            Err(e) => {
                if self.settings.debug {
                    debug!("unparseable download response:\n{}", body);
                }
                return Err(e);
            }
        };

        Ok(path.map(|path| {
            let url = format!("{}{}", self.settings.base_url, path);
            info!("{}: redirect URL {}", unit, url);
            url
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{self, StubServer};

    const DOWNLOAD_FORM: &str = r#"<html><body><form method="post">
<input type="hidden" name="csrfmiddlewaretoken" value="form456">
<select name="site"></select>
</form></body></html>"#;

    fn download_response(fourth_script: &str) -> String {
        format!(
            "<html><head><script>a()</script><script>b()</script></head>\
             <body><script>c()</script><script>{fourth_script}</script></body></html>"
        )
    }

    #[tokio::test]
    async fn posts_unit_and_returns_absolute_url() {
        let page = download_response("function go() { window.location.href = '/webcam/archive/foo.zip'}");
        let server = StubServer::start(vec![
            test_server::response("200 OK", &[], DOWNLOAD_FORM),
            test_server::response("200 OK", &[], &page),
        ])
        .await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = PhenocamClient::new(test_server::settings(&server.base_url, dir.path())).unwrap();

        let unit = ArchiveUnit::daily("harvard", 2020, 6, 15);
        let url = client.request_archive(&unit, "06:00", "18:00").await.unwrap();

        let base = server.base_url.clone();
        assert_eq!(url, Some(format!("{base}/webcam/archive/foo.zip")));

        let requests = server.requests().await;
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/webcam/network/download/");
        assert_eq!(requests[1].method, "POST");
        assert_eq!(
            requests[1].header("referer"),
            Some(format!("{base}/webcam/network/download/").as_str())
        );
        let form = requests[1].form();
        for (name, value) in [
            ("csrfmiddlewaretoken", "form456"),
            ("submit", ""),
            ("site", "harvard"),
            ("start_date", "2020-06-15"),
            ("end_date", "2020-06-15"),
            ("start_time", "06:00"),
            ("end_time", "18:00"),
            ("ir_flag", ""),
        ] {
            assert_eq!(form.get(name).map(String::as_str), Some(value), "{name}");
        }
        assert_eq!(form.len(), 8);
    }

    #[tokio::test]
    async fn page_without_redirect_is_none() {
        let page = download_response("alert('no images found')");
        let server = StubServer::start(vec![
            test_server::response("200 OK", &[], DOWNLOAD_FORM),
            test_server::response("200 OK", &[], &page),
        ])
        .await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = PhenocamClient::new(test_server::settings(&server.base_url, dir.path())).unwrap();

        let unit = ArchiveUnit::daily("harvard", 2020, 6, 15);
        assert_eq!(client.request_archive(&unit, "00:00", "23:59").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unexpected_page_is_a_parse_error() {
        let server = StubServer::start(vec![
            test_server::response("200 OK", &[], DOWNLOAD_FORM),
            test_server::response("200 OK", &[], "<html><body><script>x()</script></body></html>"),
        ])
        .await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = PhenocamClient::new(test_server::settings(&server.base_url, dir.path())).unwrap();

        let unit = ArchiveUnit::daily("harvard", 2020, 6, 15);
        let err = client.request_archive(&unit, "00:00", "23:59").await.unwrap_err();
        assert!(matches!(err, MirrorError::ResponseParse(_)));
    }

    #[tokio::test]
    async fn failed_submission_is_remote_protocol() {
        let server = StubServer::start(vec![
            test_server::response("200 OK", &[], DOWNLOAD_FORM),
            test_server::response("502 Bad Gateway", &[], ""),
        ])
        .await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = PhenocamClient::new(test_server::settings(&server.base_url, dir.path())).unwrap();

        let unit = ArchiveUnit::daily("harvard", 2020, 6, 15);
        let err = client.request_archive(&unit, "00:00", "23:59").await.unwrap_err();
        assert!(matches!(err, MirrorError::RemoteProtocol(_)));
    }

    #[tokio::test]
    async fn request_carries_login_session() {
        let page = download_response("window.location.href = '/webcam/archive/bar.zip'}");
        let server = StubServer::start(vec![
            test_server::response("200 OK", &[], DOWNLOAD_FORM),
            test_server::response("200 OK", &[("Set-Cookie", "sessionid=xyz; Path=/")], "ok"),
            test_server::response("200 OK", &[], DOWNLOAD_FORM),
            test_server::response("200 OK", &[], &page),
        ])
        .await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = PhenocamClient::new(test_server::settings(&server.base_url, dir.path())).unwrap();

        client.login().await.unwrap();
        let unit = ArchiveUnit::daily("harvard", 2020, 6, 15);
        client.request_archive(&unit, "00:00", "23:59").await.unwrap();

        let requests = server.requests().await;
        for request in &requests[2..] {
            assert!(
                request.header("cookie").unwrap_or("").contains("sessionid=xyz"),
                "{} {}",
                request.method,
                request.path
            );
        }
    }
}
