//! Where document bytes come from: a local file picked by the user, or the
//! default dataset served over HTTP.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use memmap2::Mmap;

use crate::error::{IngestError, Result};
use crate::ingest;
use crate::model::ResultDocument;

/// Extension the open dialog and drop target accept.
pub const ACCEPTED_EXTENSION: &str = "gz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Default { url: String, timeout: Duration },
}

impl DataSource {
    pub fn origin(&self) -> Origin {
        match self {
            DataSource::File(_) => Origin::CustomFile,
            DataSource::Default { .. } => Origin::DefaultData,
        }
    }

    /// Reads the raw bytes and decodes them into a document.
    pub fn load(&self) -> Result<ResultDocument> {
        match self {
            DataSource::File(path) => {
                let mmap = map_file(path)?;
                ingest::decode(&mmap)
            }
            DataSource::Default { url, timeout } => {
                let bytes = fetch(url, *timeout)?;
                ingest::decode(&bytes)
            }
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            DataSource::File(path) => path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned(),
            DataSource::Default { url, .. } => url
                .rsplit('/')
                .next()
                .filter(|name| !name.is_empty())
                .unwrap_or(url)
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    CustomFile,
    DefaultData,
}

impl Origin {
    pub fn describe(&self) -> &'static str {
        match self {
            Origin::CustomFile => "custom file",
            Origin::DefaultData => "default enzymes data",
        }
    }
}

/// UI gate for dropped and picked files. The pipeline itself does not care.
pub fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ACCEPTED_EXTENSION))
}

fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)
        .map_err(|e| IngestError::Read(format!("{}: {}", path.display(), e)))?;
    let len = file.metadata()?.len();
    if len == 0 {
        // Zero-length files cannot be mapped on every platform.
        return Err(IngestError::Parse("file is empty".to_string()));
    }
    let mmap = unsafe { Mmap::map(&file)? };
    debug!("Mapped {} ({} bytes)", path.display(), len);
    Ok(mmap)
}

/// Fetches `url` as raw bytes with content-encoding negotiation and caching
/// turned off. Non-success statuses carry their code in the error.
pub fn fetch(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    info!("Fetching {}", url);
    let response = ureq::get(url)
        .timeout(timeout)
        .set("Accept-Encoding", "identity")
        .set("Accept", "*/*")
        .set("Cache-Control", "no-cache, no-store")
        .set("Pragma", "no-cache")
        .call()
        .map_err(|e| match e {
            ureq::Error::Status(status, response) => IngestError::Fetch {
                status,
                reason: response.status_text().to_string(),
            },
            ureq::Error::Transport(transport) => {
                IngestError::Read(format!("{}: {}", url, transport))
            }
        })?;

    let status = response.status();
    if !(200..300).contains(&status) {
        return Err(IngestError::Fetch {
            status,
            reason: response.status_text().to_string(),
        });
    }

    let mut bytes = Vec::new();
    response.into_reader().read_to_end(&mut bytes)?;
    info!("Received {} bytes from {}", bytes.len(), url);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answers a single request on a local port and hands back what was sent.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/enzymes.json.gz", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            write!(
                stream,
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            )
            .unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (url, handle)
    }

    const DOC: &str = r#"{"head":{"vars":["name"]},"results":{"distinct":false,"ordered":false,"bindings":[{"name":{"type":"literal","value":"Alice"}}]}}"#;

    #[test]
    fn extension_gate() {
        assert!(has_accepted_extension(Path::new("enzymes.json.gz")));
        assert!(has_accepted_extension(Path::new("/tmp/RESULTS.GZ")));
        assert!(!has_accepted_extension(Path::new("enzymes.json")));
        assert!(!has_accepted_extension(Path::new("gz")));
    }

    #[test]
    fn loads_plain_json_from_gz_named_file() {
        let mut file = tempfile::Builder::new().suffix(".json.gz").tempfile().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();

        let source = DataSource::File(file.path().to_path_buf());
        assert_eq!(source.origin(), Origin::CustomFile);
        let doc = source.load().unwrap();
        assert_eq!(doc.row_count(), 1);
        assert_eq!(doc.rows()[0].value("name"), "Alice");
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DataSource::File(dir.path().join("absent.json.gz"));
        assert!(matches!(source.load(), Err(IngestError::Read(_))));
    }

    #[test]
    fn empty_file_is_parse_error() {
        let file = tempfile::Builder::new().suffix(".gz").tempfile().unwrap();
        let source = DataSource::File(file.path().to_path_buf());
        assert!(matches!(source.load(), Err(IngestError::Parse(_))));
    }

    #[test]
    fn display_names() {
        let file = DataSource::File(PathBuf::from("/data/enzymes.json.gz"));
        assert_eq!(file.display_name(), "enzymes.json.gz");
        let default = DataSource::Default {
            url: "http://localhost:8000/enzymes.json.gz".into(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(default.display_name(), "enzymes.json.gz");
        assert_eq!(default.origin().describe(), "default enzymes data");
    }

    #[test]
    fn fetch_maps_error_status() {
        let (url, server) = serve_once("HTTP/1.1 404 Not Found", "missing");
        let err = fetch(&url, Duration::from_secs(5)).unwrap_err();
        server.join().unwrap();
        match err {
            IngestError::Fetch { status, reason } => {
                assert_eq!(status, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("expected a fetch error, got {other:?}"),
        }
    }

    #[test]
    fn default_source_loads_over_http() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", DOC);
        let source = DataSource::Default {
            url,
            timeout: Duration::from_secs(5),
        };
        assert_eq!(source.origin(), Origin::DefaultData);
        let doc = source.load().unwrap();
        server.join().unwrap();
        assert_eq!(doc.row_count(), 1);
        assert_eq!(doc.rows()[0].value("name"), "Alice");
    }

    #[test]
    fn fetch_asks_for_identity_encoding_without_cache() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", DOC);
        let bytes = fetch(&url, Duration::from_secs(5)).unwrap();
        assert_eq!(bytes, DOC.as_bytes());

        let request = server.join().unwrap().to_lowercase();
        assert!(request.starts_with("get /enzymes.json.gz "), "{request}");
        assert!(request.contains("accept-encoding: identity\r\n"), "{request}");
        assert!(request.contains("cache-control: no-cache, no-store\r\n"), "{request}");
        assert!(request.contains("pragma: no-cache\r\n"), "{request}");
    }
}
