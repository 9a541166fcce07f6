//! End-to-end acquisition tests against a loopback HTTP server.
//!
//! The server speaks just enough HTTP/1.1 for one GET per connection and
//! counts requests, so cache idempotence can be asserted directly.

use nli_datasets::{Config, DatasetSpec, Error, Pipeline, Split};
use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const RTE_TRAIN: &str = "index\tsentence1\tsentence2\tlabel\n\
0\tHe said \"no\" twice.\tHe spoke.\tentailment\n\
1\tThe sky is green.\tThe sky is blue.\tnot_entailment\n";

const RTE_DEV: &str = "index\tsentence1\tsentence2\tlabel\n\
0\tA cat sleeps.\tAn animal rests.\tentailment\n\
1\tA dog barks.\tA cat meows.\tnot_entailment\n\
2\tUnlabeled.\tRow.\t-\n";

enum Reply {
    Body(Vec<u8>),
    /// Advertise more bytes than are sent, then hang up.
    Truncated(Vec<u8>),
    NotFound,
}

struct Server {
    port: u16,
    requests: Arc<AtomicUsize>,
}

impl Server {
    fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                counter.fetch_add(1, Ordering::SeqCst);
                respond(stream, &reply);
            }
        });
        Self { port, requests }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}/{}", self.port, path)
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn respond(mut stream: TcpStream, reply: &Reply) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let (head, body, advertised) = match reply {
        Reply::Body(body) => ("200 OK", body.as_slice(), body.len()),
        Reply::Truncated(body) => ("200 OK", body.as_slice(), body.len() + 1000),
        Reply::NotFound => ("404 Not Found", &b""[..], 0),
    };
    let _ = write!(
        stream,
        "HTTP/1.1 {head}\r\nContent-Length: {advertised}\r\nConnection: close\r\n\r\n"
    );
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn rte_zip() -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in [("RTE/train.tsv", RTE_TRAIN), ("RTE/dev.tsv", RTE_DEV)] {
        zip.start_file(name, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn rte_spec(url: String) -> DatasetSpec {
    DatasetSpec::binary(url)
        .train("RTE/train.tsv")
        .validation("RTE/dev.tsv")
        .premise_column("sentence1")
        .hypothesis_column("sentence2")
        .build()
        .unwrap()
}

fn pipeline(cache: &TempDir) -> Pipeline {
    let config = Config::default()
        .with_cache_dir(cache.path().join("data"))
        .with_workers(2)
        .with_progress(false);
    Pipeline::new(&config).unwrap()
}

#[test]
fn test_fetch_extract_load() {
    let server = Server::start(Reply::Body(rte_zip()));
    let cache = TempDir::new().unwrap();
    let loader = pipeline(&cache).loader("glue/rte", rte_spec(server.url("glue/data/RTE.zip")));

    let dev = loader.load_split(Split::Validation).unwrap();
    assert_eq!(dev.len(), 2, "the '-' row is filtered");
    assert_eq!(dev[0].premise, "A cat sleeps.");
    assert_eq!(dev[0].label, 0);
    assert_eq!(dev[1].label, 1);
    assert_eq!(dev.label_names(), &["entailment", "not_entailment"]);

    let root = cache.path().join("data");
    assert!(root.join("RTE.zip").is_file());
    assert!(root.join("RTE").join("RTE").join("dev.tsv").is_file());
    assert!(!root.join("RTE.zip.part").exists());
    assert!(!root.join("RTE.partial").exists());
    assert_eq!(server.requests(), 1);
}

#[test]
fn test_second_load_is_served_from_cache() {
    let server = Server::start(Reply::Body(rte_zip()));
    let cache = TempDir::new().unwrap();
    let pipeline = pipeline(&cache);
    let loader = pipeline.loader("glue/rte", rte_spec(server.url("glue/data/RTE.zip")));

    loader.load_split(Split::Train).unwrap();
    let root = cache.path().join("data");
    let archive_len = fs::metadata(root.join("RTE.zip")).unwrap().len();
    fs::write(root.join("RTE").join("marker"), b"untouched").unwrap();

    let train = loader.load_split(Split::Train).unwrap();
    assert_eq!(server.requests(), 1, "no second GET");
    assert_eq!(fs::metadata(root.join("RTE.zip")).unwrap().len(), archive_len);
    assert_eq!(fs::read(root.join("RTE").join("marker")).unwrap(), b"untouched");

    // bare quote survives verbatim
    assert_eq!(train[0].premise, "He said \"no\" twice.");
    assert_eq!(train.len(), 2);
}

#[test]
fn test_http_error_leaves_no_archive() {
    let server = Server::start(Reply::NotFound);
    let cache = TempDir::new().unwrap();
    let loader = pipeline(&cache).loader("glue/rte", rte_spec(server.url("glue/data/RTE.zip")));

    let result = loader.load_split(Split::Train);
    assert!(matches!(result, Err(Error::Network(_))), "{:?}", result);

    let root = cache.path().join("data");
    assert!(!root.join("RTE.zip").exists());
    assert!(!root.join("RTE.zip.part").exists());
    assert!(!root.join("RTE").exists());
}

#[test]
fn test_truncated_body_is_not_cached() {
    let body = rte_zip();
    let server = Server::start(Reply::Truncated(body[..body.len() / 2].to_vec()));
    let cache = TempDir::new().unwrap();
    let loader = pipeline(&cache).loader("glue/rte", rte_spec(server.url("glue/data/RTE.zip")));

    let result = loader.load_split(Split::Train);
    assert!(matches!(result, Err(Error::Network(_))), "{:?}", result);
    assert!(!cache.path().join("data").join("RTE.zip").exists());
}

#[test]
fn test_unknown_split_downloads_nothing() {
    let server = Server::start(Reply::Body(rte_zip()));
    let cache = TempDir::new().unwrap();
    let loader = pipeline(&cache).loader("glue/rte", rte_spec(server.url("glue/data/RTE.zip")));

    assert!(matches!(
        loader.load_split(Split::Test),
        Err(Error::UnknownSplit { .. })
    ));
    assert_eq!(server.requests(), 0);
}
