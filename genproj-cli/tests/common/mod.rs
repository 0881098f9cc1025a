#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::thread;

use genproj_cli::bootstrap::{Platform, ToolCatalog, ToolSource};
use genproj_cli::{Bootstrapper, Config, Reporter};
use zip::write::SimpleFileOptions;

/// Serializes tests that change the working directory or spawn processes
pub fn process_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Tiny HTTP server that answers every request with the same response
pub struct MockServer {
    base: String,
    hits: Arc<AtomicUsize>,
}

impl MockServer {
    pub fn start(status: &str, body: Vec<u8>, send_length: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("port bindable");
        let addr = listener.local_addr().expect("address available");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let status = status.to_string();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut buffer = [0u8; 4096];
                let _ = stream.read(&mut buffer);
                counter.fetch_add(1, Ordering::SeqCst);

                let length = if send_length {
                    format!("Content-Length: {}\r\n", body.len())
                } else {
                    String::new()
                };
                let header = format!("HTTP/1.1 {status}\r\n{length}Connection: close\r\n\r\n");
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(&body);
            }
        });

        Self {
            base: format!("http://{addr}"),
            hits,
        }
    }

    pub fn ok(body: Vec<u8>) -> Self {
        Self::start("200 OK", body, true)
    }

    pub fn url(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.base)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Zip archive holding a single executable shell script named `premake5`
pub fn premake_zip(script: &str) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o755);
    zip.start_file("premake5", options).unwrap();
    zip.write_all(script.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// Write an executable script
pub fn write_script(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    {
        let mut file = File::create(path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.sync_all().unwrap();
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// Home and project directories for one test
pub struct Workspace {
    pub root: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("scripts")).unwrap();
        fs::create_dir_all(root.path().join("project")).unwrap();
        Self { root }
    }

    pub fn home(&self) -> PathBuf {
        self.root.path().join("scripts")
    }

    pub fn project(&self) -> PathBuf {
        self.root.path().join("project")
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.path().join("test.log")
    }

    pub fn third_party(&self) -> PathBuf {
        self.home().join("third_party")
    }

    pub fn premake_exe(&self) -> PathBuf {
        self.third_party().join("premake").join("premake5")
    }

    pub fn read_log(&self) -> String {
        fs::read_to_string(self.log_path()).unwrap_or_default()
    }
}

/// Catalog with a single Linux entry pointing at `url`
pub fn linux_catalog(url: String) -> ToolCatalog {
    let mut catalog = ToolCatalog::default();
    catalog.insert(Platform::Linux, ToolSource::new(url, "premake5"));
    catalog
}

pub fn bootstrapper(config: Config) -> Bootstrapper {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    Bootstrapper::new(config, Reporter::plain())
        .unwrap()
        .with_http_client(client)
}

/// Every regular file below `dir`
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files
}
