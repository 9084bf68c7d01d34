use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub const ANON_KEY: &str = "test-anon-key";

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight backend stand-in for tests.
///
/// RPCs under `/rest/v1/rpc/` answer with canned JSON; OPTIONS requests
/// under `/functions/v1/` answer like a CORS-enabled function. Requests
/// without the expected `apikey` header get a 401.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_backend() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

/// Like [`spawn_backend`], but skips when sockets are not permitted.
///
/// # Errors
///
/// Returns an error if the server fails for any other reason.
pub fn spawn_backend_or_skip() -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_backend() {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

struct Request {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .ok()?;
    let mut data = Vec::new();
    let mut buffer = [0u8; 1024];
    let header_end = loop {
        let read = stream.read(&mut buffer).ok()?;
        if read == 0 {
            return None;
        }
        data.extend_from_slice(buffer.get(..read)?);
        if let Some(pos) = data.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(data.get(..header_end)?).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_owned();
    let target = request_line.next()?;
    let path = target.split('?').next().unwrap_or(target).to_owned();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .collect();

    let request = Request {
        method,
        path,
        headers,
    };
    let content_length: usize = request
        .header("content-length")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    let mut body_read = data.len().saturating_sub(header_end.saturating_add(4));
    while body_read < content_length {
        let read = stream.read(&mut buffer).ok()?;
        if read == 0 {
            break;
        }
        body_read = body_read.saturating_add(read);
    }
    Some(request)
}

fn stats_body() -> &'static str {
    r#"{"total_documents":10,"documents_this_month":3,"total_claims":4,"claims_this_month":1,"storage_used_bytes":2048,"limits":{"max_documents":100,"max_claims":50,"max_storage_bytes":1048576}}"#
}

fn route(request: &Request) -> (u16, &'static str, Vec<(&'static str, &'static str)>, String) {
    if request.method == "OPTIONS" {
        return match request.path.as_str() {
            "/functions/v1/process-document" => (
                204,
                "No Content",
                vec![
                    ("Access-Control-Allow-Origin", "*"),
                    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
                    (
                        "Access-Control-Allow-Headers",
                        "authorization, apikey, content-type",
                    ),
                ],
                String::new(),
            ),
            "/functions/v1/locked" => (
                204,
                "No Content",
                vec![("Access-Control-Allow-Origin", "https://other.example")],
                String::new(),
            ),
            _ => (404, "Not Found", Vec::new(), String::new()),
        };
    }

    if request.header("apikey") != Some(ANON_KEY) {
        return (
            401,
            "Unauthorized",
            Vec::new(),
            r#"{"message":"Invalid API key"}"#.to_owned(),
        );
    }

    match request.path.as_str() {
        "/rest/v1/rpc/get_usage_stats" | "/rest/v1/rpc/get_usage_stats_legacy" => {
            (200, "OK", Vec::new(), stats_body().to_owned())
        }
        "/rest/v1/rpc/get_recent_documents" => (
            200,
            "OK",
            Vec::new(),
            r#"[{"id":1},{"id":2}]"#.to_owned(),
        ),
        "/rest/v1/rpc/whoami" => (
            200,
            "OK",
            Vec::new(),
            format!(
                r#"{{"authorization":"{}"}}"#,
                request.header("authorization").unwrap_or_default()
            ),
        ),
        _ => (
            404,
            "Not Found",
            Vec::new(),
            format!(r#"{{"message":"Could not find {}"}}"#, request.path),
        ),
    }
}

fn handle_client(mut stream: TcpStream) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let (status, reason, headers, body) = route(&request);

    let mut response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        reason,
        body.len()
    );
    for (key, value) in headers {
        response.push_str(key);
        response.push_str(": ");
        response.push_str(value);
        response.push_str("\r\n");
    }
    response.push_str("\r\n");
    response.push_str(&body);

    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `edgeprobe` binary with a clean environment and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_edgeprobe<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = edgeprobe_bin()?;
    Command::new(bin)
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("EDGEPROBE_LOG")
        .env_remove("EDGEPROBE_BASE_URL")
        .env_remove("EDGEPROBE_ANON_KEY")
        .env_remove("EDGEPROBE_SESSION_TOKEN")
        .env_remove("NO_COLOR")
        .output()
        .map_err(|err| format!("run edgeprobe failed: {}", err))
}

fn edgeprobe_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_edgeprobe").map_or_else(
        || Err("CARGO_BIN_EXE_edgeprobe missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
