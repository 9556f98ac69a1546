#![allow(dead_code)]

pub mod test_server {
    use brrtfn::builtins::register_builtins;
    use brrtfn::function::FunctionRegistry;
    use brrtfn::invoker::Invoker;
    use brrtfn::metrics::InvocationMetrics;
    use brrtfn::server::{FunctionService, HttpServer, ServerHandle};
    use std::collections::HashMap;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::sync::{Arc, Once};
    use std::time::Duration;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x10000);
        });
    }

    /// Registry with the built-in functions and any extra entries.
    pub fn builtin_registry() -> FunctionRegistry {
        let registry = FunctionRegistry::new();
        register_builtins(&registry);
        registry
    }

    pub struct RunningService {
        pub handle: Option<ServerHandle>,
        pub addr: SocketAddr,
        pub metrics: Arc<InvocationMetrics>,
    }

    impl Drop for RunningService {
        fn drop(&mut self) {
            if let Some(handle) = self.handle.take() {
                handle.stop();
            }
        }
    }

    pub fn start_service(registry: FunctionRegistry) -> RunningService {
        setup_may_runtime();
        let metrics = Arc::new(InvocationMetrics::new());
        let service = FunctionService::new(Arc::new(registry), Invoker::default())
            .with_metrics(Arc::clone(&metrics));
        let handle = HttpServer(service).start("127.0.0.1:0").unwrap();
        handle.wait_ready().unwrap();
        let addr = handle.local_addr();
        RunningService {
            handle: Some(handle),
            addr,
            metrics,
        }
    }

    pub struct HttpReply {
        pub status: u16,
        pub headers: HashMap<String, String>,
        pub body: String,
    }

    impl HttpReply {
        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body).unwrap()
        }

        pub fn content_type(&self) -> &str {
            self.headers
                .get("content-type")
                .map(String::as_str)
                .unwrap_or("")
        }
    }

    pub fn send_request(addr: &SocketAddr, req: &str) -> HttpReply {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(2000)))
            .unwrap();
        let mut buf = Vec::new();
        loop {
            if let Some(reply) = try_parse(&buf) {
                return reply;
            }
            let mut tmp = [0u8; 4096];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        try_parse(&buf).unwrap_or_else(|| {
            panic!(
                "incomplete response: {:?}",
                String::from_utf8_lossy(&buf)
            )
        })
    }

    /// Parse a complete response once the body length is satisfied.
    fn try_parse(buf: &[u8]) -> Option<HttpReply> {
        let text = String::from_utf8_lossy(buf);
        let (head, body) = text.split_once("\r\n\r\n")?;
        let mut lines = head.lines();
        let status = lines.next()?.split_whitespace().nth(1)?.parse().ok()?;
        let headers: HashMap<String, String> = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();
        let length: usize = headers
            .get("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        if body.len() < length {
            return None;
        }
        Some(HttpReply {
            status,
            headers,
            body: body[..length].to_string(),
        })
    }

    pub fn get(addr: &SocketAddr, path: &str) -> HttpReply {
        send_request(
            addr,
            &format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n"),
        )
    }

    pub fn post(addr: &SocketAddr, path: &str, content_type: &str, body: &str) -> HttpReply {
        send_request(
            addr,
            &format!(
                "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n{body}",
                body.len()
            ),
        )
    }

    pub fn post_json(addr: &SocketAddr, path: &str, body: &str) -> HttpReply {
        post(addr, path, "application/json", body)
    }
}
