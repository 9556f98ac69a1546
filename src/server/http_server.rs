use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Default readiness timeout used by [`ServerHandle::wait_ready`]
pub const READY_TIMEOUT: Duration = Duration::from_millis(500);

/// Wrapper around may_minihttp's HTTP server.
///
/// Accepts up to 32 request headers so traffic relayed through gateways and
/// proxies is not rejected.
pub struct HttpServer<T>(pub T);

/// Handle to a running HTTP server.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to (resolved, so port 0 is never returned
    /// when [`HttpServer::start`] picked a free port).
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll the listen address until a TCP connection succeeds.
    ///
    /// # Errors
    ///
    /// `TimedOut` if nothing accepts within [`READY_TIMEOUT`].
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_for(READY_TIMEOUT)
    }

    /// [`wait_ready`](Self::wait_ready) with an explicit timeout.
    ///
    /// # Errors
    ///
    /// `TimedOut` if nothing accepts within `timeout`.
    pub fn wait_ready_for(&self, timeout: Duration) -> io::Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Cancel the server coroutine and wait for it to finish.
    pub fn stop(self) {
        // SAFETY: cancel() is marked unsafe by the may runtime. The handle is
        // owned here and cancellation is the intended way to end the accept loop.
        unsafe {
            self.handle.coroutine().cancel();
        }
        if self.handle.join().is_err() {
            warn!(addr = %self.addr, "Server coroutine ended with a panic");
        } else {
            info!(addr = %self.addr, "Server stopped");
        }
    }

    /// Block until the server coroutine finishes.
    ///
    /// # Errors
    ///
    /// The server coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Start serving on `addr`. Port `0` picks a free port, which is then
    /// reported by [`ServerHandle::local_addr`].
    ///
    /// # Errors
    ///
    /// The address is invalid or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let mut addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        if addr.port() == 0 {
            // reserve a concrete port so callers can reach the server
            addr = TcpListener::bind(addr)?.local_addr()?;
        }
        let handle = HttpServerWithHeaders::<_, 32>(self.0).start(addr)?;
        info!(addr = %addr, "HTTP server listening");
        Ok(ServerHandle { addr, handle })
    }
}
