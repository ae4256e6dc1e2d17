//! In-process HTTP server for exercising the remote clients.

use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use rouille::{Request, Response};

pub struct TestServer {
    pub base_url: String,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

/// Binds an ephemeral localhost port and serves `handler` until dropped.
pub fn serve<F>(handler: F) -> TestServer
where
    F: Fn(&Request) -> Response + Send + Sync + 'static,
{
    let server = rouille::Server::new("127.0.0.1:0", handler).expect("bind test server");
    let base_url = format!("http://{}", server.server_addr());
    let (handle, stop) = server.stoppable();
    TestServer {
        base_url,
        stop: Some(stop),
        handle: Some(handle),
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// An address nothing listens on.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";
