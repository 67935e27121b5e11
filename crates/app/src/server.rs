//! HTTP transport: `POST /code` in front of the relay service.
//!
//! Each inbound request gets its own thread. The pipeline runs to
//! completion on that thread, the caller gets its status, and the relay
//! handoff (already dispatched by the service) proceeds on its own.
//!
//! # Randomness
//!
//! One seeded generator is shared by the process. A request locks it only
//! long enough to seed a private generator, so codec work never contends.

use hamming_relay_core::{Error, RelayService};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Read;
use std::sync::Arc;
use tiny_http::{Method, Request, Response, Server};

/// Route served by the relay.
pub const CODE_PATH: &str = "/code";

/// Status and body sent back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Map a pipeline outcome to a reply.
    ///
    /// Each outcome gets a distinct status: 200 on success (no body), 400
    /// for a bad body, 503 for simulated loss, 500 for an uncorrectable block.
    pub fn from_outcome(outcome: &Result<(), Error>) -> Self {
        match outcome {
            Ok(()) => Self::new(200, ""),
            Err(Error::MalformedInput(_)) => Self::new(400, "Invalid JSON format"),
            Err(Error::SimulatedLoss) => Self::new(503, "Packet lost"),
            Err(Error::Uncorrectable { .. }) => Self::new(500, "two errors detected"),
            Err(e @ Error::Relay(_)) => Self::new(500, e.to_string()),
        }
    }
}

/// State shared by all request threads.
pub struct AppState {
    service: RelayService,
    rng: Mutex<ChaCha8Rng>,
}

impl AppState {
    pub fn new(service: RelayService, seed: u64) -> Self {
        Self {
            service,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Seed a private generator for one request from the shared one.
    pub fn fork_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.rng.lock().gen())
    }

    /// Run one request body through the service.
    pub fn handle_body(&self, body: &[u8]) -> Reply {
        let outcome = self.service.handle(body, &mut self.fork_rng());
        Reply::from_outcome(&outcome)
    }

    /// Dispatch by method and path.
    pub fn route(&self, method: &Method, url: &str, body: &[u8]) -> Reply {
        let path = url.split('?').next().unwrap_or(url);
        if path != CODE_PATH {
            return Reply::new(404, "Not Found");
        }
        if *method != Method::Post {
            return Reply::new(405, "Method Not Allowed");
        }
        self.handle_body(body)
    }
}

/// Bind `listen` and serve until the listener fails.
pub fn serve(listen: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let server = Server::http(listen).map_err(|e| anyhow::anyhow!("failed to bind {listen}: {e}"))?;
    log::info!("SERVER STARTED on {listen}");

    for request in server.incoming_requests() {
        let state = Arc::clone(&state);
        std::thread::spawn(move || {
            if let Err(e) = respond(&state, request) {
                log::warn!("failed to answer request: {e}");
            }
        });
    }

    Ok(())
}

fn respond(state: &AppState, mut request: Request) -> std::io::Result<()> {
    let mut body = Vec::new();
    let read = request.as_reader().read_to_end(&mut body);
    let reply = match read {
        Ok(_) => state.route(request.method(), request.url(), &body),
        Err(e) => {
            log::info!("could not read request body: {e}");
            Reply::new(400, "Invalid JSON format")
        }
    };

    if reply.status != 200 {
        log::info!("{} {} -> {} {}", request.method(), request.url(), reply.status, reply.body);
    }
    request.respond(Response::from_string(reply.body).with_status_code(reply.status))
}
