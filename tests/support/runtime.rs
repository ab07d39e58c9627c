//! Tokio runtime and mock GitHub server shared by the steps of one scenario.

use std::future::Future;
use std::io;
use std::rc::Rc;

use rstest_bdd::Slot;
use tokio::runtime::Runtime;
use wiremock::MockServer;

/// Runtime handle kept in a scenario slot. Steps are synchronous, so every
/// async call goes through [`SharedRuntime::block_on`].
#[derive(Clone)]
pub struct SharedRuntime(Rc<Runtime>);

impl SharedRuntime {
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.0.block_on(future)
    }
}

fn runtime_in(slot: &Slot<SharedRuntime>) -> io::Result<SharedRuntime> {
    if let Some(existing) = slot.get() {
        return Ok(existing);
    }
    let started = SharedRuntime(Rc::new(Runtime::new()?));
    slot.set(started.clone());
    Ok(started)
}

/// Returns the scenario's runtime, starting it and the mock GitHub server
/// on first use.
///
/// # Errors
///
/// Returns an error if the Tokio runtime cannot be created.
pub fn ensure_runtime_and_server(
    runtime: &Slot<SharedRuntime>,
    server: &Slot<MockServer>,
) -> io::Result<SharedRuntime> {
    let shared = runtime_in(runtime)?;
    if server.with_ref(|_| ()).is_none() {
        server.set(shared.block_on(MockServer::start()));
    }
    Ok(shared)
}
