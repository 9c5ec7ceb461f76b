//! Identity provider seam. The real sign-in flow is an external
//! OAuth-style popup owned by the identity service; the app only
//! consumes the resulting principal and a "current principal changed"
//! subscription.

use anyhow::{Error, Result};
use async_trait::async_trait;
use tokio::sync::watch;

/// An opaque external principal. The id is the only field the app
/// relies on; it is passed to the gateway as the history key.
#[derive(Clone, Debug, PartialEq)]
pub struct Principal {
    pub id: String,
    pub display_name: Option<String>,
}

impl Principal {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: None,
        }
    }
}

#[async_trait]
pub trait IdentityProvider {
    async fn sign_in(&self) -> Result<Principal, Error>;
    async fn sign_out(&self) -> Result<(), Error>;
    /// Subscribe to changes of the current principal. Receives `None`
    /// after sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<Principal>>;
}

/// Identity provider backed by a fixed principal, used by the
/// terminal client where there is no browser popup to run a real
/// OAuth flow in.
pub struct StaticIdentity {
    principal: Principal,
    current: watch::Sender<Option<Principal>>,
}

impl StaticIdentity {
    pub fn new(principal: Principal) -> Self {
        let (current, _) = watch::channel(None);
        Self { principal, current }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn sign_in(&self) -> Result<Principal, Error> {
        self.current.send_replace(Some(self.principal.clone()));
        Ok(self.principal.clone())
    }

    async fn sign_out(&self) -> Result<(), Error> {
        self.current.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.current.subscribe()
    }
}
