use std::sync::Arc;

use log::{info, warn};
use tokio::task::JoinHandle;

use crate::configuration::config::Config;
use crate::error_handling::types::*;
use crate::session_management::spawn_sweeper;
use crate::storage::demo_accounts::{seed_demo_accounts, DEMO_PASSWORD};
use crate::storage::{MemStorage, Storage};
use crate::web_interface::auth::hash_credential;
use crate::web_interface::WebServer;

/// Owns the process-wide store and the background tasks around it.
///
/// The store is built once here and handed to every consumer as an
/// `Arc<dyn Storage>`.
pub struct Controller {
    pub config: Config,
    storage: Arc<dyn Storage>,
    sweeper: Option<JoinHandle<()>>,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        config.validate()?;
        let storage: Arc<dyn Storage> = Arc::new(MemStorage::new(
            config.check_period(),
            config.session_max_age()?,
        ));

        if config.storage.seed_demo_accounts {
            let credential = hash_credential(DEMO_PASSWORD).map_err(ControllerError::WebError)?;
            seed_demo_accounts(storage.as_ref(), &credential)?;
        }

        Ok(Self {
            config,
            storage,
            sweeper: None,
        })
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        Arc::clone(&self.storage)
    }

    /// Starts the stale-session sweeper. Needs a running tokio runtime.
    pub fn start_sweeper(&mut self) {
        if self.sweeper.is_some() {
            warn!("Session sweeper already running");
            return;
        }
        self.sweeper = Some(spawn_sweeper(self.storage.session_store()));
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper.is_some()
    }

    /// Serves the API until Ctrl-C, then shuts down.
    pub async fn run(&mut self) -> Result<(), ControllerError> {
        let addr = self.config.socket_addr()?;
        self.start_sweeper();

        let server = WebServer::new(self.storage());
        server
            .start(addr, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Unable to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            })
            .await;

        self.shutdown();
        Ok(())
    }

    pub fn shutdown(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
        info!("Controller shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::account_filter::by_role;
    use crate::storage::types::Role;

    #[test]
    fn test_new_without_seed() {
        let controller = Controller::new(Config::default()).unwrap();
        assert!(controller.storage().list_accounts(None).is_empty());
        assert!(!controller.is_sweeping());
    }

    #[test]
    fn test_new_with_seed() {
        let mut config = Config::default();
        config.storage.seed_demo_accounts = true;
        let controller = Controller::new(config).unwrap();
        let storage = controller.storage();
        assert_eq!(storage.list_accounts(None).len(), 5);
        assert_eq!(storage.list_accounts(Some(by_role(Role::Investor))).len(), 3);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(
            Controller::new(config),
            Err(ControllerError::ConfigurationError(ConfigError::BadPort(_)))
        ));
    }

    #[tokio::test]
    async fn test_sweeper_lifecycle() {
        let mut controller = Controller::new(Config::default()).unwrap();
        controller.start_sweeper();
        assert!(controller.is_sweeping());
        controller.start_sweeper();
        controller.shutdown();
        assert!(!controller.is_sweeping());
    }
}
