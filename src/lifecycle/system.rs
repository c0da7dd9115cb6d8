use crate::config::ControlPlaneConfig;
use crate::control_plane::{ControlPlaneActor, ControlPlaneClient};
use crate::error::SystemError;
use reconcile_framework::Reconciler;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Runs an in-memory control plane and a [`Reconciler`] connected to it.
///
/// # Lifecycle
///
/// 1. [`start`](Self::start) validates the configuration and spawns the control plane actor.
/// 2. The reconciler loads the metadata catalog once through the heartbeat.
/// 3. [`shutdown`](Self::shutdown) drops the reconciler, which closes the channel, and waits
///    for the actor task to finish.
///
/// # Example
///
/// ```ignore
/// let system = ReconcileSystem::start(ControlPlaneConfig::default()).await?;
///
/// let observed = system.reconciler.create(&declared).await?;
///
/// system.shutdown().await?;
/// ```
pub struct ReconcileSystem {
    /// Clone freely; every clone keeps the control plane alive until dropped.
    pub reconciler: Reconciler<ControlPlaneClient>,

    handle: JoinHandle<()>,
}

impl ReconcileSystem {
    pub async fn start(config: ControlPlaneConfig) -> Result<Self, SystemError> {
        config.validate()?;

        let (actor, client) = ControlPlaneActor::new(config);
        let handle = tokio::spawn(actor.run());

        let reconciler = match Reconciler::connect(client).await {
            Ok(reconciler) => reconciler,
            Err(e) => {
                error!(error = %e, "Unable to load the metadata catalog");
                handle.abort();
                return Err(e.into());
            }
        };
        info!(
            product = %reconciler.catalog().server().product,
            types = reconciler.catalog().entries().len(),
            "System started"
        );

        Ok(Self { reconciler, handle })
    }

    /// Stops the control plane once every clone of the reconciler is gone.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        // The actor exits when the last sender is dropped.
        drop(self.reconciler);

        if let Err(e) = self.handle.await {
            error!("Control plane task failed: {:?}", e);
            return Err(e.into());
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
