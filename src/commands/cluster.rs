// ABOUTME: Shared helper for reaching the Kubernetes cluster.
// ABOUTME: Builds the kubectl client and optionally refreshes the kubeconfig.

use kubeship::config::Config;
use kubeship::diagnostics::{Diagnostics, Warning};
use kubeship::error::{Error, Result};
use kubeship::output::Output;
use kubeship::tools::{AwsCli, Kubectl};

/// How commands reach the configured cluster.
pub struct ClusterAccess {
    kubectl: Kubectl,
    refresh: Option<KubeconfigRefresh>,
}

struct KubeconfigRefresh {
    aws: AwsCli,
    cluster: String,
    alias: Option<String>,
}

impl ClusterAccess {
    /// Validate the cluster settings without touching anything.
    pub fn from_config(config: &Config) -> Result<Self> {
        let refresh = if config.cluster.update_kubeconfig {
            let cluster = config.cluster.name.clone().ok_or_else(|| {
                Error::InvalidConfig(
                    "cluster.update_kubeconfig needs cluster.name (or EKS_CLUSTER_NAME)"
                        .to_string(),
                )
            })?;
            Some(KubeconfigRefresh {
                aws: AwsCli::new(config.registry.region.clone()),
                cluster,
                alias: config.cluster.context.clone(),
            })
        } else {
            None
        };

        Ok(Self {
            kubectl: Kubectl::new(config.cluster.context.clone()),
            refresh,
        })
    }

    pub fn kubectl(&self) -> &Kubectl {
        &self.kubectl
    }

    /// Refresh the kubeconfig entry when configured to.
    ///
    /// A failed refresh is a warning: the existing entry may still work.
    pub async fn refresh_kubeconfig(&self, output: &Output, diag: &mut Diagnostics) {
        let Some(ref refresh) = self.refresh else {
            return;
        };

        output.progress(&format!("Updating kubeconfig for {}...", refresh.cluster));
        if let Err(e) = refresh
            .aws
            .update_kubeconfig(&refresh.cluster, refresh.alias.as_deref())
            .await
        {
            diag.warn(Warning::kubeconfig_update(format!(
                "kubeconfig update for {} failed: {e}",
                refresh.cluster
            )));
        }
    }
}
