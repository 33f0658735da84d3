//! Deployment records rendered into the specification header.

use serde::{Deserialize, Serialize};

/// Where the generated product will run, with the keys each target needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum DeploymentTarget {
    /// Deployed to remote client and server hosts.
    #[serde(rename_all = "camelCase")]
    Remote {
        /// Public URL of the client application.
        client_url: String,
        /// Administrator account name.
        admin_user: String,
        /// Administrator password.
        admin_password: String,
        /// Public URL of the backend server.
        server_url: String,
        /// WMS endpoint of the map server.
        wms_url: String,
        /// Port the backend listens on.
        server_port: u16,
    },
    /// Deployed on the local machine.
    #[serde(rename_all = "camelCase")]
    Local {
        /// Administrator account name.
        admin_user: String,
        /// Administrator password.
        admin_password: String,
        /// WMS endpoint of the local map server.
        local_wms_url: String,
    },
}

impl DeploymentTarget {
    /// Key/value pairs emitted in the deployment block, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Remote {
                client_url,
                admin_user,
                admin_password,
                server_url,
                wms_url,
                server_port,
            } => vec![
                ("client_url", client_url.clone()),
                ("admin_user", admin_user.clone()),
                ("admin_password", admin_password.clone()),
                ("server_url", server_url.clone()),
                ("wms_url", wms_url.clone()),
                ("server_port", server_port.to_string()),
            ],
            Self::Local {
                admin_user,
                admin_password,
                local_wms_url,
            } => vec![
                ("admin_user", admin_user.clone()),
                ("admin_password", admin_password.clone()),
                ("local_wms_url", local_wms_url.clone()),
            ],
        }
    }
}

impl Default for DeploymentTarget {
    fn default() -> Self {
        Self::Local {
            admin_user: "admin".to_owned(),
            admin_password: "admin".to_owned(),
            local_wms_url: "http://localhost:8080/geoserver/wms".to_owned(),
        }
    }
}
