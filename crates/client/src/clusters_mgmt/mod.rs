//! Typed entry points of the clusters management service.

mod model;

pub use model::{
    CloudRegion, Cluster, ClusterApi, ClusterNodes, ClusterState, ClusterStatus, Version,
};

use crate::client::{CollectionClient, ResourceClient};
use crate::connection::Connection;

/// Root path of version 1 of the service.
pub const V1_PATH: &str = "/api/clusters_mgmt/v1";

#[derive(Debug, Clone)]
pub struct ClustersMgmtClient {
    conn: Connection,
}

impl ClustersMgmtClient {
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn v1(&self) -> ClustersMgmtV1 {
        ClustersMgmtV1 {
            conn: self.conn.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClustersMgmtV1 {
    conn: Connection,
}

impl ClustersMgmtV1 {
    pub fn clusters(&self) -> CollectionClient<Cluster> {
        CollectionClient::new(self.conn.clone(), format!("{V1_PATH}/clusters"))
    }

    pub fn versions(&self) -> CollectionClient<Version> {
        CollectionClient::new(self.conn.clone(), format!("{V1_PATH}/versions"))
    }
}

impl CollectionClient<Cluster> {
    pub fn cluster(&self, id: &str) -> ResourceClient<Cluster> {
        self.item(id)
    }
}

impl ResourceClient<Cluster> {
    pub fn status(&self) -> ResourceClient<ClusterStatus> {
        self.child("status")
    }
}

impl CollectionClient<Version> {
    pub fn version(&self, id: &str) -> ResourceClient<Version> {
        self.item(id)
    }
}
