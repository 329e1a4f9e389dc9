// Link resource
//
// A connection between two node ports. Links are only ever built from a
// payload the caller already holds; nothing in the model fetches them.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Error;
use crate::models::{LinkEndpoint, LinkInfo, decode_record, expect_array};
use crate::transport::Transport;

#[derive(Clone)]
pub struct Link {
    api: Arc<dyn Transport>,
    info: LinkInfo,
}

impl Link {
    pub fn new(api: Arc<dyn Transport>, info: LinkInfo) -> Self {
        Self { api, info }
    }

    /// Build one link from a single JSON object.
    pub fn from_json(api: Arc<dyn Transport>, value: &Value) -> Result<Self, Error> {
        Ok(Self::new(api, decode_record(value)?))
    }

    /// Build one link per element of a JSON array, in order.
    pub fn from_json_list(api: &Arc<dyn Transport>, value: Value) -> Result<Vec<Self>, Error> {
        expect_array(value)?
            .iter()
            .map(|item| Self::from_json(Arc::clone(api), item))
            .collect()
    }

    pub fn info(&self) -> &LinkInfo {
        &self.info
    }

    pub fn id(&self) -> &str {
        &self.info.link_id
    }

    pub fn endpoints(&self) -> &[LinkEndpoint] {
        &self.info.nodes
    }

    pub fn api(&self) -> &Arc<dyn Transport> {
        &self.api
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
