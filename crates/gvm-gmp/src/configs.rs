// GMP scan config operations

use indexmap::IndexMap;

use crate::client::GmpClient;
use crate::error::Error;
use crate::models::{Config, created_id, map_all};
use crate::transport::Socket;
use crate::xml::{Document, Element, Params, params};

const CONFIG_PATH: &str = "get_configs_response/config";

impl<S: Socket> GmpClient<S> {
    /// `<get_configs .../>` with `params` as attributes, unprocessed.
    pub fn config_get_raw(&mut self, params: &Params) -> Result<Document, Error> {
        self.command_with_attributes("get_configs", params)
    }

    /// All configs matching `params`, in response order.
    pub fn config_get_all(&mut self, params: &Params) -> Result<Vec<Config>, Error> {
        let doc = self.config_get_raw(params)?;
        map_all(&doc, CONFIG_PATH)
    }

    /// Config names keyed by id, in response order.
    pub fn config_get(&mut self, params: &Params) -> Result<IndexMap<String, String>, Error> {
        Ok(self
            .config_get_all(params)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect())
    }

    /// Id of the first config named exactly `name`.
    pub fn config_id_by_name(&mut self, name: &str) -> Result<Option<String>, Error> {
        Ok(self
            .config_get_all(&Params::new())?
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.id))
    }

    /// Copy config `id` under a new name and return the new id.
    pub fn config_copy(&mut self, id: &str, name: &str) -> Result<String, Error> {
        self.config_create_with(&params([("copy", id), ("name", name)]))
    }

    /// Create a config from a base64-encoded rc file and return its id.
    pub fn config_create(&mut self, name: &str, rcfile: &str) -> Result<String, Error> {
        self.config_create_with(&params([("name", name), ("rcfile", rcfile)]))
    }

    fn config_create_with(&mut self, attrs: &Params) -> Result<String, Error> {
        let element = Element::with_attributes("create_config", attrs);
        let doc = self.command(&element)?;
        created_id(&doc, &element)
    }
}
