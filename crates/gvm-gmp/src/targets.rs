// GMP target operations

use tracing::debug;

use crate::client::GmpClient;
use crate::error::Error;
use crate::models::{Target, created_id, map_all, map_first};
use crate::transport::Socket;
use crate::xml::{Document, Element, Params, params};

impl<S: Socket> GmpClient<S> {
    /// Create a scan target and return its id.
    ///
    /// `params` become text children of `<create_target>`, typically
    /// `name`, `hosts` and `comment`.
    pub fn target_create(&mut self, params: &Params) -> Result<String, Error> {
        let element = Element::with_children("create_target", params);
        let doc = self.command(&element)?;
        created_id(&doc, &element)
    }

    /// `<delete_target target_id="..."/>`
    pub fn target_delete(&mut self, id: &str) -> Result<Document, Error> {
        debug!(target_id = id, "deleting target");
        self.command_with_attributes("delete_target", &params([("target_id", id)]))
    }

    /// `<get_targets .../>` with `params` as attributes, unprocessed.
    pub fn target_get_raw(&mut self, params: &Params) -> Result<Document, Error> {
        self.command_with_attributes("get_targets", params)
    }

    /// All targets matching `params`, in response order.
    pub fn target_get_all(&mut self, params: &Params) -> Result<Vec<Target>, Error> {
        let doc = self.target_get_raw(params)?;
        map_all(&doc, "get_targets_response/target")
    }

    /// The target with the given id, or `None` if gvmd returns none.
    pub fn target_get_byid(&mut self, id: &str) -> Result<Option<Target>, Error> {
        let doc = self.target_get_raw(&params([("target_id", id)]))?;
        map_first(&doc, "get_targets_response/target")
    }
}
