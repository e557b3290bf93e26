// GMP system queries that need no login.

use crate::client::GmpClient;
use crate::error::Error;
use crate::transport::Socket;
use crate::xml::Element;

impl<S: Socket> GmpClient<S> {
    /// Protocol version reported by gvmd. Sent without authentication.
    pub fn version_get(&mut self) -> Result<String, Error> {
        let request = Element::new("get_version").to_xml();
        let doc = self.request_unauthenticated(&request)?;
        doc.find("get_version_response/version")
            .and_then(|n| n.text())
            .map(|v| v.trim().to_owned())
            .ok_or_else(|| Error::XmlParsing {
                message: "missing <get_version_response>/<version>".into(),
                body: doc.to_xml(),
            })
    }
}
