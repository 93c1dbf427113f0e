//! Blocking HTTP provider for the StatusCake v1 API.
//!
//! Reads are plain `GET`s returning JSON. Create and update share one `PUT`
//! form endpoint; an update carries the remote identifier as an extra form
//! parameter. Deletes are `DELETE` with the identifier in the query string.
//!
//! Every request carries the account credentials as the `Username` and
//! `API` headers. Neither is ever logged.

use crate::checks::CheckType;
use crate::config::{Endpoints, ProviderConfig};
use crate::error::{Error, Result};
use declarative::{Provider, ProviderResponse, RawResource};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// [`Provider`] backed by the StatusCake REST API, for one check type.
pub struct HttpProvider {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    config: ProviderConfig,
    check: CheckType,
}

impl HttpProvider {
    /// Create a provider for `check` with the configured timeout.
    #[must_use]
    pub fn new(config: ProviderConfig, check: CheckType) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build()
            .into();
        Self {
            agent,
            config,
            check,
        }
    }

    #[must_use]
    pub fn check(&self) -> CheckType {
        self.check
    }

    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn endpoints(&self) -> &'static Endpoints {
        self.check.endpoints()
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, id: Option<&str>) -> Result<T> {
        let url = self.config.url(path);
        log::debug!("GET {url}");

        let creds = self.config.credentials();
        let mut request = self
            .agent
            .get(&url)
            .header("Username", creds.username())
            .header("API", creds.api_key());
        if let Some(id) = id {
            request = request.query(self.endpoints().id_param, id);
        }
        Ok(request.call()?.body_mut().read_json()?)
    }

    fn put_form(&self, form: &[(&str, String)]) -> Result<ProviderResponse> {
        let url = self.config.url(self.endpoints().update);
        log::debug!("PUT {url} ({} form fields)", form.len());

        let creds = self.config.credentials();
        let response = self
            .agent
            .put(&url)
            .header("Username", creds.username())
            .header("API", creds.api_key())
            .send_form(form.iter().map(|(k, v)| (*k, v.as_str())))?
            .body_mut()
            .read_json()?;
        Ok(response)
    }

    fn send_delete(&self, id: &str) -> Result<ProviderResponse> {
        let endpoints = self.endpoints();
        let url = self.config.url(endpoints.delete);
        log::debug!("DELETE {url} ({}={id})", endpoints.id_param);

        let creds = self.config.credentials();
        let response = self
            .agent
            .delete(&url)
            .header("Username", creds.username())
            .header("API", creds.api_key())
            .query(endpoints.id_param, id)
            .call()?
            .body_mut()
            .read_json()?;
        Ok(response)
    }

    fn fetch_list(&self) -> Result<Vec<RawResource>> {
        let body: Value = self.get_json(self.endpoints().list, None)?;
        decode_listing(body)
    }

    fn fetch_detail(&self, id: &str) -> Result<RawResource> {
        match self.endpoints().detail {
            Some(path) => decode_object(self.get_json(path, Some(id))?),
            // No detail call: listing entries are complete.
            None => {
                let id_key = self.check.schema().id_key;
                self.fetch_list()?
                    .into_iter()
                    .find(|entry| entry.get(id_key).is_some_and(|v| id_matches(v, id)))
                    .ok_or_else(|| Error::http(format!("{} {id} not found", self.check), Some(404)))
            }
        }
    }
}

impl Provider for HttpProvider {
    fn list(&self) -> declarative::Result<Vec<RawResource>> {
        Ok(self.fetch_list()?)
    }

    fn get_detail(&self, id: &str) -> declarative::Result<RawResource> {
        Ok(self.fetch_detail(id)?)
    }

    fn create(&self, payload: &[(&'static str, String)]) -> declarative::Result<ProviderResponse> {
        Ok(self.put_form(payload)?)
    }

    fn update(
        &self,
        id: &str,
        payload: &[(&'static str, String)],
    ) -> declarative::Result<ProviderResponse> {
        Ok(self.put_form(&update_form(self.endpoints(), id, payload))?)
    }

    fn delete(&self, id: &str) -> declarative::Result<ProviderResponse> {
        Ok(self.send_delete(id)?)
    }
}

/// Update form: the payload minus keys the API rejects on update, plus the id.
fn update_form<'a>(
    endpoints: &'a Endpoints,
    id: &str,
    payload: &[(&'static str, String)],
) -> Vec<(&'a str, String)> {
    payload
        .iter()
        .filter(|(key, _)| !endpoints.update_omits.contains(key))
        .map(|(key, value)| (*key, value.clone()))
        .chain(std::iter::once((endpoints.id_param, id.to_string())))
        .collect()
}

/// A listing must be a JSON array of objects.
fn decode_listing(body: Value) -> Result<Vec<RawResource>> {
    let Value::Array(items) = body else {
        return Err(Error::InvalidResponse(format!(
            "expected a list of checks, got {}",
            kind_of(&body)
        )));
    };
    items.into_iter().map(decode_object).collect()
}

fn decode_object(body: Value) -> Result<RawResource> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidResponse(format!(
            "expected an object, got {}",
            kind_of(&other)
        ))),
    }
}

fn id_matches(value: &Value, id: &str) -> bool {
    match value {
        Value::String(s) => s == id,
        Value::Number(n) => n.to_string() == id,
        _ => false,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
