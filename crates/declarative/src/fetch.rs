//! Read-only access to remote state

use crate::error::{Error, Result};
use crate::normalize::{RawResource, remote_identity, scalar_text};
use crate::provider::Provider;
use crate::schema::Schema;

/// A listing entry matched by identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Found {
    /// Provider identifier of the entry.
    pub id: String,
    /// The listing entry itself (possibly partial).
    pub entry: RawResource,
}

/// Looks resources up through a [`Provider`] without ever mutating them.
pub struct Fetcher<'a> {
    schema: &'static Schema,
    provider: &'a dyn Provider,
}

impl<'a> Fetcher<'a> {
    pub fn new(schema: &'static Schema, provider: &'a dyn Provider) -> Self {
        Self { schema, provider }
    }

    /// Full listing.
    pub fn list_all(&self) -> Result<Vec<RawResource>> {
        self.provider.list()
    }

    /// First listing entry whose identity equals `identity` exactly.
    ///
    /// Matching is case-sensitive. Duplicate identities upstream are not
    /// detected: the first one in listing order wins.
    ///
    /// # Errors
    ///
    /// Propagates provider failures; a matched entry without the identifier
    /// key is an `Error::InvalidResponse`.
    pub fn find_by_name(&self, identity: &str) -> Result<Option<Found>> {
        let listing = self.provider.list()?;
        log::debug!(
            "Scanning {} {} entries for '{}'",
            listing.len(),
            self.schema.resource,
            identity
        );

        let Some(entry) = listing
            .into_iter()
            .find(|raw| remote_identity(self.schema, raw).as_deref() == Some(identity))
        else {
            return Ok(None);
        };

        let id = entry
            .get(self.schema.id_key)
            .map(scalar_text)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                Error::InvalidResponse(format!(
                    "{} '{}' has no '{}' in the listing",
                    self.schema.resource, identity, self.schema.id_key
                ))
            })?;

        Ok(Some(Found { id, entry }))
    }

    /// Full detail of a found resource.
    pub fn detail(&self, id: &str) -> Result<RawResource> {
        self.provider.get_detail(id)
    }
}
