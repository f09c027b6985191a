//! Local mirror records and the payloads that create or change them.

use std::collections::BTreeMap;

use sad_core::{AuthId, EntityId, PermissionMap, PermissionSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::classify::Operation;
use crate::error::ClientError;

/// Field values of one project or profile, as last seen from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRecord<P> {
    pub id: EntityId,
    pub name: String,
    pub permissions: PermissionMap<P>,
}

impl<P: PermissionSet> EntityRecord<P> {
    /// Merge a successful edit: only the fields that were sent change.
    pub(crate) fn apply(&mut self, edit: &Edit<P>) {
        if let Some(name) = &edit.name {
            self.name.clone_from(name);
        }
        if let Some(permissions) = &edit.permissions {
            for (auth_id, perm) in permissions {
                self.permissions.insert(*auth_id, *perm);
            }
        }
    }
}

/// Entity as the service serializes it.
#[derive(Debug, Deserialize)]
#[serde(bound = "P: PermissionSet")]
pub(crate) struct EntityData<P> {
    id: String,
    name: String,
    #[serde(default)]
    permissions: Option<PermissionMap<P>>,
}

impl<P: PermissionSet> EntityData<P> {
    pub(crate) fn into_record(self) -> Result<EntityRecord<P>, ClientError> {
        Ok(EntityRecord {
            id: EntityId::decode(&self.id)?,
            name: self.name,
            permissions: self.permissions.unwrap_or_default(),
        })
    }
}

/// Changes to send with an edit call.
///
/// `None` fields are sent as `null` and left untouched locally; permission
/// entries are merged into the existing grants, not substituted for them.
/// Extra fields are forwarded to the service verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit<P> {
    pub name: Option<String>,
    pub permissions: Option<PermissionMap<P>>,
    pub extra: Map<String, Value>,
}

impl<P> Default for Edit<P> {
    fn default() -> Self {
        Self {
            name: None,
            permissions: None,
            extra: Map::new(),
        }
    }
}

impl<P: PermissionSet> Edit<P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn permission(mut self, auth_id: AuthId, perm: P) -> Self {
        self.permissions
            .get_or_insert_with(BTreeMap::new)
            .insert(auth_id, perm);
        self
    }

    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub(crate) fn fields_json(&self, operation: Operation) -> Result<String, ClientError> {
        let mut fields = self.extra.clone();
        fields.insert(
            "name".into(),
            self.name.clone().map_or(Value::Null, Value::String),
        );
        fields.insert(
            "permissions".into(),
            permissions_value(self.permissions.as_ref(), operation)?,
        );
        Ok(Value::Object(fields).to_string())
    }
}

/// `fields` payload for registering a project or adding a profile.
pub(crate) fn creation_fields<P: PermissionSet>(
    permissions: Option<&PermissionMap<P>>,
    extra: &Map<String, Value>,
    operation: Operation,
) -> Result<String, ClientError> {
    let mut fields = extra.clone();
    fields.insert(
        "permissions".into(),
        permissions_value(permissions, operation)?,
    );
    Ok(Value::Object(fields).to_string())
}

fn permissions_value<P: PermissionSet>(
    permissions: Option<&PermissionMap<P>>,
    operation: Operation,
) -> Result<Value, ClientError> {
    permissions.map_or(Ok(Value::Null), |map| {
        serde_json::to_value(map).map_err(|e| ClientError::MalformedPayload {
            operation,
            reason: e.to_string(),
        })
    })
}
