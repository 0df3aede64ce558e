//! Client for the administrative role-update function
//!
//! The function itself runs server-side and only accepts callers whose token
//! claims `role = admin`; this module sends `{ userId, newRole }` through the
//! authenticated pipeline and decodes the result.

use crate::auth::AuthPipeline;
use crate::client::ProtectedRequest;
use crate::error::{PortalError, Result};
use crate::session::Role;
use serde::{Deserialize, Serialize};

/// Request body of the role-update function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdate {
    /// User whose role changes
    pub user_id: String,
    /// Role to assign
    pub new_role: Role,
}

/// Identity returned after a successful update
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdatedIdentity {
    /// User id
    #[serde(alias = "uuid")]
    pub id: String,
    /// Email address, when returned
    #[serde(default)]
    pub email: Option<String>,
    /// Role now assigned, when returned
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Wrapped { user: UpdatedIdentity },
    Bare(UpdatedIdentity),
}

/// Assign `new_role` to `user_id` through the function at `path`.
///
/// # Errors
///
/// [`PortalError::InvalidArgument`] for an empty user id; otherwise the
/// pipeline's errors, where 400/403/500 from the function arrive as
/// [`PortalError::Api`] carrying the function's `error` message.
pub async fn update_user_role(
    pipeline: &AuthPipeline,
    path: &str,
    user_id: &str,
    new_role: Role,
) -> Result<UpdatedIdentity> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(PortalError::InvalidArgument("user id cannot be empty".to_string()));
    }

    let body = RoleUpdate {
        user_id: user_id.to_string(),
        new_role,
    };
    let response = pipeline
        .execute(ProtectedRequest::post(path).json(&body)?)
        .await?;

    let identity = match response.json::<Envelope>()? {
        Envelope::Wrapped { user } | Envelope::Bare(user) => user,
    };
    tracing::info!(user = %identity.id, role = %new_role, "role updated");
    Ok(identity)
}
