use std::io::Write;

use sad_client::{EntityRecord, ProfilePermissions, ProjectPermissions, Response};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Serializable view of one [`Response`].
#[derive(Debug, Serialize)]
pub struct ResponseView {
    kind: &'static str,
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<EntityRecord<ProjectPermissions>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profiles: Option<Vec<EntityRecord<ProfilePermissions>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl From<&Response> for ResponseView {
    fn from(response: &Response) -> Self {
        let profiles = match response {
            Response::Profiles { profiles, .. } => {
                Some(profiles.iter().map(sad_client::Profile::snapshot).collect())
            }
            _ => None,
        };
        let content = matches!(response, Response::ProfileContent(_))
            .then(|| String::from_utf8_lossy(response.content()).into_owned());

        Self {
            kind: response.kind(),
            code: response.code(),
            auth_id: response.auth_id(),
            project: response.project().map(sad_client::Project::snapshot),
            profiles,
            num_bytes: response.num_bytes(),
            required: response.required_permission().map(|p| p.to_string()),
            content,
            reason: response.reason().map(|r| r.into_owned()),
        }
    }
}

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Print a call's outcome and turn a failure into an error.
///
/// In raw mode profile contents are written to stdout byte for byte.
pub fn report(response: &Response, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Raw && matches!(response, Response::ProfileContent(_)) {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(response.content())?;
        stdout.flush()?;
        return Ok(());
    }

    output(&ResponseView::from(response), format)?;
    if response.is_success() {
        Ok(())
    } else {
        anyhow::bail!("{response}: {}", response.reason().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sad_client::{RequiredPermission, Reply};
    use serde_json::json;

    use super::*;

    #[test]
    fn failure_view_carries_reason_and_permission() {
        let response = Response::InvalidPermission {
            reply: Reply::new(403, "nope"),
            required: RequiredPermission::Profile(ProfilePermissions::WRITE),
        };
        let value = serde_json::to_value(ResponseView::from(&response)).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "InvalidPermission",
                "code": 403,
                "required": "profile:WRITE",
                "reason": "nope"
            })
        );
    }

    #[test]
    fn success_view_skips_empty_fields() {
        let response = Response::RemainingSpace {
            reply: Reply::new(200, "12"),
            num_bytes: 12,
        };
        let rendered = render(&ResponseView::from(&response), OutputFormat::Raw).unwrap();
        assert_eq!(rendered, r#"{"kind":"RemainingSpace","code":200,"num_bytes":12}"#);
    }

    #[test]
    fn content_view_is_text() {
        let response = Response::ProfileContent(Reply::new(200, "line one\n"));
        let value = serde_json::to_value(ResponseView::from(&response)).unwrap();
        assert_eq!(value["content"], json!("line one\n"));
    }

    #[test]
    fn report_fails_on_refusal() {
        let response = Response::NotFound(Reply::new(404, "No such Project"));
        let err = report(&response, OutputFormat::Raw).unwrap_err();
        assert_eq!(err.to_string(), "<NotFound [404]>: No such Project");
    }
}
