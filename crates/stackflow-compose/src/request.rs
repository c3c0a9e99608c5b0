//! Build control-plane requests from declared stacks

use crate::error::{ComposeError, Result};
use stackflow_cloud::{StackRequest, TemplateBody};
use stackflow_core::{Stack, TemplateSource};

/// Read the template (for file sources) and copy the stack settings.
pub async fn build_request(stack: &Stack) -> Result<StackRequest> {
    let template = match stack.template_source() {
        Some(TemplateSource::Url(url)) => TemplateBody::Url(url.to_string()),
        Some(TemplateSource::File(path)) => {
            let body = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ComposeError::Template {
                    stack: stack.stack_name.clone(),
                    path: path.to_path_buf(),
                    source,
                })?;
            TemplateBody::Body(body)
        }
        None => {
            return Err(ComposeError::MissingTemplate {
                stack: stack.stack_name.clone(),
            });
        }
    };

    let mut request = StackRequest::new(&stack.stack_name, template);
    request.capabilities = stack.capabilities.clone();
    request.parameters = stack.parameters.clone();
    request.tags = stack.tags.clone();
    request.timeout_in_minutes = stack.timeout_in_minutes;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_template_is_inlined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vpc.yml");
        std::fs::write(&path, "Resources: {}\n").unwrap();

        let mut stack = Stack::new("dev-vpc")
            .with_template_file(&path)
            .with_parameter("Env", "dev")
            .with_tag("Team", "platform");
        stack.capabilities = vec!["CAPABILITY_IAM".into()];
        stack.timeout_in_minutes = Some(30);

        let request = build_request(&stack).await.unwrap();
        assert_eq!(request.stack_name, "dev-vpc");
        assert_eq!(request.template, TemplateBody::Body("Resources: {}\n".into()));
        assert_eq!(request.parameters["Env"], "dev");
        assert_eq!(request.tags["Team"], "platform");
        assert_eq!(request.capabilities, vec!["CAPABILITY_IAM".to_string()]);
        assert_eq!(request.timeout_in_minutes, Some(30));
    }

    #[tokio::test]
    async fn test_url_template_is_passed_through() {
        let stack = Stack::new("app").with_template_url("https://example.com/app.yml");
        let request = build_request(&stack).await.unwrap();
        assert_eq!(
            request.template,
            TemplateBody::Url("https://example.com/app.yml".into())
        );
    }

    #[tokio::test]
    async fn test_missing_template_file() {
        let stack = Stack::new("app").with_template_file("/no/such/template.yml");
        let err = build_request(&stack).await.unwrap_err();
        assert!(matches!(err, ComposeError::Template { ref stack, .. } if stack == "app"));
    }

    #[tokio::test]
    async fn test_no_template_source() {
        let err = build_request(&Stack::new("bare")).await.unwrap_err();
        assert!(matches!(err, ComposeError::MissingTemplate { .. }));
    }
}
