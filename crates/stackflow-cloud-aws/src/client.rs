//! CloudFormation implementation of [`StackClient`]

use crate::error::{AwsError, is_empty_change_set_reason};
use crate::link::change_set_link;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::operation::create_change_set::builders::CreateChangeSetFluentBuilder;
use aws_sdk_cloudformation::types::{Capability, ChangeSetType, Parameter, Tag};
use stackflow_cloud::{
    ChangeSetHandle, ClientError, Result, StackClient, StackRequest, StackStatus, TemplateBody,
    WaitConfig, poll_until,
};
use tracing::{debug, info, instrument};

const DEFAULT_REGION: &str = "us-east-1";

/// CloudFormation client
///
/// Cheap to clone; the SDK client is reference counted internally.
#[derive(Clone, Debug)]
pub struct CloudFormationClient {
    client: Client,
    region: String,
    wait: WaitConfig,
}

impl CloudFormationClient {
    /// Build from the standard AWS credential chain.
    ///
    /// `profile` and `region` override the environment when given.
    pub async fn from_env(profile: Option<&str>, region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }

        let sdk_config = loader.load().await;
        let region = match sdk_config.region() {
            Some(region) => region.to_string(),
            None => {
                tracing::warn!("No AWS region configured, using {}", DEFAULT_REGION);
                DEFAULT_REGION.to_string()
            }
        };

        let client = Client::from_conf(
            aws_sdk_cloudformation::config::Builder::from(&sdk_config)
                .region(Region::new(region.clone()))
                .build(),
        );

        info!(region = %region, profile = ?profile, "CloudFormation client ready");
        Self::from_client(client, region)
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
            wait: WaitConfig::default(),
        }
    }

    pub fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// CreateChangeSet for an update, nested stacks included in the preview
    fn change_set_call(
        &self,
        request: &StackRequest,
        change_set_name: &str,
    ) -> std::result::Result<CreateChangeSetFluentBuilder, AwsError> {
        let call = self
            .client
            .create_change_set()
            .stack_name(&request.stack_name)
            .change_set_name(change_set_name)
            .change_set_type(ChangeSetType::Update)
            .include_nested_stacks(true)
            .set_capabilities(Some(capabilities(request)))
            .set_parameters(Some(parameters(request)))
            .set_tags(Some(tags(request)?));
        Ok(match &request.template {
            TemplateBody::Body(body) => call.template_body(body),
            TemplateBody::Url(url) => call.template_url(url),
        })
    }

    /// `Ok(None)` when the stack does not exist
    async fn fetch_status(&self, stack_name: &str) -> Result<Option<(StackStatus, String)>> {
        let output = match self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return match ClientError::from(AwsError::from_sdk("DescribeStacks", e)) {
                    ClientError::NotFound => Ok(None),
                    other => Err(other),
                };
            }
        };

        let stack = output.stacks().first().ok_or_else(|| {
            ClientError::from(AwsError::UnexpectedResponse(format!(
                "DescribeStacks returned no stack for {stack_name}"
            )))
        })?;

        let status = stack
            .stack_status()
            .map(|s| StackStatus::from(s.as_str().to_string()))
            .ok_or_else(|| {
                ClientError::from(AwsError::UnexpectedResponse(format!(
                    "stack {stack_name} has no status"
                )))
            })?;
        let reason = stack.stack_status_reason().unwrap_or_default().to_string();

        Ok(Some((status, reason)))
    }

    /// Poll until the stack leaves its in-progress states and check where it landed.
    async fn wait_for_stack(&self, stack_name: &str, expected: &[StackStatus]) -> Result<()> {
        poll_until(stack_name, &self.wait, || async {
            let (status, reason) = match self.fetch_status(stack_name).await? {
                Some(found) => found,
                None if expected.contains(&StackStatus::DeleteComplete) => return Ok(Some(())),
                None => {
                    return Err(ClientError::fatal(format!(
                        "stack {stack_name} disappeared while waiting"
                    )));
                }
            };

            debug!(stack = %stack_name, status = %status, "Polled stack status");
            if status.is_in_progress() {
                return Ok(None);
            }
            if expected.contains(&status) {
                return Ok(Some(()));
            }
            Err(ClientError::fatal(format!(
                "stack {stack_name} ended in {status}: {reason}"
            )))
        })
        .await
    }
}

fn capabilities(request: &StackRequest) -> Vec<Capability> {
    request
        .capabilities
        .iter()
        .map(|c| Capability::from(c.as_str()))
        .collect()
}

fn parameters(request: &StackRequest) -> Vec<Parameter> {
    request
        .parameters
        .iter()
        .map(|(key, value)| {
            Parameter::builder()
                .parameter_key(key)
                .parameter_value(value)
                .build()
        })
        .collect()
}

fn tags(request: &StackRequest) -> std::result::Result<Vec<Tag>, AwsError> {
    request
        .tags
        .iter()
        .map(|(key, value)| {
            Ok(Tag::builder().key(key).value(value).build())
        })
        .collect()
}

fn timeout_in_minutes(request: &StackRequest) -> std::result::Result<Option<i32>, AwsError> {
    request
        .timeout_in_minutes
        .map(|t| {
            i32::try_from(t).map_err(|_| {
                AwsError::Build(format!(
                    "timeout of {t} minutes for stack {} is out of range",
                    request.stack_name
                ))
            })
        })
        .transpose()
}

#[async_trait]
impl StackClient for CloudFormationClient {
    async fn describe_status(&self, stack_name: &str) -> Result<StackStatus> {
        self.fetch_status(stack_name)
            .await?
            .map(|(status, _)| status)
            .ok_or(ClientError::NotFound)
    }

    #[instrument(skip_all, fields(stack = %request.stack_name))]
    async fn create_and_wait(&self, request: &StackRequest) -> Result<()> {
        let mut call = self
            .client
            .create_stack()
            .stack_name(&request.stack_name)
            .set_capabilities(Some(capabilities(request)))
            .set_parameters(Some(parameters(request)))
            .set_tags(Some(tags(request)?))
            .set_timeout_in_minutes(timeout_in_minutes(request)?);
        call = match &request.template {
            TemplateBody::Body(body) => call.template_body(body),
            TemplateBody::Url(url) => call.template_url(url),
        };

        let output = call
            .send()
            .await
            .map_err(|e| AwsError::from_sdk("CreateStack", e))?;
        debug!(stack_id = ?output.stack_id(), "CreateStack accepted");

        self.wait_for_stack(&request.stack_name, &[StackStatus::CreateComplete])
            .await
    }

    #[instrument(skip_all, fields(stack = %request.stack_name))]
    async fn update_and_wait(&self, request: &StackRequest) -> Result<()> {
        let mut call = self
            .client
            .update_stack()
            .stack_name(&request.stack_name)
            .set_capabilities(Some(capabilities(request)))
            .set_parameters(Some(parameters(request)))
            .set_tags(Some(tags(request)?));
        call = match &request.template {
            TemplateBody::Body(body) => call.template_body(body),
            TemplateBody::Url(url) => call.template_url(url),
        };

        call.send()
            .await
            .map_err(|e| AwsError::from_sdk("UpdateStack", e))?;

        self.wait_for_stack(&request.stack_name, &[StackStatus::UpdateComplete])
            .await
    }

    #[instrument(skip(self))]
    async fn delete_and_wait(&self, stack_name: &str) -> Result<()> {
        self.client
            .delete_stack()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk("DeleteStack", e))?;

        self.wait_for_stack(stack_name, &[StackStatus::DeleteComplete])
            .await
    }

    #[instrument(skip(self, request), fields(stack = %request.stack_name))]
    async fn create_change_set_and_wait(
        &self,
        request: &StackRequest,
        change_set_name: &str,
    ) -> Result<ChangeSetHandle> {
        let output = self
            .change_set_call(request, change_set_name)?
            .send()
            .await
            .map_err(|e| AwsError::from_sdk("CreateChangeSet", e))?;
        let id = output.id().unwrap_or(change_set_name).to_string();

        let stack_id = poll_until(&request.stack_name, &self.wait, || async {
            let described = self
                .client
                .describe_change_set()
                .stack_name(&request.stack_name)
                .change_set_name(&id)
                .send()
                .await
                .map_err(|e| AwsError::from_sdk("DescribeChangeSet", e))?;

            let status = described.status().map(|s| s.as_str()).unwrap_or_default();
            debug!(change_set = %change_set_name, status, "Polled change set status");
            match status {
                "CREATE_COMPLETE" => Ok(Some(described.stack_id().unwrap_or_default().to_string())),
                "FAILED" => {
                    let reason = described.status_reason().unwrap_or_default();
                    if is_empty_change_set_reason(reason) {
                        Err(ClientError::EmptyChangeSet)
                    } else {
                        Err(ClientError::fatal(format!(
                            "change set {change_set_name} failed: {reason}"
                        )))
                    }
                }
                _ => Ok(None),
            }
        })
        .await?;

        let link = change_set_link(&self.region, &stack_id, &id);
        Ok(ChangeSetHandle {
            stack_name: request.stack_name.clone(),
            change_set_name: change_set_name.to_string(),
            id,
            stack_id,
            link: Some(link),
        })
    }

    #[instrument(skip_all, fields(stack = %change_set.stack_name, change_set = %change_set.change_set_name))]
    async fn execute_change_set_and_wait(&self, change_set: &ChangeSetHandle) -> Result<()> {
        self.client
            .execute_change_set()
            .stack_name(&change_set.stack_name)
            .change_set_name(&change_set.id)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk("ExecuteChangeSet", e))?;

        self.wait_for_stack(
            &change_set.stack_name,
            &[StackStatus::UpdateComplete, StackStatus::CreateComplete],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StackRequest {
        StackRequest::new("web", TemplateBody::Url("https://templates.example/web.yml".into()))
    }

    #[test]
    fn test_timeout_in_minutes() {
        let mut request = request();
        assert_eq!(timeout_in_minutes(&request).unwrap(), None);

        request.timeout_in_minutes = Some(30);
        assert_eq!(timeout_in_minutes(&request).unwrap(), Some(30));

        request.timeout_in_minutes = Some(i32::MAX as u32);
        assert_eq!(timeout_in_minutes(&request).unwrap(), Some(i32::MAX));
    }

    #[test]
    fn test_timeout_above_i32_is_rejected() {
        let mut request = request();
        request.timeout_in_minutes = Some(u32::MAX);

        let err = timeout_in_minutes(&request).unwrap_err();
        assert!(matches!(&err, AwsError::Build(msg) if msg.contains("web")));
    }

    fn offline_client() -> CloudFormationClient {
        let config = aws_sdk_cloudformation::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .build();
        CloudFormationClient::from_client(Client::from_conf(config), "eu-west-1")
    }

    #[test]
    fn test_change_set_call_includes_nested_stacks() {
        let client = offline_client();
        assert_eq!(client.region(), "eu-west-1");

        let call = client.change_set_call(&request(), "web-1700000000").unwrap();
        assert_eq!(call.get_include_nested_stacks(), &Some(true));
        assert_eq!(call.get_change_set_type(), &Some(ChangeSetType::Update));
        assert_eq!(call.get_change_set_name().as_deref(), Some("web-1700000000"));
        assert_eq!(
            call.get_template_url().as_deref(),
            Some("https://templates.example/web.yml")
        );
    }

    #[test]
    fn test_request_conversions() {
        let mut request = request();
        request.capabilities = vec!["CAPABILITY_IAM".into()];
        request.parameters.insert("Env".into(), "dev".into());
        request.tags.insert("Team".into(), "platform".into());

        assert_eq!(capabilities(&request), vec![Capability::CapabilityIam]);
        let params = parameters(&request);
        assert_eq!(params[0].parameter_key(), Some("Env"));
        assert_eq!(params[0].parameter_value(), Some("dev"));
        let tags = tags(&request).unwrap();
        assert_eq!(tags[0].key(), "Team");
        assert_eq!(tags[0].value(), "platform");
    }
}
