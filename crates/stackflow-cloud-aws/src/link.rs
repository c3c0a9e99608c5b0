//! Console links

use url::form_urlencoded::byte_serialize;

/// Console page for reviewing a change set
pub fn change_set_link(region: &str, stack_id: &str, change_set_id: &str) -> String {
    format!(
        "https://{region}.console.aws.amazon.com/cloudformation/home?region={region}#/stacks/changesets/changes?stackId={}&changeSetId={}",
        encode(stack_id),
        encode(change_set_id)
    )
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
