//! Turns Flux events into Slack messages.
//!
//! Composition is a pure function of the event and the configuration: the
//! same event always yields the same message, and every event (including
//! kinds this crate has never heard of) yields one.

use crate::config::NotifierConfig;
use crate::domain::{short_revision, Event, EventPayload, ReleaseMetadata, SyncMetadata};
use crate::error::TemplateError;
use crate::message::{Block, Message};
use crate::uri::{render_commit_uri, UriTemplate};

/// Shown when an automatic release reports no changed image.
pub const NO_IMAGE_PLACEHOLDER: &str = "<no image>";

pub const COMMITS_HEADING: &str = "Commits";
pub const AFFECTED_WORKLOADS_HEADING: &str = "Affected Workloads";

/// Message composer. Immutable once built; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct Composer {
    cluster_name: String,
    vcs_root_url: String,
    message_postfix: String,
    channel: String,
    username: String,
    omitted_repository_urls: Vec<String>,
    workload_uri: UriTemplate,
}

impl Composer {
    /// Build a composer, compiling the workload URI template.
    pub fn new(config: &NotifierConfig) -> Result<Self, TemplateError> {
        let workload_uri = UriTemplate::parse(&config.workload_uri_template)?;

        Ok(Self {
            cluster_name: config.cluster_name.clone(),
            vcs_root_url: config.vcs_root_url.clone(),
            message_postfix: config.message_postfix.clone(),
            channel: config.channel.clone(),
            username: config.username.clone(),
            omitted_repository_urls: config.omitted_repository_urls.clone(),
            workload_uri,
        })
    }

    pub fn compose(&self, event: &Event) -> Message {
        let mut blocks = match &event.payload {
            EventPayload::AutoRelease(metadata) => self.auto_release_blocks(metadata),
            EventPayload::Sync(metadata) => self.sync_blocks(metadata),
            _ => vec![self.header(&event.to_string())],
        };

        blocks.extend(Block::heading(AFFECTED_WORKLOADS_HEADING));
        // Slack rejects an empty section text.
        if !event.resource_ids.is_empty() {
            blocks.push(Block::text(self.affected_workloads(event)));
        }

        Message {
            channel: self.channel.clone(),
            username: self.username.clone(),
            blocks,
        }
    }

    fn auto_release_blocks(&self, metadata: &ReleaseMetadata) -> Vec<Block> {
        let mut images = metadata.result.changed_images();
        if images.is_empty() {
            images.push(NO_IMAGE_PLACEHOLDER.to_string());
        }

        let images: Vec<String> = images
            .iter()
            .map(|image| self.shorten_image(image))
            .collect();

        vec![self.header(&format!(
            "Automatically released {}",
            images.join(", ")
        ))]
    }

    fn sync_blocks(&self, metadata: &SyncMetadata) -> Vec<Block> {
        let mut blocks = vec![self.header(&format!(
            "Synced {} commits to {}",
            metadata.commits.len(),
            self.cluster_name
        ))];

        if !metadata.commits.is_empty() {
            let lines: Vec<String> = metadata
                .commits
                .iter()
                .map(|commit| {
                    format!(
                        "•  `<{}|{}>` - {}",
                        render_commit_uri(&self.vcs_root_url, &commit.revision),
                        short_revision(&commit.revision),
                        commit.message
                    )
                })
                .collect();

            blocks.extend(Block::heading(COMMITS_HEADING));
            blocks.push(Block::text(lines.join("\n")));
        }

        blocks
    }

    fn affected_workloads(&self, event: &Event) -> String {
        event
            .resource_ids
            .iter()
            .map(|id| {
                format!(
                    "•  <{}|{}/{}> in _{}_",
                    self.workload_uri.render_resource_uri(id),
                    id.kind,
                    id.name,
                    id.namespace
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn header(&self, text: &str) -> Block {
        Block::text(format!(
            "*<{}|{}{}>*",
            self.vcs_root_url, text, self.message_postfix
        ))
    }

    /// Strip the first configured repository prefix found in the image.
    fn shorten_image(&self, image: &str) -> String {
        self.omitted_repository_urls
            .iter()
            .filter(|repo| !repo.is_empty())
            .find(|repo| image.contains(repo.as_str()))
            .map_or_else(|| image.to_string(), |repo| image.replace(repo.as_str(), ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Commit, ResourceId};

    fn composer(config: NotifierConfig) -> Composer {
        Composer::new(&config).unwrap()
    }

    fn base_config() -> NotifierConfig {
        NotifierConfig::new(
            "https://hooks.slack.test/services/x",
            "prod-eu",
            "https://github.com/org/config",
        )
    }

    #[test]
    fn test_header_wraps_text_in_vcs_link() {
        let c = composer(base_config().with_message_postfix(" (eu)"));
        let block = c.header("hello");
        assert_eq!(
            block.markdown(),
            Some("*<https://github.com/org/config|hello (eu)>*")
        );
    }

    #[test]
    fn test_shorten_image_first_match_wins() {
        let c = composer(base_config().with_omitted_repository_urls([
            "",
            "registry.example.com/",
            "registry.example.com/team/",
        ]));
        assert_eq!(
            c.shorten_image("registry.example.com/team/api:v2"),
            "team/api:v2"
        );
        assert_eq!(c.shorten_image("docker.io/nginx:1"), "docker.io/nginx:1");
    }

    #[test]
    fn test_invalid_template_fails_construction() {
        let config = base_config().with_workload_uri_template("https://dash/{{.Name");
        assert!(Composer::new(&config).is_err());
    }

    #[test]
    fn test_sync_commit_lines() {
        let c = composer(base_config());
        let metadata = SyncMetadata {
            commits: vec![
                Commit {
                    revision: "abcdef1234567890".to_string(),
                    message: "bump api".to_string(),
                },
                Commit {
                    revision: "abc".to_string(),
                    message: "tiny".to_string(),
                },
            ],
        };

        let blocks = c.sync_blocks(&metadata);
        assert_eq!(blocks.len(), 4);
        assert_eq!(
            blocks[3].markdown(),
            Some(
                "•  `<https://github.com/org/config/commit/abcdef1234567890|abcdef1>` - bump api\n\
                 •  `<https://github.com/org/config/commit/abc|abc>` - tiny"
            )
        );
    }

    #[test]
    fn test_workload_lines() {
        let c = composer(base_config().with_workload_uri_template("https://dash/{{.Namespace}}/{{.Name}}"));
        let event = Event::new(
            vec![
                ResourceId::new("default", "deployment", "web"),
                ResourceId::new("jobs", "cronjob", "nightly"),
            ],
            EventPayload::Other {
                kind: "lock".to_string(),
            },
        );
        assert_eq!(
            c.affected_workloads(&event),
            "•  <https://dash/default/web|deployment/web> in _default_\n\
             •  <https://dash/jobs/nightly|cronjob/nightly> in _jobs_"
        );
    }
}
