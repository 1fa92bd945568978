//! Command-line and environment configuration.
//!
//! Every flag can also be set through the environment variable named next to
//! it, which is how the daemon is usually configured in a cluster.

use std::net::{Ipv4Addr, SocketAddr};

use clap::Parser;
use fluxslack_core::{NotifierConfig, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_WORKLOAD_URI_TEMPLATE};

#[derive(Debug, Parser)]
#[command(name = "fluxslackd")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Forward Flux events to a Slack incoming webhook", long_about = None)]
pub struct Cli {
    /// Slack incoming-webhook URL
    #[arg(long, env = "SLACK_WEBHOOK_URL")]
    pub slack_webhook_url: String,

    /// Cluster name shown in sync notifications
    #[arg(long, env = "CLUSTER_NAME")]
    pub cluster_name: String,

    /// Root URL of the config repository
    #[arg(long, env = "VCS_ROOT_URL")]
    pub vcs_root_url: String,

    /// Channel override (default: the webhook's channel)
    #[arg(long, env = "SLACK_CHANNEL", default_value = "")]
    pub slack_channel: String,

    /// Display name override (default: the webhook's name)
    #[arg(long, env = "SLACK_USER_NAME", default_value = "")]
    pub slack_user_name: String,

    /// Text appended to every notification header
    #[arg(long, env = "MESSAGE_POSTFIX", default_value = "")]
    pub message_postfix: String,

    /// Link template for workloads, e.g. https://dash/#/{{.Kind}}/{{.Namespace}}/{{.Name}}
    #[arg(long, env = "WORKLOAD_URI_TEMPLATE", default_value = DEFAULT_WORKLOAD_URI_TEMPLATE)]
    pub workload_uri_template: String,

    /// Repository prefixes to strip from image names (comma-separated)
    #[arg(long, env = "OMITTED_REPOSITORY_URL", value_delimiter = ',')]
    pub omitted_repository_url: Vec<String>,

    /// Port the event receiver listens on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Upper bound on a single Slack call, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "LOG_JSON")]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn notifier_config(&self) -> NotifierConfig {
        NotifierConfig {
            webhook_url: self.slack_webhook_url.clone(),
            cluster_name: self.cluster_name.clone(),
            vcs_root_url: self.vcs_root_url.clone(),
            channel: self.slack_channel.clone(),
            username: self.slack_user_name.clone(),
            message_postfix: self.message_postfix.clone(),
            workload_uri_template: self.workload_uri_template.clone(),
            omitted_repository_urls: self
                .omitted_repository_url
                .iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_into_notifier_config() {
        let cli = Cli::try_parse_from([
            "fluxslackd",
            "--slack-webhook-url",
            "https://hooks.slack.test/services/x",
            "--cluster-name",
            "prod",
            "--vcs-root-url",
            "https://github.com/org/config",
            "--omitted-repository-url",
            "registry.example.com/, gcr.io/proj/",
            "--port",
            "9000",
            "--request-timeout-secs",
            "3",
        ])
        .unwrap();

        let config = cli.notifier_config();
        assert_eq!(config.cluster_name, "prod");
        assert_eq!(
            config.omitted_repository_urls,
            vec!["registry.example.com/", "gcr.io/proj/"]
        );
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(cli.listen_addr().port(), 9000);
    }
}
