//! Text rendering for target status
//!
//! `info` output is a zero-padding key/value table so that each row reads
//! `Key│value` (for example `Target│http://localhost:9393`). Keys are kept no
//! wider than `Target` so that pattern holds for every row.

use tabled::{
    builder::Builder,
    settings::{Padding, Style},
};

use crate::session::TargetSession;

/// Render the session as the `info` text block
pub fn render_info(session: &TargetSession) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Target", session.server_uri().as_str()]);
    builder.push_record(["Result", result_text(session).as_str()]);

    let options = session.options();
    if let Some(creds) = &options.credentials {
        builder.push_record(["User", creds.username()]);
    }
    if let Some(proxy) = &options.proxy {
        builder.push_record(["Proxy", proxy.uri.as_str()]);
    }
    if options.skip_ssl_validation {
        builder.push_record(["SSL", "certificate validation disabled"]);
    }

    let mut status = builder.build();
    status.with(Style::modern()).with(Padding::zero());

    let mut output = status.to_string();

    if session.is_connected() {
        output.push('\n');
        output.push_str(&render_links(session));
    }

    output
}

fn result_text(session: &TargetSession) -> String {
    match (session.last_error(), session.server_revision()) {
        (Some(error), _) => error.to_string(),
        (None, Some(revision)) => format!("Connected (API revision {})", revision),
        (None, None) => "Not targeted yet".to_string(),
    }
}

fn render_links(session: &TargetSession) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Relation", "Href"]);
    for (rel, href) in session.links() {
        builder.push_record([rel.as_str(), href.as_str()]);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TargetError;
    use crate::rest::{ConnectionOutcome, RootResource};
    use crate::session::{ConnectionOptions, Credentials, ProxyConfig, TargetUri};

    fn localhost() -> TargetUri {
        TargetUri::parse("http://localhost:9393").unwrap()
    }

    #[test]
    fn test_untargeted_session() {
        let text = render_info(&TargetSession::new(localhost()));
        assert!(text.contains("Target│http://localhost:9393"));
        assert!(text.contains("Result│Not targeted yet"));
        assert!(!text.contains("Relation"));
    }

    #[test]
    fn test_failed_session_shows_kind_and_message() {
        let mut session = TargetSession::default();
        session.update(
            &ConnectionOutcome::Failure(TargetError::connection("FooBar")),
            localhost(),
        );

        let text = render_info(&session);
        assert!(text.contains("Target│http://localhost:9393"));
        assert!(text.contains("ConnectionError: FooBar"));
        assert!(!text.contains("Relation"));
    }

    #[test]
    fn test_connected_session_lists_links() {
        let mut session = TargetSession::default();
        let root = RootResource::new(14)
            .with_link("dashboard", "http://localhost:9393/dashboard")
            .with_link("streams/definitions", "http://localhost:9393/streams/definitions");
        session.update(&ConnectionOutcome::Success(root), localhost());

        let text = render_info(&session);
        assert!(text.contains("Result│Connected (API revision 14)"));
        assert!(text.contains("dashboard"));
        assert!(text.contains("http://localhost:9393/streams/definitions"));
    }

    #[test]
    fn test_secrets_never_rendered() {
        let mut session = TargetSession::default();
        session.set_options(ConnectionOptions {
            credentials: Some(Credentials::new("admin", "s3cret")),
            proxy: Some(ProxyConfig::parse("http://proxy:3128", Some("pu"), Some("proxy-pw")).unwrap()),
            skip_ssl_validation: true,
        });
        session.update(
            &ConnectionOutcome::Failure(TargetError::connection("refused")),
            localhost(),
        );

        let text = render_info(&session);
        assert!(text.contains("Target│http://localhost:9393"));
        assert!(text.contains("admin"));
        assert!(text.contains("http://proxy:3128"));
        assert!(text.contains("certificate validation disabled"));
        assert!(!text.contains("s3cret"));
        assert!(!text.contains("proxy-pw"));
    }
}
