//! Notification email templates
//!
//! Each template has a subject, a plain text body and an HTML body. The HTML
//! variant is autoescaped; variables missing from the context are errors.

use crate::error::NotifyError;
use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};

const STREAM_ACTIVE_SUBJECT: &str = "🔴 {{ title }} is live";
const STREAM_ACTIVE_TEXT: &str =
    "The live event \"{{ title }}\" is now broadcasting (stream {{ stream_id }}).";
const STREAM_ACTIVE_HTML: &str = r#"<!DOCTYPE html>
<html><body>
<p>The live event <strong>{{ title }}</strong> is now broadcasting (stream <code>{{ stream_id }}</code>).</p>
</body></html>"#;

const STREAM_DISCONNECTED_SUBJECT: &str = "⚠️ {{ title }} disconnected";
const STREAM_DISCONNECTED_TEXT: &str = "The encoder for \"{{ title }}\" (stream {{ stream_id }}) \
disconnected. The stream will stay open for {{ reconnect_window }} seconds waiting for it to \
reconnect before going idle.";
const STREAM_DISCONNECTED_HTML: &str = r#"<!DOCTYPE html>
<html><body>
<p>The encoder for <strong>{{ title }}</strong> (stream <code>{{ stream_id }}</code>) disconnected.</p>
<p>The stream will stay open for {{ reconnect_window }} seconds waiting for it to reconnect before going idle.</p>
</body></html>"#;

/// Built-in notification emails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    /// A stream went live (or recovered). Needs `title`, `stream_id`.
    StreamActive,
    /// The encoder dropped. Needs `title`, `stream_id`, `reconnect_window`.
    StreamDisconnected,
}

/// A template rendered against a context
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl EmailTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            EmailTemplate::StreamActive => "stream_active",
            EmailTemplate::StreamDisconnected => "stream_disconnected",
        }
    }

    /// (subject, text, html) sources
    fn sources(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            EmailTemplate::StreamActive => {
                (STREAM_ACTIVE_SUBJECT, STREAM_ACTIVE_TEXT, STREAM_ACTIVE_HTML)
            }
            EmailTemplate::StreamDisconnected => (
                STREAM_DISCONNECTED_SUBJECT,
                STREAM_DISCONNECTED_TEXT,
                STREAM_DISCONNECTED_HTML,
            ),
        }
    }

    /// Render all three parts. Build the context with `minijinja::context!`.
    pub fn render(&self, ctx: Value) -> Result<RenderedEmail, NotifyError> {
        let env = environment(self.sources())?;
        let render = |part: &str| -> Result<String, NotifyError> {
            env.get_template(part)
                .and_then(|template| template.render(&ctx))
                .map_err(template_error)
        };

        Ok(RenderedEmail {
            subject: render(SUBJECT)?,
            text: render(TEXT)?,
            html: render(HTML)?,
        })
    }
}

const SUBJECT: &str = "subject";
const TEXT: &str = "body.txt";
const HTML: &str = "body.html";

fn environment(
    (subject, text, html): (&'static str, &'static str, &'static str),
) -> Result<Environment<'static>, NotifyError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|name| {
        if name.ends_with(".html") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });
    env.add_template(SUBJECT, subject).map_err(template_error)?;
    env.add_template(TEXT, text).map_err(template_error)?;
    env.add_template(HTML, html).map_err(template_error)?;
    Ok(env)
}

fn template_error(e: minijinja::Error) -> NotifyError {
    NotifyError::Template(e.to_string())
}
