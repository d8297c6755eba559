//! HTML rendering for the chat page

use html_escape::{encode_double_quoted_attribute, encode_text};
use memochat_agent::GenerationParams;
use memochat_core::session::Turn;
use memochat_providers::ModelSpec;
use std::fmt::Write;

pub const TITLE: &str = "QnA Chatbot with Memory";
pub const HISTORY_HEADING: &str = "Conversation History";
pub const FORM_CAPTION: &str = "Go ahead and ask your question";

/// Message shown under the form after a submission
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Reply(String),
    Warning(String),
    Error(String),
}

/// Everything needed to render one page
pub struct PageView<'a> {
    pub session: &'a str,
    pub models: &'a [ModelSpec],
    pub params: &'a GenerationParams,
    pub transcript: &'a [Turn],
    pub notice: Option<Notice>,
}

pub fn render(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", TITLE);
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n");

    html.push_str("<form method=\"post\" action=\"/\" autocomplete=\"off\">\n");
    let _ = writeln!(
        html,
        "<input type=\"hidden\" name=\"session\" value=\"{}\">",
        encode_double_quoted_attribute(view.session)
    );

    render_sidebar(&mut html, view);

    html.push_str("<main>\n");
    let _ = writeln!(html, "<h1>{}</h1>", TITLE);
    render_history(&mut html, view.transcript);

    let _ = writeln!(html, "<p class=\"caption\">{}</p>", FORM_CAPTION);
    html.push_str("<label for=\"question\">You:</label>\n");
    // Always rendered empty so a submission clears the field.
    html.push_str("<input type=\"text\" id=\"question\" name=\"question\" value=\"\">\n");
    html.push_str("<button type=\"submit\">Submit</button>\n");

    if let Some(notice) = &view.notice {
        render_notice(&mut html, notice);
    }

    html.push_str("</main>\n</form>\n</body>\n</html>\n");
    html
}

fn render_sidebar(html: &mut String, view: &PageView<'_>) {
    html.push_str("<aside>\n<h2>Settings</h2>\n");

    html.push_str("<label for=\"model\">Select Model</label>\n<select id=\"model\" name=\"model\">\n");
    for model in view.models {
        let selected = if model.id == view.params.model {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            encode_double_quoted_attribute(&model.id),
            selected,
            encode_text(&model.id)
        );
    }
    html.push_str("</select>\n");

    let _ = writeln!(
        html,
        "<label for=\"temperature\">Temperature</label>\n\
         <input type=\"range\" id=\"temperature\" name=\"temperature\" min=\"0\" max=\"1\" step=\"0.01\" value=\"{:.2}\" \
         oninput=\"this.nextElementSibling.value=this.value\"><output>{:.2}</output>",
        view.params.temperature, view.params.temperature
    );
    let _ = writeln!(
        html,
        "<label for=\"max_tokens\">Max Tokens</label>\n\
         <input type=\"range\" id=\"max_tokens\" name=\"max_tokens\" min=\"100\" max=\"500\" step=\"1\" value=\"{}\" \
         oninput=\"this.nextElementSibling.value=this.value\"><output>{}</output>",
        view.params.max_tokens, view.params.max_tokens
    );

    html.push_str("</aside>\n");
}

fn render_history(html: &mut String, transcript: &[Turn]) {
    let _ = writeln!(html, "<section class=\"history\">\n<h2>{}</h2>", HISTORY_HEADING);
    for turn in transcript {
        let _ = writeln!(
            html,
            "<p class=\"turn {}\"><strong>{}:</strong> {}</p>",
            turn.role,
            turn.role.label(),
            encode_text(&turn.text)
        );
    }
    html.push_str("</section>\n");
}

fn render_notice(html: &mut String, notice: &Notice) {
    let (class, text) = match notice {
        Notice::Reply(reply) => ("reply", format!("Assistant: {}", reply)),
        Notice::Warning(message) => ("warning", message.clone()),
        Notice::Error(message) => ("error", message.clone()),
    };
    let _ = writeln!(
        html,
        "<div class=\"notice {}\">{}</div>",
        class,
        encode_text(&text)
    );
}

const STYLE: &str = r#"<style>
body { margin: 0; font-family: sans-serif; display: flex; }
form { display: flex; width: 100%; }
aside { width: 18rem; padding: 1rem; background: #f0f2f6; min-height: 100vh; }
aside label, aside select, aside input { display: block; width: 100%; margin-top: .5rem; }
main { flex: 1; padding: 1rem 2rem; }
.turn { white-space: pre-wrap; }
.caption { color: #555; }
.notice { margin-top: 1rem; padding: .75rem; border-radius: .25rem; white-space: pre-wrap; }
.warning { background: #fff3cd; }
.error { background: #f8d7da; }
</style>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use memochat_providers::ProviderRegistry;

    fn render_with(transcript: &[Turn], notice: Option<Notice>) -> String {
        let registry = ProviderRegistry::new();
        let params = GenerationParams::default();
        render(&PageView {
            session: "abc",
            models: registry.models(),
            params: &params,
            transcript,
            notice,
        })
    }

    #[test]
    fn test_page_has_fixed_labels() {
        let html = render_with(&[], None);
        assert!(html.contains("<title>QnA Chatbot with Memory</title>"));
        assert!(html.contains("Conversation History"));
        assert!(html.contains("Go ahead and ask your question"));
        assert!(html.contains(">Submit</button>"));
        assert!(html.contains("name=\"session\" value=\"abc\""));
    }

    #[test]
    fn test_sidebar_defaults() {
        let html = render_with(&[], None);
        assert!(html.contains("<option value=\"gemma2-9b-it\" selected>"));
        assert!(html.contains("<option value=\"lama3-groq-8b-8192-tool-use-preview\">"));
        assert!(html.contains("min=\"0\" max=\"1\" step=\"0.01\" value=\"0.70\""));
        assert!(html.contains("min=\"100\" max=\"500\" step=\"1\" value=\"250\""));
    }

    #[test]
    fn test_transcript_is_prefixed_and_escaped() {
        let transcript = vec![
            Turn::user("<script>alert(1)</script>"),
            Turn::assistant("a & b"),
        ];
        let html = render_with(&transcript, None);

        assert!(html.contains("<strong>You:</strong> &lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("<strong>Assistant:</strong> a &amp; b"));
        assert!(!html.contains("<script>alert(1)"));
    }

    #[test]
    fn test_notices() {
        let html = render_with(&[], Some(Notice::Reply("4".to_string())));
        assert!(html.contains("<div class=\"notice reply\">Assistant: 4</div>"));

        let html = render_with(
            &[],
            Some(Notice::Warning("Please provide a question.".to_string())),
        );
        assert!(html.contains("<div class=\"notice warning\">Please provide a question.</div>"));
    }
}
