//! HTML pages built from the static templates under `templates/`.
//!
//! Placeholders look like `{{name}}`. Every dynamic value is escaped before it
//! is substituted.

use axum::response::Html;

const LOGIN_TEMPLATE: &str = include_str!("../templates/login.html");
const REGISTER_TEMPLATE: &str = include_str!("../templates/register.html");
const DASHBOARD_TEMPLATE: &str = include_str!("../templates/dashboard.html");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Success,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    fn to_html(&self) -> String {
        let class = match self.kind {
            NoticeKind::Error => "notice notice-error",
            NoticeKind::Success => "notice notice-success",
        };
        format!(r#"<div class="{class}">{}</div>"#, escape(&self.text))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub name: &'static str,
    pub location: &'static str,
    pub online: bool,
}

/// Placeholder cards; nothing here is wired to real hardware.
pub const CAMERAS: &[Camera] = &[
    Camera {
        name: "Camera 1",
        location: "Living room",
        online: true,
    },
    Camera {
        name: "Camera 2",
        location: "Front door",
        online: true,
    },
    Camera {
        name: "Camera 3",
        location: "Back garden",
        online: false,
    },
];

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Substitutes pre-rendered fragments in order; callers escape untrusted text
/// first and put it in the last slot.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    slots.iter().fold(template.to_string(), |page, (name, value)| {
        page.replace(&format!("{{{{{name}}}}}"), value)
    })
}

fn notice_html(notice: Option<&Notice>) -> String {
    notice.map(Notice::to_html).unwrap_or_default()
}

pub fn login_page(notice: Option<&Notice>) -> Html<String> {
    Html(fill(LOGIN_TEMPLATE, &[("notice", notice_html(notice).as_str())]))
}

pub fn register_page(notice: Option<&Notice>) -> Html<String> {
    Html(fill(REGISTER_TEMPLATE, &[("notice", notice_html(notice).as_str())]))
}

pub fn dashboard_page(username: &str) -> Html<String> {
    let cameras: String = CAMERAS.iter().map(camera_card).collect();
    Html(fill(
        DASHBOARD_TEMPLATE,
        &[("cameras", cameras.as_str()), ("username", escape(username).as_str())],
    ))
}

fn camera_card(camera: &Camera) -> String {
    let (status_class, status_text) = if camera.online {
        ("online", "Online")
    } else {
        ("offline", "Offline")
    };

    format!(
        r#"<div class="card">
                <h3>{name} - {location}</h3>
                <div class="card-content">
                    <div class="camera-feed">[camera feed placeholder]</div>
                    <div class="camera-controls">
                        <button class="camera-btn" data-action="settings">Settings</button>
                        <button class="camera-btn record" data-action="record">Record</button>
                        <button class="camera-btn" data-action="snapshot">Snapshot</button>
                    </div>
                    <div class="status {status_class}">Status: {status_text}</div>
                </div>
            </div>
            "#,
        name = escape(camera.name),
        location = escape(camera.location),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
        assert_eq!(escape("plain admin"), "plain admin");
    }

    #[test]
    fn dashboard_escapes_username() {
        let Html(page) = dashboard_page("<b>mallory</b>");
        assert!(page.contains("Welcome, &lt;b&gt;mallory&lt;/b&gt;"));
        assert!(!page.contains("<b>mallory</b>"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn dashboard_lists_every_camera() {
        let Html(page) = dashboard_page("admin");
        for camera in CAMERAS {
            assert!(page.contains(camera.location));
        }
        assert_eq!(page.matches("status offline").count(), 1);
        assert!(page.contains(r#"href="/logout""#));
    }

    #[test]
    fn notice_kind_selects_class() {
        let Html(page) = register_page(Some(&Notice::success("Registered")));
        assert!(page.contains(r#"<div class="notice notice-success">Registered</div>"#));

        let Html(page) = login_page(Some(&Notice::error("<nope>")));
        assert!(page.contains(r#"<div class="notice notice-error">&lt;nope&gt;</div>"#));
    }

    #[test]
    fn pages_without_notice_have_no_placeholders() {
        let Html(page) = login_page(None);
        assert!(!page.contains("{{notice}}"));
        assert!(!page.contains("notice-error\">"));
    }
}
