use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemovedMember {
    pub(crate) group_name: String,
    pub(crate) user_name: String,
}

/// Summary mailed to one instructor after a course's suspended members were
/// pulled out of their groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InstructorNotification {
    pub(crate) instructor_name: String,
    pub(crate) course_name: String,
    pub(crate) removals: Vec<RemovedMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderedNotice {
    pub(crate) subject: String,
    pub(crate) text: String,
    pub(crate) html: String,
}

pub(crate) trait NoticeRenderer: Send + Sync {
    fn render(&self, notice: &InstructorNotification) -> RenderedNotice;
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PlainNoticeRenderer;

impl NoticeRenderer for PlainNoticeRenderer {
    fn render(&self, notice: &InstructorNotification) -> RenderedNotice {
        let subject = format!("Suspended users removed from groups in {}", notice.course_name);

        let mut text = format!(
            "Hello {},\n\nThe following suspended users were removed from their groups in {}:\n\n",
            notice.instructor_name, notice.course_name
        );
        for removal in &notice.removals {
            let _ = writeln!(text, "- {} removed from {}", removal.user_name, removal.group_name);
        }

        let mut html = format!(
            "<p>Hello {},</p>\n<p>The following suspended users were removed from their groups in \
             <strong>{}</strong>:</p>\n<ul>\n",
            escape_html(&notice.instructor_name),
            escape_html(&notice.course_name)
        );
        for removal in &notice.removals {
            let _ = writeln!(
                html,
                "<li>{} removed from {}</li>",
                escape_html(&removal.user_name),
                escape_html(&removal.group_name)
            );
        }
        html.push_str("</ul>\n");

        RenderedNotice { subject, text, html }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
