use crate::registration::{Receipt, RegistrationRecord};

pub fn subject(record: &RegistrationRecord) -> String {
    let reg = &record.registration;
    format!(
        "New Registration: {} ({})",
        reg.child_name,
        reg.academic_path.to_uppercase()
    )
}

pub fn render_registration(record: &RegistrationRecord, receipt: &Receipt, record_link: &str) -> String {
    let reg = &record.registration;
    let parent = escape_html(&reg.parent_name);
    let child = escape_html(&reg.child_name);
    let path = escape_html(&reg.academic_path.to_uppercase());
    let email = escape_html(&reg.email);
    let phone = escape_html(&reg.phone);
    let ip = escape_html(&record.ip_address);
    let link = escape_html(record_link);
    let submitted = format_submitted_at(receipt);

    let message_block = if reg.message.is_empty() {
        String::new()
    } else {
        format!(
            r#"
    <h3 style="margin-bottom: 4px;">Message</h3>
    <p style="white-space: pre-wrap; background: #f5f5f5; padding: 12px; border-radius: 4px;">{}</p>"#,
            escape_html(&reg.message)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>New Registration</h2>
    <table style="border-collapse: collapse;">
        <tr><td style="padding: 4px 12px 4px 0;"><strong>Parent</strong></td><td>{parent}</td></tr>
        <tr><td style="padding: 4px 12px 4px 0;"><strong>Child</strong></td><td>{child}</td></tr>
        <tr><td style="padding: 4px 12px 4px 0;"><strong>Program</strong></td><td>{path}</td></tr>
        <tr><td style="padding: 4px 12px 4px 0;"><strong>Email</strong></td><td><a href="mailto:{email}">{email}</a></td></tr>
        <tr><td style="padding: 4px 12px 4px 0;"><strong>Phone</strong></td><td><a href="tel:{phone}">{phone}</a></td></tr>
    </table>{message_block}
    <p style="color: #666; font-size: 13px;">Submitted {submitted} from {ip}</p>
    <p><a href="{link}" style="display: inline-block; padding: 10px 20px; background: #2563eb; color: #fff; text-decoration: none; border-radius: 4px;">View record</a></p>
</body>
</html>"#
    )
}

pub fn format_submitted_at(receipt: &Receipt) -> String {
    receipt
        .timestamp
        .format("%B %-d, %Y at %H:%M:%S UTC")
        .to_string()
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
