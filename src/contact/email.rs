//! Email content for contact submissions.

use chrono::{DateTime, FixedOffset, Utc};

use super::model::{ContactSubmission, Reference, RequestMeta};
use crate::config::MailConfig;
use crate::mailer::OutboundMessage;

const COMPANY_NAME: &str = "JourneyBeyondResults Private Limited";
const TEAM_NAME: &str = "JBR Private Limited Team";
const TAGLINE: &str = "Empowering businesses through comprehensive sales and services solutions";
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Everything the two emails share.
pub struct EmailContext<'a> {
    pub submission: &'a ContactSubmission,
    pub meta: &'a RequestMeta,
    pub reference: &'a Reference,
    pub submitted_at: &'a str,
}

/// Human-readable India Standard Time, e.g. `18 October 2026, 07:45 PM`.
pub fn format_submission_time(at: DateTime<Utc>) -> String {
    const FORMAT: &str = "%-d %B %Y, %I:%M %p";
    match FixedOffset::east_opt(IST_OFFSET_SECS) {
        Some(ist) => at.with_timezone(&ist).format(FORMAT).to_string(),
        None => at.format(FORMAT).to_string(),
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Collapse whitespace runs (including CR/LF) to single spaces and drop any
/// other control characters, so user text can sit in a header line.
pub fn header_safe(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// Notification for the company inbox. Replies go straight to the submitter.
pub fn operator_notification(config: &MailConfig, ctx: &EmailContext<'_>) -> OutboundMessage {
    let s = ctx.submission;
    let name = escape_html(&s.name);
    let phone = escape_html(&s.phone);
    let email = escape_html(&s.email);
    let reason = escape_html(&s.reason);
    let description = escape_html(&s.description);
    let client_ip = escape_html(&ctx.meta.client_ip);
    let user_agent = escape_html(&ctx.meta.user_agent);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #086b68; color: white; padding: 30px; text-align: center;">
      <h1>New Contact Form Submission</h1>
      <p>{company}</p>
    </div>
    <div style="background: #fffbde; padding: 30px;">
      <h3 style="color: #129a90;">Contact Information</h3>
      <p><strong>Full Name:</strong> {name}</p>
      <p><strong>Phone Number:</strong> <a href="tel:{phone}">{phone}</a></p>
      <p><strong>Email Address:</strong> <a href="mailto:{email}">{email}</a></p>
      <p><strong>Inquiry Type:</strong> {reason}</p>
      <h3 style="color: #129a90;">Message Details</h3>
      <p style="white-space: pre-wrap;">{description}</p>
      <h3 style="color: #129a90;">Submission Details</h3>
      <p><strong>Submitted On:</strong> {submitted_at} (India Time)</p>
      <p><strong>Reference ID:</strong> {reference}</p>
      <p><strong>IP Address:</strong> {client_ip}</p>
      <p style="font-size: 11px;"><strong>User Agent:</strong> {user_agent}</p>
    </div>
    <div style="background: #086b68; color: white; padding: 20px; text-align: center; font-size: 12px;">
      <p>This email was automatically generated from the JBR Private Limited website contact form.</p>
      <p><strong>Response Time Target:</strong> Within 24 hours</p>
    </div>
  </div>
</body>
</html>
"#,
        company = COMPANY_NAME,
        submitted_at = ctx.submitted_at,
        reference = ctx.reference,
    );

    let text = format!(
        "New Contact Form Submission - JBR Private Limited\n\
         \n\
         CONTACT INFORMATION:\n\
         Name: {}\n\
         Phone: {}\n\
         Email: {}\n\
         Inquiry Type: {}\n\
         \n\
         MESSAGE:\n\
         {}\n\
         \n\
         SUBMISSION DETAILS:\n\
         Submitted: {} (India Time)\n\
         Reference ID: {}\n\
         IP Address: {}\n\
         \n\
         ---\n\
         Please respond within 24 hours.\n\
         This message was sent from the JBR Private Limited website contact form.\n",
        s.name,
        s.phone,
        s.email,
        s.reason,
        s.description,
        ctx.submitted_at,
        ctx.reference,
        ctx.meta.client_ip,
    );

    OutboundMessage {
        from: config.sender.clone(),
        to: config.company_email.clone(),
        reply_to: Some(s.email.clone()),
        subject: format!("New Contact Form Submission - {}", header_safe(&s.reason)),
        html,
        text,
    }
}

/// Acknowledgement sent back to the submitter.
pub fn submitter_confirmation(config: &MailConfig, ctx: &EmailContext<'_>) -> OutboundMessage {
    let s = ctx.submission;
    let name = escape_html(&s.name);
    let email = escape_html(&s.email);
    let reason = escape_html(&s.reason);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #086b68; color: white; padding: 30px; text-align: center;">
      <h1>Thank You for Your Inquiry!</h1>
      <p>{company}</p>
    </div>
    <div style="background: #fffbde; padding: 30px;">
      <p>Dear <strong>{name}</strong>,</p>
      <p>Thank you for contacting <strong>{company}</strong>. We have successfully received your inquiry about <strong>{reason}</strong>.</p>
      <h3 style="color: #129a90;">Your Inquiry Summary</h3>
      <p><strong>Subject:</strong> {reason}</p>
      <p><strong>Submitted:</strong> {submitted_at}</p>
      <p><strong>Reference ID:</strong> {reference}</p>
      <h3 style="color: #129a90;">What Happens Next?</h3>
      <ul>
        <li>Our team will review your inquiry carefully</li>
        <li>We'll respond within <strong>24 hours</strong> during business days</li>
        <li>You'll receive a detailed response at <strong>{email}</strong></li>
        <li>For urgent matters, feel free to call us directly</li>
      </ul>
      <p>Best regards,<br><strong>{team}</strong><br><em>{tagline}</em></p>
      <p style="font-size: 12px; color: #666;">This is an automated confirmation. Please do not reply to this email.</p>
    </div>
  </div>
</body>
</html>
"#,
        company = COMPANY_NAME,
        team = TEAM_NAME,
        tagline = TAGLINE,
        submitted_at = ctx.submitted_at,
        reference = ctx.reference,
    );

    let text = format!(
        "Dear {name},\n\
         \n\
         Thank you for contacting {company}!\n\
         \n\
         We have successfully received your inquiry about \"{reason}\" and will respond within 24 hours during business days.\n\
         \n\
         Your inquiry details:\n\
         - Subject: {reason}\n\
         - Submitted: {submitted_at}\n\
         - Reference ID: {reference}\n\
         \n\
         Our team will review your message and send you a detailed response at {email}.\n\
         \n\
         Best regards,\n\
         {team}\n\
         {tagline}\n\
         \n\
         ---\n\
         This is an automated confirmation. Please do not reply to this email.\n",
        name = s.name,
        company = COMPANY_NAME,
        reason = s.reason,
        submitted_at = ctx.submitted_at,
        reference = ctx.reference,
        email = s.email,
        team = TEAM_NAME,
        tagline = TAGLINE,
    );

    OutboundMessage {
        from: config.sender.clone(),
        to: s.email.clone(),
        reply_to: None,
        subject: format!("Thank you for contacting {}", COMPANY_NAME),
        html,
        text,
    }
}
